//! Rule-based static analysis engine
//!
//! This crate provides:
//! - A layered configuration model read from `inspekt.toml`
//! - Rules and rule sets, registered through providers
//! - An analyzer running rules over syntax trees in parallel, with
//!   autocorrection, suppression markers and failure isolation
//! - A result aggregate shared with extensions

pub mod analyzer;
pub(crate) mod check;
pub mod config;
pub mod detektion;
pub mod discovery;
pub mod error;
pub mod extension;
pub mod extensions;
pub mod finding;
pub mod frontend;
pub mod location;
pub mod notification;
pub mod path_filter;
pub mod plain_text;
pub mod plan;
pub mod property;
pub mod rule;
pub mod rule_set;
pub mod rules;
pub mod settings;
pub mod suppression;
pub mod toml;
pub mod tree;
pub(crate) mod utils;


pub use analyzer::Analyzer;
pub use config::{Config, ConfigExt, LayeredConfig};
pub use detektion::Detektion;
pub use finding::{Finding, Severity};
pub use notification::Notification;
pub use rule::{CorrectableRule, Rule, RuleContext};
pub use rule_set::{RuleDefinition, RuleSet, RuleSetProvider};
pub use settings::{CancellationToken, Parallelism, Settings};
