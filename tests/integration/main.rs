mod baseline;
mod cancellation;
mod configuration;
mod determinism;
mod extensions;
mod helpers;
mod ordering;
mod resolution;
