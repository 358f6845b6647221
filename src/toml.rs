use std::fmt::Display;
use std::fmt::Formatter;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use crate::config::LayeredConfig;
use crate::config::section_from_table;

#[derive(Debug)]
pub enum ParseTomlError {
    Read(PathBuf, io::Error),
    Deserialize(PathBuf, toml::de::Error),
}

impl std::error::Error for ParseTomlError {}

impl Display for ParseTomlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            // Paths are kept absolute so the file can be opened directly.
            Self::Read(path, err) => {
                write!(f, "Failed to read {path}:\n{err}", path = path.display())
            }
            Self::Deserialize(path, err) => {
                write!(f, "Failed to parse {path}:\n{err}", path = path.display())
            }
        }
    }
}

/// Parse TOML text into a configuration tree. Tables become sections, so
/// `[style.MaxLineLength]` is reachable as
/// `config.sub_config("style").sub_config("MaxLineLength")`.
pub fn config_from_toml_str(text: &str) -> Result<LayeredConfig, toml::de::Error> {
    let table: toml::Table = toml::from_str(text)?;
    Ok(LayeredConfig::new(section_from_table(table)))
}

pub fn parse_inspekt_toml(path: &Path) -> Result<LayeredConfig, ParseTomlError> {
    let text = fs::read_to_string(path).map_err(|err| ParseTomlError::Read(path.to_path_buf(), err))?;
    config_from_toml_str(&text).map_err(|err| ParseTomlError::Deserialize(path.to_path_buf(), err))
}

/// Load the user configuration at `path` on top of the default
/// configuration at `defaults`.
pub fn parse_layered_toml(path: &Path, defaults: &Path) -> Result<LayeredConfig, ParseTomlError> {
    let defaults = parse_inspekt_toml(defaults)?;
    let user = parse_inspekt_toml(path)?;
    Ok(match defaults.into_user_section() {
        Some(section) => user.with_defaults(section),
        None => user,
    })
}

/// Return the path to the `inspekt.toml` or `.inspekt.toml` file in a given directory.
pub fn find_inspekt_toml_in_directory<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    // Check for `inspekt.toml` first, as we prioritize the "visible" one.
    let toml = path.as_ref().join("inspekt.toml");
    if toml.is_file() {
        return Some(toml);
    }

    let toml = path.as_ref().join(".inspekt.toml");
    if toml.is_file() {
        return Some(toml);
    }

    None
}

/// Find the path to the closest `inspekt.toml` or `.inspekt.toml` if one exists, walking up the filesystem
pub fn find_inspekt_toml<P: AsRef<Path>>(path: P) -> Option<PathBuf> {
    for directory in path.as_ref().ancestors() {
        if let Some(toml) = find_inspekt_toml_in_directory(directory) {
            return Some(toml);
        }
    }
    None
}
