//! Compilation settings and `config.json` loading.

use crate::constants::Constants;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Failed to read the config file.
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse the config JSON.
    #[error("failed to parse config file: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Whether a file is compiled on its own or as part of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Single,
    Project,
}

/// Options that change what the compiler emits and reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilerOptions {
    pub mode: Mode,
    pub check_types: bool,
    pub remove_unused_jump_labels: bool,
    pub remove_compiler_mark: bool,
    pub verbose: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            mode: Mode::Single,
            check_types: true,
            remove_unused_jump_labels: true,
            remove_compiler_mark: false,
            verbose: false,
        }
    }
}

/// Settings for one compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub name: String,
    pub authors: Vec<String>,
    /// Name of the file being compiled, used in diagnostics and for hidden-variable prefixes
    pub filename: String,
    pub compiler_constants: Constants,
    pub compiler_options: CompilerOptions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            name: "unnamed".to_string(),
            authors: vec!["unknown".to_string()],
            filename: "unknown.mlogx".to_string(),
            compiler_constants: Constants::new(),
            compiler_options: CompilerOptions::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse settings from a JSON string. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ConstValue;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_json("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.compiler_options.check_types);
        assert!(settings.compiler_options.remove_unused_jump_labels);
        assert_eq!(settings.compiler_options.mode, Mode::Single);
    }

    #[test]
    fn test_camel_case_fields() {
        let settings = Settings::from_json(
            r#"{
                "name": "turret",
                "compilerConstants": { "speed": 5, "label": "fast", "on": true, "items": [1, "a"] },
                "compilerOptions": { "mode": "project", "removeUnusedJumpLabels": false, "verbose": true }
            }"#,
        )
        .unwrap();
        assert_eq!(settings.name, "turret");
        assert_eq!(settings.compiler_options.mode, Mode::Project);
        assert!(!settings.compiler_options.remove_unused_jump_labels);
        assert!(settings.compiler_options.verbose);
        assert!(settings.compiler_options.check_types);
        assert_eq!(settings.compiler_constants["speed"], ConstValue::Number(5.0));
        assert_eq!(settings.compiler_constants["on"], ConstValue::Bool(true));
        assert_eq!(settings.compiler_constants["items"].to_string(), "1 a");
        let keys: Vec<&String> = settings.compiler_constants.keys().collect();
        assert_eq!(keys, ["speed", "label", "on", "items"]);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "authors": ["someone"] }}"#).unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.authors, vec!["someone".to_string()]);
    }

    #[test]
    fn test_unknown_options_are_ignored() {
        let settings = Settings::from_json(r#"{ "compilerOptions": { "include": ["lib"], "checkTypes": false } }"#).unwrap();
        assert!(!settings.compiler_options.check_types);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(Settings::from_json("{ nope"), Err(SettingsError::JsonError(_))));
    }
}
