use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Report settings. The defaults reproduce the standard on-call report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Length of the report window in calendar months
    pub window_months: u32,
    /// Text that separates the person's name from the rest of a summary
    pub person_marker: String,
    pub header: Vec<String>,
    /// Minimum number of fields each roster takes up in a row
    pub roster_slots: usize,
    pub name_fixups: Vec<NameFixup>,
}

/// Expands a shortened name in rendered rows, e.g. `Joram` -> `Joram Wilander`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NameFixup {
    pub short: String,
    pub full: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_months: 7,
            person_marker: crate::roster::PERSON_MARKER.to_string(),
            header: ["Week", "Primary NASA", "Primary EMEA", "Secondary NASA", "Secondary EMEA"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            roster_slots: 2,
            // The rotation export only carries Joram's first name
            name_fixups: vec![NameFixup {
                short: "Joram".to_string(),
                full: "Joram Wilander".to_string(),
            }],
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Config = toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_months == 0 {
            return Err(ConfigError::Invalid("window_months must be at least 1".to_string()));
        }
        if self.roster_slots == 0 {
            return Err(ConfigError::Invalid("roster_slots must be at least 1".to_string()));
        }
        if self.person_marker.is_empty() {
            return Err(ConfigError::Invalid("person_marker cannot be empty".to_string()));
        }
        if let Some(fixup) = self.name_fixups.iter().find(|f| f.short.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "name fixup for '{}' has an empty short name",
                fixup.full
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> Result<NamedTempFile> {
        let mut file = NamedTempFile::new()?;
        file.write_all(content.as_bytes())?;
        Ok(file)
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.window_months, 7);
        assert_eq!(config.person_marker, " (user)");
        assert_eq!(
            config.header.join(","),
            "Week,Primary NASA,Primary EMEA,Secondary NASA,Secondary EMEA"
        );
        assert_eq!(config.name_fixups[0].full, "Joram Wilander");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_keeps_defaults() -> Result<()> {
        let file = write_config("window_months = 3\n")?;
        let loaded = Config::load(file.path())?;
        assert_eq!(loaded.window_months, 3);
        assert_eq!(loaded.roster_slots, 2);
        assert_eq!(loaded.name_fixups, Config::default().name_fixups);
        Ok(())
    }

    #[test]
    fn test_config_with_fixups() -> Result<()> {
        let file = write_config(
            r#"
person_marker = " [oncall]"
name_fixups = [{ short = "Sam", full = "Sam Carter" }]
"#,
        )?;
        let loaded = Config::load(file.path())?;
        assert_eq!(loaded.person_marker, " [oncall]");
        assert_eq!(
            loaded.name_fixups,
            vec![NameFixup { short: "Sam".to_string(), full: "Sam Carter".to_string() }]
        );
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() -> Result<()> {
        let file = write_config("window_months = 0\n")?;
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Invalid(_))));

        let file = write_config("roster_slots = 0\n")?;
        match Config::load(file.path()) {
            Err(ConfigError::Invalid(message)) => assert!(message.contains("roster_slots")),
            other => panic!("Expected roster_slots to be rejected, got {:?}", other),
        }

        let file = write_config("window_months = \"seven\"\n")?;
        assert!(matches!(Config::load(file.path()), Err(ConfigError::Parse { .. })));
        Ok(())
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load(Path::new("/no/such/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
