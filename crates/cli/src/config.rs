use std::env;
use std::path::PathBuf;

pub const LOG_ENV: &str = "AREASCOPE_LOG";
pub const DATA_DIR_ENV: &str = "AREASCOPE_DATA_DIR";

const DEFAULT_LOG_LEVEL: &str = "warn";

/// Settings read from the environment; command-line flags take precedence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// `EnvFilter` directive, e.g. `debug` or `areascope_core=trace`
    pub log_level: String,
    /// Where the history lives; None means the per-user data directory
    pub data_dir: Option<PathBuf>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self { log_level: DEFAULT_LOG_LEVEL.to_owned(), data_dir: None }
    }
}

impl CliConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let log_level = lookup(LOG_ENV)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned());
        let data_dir = lookup(DATA_DIR_ENV)
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Self { log_level, data_dir }
    }

    /// Command-line data directory wins over the environment
    pub fn with_data_dir_override(mut self, data_dir: Option<PathBuf>) -> Self {
        if data_dir.is_some() {
            self.data_dir = data_dir;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = CliConfig::from_lookup(lookup(&[]));
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn reads_environment() {
        let config = CliConfig::from_lookup(lookup(&[
            (LOG_ENV, "debug"),
            (DATA_DIR_ENV, "/tmp/areascope"),
        ]));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/areascope")));
    }

    #[test]
    fn blank_values_fall_back() {
        let config = CliConfig::from_lookup(lookup(&[(LOG_ENV, "  "), (DATA_DIR_ENV, "")]));
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn flag_overrides_environment() {
        let config = CliConfig::from_lookup(lookup(&[(DATA_DIR_ENV, "/from/env")]))
            .with_data_dir_override(Some(PathBuf::from("/from/flag")));
        assert_eq!(config.data_dir, Some(PathBuf::from("/from/flag")));

        let config = CliConfig::from_lookup(lookup(&[(DATA_DIR_ENV, "/from/env")]))
            .with_data_dir_override(None);
        assert_eq!(config.data_dir, Some(PathBuf::from("/from/env")));
    }
}
