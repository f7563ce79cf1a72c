use std::path::PathBuf;

pub(crate) use common::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};
use common::games::ultimate::{BotSettings, Mark};
use serde::{Deserialize, Serialize};

const CONFIG_FILE: &str = "ultimate_ttt_client_config.yaml";

/// The config file lives next to the executable unless a path is given.
pub fn default_config_path() -> PathBuf {
    std::env::current_exe()
        .map(|exe| exe.with_file_name(CONFIG_FILE))
        .unwrap_or_else(|_| PathBuf::from(CONFIG_FILE))
}

pub fn get_config_manager(
    path: PathBuf,
) -> ConfigManager<FileContentConfigProvider, Config, YamlConfigSerializer> {
    ConfigManager::from_yaml_file(path)
}

#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Config {
    pub bot: BotSettings,
    pub ai_mark: Mark,
    pub log_prefix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotSettings::default(),
            ai_mark: Mark::Second,
            log_prefix: None,
        }
    }
}

impl Validate for Config {
    fn validate(&self) -> Result<(), String> {
        self.bot.validate()?;
        if self.log_prefix.as_deref().is_some_and(str::is_empty) {
            return Err("log_prefix must not be empty when set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ai_mark, Mark::Second);
    }

    #[test]
    fn test_empty_log_prefix_is_rejected() {
        let config = Config {
            log_prefix: Some(String::new()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bot_settings_are_validated() {
        let mut config = Config::default();
        config.bot.top_candidates = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("ultimate_ttt_client_missing_config.yaml");
        let _ = std::fs::remove_file(&path);
        let manager = get_config_manager(path);
        assert_eq!(manager.get_config().unwrap(), Config::default());
    }
}
