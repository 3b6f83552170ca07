use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Settings file read when neither the profile nor the flag names one.
pub const DEFAULT_SETTINGS_FILE: &str = "overlap.yaml";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CliConfig {
    /// Path of the `AppConfig` settings file (defaults, registry, logging).
    #[serde(default = "default_settings_file")]
    pub settings_file: String,
    /// Overrides `logging.filter` from the settings file.
    pub log_filter: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            settings_file: default_settings_file(),
            log_filter: None,
        }
    }
}

fn default_settings_file() -> String {
    DEFAULT_SETTINGS_FILE.to_string()
}

#[derive(Serialize, Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    current_profile: Option<String>,
    #[serde(default)]
    profiles: HashMap<String, CliConfig>,
}

/// Load the CLI profile from the profile file and environment variables.
pub fn load(profile_arg: Option<&str>) -> Result<CliConfig> {
    let config_path = get_config_path();
    let config_file = if config_path.exists() {
        let content = fs::read_to_string(&config_path)
            .context(format!("Failed to read config file: {:?}", config_path))?;
        serde_yaml::from_str::<ConfigFile>(&content).context("Failed to parse config.yaml")?
    } else {
        ConfigFile::default()
    };

    // Priority: Arg > Env > Config File > "default"
    let profile_name = profile_arg
        .map(|s| s.to_string())
        .or_else(|| env::var("OVERLAP_PROFILE").ok())
        .or(config_file.current_profile)
        .unwrap_or_else(|| "default".to_string());

    let mut config = config_file
        .profiles
        .get(&profile_name)
        .cloned()
        .unwrap_or_default();

    if let Ok(path) = env::var("OVERLAP_SETTINGS_FILE") {
        config.settings_file = path;
    }
    if let Ok(filter) = env::var("OVERLAP_LOG_FILTER") {
        config.log_filter = Some(filter);
    }

    Ok(config)
}

fn get_config_path() -> PathBuf {
    if let Ok(path) = env::var("OVERLAP_CLI_CONFIG") {
        return PathBuf::from(path);
    }

    // ~/.overlap/config.yaml
    match dirs::home_dir() {
        Some(home) => home.join(".overlap").join("config.yaml"),
        None => PathBuf::from(".overlap/config.yaml"),
    }
}
