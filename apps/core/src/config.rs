use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clipboard_history::DuplicatePolicy;

const APP_DIR_NAME: &str = "scry";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to encode config: {0}")]
    Encode(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebSearchProvider {
    Duckduckgo,
    #[default]
    Google,
    Bing,
    Brave,
    Startpage,
    Ecosia,
    Yahoo,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,
    pub log_level: String,
    pub ranked_matches: bool,
    pub web_search_provider: WebSearchProvider,
    pub web_search_custom_template: String,
    pub scripts_dir: PathBuf,
    pub clipboard_enabled: bool,
    pub clipboard_capacity: usize,
    pub clipboard_poll_interval_ms: u64,
    pub clipboard_duplicates: DuplicatePolicy,
    pub web_shortcuts: BTreeMap<String, String>,
    pub run_targets: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let documents = dirs::document_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir);

        Self {
            config_path: stable_app_data_dir().join(CONFIG_FILE_NAME),
            log_level: "info".to_string(),
            ranked_matches: false,
            web_search_provider: WebSearchProvider::default(),
            web_search_custom_template: String::new(),
            scripts_dir: documents.join("ScryScripts"),
            clipboard_enabled: true,
            clipboard_capacity: 50,
            clipboard_poll_interval_ms: 1_000,
            clipboard_duplicates: DuplicatePolicy::default(),
            web_shortcuts: BTreeMap::from([
                ("chatgpt".to_string(), "https://chatgpt.com".to_string()),
                ("youtube".to_string(), "https://youtube.com".to_string()),
            ]),
            run_targets: default_run_targets(),
        }
    }
}

fn default_run_targets() -> BTreeMap<String, String> {
    let notepad = if cfg!(target_os = "windows") {
        "notepad.exe"
    } else if cfg!(target_os = "macos") {
        "/System/Applications/TextEdit.app"
    } else {
        "/usr/bin/gedit"
    };
    BTreeMap::from([("notepad".to_string(), notepad.to_string())])
}

/// Per-user directory holding config and logs.
pub fn stable_app_data_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR_NAME)
}

pub fn default_config_path() -> PathBuf {
    stable_app_data_dir().join(CONFIG_FILE_NAME)
}

/// Loads the config at `path` (or the default location). A missing file yields defaults.
pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
    let path = path
        .map(Path::to_path_buf)
        .unwrap_or_else(default_config_path);

    let mut cfg = if path.exists() {
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        parse(&path, &raw)?
    } else {
        Config::default()
    };
    cfg.config_path = path;
    validate(&cfg)?;
    Ok(cfg)
}

pub fn parse(path: &Path, raw: &str) -> Result<Config, ConfigError> {
    let parsed = if is_json_path(path) {
        json5::from_str::<Config>(raw).map_err(|e| e.to_string())
    } else {
        toml::from_str::<Config>(raw).map_err(|e| e.to_string())
    };
    parsed.map_err(|message| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    })
}

pub fn save(cfg: &Config) -> Result<(), ConfigError> {
    let encoded = if is_json_path(&cfg.config_path) {
        serde_json::to_string_pretty(cfg).map_err(|e| ConfigError::Encode(e.to_string()))?
    } else {
        toml::to_string_pretty(cfg).map_err(|e| ConfigError::Encode(e.to_string()))?
    };

    if let Some(parent) = cfg.config_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&cfg.config_path, encoded).map_err(|source| ConfigError::Write {
        path: cfg.config_path.clone(),
        source,
    })
}

pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.clipboard_capacity == 0 || cfg.clipboard_capacity > 1_000 {
        return Err(ConfigError::Invalid(
            "clipboard_capacity must be between 1 and 1000".into(),
        ));
    }

    if !(100..=60_000).contains(&cfg.clipboard_poll_interval_ms) {
        return Err(ConfigError::Invalid(
            "clipboard_poll_interval_ms must be between 100 and 60000".into(),
        ));
    }

    if cfg.web_search_provider == WebSearchProvider::Custom
        && !cfg.web_search_custom_template.contains("{query}")
    {
        return Err(ConfigError::Invalid(
            "web_search_custom_template must contain {query}".into(),
        ));
    }

    for (map_name, map) in [("web_shortcuts", &cfg.web_shortcuts), ("run_targets", &cfg.run_targets)] {
        for (key, target) in map {
            if key.trim().is_empty() || key.chars().any(char::is_whitespace) {
                return Err(ConfigError::Invalid(format!(
                    "{map_name} key '{key}' must be a single non-blank word"
                )));
            }
            if target.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "{map_name} entry '{key}' has an empty target"
                )));
            }
        }
    }

    Ok(())
}

fn is_json_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json") || ext.eq_ignore_ascii_case("json5"))
}
