//! Application-level configuration loading, including the runtime alphabet.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "ALFAVIT_BACK_CONFIG_PATH";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    alphabet: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to the baked-in alphabet.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        letters = app_config.alphabet.len(),
                        "loaded alphabet from config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Whether `letter` belongs to the configured alphabet.
    pub fn contains_letter(&self, letter: &str) -> bool {
        self.alphabet.iter().any(|entry| entry == letter)
    }

    /// The full alphabet the rooms play over, in display order.
    pub fn alphabet(&self) -> &[String] {
        &self.alphabet
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            alphabet: default_alphabet(),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    alphabet: Vec<String>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        if value.alphabet.is_empty() {
            warn!("configured alphabet is empty; using built-in defaults");
            return Self::default();
        }
        Self {
            alphabet: value.alphabet,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in alphabet shipped with the binary (Russian, 33 letters).
fn default_alphabet() -> Vec<String> {
    [
        "А", "Б", "В", "Г", "Д", "Е", "Ё", "Ж", "З", "И", "Й", "К", "Л", "М", "Н", "О", "П", "Р",
        "С", "Т", "У", "Ф", "Х", "Ц", "Ч", "Ш", "Щ", "Ъ", "Ы", "Ь", "Э", "Ю", "Я",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_alphabet_has_33_letters() {
        let config = AppConfig::default();
        assert_eq!(config.alphabet().len(), 33);
        assert!(config.contains_letter("А"));
        assert!(config.contains_letter("Я"));
        assert!(!config.contains_letter("Z"));
    }

    #[test]
    fn empty_configured_alphabet_falls_back() {
        let config: AppConfig = RawConfig { alphabet: vec![] }.into();
        assert_eq!(config.alphabet().len(), 33);
    }

    #[test]
    fn configured_alphabet_replaces_default() {
        let config: AppConfig = RawConfig {
            alphabet: vec!["A".into(), "B".into(), "C".into()],
        }
        .into();
        assert!(config.contains_letter("B"));
        assert!(!config.contains_letter("А"));
    }
}
