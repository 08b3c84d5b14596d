use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub filter: FilterConfig,
    pub keybinds: KeybindsConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub scan_interval_ms: u64,
    pub directory_refresh_ms: u64,
    pub theme: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            scan_interval_ms: 1000,
            directory_refresh_ms: 5000,
            theme: "dark".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Process names never listed, matched case-insensitively without `.exe`.
    pub exclude: Vec<String>,
    pub require_window: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        FilterConfig {
            exclude: ["chrome", "svchost", "explorer", "teams", "runtimebroker"]
                .into_iter()
                .map(String::from)
                .collect(),
            require_window: true,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct KeybindsConfig {
    pub quit: String,
    pub rescan: String,
    pub scan_now: String,
    pub baseline: String,
    pub help: String,
}

impl Default for KeybindsConfig {
    fn default() -> Self {
        KeybindsConfig {
            quit: "q".to_string(),
            rescan: "r".to_string(),
            scan_now: "s".to_string(),
            baseline: "b".to_string(),
            help: "?".to_string(),
        }
    }
}

/// Parse a keybind name such as `"q"`, `"Enter"` or `"F5"`.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }
    match name.to_lowercase().as_str() {
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "space" => Some(KeyCode::Char(' ')),
        "backspace" => Some(KeyCode::Backspace),
        "delete" | "del" => Some(KeyCode::Delete),
        other => other
            .strip_prefix('f')
            .and_then(|n| n.parse::<u8>().ok())
            .filter(|n| (1..=12).contains(n))
            .map(KeyCode::F),
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("handlescope").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "invalid config, using defaults");
                Config::default()
            }
        },
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.scan_interval_ms, 1000);
        assert_eq!(config.general.directory_refresh_ms, 5000);
        assert_eq!(config.general.theme, "dark");
        assert!(config.filter.require_window);
        assert!(config.filter.exclude.iter().any(|n| n == "svchost"));
        assert_eq!(config.keybinds.quit, "q");
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
scan_interval_ms = 250
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.scan_interval_ms, 250);
        // Other fields should be defaults
        assert_eq!(config.general.directory_refresh_ms, 5000);
        assert!(config.filter.require_window);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
scan_interval_ms = 500
directory_refresh_ms = 2000
theme = "light"

[filter]
exclude = ["firefox"]
require_window = false

[keybinds]
quit = "x"
baseline = "B"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.scan_interval_ms, 500);
        assert_eq!(config.general.directory_refresh_ms, 2000);
        assert_eq!(config.general.theme, "light");
        assert_eq!(config.filter.exclude, vec!["firefox".to_string()]);
        assert!(!config.filter.require_window);
        assert_eq!(config.keybinds.quit, "x");
        assert_eq!(config.keybinds.baseline, "B");
        assert_eq!(config.keybinds.help, "?");
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.scan_interval_ms, 1000);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("handlescope_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.scan_interval_ms, 1000);
        let _ = std::fs::remove_file(&temp);
    }

    #[test]
    fn parse_key_names() {
        assert_eq!(parse_key("q"), Some(KeyCode::Char('q')));
        assert_eq!(parse_key("Enter"), Some(KeyCode::Enter));
        assert_eq!(parse_key("escape"), Some(KeyCode::Esc));
        assert_eq!(parse_key("F5"), Some(KeyCode::F(5)));
        assert_eq!(parse_key("F13"), None);
        assert_eq!(parse_key("nonsense"), None);
    }
}
