//! Configuration file loading and environment variable handling.
//!
//! Precedence: CLI args > Environment vars > Config file > Defaults

use chrono::Weekday;
use nowexpr_core::TruncationMode;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config file content for `--config-init`.
pub const DEFAULT_CONFIG: &str = r#"# nowexpr configuration
# See: nowexpr --help for all options

# First day of the week for /w (sun, mon, tue, ...)
week_start = "sun"

# Rounding for /unit operations: "start" or "end"
mode = "start"

# Disable colored output
no_color = false
"#;

/// Configuration loaded from file and environment.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub week_start: Option<String>,
    pub mode: Option<String>,
    pub no_color: Option<bool>,
}

impl Config {
    /// Get the config file path.
    ///
    /// - Linux: `~/.config/nowexpr/config.toml`
    /// - macOS: `~/Library/Application Support/nowexpr/config.toml`
    /// - Windows: `%APPDATA%\nowexpr\config.toml`
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nowexpr").join("config.toml"))
    }

    /// Load config from the standard location. Returns default if the file
    /// doesn't exist.
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load config from `path`. Returns default if the file is missing or
    /// unreadable.
    pub fn load_from(path: &Path) -> Self {
        let Ok(contents) = fs::read_to_string(path) else {
            return Self::default();
        };

        toml::from_str(&contents).unwrap_or_else(|e| {
            eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
            Self::default()
        })
    }

    /// Read value from environment variable.
    fn env_var<T: std::str::FromStr>(name: &str) -> Option<T> {
        std::env::var(name).ok()?.parse().ok()
    }

    /// Get week_start with precedence: env > config > default (Sunday).
    pub fn week_start(&self) -> Weekday {
        Self::env_var("NOWEXPR_WEEK_START")
            .or_else(|| Self::parsed("week_start", self.week_start.as_deref()))
            .unwrap_or(Weekday::Sun)
    }

    /// Get mode with precedence: env > config > default (start).
    pub fn mode(&self) -> TruncationMode {
        Self::env_var("NOWEXPR_MODE")
            .or_else(|| Self::parsed("mode", self.mode.as_deref()))
            .unwrap_or_default()
    }

    /// Get no_color with precedence: env > config > default.
    ///
    /// Respects the `NO_COLOR` standard (https://no-color.org/).
    pub fn no_color(&self) -> bool {
        // NO_COLOR is a standard - presence means disable color
        if std::env::var("NO_COLOR").is_ok() {
            return true;
        }
        if std::env::var("NOWEXPR_NO_COLOR").is_ok() {
            return true;
        }
        self.no_color.unwrap_or(false)
    }

    fn parsed<T: std::str::FromStr>(key: &str, value: Option<&str>) -> Option<T> {
        let value = value?;
        let parsed = value.parse().ok();
        if parsed.is_none() {
            tracing::warn!("Ignoring invalid {} in config file: {:?}", key, value);
        }
        parsed
    }
}

/// Create a default config file at the standard location.
pub fn init_config() -> Result<PathBuf, String> {
    let path = Config::path().ok_or("Cannot determine config directory")?;
    init_config_at(&path)?;
    Ok(path)
}

fn init_config_at(path: &Path) -> Result<(), String> {
    if path.exists() {
        return Err(format!("Config file already exists: {}", path.display()));
    }

    // Create parent directory
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("Failed to create directory: {}", e))?;
    }

    fs::write(path, DEFAULT_CONFIG).map_err(|e| format!("Failed to write config: {}", e))
}
