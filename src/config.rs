use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

use crate::theme::{apply_overrides, Theme, ThemeOverrides, THEME_NAMES};

#[derive(Debug, Clone)]
pub struct VdiffConfig {
    pub git_binary: PathBuf,
    pub remote: String,
    pub branch: String,
    /// Quiet period before an edit is written to disk.
    pub debounce: Duration,
    /// `None` waits for git indefinitely.
    pub command_timeout: Option<Duration>,
    pub theme: Theme,
}

impl Default for VdiffConfig {
    fn default() -> Self {
        Self {
            git_binary: PathBuf::from("git"),
            remote: "origin".to_string(),
            branch: "main".to_string(),
            debounce: Duration::from_millis(1000),
            command_timeout: Some(Duration::from_secs(60)),
            theme: Theme::from_name("one-dark"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    git_binary: Option<PathBuf>,
    #[serde(default)]
    remote: Option<String>,
    #[serde(default)]
    branch: Option<String>,
    #[serde(default)]
    debounce_ms: Option<u64>,
    #[serde(default)]
    command_timeout_secs: Option<u64>,
    #[serde(default)]
    theme: Option<String>,
    #[serde(default)]
    colors: Option<ThemeOverrides>,
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// `~/.config/vdiff`, holding `config.toml` and `vdiff.log`.
pub fn config_dir() -> PathBuf {
    let mut path = dirs_home().unwrap_or_else(|| PathBuf::from("."));
    path.push(".config");
    path.push("vdiff");
    path
}

fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Load config from `~/.config/vdiff/config.toml`, falling back to defaults
/// when the file is missing or malformed.
pub fn load_config() -> VdiffConfig {
    let path = config_path();

    let contents = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(_) => return VdiffConfig::default(),
    };

    match parse_config(&contents) {
        Ok(config) => config,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring malformed config");
            VdiffConfig::default()
        }
    }
}

fn parse_config(contents: &str) -> Result<VdiffConfig, toml::de::Error> {
    let file: ConfigFile = toml::from_str(contents)?;
    let defaults = VdiffConfig::default();

    let theme_name = file.theme.as_deref().unwrap_or("one-dark");
    if !THEME_NAMES.contains(&theme_name) {
        warn!(theme = theme_name, "unknown theme, using one-dark");
    }
    let mut theme = Theme::from_name(theme_name);
    if let Some(ref overrides) = file.colors {
        apply_overrides(&mut theme, overrides);
    }

    let command_timeout = match file.command_timeout_secs {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => defaults.command_timeout,
    };

    Ok(VdiffConfig {
        git_binary: file.git_binary.unwrap_or(defaults.git_binary),
        remote: file.remote.unwrap_or(defaults.remote),
        branch: file.branch.unwrap_or(defaults.branch),
        debounce: file
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.debounce),
        command_timeout,
        theme,
    })
}
