use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::pricing::{DEFAULT_FETCH_TIMEOUT, DEFAULT_TTL};
use crate::savings::{DEFAULT_MONTHLY_VOLUME, TokenVolume};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Config {
    #[serde(default)]
    pub(crate) offline: bool,
    #[serde(default)]
    pub(crate) quiet: bool,
    /// Pricing cache TTL in seconds (default: one hour).
    #[serde(default)]
    pub(crate) ttl_secs: Option<u64>,
    /// Pricing fetch timeout in seconds.
    #[serde(default)]
    pub(crate) fetch_timeout_secs: Option<u64>,
    /// OpenRouter credential; `OPENROUTER_API_KEY` wins when both are set.
    #[serde(default)]
    pub(crate) api_key: Option<String>,
    /// File extensions scanned by default.
    #[serde(default)]
    pub(crate) extensions: Option<Vec<String>>,
    /// Token volume assumed when the caller supplies none.
    #[serde(default)]
    pub(crate) monthly_prompt_tokens: Option<u64>,
    #[serde(default)]
    pub(crate) monthly_completion_tokens: Option<u64>,
}

impl Config {
    pub(crate) fn load() -> Self {
        Self::load_internal(false)
    }

    pub(crate) fn load_quiet() -> Self {
        Self::load_internal(true)
    }

    fn load_internal(quiet: bool) -> Self {
        // Try config locations in order of priority
        let config_paths = Self::get_config_paths();

        for path in config_paths {
            if path.exists()
                && let Ok(content) = fs::read_to_string(&path)
            {
                match toml::from_str::<Config>(&content) {
                    Ok(config) => {
                        if !quiet {
                            eprintln!("Loaded config from {}", path.display());
                        }
                        return config;
                    }
                    Err(e) => {
                        if !quiet {
                            eprintln!("Warning: Failed to parse {}: {}", path.display(), e);
                        }
                    }
                }
            }
        }

        Self::default()
    }

    fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG config: ~/.config/mistral-migrate/config.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(
                home.join(".config")
                    .join("mistral-migrate")
                    .join("config.toml"),
            );
        }

        // 2. Platform config dir (macOS Application Support etc.)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("mistral-migrate").join("config.toml");
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        // 3. Home directory: ~/.mistral-migrate.toml
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".mistral-migrate.toml"));
        }

        paths
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TTL)
    }

    pub(crate) fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_FETCH_TIMEOUT)
    }

    pub(crate) fn resolved_api_key(&self) -> Option<String> {
        std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .or_else(|| self.api_key.clone())
    }

    pub(crate) fn default_volume(&self) -> TokenVolume {
        TokenVolume {
            prompt_tokens: self
                .monthly_prompt_tokens
                .unwrap_or(DEFAULT_MONTHLY_VOLUME.prompt_tokens),
            completion_tokens: self
                .monthly_completion_tokens
                .unwrap_or(DEFAULT_MONTHLY_VOLUME.completion_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_paths_not_empty() {
        let paths = Config::get_config_paths();
        assert!(!paths.is_empty());
    }

    #[test]
    fn default_durations_and_volume() {
        let config = Config::default();
        assert_eq!(config.ttl(), Duration::from_secs(3600));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.default_volume().prompt_tokens, 5_000_000);
        assert_eq!(config.default_volume().completion_tokens, 5_000_000);
    }

    #[test]
    fn toml_overrides_are_applied() {
        let config: Config = toml::from_str(
            r#"
offline = true
ttl_secs = 120
monthly_prompt_tokens = 1000000
extensions = ["py", "txt"]
"#,
        )
        .unwrap();
        assert!(config.offline);
        assert_eq!(config.ttl(), Duration::from_secs(120));
        assert_eq!(config.default_volume().prompt_tokens, 1_000_000);
        assert_eq!(config.default_volume().completion_tokens, 5_000_000);
        assert_eq!(config.extensions.as_deref(), Some(&["py".to_string(), "txt".to_string()][..]));
    }
}
