use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides `[endpoint] base_url` when set.
pub const ENDPOINT_ENV: &str = "PROMPTFRAME_ENDPOINT";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Settings {
    pub endpoint: EndpointConfig,
    pub analysis: AnalysisConfig,
    pub suggestion: SuggestionConfig,
    pub server: ServerConfig,
    pub output: OutputConfig,
}

/// Where the analysis and suggestion clients send their requests.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EndpointConfig {
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub min_interval_ms: u64,
    pub daily_limit: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SuggestionConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub upstream_base_url: String,
    pub analysis_model: String,
    pub suggestion_model: String,
    /// Name of the environment variable holding the upstream API key.
    pub api_key_env: String,
    pub upstream_timeout_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    pub use_colors: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787/".to_string(),
            timeout_ms: 6000,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            min_interval_ms: 4000,
            daily_limit: 1000,
        }
    }
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            base_delay_ms: 1000,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8787".to_string(),
            upstream_base_url: "https://generativelanguage.googleapis.com".to_string(),
            analysis_model: "gemini-2.5-flash-lite".to_string(),
            suggestion_model: "gemini-2.5-flash-preview-05-20".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            upstream_timeout_ms: 30_000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { use_colors: true }
    }
}

impl Settings {
    /// Reads `~/.promptframe/config.toml`, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut settings = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?
        } else {
            debug!("No config at {}, using defaults", path.display());
            Self::default()
        };

        settings.apply_endpoint_override(std::env::var(ENDPOINT_ENV).ok());
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;

        Ok(())
    }

    pub fn apply_endpoint_override(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            debug!("Endpoint overridden by {ENDPOINT_ENV}: {url}");
            self.endpoint.base_url = url;
        }
    }

    /// Upstream API key for the proxy, if the configured variable is set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.server.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let home_dir =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;

        Ok(home_dir.join(".promptframe").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let mut settings = Settings::load_from(&dir.path().join("absent.toml")).unwrap();
        settings.endpoint = EndpointConfig::default();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.analysis.min_interval_ms, 4000);
        assert_eq!(settings.analysis.daily_limit, 1000);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[analysis]\ndaily_limit = 50\n\n[output]\nuse_colors = false\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();

        assert_eq!(settings.analysis.daily_limit, 50);
        assert_eq!(settings.analysis.max_attempts, 3);
        assert!(!settings.output.use_colors);
        assert_eq!(settings.suggestion, SuggestionConfig::default());
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[analysis\n").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut settings = Settings::default();
        settings.server.bind = "0.0.0.0:9000".to_string();
        settings.suggestion.max_attempts = 4;

        settings.save_to(&path).unwrap();
        let mut loaded = Settings::load_from(&path).unwrap();
        loaded.endpoint = settings.endpoint.clone();

        assert_eq!(loaded, settings);
    }

    #[test]
    fn endpoint_override_ignores_blank_values() {
        let mut settings = Settings::default();

        settings.apply_endpoint_override(Some("   ".to_string()));
        assert_eq!(settings.endpoint.base_url, EndpointConfig::default().base_url);

        settings.apply_endpoint_override(Some("http://proxy.test/api".to_string()));
        assert_eq!(settings.endpoint.base_url, "http://proxy.test/api");
    }
}
