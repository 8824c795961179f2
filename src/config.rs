use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::credentials::{KeySource, ProcessEnv};
use crate::models::Provider;

/// Main configuration structure for vocab-forge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_provider")]
    pub default_provider: Provider,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub deepseek: DeepSeekConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub placeholders: Placeholders,
}

fn default_provider() -> Provider {
    Provider::Gemini
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Runtime-injected key, consulted after the environment.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.5-flash".to_string(),
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeepSeekConfig {
    /// Runtime-injected key, consulted after the environment.
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.deepseek.com".to_string(),
            model: "deepseek-chat".to_string(),
            temperature: 0.7,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout. Unset or 0 means the caller races the call itself.
    pub timeout_secs: Option<u64>,
}

/// Substitutes for required vocabulary fields the model left blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Placeholders {
    pub word: String,
    pub definition: String,
    pub example_sentence: String,
    pub mnemonic: String,
}

impl Default for Placeholders {
    fn default() -> Self {
        Self {
            word: "未命名詞彙".to_string(),
            definition: "AI 未提供解釋".to_string(),
            example_sentence: "AI 未提供例句".to_string(),
            mnemonic: "AI 未提供記憶法".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            gemini: GeminiConfig::default(),
            deepseek: DeepSeekConfig::default(),
            http: HttpConfig::default(),
            placeholders: Placeholders::default(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment variable overrides
    /// ALWAYS returns a valid config - never fails
    pub fn load() -> Self {
        match dotenvy::dotenv() {
            Ok(path) => tracing::info!("Loaded .env from: {}", path.display()),
            Err(_) => tracing::debug!("No .env file found - continuing with env vars only"),
        }

        let config_path =
            env::var("VF_CONFIG_PATH").unwrap_or_else(|_| "vocab-forge.yaml".to_string());

        let mut config = Self::from_path(&config_path);
        config.apply_env_overrides();

        if let Err(e) = config.validate() {
            tracing::warn!("Config validation warnings: {} - continuing anyway", e);
        }

        config
    }

    /// Read a YAML config file, falling back to defaults if it is missing or invalid.
    pub fn from_path(config_path: &str) -> Self {
        if !Path::new(config_path).exists() {
            tracing::debug!("Config file not found at {} - using defaults", config_path);
            return Self::default();
        }

        match fs::read_to_string(config_path) {
            Ok(contents) => match serde_yaml::from_str::<Config>(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", config_path);
                    config
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to parse config file {}: {} - using defaults",
                        config_path,
                        e
                    );
                    Self::default()
                }
            },
            Err(e) => {
                tracing::error!(
                    "Failed to read config file {}: {} - using defaults",
                    config_path,
                    e
                );
                Self::default()
            }
        }
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_env_overrides_from(&ProcessEnv);
    }

    /// Apply overrides read from `vars`. Unparseable values are ignored.
    pub fn apply_env_overrides_from(&mut self, vars: &dyn KeySource) {
        if let Some(provider) = vars.lookup("VF_PROVIDER") {
            match provider.parse() {
                Ok(p) => self.default_provider = p,
                Err(e) => tracing::warn!("Ignoring VF_PROVIDER: {}", e),
            }
        }

        // Gemini overrides
        if let Some(model) = vars.lookup("GEMINI_MODEL") {
            self.gemini.model = model;
        }
        if let Some(url) = vars.lookup("GEMINI_BASE_URL") {
            self.gemini.base_url = url;
        }

        // DeepSeek overrides
        if let Some(model) = vars.lookup("DEEPSEEK_MODEL") {
            self.deepseek.model = model;
        }
        if let Some(url) = vars.lookup("DEEPSEEK_BASE_URL") {
            self.deepseek.base_url = url;
        }

        if let Some(timeout) = vars.lookup("VF_HTTP_TIMEOUT_SECS") {
            match timeout.trim().parse::<u64>() {
                // 0 means no timeout
                Ok(0) => self.http.timeout_secs = None,
                Ok(secs) => self.http.timeout_secs = Some(secs),
                Err(e) => tracing::warn!("Ignoring VF_HTTP_TIMEOUT_SECS: {}", e),
            }
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), String> {
        for (name, t) in [
            ("gemini", self.gemini.temperature),
            ("deepseek", self.deepseek.temperature),
        ] {
            if !(0.0..=2.0).contains(&t) {
                return Err(format!("{name}.temperature must be between 0.0 and 2.0"));
            }
        }

        if self.gemini.base_url.is_empty() || self.deepseek.base_url.is_empty() {
            return Err("provider base_url cannot be empty".to_string());
        }

        let p = &self.placeholders;
        for (name, val) in [
            ("word", &p.word),
            ("definition", &p.definition),
            ("example_sentence", &p.example_sentence),
            ("mnemonic", &p.mnemonic),
        ] {
            if val.trim().is_empty() {
                return Err(format!("placeholders.{name} cannot be blank"));
            }
        }

        Ok(())
    }

    /// Get request timeout as Duration. A zero timeout is treated as unset.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.http
            .timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Build the shared HTTP client used by both transports
    pub fn http_client(&self) -> reqwest::Client {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout() {
            builder = builder.timeout(timeout);
        }
        builder.build().unwrap_or_else(|e| {
            tracing::warn!("Failed to build HTTP client: {} - using defaults", e);
            reqwest::Client::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_are_valid() {
        let cfg = Config::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.default_provider, Provider::Gemini);
        assert_eq!(cfg.placeholders.definition, "AI 未提供解釋");
        assert_eq!(cfg.request_timeout(), None);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
default_provider: deepseek
deepseek:
  model: deepseek-reasoner
placeholders:
  definition: "(no definition)"
"#;
        let cfg: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.default_provider, Provider::DeepSeek);
        assert_eq!(cfg.deepseek.model, "deepseek-reasoner");
        assert_eq!(cfg.deepseek.base_url, "https://api.deepseek.com");
        assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
        assert_eq!(cfg.placeholders.definition, "(no definition)");
        assert_eq!(cfg.placeholders.mnemonic, "AI 未提供記憶法");
    }

    #[test]
    fn test_validate_rejects_blank_placeholder() {
        let mut cfg = Config::default();
        cfg.placeholders.word = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_temperature() {
        let mut cfg = Config::default();
        cfg.deepseek.temperature = 3.5;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let cfg = Config::from_path("/nonexistent/vocab-forge.yaml");
        assert_eq!(cfg.gemini.base_url, GeminiConfig::default().base_url);
    }

    #[test]
    fn test_env_overrides_apply() {
        let mut cfg = Config::default();
        cfg.apply_env_overrides_from(&vars(&[
            ("VF_PROVIDER", "deepseek"),
            ("GEMINI_MODEL", "gemini-2.5-pro"),
            ("GEMINI_BASE_URL", "http://localhost:9000/v1beta"),
            ("DEEPSEEK_MODEL", "deepseek-reasoner"),
            ("DEEPSEEK_BASE_URL", "http://localhost:9001"),
            ("VF_HTTP_TIMEOUT_SECS", "30"),
        ]));

        assert_eq!(cfg.default_provider, Provider::DeepSeek);
        assert_eq!(cfg.gemini.model, "gemini-2.5-pro");
        assert_eq!(cfg.gemini.base_url, "http://localhost:9000/v1beta");
        assert_eq!(cfg.deepseek.model, "deepseek-reasoner");
        assert_eq!(cfg.deepseek.base_url, "http://localhost:9001");
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_invalid_env_overrides_are_ignored() {
        let mut cfg = Config::default();
        cfg.http.timeout_secs = Some(10);
        cfg.apply_env_overrides_from(&vars(&[
            ("VF_PROVIDER", "openai"),
            ("VF_HTTP_TIMEOUT_SECS", "soon"),
        ]));

        assert_eq!(cfg.default_provider, Provider::Gemini);
        assert_eq!(cfg.http.timeout_secs, Some(10));
    }

    #[test]
    fn test_no_env_overrides_keeps_file_values() {
        let mut cfg: Config =
            serde_yaml::from_str("deepseek:\n  model: deepseek-reasoner\n").unwrap();
        cfg.apply_env_overrides_from(&vars(&[]));
        assert_eq!(cfg.deepseek.model, "deepseek-reasoner");
        assert_eq!(cfg.gemini.model, "gemini-2.5-flash");
    }

    #[test]
    fn test_zero_timeout_means_unset() {
        let mut cfg = Config::default();
        cfg.http.timeout_secs = Some(0);
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.request_timeout(), None);

        let mut cfg = Config::default();
        cfg.http.timeout_secs = Some(15);
        cfg.apply_env_overrides_from(&vars(&[("VF_HTTP_TIMEOUT_SECS", "0")]));
        assert_eq!(cfg.http.timeout_secs, None);
    }

    #[tokio::test]
    async fn test_zero_timeout_client_completes_requests() {
        use wiremock::matchers::method;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let mut cfg = Config::default();
        cfg.http.timeout_secs = Some(0);
        let response = cfg.http_client().get(server.uri()).send().await.unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }
}
