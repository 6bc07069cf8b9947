use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.yaml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: String, reason: String },
}

impl ConfigError {
    fn invalid(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub data_dir: PathBuf,
    pub seeding: SeedingConfig,
    pub vector_store: VectorStoreConfig,
    pub embedding: EmbeddingConfig,
    pub history: HistoryConfig,
    pub retrieval: RetrievalConfig,
    pub llm: LlmConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SeedingConfig {
    pub force: bool,
    pub claim_ttl_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Qdrant,
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VectorStoreConfig {
    pub backend: Backend,
    pub url: String,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub backend: Backend,
    pub redis_url: String,
    pub window: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub providers: Vec<ProviderConfig>,
    pub temperature: f64,
    pub max_tokens: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub expose_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            cors: CorsConfig::default(),
            data_dir: PathBuf::from("data"),
            seeding: SeedingConfig::default(),
            vector_store: VectorStoreConfig::default(),
            embedding: EmbeddingConfig::default(),
            history: HistoryConfig::default(),
            retrieval: RetrievalConfig::default(),
            llm: LlmConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for SeedingConfig {
    fn default() -> Self {
        Self {
            force: true,
            claim_ttl_seconds: 600,
        }
    }
}

impl Default for VectorStoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Qdrant,
            url: "http://localhost:6334".to_string(),
            api_key: None,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Redis,
            redis_url: "redis://localhost:6379".to_string(),
            window: crate::domain::DEFAULT_WINDOW,
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            providers: vec![ProviderConfig {
                provider: "openai".to_string(),
                model: "gpt-3.5-turbo".to_string(),
            }],
            temperature: 0.0,
            max_tokens: 250,
            timeout_seconds: 30,
        }
    }
}

impl AppConfig {
    /// Reads the YAML file at `path` (defaults when it does not exist), then
    /// applies environment overrides and validates the result.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_yaml(&raw)?
        } else {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::invalid("SERVER_PORT", format!("'{port}' is not a port")))?;
        }
        if let Some(dir) = lookup("DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(url) = lookup("QDRANT_URL") {
            self.vector_store.url = url;
        }
        if let Some(key) = lookup("QDRANT_API_KEY") {
            self.vector_store.api_key = Some(key);
        }
        if let Some(url) = lookup("REDIS_URL") {
            self.history.redis_url = url;
        }
        if let Some(force) = lookup("ENABLE_FORCE_SEED") {
            self.seeding.force = parse_bool("ENABLE_FORCE_SEED", &force)?;
        }
        if let Some(backend) = lookup("VECTOR_BACKEND") {
            self.vector_store.backend = parse_backend("VECTOR_BACKEND", &backend)?;
        }
        if let Some(backend) = lookup("HISTORY_BACKEND") {
            self.history.backend = parse_backend("HISTORY_BACKEND", &backend)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !matches!(self.vector_store.backend, Backend::Qdrant | Backend::Memory) {
            return Err(ConfigError::invalid("vector_store.backend", "must be qdrant or memory"));
        }
        if !matches!(self.history.backend, Backend::Redis | Backend::Memory) {
            return Err(ConfigError::invalid("history.backend", "must be redis or memory"));
        }
        if self.history.window == 0 {
            return Err(ConfigError::invalid("history.window", "must be at least 1"));
        }
        if self.retrieval.top_k == 0 {
            return Err(ConfigError::invalid("retrieval.top_k", "must be at least 1"));
        }
        if self.llm.providers.is_empty() {
            return Err(ConfigError::invalid("llm.providers", "at least one provider is required"));
        }
        Ok(())
    }

    pub fn uses_redis(&self) -> bool {
        self.history.backend == Backend::Redis
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::invalid(key, format!("'{other}' is not a boolean"))),
    }
}

fn parse_backend(key: &str, raw: &str) -> Result<Backend, ConfigError> {
    serde_yaml::from_str(&raw.trim().to_ascii_lowercase())
        .map_err(|_| ConfigError::invalid(key, format!("unknown backend '{raw}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history.window, 5);
        assert_eq!(config.retrieval.top_k, 4);
        assert!(config.seeding.force);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml(
            "data_dir: /srv/kb\nhistory:\n  backend: memory\nllm:\n  providers:\n    - provider: anthropic\n      model: claude-3-5-haiku-latest\n",
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/kb"));
        assert_eq!(config.history.backend, Backend::Memory);
        assert_eq!(config.history.window, 5);
        assert_eq!(config.llm.providers[0].provider, "anthropic");
        assert_eq!(config.llm.max_tokens, 250);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("SERVER_PORT", "9000"),
            ("ENABLE_FORCE_SEED", "false"),
            ("VECTOR_BACKEND", "Memory"),
            ("REDIS_URL", "redis://cache:6379"),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(!config.seeding.force);
        assert_eq!(config.vector_store.backend, Backend::Memory);
        assert_eq!(config.history.redis_url, "redis://cache:6379");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(|key| (key == "SERVER_PORT").then(|| "http".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let mut config = AppConfig::default();
        config.history.window = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.vector_store.backend = Backend::Redis;
        assert!(config.validate().is_err());
    }
}
