//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `GASTRO_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::constants::DEFAULT_LLM_TIMEOUT_SECS;

/// Server configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `GASTRO_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port. Default: `8080`.
    pub port: u16,

    /// IP address to bind to. Default: `127.0.0.1`.
    pub bind_addr: IpAddr,

    /// Recipe metadata table (JSON Lines). Default: `./data/recipes.jsonl`.
    pub corpus_path: PathBuf,

    /// Precomputed recipe embedding matrix. Default: `./data/embeddings.bin`.
    pub embeddings_path: PathBuf,

    /// Directory holding the sentence-embedding model (safetensors + tokenizer).
    /// Absent: the embedder runs in stub mode.
    pub embedder_path: Option<PathBuf>,

    /// Directory holding the cross-encoder model. Absent: stub mode.
    pub reranker_path: Option<PathBuf>,

    /// Bound on a single generative-model call, in seconds. Default: `120`.
    pub llm_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
            corpus_path: PathBuf::from("./data/recipes.jsonl"),
            embeddings_path: PathBuf::from("./data/embeddings.bin"),
            embedder_path: None,
            reranker_path: None,
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
        }
    }
}

impl Config {
    const ENV_PORT: &'static str = "GASTRO_PORT";
    const ENV_BIND_ADDR: &'static str = "GASTRO_BIND_ADDR";
    const ENV_CORPUS_PATH: &'static str = "GASTRO_CORPUS_PATH";
    const ENV_EMBEDDINGS_PATH: &'static str = "GASTRO_EMBEDDINGS_PATH";
    const ENV_EMBEDDER_PATH: &'static str = "GASTRO_EMBEDDER_PATH";
    const ENV_RERANKER_PATH: &'static str = "GASTRO_RERANKER_PATH";
    const ENV_LLM_TIMEOUT_SECS: &'static str = "GASTRO_LLM_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = Self::parse_port_from_env(defaults.port)?;
        let bind_addr = Self::parse_bind_addr_from_env(defaults.bind_addr)?;
        let corpus_path = Self::parse_path_from_env(Self::ENV_CORPUS_PATH, defaults.corpus_path);
        let embeddings_path =
            Self::parse_path_from_env(Self::ENV_EMBEDDINGS_PATH, defaults.embeddings_path);
        let embedder_path = Self::parse_optional_path_from_env(Self::ENV_EMBEDDER_PATH);
        let reranker_path = Self::parse_optional_path_from_env(Self::ENV_RERANKER_PATH);
        let llm_timeout_secs =
            Self::parse_u64_from_env(Self::ENV_LLM_TIMEOUT_SECS, defaults.llm_timeout_secs);

        Ok(Self {
            port,
            bind_addr,
            corpus_path,
            embeddings_path,
            embedder_path,
            reranker_path,
            llm_timeout_secs,
        })
    }

    /// Validates paths and basic invariants (does not create anything).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for path in [&self.corpus_path, &self.embeddings_path] {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_file() {
                return Err(ConfigError::NotAFile { path: path.clone() });
            }
        }

        for path in [&self.embedder_path, &self.reranker_path]
            .into_iter()
            .flatten()
        {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        Ok(())
    }

    /// Returns `"{bind_addr}:{port}"` (useful for logging/binding).
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }

    fn parse_port_from_env(default: u16) -> Result<u16, ConfigError> {
        match env::var(Self::ENV_PORT) {
            Ok(value) => {
                let port: u16 = value.parse().map_err(|e| ConfigError::PortParseError {
                    value: value.clone(),
                    source: e,
                })?;

                if port == 0 {
                    return Err(ConfigError::InvalidPort { value });
                }

                Ok(port)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_bind_addr_from_env(default: IpAddr) -> Result<IpAddr, ConfigError> {
        match env::var(Self::ENV_BIND_ADDR) {
            Ok(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidBindAddr { value, source: e }),
            Err(_) => Ok(default),
        }
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name).map(PathBuf::from).unwrap_or(default)
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }
}
