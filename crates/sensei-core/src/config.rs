//! Layered configuration and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars
//! (double underscore separates nesting: `APP_EMBEDDING__PROVIDER=hash`).
//! Every key has a default, so an empty environment still yields usable
//! [`Settings`].
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::Error;

pub struct Config {
    figment: Figment,
    env_name: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let config = Self::load_for_env(&env_name);
        config.settings()?;
        Ok(config)
    }

    pub fn load_for_env(env_name: &str) -> Self {
        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Self { figment, env_name: env_name.to_string() }
    }

    pub fn env_name(&self) -> &str {
        &self.env_name
    }

    /// Extract and validate the typed settings tree.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let settings: Settings = self
            .figment
            .extract()
            .map_err(|e| anyhow::anyhow!("Failed to load settings for '{}': {}", self.env_name, e))?;
        settings.validate()?;
        Ok(settings)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub corpus: CorpusSettings,
    pub embedding: EmbeddingSettings,
    pub vector: VectorSettings,
    pub ingest: IngestSettings,
    pub retrieval: RetrievalSettings,
    pub generation: GenerationSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        let invalid = |msg: String| Err(Error::InvalidConfig(msg));
        if self.ingest.batch_size == 0 {
            return invalid("ingest.batch_size must be > 0".into());
        }
        if self.ingest.chunk_size == 0 {
            return invalid("ingest.chunk_size must be > 0".into());
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            return invalid(format!(
                "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
                self.ingest.chunk_overlap, self.ingest.chunk_size
            ));
        }
        if self.retrieval.k == 0 {
            return invalid("retrieval.k must be > 0".into());
        }
        if self.embedding.selected_dim() == 0 {
            return invalid(format!("embedding dimension for provider '{}' must be > 0", self.embedding.provider));
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return invalid(format!("generation.temperature {} is outside 0..=2", self.generation.temperature));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    pub root: String,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self { root: "data".to_string() }
    }
}

impl CorpusSettings {
    pub fn root_path(&self) -> PathBuf {
        expand_path(&self.root)
    }
}

/// Which embedding backend serves the process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    Remote,
    Local,
    /// Deterministic token-hash vectors; no model, no network.
    Hash,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Remote => "remote",
            Self::Local => "local",
            Self::Hash => "hash",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub provider: ProviderKind,
    pub remote_model: String,
    pub remote_dim: usize,
    pub api_base: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub local_model_id: String,
    pub local_model_dir: Option<String>,
    pub local_dim: usize,
    pub hash_dim: usize,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Remote,
            remote_model: "text-embedding-3-small".to_string(),
            remote_dim: 1536,
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 30,
            local_model_id: "sentence-transformers/all-MiniLM-L6-v2".to_string(),
            local_model_dir: None,
            local_dim: 384,
            hash_dim: 384,
        }
    }
}

impl EmbeddingSettings {
    /// Vector width of the selected provider.
    pub fn selected_dim(&self) -> usize {
        match self.provider {
            ProviderKind::Remote => self.remote_dim,
            ProviderKind::Local => self.local_dim,
            ProviderKind::Hash => self.hash_dim,
        }
    }

    /// `local_model_dir` if set, else `models/<last segment of local_model_id>`.
    pub fn local_model_path(&self) -> PathBuf {
        if let Some(dir) = &self.local_model_dir {
            return expand_path(dir);
        }
        let name = self.local_model_id.rsplit('/').next().unwrap_or(&self.local_model_id);
        PathBuf::from("models").join(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorSettings {
    /// LanceDB directory or URI.
    pub uri: String,
    pub collection_prefix: String,
    /// Explicit collection name; bypasses provider namespacing.
    pub collection: Option<String>,
    /// How stale a long-lived table handle may get before it re-checks for
    /// writes from other processes. 0 re-checks on every read.
    pub read_consistency_secs: u64,
}

impl Default for VectorSettings {
    fn default() -> Self {
        Self {
            uri: "data/lancedb".to_string(),
            collection_prefix: "dsa_docs".to_string(),
            collection: None,
            read_consistency_secs: 5,
        }
    }
}

impl VectorSettings {
    pub fn uri_path(&self) -> String {
        if self.uri.contains("://") {
            return self.uri.clone();
        }
        expand_path(&self.uri).to_string_lossy().to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestSettings {
    pub batch_size: usize,
    pub max_chunks: Option<usize>,
    pub batch_delay_ms: Option<u64>,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self { batch_size: 4, max_chunks: None, batch_delay_ms: None, chunk_size: 500, chunk_overlap: 50 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub k: usize,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self { k: 3 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub model: String,
    pub api_base: String,
    pub api_key_env: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        settings.validate().expect("defaults validate");
        assert_eq!(settings.retrieval.k, 3);
        assert_eq!(settings.ingest.batch_size, 4);
        assert_eq!(settings.embedding.selected_dim(), 1536);
    }

    #[test]
    fn files_and_env_are_layered() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [embedding]
                provider = "local"
                [ingest]
                batch_size = 8
                "#,
            )?;
            jail.create_file("config.test.toml", "[retrieval]\nk = 5\n")?;
            jail.set_env("APP_INGEST__MAX_CHUNKS", "20");
            jail.set_env("APP_VECTOR__READ_CONSISTENCY_SECS", "0");
            let config = Config::load_for_env("test");
            assert_eq!(config.env_name(), "test");
            let settings = config.settings().map_err(|e| e.to_string())?;
            assert_eq!(settings.vector.read_consistency_secs, 0);
            assert_eq!(settings.embedding.provider, ProviderKind::Local);
            assert_eq!(settings.embedding.selected_dim(), 384);
            assert_eq!(settings.ingest.batch_size, 8);
            assert_eq!(settings.ingest.max_chunks, Some(20));
            assert_eq!(settings.retrieval.k, 5);
            Ok(())
        });
    }

    #[test]
    fn overlap_not_below_size_is_rejected() {
        let mut settings = Settings::default();
        settings.ingest.chunk_overlap = settings.ingest.chunk_size;
        let err = settings.validate().expect_err("must reject");
        assert!(matches!(err, Error::InvalidConfig(_)));
    }

    #[test]
    fn local_model_path_defaults_under_models() {
        let settings = EmbeddingSettings::default();
        assert_eq!(settings.local_model_path(), PathBuf::from("models/all-MiniLM-L6-v2"));
    }
}
