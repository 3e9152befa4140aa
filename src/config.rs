use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::Language;
use crate::qa::PredicateCatalog;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub factqa: FactqaConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Extra catalog entries layered over the built-in ones.
    #[serde(default)]
    pub predicates: Vec<PredicateConfig>,
}

/// Index location and question defaults
#[derive(Debug, Clone, Deserialize)]
pub struct FactqaConfig {
    /// Directory holding one `<name>.db` file per index.
    pub index_root: PathBuf,
    #[serde(default = "default_index")]
    pub default_index: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Line protocol server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_lookup_timeout_ms")]
    pub lookup_timeout_ms: u64,
    #[serde(default = "default_cache_capacity")]
    pub lookup_cache_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            lookup_timeout_ms: default_lookup_timeout_ms(),
            lookup_cache_capacity: default_cache_capacity(),
        }
    }
}

/// Dump ingestion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_object_len")]
    pub max_object_len: usize,
    /// Keep only these predicates; empty keeps everything.
    #[serde(default)]
    pub predicates: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_object_len: default_max_object_len(),
            predicates: Vec::new(),
        }
    }
}

/// One `[[predicates]]` entry
#[derive(Debug, Clone, Deserialize)]
pub struct PredicateConfig {
    pub term: String,
    pub predicate: String,
    pub collection: Option<String>,
}

fn default_index() -> String {
    "index".to_string()
}

fn default_language() -> String {
    crate::model::DEFAULT_LANGUAGE.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_lookup_timeout_ms() -> u64 {
    5000
}

fn default_cache_capacity() -> usize {
    1000
}

fn default_batch_size() -> usize {
    1000
}

fn default_max_object_len() -> usize {
    512
}

/// Database file for index `name` under `root`.
///
/// `None` when the name is empty or could escape `root`.
pub fn index_file(root: &Path, name: &str) -> Option<PathBuf> {
    let invalid = name.is_empty() || name.contains(|c: char| c == '/' || c == '\\') || name.starts_with('.');
    if invalid {
        None
    } else {
        Some(root.join(format!("{}.db", name)))
    }
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in FACTQA_CONFIG environment variable
    /// 2. ./config.toml in current directory
    pub fn load() -> Result<Self> {
        // .env is optional
        let _ = dotenv::dotenv();

        let config_path = std::env::var("FACTQA_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_file(&config_path)
    }

    /// Load and validate a specific config file
    pub fn from_file(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.factqa.language.trim_start_matches('@').is_empty() {
            anyhow::bail!("factqa.language must name a language tag, e.g. \"@en\"");
        }

        if index_file(&self.factqa.index_root, &self.factqa.default_index).is_none() {
            anyhow::bail!(
                "factqa.default_index is not a valid index name: {:?}",
                self.factqa.default_index
            );
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be greater than 0");
        }

        if self.server.lookup_timeout_ms == 0 {
            anyhow::bail!("server.lookup_timeout_ms must be greater than 0");
        }

        if self.ingest.batch_size == 0 {
            anyhow::bail!("ingest.batch_size must be greater than 0");
        }

        if self.ingest.max_object_len == 0 {
            anyhow::bail!("ingest.max_object_len must be greater than 0");
        }

        for entry in &self.predicates {
            if entry.term.trim().is_empty() || entry.predicate.trim().is_empty() {
                anyhow::bail!("[[predicates]] entries need a non-empty term and predicate");
            }
        }

        Ok(())
    }

    /// Directory holding the index databases
    pub fn index_root(&self) -> &Path {
        &self.factqa.index_root
    }

    /// Database path of a named index
    pub fn index_path(&self, name: &str) -> Result<PathBuf> {
        index_file(&self.factqa.index_root, name)
            .with_context(|| format!("Invalid index name: {:?}", name))
    }

    pub fn language(&self) -> Language {
        Language::new(&self.factqa.language)
    }

    /// Built-in catalog extended with the configured entries
    pub fn catalog(&self) -> PredicateCatalog {
        let mut catalog = PredicateCatalog::seeded();
        for entry in &self.predicates {
            match &entry.collection {
                Some(collection) => catalog.register_with_collection(&entry.term, &entry.predicate, collection),
                None => catalog.register(&entry.term, &entry.predicate),
            }
        }
        catalog
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.server.lookup_timeout_ms)
    }

    /// `bind:port` for the line protocol listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}
