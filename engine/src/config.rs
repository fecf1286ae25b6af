//! Run configuration.
//!
//! [`Config`] is read from an optional TOML file; every field has a default
//! so an empty file (or no file) is a valid configuration. [`Context`] is
//! the immutable bundle the pipeline stages receive: vocabulary, registry,
//! compiled NACO tables and minting settings.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::{EntityType, Registry};
use crate::error::{DedupError, Result};
use crate::normalize::{NacoTable, DEFAULT_SUBDIVISION_DELIMITERS};
use crate::vocab::{ns, Vocabulary};

/// Default processing namespace for local resources.
pub const DEFAULT_LOCAL_NAMESPACE: &str = "http://data.example.org/";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Local namespace and minting.
    pub namespace: NamespaceConfig,
    /// Partition precedence.
    pub partition: PartitionConfig,
    /// Label normalization.
    pub normalize: NormalizeConfig,
    /// External identifier namespaces.
    pub external: ExternalConfig,
}

/// Local namespace and minting settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamespaceConfig {
    /// Namespace of resources subject to dedup; also the minting namespace.
    pub local: String,
    /// Letters placed between the namespace and the hash digest.
    pub mint_prefix: String,
    /// Mint hash IRIs for label keys. When false the first-seen local IRI
    /// is canonical.
    pub mint: bool,
}

impl Default for NamespaceConfig {
    fn default() -> Self {
        Self {
            local: DEFAULT_LOCAL_NAMESPACE.to_string(),
            mint_prefix: "n".to_string(),
            mint: true,
        }
    }
}

/// Partition settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartitionConfig {
    /// Entity type names, most specific first.
    pub order: Vec<String>,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            order: EntityType::DEFAULT_ORDER
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
        }
    }
}

/// Normalization settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeConfig {
    /// Strings that start a subdivision in an agent access point.
    pub subdivision_delimiters: Vec<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            subdivision_delimiters: DEFAULT_SUBDIVISION_DELIMITERS
                .iter()
                .map(|d| (*d).to_string())
                .collect(),
        }
    }
}

/// External namespaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExternalConfig {
    /// Namespace FAST topic codes resolve into.
    pub fast_namespace: String,
    /// WorldCat bibliographic record namespace.
    pub worldcat_namespace: String,
    /// Further bibliographic system namespaces recognized on instances.
    pub bibliographic_namespaces: Vec<String>,
}

impl Default for ExternalConfig {
    fn default() -> Self {
        Self {
            fast_namespace: ns::FAST.to_string(),
            worldcat_namespace: ns::WORLDCAT.to_string(),
            bibliographic_namespaces: Vec::new(),
        }
    }
}

impl Config {
    /// Parses a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Config`] on invalid TOML or unknown keys.
    pub fn from_toml_str(src: &str) -> Result<Self> {
        toml::from_str(src).map_err(|e| DedupError::Config {
            reason: e.to_string(),
        })
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Config`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let src = std::fs::read_to_string(path).map_err(|e| DedupError::Config {
            reason: format!("cannot read {}: {e}", path.display()),
        })?;
        Self::from_toml_str(&src)
    }

    /// The partition order as entity types.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Config`] for unknown type names.
    pub fn entity_order(&self) -> Result<Vec<EntityType>> {
        self.partition.order.iter().map(|s| s.parse()).collect()
    }

    /// The vocabulary with this configuration's external namespaces applied.
    #[must_use]
    pub fn vocabulary(&self) -> Vocabulary {
        let mut vocab = Vocabulary::bibframe();
        for scheme in &mut vocab.topic_schemes {
            scheme.namespace = self.external.fast_namespace.clone();
        }
        vocab.topic_namespaces = vec![self.external.fast_namespace.clone()];
        vocab.bibliographic_namespaces = std::iter::once(self.external.worldcat_namespace.clone())
            .chain(self.external.bibliographic_namespaces.iter().cloned())
            .collect();
        vocab
    }
}

/// Everything a pipeline stage needs, built once per run.
#[derive(Debug, Clone)]
pub struct Context {
    /// Interpreted IRIs.
    pub vocab: Vocabulary,
    /// Entity rules in precedence order.
    pub registry: Registry,
    /// Compiled normalization tables.
    pub naco: NacoTable,
    /// Namespace of dedup-eligible resources.
    pub local_namespace: String,
    /// Minted IRI prefix.
    pub mint_prefix: String,
    /// Whether label keys mint hash IRIs.
    pub mint: bool,
    /// Agent subdivision delimiters.
    pub subdivision_delimiters: Vec<String>,
}

impl Context {
    /// Builds the context for a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Config`] if the partition order is invalid or
    /// the local namespace is empty.
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.namespace.local.trim().is_empty() {
            return Err(DedupError::Config {
                reason: "namespace.local must not be empty".to_string(),
            });
        }
        let vocab = config.vocabulary();
        let registry = Registry::new(&config.entity_order()?, &vocab)?;
        Ok(Self {
            vocab,
            registry,
            naco: NacoTable::standard(),
            local_namespace: config.namespace.local.clone(),
            mint_prefix: config.namespace.mint_prefix.clone(),
            mint: config.namespace.mint,
            subdivision_delimiters: config.normalize.subdivision_delimiters.clone(),
        })
    }

    /// The default context for `local_namespace`.
    #[must_use]
    pub fn standard(local_namespace: &str) -> Self {
        let vocab = Vocabulary::bibframe();
        let registry = Registry::standard(&vocab);
        let defaults = Config::default();
        Self {
            vocab,
            registry,
            naco: NacoTable::standard(),
            local_namespace: local_namespace.to_string(),
            mint_prefix: defaults.namespace.mint_prefix,
            mint: defaults.namespace.mint,
            subdivision_delimiters: defaults.normalize.subdivision_delimiters,
        }
    }

    /// Returns true if `iri` is in the local namespace.
    #[must_use]
    pub fn is_local(&self, iri: &str) -> bool {
        iri.starts_with(self.local_namespace.as_str())
    }
}
