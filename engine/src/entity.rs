//! Entity types and their partition / identity rules.
//!
//! Each [`EntityType`] is bound to one static [`EntityRule`]: the class that
//! admits a resource into its partition, the predicates followed one hop to
//! pull in the statements its key needs, the [`KeyPolicy`] that derives the
//! key, and the [`MergeMode`] that decides what the canonical IRI is.
//! A [`Registry`] holds the rules in partition precedence order.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{DedupError, Result};
use crate::vocab::Vocabulary;

/// A bibliographic entity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntityType {
    /// `bf:Person`.
    Person,
    /// `bf:Family`.
    Family,
    /// `bf:Organization`.
    Organization,
    /// `bf:Jurisdiction`.
    Jurisdiction,
    /// `bf:Meeting`.
    Meeting,
    /// `bf:Place`.
    Place,
    /// `bf:Topic`.
    Topic,
    /// `bf:Event`.
    Event,
    /// `bf:HeldItem`.
    HeldItem,
    /// `bf:Instance`.
    Instance,
    /// `bf:Work`.
    Work,
    /// `bf:Title`.
    Title,
    /// `bf:Identifier`.
    Identifier,
    /// `madsrdf:Authority`.
    Authority,
}

impl EntityType {
    /// Every type in default partition precedence order, most specific first.
    pub const DEFAULT_ORDER: [EntityType; 14] = [
        EntityType::Person,
        EntityType::Family,
        EntityType::Organization,
        EntityType::Jurisdiction,
        EntityType::Meeting,
        EntityType::Place,
        EntityType::Topic,
        EntityType::Event,
        EntityType::HeldItem,
        EntityType::Instance,
        EntityType::Work,
        EntityType::Title,
        EntityType::Identifier,
        EntityType::Authority,
    ];

    /// Stable name, used for partition file names, mint domains and config.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            EntityType::Person => "Person",
            EntityType::Family => "Family",
            EntityType::Organization => "Organization",
            EntityType::Jurisdiction => "Jurisdiction",
            EntityType::Meeting => "Meeting",
            EntityType::Place => "Place",
            EntityType::Topic => "Topic",
            EntityType::Event => "Event",
            EntityType::HeldItem => "HeldItem",
            EntityType::Instance => "Instance",
            EntityType::Work => "Work",
            EntityType::Title => "Title",
            EntityType::Identifier => "Identifier",
            EntityType::Authority => "Authority",
        }
    }

    /// Class IRI that admits a resource into this type's partition.
    #[must_use]
    pub fn class_iri(self) -> String {
        match self {
            EntityType::Authority => Vocabulary::mads_class("Authority"),
            other => Vocabulary::bf_class(other.as_str()),
        }
    }

    /// The key policy for this type.
    #[must_use]
    pub fn key_policy(self) -> KeyPolicy {
        match self {
            EntityType::Person
            | EntityType::Family
            | EntityType::Organization
            | EntityType::Jurisdiction
            | EntityType::Meeting
            | EntityType::Place => KeyPolicy::Agent,
            EntityType::Topic => KeyPolicy::Topic,
            EntityType::Work => KeyPolicy::HashAccessPoint,
            EntityType::Instance => KeyPolicy::SystemNumber,
            EntityType::HeldItem => KeyPolicy::HeldItem,
            EntityType::Event | EntityType::Title | EntityType::Identifier | EntityType::Authority => {
                KeyPolicy::None
            }
        }
    }

    /// The merge mode for this type.
    #[must_use]
    pub fn merge_mode(self) -> MergeMode {
        match self.key_policy() {
            KeyPolicy::None => MergeMode::Unique,
            KeyPolicy::SystemNumber => MergeMode::Additive,
            _ => MergeMode::Substitutive,
        }
    }

    /// Predicates followed one hop out of a resource of this type when
    /// partitioning, so its key can be computed from its partition alone.
    #[must_use]
    pub fn hop_predicates(self, vocab: &Vocabulary) -> Vec<String> {
        match self {
            EntityType::Person
            | EntityType::Family
            | EntityType::Organization
            | EntityType::Jurisdiction
            | EntityType::Meeting
            | EntityType::Place => vec![vocab.has_authority.clone()],
            EntityType::Topic => vec![
                vocab.has_authority.clone(),
                vocab.system_number.clone(),
                vocab.identifier.clone(),
            ],
            EntityType::Work => vec![
                vocab.work_title.clone(),
                vocab.has_authority.clone(),
                vocab.identifier.clone(),
            ],
            EntityType::Instance => vec![
                vocab.instance_title.clone(),
                vocab.system_number.clone(),
                vocab.identifier.clone(),
            ],
            EntityType::HeldItem => vec![vocab.system_number.clone(), vocab.identifier.clone()],
            EntityType::Event | EntityType::Title | EntityType::Identifier | EntityType::Authority => {
                Vec::new()
            }
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for EntityType {
    type Err = DedupError;

    fn from_str(s: &str) -> Result<Self> {
        EntityType::DEFAULT_ORDER
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DedupError::Config {
                reason: format!("unknown entity type '{s}'"),
            })
    }
}

/// How an identity key is derived from a resource's submodel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Authorized access point, then label; normalized, subdivisions cut.
    Agent,
    /// External code, then scheme + label, then label.
    Topic,
    /// The exact `@x-bf-hash` access point literal.
    HashAccessPoint,
    /// An external bibliographic system IRI.
    SystemNumber,
    /// Shelf marks, barcode, item id, then scheme + shelf mark; verbatim.
    HeldItem,
    /// Never keyed.
    None,
}

/// What the canonical IRI of a key is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Duplicates are replaced by the canonical IRI; external keys win.
    Substitutive,
    /// The first local IRI stays canonical and an equivalence to the external
    /// key is inferred.
    Additive,
    /// Never merged.
    Unique,
}

/// The partition and identity rule of one entity type.
#[derive(Debug, Clone)]
pub struct EntityRule {
    /// The type.
    pub entity_type: EntityType,
    /// Admitting class IRI.
    pub class: String,
    /// One-hop predicates.
    pub hops: Vec<String>,
    /// Key policy.
    pub policy: KeyPolicy,
    /// Merge mode.
    pub merge: MergeMode,
}

impl EntityRule {
    /// Builds the rule for `entity_type`.
    #[must_use]
    pub fn new(entity_type: EntityType, vocab: &Vocabulary) -> Self {
        Self {
            entity_type,
            class: entity_type.class_iri(),
            hops: entity_type.hop_predicates(vocab),
            policy: entity_type.key_policy(),
            merge: entity_type.merge_mode(),
        }
    }
}

/// Entity rules in partition precedence order.
#[derive(Debug, Clone)]
pub struct Registry {
    rules: Vec<EntityRule>,
}

impl Registry {
    /// Builds a registry from an explicit precedence order.
    ///
    /// # Errors
    ///
    /// Returns [`DedupError::Config`] if the order is empty or names a type
    /// twice.
    pub fn new(order: &[EntityType], vocab: &Vocabulary) -> Result<Self> {
        if order.is_empty() {
            return Err(DedupError::Config {
                reason: "partition order names no entity types".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for t in order {
            if !seen.insert(*t) {
                return Err(DedupError::Config {
                    reason: format!("entity type '{t}' appears twice in the partition order"),
                });
            }
        }
        Ok(Self {
            rules: order.iter().map(|t| EntityRule::new(*t, vocab)).collect(),
        })
    }

    /// The registry with every type in default precedence order.
    #[must_use]
    pub fn standard(vocab: &Vocabulary) -> Self {
        Self {
            rules: EntityType::DEFAULT_ORDER
                .iter()
                .map(|t| EntityRule::new(*t, vocab))
                .collect(),
        }
    }

    /// Rules in precedence order.
    #[must_use]
    pub fn rules(&self) -> &[EntityRule] {
        &self.rules
    }

    /// The rule for `entity_type`, if registered.
    #[must_use]
    pub fn rule(&self, entity_type: EntityType) -> Option<&EntityRule> {
        self.rules.iter().find(|r| r.entity_type == entity_type)
    }

    /// Registered types in precedence order.
    pub fn types(&self) -> impl Iterator<Item = EntityType> + '_ {
        self.rules.iter().map(|r| r.entity_type)
    }
}
