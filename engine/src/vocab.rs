//! IRIs the engine interprets.
//!
//! The engine never reads predicate semantics beyond this table: class IRIs
//! for the partition rules, the predicates key policies read, and the
//! external namespaces whose IRIs count as dereferenceable identifiers.
//! A [`Vocabulary`] is built once per run and passed down explicitly.

/// Namespace IRIs.
pub mod ns {
    /// BIBFRAME 1.0 vocabulary.
    pub const BF: &str = "http://bibframe.org/vocab/";
    /// MADS/RDF.
    pub const MADSRDF: &str = "http://www.loc.gov/mads/rdf/v1#";
    /// RDF syntax.
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    /// RDF Schema.
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    /// OWL.
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
    /// OCLC FAST headings.
    pub const FAST: &str = "http://id.worldcat.org/fast/";
    /// WorldCat bibliographic records.
    pub const WORLDCAT: &str = "http://www.worldcat.org/oclc/";
}

/// Maps a prefixed identifier code (e.g. `(OCoLC)fst01234567`) onto an
/// external namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalScheme {
    /// Prefix stripped from the code, e.g. `"(OCoLC)"`.
    pub code_prefix: String,
    /// What must follow the prefix for the code to belong to this scheme,
    /// e.g. `"fst"`. Kept in the minted IRI.
    pub id_marker: String,
    /// Namespace the identifier is appended to.
    pub namespace: String,
}

impl ExternalScheme {
    /// Returns the external IRI for `code`, if the code belongs to this scheme.
    #[must_use]
    pub fn resolve(&self, code: &str) -> Option<String> {
        let id = code.trim().strip_prefix(self.code_prefix.as_str())?.trim();
        let rest = id.strip_prefix(self.id_marker.as_str())?;
        if rest.is_empty() || !rest.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(format!("{}{}", self.namespace, id))
    }
}

/// The IRIs the partitioner and key extractor use.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// `rdf:type`.
    pub rdf_type: String,
    /// `rdfs:label`.
    pub rdfs_label: String,
    /// `owl:sameAs`, used for inferred equivalence statements.
    pub owl_same_as: String,
    /// `bf:label`.
    pub label: String,
    /// `bf:authorizedAccessPoint`.
    pub authorized_access_point: String,
    /// Language tag marking a hash-ready access point.
    pub hash_language: String,
    /// `bf:hasAuthority`.
    pub has_authority: String,
    /// `madsrdf:authoritativeLabel`.
    pub authoritative_label: String,
    /// `madsrdf:isMemberOfMADSScheme`.
    pub mads_scheme: String,
    /// `bf:systemNumber`.
    pub system_number: String,
    /// `bf:identifier`.
    pub identifier: String,
    /// `bf:identifierValue`.
    pub identifier_value: String,
    /// `bf:workTitle`.
    pub work_title: String,
    /// `bf:instanceTitle`.
    pub instance_title: String,
    /// Shelf-mark predicates in key priority order (LCC, DDC, NLM, UDC).
    pub shelf_marks: Vec<String>,
    /// `bf:barcode`.
    pub barcode: String,
    /// `bf:itemId`.
    pub item_id: String,
    /// `bf:shelfMark`.
    pub shelf_mark: String,
    /// `bf:shelfMarkScheme`.
    pub shelf_mark_scheme: String,
    /// Code schemes mapped to external topic IRIs.
    pub topic_schemes: Vec<ExternalScheme>,
    /// Namespaces of external topic vocabularies (IRIs used as-is).
    pub topic_namespaces: Vec<String>,
    /// Namespaces of external bibliographic system identifiers.
    pub bibliographic_namespaces: Vec<String>,
}

fn bf(local: &str) -> String {
    format!("{}{}", ns::BF, local)
}

impl Vocabulary {
    /// The BIBFRAME 1.0 vocabulary with FAST and WorldCat as external
    /// namespaces.
    #[must_use]
    pub fn bibframe() -> Self {
        Self {
            rdf_type: format!("{}type", ns::RDF),
            rdfs_label: format!("{}label", ns::RDFS),
            owl_same_as: format!("{}sameAs", ns::OWL),
            label: bf("label"),
            authorized_access_point: bf("authorizedAccessPoint"),
            hash_language: "x-bf-hash".to_string(),
            has_authority: bf("hasAuthority"),
            authoritative_label: format!("{}authoritativeLabel", ns::MADSRDF),
            mads_scheme: format!("{}isMemberOfMADSScheme", ns::MADSRDF),
            system_number: bf("systemNumber"),
            identifier: bf("identifier"),
            identifier_value: bf("identifierValue"),
            work_title: bf("workTitle"),
            instance_title: bf("instanceTitle"),
            shelf_marks: vec![
                bf("shelfMarkLcc"),
                bf("shelfMarkDdc"),
                bf("shelfMarkNlm"),
                bf("shelfMarkUdc"),
            ],
            barcode: bf("barcode"),
            item_id: bf("itemId"),
            shelf_mark: bf("shelfMark"),
            shelf_mark_scheme: bf("shelfMarkScheme"),
            topic_schemes: vec![ExternalScheme {
                code_prefix: "(OCoLC)".to_string(),
                id_marker: "fst".to_string(),
                namespace: ns::FAST.to_string(),
            }],
            topic_namespaces: vec![ns::FAST.to_string()],
            bibliographic_namespaces: vec![ns::WORLDCAT.to_string()],
        }
    }

    /// Class IRI for a BIBFRAME class local name.
    #[must_use]
    pub fn bf_class(local: &str) -> String {
        bf(local)
    }

    /// Class IRI for a MADS/RDF class local name.
    #[must_use]
    pub fn mads_class(local: &str) -> String {
        format!("{}{}", ns::MADSRDF, local)
    }

    /// Returns true if `iri` is in a recognized external topic namespace.
    #[must_use]
    pub fn is_external_topic(&self, iri: &str) -> bool {
        self.topic_namespaces.iter().any(|n| iri.starts_with(n.as_str()))
    }

    /// Returns true if `iri` is in a recognized bibliographic system namespace.
    #[must_use]
    pub fn is_bibliographic_system(&self, iri: &str) -> bool {
        self.bibliographic_namespaces
            .iter()
            .any(|n| iri.starts_with(n.as_str()) && iri.len() > n.len())
    }

    /// Resolves a topic code such as `(OCoLC)fst01234567` to an external IRI.
    #[must_use]
    pub fn resolve_topic_code(&self, code: &str) -> Option<String> {
        self.topic_schemes.iter().find_map(|s| s.resolve(code))
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::bibframe()
    }
}
