//! Per-partition resolution: identity keys to canonical IRIs.
//!
//! Resources of one type are visited in IRI order. The first resource seen
//! with a key fixes the key's canonical IRI; every later resource with the
//! same key maps to it. Authority resources follow their hosts through a
//! second map keyed by the host's key.
//!
//! The result of each partition is a [`Resolution`]: remapping entries,
//! inferred `owl:sameAs` statements, and a report. Resolutions of all
//! partitions are combined with [`Resolution::absorb`] before any file is
//! rewritten.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use tracing::{debug, info, warn};

use crate::config::Context;
use crate::entity::{EntityRule, EntityType, MergeMode};
use crate::error::{DedupError, Result};
use crate::key::{authority_label, extract_key, host_label, GraphIndex, IdentityKey};
use crate::mint::mint;
use crate::model::{Graph, Statement};
use crate::partition::Partition;
use crate::report::{Diagnostic, RunReport};

/// What [`RemappingTable::close`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Closure {
    /// Entries redirected to the end of their chain.
    pub collapsed: usize,
    /// IRIs whose chain runs into a cycle, in IRI order.
    pub cyclic: Vec<String>,
}

/// `original IRI -> canonical IRI`.
///
/// Pass-through entries (an IRI mapped to itself) are recorded for every
/// unmerged resource. They never conflict: a real remap of the same IRI
/// replaces a pass-through, and a pass-through never replaces a real remap.
/// Two different real remaps of one IRI keep the first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemappingTable {
    entries: BTreeMap<String, String>,
}

impl RemappingTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `original -> canonical`.
    ///
    /// Returns the canonical value that was kept instead, if the entry
    /// conflicts with an earlier one.
    pub fn insert(&mut self, original: &str, canonical: &str) -> Option<String> {
        match self.entries.get_mut(original) {
            None => {
                self.entries
                    .insert(original.to_owned(), canonical.to_owned());
                None
            }
            Some(existing) if existing == canonical => None,
            Some(existing) if existing == original => {
                *existing = canonical.to_owned();
                None
            }
            Some(_) if original == canonical => None,
            Some(existing) => Some(existing.clone()),
        }
    }

    /// The recorded canonical value of `iri`.
    #[must_use]
    pub fn get(&self, iri: &str) -> Option<&str> {
        self.entries.get(iri).map(String::as_str)
    }

    /// The canonical value of `iri`; `iri` itself if it has none.
    #[must_use]
    pub fn canonical<'a>(&'a self, iri: &'a str) -> &'a str {
        self.get(iri).unwrap_or(iri)
    }

    /// Number of entries, pass-through included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in IRI order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Entries that change their IRI.
    pub fn remaps(&self) -> impl Iterator<Item = (&str, &str)> {
        self.iter().filter(|(k, v)| k != v)
    }

    /// Follows chains of remaps so that no canonical value is itself
    /// remapped. Entries whose chain runs into a cycle are left as they
    /// were and listed in the returned [`Closure`].
    pub fn close(&mut self) -> Closure {
        let mut closure = Closure::default();
        let mut updates = Vec::new();
        for (original, canonical) in &self.entries {
            let mut target = canonical;
            let mut visited = HashSet::from([original, canonical]);
            let mut cyclic = false;
            while let Some(next) = self.entries.get(target) {
                if next == target {
                    break;
                }
                if !visited.insert(next) {
                    cyclic = true;
                    break;
                }
                target = next;
            }
            if cyclic {
                closure.cyclic.push(original.clone());
            } else if target != canonical {
                updates.push((original.clone(), target.clone()));
            }
        }
        closure.collapsed = updates.len();
        for (original, target) in updates {
            self.entries.insert(original, target);
        }
        closure
    }

    /// Serializes the remaps as `original\tcanonical` lines.
    #[must_use]
    pub fn to_tsv(&self) -> String {
        let mut out = String::new();
        for (original, canonical) in self.remaps() {
            out.push_str(original);
            out.push('\t');
            out.push_str(canonical);
            out.push('\n');
        }
        out
    }

    /// Parses the output of [`RemappingTable::to_tsv`].
    ///
    /// # Errors
    ///
    /// Returns the 1-based number and text of the first line without
    /// exactly two tab-separated fields.
    pub fn from_tsv(src: &str) -> std::result::Result<Self, String> {
        let mut table = Self::new();
        for (n, line) in src.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            match line.split_once('\t') {
                Some((original, canonical))
                    if !original.is_empty() && !canonical.is_empty() && !canonical.contains('\t') =>
                {
                    table
                        .entries
                        .insert(original.to_owned(), canonical.to_owned());
                }
                _ => return Err(format!("line {}: {line}", n + 1)),
            }
        }
        Ok(table)
    }
}

/// The outcome of resolving one or more partitions.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Remapping entries.
    pub table: RemappingTable,
    /// Inferred equivalence statements.
    pub inferred: Graph,
    /// Diagnostics and counters.
    pub report: RunReport,
}

impl Resolution {
    /// Creates an empty resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges another partition's resolution into this one. Entries that
    /// conflict with ones already held keep the held value and are reported.
    pub fn absorb(&mut self, other: Resolution) {
        for (original, canonical) in other.table.iter() {
            if let Some(kept) = self.table.insert(original, canonical) {
                warn!(original, kept = %kept, rejected = canonical, "conflicting remap across partitions");
                self.report.push(Diagnostic::warn_with_details(
                    "resolve",
                    format!("conflicting remap for <{original}>"),
                    vec![format!("kept <{kept}>"), format!("rejected <{canonical}>")],
                ));
            }
        }
        self.inferred.extend(other.inferred);
        self.report.extend(other.report);
        self.report.stats.inferred_statements = self.inferred.len();
    }
}

/// Loads a partition and resolves it.
///
/// # Errors
///
/// Returns [`DedupError::Setup`] if the partition file cannot be read
/// back, or [`DedupError::Config`] if its type is not registered.
pub fn resolve(partition: &Partition, ctx: &Context) -> Result<Resolution> {
    let graph = partition.load()?;
    let rule = ctx
        .registry
        .rule(partition.entity_type)
        .ok_or_else(|| DedupError::Config {
            reason: format!("no rule registered for '{}'", partition.entity_type),
        })?;
    Ok(resolve_graph(rule, &graph, ctx))
}

/// Canonical IRIs chosen so far in one partition.
struct KeyMaps {
    hosts: HashMap<IdentityKey, String>,
    authorities: HashMap<IdentityKey, String>,
    emitted: HashSet<IdentityKey>,
}

/// Resolves the resources of `rule`'s type in an in-memory partition graph.
#[must_use]
pub fn resolve_graph(rule: &EntityRule, graph: &Graph, ctx: &Context) -> Resolution {
    let entity_type = rule.entity_type;
    let stage = format!("resolve/{entity_type}");
    let index = GraphIndex::new(graph);
    let resources: BTreeSet<&str> = graph
        .subjects_of_type(&ctx.vocab.rdf_type, &rule.class)
        .filter(|iri| ctx.is_local(iri))
        .collect();

    let mut out = Resolution::new();
    let mut maps = KeyMaps {
        hosts: HashMap::new(),
        authorities: HashMap::new(),
        emitted: HashSet::new(),
    };

    for &resource in &resources {
        out.report.stats.resources_seen += 1;
        if rule.merge == MergeMode::Unique {
            out.table.insert(resource, resource);
            continue;
        }

        let submodel = index.submodel(resource, &rule.hops);
        let Some(key) = extract_key(rule.policy, &submodel, ctx) else {
            debug!(stage = %stage, resource, "no identity key");
            out.table.insert(resource, resource);
            continue;
        };
        out.report.stats.resources_keyed += 1;

        let canonical = maps
            .hosts
            .entry(key.clone())
            .or_insert_with(|| host_canonical(entity_type, rule.merge, &key, resource, ctx))
            .clone();
        record(&mut out, &stage, resource, &canonical);

        if rule.merge == MergeMode::Additive {
            if let IdentityKey::External(external) = &key {
                if maps.emitted.insert(key.clone()) {
                    out.inferred.insert(Statement::link(
                        canonical.as_str(),
                        ctx.vocab.owl_same_as.as_str(),
                        external.as_str(),
                    ));
                }
            }
        }

        let host = host_label(rule.policy, &submodel, ctx);
        for authority in submodel.authorities(&ctx.vocab.has_authority) {
            if !ctx.is_local(authority) {
                continue;
            }
            if let (Some(host), Some(own)) = (
                host.as_deref(),
                authority_label(rule.policy, &submodel, authority, ctx),
            ) {
                if host != own {
                    warn!(
                        stage = %stage,
                        resource,
                        authority,
                        host_label = host,
                        authority_label = %own,
                        "authority label disagrees with its host"
                    );
                    out.report.push(Diagnostic::warn_with_details(
                        stage.as_str(),
                        format!("authority <{authority}> disagrees with host <{resource}>; host key used"),
                        vec![format!("host: {host}"), format!("authority: {own}")],
                    ));
                }
            }
            let canonical = maps
                .authorities
                .entry(key.clone())
                .or_insert_with(|| authority_canonical(entity_type, &key, authority, ctx))
                .clone();
            record(&mut out, &stage, authority, &canonical);
        }
    }

    out.report.stats.inferred_statements = out.inferred.len();
    info!(
        stage = %stage,
        seen = out.report.stats.resources_seen,
        keyed = out.report.stats.resources_keyed,
        merged = out.report.stats.resources_merged,
        inferred = out.report.stats.inferred_statements,
        "partition resolved"
    );
    out
}

fn record(out: &mut Resolution, stage: &str, original: &str, canonical: &str) {
    match out.table.insert(original, canonical) {
        Some(kept) => {
            warn!(stage, original, kept = %kept, rejected = canonical, "conflicting remap");
            out.report.push(Diagnostic::warn_with_details(
                stage,
                format!("conflicting remap for <{original}>"),
                vec![format!("kept <{kept}>"), format!("rejected <{canonical}>")],
            ));
        }
        None if original != canonical => out.report.stats.resources_merged += 1,
        None => {}
    }
}

fn minted_or(domain: &str, key: &IdentityKey, first_seen: &str, ctx: &Context) -> String {
    if ctx.mint {
        if let Some(iri) = mint(&ctx.local_namespace, &ctx.mint_prefix, domain, key.as_str()) {
            return iri;
        }
    }
    first_seen.to_owned()
}

fn host_canonical(
    entity_type: EntityType,
    merge: MergeMode,
    key: &IdentityKey,
    first_seen: &str,
    ctx: &Context,
) -> String {
    match (merge, key) {
        (MergeMode::Substitutive, IdentityKey::External(iri)) => iri.clone(),
        (MergeMode::Additive, IdentityKey::External(_)) | (MergeMode::Unique, _) => {
            first_seen.to_owned()
        }
        (_, IdentityKey::Label(_)) => minted_or(entity_type.as_str(), key, first_seen, ctx),
    }
}

fn authority_canonical(
    entity_type: EntityType,
    key: &IdentityKey,
    first_seen: &str,
    ctx: &Context,
) -> String {
    minted_or(&format!("{entity_type}Authority"), key, first_seen, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mint::mint;
    use crate::model::Literal;

    const NS: &str = "http://data.example.org/";

    fn ctx() -> Context {
        Context::standard(NS)
    }

    fn typed(graph: &mut Graph, s: &str, t: EntityType) {
        graph.insert(Statement::link(s, ctx().vocab.rdf_type, t.class_iri()));
    }

    fn run(t: EntityType, graph: &Graph, c: &Context) -> Resolution {
        resolve_graph(c.registry.rule(t).unwrap(), graph, c)
    }

    fn person(graph: &mut Graph, iri: &str, label: &str) {
        typed(graph, iri, EntityType::Person);
        graph.insert(Statement::literal(iri, ctx().vocab.label, Literal::plain(label)));
    }

    #[test]
    fn same_label_merges_to_minted_iri() {
        let c = ctx();
        let mut g = Graph::new();
        person(&mut g, "http://data.example.org/p1", "Twain, Mark, 1835-1910.");
        person(&mut g, "http://data.example.org/p2", "Twain, Mark, 1835-1910");
        let r = run(EntityType::Person, &g, &c);
        let expected = mint(NS, "n", "Person", "TWAIN, MARK 1835 1910").unwrap();
        assert_eq!(r.table.get("http://data.example.org/p1"), Some(expected.as_str()));
        assert_eq!(r.table.get("http://data.example.org/p2"), Some(expected.as_str()));
        assert_eq!(r.report.stats.resources_merged, 2);
    }

    #[test]
    fn without_minting_first_seen_wins() {
        let mut c = ctx();
        c.mint = false;
        let mut g = Graph::new();
        person(&mut g, "http://data.example.org/b", "Smith, Jo");
        person(&mut g, "http://data.example.org/a", "Smith, Jo");
        let r = run(EntityType::Person, &g, &c);
        assert_eq!(r.table.get("http://data.example.org/a"), Some("http://data.example.org/a"));
        assert_eq!(r.table.get("http://data.example.org/b"), Some("http://data.example.org/a"));
        assert_eq!(r.report.stats.resources_merged, 1);
    }

    #[test]
    fn unkeyed_resources_pass_through() {
        let c = ctx();
        let mut g = Graph::new();
        typed(&mut g, "http://data.example.org/p1", EntityType::Person);
        let r = run(EntityType::Person, &g, &c);
        assert_eq!(r.table.get("http://data.example.org/p1"), Some("http://data.example.org/p1"));
        assert_eq!(r.table.remaps().count(), 0);
        assert_eq!(r.report.stats.resources_keyed, 0);
    }

    #[test]
    fn foreign_resources_are_left_alone() {
        let c = ctx();
        let mut g = Graph::new();
        person(&mut g, "http://id.loc.gov/authorities/names/n1", "Smith, Jo");
        let r = run(EntityType::Person, &g, &c);
        assert!(r.table.is_empty());
    }

    #[test]
    fn instance_keeps_local_iri_and_infers_same_as_once() {
        let c = ctx();
        let mut g = Graph::new();
        for i in ["http://data.example.org/i1", "http://data.example.org/i2"] {
            typed(&mut g, i, EntityType::Instance);
            g.insert(Statement::link(i, c.vocab.system_number.as_str(), "http://www.worldcat.org/oclc/999"));
        }
        let r = run(EntityType::Instance, &g, &c);
        assert_eq!(r.table.get("http://data.example.org/i1"), Some("http://data.example.org/i1"));
        assert_eq!(r.table.get("http://data.example.org/i2"), Some("http://data.example.org/i1"));
        assert_eq!(r.inferred.len(), 1);
        assert!(r.inferred.contains(&Statement::link(
            "http://data.example.org/i1",
            c.vocab.owl_same_as.as_str(),
            "http://www.worldcat.org/oclc/999"
        )));
    }

    #[test]
    fn events_are_never_merged() {
        let c = ctx();
        let mut g = Graph::new();
        for e in ["http://data.example.org/e1", "http://data.example.org/e2"] {
            typed(&mut g, e, EntityType::Event);
            g.insert(Statement::literal(e, "http://bibframe.org/vocab/eventDate", Literal::plain("1999")));
        }
        let r = run(EntityType::Event, &g, &c);
        assert_eq!(r.table.remaps().count(), 0);
        assert_eq!(r.table.len(), 2);
    }

    #[test]
    fn authorities_follow_their_hosts() {
        let mut c = ctx();
        c.mint = false;
        let mut g = Graph::new();
        for (p, a) in [
            ("http://data.example.org/p1", "http://data.example.org/a1"),
            ("http://data.example.org/p2", "http://data.example.org/a2"),
        ] {
            person(&mut g, p, "Smith, Jo");
            g.insert(Statement::link(p, c.vocab.has_authority.as_str(), a));
            g.insert(Statement::literal(a, c.vocab.authoritative_label.as_str(), Literal::plain("Smith, Jo")));
        }
        let r = run(EntityType::Person, &g, &c);
        assert_eq!(r.table.get("http://data.example.org/a2"), Some("http://data.example.org/a1"));
        assert_eq!(r.report.warning_count(), 0);
    }

    #[test]
    fn disagreeing_authority_is_reported_and_host_key_wins() {
        let c = ctx();
        let mut g = Graph::new();
        person(&mut g, "http://data.example.org/p1", "Smith, Jo");
        g.insert(Statement::link(
            "http://data.example.org/p1",
            c.vocab.has_authority.as_str(),
            "http://data.example.org/a1",
        ));
        g.insert(Statement::literal(
            "http://data.example.org/a1",
            c.vocab.authoritative_label.as_str(),
            Literal::plain("Jones, Al"),
        ));
        let r = run(EntityType::Person, &g, &c);
        assert_eq!(r.report.warning_count(), 1);
        let expected = mint(NS, "n", "Person", "SMITH, JO").unwrap();
        assert_eq!(r.table.get("http://data.example.org/p1"), Some(expected.as_str()));
    }

    #[test]
    fn pass_through_never_overrides_a_remap() {
        let mut t = RemappingTable::new();
        assert_eq!(t.insert("a", "a"), None);
        assert_eq!(t.insert("a", "b"), None);
        assert_eq!(t.insert("a", "a"), None);
        assert_eq!(t.get("a"), Some("b"));
        assert_eq!(t.insert("a", "c"), Some("b".to_string()));
        assert_eq!(t.get("a"), Some("b"));
    }

    #[test]
    fn close_collapses_chains() {
        let mut t = RemappingTable::new();
        t.insert("x", "y");
        t.insert("y", "z");
        t.insert("z", "z");
        assert_eq!(t.close().collapsed, 1);
        assert_eq!(t.get("x"), Some("z"));
        for (_, canonical) in t.iter() {
            assert_eq!(t.canonical(canonical), canonical);
        }
    }

    #[test]
    fn close_reports_cycles_and_leaves_them_alone() {
        let mut t = RemappingTable::new();
        t.insert("a", "b");
        t.insert("b", "a");
        t.insert("c", "a");
        t.insert("d", "e");
        let closure = t.close();
        assert_eq!(closure.cyclic, vec!["a", "b", "c"]);
        assert_eq!(closure.collapsed, 0);
        assert_eq!(t.get("c"), Some("a"));
        assert_eq!(t.get("d"), Some("e"));
    }

    #[test]
    fn tsv_holds_only_remaps() {
        let mut t = RemappingTable::new();
        t.insert("http://ex/a", "http://ex/a");
        t.insert("http://ex/b", "http://ex/c");
        let tsv = t.to_tsv();
        assert_eq!(tsv, "http://ex/b\thttp://ex/c\n");
        let back = RemappingTable::from_tsv(&tsv).unwrap();
        assert_eq!(back.get("http://ex/b"), Some("http://ex/c"));
        assert!(RemappingTable::from_tsv("no tab here\n").is_err());
    }

    #[test]
    fn absorb_reports_cross_partition_conflicts() {
        let mut a = Resolution::new();
        a.table.insert("http://ex/a", "http://ex/b");
        let mut b = Resolution::new();
        b.table.insert("http://ex/a", "http://ex/c");
        b.inferred.insert(Statement::link("http://ex/a", "http://ex/p", "http://ex/o"));
        a.absorb(b);
        assert_eq!(a.table.get("http://ex/a"), Some("http://ex/b"));
        assert_eq!(a.report.warning_count(), 1);
        assert_eq!(a.report.stats.inferred_statements, 1);
    }
}
