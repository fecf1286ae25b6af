//! Identity-key extraction.
//!
//! A resource's key is computed from its [`Submodel`]: the statements about
//! the resource, the statements about resources one hop away along its
//! rule's hop predicates, and the statements pointing at it. Each
//! [`KeyPolicy`] tries its sources in priority order and returns the first
//! success. Where a source has several values the smallest one is used, so
//! the key never depends on statement order.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::config::Context;
use crate::entity::KeyPolicy;
use crate::model::{Graph, Literal, Node, Statement};
use crate::normalize::truncate_subdivision;

/// The identity of a resource within its entity type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IdentityKey {
    /// A normalized (or exact, for hash-ready access points and item codes)
    /// label string.
    Label(String),
    /// A dereferenceable external IRI.
    External(String),
}

impl IdentityKey {
    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            IdentityKey::Label(s) | IdentityKey::External(s) => s,
        }
    }
}

impl fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityKey::Label(s) => write!(f, "label:{s}"),
            IdentityKey::External(s) => write!(f, "<{s}>"),
        }
    }
}

/// Subject and object indexes over one partition graph.
#[derive(Debug)]
pub struct GraphIndex<'g> {
    by_subject: HashMap<&'g str, Vec<&'g Statement>>,
    by_object: HashMap<&'g str, Vec<&'g Statement>>,
}

impl<'g> GraphIndex<'g> {
    /// Indexes `graph`.
    #[must_use]
    pub fn new(graph: &'g Graph) -> Self {
        let mut by_subject: HashMap<&str, Vec<&Statement>> = HashMap::new();
        let mut by_object: HashMap<&str, Vec<&Statement>> = HashMap::new();
        for statement in graph {
            by_subject
                .entry(statement.subject.as_str())
                .or_default()
                .push(statement);
            if let Some(object) = statement.object.as_iri() {
                by_object.entry(object).or_default().push(statement);
            }
        }
        Self {
            by_subject,
            by_object,
        }
    }

    /// Statements whose subject is `subject`.
    #[must_use]
    pub fn about(&self, subject: &str) -> &[&'g Statement] {
        self.by_subject.get(subject).map_or(&[], Vec::as_slice)
    }

    /// Statements whose object is `object`.
    #[must_use]
    pub fn pointing_at(&self, object: &str) -> &[&'g Statement] {
        self.by_object.get(object).map_or(&[], Vec::as_slice)
    }

    /// Materializes the submodel of `focus`, following `hops` one step.
    #[must_use]
    pub fn submodel(&self, focus: &'g str, hops: &[String]) -> Submodel<'g> {
        let mut statements: BTreeSet<&'g Statement> = BTreeSet::new();
        for &statement in self.about(focus) {
            statements.insert(statement);
            if hops.iter().any(|h| *h == statement.predicate) {
                if let Some(target) = statement.object.as_iri() {
                    if target != focus {
                        statements.extend(self.about(target).iter().copied());
                    }
                }
            }
        }
        statements.extend(self.pointing_at(focus).iter().copied());
        Submodel {
            focus,
            statements: statements.into_iter().collect(),
        }
    }
}

/// The bounded statement set a resource's key is computed from.
#[derive(Debug, Clone)]
pub struct Submodel<'g> {
    focus: &'g str,
    statements: Vec<&'g Statement>,
}

impl<'g> Submodel<'g> {
    /// Builds a submodel from explicit statements.
    #[must_use]
    pub fn from_statements(focus: &'g str, statements: Vec<&'g Statement>) -> Self {
        Self { focus, statements }
    }

    /// The resource the submodel is about.
    #[must_use]
    pub fn focus(&self) -> &'g str {
        self.focus
    }

    /// All statements.
    #[must_use]
    pub fn statements(&self) -> &[&'g Statement] {
        &self.statements
    }

    /// Objects of `subject predicate ?o`.
    pub fn values<'s>(
        &'s self,
        subject: &'s str,
        predicate: &'s str,
    ) -> impl Iterator<Item = &'g Node> + 's {
        self.statements
            .iter()
            .copied()
            .filter(move |s| s.subject == subject && s.predicate == predicate)
            .map(|s: &'g Statement| &s.object)
    }

    /// Literal objects of `subject predicate ?o`.
    pub fn literals<'s>(
        &'s self,
        subject: &'s str,
        predicate: &'s str,
    ) -> impl Iterator<Item = &'g Literal> + 's {
        self.values(subject, predicate).filter_map(Node::as_literal)
    }

    /// IRI objects of `subject predicate ?o`, sorted.
    #[must_use]
    pub fn links(&self, subject: &str, predicate: &str) -> Vec<&'g str> {
        let mut links: Vec<&str> = self
            .statements
            .iter()
            .copied()
            .filter(|s| s.subject == subject && s.predicate == predicate)
            .filter_map(|s: &'g Statement| s.object.as_iri())
            .collect();
        links.sort_unstable();
        links.dedup();
        links
    }

    /// Authority resources linked from the focus.
    #[must_use]
    pub fn authorities(&self, has_authority: &str) -> Vec<&'g str> {
        self.links(self.focus, has_authority)
    }
}

/// Computes the identity key of a submodel's focus under `policy`.
#[must_use]
pub fn extract_key(policy: KeyPolicy, submodel: &Submodel<'_>, ctx: &Context) -> Option<IdentityKey> {
    match policy {
        KeyPolicy::Agent => agent_label(submodel, ctx).map(IdentityKey::Label),
        KeyPolicy::Topic => topic_key(submodel, ctx),
        KeyPolicy::HashAccessPoint => hash_access_point(submodel, ctx).map(IdentityKey::Label),
        KeyPolicy::SystemNumber => system_number(submodel, ctx).map(IdentityKey::External),
        KeyPolicy::HeldItem => held_item_code(submodel, ctx).map(IdentityKey::Label),
        KeyPolicy::None => None,
    }
}

/// The normalized label the host's key was built from, for comparison with
/// its authority's own label. Only label-driven policies have one.
#[must_use]
pub fn host_label(policy: KeyPolicy, submodel: &Submodel<'_>, ctx: &Context) -> Option<String> {
    match policy {
        KeyPolicy::Agent => agent_label(submodel, ctx),
        KeyPolicy::Topic => topic_label(submodel, ctx),
        _ => None,
    }
}

/// The normalized `madsrdf:authoritativeLabel` of `authority`, prepared the
/// same way its host's label is under `policy`.
#[must_use]
pub fn authority_label(
    policy: KeyPolicy,
    submodel: &Submodel<'_>,
    authority: &str,
    ctx: &Context,
) -> Option<String> {
    let truncate = policy == KeyPolicy::Agent;
    normalized_min(
        submodel.literals(authority, &ctx.vocab.authoritative_label),
        truncate,
        ctx,
    )
}

fn normalized_min<'a>(
    literals: impl Iterator<Item = &'a Literal>,
    truncate: bool,
    ctx: &Context,
) -> Option<String> {
    literals
        .filter(|l| !l.has_language(&ctx.vocab.hash_language))
        .map(|l| {
            let text = if truncate {
                truncate_subdivision(&l.lexical, &ctx.subdivision_delimiters)
            } else {
                l.lexical.as_str()
            };
            ctx.naco.normalize(text)
        })
        .filter(|k| !k.is_empty())
        .min()
}

fn label_from(submodel: &Submodel<'_>, truncate: bool, ctx: &Context) -> Option<String> {
    let v = &ctx.vocab;
    [&v.authorized_access_point, &v.label, &v.rdfs_label]
        .into_iter()
        .find_map(|p| normalized_min(submodel.literals(submodel.focus(), p), truncate, ctx))
}

fn agent_label(submodel: &Submodel<'_>, ctx: &Context) -> Option<String> {
    label_from(submodel, true, ctx)
}

fn topic_label(submodel: &Submodel<'_>, ctx: &Context) -> Option<String> {
    label_from(submodel, false, ctx).or_else(|| {
        submodel
            .authorities(&ctx.vocab.has_authority)
            .into_iter()
            .filter_map(|a| authority_label(KeyPolicy::Topic, submodel, a, ctx))
            .min()
    })
}

fn topic_key(submodel: &Submodel<'_>, ctx: &Context) -> Option<IdentityKey> {
    if let Some(external) = topic_external(submodel, ctx) {
        return Some(IdentityKey::External(external));
    }
    let label = topic_label(submodel, ctx)?;
    let scheme = submodel
        .authorities(&ctx.vocab.has_authority)
        .into_iter()
        .flat_map(|a| submodel.links(a, &ctx.vocab.mads_scheme))
        .min();
    Some(IdentityKey::Label(match scheme {
        Some(scheme) => format!("{scheme}|{label}"),
        None => label,
    }))
}

fn topic_external(submodel: &Submodel<'_>, ctx: &Context) -> Option<String> {
    let v = &ctx.vocab;
    let focus = submodel.focus();
    [&v.system_number, &v.identifier]
        .into_iter()
        .flat_map(|p| submodel.values(focus, p))
        .filter_map(|node| match node {
            Node::Literal(lit) => v.resolve_topic_code(&lit.lexical),
            Node::Iri(iri) if v.is_external_topic(iri) => Some(iri.clone()),
            Node::Iri(identifier) => submodel
                .literals(identifier, &v.identifier_value)
                .filter_map(|lit| v.resolve_topic_code(&lit.lexical))
                .min(),
        })
        .min()
}

fn hash_access_point(submodel: &Submodel<'_>, ctx: &Context) -> Option<String> {
    submodel
        .literals(submodel.focus(), &ctx.vocab.authorized_access_point)
        .filter(|l| l.has_language(&ctx.vocab.hash_language) && !l.lexical.is_empty())
        .map(|l| l.lexical.clone())
        .min()
}

fn system_number(submodel: &Submodel<'_>, ctx: &Context) -> Option<String> {
    let v = &ctx.vocab;
    [&v.system_number, &v.identifier]
        .into_iter()
        .flat_map(|p| submodel.links(submodel.focus(), p))
        .filter(|iri| v.is_bibliographic_system(iri))
        .min()
        .map(str::to_owned)
}

fn node_text(node: &Node) -> &str {
    match node {
        Node::Iri(iri) => iri,
        Node::Literal(lit) => &lit.lexical,
    }
}

fn held_item_code(submodel: &Submodel<'_>, ctx: &Context) -> Option<String> {
    let v = &ctx.vocab;
    let focus = submodel.focus();
    let coded = v
        .shelf_marks
        .iter()
        .chain([&v.barcode, &v.item_id])
        .find_map(|p| {
            submodel
                .values(focus, p)
                .map(node_text)
                .filter(|code| !code.is_empty())
                .min()
                .map(|code| format!("{p}|{code}"))
        });
    if coded.is_some() {
        return coded;
    }
    let mark = submodel
        .values(focus, &v.shelf_mark)
        .map(node_text)
        .filter(|m| !m.is_empty())
        .min()?;
    let scheme = submodel
        .values(focus, &v.shelf_mark_scheme)
        .map(node_text)
        .min()
        .unwrap_or("");
    Some(format!("{}|{scheme}|{mark}", v.shelf_mark))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityType;

    const NS: &str = "http://data.example.org/";

    fn ctx() -> Context {
        Context::standard(NS)
    }

    fn key_of(graph: &Graph, focus: &str, t: EntityType) -> Option<IdentityKey> {
        let c = ctx();
        let index = GraphIndex::new(graph);
        let focus = graph
            .iter()
            .map(|s| s.subject.as_str())
            .find(|s| *s == focus)
            .unwrap();
        let sm = index.submodel(focus, &t.hop_predicates(&c.vocab));
        extract_key(t.key_policy(), &sm, &c)
    }

    fn lit(s: &str, p: &str, o: &str) -> Statement {
        Statement::literal(s, p, Literal::plain(o))
    }

    #[test]
    fn agent_prefers_access_point_and_truncates_subdivisions() {
        let v = ctx().vocab;
        let g: Graph = [
            lit("http://data.example.org/p1", &v.authorized_access_point, "A, B--C"),
            lit("http://data.example.org/p1", &v.label, "Something else"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            key_of(&g, "http://data.example.org/p1", EntityType::Person),
            Some(IdentityKey::Label("A, B".into()))
        );
    }

    #[test]
    fn agent_falls_back_to_label() {
        let v = ctx().vocab;
        let g: Graph = [lit("http://data.example.org/p1", &v.label, "Twain, Mark, 1835-1910.")]
            .into_iter()
            .collect();
        assert_eq!(
            key_of(&g, "http://data.example.org/p1", EntityType::Person),
            Some(IdentityKey::Label("TWAIN, MARK 1835 1910".into()))
        );
    }

    #[test]
    fn agent_without_usable_label_has_no_key() {
        let v = ctx().vocab;
        let g: Graph = [lit("http://data.example.org/p1", &v.label, "...")]
            .into_iter()
            .collect();
        assert_eq!(key_of(&g, "http://data.example.org/p1", EntityType::Person), None);
    }

    #[test]
    fn topic_code_on_identifier_node_maps_to_fast() {
        let v = ctx().vocab;
        let g: Graph = [
            Statement::link("http://data.example.org/t1", &v.system_number, "http://data.example.org/id1"),
            lit("http://data.example.org/id1", &v.identifier_value, "(OCoLC)fst01234567"),
            lit("http://data.example.org/t1", &v.label, "Cats"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            key_of(&g, "http://data.example.org/t1", EntityType::Topic),
            Some(IdentityKey::External("http://id.worldcat.org/fast/fst01234567".into()))
        );
    }

    #[test]
    fn topic_scheme_qualifies_the_label() {
        let v = ctx().vocab;
        let g: Graph = [
            lit("http://data.example.org/t1", &v.label, "Cats"),
            Statement::link("http://data.example.org/t1", &v.has_authority, "http://data.example.org/a1"),
            Statement::link(
                "http://data.example.org/a1",
                &v.mads_scheme,
                "http://id.loc.gov/authorities/subjects",
            ),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            key_of(&g, "http://data.example.org/t1", EntityType::Topic),
            Some(IdentityKey::Label("http://id.loc.gov/authorities/subjects|CATS".into()))
        );
    }

    #[test]
    fn work_key_is_the_exact_hash_literal() {
        let v = ctx().vocab;
        let g: Graph = [
            Statement::literal(
                "http://data.example.org/w1",
                &v.authorized_access_point,
                Literal::tagged("twainmarkadventuresoftomsawyer", "x-bf-hash"),
            ),
            lit("http://data.example.org/w1", &v.authorized_access_point, "Twain. Tom Sawyer"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            key_of(&g, "http://data.example.org/w1", EntityType::Work),
            Some(IdentityKey::Label("twainmarkadventuresoftomsawyer".into()))
        );
    }

    #[test]
    fn work_without_hash_literal_has_no_key() {
        let v = ctx().vocab;
        let g: Graph = [lit("http://data.example.org/w1", &v.authorized_access_point, "Twain")]
            .into_iter()
            .collect();
        assert_eq!(key_of(&g, "http://data.example.org/w1", EntityType::Work), None);
    }

    #[test]
    fn instance_key_needs_a_recognized_namespace() {
        let v = ctx().vocab;
        let g: Graph = [
            Statement::link("http://data.example.org/i1", &v.system_number, "http://example.org/other/1"),
            Statement::link("http://data.example.org/i1", &v.system_number, "http://www.worldcat.org/oclc/999"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            key_of(&g, "http://data.example.org/i1", EntityType::Instance),
            Some(IdentityKey::External("http://www.worldcat.org/oclc/999".into()))
        );
    }

    #[test]
    fn held_item_codes_follow_priority_and_stay_verbatim() {
        let v = ctx().vocab;
        let g: Graph = [
            lit("http://data.example.org/h1", &v.barcode, "3 9015 00001"),
            lit("http://data.example.org/h1", &v.shelf_marks[1], "813.4 t969"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            key_of(&g, "http://data.example.org/h1", EntityType::HeldItem),
            Some(IdentityKey::Label(format!("{}|813.4 t969", v.shelf_marks[1])))
        );
    }

    #[test]
    fn held_item_falls_back_to_scheme_and_mark() {
        let v = ctx().vocab;
        let g: Graph = [
            lit("http://data.example.org/h1", &v.shelf_mark, "PS1305 .A1"),
            lit("http://data.example.org/h1", &v.shelf_mark_scheme, "lcc"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            key_of(&g, "http://data.example.org/h1", EntityType::HeldItem),
            Some(IdentityKey::Label(format!("{}|lcc|PS1305 .A1", v.shelf_mark)))
        );
    }

    #[test]
    fn events_never_have_keys() {
        let g: Graph = [lit("http://data.example.org/e1", "http://bibframe.org/vocab/eventDate", "1900")]
            .into_iter()
            .collect();
        assert_eq!(key_of(&g, "http://data.example.org/e1", EntityType::Event), None);
    }

    #[test]
    fn submodel_follows_hops_once() {
        let v = ctx().vocab;
        let g: Graph = [
            Statement::link("http://data.example.org/p1", &v.has_authority, "http://data.example.org/a1"),
            lit("http://data.example.org/a1", &v.authoritative_label, "A"),
            Statement::link("http://data.example.org/a1", "http://ex/next", "http://data.example.org/x"),
            lit("http://data.example.org/x", &v.label, "two hops away"),
        ]
        .into_iter()
        .collect();
        let index = GraphIndex::new(&g);
        let sm = index.submodel("http://data.example.org/p1", &[v.has_authority.clone()]);
        assert_eq!(sm.statements().len(), 3);
    }
}
