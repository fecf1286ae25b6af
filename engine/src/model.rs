//! Core statement model types.
//!
//! A corpus file is read into a [`Graph`]: a set of [`Statement`]s whose
//! subjects and predicates are IRIs and whose objects are [`Node`]s. Graphs
//! use set semantics and a total order so every serialization of the same
//! graph is byte-identical.

use std::collections::BTreeSet;
use std::fmt;

/// A literal object: lexical form plus an optional language tag or datatype.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Literal {
    /// Unescaped lexical form.
    pub lexical: String,
    /// Language tag without the leading `@` (e.g. `"en"`, `"x-bf-hash"`).
    pub language: Option<String>,
    /// Datatype IRI for typed literals. Never set together with `language`.
    pub datatype: Option<String>,
}

impl Literal {
    /// Creates a plain literal.
    pub fn plain(lexical: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: None,
            datatype: None,
        }
    }

    /// Creates a language-tagged literal.
    pub fn tagged(lexical: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: Some(language.into()),
            datatype: None,
        }
    }

    /// Creates a typed literal.
    pub fn typed(lexical: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            lexical: lexical.into(),
            language: None,
            datatype: Some(datatype.into()),
        }
    }

    /// Returns true if the literal carries the given language tag
    /// (compared case-insensitively, as language tags are).
    #[must_use]
    pub fn has_language(&self, tag: &str) -> bool {
        self.language
            .as_deref()
            .map(|l| l.eq_ignore_ascii_case(tag))
            .unwrap_or(false)
    }
}

/// The object position of a statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Node {
    /// An IRI reference.
    Iri(String),
    /// A literal value.
    Literal(Literal),
}

impl Node {
    /// Creates an IRI node.
    pub fn iri(iri: impl Into<String>) -> Self {
        Node::Iri(iri.into())
    }

    /// Returns the IRI if this node is one.
    #[must_use]
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Node::Iri(iri) => Some(iri),
            Node::Literal(_) => None,
        }
    }

    /// Returns the literal if this node is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Node::Iri(_) => None,
            Node::Literal(lit) => Some(lit),
        }
    }
}

/// A single (subject, predicate, object) statement.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Statement {
    /// Subject IRI.
    pub subject: String,
    /// Predicate IRI.
    pub predicate: String,
    /// Object node.
    pub object: Node,
}

impl Statement {
    /// Creates a statement.
    pub fn new(subject: impl Into<String>, predicate: impl Into<String>, object: Node) -> Self {
        Self {
            subject: subject.into(),
            predicate: predicate.into(),
            object,
        }
    }

    /// Creates a statement whose object is an IRI.
    pub fn link(
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self::new(subject, predicate, Node::Iri(object.into()))
    }

    /// Creates a statement whose object is a literal.
    pub fn literal(subject: impl Into<String>, predicate: impl Into<String>, object: Literal) -> Self {
        Self::new(subject, predicate, Node::Literal(object))
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(crate::ntriples::format_statement(self).trim_end())
    }
}

/// A set of statements.
///
/// Iteration order is the total order of [`Statement`], so two graphs with
/// the same content always serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    statements: BTreeSet<Statement>,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a statement. Returns false if it was already present.
    pub fn insert(&mut self, statement: Statement) -> bool {
        self.statements.insert(statement)
    }

    /// Returns true if the statement is present.
    #[must_use]
    pub fn contains(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    /// Number of distinct statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Returns true if the graph holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Iterates statements in order.
    pub fn iter(&self) -> impl Iterator<Item = &Statement> {
        self.statements.iter()
    }

    /// Moves every statement of `other` into this graph.
    pub fn extend(&mut self, other: Graph) {
        self.statements.extend(other.statements);
    }

    /// Returns the subjects that carry `rdf:type <class>` in this graph.
    pub fn subjects_of_type<'a>(
        &'a self,
        rdf_type: &'a str,
        class: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.statements
            .iter()
            .filter(move |s| s.predicate == rdf_type && s.object.as_iri() == Some(class))
            .map(|s| s.subject.as_str())
    }
}

impl FromIterator<Statement> for Graph {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self {
            statements: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Statement;
    type IntoIter = std::collections::btree_set::IntoIter<Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Statement;
    type IntoIter = std::collections::btree_set::Iter<'a, Statement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}
