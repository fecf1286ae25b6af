//! N-Triples reading and writing.
//!
//! Reading goes through the `sophia_turtle` N-Triples parser and converts
//! each triple into a [`Statement`]. Input is expected to be blank-node free;
//! a blank node anywhere in a file rejects the whole file.
//!
//! Writing produces one statement per line, absolute IRIs, objects escaped
//! per RDF 1.1 N-Triples.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sophia_api::source::TripleSource;
use sophia_api::term::{Term, TermKind};
use sophia_api::triple::Triple;
use sophia_turtle::parser::nt;

use crate::error::{DedupError, Result};
use crate::model::{Graph, Literal, Node, Statement};

const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

/// Reads one N-Triples file into a graph.
///
/// # Errors
///
/// Returns [`DedupError::Parse`] if the file cannot be opened, is not valid
/// N-Triples, or contains a blank node, and [`DedupError::EmptyFile`] if it
/// holds no statements.
pub fn read_file(path: &Path) -> Result<Graph> {
    let file = File::open(path).map_err(|e| DedupError::Parse {
        path: path.to_path_buf(),
        message: format!("cannot open: {e}"),
    })?;
    let graph = parse_reader(BufReader::new(file)).map_err(|message| DedupError::Parse {
        path: path.to_path_buf(),
        message,
    })?;
    if graph.is_empty() {
        return Err(DedupError::EmptyFile {
            path: path.to_path_buf(),
        });
    }
    Ok(graph)
}

/// Parses an N-Triples document held in memory.
///
/// # Errors
///
/// Returns the parser message if the document is malformed or contains a
/// blank node.
pub fn parse_str(src: &str) -> std::result::Result<Graph, String> {
    parse_reader(src.as_bytes())
}

fn parse_reader<R: BufRead>(reader: R) -> std::result::Result<Graph, String> {
    let mut graph = Graph::new();
    let mut rejected: Option<String> = None;

    nt::parse_bufread(reader)
        .for_each_triple(|t| {
            if rejected.is_some() {
                return;
            }
            match convert(t.s(), t.p(), t.o()) {
                Ok(statement) => {
                    graph.insert(statement);
                }
                Err(message) => rejected = Some(message),
            }
        })
        .map_err(|e| e.to_string())?;

    match rejected {
        Some(message) => Err(message),
        None => Ok(graph),
    }
}

fn convert<S: Term, P: Term, O: Term>(s: S, p: P, o: O) -> std::result::Result<Statement, String> {
    let subject = iri_of(s, "subject")?;
    let predicate = iri_of(p, "predicate")?;
    let object = node_of(o)?;
    Ok(Statement {
        subject,
        predicate,
        object,
    })
}

fn iri_of<T: Term>(term: T, position: &str) -> std::result::Result<String, String> {
    match term.kind() {
        TermKind::Iri => term
            .iri()
            .map(|iri| iri.as_str().to_owned())
            .ok_or_else(|| format!("unreadable IRI in {position} position")),
        TermKind::BlankNode => Err(format!(
            "blank node in {position} position; blank nodes must be promoted to IRIs first"
        )),
        _ => Err(format!("unexpected term in {position} position")),
    }
}

fn node_of<T: Term>(term: T) -> std::result::Result<Node, String> {
    match term.kind() {
        TermKind::Iri => iri_of(term, "object").map(Node::Iri),
        TermKind::Literal => {
            let lexical = term
                .lexical_form()
                .map(|l| (*l).to_owned())
                .unwrap_or_default();
            let literal = if let Some(tag) = term.language_tag() {
                Literal::tagged(lexical, tag.as_str())
            } else {
                match term.datatype().map(|dt| dt.as_str().to_owned()) {
                    Some(dt) if dt != XSD_STRING && dt != RDF_LANG_STRING => {
                        Literal::typed(lexical, dt)
                    }
                    _ => Literal::plain(lexical),
                }
            };
            Ok(Node::Literal(literal))
        }
        TermKind::BlankNode => Err(
            "blank node in object position; blank nodes must be promoted to IRIs first".to_string(),
        ),
        _ => Err("unexpected term in object position".to_string()),
    }
}

/// Formats a statement as one N-Triples line, including the trailing newline.
#[must_use]
pub fn format_statement(statement: &Statement) -> String {
    let mut out = String::with_capacity(
        statement.subject.len() + statement.predicate.len() + 64,
    );
    push_statement(&mut out, statement);
    out
}

/// Serializes a whole graph in statement order.
#[must_use]
pub fn to_ntriples(graph: &Graph) -> String {
    let mut out = String::with_capacity(graph.len() * 96);
    for statement in graph {
        push_statement(&mut out, statement);
    }
    out
}

pub(crate) fn push_statement(out: &mut String, statement: &Statement) {
    out.push('<');
    out.push_str(&statement.subject);
    out.push_str("> <");
    out.push_str(&statement.predicate);
    out.push_str("> ");
    match &statement.object {
        Node::Iri(iri) => {
            out.push('<');
            out.push_str(iri);
            out.push('>');
        }
        Node::Literal(lit) => push_literal(out, lit),
    }
    out.push_str(" .\n");
}

fn push_literal(out: &mut String, lit: &Literal) {
    out.push('"');
    for c in lit.lexical.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
    if let Some(language) = &lit.language {
        out.push('@');
        out.push_str(language);
    } else if let Some(datatype) = &lit.datatype {
        out.push_str("^^<");
        out.push_str(datatype);
        out.push('>');
    }
}
