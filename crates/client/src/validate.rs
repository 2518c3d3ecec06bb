//! Static checks over GraphQL document text.
//!
//! These are not a GraphQL parser. They understand just enough of the
//! grammar (names, braces, string literals, comments) to check the shape of
//! the documents this crate ships and builds.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, Result};

static FRAGMENT_DEFINITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[^_0-9A-Za-z])fragment\s+([_A-Za-z][_0-9A-Za-z]*)\s+on\s").unwrap()
});
static FRAGMENT_SPREAD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.\.\.\s*([_A-Za-z][_0-9A-Za-z]*)").unwrap());
static OPERATION_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)(?:^|[^_0-9A-Za-z])(?:query|mutation|subscription)\s+([_A-Za-z][_0-9A-Za-z]*)")
        .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Kind of the first operation in `document`. A bare selection set
    /// (`{ ... }`) is a query.
    pub fn detect(document: &str) -> Self {
        for token in top_level_tokens(document) {
            match token {
                Token::Word("query") => return Self::Query,
                Token::Word("mutation") => return Self::Mutation,
                Token::Word("subscription") => return Self::Subscription,
                Token::AnonymousSelection => return Self::Query,
                Token::Word(_) => {}
            }
        }
        Self::Query
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Mutation => "mutation",
            Self::Subscription => "subscription",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names of every `fragment X on T` definition, in document order.
/// Duplicates are kept so callers can detect them.
pub fn fragment_definitions(document: &str) -> Vec<&str> {
    FRAGMENT_DEFINITION_RE
        .captures_iter(document)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect()
}

/// Names of every named fragment spread (`...X`). Inline fragments
/// (`... on T`) are not spreads.
pub fn fragment_spreads(document: &str) -> BTreeSet<&str> {
    FRAGMENT_SPREAD_RE
        .captures_iter(document)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .filter(|name| *name != "on")
        .collect()
}

/// Name of the first named operation.
pub fn operation_name(document: &str) -> Option<&str> {
    OPERATION_NAME_RE
        .captures(document)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Every spread has exactly one definition and every definition is spread
/// somewhere in the document.
pub fn check_fragments(document: &str) -> Result<()> {
    let mut defined: BTreeMap<&str, usize> = BTreeMap::new();
    for name in fragment_definitions(document) {
        *defined.entry(name).or_default() += 1;
    }
    let spread = fragment_spreads(document);

    let duplicated: Vec<&str> = defined
        .iter()
        .filter(|(_, count)| **count > 1)
        .map(|(name, _)| *name)
        .collect();
    if !duplicated.is_empty() {
        return Err(Error::Document(format!(
            "fragment defined more than once: {}",
            duplicated.join(", ")
        )));
    }

    let missing: Vec<&str> = spread
        .iter()
        .filter(|name| !defined.contains_key(*name))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(Error::Document(format!(
            "fragment spread without definition: {}",
            missing.join(", ")
        )));
    }

    let unused: Vec<&str> = defined
        .keys()
        .filter(|name| !spread.contains(*name))
        .copied()
        .collect();
    if !unused.is_empty() {
        return Err(Error::Document(format!(
            "fragment defined but never spread: {}",
            unused.join(", ")
        )));
    }
    Ok(())
}

/// Full check of a document about to be sent: fragments are consistent and
/// the named operation matches `expected_name`.
pub fn check_document(document: &str, expected_name: &str) -> Result<()> {
    check_fragments(document)?;
    match operation_name(document) {
        Some(name) if name == expected_name => Ok(()),
        Some(name) => Err(Error::Document(format!(
            "operation is named {name}, expected {expected_name}"
        ))),
        None => Err(Error::Document(format!(
            "operation {expected_name} is anonymous"
        ))),
    }
}

enum Token<'a> {
    Word(&'a str),
    AnonymousSelection,
}

/// Names and opening braces at brace depth zero, skipping fragment bodies,
/// comments and string literals.
fn top_level_tokens(document: &str) -> Vec<Token<'_>> {
    let bytes = document.as_bytes();
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut in_fragment_header = false;
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            b'#' => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'{' => {
                if depth == 0 {
                    if in_fragment_header {
                        in_fragment_header = false;
                    } else {
                        tokens.push(Token::AnonymousSelection);
                    }
                }
                depth += 1;
            }
            b'}' => depth = depth.saturating_sub(1),
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            _ if b == b'_' || b.is_ascii_alphabetic() => {
                let start = i;
                while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
                    i += 1;
                }
                if depth == 0 {
                    let word = &document[start..i];
                    if word == "fragment" {
                        in_fragment_header = true;
                    } else if !in_fragment_header {
                        tokens.push(Token::Word(word));
                    }
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    const WITH_FRAGMENTS: &str = r#"
fragment Basic on notes { id content }
fragment WithUser on notes { ...Basic user { id } }
query GetNotes($id: uuid!) { notes(where: {id: {_eq: $id}}) { ...WithUser } }
"#;

    #[test]
    fn detects_operation_kind() {
        assert_eq!(OperationKind::detect("query Q { a }"), OperationKind::Query);
        assert_eq!(
            OperationKind::detect("mutation M($x: Int) { a(x: $x) { b } }"),
            OperationKind::Mutation
        );
        assert_eq!(
            OperationKind::detect("subscription S { notes { id } }"),
            OperationKind::Subscription
        );
        assert_eq!(OperationKind::detect("{ notes { id } }"), OperationKind::Query);
    }

    #[test]
    fn fragment_bodies_do_not_hide_the_operation() {
        let doc = "fragment F on notes { id }\nsubscription S { notes { ...F } }";
        assert_eq!(OperationKind::detect(doc), OperationKind::Subscription);
    }

    #[test]
    fn keywords_inside_selections_and_strings_are_ignored() {
        let doc = "# mutation in a comment\nquery Q { mutation: notes(where: {content: {_eq: \"subscription {\"}}) { id } }";
        assert_eq!(OperationKind::detect(doc), OperationKind::Query);
    }

    #[test]
    fn collects_definitions_and_spreads() {
        assert_eq!(fragment_definitions(WITH_FRAGMENTS), vec!["Basic", "WithUser"]);
        let spreads: Vec<_> = fragment_spreads(WITH_FRAGMENTS).into_iter().collect();
        assert_eq!(spreads, vec!["Basic", "WithUser"]);
        assert_eq!(operation_name(WITH_FRAGMENTS), Some("GetNotes"));
    }

    #[test]
    fn inline_fragments_are_not_spreads() {
        let doc = "query Q { _entities(representations: []) { ... on notes { id } } }";
        assert!(fragment_spreads(doc).is_empty());
        assert!(check_fragments(doc).is_ok());
    }

    #[test]
    fn consistent_document_passes() {
        check_fragments(WITH_FRAGMENTS).unwrap();
        check_document(WITH_FRAGMENTS, "GetNotes").unwrap();
    }

    #[test]
    fn missing_definition_is_reported() {
        let doc = "query Q { notes { ...Basic } }";
        let err = check_fragments(doc).unwrap_err();
        assert!(err.to_string().contains("without definition: Basic"));
    }

    #[test]
    fn unused_definition_is_reported() {
        let doc = "fragment Basic on notes { id }\nquery Q { notes { id } }";
        let err = check_fragments(doc).unwrap_err();
        assert!(err.to_string().contains("never spread: Basic"));
    }

    #[test]
    fn duplicate_definition_is_reported() {
        let doc = "fragment A on notes { id }\nfragment A on notes { id }\nquery Q { notes { ...A } }";
        let err = check_fragments(doc).unwrap_err();
        assert!(err.to_string().contains("more than once: A"));
    }

    #[test]
    fn operation_name_mismatch_is_reported() {
        let err = check_document("query Other { a }", "Expected").unwrap_err();
        assert!(matches!(err, Error::Document(_)));
    }
}
