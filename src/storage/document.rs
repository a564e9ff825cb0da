//! Schema-less documents
//!
//! Documents are JSON objects identified by their `_id` field. The helpers in
//! this module implement the collection semantics shared by every
//! `DocumentStore` over a plain `Vec<Document>`.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{UndoError, UndoResult};

/// Name of the identity field of every document
pub const ID_FIELD: &str = "_id";

/// A schema-less document
pub type Document = Map<String, Value>;

/// Opaque document identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh store-assigned identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Read the identity of a document, if it has a string one
    pub fn of(doc: &Document) -> Option<Self> {
        doc.get(ID_FIELD)
            .and_then(Value::as_str)
            .map(|s| Self(s.to_string()))
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Sort direction for ordered finds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Convert a JSON value into a document
pub fn into_document(value: Value) -> UndoResult<Document> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(UndoError::Validation(format!(
            "Expected a JSON object document, got {}",
            json_kind(&other)
        ))),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Insert a document, assigning an identity when it has none
///
/// A document carrying an `_id` that is already taken is rejected.
pub fn insert(docs: &mut Vec<Document>, mut doc: Document) -> UndoResult<DocumentId> {
    let id = match doc.get(ID_FIELD).cloned() {
        None | Some(Value::Null) => {
            let id = DocumentId::generate();
            doc.insert(ID_FIELD.to_string(), Value::String(id.0.clone()));
            id
        }
        Some(Value::String(s)) => DocumentId(s),
        Some(other) => {
            return Err(UndoError::Validation(format!(
                "Document identity must be a string, got {}",
                json_kind(&other)
            )))
        }
    };

    if position(docs, &id).is_some() {
        return Err(UndoError::document_conflict(id.as_str()));
    }

    docs.push(doc);
    Ok(id)
}

/// Index of the document with the given identity
pub fn position(docs: &[Document], id: &DocumentId) -> Option<usize> {
    docs.iter()
        .position(|d| d.get(ID_FIELD).and_then(Value::as_str) == Some(id.as_str()))
}

/// Up to `limit` documents ordered by `field`
///
/// Ties keep insertion order (reversed when descending), so the most recently
/// inserted of two equal keys is the "latest".
pub fn sorted(
    docs: &[Document],
    field: &str,
    direction: SortDirection,
    limit: usize,
) -> Vec<Document> {
    let mut indexed: Vec<(usize, &Document)> = docs.iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| {
        compare_values(a.get(field), b.get(field)).then(ia.cmp(ib))
    });
    if direction == SortDirection::Descending {
        indexed.reverse();
    }
    indexed
        .into_iter()
        .take(limit)
        .map(|(_, doc)| doc.clone())
        .collect()
}

/// Whether every field of `filter` is present in `doc` with an equal value
pub fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, value)| doc.get(key) == Some(value))
}

/// Replace every field of the document except its identity
pub fn replace_fields(existing: &mut Document, replacement: Document) {
    let id = existing.remove(ID_FIELD);
    existing.clear();
    for (key, value) in replacement {
        if key != ID_FIELD {
            existing.insert(key, value);
        }
    }
    if let Some(id) = id {
        existing.insert(ID_FIELD.to_string(), id);
    }
}

/// Order of field values: missing < null < bool < number < string, other kinds last
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None => 0,
            Some(Value::Null) => 1,
            Some(Value::Bool(_)) => 2,
            Some(Value::Number(_)) => 3,
            Some(Value::String(_)) => 4,
            Some(_) => 5,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let x = x.as_f64().unwrap_or(0.0);
            let y = y.as_f64().unwrap_or(0.0);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
