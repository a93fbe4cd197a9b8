//! Index schema flattening.
//!
//! Search engines report an index's field mapping as a tree: terminal fields
//! carry an engine type (`text`, `keyword`, `integer`, ...) and object fields
//! carry named children. Profiles are authored against a flat view of that
//! tree, where every leaf appears under its dotted path:
//!
//! ```text
//! person                          person.name        → Text
//! ├── name (text)        ──▶      person.age         → NotSupported
//! ├── age  (integer)              person.address.city → Text
//! └── address
//!     └── city (text)
//! ```
//!
//! Only `text` fields are matchable by the compiled multi-field query, so
//! every other leaf type classifies as [`FieldType::NotSupported`].
//!
//! # Depth cutoff
//!
//! Nesting is followed up to a maximum depth (the root's direct children
//! are depth 1). When descending into an object would exceed the maximum,
//! the object itself is recorded once as `NotSupported` and its children are
//! not visited. Field names containing a literal `.` are not escaped and can
//! collide with nested paths.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sift_core::{Error, Result};

use crate::types::SearchField;

/// Maximum object nesting followed by default.
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Engine type name of full-text analyzed fields.
const TEXT_TYPE: &str = "text";

/// Engine type name of plain object fields.
const OBJECT_TYPE: &str = "object";

/// A node in an engine field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldNode {
    /// A terminal field with the engine-reported type name.
    Leaf(String),
    /// An object field with named children.
    Object(FieldTree),
}

impl FieldNode {
    /// Shorthand for a terminal field.
    pub fn leaf(kind: impl Into<String>) -> Self {
        Self::Leaf(kind.into())
    }

    /// Shorthand for an object field built from `(name, node)` pairs.
    pub fn object<I, S>(children: I) -> Self
    where
        I: IntoIterator<Item = (S, FieldNode)>,
        S: Into<String>,
    {
        Self::Object(
            children
                .into_iter()
                .map(|(name, node)| (name.into(), node))
                .collect(),
        )
    }
}

/// Top-level fields of a mapping, keyed by field name.
pub type FieldTree = BTreeMap<String, FieldNode>;

/// Parse a mapping document of the form `{"properties": {...}}`.
///
/// A node with `properties` and no `type` (or type `object`) is an object;
/// every other node is terminal. `nested` fields are terminal.
pub fn parse_field_tree(mapping: &Value) -> Result<FieldTree> {
    match mapping.get("properties") {
        None => Ok(FieldTree::new()),
        Some(properties) => parse_properties(properties),
    }
}

fn parse_properties(properties: &Value) -> Result<FieldTree> {
    let entries = properties
        .as_object()
        .ok_or_else(|| Error::parse("mapping 'properties' is not an object"))?;

    entries
        .iter()
        .map(|(name, node)| parse_node(name, node).map(|parsed| (name.clone(), parsed)))
        .collect()
}

fn parse_node(name: &str, node: &Value) -> Result<FieldNode> {
    if !node.is_object() {
        return Err(Error::parse(format!(
            "mapping entry '{name}' is not an object"
        )));
    }

    let kind = node.get("type").and_then(Value::as_str);
    match (kind, node.get("properties")) {
        (None | Some(OBJECT_TYPE), Some(properties)) => {
            Ok(FieldNode::Object(parse_properties(properties)?))
        }
        (None | Some(OBJECT_TYPE), None) => Ok(FieldNode::Object(FieldTree::new())),
        (Some(kind), _) => Ok(FieldNode::Leaf(kind.to_string())),
    }
}

/// Whether a flattened field can take part in profile matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    /// Full-text analyzed field.
    Text,
    /// Any other leaf type, or an object cut off by the depth limit.
    NotSupported,
}

impl FieldType {
    /// Classify an engine type name.
    pub fn classify(kind: &str) -> Self {
        if kind == TEXT_TYPE {
            Self::Text
        } else {
            Self::NotSupported
        }
    }
}

/// Dotted-path view of an index mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlattenedSchema {
    fields: BTreeMap<String, FieldType>,
}

impl FlattenedSchema {
    /// Flatten a field tree, following nesting up to `max_depth`.
    pub fn flatten(mapping: &FieldTree, max_depth: usize) -> Self {
        let mut fields = BTreeMap::new();

        for (name, node) in mapping {
            match node {
                FieldNode::Leaf(kind) => {
                    fields.insert(name.clone(), FieldType::classify(kind));
                }
                FieldNode::Object(children) => {
                    flatten_object(name, children, 1, max_depth, &mut fields);
                }
            }
        }

        Self { fields }
    }

    /// Look up the type of a dotted path.
    pub fn get(&self, path: &str) -> Option<FieldType> {
        self.fields.get(path).copied()
    }

    /// Number of flattened entries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the mapping had no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate entries in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.fields.iter().map(|(path, kind)| (path.as_str(), *kind))
    }

    /// Paths of all fields a profile may match against.
    pub fn searchable_fields(&self) -> BTreeSet<String> {
        self.iter()
            .filter(|(_, kind)| *kind == FieldType::Text)
            .map(|(path, _)| path.to_string())
            .collect()
    }

    /// Field list for a new profile: every searchable field, enabled, with
    /// the default boost.
    pub fn default_search_fields(&self) -> Vec<SearchField> {
        self.searchable_fields()
            .into_iter()
            .map(SearchField::enabled)
            .collect()
    }
}

impl FromIterator<(String, FieldType)> for FlattenedSchema {
    fn from_iter<I: IntoIterator<Item = (String, FieldType)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn flatten_object(
    path: &str,
    children: &FieldTree,
    depth: usize,
    max_depth: usize,
    fields: &mut BTreeMap<String, FieldType>,
) {
    let depth = depth + 1;

    if depth > max_depth {
        fields.insert(path.to_string(), FieldType::NotSupported);
        return;
    }

    for (name, node) in children {
        let child_path = format!("{path}.{name}");
        match node {
            FieldNode::Leaf(kind) => {
                fields.insert(child_path, FieldType::classify(kind));
            }
            FieldNode::Object(grandchildren) => {
                flatten_object(&child_path, grandchildren, depth, max_depth, fields);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
