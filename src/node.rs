//! YAML node representation consumed and produced by path evaluation.
//!
//! This module provides the in-memory YAML document model that compiled
//! paths traverse. A [`YamlNode`] carries a [`YamlKind`], a canonical short
//! tag and textual value (for scalars), and an ordered list of child nodes.
//! Mapping nodes store their children as alternating key/value pairs, which
//! keeps key order, permits duplicate keys, and makes keys addressable as
//! nodes in their own right (the `~` property-name selector returns them).
//!
//! # Example
//!
//! ```
//! use yamlpath::node::{YamlKind, YamlNode};
//!
//! let doc = YamlNode::document(YamlNode::mapping(vec![
//!     (YamlNode::string("name"), YamlNode::string("yamlpath")),
//!     (YamlNode::string("stars"), YamlNode::integer(42)),
//! ]));
//!
//! assert_eq!(doc.kind(), YamlKind::Document);
//! let root = doc.content().first().unwrap();
//! assert_eq!(root.entries().count(), 2);
//! ```

/// The structural kind of a YAML node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YamlKind {
    /// A document wrapper holding exactly one content child (the root).
    Document,
    /// A mapping; content alternates key and value nodes.
    Mapping,
    /// A sequence; content holds the elements in order.
    Sequence,
    /// A scalar with a textual value and a canonical short tag.
    Scalar,
    /// An alias referring to an anchored node elsewhere in the document.
    Alias,
}

pub(crate) const TAG_NULL: &str = "!!null";
pub(crate) const TAG_BOOL: &str = "!!bool";
pub(crate) const TAG_INT: &str = "!!int";
pub(crate) const TAG_FLOAT: &str = "!!float";
pub(crate) const TAG_STR: &str = "!!str";

/// A node in a YAML document tree.
///
/// Collection nodes own their children; path evaluation returns shared
/// references into the tree and never copies or constructs nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlNode {
    kind: YamlKind,
    tag: String,
    value: String,
    content: Vec<YamlNode>,
    anchor: Option<String>,
}

impl YamlNode {
    /// Creates a document node wrapping a single root node.
    pub fn document(root: YamlNode) -> Self {
        Self {
            kind: YamlKind::Document,
            tag: String::new(),
            value: String::new(),
            content: vec![root],
            anchor: None,
        }
    }

    /// Creates a mapping node from key/value pairs, preserving their order.
    pub fn mapping(pairs: Vec<(YamlNode, YamlNode)>) -> Self {
        let mut content = Vec::with_capacity(pairs.len() * 2);
        for (key, value) in pairs {
            content.push(key);
            content.push(value);
        }
        Self {
            kind: YamlKind::Mapping,
            tag: String::new(),
            value: String::new(),
            content,
            anchor: None,
        }
    }

    /// Creates a sequence node from its elements.
    pub fn sequence(elements: Vec<YamlNode>) -> Self {
        Self {
            kind: YamlKind::Sequence,
            tag: String::new(),
            value: String::new(),
            content: elements,
            anchor: None,
        }
    }

    /// Creates a scalar node with an explicit canonical short tag.
    pub fn scalar(tag: &str, value: impl Into<String>) -> Self {
        Self {
            kind: YamlKind::Scalar,
            tag: tag.to_string(),
            value: value.into(),
            content: Vec::new(),
            anchor: None,
        }
    }

    /// Creates a string scalar.
    pub fn string(value: impl Into<String>) -> Self {
        Self::scalar(TAG_STR, value)
    }

    /// Creates an integer scalar.
    pub fn integer(value: i64) -> Self {
        Self::scalar(TAG_INT, value.to_string())
    }

    /// Creates a float scalar.
    pub fn float(value: f64) -> Self {
        Self::scalar(TAG_FLOAT, value.to_string())
    }

    /// Creates a boolean scalar.
    pub fn boolean(value: bool) -> Self {
        Self::scalar(TAG_BOOL, value.to_string())
    }

    /// Creates a null scalar.
    pub fn null() -> Self {
        Self::scalar(TAG_NULL, "null")
    }

    /// Creates an alias node referring to the given anchor name.
    ///
    /// Path evaluation treats aliases as opaque leaves; see the crate
    /// documentation for the alias policy.
    pub fn alias(anchor: impl Into<String>) -> Self {
        let anchor = anchor.into();
        Self {
            kind: YamlKind::Alias,
            tag: String::new(),
            value: anchor.clone(),
            content: Vec::new(),
            anchor: Some(anchor),
        }
    }

    /// Returns the node's structural kind.
    pub fn kind(&self) -> YamlKind {
        self.kind
    }

    /// Returns the canonical short tag (empty for non-scalars).
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Returns the scalar's textual value (empty for non-scalars).
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the ordered child nodes.
    ///
    /// For mappings the list alternates key and value nodes; prefer
    /// [`entries`](Self::entries) when iterating pairs.
    pub fn content(&self) -> &[YamlNode] {
        &self.content
    }

    /// Returns the anchor name if this node carries one.
    pub fn anchor(&self) -> Option<&str> {
        self.anchor.as_deref()
    }

    /// Sets the anchor name for this node.
    pub fn set_anchor(&mut self, anchor: Option<String>) {
        self.anchor = anchor;
    }

    /// Returns true if this node is a mapping.
    pub fn is_mapping(&self) -> bool {
        self.kind == YamlKind::Mapping
    }

    /// Returns true if this node is a sequence.
    pub fn is_sequence(&self) -> bool {
        self.kind == YamlKind::Sequence
    }

    /// Returns true if this node is a scalar.
    pub fn is_scalar(&self) -> bool {
        self.kind == YamlKind::Scalar
    }

    /// Iterates a mapping's key/value pairs in insertion order.
    ///
    /// Yields nothing for non-mapping nodes and ignores a trailing
    /// unpaired key.
    pub fn entries(&self) -> impl Iterator<Item = (&YamlNode, &YamlNode)> {
        let pairs: &[YamlNode] = if self.kind == YamlKind::Mapping {
            &self.content
        } else {
            &[]
        };
        pairs.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }
}
