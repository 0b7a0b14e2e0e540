//! YAML loading into the [`YamlNode`] document model.
//!
//! This module adapts `serde_yaml` output into the node tree that compiled
//! paths traverse. The YAML parser itself is external; the loader only
//! converts its value tree, inferring the canonical short tag for each
//! scalar. Anchors and aliases are resolved by `serde_yaml` during parsing,
//! so loaded trees never contain alias nodes.
//!
//! # Example
//!
//! ```
//! use yamlpath::loader::parse_yaml;
//!
//! let doc = parse_yaml("name: Alice\nage: 30").unwrap();
//! let root = doc.content().first().unwrap();
//! assert!(root.is_mapping());
//! ```

use crate::node::YamlNode;
use anyhow::{bail, Context, Result};
use serde_yaml::Value;

/// Parses a YAML string into a document node wrapping the root value.
///
/// Returning a document node means `$` and the implicit root behave the
/// same way on loaded trees as they do on externally supplied ones: the
/// root matcher unwraps the document to its single content child.
///
/// # Errors
///
/// Returns an error if the input is not valid YAML, if a mapping key is a
/// collection, or if the document uses application-specific tags.
pub fn parse_yaml(input: &str) -> Result<YamlNode> {
    let value: Value = serde_yaml::from_str(input).context("failed to parse YAML")?;
    Ok(YamlNode::document(convert_value(value)?))
}

/// Converts a `serde_yaml::Value` into a [`YamlNode`].
fn convert_value(value: Value) -> Result<YamlNode> {
    let node = match value {
        Value::Null => YamlNode::null(),

        Value::Bool(b) => YamlNode::boolean(b),

        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                YamlNode::integer(i)
            } else {
                // u64 values beyond i64 range degrade to float
                YamlNode::float(n.as_f64().unwrap_or(0.0))
            }
        }

        Value::String(s) => YamlNode::string(s),

        Value::Sequence(seq) => {
            let elements: Result<Vec<YamlNode>> = seq.into_iter().map(convert_value).collect();
            YamlNode::sequence(elements?)
        }

        Value::Mapping(map) => {
            let mut pairs = Vec::with_capacity(map.len());
            for (k, v) in map {
                pairs.push((convert_key(k)?, convert_value(v)?));
            }
            YamlNode::mapping(pairs)
        }

        Value::Tagged(tagged) => {
            bail!("tagged values are not supported: !{}", tagged.tag)
        }
    };
    Ok(node)
}

/// Converts a mapping key into a scalar key node.
///
/// Non-string scalar keys keep their own tags so that key nodes compare
/// with the right type; collection keys are rejected.
fn convert_key(key: Value) -> Result<YamlNode> {
    let node = match key {
        Value::String(s) => YamlNode::string(s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                YamlNode::integer(i)
            } else {
                YamlNode::float(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::Bool(b) => YamlNode::boolean(b),
        Value::Null => YamlNode::null(),
        _ => bail!("collection mapping keys are not supported"),
    };
    Ok(node)
}
