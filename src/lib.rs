//! YAMLPath query compiler and evaluator for YAML document trees.
//!
//! This crate compiles a textual path expression into an executable query
//! and evaluates it against an in-memory YAML node tree, returning
//! references to the matching nodes. It is the YAML analogue of JSONPath:
//! the node tree comes from an external YAML loader (an adapter over
//! `serde_yaml` is provided), and evaluation only reads it.
//!
//! # Supported Syntax
//!
//! - `$` - root node (prepended implicitly when absent)
//! - `.property` - named child access
//! - `['property']` - bracket notation, with unions: `['a','b']`
//! - `.*` - all children of a mapping
//! - `..property` / `..*` - recursive descent
//! - `[0]`, `[-1]` - array index (negative counts from the end)
//! - `[start:end:step]` - array slice
//! - `[0,2,4]` - index union
//! - `[?(...)]` - filter: comparisons, `&&`, `||`, `!`, `=~`, existence
//! - `.property~` - the key node rather than the value
//!
//! # Examples
//!
//! ```
//! use yamlpath::{parse_yaml, Path};
//!
//! let doc = parse_yaml(
//!     "store:\n  book:\n  - {title: Sword of Honour, price: 12.99}\n  - {title: Moby Dick, price: 8.99}",
//! )
//! .unwrap();
//!
//! let path = Path::new("$.store.book[?(@.price < 10)].title").unwrap();
//! let titles: Vec<&str> = path.find(&doc).iter().map(|n| n.value()).collect();
//! assert_eq!(titles, vec!["Moby Dick"]);
//! ```
//!
//! Compilation reports syntax errors with position and context; evaluation
//! never fails, it simply selects nothing for queries that match nothing.

mod comparison;
mod filter;
mod filter_parser;
mod lexer;
mod slicer;

pub mod error;
pub mod loader;
pub mod node;
pub mod path;

pub use error::PathError;
pub use loader::parse_yaml;
pub use node::{YamlKind, YamlNode};
pub use path::Path;
