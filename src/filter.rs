//! Filter predicate construction and evaluation.
//!
//! Turns a filter parse tree into a [`Filter`] predicate over a pair of
//! nodes: the node under test and the query root. Comparison operands are
//! scanners producing typed values — a literal yields its single value, a
//! `@`/`$` term recompiles its captured subpath into a path and collects
//! the scalar results. A comparison holds when both sides produce at least
//! one value and every left/right pair is compatible and accepted by the
//! operator; an existence test holds when its path selects anything at all.

use regex::Regex;

use crate::comparison::{compare_typed_values, Comparator, TypedValue, ValueKind};
use crate::filter_parser::FilterNode;
use crate::lexer::LexemeKind;
use crate::node::YamlNode;
use crate::path::Path;

/// A compiled filter predicate.
#[derive(Debug)]
pub(crate) enum Filter {
    /// Matches nothing; produced for shapes the lexer should have rejected.
    Never,
    /// A bare `@`/`$` term: true when the path selects at least one node.
    Exists(Scanner),
    Compare {
        op: Comparator,
        lhs: Scanner,
        rhs: Scanner,
    },
    Matches {
        lhs: Scanner,
        regex: Regex,
    },
    Not(Box<Filter>),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

/// Produces the typed values of one side of a comparison.
#[derive(Debug)]
pub(crate) enum Scanner {
    Literal(TypedValue),
    /// A `@` or `$` subpath, compiled once at filter-build time. A subpath
    /// that failed to recompile selects nothing.
    Nodes {
        relative_to_root: bool,
        path: Option<Box<Path>>,
    },
}

impl Scanner {
    fn select<'a>(&self, node: &'a YamlNode, root: &'a YamlNode) -> Vec<&'a YamlNode> {
        match self {
            Scanner::Literal(_) => Vec::new(),
            Scanner::Nodes {
                relative_to_root,
                path,
            } => match path {
                Some(path) => path.find(if *relative_to_root { root } else { node }),
                None => Vec::new(),
            },
        }
    }

    /// The typed values this side contributes to a comparison. Only scalar
    /// nodes carry typed values.
    fn values(&self, node: &YamlNode, root: &YamlNode) -> Vec<TypedValue> {
        match self {
            Scanner::Literal(value) => vec![value.clone()],
            Scanner::Nodes { .. } => self
                .select(node, root)
                .into_iter()
                .filter_map(TypedValue::from_node)
                .collect(),
        }
    }

    fn exists(&self, node: &YamlNode, root: &YamlNode) -> bool {
        match self {
            Scanner::Literal(_) => true,
            Scanner::Nodes { .. } => !self.select(node, root).is_empty(),
        }
    }
}

impl Filter {
    /// Evaluates the predicate against a node, with `root` available to
    /// `$` subpaths.
    pub(crate) fn matches(&self, node: &YamlNode, root: &YamlNode) -> bool {
        match self {
            Filter::Never => false,
            Filter::Exists(scanner) => scanner.exists(node, root),
            Filter::Compare { op, lhs, rhs } => {
                let lhs = lhs.values(node, root);
                let rhs = rhs.values(node, root);
                if lhs.is_empty() || rhs.is_empty() {
                    return false;
                }
                lhs.iter().all(|l| {
                    rhs.iter().all(|r| {
                        l.compatible_with(r) && op.accepts(compare_typed_values(l, r))
                    })
                })
            }
            Filter::Matches { lhs, regex } => {
                let values = lhs.values(node, root);
                if values.is_empty() {
                    return false;
                }
                values
                    .iter()
                    .all(|v| v.kind == ValueKind::String && regex.is_match(&v.text))
            }
            Filter::Not(inner) => !inner.matches(node, root),
            Filter::And(a, b) => a.matches(node, root) && b.matches(node, root),
            Filter::Or(a, b) => a.matches(node, root) || b.matches(node, root),
        }
    }
}

/// Builds a predicate from a filter parse tree. An absent tree (empty
/// filter) matches nothing.
pub(crate) fn build_filter(tree: Option<&FilterNode>) -> Filter {
    let node = match tree {
        Some(node) => node,
        None => return Filter::Never,
    };
    match node.lexeme.kind {
        LexemeKind::FilterAt | LexemeKind::Root => match term_scanner(node) {
            Some(scanner) => Filter::Exists(scanner),
            None => Filter::Never,
        },
        LexemeKind::FilterEquality
        | LexemeKind::FilterInequality
        | LexemeKind::FilterGreaterThan
        | LexemeKind::FilterGreaterThanOrEqual
        | LexemeKind::FilterLessThan
        | LexemeKind::FilterLessThanOrEqual => {
            let op = match node.lexeme.comparator() {
                Some(op) => op,
                None => return Filter::Never,
            };
            let scanners = (
                node.children.first().and_then(term_scanner),
                node.children.get(1).and_then(term_scanner),
            );
            match scanners {
                (Some(lhs), Some(rhs)) => Filter::Compare { op, lhs, rhs },
                _ => Filter::Never,
            }
        }
        LexemeKind::FilterMatchesRegularExpression => {
            let lhs = node.children.first().and_then(term_scanner);
            let regex = node.children.get(1).and_then(|child| {
                if child.lexeme.kind == LexemeKind::FilterRegularExpressionLiteral {
                    Regex::new(&child.lexeme.literal_value()).ok()
                } else {
                    None
                }
            });
            match (lhs, regex) {
                (Some(lhs), Some(regex)) => Filter::Matches { lhs, regex },
                _ => Filter::Never,
            }
        }
        LexemeKind::FilterNot => {
            Filter::Not(Box::new(build_filter(node.children.first())))
        }
        LexemeKind::FilterAnd => Filter::And(
            Box::new(build_filter(node.children.first())),
            Box::new(build_filter(node.children.get(1))),
        ),
        LexemeKind::FilterOr => Filter::Or(
            Box::new(build_filter(node.children.first())),
            Box::new(build_filter(node.children.get(1))),
        ),
        _ => Filter::Never,
    }
}

/// Builds the scanner for a comparison operand.
fn term_scanner(node: &FilterNode) -> Option<Scanner> {
    match node.lexeme.kind {
        LexemeKind::FilterAt | LexemeKind::Root => {
            let expression: String = node
                .subpath
                .iter()
                .map(|lexeme| lexeme.val.as_str())
                .collect();
            Some(Scanner::Nodes {
                relative_to_root: node.lexeme.kind == LexemeKind::Root,
                path: Path::new(&expression).ok().map(Box::new),
            })
        }
        LexemeKind::FilterIntegerLiteral
        | LexemeKind::FilterFloatLiteral
        | LexemeKind::FilterStringLiteral
        | LexemeKind::FilterBooleanLiteral
        | LexemeKind::FilterNullLiteral => node.lexeme.typed_value().map(Scanner::Literal),
        _ => None,
    }
}
