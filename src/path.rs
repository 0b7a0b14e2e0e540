//! Path compilation and evaluation.
//!
//! The compiler consumes the lexeme stream one lexeme at a time and folds
//! it into a chain of matchers, each holding the compiled remainder of the
//! path. Evaluation walks the chain: every matcher maps the current node to
//! zero or more nodes and hands each to the rest of the chain, so a step
//! that matches nothing makes the whole tail match nothing.
//!
//! Evaluation never fails. Kind mismatches, missing children and
//! out-of-range subscripts select nothing; only compilation reports errors.

use crate::error::PathError;
use crate::filter::{build_filter, Filter};
use crate::filter_parser::parse_filter;
use crate::lexer::{LexemeKind, Lexer};
use crate::node::{YamlKind, YamlNode};
use crate::slicer;

/// A compiled path expression.
///
/// A `Path` owns only its matcher chain and may be reused across many
/// documents, including concurrently, as long as the node trees it
/// traverses are not mutated during evaluation.
///
/// # Example
///
/// ```
/// use yamlpath::{parse_yaml, Path};
///
/// let doc = parse_yaml("store:\n  bicycle:\n    color: red").unwrap();
/// let path = Path::new("$.store.bicycle.color").unwrap();
/// let results = path.find(&doc);
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].value(), "red");
/// ```
#[derive(Debug)]
pub struct Path {
    matcher: Matcher,
}

impl Path {
    /// Compiles a path expression.
    ///
    /// A path without a leading `$` has one prepended implicitly.
    ///
    /// # Errors
    ///
    /// Returns a [`PathError`] describing the first syntax error, with the
    /// position at which lexing failed and a quoted context window.
    pub fn new(expression: &str) -> Result<Path, PathError> {
        let mut lexer = Lexer::new(expression);
        let matcher = compile(&mut lexer)?;
        Ok(Path { matcher })
    }

    /// Evaluates the path against a node, returning references to the
    /// matching nodes in document order.
    ///
    /// The node acts as both the starting point and the root that `$`
    /// binds to inside filters. Duplicates are possible when several
    /// sub-paths select the same node.
    pub fn find<'a>(&self, node: &'a YamlNode) -> Vec<&'a YamlNode> {
        let mut results = Vec::new();
        self.matcher.select(node, node, &mut results);
        results
    }
}

/// One step of a compiled path, holding the compiled remainder.
#[derive(Debug)]
enum Matcher {
    /// Yields the current node, unwrapping a document to its content.
    Identity,
    /// Unwraps a document to its content child; other nodes pass through.
    Root(Box<Matcher>),
    /// `.name` or `.*`; `keys` selects the matched key node instead of the
    /// value.
    DotChild {
        name: String,
        keys: bool,
        next: Box<Matcher>,
    },
    /// A union of quoted child names, applied in declared order.
    BracketChildren {
        names: Vec<String>,
        keys: bool,
        next: Box<Matcher>,
    },
    /// `..name`, `..*` or bare `..`: visit the node and every descendant.
    RecursiveDescent { name: String, next: Box<Matcher> },
    /// An array subscript, resolved against each sequence's length.
    ArraySubscript { subscript: String, next: Box<Matcher> },
    /// A filter applied to each child of the current node.
    Filter { filter: Filter, next: Box<Matcher> },
}

/// Compiles the remainder of the lexeme stream into a matcher chain.
fn compile(lexer: &mut Lexer) -> Result<Matcher, PathError> {
    let lexeme = lexer.next_lexeme();
    match lexeme.kind {
        LexemeKind::Error => Err(PathError::Syntax { message: lexeme.val }),

        LexemeKind::Identity | LexemeKind::Eof => Ok(Matcher::Identity),

        LexemeKind::Root => Ok(Matcher::Root(Box::new(compile(lexer)?))),

        LexemeKind::DotChild => {
            let name = lexeme.val.trim_start_matches('.').to_string();
            let keys = consume_property_name(lexer);
            Ok(Matcher::DotChild {
                name,
                keys,
                next: Box::new(compile(lexer)?),
            })
        }

        LexemeKind::BracketChild => {
            let body = &lexeme.val[1..lexeme.val.len() - 1];
            let names = bracket_child_names(body);
            let keys = consume_property_name(lexer);
            Ok(Matcher::BracketChildren {
                names,
                keys,
                next: Box::new(compile(lexer)?),
            })
        }

        LexemeKind::RecursiveDescent => {
            let name = lexeme.val.trim_start_matches('.').to_string();
            Ok(Matcher::RecursiveDescent {
                name,
                next: Box::new(compile(lexer)?),
            })
        }

        LexemeKind::ArraySubscript => {
            let subscript = lexeme.val[1..lexeme.val.len() - 1].to_string();
            Ok(Matcher::ArraySubscript {
                subscript,
                next: Box::new(compile(lexer)?),
            })
        }

        LexemeKind::FilterBegin => {
            let mut inner = Vec::new();
            let mut depth = 1;
            loop {
                let lexeme = lexer.next_lexeme();
                match lexeme.kind {
                    LexemeKind::Error => {
                        return Err(PathError::Syntax { message: lexeme.val })
                    }
                    LexemeKind::FilterBegin => depth += 1,
                    LexemeKind::FilterEnd => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    // unreachable: the lexer reports unterminated filters
                    LexemeKind::Eof => return Err(PathError::MissingFilterEnd),
                    _ => {}
                }
                inner.push(lexeme);
            }
            let filter = build_filter(parse_filter(&inner).as_ref());
            Ok(Matcher::Filter {
                filter,
                next: Box::new(compile(lexer)?),
            })
        }

        _ => Err(PathError::InvalidPath),
    }
}

/// Consumes a `~` lexeme directly after a child lexeme, if present.
fn consume_property_name(lexer: &mut Lexer) -> bool {
    if lexer.peek_lexeme().kind == LexemeKind::PropertyName {
        lexer.next_lexeme();
        return true;
    }
    false
}

impl Matcher {
    /// Applies this matcher to `node`, handing each output to the rest of
    /// the chain and collecting the final nodes into `results`.
    fn select<'a>(&self, node: &'a YamlNode, root: &'a YamlNode, results: &mut Vec<&'a YamlNode>) {
        match self {
            Matcher::Identity => results.push(unwrap_document(node)),

            Matcher::Root(next) => {
                let node = unwrap_document(node);
                next.select(node, root, results);
            }

            Matcher::DotChild { name, keys, next } => {
                select_child(unwrap_document(node), name, *keys, next, root, results);
            }

            Matcher::BracketChildren { names, keys, next } => {
                let node = unwrap_document(node);
                for name in names {
                    select_child(node, name, *keys, next, root, results);
                }
            }

            Matcher::RecursiveDescent { name, next } => {
                if name.is_empty() || name == "*" {
                    visit_all(node, &mut |descendant| {
                        next.select(descendant, root, results);
                    });
                } else {
                    visit_all(node, &mut |descendant| {
                        select_child(descendant, name, false, next, root, results);
                    });
                }
            }

            Matcher::ArraySubscript { subscript, next } => {
                if node.kind() != YamlKind::Sequence {
                    return;
                }
                let elements = node.content();
                // cannot fail: the lexer validated the subscript
                if let Ok(indices) = slicer::slice(subscript, elements.len()) {
                    for index in indices {
                        next.select(&elements[index], root, results);
                    }
                }
            }

            Matcher::Filter { filter, next } => match node.kind() {
                YamlKind::Sequence => {
                    for element in node.content() {
                        if filter.matches(element, root) {
                            next.select(element, root, results);
                        }
                    }
                }
                YamlKind::Mapping => {
                    for (_, value) in node.entries() {
                        if filter.matches(value, root) {
                            next.select(value, root, results);
                        }
                    }
                }
                YamlKind::Scalar => {
                    if filter.matches(node, root) {
                        next.select(node, root, results);
                    }
                }
                _ => {}
            },
        }
    }
}

/// Unwraps a document to its single content child; any other node, or an
/// empty document, is returned unchanged.
fn unwrap_document(node: &YamlNode) -> &YamlNode {
    if node.kind() == YamlKind::Document {
        if let Some(root) = node.content().first() {
            return root;
        }
    }
    node
}

/// Selects a named child of a mapping, or every child for `*`, yielding
/// key nodes instead of values when `keys` is set.
fn select_child<'a>(
    node: &'a YamlNode,
    name: &str,
    keys: bool,
    next: &Matcher,
    root: &'a YamlNode,
    results: &mut Vec<&'a YamlNode>,
) {
    if node.kind() != YamlKind::Mapping {
        return;
    }
    if name == "*" {
        for (key, value) in node.entries() {
            next.select(if keys { key } else { value }, root, results);
        }
        return;
    }
    for (key, value) in node.entries() {
        if key.value() == name {
            next.select(if keys { key } else { value }, root, results);
            return;
        }
    }
}

/// Visits a node and all of its descendants in pre-order.
fn visit_all<'a>(node: &'a YamlNode, visit: &mut dyn FnMut(&'a YamlNode)) {
    visit(node);
    for child in node.content() {
        visit_all(child, visit);
    }
}

/// Splits the body of a bracket child selector into its unquoted names.
///
/// Members are separated by commas at quote depth zero; commas inside a
/// quoted name are literal. The escapes `\\`, `\'` and `\"` resolve to the
/// escaped character.
fn bracket_child_names(body: &str) -> Vec<String> {
    let segments: Vec<&str> = body.split(',').collect();
    // re-join segments split inside a quoted name: a member is complete
    // once its quotes balance
    let mut members: Vec<String> = Vec::new();
    let mut accumulator = String::new();
    for segment in segments {
        let candidate = if accumulator.is_empty() {
            segment.to_string()
        } else {
            format!("{},{}", accumulator, segment)
        };
        if balanced(&candidate, '\'') && balanced(&candidate, '"') {
            members.push(candidate);
            accumulator = String::new();
        } else {
            accumulator = candidate;
        }
    }
    if !accumulator.is_empty() {
        members.push(accumulator);
    }

    members
        .iter()
        .map(|member| {
            let member = member.trim();
            let member = if member.starts_with('\'') {
                member
                    .strip_prefix('\'')
                    .and_then(|m| m.strip_suffix('\''))
                    .unwrap_or(member)
            } else {
                member
                    .strip_prefix('"')
                    .and_then(|m| m.strip_suffix('"'))
                    .unwrap_or(member)
            };
            unescape(member)
        })
        .collect()
}

/// Returns true if the unescaped occurrences of `quote` pair off.
fn balanced(s: &str, quote: char) -> bool {
    let mut balanced = true;
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        if c == quote {
            balanced = !balanced;
        }
    }
    balanced
}

/// Drops the backslash from each escape sequence.
fn unescape(raw: &str) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut escaped = false;
    for c in raw.chars() {
        if escaped {
            escaped = false;
            result.push(c);
            continue;
        }
        if c == '\\' {
            escaped = true;
            continue;
        }
        result.push(c);
    }
    result
}
