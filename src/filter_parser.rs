//! Filter expression parser.
//!
//! Consumes the lexemes between a matched `[?(` and `)]` pair and produces
//! an operator tree. Terminal nodes are literals or `@`/`$` terms carrying
//! their captured subpath lexemes; non-terminal nodes are labelled with a
//! boolean or comparison operator. Brackets group but never appear in the
//! tree.
//!
//! Precedence, loosest to tightest: `||`, `&&`, unary `!`, comparison,
//! term. `||` and `&&` are left-associative. A comparison after a negated
//! term belongs to the negation's operand: `!@.a > 1` parses as
//! `!(@.a > 1)`.
//!
//! The lexer has already rejected malformed filters, so the parser does
//! not produce errors: an unparseable slice (which would indicate a lexer
//! bug) yields `None`, which builds into a predicate matching nothing.

use crate::lexer::{Lexeme, LexemeKind};

/// A node of a filter expression parse tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FilterNode {
    pub(crate) lexeme: Lexeme,
    /// The relative path following a `@` or `$` term, kept as raw lexemes
    /// until the filter is built against a concrete root.
    pub(crate) subpath: Vec<Lexeme>,
    pub(crate) children: Vec<FilterNode>,
}

impl FilterNode {
    fn terminal(lexeme: Lexeme, subpath: Vec<Lexeme>) -> Self {
        FilterNode {
            lexeme,
            subpath,
            children: Vec::new(),
        }
    }

    fn operator(lexeme: Lexeme, children: Vec<FilterNode>) -> Self {
        FilterNode {
            lexeme,
            subpath: Vec::new(),
            children,
        }
    }
}

/// Parses a slice of filter lexemes into a tree. Returns `None` for an
/// empty filter.
pub(crate) fn parse_filter(lexemes: &[Lexeme]) -> Option<FilterNode> {
    let mut parser = FilterParser { input: lexemes, pos: 0 };
    if parser.peek_kind().is_none() {
        return None;
    }
    parser.expression()
}

struct FilterParser<'a> {
    input: &'a [Lexeme],
    pos: usize,
}

impl<'a> FilterParser<'a> {
    fn peek_kind(&self) -> Option<LexemeKind> {
        self.input.get(self.pos).map(|l| l.kind)
    }

    fn next_lexeme(&mut self) -> Option<Lexeme> {
        let lexeme = self.input.get(self.pos)?.clone();
        self.pos += 1;
        Some(lexeme)
    }

    /// `expression := conjunction ( '||' conjunction )*`
    fn expression(&mut self) -> Option<FilterNode> {
        let mut tree = self.conjunction()?;
        while self.peek_kind() == Some(LexemeKind::FilterOr) {
            let op = self.next_lexeme()?;
            let rhs = self.conjunction()?;
            tree = FilterNode::operator(op, vec![tree, rhs]);
        }
        Some(tree)
    }

    /// `conjunction := basic_filter ( '&&' basic_filter )*`
    fn conjunction(&mut self) -> Option<FilterNode> {
        let mut tree = self.basic_filter()?;
        while self.peek_kind() == Some(LexemeKind::FilterAnd) {
            let op = self.next_lexeme()?;
            let rhs = self.basic_filter()?;
            tree = FilterNode::operator(op, vec![tree, rhs]);
        }
        Some(tree)
    }

    /// `basic_filter := '!' basic_filter | term ( comparison term )?`
    fn basic_filter(&mut self) -> Option<FilterNode> {
        if self.peek_kind() == Some(LexemeKind::FilterNot) {
            let op = self.next_lexeme()?;
            let operand = self.basic_filter()?;
            return Some(FilterNode::operator(op, vec![operand]));
        }
        let term = self.filter_term()?;
        match self.peek_kind() {
            Some(
                LexemeKind::FilterEquality
                | LexemeKind::FilterInequality
                | LexemeKind::FilterGreaterThan
                | LexemeKind::FilterGreaterThanOrEqual
                | LexemeKind::FilterLessThan
                | LexemeKind::FilterLessThanOrEqual
                | LexemeKind::FilterMatchesRegularExpression,
            ) => {
                let op = self.next_lexeme()?;
                let rhs = self.filter_term()?;
                Some(FilterNode::operator(op, vec![term, rhs]))
            }
            _ => Some(term),
        }
    }

    /// `term := literal | '@' subpath | '$' subpath | '(' expression ')'`
    fn filter_term(&mut self) -> Option<FilterNode> {
        match self.peek_kind()? {
            LexemeKind::FilterAt | LexemeKind::Root => {
                let lexeme = self.next_lexeme()?;
                let subpath = self.absorb_subpath()?;
                Some(FilterNode::terminal(lexeme, subpath))
            }
            LexemeKind::FilterIntegerLiteral
            | LexemeKind::FilterFloatLiteral
            | LexemeKind::FilterStringLiteral
            | LexemeKind::FilterBooleanLiteral
            | LexemeKind::FilterNullLiteral
            | LexemeKind::FilterRegularExpressionLiteral => {
                let lexeme = self.next_lexeme()?;
                Some(FilterNode::terminal(lexeme, Vec::new()))
            }
            LexemeKind::FilterOpenBracket => {
                self.next_lexeme()?;
                let inner = self.expression()?;
                if self.peek_kind() != Some(LexemeKind::FilterCloseBracket) {
                    return None;
                }
                self.next_lexeme()?;
                Some(inner)
            }
            _ => None,
        }
    }

    /// Collects the lexemes forming the relative path after `@` or `$`,
    /// keeping nested filter blocks intact.
    fn absorb_subpath(&mut self) -> Option<Vec<Lexeme>> {
        let mut subpath = Vec::new();
        loop {
            match self.peek_kind() {
                Some(
                    LexemeKind::Identity
                    | LexemeKind::DotChild
                    | LexemeKind::BracketChild
                    | LexemeKind::RecursiveDescent
                    | LexemeKind::ArraySubscript
                    | LexemeKind::PropertyName,
                ) => subpath.push(self.next_lexeme()?),
                Some(LexemeKind::FilterBegin) => {
                    let mut depth = 0usize;
                    loop {
                        let lexeme = self.next_lexeme()?;
                        match lexeme.kind {
                            LexemeKind::FilterBegin => depth += 1,
                            LexemeKind::FilterEnd => depth -= 1,
                            _ => {}
                        }
                        subpath.push(lexeme);
                        if depth == 0 {
                            break;
                        }
                    }
                }
                _ => break,
            }
        }
        Some(subpath)
    }
}
