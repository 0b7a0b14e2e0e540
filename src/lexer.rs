//! Path expression lexer.
//!
//! The lexer is a state machine: each state inspects the input at the
//! current position, emits zero or more lexemes, and names the next state.
//! The compiler drives it one lexeme at a time, so lexing stays interleaved
//! with compilation and stops at the first error. A stack of pending states
//! lets the filter sub-language recurse into path syntax (for `@` and `$`
//! subpaths) and back out again.
//!
//! Errors are emitted as `Error` lexemes whose value is the final message,
//! carrying the failure position and a quoted context window running from
//! the previously emitted lexeme to the failure point.

use std::collections::VecDeque;

use regex::Regex;

use crate::comparison::{Comparator, TypedValue, ValueKind};
use crate::slicer;

/// The kind of a lexeme produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LexemeKind {
    /// Lexing failed; the lexeme value is the error message.
    Error,
    /// Empty path: match the input node itself.
    Identity,
    /// `$`, explicit or implicitly prepended.
    Root,
    /// `.name` or `.*`.
    DotChild,
    /// `['name']`, `["name"]`, or a comma-separated union of quoted names.
    BracketChild,
    /// `..name`, `..*`, or `..` directly before a bracket form.
    RecursiveDescent,
    /// `[i]`, `[a:b]`, `[a:b:c]`, `[*]`, or `[i,j,k]`.
    ArraySubscript,
    /// `[?(`.
    FilterBegin,
    /// `)]`.
    FilterEnd,
    /// `(` inside a filter.
    FilterOpenBracket,
    /// `)` inside a filter.
    FilterCloseBracket,
    /// `!`.
    FilterNot,
    /// `@`.
    FilterAt,
    /// `&&`.
    FilterAnd,
    /// `||`.
    FilterOr,
    /// `==`.
    FilterEquality,
    /// `!=`.
    FilterInequality,
    /// `>`.
    FilterGreaterThan,
    /// `>=`.
    FilterGreaterThanOrEqual,
    /// `<`.
    FilterLessThan,
    /// `<=`.
    FilterLessThanOrEqual,
    /// `=~`.
    FilterMatchesRegularExpression,
    FilterIntegerLiteral,
    FilterFloatLiteral,
    FilterStringLiteral,
    FilterBooleanLiteral,
    FilterNullLiteral,
    FilterRegularExpressionLiteral,
    /// `~`: select the matched child's key rather than its value.
    PropertyName,
    /// Lexing complete.
    Eof,
}

/// A token returned from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Lexeme {
    pub(crate) kind: LexemeKind,
    pub(crate) val: String,
}

impl Lexeme {
    fn new(kind: LexemeKind, val: impl Into<String>) -> Self {
        Lexeme {
            kind,
            val: val.into(),
        }
    }

    pub(crate) fn eof() -> Self {
        Lexeme::new(LexemeKind::Eof, "")
    }

    /// Returns the literal's effective value: string literals lose their
    /// quotes and regular expression literals their delimiters.
    pub(crate) fn literal_value(&self) -> String {
        match self.kind {
            LexemeKind::FilterStringLiteral => self.val[1..self.val.len() - 1].to_string(),
            LexemeKind::FilterRegularExpressionLiteral => sanitise_regex_literal(&self.val),
            _ => self.val.clone(),
        }
    }

    /// Maps a comparison lexeme to its comparator.
    pub(crate) fn comparator(&self) -> Option<Comparator> {
        match self.kind {
            LexemeKind::FilterEquality => Some(Comparator::Equal),
            LexemeKind::FilterInequality => Some(Comparator::NotEqual),
            LexemeKind::FilterGreaterThan => Some(Comparator::GreaterThan),
            LexemeKind::FilterGreaterThanOrEqual => Some(Comparator::GreaterThanOrEqual),
            LexemeKind::FilterLessThan => Some(Comparator::LessThan),
            LexemeKind::FilterLessThanOrEqual => Some(Comparator::LessThanOrEqual),
            _ => None,
        }
    }

    /// Converts a literal lexeme into a typed value for comparison.
    pub(crate) fn typed_value(&self) -> Option<TypedValue> {
        let kind = match self.kind {
            LexemeKind::FilterIntegerLiteral => ValueKind::Integer,
            LexemeKind::FilterFloatLiteral => ValueKind::Float,
            LexemeKind::FilterStringLiteral => ValueKind::String,
            LexemeKind::FilterBooleanLiteral => ValueKind::Boolean,
            LexemeKind::FilterNullLiteral => ValueKind::Null,
            _ => return None,
        };
        Some(TypedValue::new(kind, self.literal_value()))
    }

    fn is_literal_kind(kind: LexemeKind) -> bool {
        matches!(
            kind,
            LexemeKind::FilterIntegerLiteral
                | LexemeKind::FilterFloatLiteral
                | LexemeKind::FilterStringLiteral
                | LexemeKind::FilterBooleanLiteral
                | LexemeKind::FilterNullLiteral
        )
    }
}

/// Strips the `/` delimiters from a regular expression literal and
/// unescapes embedded slashes.
pub(crate) fn sanitise_regex_literal(raw: &str) -> String {
    raw[1..raw.len() - 1].replace("\\/", "/")
}

/// A lexer state. Each state consumes input and names its successor; no
/// successor means lexing is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Path,
    SubPath,
    FilterExprInitial,
    FilterExpr,
    FilterTerm,
    EndBracketFilter,
}

/// The scanner state for a single path expression.
pub(crate) struct Lexer<'a> {
    input: &'a str,
    /// Start position of the lexeme being scanned.
    start: usize,
    /// Current position in the input.
    pos: usize,
    state: Option<State>,
    /// Pending states to resume when a subpath or bracketed region ends.
    stack: Vec<State>,
    items: VecDeque<Lexeme>,
    last_emitted_start: usize,
    last_emitted_kind: LexemeKind,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Lexer {
            input,
            start: 0,
            pos: 0,
            state: Some(State::Path),
            stack: Vec::new(),
            items: VecDeque::new(),
            last_emitted_start: 0,
            last_emitted_kind: LexemeKind::Eof,
        }
    }

    /// Returns the next lexeme, advancing the state machine as needed.
    /// Once the input is exhausted this keeps returning EOF.
    pub(crate) fn next_lexeme(&mut self) -> Lexeme {
        self.fill();
        self.items.pop_front().unwrap_or_else(Lexeme::eof)
    }

    /// Returns the next lexeme without consuming it.
    pub(crate) fn peek_lexeme(&mut self) -> &Lexeme {
        self.fill();
        &self.items[0]
    }

    fn fill(&mut self) {
        while self.items.is_empty() {
            match self.state {
                None => self.items.push_back(Lexeme::eof()),
                Some(state) => self.state = self.step(state),
            }
        }
    }

    fn step(&mut self, state: State) -> Option<State> {
        match state {
            State::Path => self.lex_path(),
            State::SubPath => self.lex_sub_path(),
            State::FilterExprInitial => self.lex_filter_expr_initial(),
            State::FilterExpr => self.lex_filter_expr(),
            State::FilterTerm => self.lex_filter_term(),
            State::EndBracketFilter => self.lex_end_bracket_filter(),
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn rest(&self) -> &str {
        &self.input[self.pos..]
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        self.rest().starts_with(prefix)
    }

    fn peek_char(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn advance(&mut self, bytes: usize) {
        self.pos += bytes;
    }

    /// The portion of the current lexeme scanned so far.
    fn value(&self) -> &str {
        &self.input[self.start..self.pos]
    }

    /// The last emitted lexeme followed by the portion scanned so far,
    /// quoted in error messages as context.
    fn context(&self) -> &str {
        &self.input[self.last_emitted_start..self.pos]
    }

    /// The next character as text, or the empty string at the end.
    fn next_char_text(&self) -> &str {
        match self.peek_char() {
            Some(c) => &self.rest()[..c.len_utf8()],
            None => "",
        }
    }

    fn emit(&mut self, kind: LexemeKind) {
        let lexeme = Lexeme::new(kind, self.value());
        self.items.push_back(lexeme);
        self.last_emitted_start = self.start;
        self.start = self.pos;
        self.last_emitted_kind = kind;
    }

    /// Emits a lexeme that was not present in the input; the scan position
    /// is left untouched.
    fn emit_synthetic(&mut self, kind: LexemeKind, val: &str) {
        self.items.push_back(Lexeme::new(kind, val));
    }

    /// Skips whitespace. Only valid directly after emitting a lexeme.
    fn strip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
        self.start = self.pos;
    }

    /// Emits an error lexeme and terminates the scan.
    fn error(&mut self, message: String) -> Option<State> {
        self.items.push_back(Lexeme::new(LexemeKind::Error, message));
        None
    }

    fn push(&mut self, state: State) {
        self.stack.push(state);
    }

    fn pop(&mut self) -> Option<State> {
        match self.stack.pop() {
            Some(state) => Some(state),
            None => self.error("lexer stack underflow".to_string()),
        }
    }

    fn lex_path(&mut self) -> Option<State> {
        if self.at_end() {
            self.emit(LexemeKind::Identity);
            self.emit(LexemeKind::Eof);
            return None;
        }
        if self.has_prefix("$") {
            self.advance(1);
            self.emit(LexemeKind::Root);
        } else {
            // no leading $: supply the root implicitly
            self.emit_synthetic(LexemeKind::Root, "$");
        }
        Some(State::SubPath)
    }

    fn lex_sub_path(&mut self) -> Option<State> {
        if self.has_prefix(")") {
            return self.pop();
        }
        if self.at_end() {
            if !self.stack.is_empty() {
                return self.pop();
            }
            self.emit(LexemeKind::Identity);
            self.emit(LexemeKind::Eof);
            return None;
        }
        if self.has_prefix("..") {
            self.advance(2);
            if !self.has_prefix("[") {
                let mut child_name = false;
                while let Some(c) = self.peek_char() {
                    if c == '.' || c == '[' {
                        break;
                    }
                    self.pos += c.len_utf8();
                    child_name = true;
                }
                if !child_name {
                    return self.error("child name missing after ..".to_string());
                }
            }
            self.emit(LexemeKind::RecursiveDescent);
            return Some(State::SubPath);
        }
        if self.has_prefix(".") {
            self.advance(1);
            let mut child_name = false;
            while let Some(c) = self.peek_char() {
                if matches!(
                    c,
                    '.' | '[' | ')' | ' ' | '&' | '|' | '=' | '!' | '>' | '<' | '~'
                ) {
                    break;
                }
                self.pos += c.len_utf8();
                child_name = true;
            }
            if !child_name {
                return self.error("child name missing after .".to_string());
            }
            self.emit(LexemeKind::DotChild);
            if let Err(next) = self.lex_optional_array_index() {
                return next;
            }
            return self.after_child();
        }
        if self.has_prefix("['") || self.has_prefix("[\"") {
            self.advance(2);
            let mut child_name = false;
            let mut escape = false;
            loop {
                if !escape && (self.has_prefix("']") || self.has_prefix("\"]")) {
                    self.advance(2);
                    break;
                }
                match self.next_char() {
                    Some(c) => {
                        escape = c == '\\' && !escape;
                        child_name = true;
                    }
                    None => return self.error("unmatched ['".to_string()),
                }
            }
            if !child_name {
                return self.error("child name missing from ['']".to_string());
            }
            self.emit(LexemeKind::BracketChild);
            if let Err(next) = self.lex_optional_array_index() {
                return next;
            }
            return self.after_child();
        }
        if self.has_prefix("[?(") {
            self.advance(3);
            self.emit(LexemeKind::FilterBegin);
            self.push(State::EndBracketFilter);
            return Some(State::FilterExprInitial);
        }
        if self.has_prefix("[") {
            if let Err(next) = self.lex_optional_array_index() {
                return next;
            }
            return self.after_child();
        }
        if self.has_prefix("~")
            && matches!(
                self.last_emitted_kind,
                LexemeKind::DotChild | LexemeKind::BracketChild
            )
        {
            self.advance(1);
            self.emit(LexemeKind::PropertyName);
            return Some(State::SubPath);
        }
        if let Some(c) = self.peek_char() {
            // a bare @ or $ term ends its (empty) subpath at an operator
            if matches!(c, ' ' | '&' | '|' | '=' | '!' | '>' | '<') && !self.stack.is_empty() {
                return self.pop();
            }
        }
        let message = format!(
            "invalid path syntax at position {}, following {:?}",
            self.pos,
            self.context()
        );
        self.error(message)
    }

    /// Consumes a plain `[...]` subscript if one is next, validating its
    /// body with the slice resolver so evaluation cannot fail later.
    fn lex_optional_array_index(&mut self) -> Result<(), Option<State>> {
        if !self.has_prefix("[")
            || self.has_prefix("['")
            || self.has_prefix("[\"")
            || self.has_prefix("[?(")
        {
            return Ok(());
        }
        self.advance(1);
        let mut subscript = false;
        loop {
            if self.has_prefix("]") {
                self.advance(1);
                break;
            }
            match self.next_char() {
                Some(_) => subscript = true,
                None => return Err(self.error("unmatched [".to_string())),
            }
        }
        if !subscript {
            return Err(self.error("subscript missing from []".to_string()));
        }
        let value = self.value().to_string();
        let body = &value[1..value.len() - 1];
        if let Err(e) = slicer::slice(body, 0) {
            let message = format!(
                "invalid array index {} before position {}: {}",
                value, self.pos, e
            );
            return Err(self.error(message));
        }
        self.emit(LexemeKind::ArraySubscript);
        Ok(())
    }

    /// After a child or subscript: an operator character hands control back
    /// to the enclosing filter, and is invalid outside one.
    fn after_child(&mut self) -> Option<State> {
        if let Some(c) = self.peek_char() {
            if matches!(c, ' ' | '&' | '|' | '=' | '!' | '>' | '<') {
                if self.stack.is_empty() {
                    let message = format!(
                        "invalid character {:?} at position {} in subpath, following {:?}",
                        self.next_char_text(),
                        self.pos,
                        self.context()
                    );
                    return self.error(message);
                }
                return self.pop();
            }
        }
        Some(State::SubPath)
    }

    /// Start of a filter expression or sub-expression: only a term, `!`,
    /// or `(` may appear.
    fn lex_filter_expr_initial(&mut self) -> Option<State> {
        self.strip_whitespace();

        if let Some(next) = self.lex_numeric_literal(State::FilterExpr) {
            return next;
        }
        if let Some(next) = self.lex_string_literal(State::FilterExpr) {
            return next;
        }
        if let Some(next) = self.lex_keyword_literal(State::FilterExpr) {
            return next;
        }

        if self.has_prefix("(") {
            self.advance(1);
            self.emit(LexemeKind::FilterOpenBracket);
            self.push(State::FilterExpr);
            return Some(State::FilterExprInitial);
        }
        if self.has_prefix(")") && !self.has_prefix(")]") {
            self.advance(1);
            self.emit(LexemeKind::FilterCloseBracket);
            return self.pop();
        }
        if self.has_prefix("!=") {
            return self.error("missing first operand for binary operator !=".to_string());
        }
        if self.has_prefix("!") {
            self.advance(1);
            self.emit(LexemeKind::FilterNot);
            return Some(State::FilterExprInitial);
        }
        if self.has_prefix("@") {
            self.advance(1);
            self.emit(LexemeKind::FilterAt);
            self.push(State::FilterExpr);
            return Some(State::SubPath);
        }
        if self.has_prefix("$") {
            self.advance(1);
            self.emit(LexemeKind::Root);
            self.push(State::FilterExpr);
            return Some(State::SubPath);
        }
        for op in ["&&", "||", "==", ">=", ">", "<=", "<"] {
            if self.has_prefix(op) {
                return self.error(format!("missing first operand for binary operator {}", op));
            }
        }
        self.pop()
    }

    /// Between terms of a filter expression: binary operators or the end
    /// of the current bracketed region.
    fn lex_filter_expr(&mut self) -> Option<State> {
        self.strip_whitespace();

        if self.at_end() {
            let message = format!(
                "missing end of filter at position {}, following {:?}",
                self.pos,
                self.context()
            );
            return self.error(message);
        }
        if self.has_prefix(")]") {
            return self.pop();
        }
        if self.has_prefix("(") {
            self.advance(1);
            self.emit(LexemeKind::FilterOpenBracket);
            self.push(State::FilterExpr);
            return Some(State::FilterExprInitial);
        }
        if self.has_prefix(")") {
            self.advance(1);
            self.emit(LexemeKind::FilterCloseBracket);
            return self.pop();
        }
        if self.has_prefix("@") {
            self.advance(1);
            self.emit(LexemeKind::FilterAt);
            self.push(State::FilterExpr);
            return Some(State::SubPath);
        }
        if self.has_prefix("&&") {
            self.advance(2);
            self.emit(LexemeKind::FilterAnd);
            self.strip_whitespace();
            return Some(State::FilterExprInitial);
        }
        if self.has_prefix("||") {
            self.advance(2);
            self.emit(LexemeKind::FilterOr);
            self.strip_whitespace();
            return Some(State::FilterExprInitial);
        }
        if self.has_prefix("==") {
            self.advance(2);
            self.emit(LexemeKind::FilterEquality);
            self.push(State::FilterExpr);
            return Some(State::FilterTerm);
        }
        if self.has_prefix("!=") {
            self.advance(2);
            self.emit(LexemeKind::FilterInequality);
            self.push(State::FilterExpr);
            return Some(State::FilterTerm);
        }
        if self.has_prefix(">=") {
            return self.lex_ordering_comparison(">=", LexemeKind::FilterGreaterThanOrEqual);
        }
        if self.has_prefix(">") {
            return self.lex_ordering_comparison(">", LexemeKind::FilterGreaterThan);
        }
        if self.has_prefix("<=") {
            return self.lex_ordering_comparison("<=", LexemeKind::FilterLessThanOrEqual);
        }
        if self.has_prefix("<") {
            return self.lex_ordering_comparison("<", LexemeKind::FilterLessThan);
        }
        if self.has_prefix("=~") {
            if Lexeme::is_literal_kind(self.last_emitted_kind) {
                let message = format!(
                    "literal cannot be matched using =~ starting at {:?} at position {}, following {:?}",
                    self.next_char_text(),
                    self.pos,
                    self.context()
                );
                return self.error(message);
            }
            self.advance(2);
            self.emit(LexemeKind::FilterMatchesRegularExpression);
            self.strip_whitespace();
            return self.lex_regular_expression_literal(State::FilterExpr);
        }
        let message = format!(
            "invalid filter syntax starting at {:?} at position {}, following {:?}",
            self.next_char_text(),
            self.pos,
            self.context()
        );
        self.error(message)
    }

    /// Ordering comparisons reject string operands on either side: strings
    /// equate but never order.
    fn lex_ordering_comparison(&mut self, op: &str, kind: LexemeKind) -> Option<State> {
        if self.context().starts_with('\'') || self.context().starts_with('"') {
            let message = format!(
                "strings cannot be compared using {} at position {}, following {:?}",
                op,
                self.pos,
                self.context()
            );
            return self.error(message);
        }
        self.advance(op.len());
        self.emit(kind);
        self.strip_whitespace();
        if self.has_prefix("'") || self.has_prefix("\"") {
            let message = format!(
                "strings cannot be compared using {} at position {}, following {:?}",
                op,
                self.pos,
                self.context()
            );
            return self.error(message);
        }
        self.push(State::FilterExpr);
        Some(State::FilterTerm)
    }

    /// The term following a binary comparison operator.
    fn lex_filter_term(&mut self) -> Option<State> {
        self.strip_whitespace();

        if self.has_prefix("@") {
            self.advance(1);
            self.emit(LexemeKind::FilterAt);
            return Some(State::SubPath);
        }
        if self.has_prefix("$") {
            self.advance(1);
            self.emit(LexemeKind::Root);
            return Some(State::SubPath);
        }
        if let Some(next) = self.lex_numeric_literal(State::FilterExpr) {
            return next;
        }
        if let Some(next) = self.lex_string_literal(State::FilterExpr) {
            return next;
        }
        if let Some(next) = self.lex_keyword_literal(State::FilterExpr) {
            return next;
        }
        if self.has_prefix(")]") || self.has_prefix(")") {
            return self.error("missing filter term".to_string());
        }
        self.error("invalid filter term".to_string())
    }

    /// Resumed after the filter expression completes; consumes `)]`.
    fn lex_end_bracket_filter(&mut self) -> Option<State> {
        if self.has_prefix(")]") {
            self.advance(2);
            self.emit(LexemeKind::FilterEnd);
            return Some(State::SubPath);
        }
        self.error("invalid filter syntax: missing )]".to_string())
    }

    /// Scans a numeric literal if one is next. Returns the next state,
    /// which is itself absent when the literal was malformed.
    fn lex_numeric_literal(&mut self, next_state: State) -> Option<Option<State>> {
        let c = self.peek_char()?;
        if c != '.' && c != '-' && !c.is_ascii_digit() {
            return None;
        }
        let mut float = c == '.';
        self.pos += c.len_utf8();
        while let Some(n) = self.peek_char() {
            if n == '.' {
                float = true;
                self.pos += 1;
            } else if n.is_ascii_digit() {
                self.pos += 1;
            } else {
                break;
            }
        }
        if float {
            if let Err(e) = self.value().parse::<f64>() {
                let value = self.value().to_string();
                return Some(self.error(format!("invalid float literal {:?}: {}", value, e)));
            }
            self.emit(LexemeKind::FilterFloatLiteral);
        } else {
            if let Err(e) = self.value().parse::<i64>() {
                let value = self.value().to_string();
                return Some(self.error(format!("invalid integer literal {:?}: {}", value, e)));
            }
            self.emit(LexemeKind::FilterIntegerLiteral);
        }
        Some(Some(next_state))
    }

    /// Scans a quoted string literal if one is next.
    fn lex_string_literal(&mut self, next_state: State) -> Option<Option<State>> {
        let delim = match self.peek_char() {
            Some(c @ ('\'' | '"')) => c,
            _ => return None,
        };
        let pos = self.pos;
        let context = self.context().to_string();
        self.pos += 1;
        loop {
            match self.next_char() {
                None => {
                    return Some(self.error(format!(
                        "unmatched string delimiter \"{}\" at position {}, following {:?}",
                        delim, pos, context
                    )));
                }
                Some(c) if c == delim => break,
                Some(_) => {}
            }
        }
        self.emit(LexemeKind::FilterStringLiteral);
        Some(Some(next_state))
    }

    /// Scans a bare `true`, `false` or `null` word, case-insensitively.
    fn lex_keyword_literal(&mut self, next_state: State) -> Option<Option<State>> {
        let word: String = self
            .rest()
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect();
        let kind = if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
            LexemeKind::FilterBooleanLiteral
        } else if word.eq_ignore_ascii_case("null") {
            LexemeKind::FilterNullLiteral
        } else {
            return None;
        };
        self.pos += word.len();
        self.emit(kind);
        Some(Some(next_state))
    }

    /// Scans a `/.../` regular expression literal, compiling it so invalid
    /// patterns are reported at lex time.
    fn lex_regular_expression_literal(&mut self, next_state: State) -> Option<State> {
        if !self.has_prefix("/") {
            let message = format!(
                "regular expression does not start with / at position {}, following {:?}",
                self.pos,
                self.context()
            );
            return self.error(message);
        }
        let pos = self.pos;
        let context = self.context().to_string();
        let mut escape = false;
        loop {
            if self.next_char().is_none() {
                return self.error(format!(
                    "unmatched regular expression delimiter \"/\" at position {}, following {:?}",
                    pos, context
                ));
            }
            if !escape && self.has_prefix("/") {
                break;
            }
            escape = !escape && self.has_prefix("\\");
        }
        self.advance(1);
        if let Err(e) = Regex::new(&sanitise_regex_literal(self.value())) {
            return self.error(format!(
                "invalid regular expression position {}, following {:?}: {}",
                pos, context, e
            ));
        }
        self.emit(LexemeKind::FilterRegularExpressionLiteral);
        Some(next_state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex_all(input: &str) -> Vec<Lexeme> {
        let mut lexer = Lexer::new(input);
        let mut lexemes = Vec::new();
        loop {
            let lexeme = lexer.next_lexeme();
            let kind = lexeme.kind;
            lexemes.push(lexeme);
            if kind == LexemeKind::Eof || kind == LexemeKind::Error {
                break;
            }
        }
        lexemes
    }

    fn kinds(input: &str) -> Vec<LexemeKind> {
        lex_all(input).iter().map(|l| l.kind).collect()
    }

    fn vals(input: &str) -> Vec<String> {
        lex_all(input).iter().map(|l| l.val.clone()).collect()
    }

    fn error_message(input: &str) -> String {
        let lexemes = lex_all(input);
        let last = lexemes.last().unwrap();
        assert_eq!(last.kind, LexemeKind::Error, "expected an error for {input:?}");
        last.val.clone()
    }

    use super::LexemeKind::*;

    #[test]
    fn test_empty_path() {
        assert_eq!(kinds(""), vec![Identity, Eof]);
    }

    #[test]
    fn test_root_only() {
        assert_eq!(kinds("$"), vec![Root, Identity, Eof]);
    }

    #[test]
    fn test_implicit_root_is_synthesised() {
        assert_eq!(kinds(".child"), vec![Root, DotChild, Identity, Eof]);
        assert_eq!(vals(".child"), vec!["$", ".child", "", ""]);
    }

    #[test]
    fn test_dot_child() {
        assert_eq!(vals("$.child"), vec!["$", ".child", "", ""]);
    }

    #[test]
    fn test_dot_child_chain() {
        assert_eq!(
            kinds("$.store.book"),
            vec![Root, DotChild, DotChild, Identity, Eof]
        );
    }

    #[test]
    fn test_dot_child_wildcard() {
        let lexemes = lex_all("$.*");
        assert_eq!(lexemes[1].kind, DotChild);
        assert_eq!(lexemes[1].val, ".*");
    }

    #[test]
    fn test_dot_child_name_missing() {
        assert_eq!(error_message("$."), "child name missing after .");
    }

    #[test]
    fn test_bracket_child() {
        let lexemes = lex_all("$['child']");
        assert_eq!(lexemes[1].kind, BracketChild);
        assert_eq!(lexemes[1].val, "['child']");
    }

    #[test]
    fn test_bracket_child_double_quoted() {
        let lexemes = lex_all(r#"$["child"]"#);
        assert_eq!(lexemes[1].kind, BracketChild);
        assert_eq!(lexemes[1].val, r#"["child"]"#);
    }

    #[test]
    fn test_bracket_child_union() {
        let lexemes = lex_all("$['a','b']");
        assert_eq!(lexemes[1].kind, BracketChild);
        assert_eq!(lexemes[1].val, "['a','b']");
    }

    #[test]
    fn test_bracket_child_with_embedded_bracket() {
        let lexemes = lex_all("$['a]b']");
        assert_eq!(lexemes[1].kind, BracketChild);
        assert_eq!(lexemes[1].val, "['a]b']");
    }

    #[test]
    fn test_bracket_child_with_escaped_quote() {
        let lexemes = lex_all(r"$['it\'s']");
        assert_eq!(lexemes[1].kind, BracketChild);
        assert_eq!(lexemes[1].val, r"['it\'s']");
    }

    #[test]
    fn test_bracket_child_unmatched() {
        assert_eq!(error_message("$['child"), "unmatched ['");
    }

    #[test]
    fn test_bracket_child_empty() {
        assert_eq!(error_message("$['']"), "child name missing from ['']");
    }

    #[test]
    fn test_recursive_descent() {
        let lexemes = lex_all("$..price");
        assert_eq!(lexemes[1].kind, RecursiveDescent);
        assert_eq!(lexemes[1].val, "..price");
    }

    #[test]
    fn test_recursive_descent_wildcard() {
        let lexemes = lex_all("$..*");
        assert_eq!(lexemes[1].kind, RecursiveDescent);
        assert_eq!(lexemes[1].val, "..*");
    }

    #[test]
    fn test_recursive_descent_before_bracket() {
        let lexemes = lex_all("$..['a']");
        assert_eq!(lexemes[1].kind, RecursiveDescent);
        assert_eq!(lexemes[1].val, "..");
        assert_eq!(lexemes[2].kind, BracketChild);
    }

    #[test]
    fn test_recursive_descent_before_subscript() {
        assert_eq!(
            kinds("$..[0]"),
            vec![Root, RecursiveDescent, ArraySubscript, Identity, Eof]
        );
    }

    #[test]
    fn test_recursive_descent_name_missing() {
        assert_eq!(error_message("$.."), "child name missing after ..");
    }

    #[test]
    fn test_array_subscript_index() {
        let lexemes = lex_all("$.book[0]");
        assert_eq!(lexemes[2].kind, ArraySubscript);
        assert_eq!(lexemes[2].val, "[0]");
    }

    #[test]
    fn test_array_subscript_at_root() {
        assert_eq!(kinds("$[0]"), vec![Root, ArraySubscript, Identity, Eof]);
    }

    #[test]
    fn test_array_subscript_slice_forms() {
        for form in ["[1:3]", "[-1:]", "[::2]", "[*]", "[0,2,4]"] {
            let input = format!("$.a{}", form);
            let lexemes = lex_all(&input);
            assert_eq!(lexemes[2].kind, ArraySubscript, "form {form}");
            assert_eq!(lexemes[2].val, form);
        }
    }

    #[test]
    fn test_array_subscript_chained() {
        assert_eq!(
            kinds("$.a[0][1]"),
            vec![Root, DotChild, ArraySubscript, ArraySubscript, Identity, Eof]
        );
    }

    #[test]
    fn test_array_subscript_unmatched() {
        assert_eq!(error_message("$.a[0"), "unmatched [");
    }

    #[test]
    fn test_array_subscript_empty() {
        assert_eq!(error_message("$.a[]"), "subscript missing from []");
    }

    #[test]
    fn test_array_subscript_non_integer() {
        assert_eq!(
            error_message("$.a[x]"),
            "invalid array index [x] before position 6: non-integer array index"
        );
    }

    #[test]
    fn test_array_subscript_zero_step() {
        assert_eq!(
            error_message("$.a[1:2:0]"),
            "invalid array index [1:2:0] before position 10: array index step value must be non-zero"
        );
    }

    #[test]
    fn test_array_subscript_too_many_colons() {
        assert_eq!(
            error_message("$.a[1:2:3:4]"),
            "invalid array index [1:2:3:4] before position 12: malformed array index, too many colons"
        );
    }

    #[test]
    fn test_array_subscript_wildcard_in_union() {
        assert_eq!(
            error_message("$.a[0,*]"),
            "invalid array index [0,*] before position 8: wildcard cannot be used in union"
        );
    }

    #[test]
    fn test_property_name_after_dot_child() {
        assert_eq!(
            kinds("$.a~"),
            vec![Root, DotChild, PropertyName, Identity, Eof]
        );
    }

    #[test]
    fn test_property_name_after_bracket_child() {
        assert_eq!(
            kinds("$['a']~"),
            vec![Root, BracketChild, PropertyName, Identity, Eof]
        );
    }

    #[test]
    fn test_property_name_after_wildcard() {
        assert_eq!(
            kinds("$.*~"),
            vec![Root, DotChild, PropertyName, Identity, Eof]
        );
    }

    #[test]
    fn test_property_name_without_child_fails() {
        let message = error_message("$~");
        assert!(message.starts_with("invalid path syntax"), "{message}");
    }

    #[test]
    fn test_filter_existence() {
        assert_eq!(
            kinds("$.book[?(@.isbn)]"),
            vec![Root, DotChild, FilterBegin, FilterAt, DotChild, FilterEnd, Identity, Eof]
        );
    }

    #[test]
    fn test_filter_bare_at() {
        assert_eq!(
            kinds("$[?(@==null)]"),
            vec![Root, FilterBegin, FilterAt, FilterEquality, FilterNullLiteral, FilterEnd, Identity, Eof]
        );
    }

    #[test]
    fn test_filter_comparison_with_integer() {
        assert_eq!(
            kinds("$[?(@.price > 10)]"),
            vec![
                Root,
                FilterBegin,
                FilterAt,
                DotChild,
                FilterGreaterThan,
                FilterIntegerLiteral,
                FilterEnd,
                Identity,
                Eof
            ]
        );
    }

    #[test]
    fn test_filter_comparison_with_float() {
        let lexemes = lex_all("$[?(@.price <= 8.95)]");
        assert!(lexemes.iter().any(|l| l.kind == FilterFloatLiteral && l.val == "8.95"));
    }

    #[test]
    fn test_filter_negative_and_leading_dot_numbers() {
        let lexemes = lex_all("$[?(@.a == -2)]");
        assert!(lexemes.iter().any(|l| l.kind == FilterIntegerLiteral && l.val == "-2"));
        let lexemes = lex_all("$[?(@.a == .5)]");
        assert!(lexemes.iter().any(|l| l.kind == FilterFloatLiteral && l.val == ".5"));
    }

    #[test]
    fn test_filter_invalid_float() {
        let message = error_message("$[?(@.a == 1.2.3)]");
        assert!(message.starts_with("invalid float literal \"1.2.3\""), "{message}");
    }

    #[test]
    fn test_filter_string_literals() {
        let lexemes = lex_all("$[?(@.category == 'fiction')]");
        assert!(lexemes.iter().any(|l| l.kind == FilterStringLiteral && l.val == "'fiction'"));
        let lexemes = lex_all(r#"$[?(@.category == "fiction")]"#);
        assert!(lexemes.iter().any(|l| l.kind == FilterStringLiteral && l.val == "\"fiction\""));
    }

    #[test]
    fn test_filter_unmatched_string_delimiter() {
        let message = error_message("$[?(@.a == 'oops)]");
        assert!(message.starts_with("unmatched string delimiter \"'\""), "{message}");
    }

    #[test]
    fn test_filter_boolean_and_null_literals_case_insensitive() {
        for (input, kind) in [
            ("$[?(@.a == true)]", FilterBooleanLiteral),
            ("$[?(@.a == False)]", FilterBooleanLiteral),
            ("$[?(@.a == TRUE)]", FilterBooleanLiteral),
            ("$[?(@.a == null)]", FilterNullLiteral),
            ("$[?(@.a == NULL)]", FilterNullLiteral),
        ] {
            let lexemes = lex_all(input);
            assert!(lexemes.iter().any(|l| l.kind == kind), "{input}");
        }
    }

    #[test]
    fn test_filter_conjunction_disjunction_negation() {
        assert_eq!(
            kinds("$[?(@.a && !@.b || @.c)]"),
            vec![
                Root,
                FilterBegin,
                FilterAt,
                DotChild,
                FilterAnd,
                FilterNot,
                FilterAt,
                DotChild,
                FilterOr,
                FilterAt,
                DotChild,
                FilterEnd,
                Identity,
                Eof
            ]
        );
    }

    #[test]
    fn test_filter_parentheses() {
        assert_eq!(
            kinds("$[?((@.a == 1) || @.b)]"),
            vec![
                Root,
                FilterBegin,
                FilterOpenBracket,
                FilterAt,
                DotChild,
                FilterEquality,
                FilterIntegerLiteral,
                FilterCloseBracket,
                FilterOr,
                FilterAt,
                DotChild,
                FilterEnd,
                Identity,
                Eof
            ]
        );
    }

    #[test]
    fn test_filter_root_subpath() {
        assert_eq!(
            kinds("$[?(@.price > $.max)]"),
            vec![
                Root,
                FilterBegin,
                FilterAt,
                DotChild,
                FilterGreaterThan,
                Root,
                DotChild,
                FilterEnd,
                Identity,
                Eof
            ]
        );
    }

    #[test]
    fn test_filter_subpath_with_subscript() {
        assert_eq!(
            kinds("$[?(@[0] > 5)]"),
            vec![
                Root,
                FilterBegin,
                FilterAt,
                ArraySubscript,
                FilterGreaterThan,
                FilterIntegerLiteral,
                FilterEnd,
                Identity,
                Eof
            ]
        );
    }

    #[test]
    fn test_filter_nested() {
        assert_eq!(
            kinds("$.a[?(@.b[?(@.c)].d == 1)]"),
            vec![
                Root,
                DotChild,
                FilterBegin,
                FilterAt,
                DotChild,
                FilterBegin,
                FilterAt,
                DotChild,
                FilterEnd,
                DotChild,
                FilterEquality,
                FilterIntegerLiteral,
                FilterEnd,
                Identity,
                Eof
            ]
        );
    }

    #[test]
    fn test_filter_regular_expression() {
        let lexemes = lex_all("$[?(@.name =~ /ab+c/)]");
        assert!(lexemes
            .iter()
            .any(|l| l.kind == FilterRegularExpressionLiteral && l.val == "/ab+c/"));
    }

    #[test]
    fn test_filter_regular_expression_with_escaped_slash() {
        let lexemes = lex_all(r"$[?(@.path =~ /a\/b/)]");
        let re = lexemes
            .iter()
            .find(|l| l.kind == FilterRegularExpressionLiteral)
            .unwrap();
        assert_eq!(re.val, r"/a\/b/");
        assert_eq!(re.literal_value(), "a/b");
    }

    #[test]
    fn test_filter_regular_expression_unmatched() {
        let message = error_message("$[?(@.a =~ /ab)]");
        assert!(
            message.starts_with("unmatched regular expression delimiter \"/\""),
            "{message}"
        );
    }

    #[test]
    fn test_filter_regular_expression_invalid() {
        let message = error_message("$[?(@.a =~ /(/)]");
        assert!(message.starts_with("invalid regular expression"), "{message}");
    }

    #[test]
    fn test_filter_regular_expression_missing_slash() {
        let message = error_message("$[?(@.a =~ x)]");
        assert!(
            message.starts_with("regular expression does not start with /"),
            "{message}"
        );
    }

    #[test]
    fn test_filter_literal_cannot_be_matched() {
        let message = error_message("$[?('x' =~ /x/)]");
        assert!(message.starts_with("literal cannot be matched using =~"), "{message}");
    }

    #[test]
    fn test_filter_strings_cannot_be_ordered() {
        for op in [">", ">=", "<", "<="] {
            let input = format!("$[?('a' {} @.b)]", op);
            let message = error_message(&input);
            assert!(
                message.starts_with(&format!("strings cannot be compared using {}", op)),
                "{op}: {message}"
            );

            let input = format!("$[?(@.b {} 'a')]", op);
            let message = error_message(&input);
            assert!(
                message.starts_with(&format!("strings cannot be compared using {}", op)),
                "{op}: {message}"
            );
        }
    }

    #[test]
    fn test_filter_missing_first_operand() {
        for op in ["&&", "||", "==", "!=", ">=", ">", "<=", "<"] {
            let input = format!("$[?({} @.a)]", op);
            assert_eq!(
                error_message(&input),
                format!("missing first operand for binary operator {}", op),
                "{op}"
            );
        }
    }

    #[test]
    fn test_filter_missing_term_after_operator() {
        assert_eq!(error_message("$[?(@.a == )]"), "missing filter term");
    }

    #[test]
    fn test_filter_missing_end() {
        let message = error_message("$[?(@.a == 1");
        assert!(message.starts_with("missing end of filter"), "{message}");
    }

    #[test]
    fn test_filter_whitespace_tolerated() {
        assert_eq!(
            kinds("$[?( @.a  ==  1 )]"),
            vec![
                Root,
                FilterBegin,
                FilterAt,
                DotChild,
                FilterEquality,
                FilterIntegerLiteral,
                FilterEnd,
                Identity,
                Eof
            ]
        );
    }

    #[test]
    fn test_invalid_path_syntax() {
        let message = error_message("$.a b");
        assert!(message.starts_with("invalid character \" \""), "{message}");
        let message = error_message("#");
        assert!(message.starts_with("invalid path syntax"), "{message}");
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("$");
        while lexer.next_lexeme().kind != Eof {}
        assert_eq!(lexer.next_lexeme().kind, Eof);
        assert_eq!(lexer.next_lexeme().kind, Eof);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("$.a");
        assert_eq!(lexer.peek_lexeme().kind, Root);
        assert_eq!(lexer.next_lexeme().kind, Root);
        assert_eq!(lexer.peek_lexeme().kind, DotChild);
        assert_eq!(lexer.next_lexeme().kind, DotChild);
    }

    #[test]
    fn test_literal_value_strips_quotes() {
        let lexeme = Lexeme::new(FilterStringLiteral, "'fiction'");
        assert_eq!(lexeme.literal_value(), "fiction");
    }

    #[test]
    fn test_unicode_child_names() {
        let lexemes = lex_all("$.café.日本語");
        assert_eq!(lexemes[1].val, ".café");
        assert_eq!(lexemes[2].val, ".日本語");
    }
}
