//! Main parser coordinator
//!
//! This module provides the [`Parser`] struct and the core parsing
//! infrastructure: the two-token window, the consume-or-report [`check`]
//! contract, diagnostic debouncing, and token-level error recovery.
//!
//! # Parser Architecture
//!
//! The parser uses a recursive descent approach with the following
//! organization:
//! - This module: parser state, helper methods, and the parse entry point
//! - `declarations`: program, constant, variable, class, and method parsing
//! - `statements`: blocks, statements, conditions, actual parameters
//! - `expressions`: expressions, designators, and operator recognizers
//!
//! Parser methods are split across multiple files using `impl Parser`
//! blocks, allowing each module to extend the parser with related
//! functionality while maintaining access to the shared state.
//!
//! # Single pass
//!
//! There is no syntax tree.  Each production validates token shape, drives
//! the symbol table for declarations and lookups, computes the type and kind
//! of every expression, and asks the code generator for loads and operators,
//! all while the tokens stream by exactly once.
//!
//! [`check`]: Parser::check

use crate::codegen::Code;
use crate::diagnostics::Diagnostics;
use crate::parser::lexer::{Scanner, Token, TokenKind, TokenSet};
use crate::symtab::{ObjKind, SymTab, Type};
use log::{debug, trace};
use std::rc::Rc;

/// Tokens that may start an expression.
pub(crate) const EXPR_START: TokenSet = TokenSet::of(&[
    TokenKind::Ident,
    TokenKind::Number,
    TokenKind::CharCon,
    TokenKind::New,
    TokenKind::Lpar,
    TokenKind::Minus,
]);

/// Tokens that may start a statement.
pub(crate) const STAT_START: TokenSet = TokenSet::of(&[
    TokenKind::Ident,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Read,
    TokenKind::Return,
    TokenKind::Print,
    TokenKind::Lbrace,
    TokenKind::Semicolon,
]);

/// Recovery set for a bad statement start.
pub(crate) const STAT_SYNC: TokenSet = TokenSet::of(&[
    TokenKind::Eof,
    TokenKind::If,
    TokenKind::While,
    TokenKind::Read,
    TokenKind::Return,
    TokenKind::Print,
    TokenKind::Lbrace,
    TokenKind::Semicolon,
]);

/// Tokens that end a statement sequence.
pub(crate) const STAT_SEQ_FOLLOW: TokenSet =
    TokenSet::of(&[TokenKind::Rbrace, TokenKind::Eof]);

/// Recovery set for a bad declaration start.
pub(crate) const DECL_SYNC: TokenSet = TokenSet::of(&[
    TokenKind::Final,
    TokenKind::Ident,
    TokenKind::Class,
    TokenKind::Lbrace,
    TokenKind::Eof,
]);

/// Recursive-descent parser; one instance is one compilation session.
///
/// Owns the scanner, the two-token window, the diagnostics sink, the symbol
/// table, and the instruction buffer, so independent compilations never
/// share state.
pub struct Parser {
    scanner: Scanner,
    pub(crate) diags: Diagnostics,
    /// Most recently consumed token.
    pub(crate) t: Token,
    /// Lookahead token.
    pub(crate) la: Token,
    /// Kind of the lookahead token, checked on every branch.
    pub(crate) sym: TokenKind,
    /// Tokens consumed since the last reported diagnostic.
    pub(crate) err_dist: u32,
    pub(crate) tab: SymTab,
    pub(crate) code: Code,
}

impl Parser {
    /// Create a parser for the given source and prime the token window.
    pub fn new(source: &str) -> Self {
        let mut parser = Parser {
            scanner: Scanner::new(source),
            diags: Diagnostics::new(),
            t: Token::new(TokenKind::None, 0, 0),
            la: Token::new(TokenKind::None, 0, 0),
            sym: TokenKind::None,
            err_dist: 3,
            tab: SymTab::new(),
            code: Code::new(),
        };
        parser.scan();
        parser
    }

    /// Compile the whole source; returns the number of diagnostics reported.
    pub fn parse(&mut self) -> usize {
        debug!("parsing starts");
        self.program();
        if self.sym != TokenKind::Eof {
            self.error("end of file found before end of program");
        }
        debug!(
            "parsing finished: {} error(s), {} bytes of code",
            self.diags.count(),
            self.code.pc()
        );
        self.diags.count()
    }

    /// The diagnostics reported so far.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diags
    }

    /// The emitted instruction buffer.
    pub fn code(&self) -> &Code {
        &self.code
    }

    /// Shift the token window by one.
    pub(crate) fn scan(&mut self) {
        self.t = std::mem::replace(&mut self.la, self.scanner.next(&mut self.diags));
        self.sym = self.la.kind;
        self.err_dist += 1;
        trace!("line {} col {}: {}", self.la.line, self.la.col, self.la);
    }

    /// Consume the lookahead if it matches, otherwise report "X expected".
    pub(crate) fn check(&mut self, expected: TokenKind) {
        if self.sym == expected {
            self.scan();
        } else {
            self.error(&format!("{} expected", expected));
        }
    }

    /// Report a diagnostic at the lookahead position.
    ///
    /// The report is suppressed unless at least three tokens were consumed
    /// since the previous one, which keeps a single root cause from flooding
    /// the output; the distance always resets, so follow-up errors surface
    /// again once parsing has caught up.
    pub(crate) fn error(&mut self, msg: &str) {
        if self.err_dist >= 3 {
            self.diags.report(self.la.line, self.la.col, msg);
        }
        self.err_dist = 0;
    }

    /// Skip tokens until one of `sync` shows up, then force the error
    /// distance to zero so the next real error is still reported.
    pub(crate) fn recover(&mut self, sync: TokenSet) {
        while !sync.contains(self.sym) {
            self.scan();
        }
        self.err_dist = 0;
    }

    /// Declare a symbol in the current scope, reporting a duplicate as an
    /// ordinary diagnostic (the original symbol is retained).
    pub(crate) fn declare(&mut self, kind: ObjKind, name: &str, ty: Rc<Type>) {
        if let Err(e) = self.tab.insert(kind, name, ty) {
            self.error(&e.to_string());
        }
    }
}
