//! Statement parsing implementation
//!
//! This module handles the statement-level productions:
//!
//! ```text
//! Block     ::= "{" { Statement } "}"
//! Statement ::= Designator ( "=" Expr | ActPars ) ";"
//!             | "if" "(" Condition ")" Statement [ "else" Statement ]
//!             | "while" "(" Condition ")" Statement
//!             | "return" Expr ";"
//!             | "read" "(" Designator ")" ";"
//!             | "print" "(" Expr [ "," number ] ")" ";"
//!             | Block | ";"
//! ActPars   ::= "(" [ Expr { "," Expr } ] ")"
//! Condition ::= Expr Relop Expr
//! ```
//!
//! A statement that starts with an unexpected token is reported once and the
//! parser skips ahead to the statement synchronization set before trying
//! again.  All parsing methods are `pub(crate)` methods on the [`Parser`]
//! struct.

use crate::codegen::{CompareOp, Operand, OperandKind};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Parser, EXPR_START, STAT_SEQ_FOLLOW, STAT_START, STAT_SYNC};
use crate::symtab::TypeKind;

impl Parser {
    /// Block = "{" { Statement } "}".
    ///
    /// Blocks do not open a scope of their own; only program, class, and
    /// method bodies do.
    pub(crate) fn block(&mut self) {
        self.check(TokenKind::Lbrace);
        while !STAT_SEQ_FOLLOW.contains(self.sym) {
            self.statement();
        }
        self.check(TokenKind::Rbrace);
    }

    pub(crate) fn statement(&mut self) {
        if !STAT_START.contains(self.sym) {
            self.error("invalid start of statement");
            self.recover(STAT_SYNC);
            if self.sym == TokenKind::Semicolon {
                self.scan();
            }
            self.err_dist = 0;
        }

        match self.sym {
            TokenKind::Ident => {
                let x = self.designator();
                if self.sym == TokenKind::Assign {
                    self.scan();
                    let y = self.expr();
                    if !matches!(
                        x.kind,
                        OperandKind::Local
                            | OperandKind::Static
                            | OperandKind::Fld
                            | OperandKind::Elem
                            | OperandKind::None
                    ) {
                        self.error("cannot assign to this operand");
                    }
                    if !y.ty.compatible_with(&x.ty) {
                        self.error("incompatible types in assignment");
                    }
                } else if self.sym == TokenKind::Lpar {
                    self.act_pars(&x);
                } else {
                    self.error("assignment operator or parameter list expected");
                }
                self.check(TokenKind::Semicolon);
            }
            TokenKind::If => {
                self.scan();
                self.check(TokenKind::Lpar);
                self.condition();
                self.check(TokenKind::Rpar);
                self.statement();
                if self.sym == TokenKind::Else {
                    self.scan();
                    self.statement();
                }
            }
            TokenKind::While => {
                self.scan();
                self.check(TokenKind::Lpar);
                self.condition();
                self.check(TokenKind::Rpar);
                self.statement();
            }
            TokenKind::Return => {
                self.scan();
                if EXPR_START.contains(self.sym) {
                    let mut x = self.expr();
                    self.code.load(&mut x);
                } else {
                    self.error("return value expected");
                }
                self.check(TokenKind::Semicolon);
            }
            TokenKind::Read => {
                self.scan();
                self.check(TokenKind::Lpar);
                let x = self.designator();
                if !matches!(x.ty.kind, TypeKind::Int | TypeKind::Char | TypeKind::None) {
                    self.error("operand of read must be of type int or char");
                }
                self.check(TokenKind::Rpar);
                self.check(TokenKind::Semicolon);
            }
            TokenKind::Print => {
                self.scan();
                self.check(TokenKind::Lpar);
                let mut x = self.expr();
                if !matches!(x.ty.kind, TypeKind::Int | TypeKind::Char | TypeKind::None) {
                    self.error("operand of print must be of type int or char");
                }
                self.code.load(&mut x);
                if self.sym == TokenKind::Comma {
                    self.scan();
                    self.check(TokenKind::Number);
                }
                self.check(TokenKind::Rpar);
                self.check(TokenKind::Semicolon);
            }
            TokenKind::Lbrace => self.block(),
            TokenKind::Semicolon => self.scan(),
            _ => {}
        }
    }

    /// ActPars = "(" [ Expr { "," Expr } ] ")".
    ///
    /// Loads each actual parameter and checks it against the callee's formal
    /// parameters, both by count and by type.
    pub(crate) fn act_pars(&mut self, meth: &Operand) {
        self.check(TokenKind::Lpar);
        if meth.kind != OperandKind::Meth && meth.kind != OperandKind::None {
            self.error("called object is not a method");
        }
        let formals = meth.obj.as_ref().map(|o| (o.n_pars, o.locals.clone()));

        let mut n_act = 0;
        if EXPR_START.contains(self.sym) {
            loop {
                let mut x = self.expr();
                self.code.load(&mut x);
                if let Some((n_pars, pars)) = &formals {
                    if n_act < *n_pars {
                        if let Some(par) = pars.get(n_act) {
                            if !x.ty.compatible_with(&par.ty) {
                                self.error("parameter type mismatch");
                            }
                        }
                    }
                }
                n_act += 1;
                if self.sym == TokenKind::Comma {
                    self.scan();
                } else {
                    break;
                }
            }
        }
        if let Some((n_pars, _)) = &formals {
            if n_act > *n_pars {
                self.error("more actual than formal parameters");
            } else if n_act < *n_pars {
                self.error("fewer actual than formal parameters");
            }
        }
        self.check(TokenKind::Rpar);
    }

    /// Condition = Expr Relop Expr.
    ///
    /// Both operands are loaded and must be compatible; reference types only
    /// support equality and inequality, since value ordering is undefined
    /// for them.
    pub(crate) fn condition(&mut self) -> CompareOp {
        let mut x = self.expr();
        self.code.load(&mut x);
        let op = self.relop();
        let mut y = self.expr();
        self.code.load(&mut y);

        if !x.ty.compatible_with(&y.ty) {
            self.error("incompatible types in comparison");
        }
        if x.ty.is_ref() && op != CompareOp::Eq && op != CompareOp::Ne {
            self.error("reference types can only be compared for equality");
        }
        op
    }
}
