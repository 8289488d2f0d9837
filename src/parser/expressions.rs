//! Expression parsing implementation
//!
//! This module handles the expression productions:
//!
//! ```text
//! Expr       ::= [ "-" ] Term { ( "+" | "-" ) Term }
//! Term       ::= Factor { ( "*" | "/" | "%" ) Factor }
//! Factor     ::= Designator [ ActPars ] | number | charConst
//!              | "new" ident [ "[" Expr "]" ] | "(" Expr ")"
//! Designator ::= ident { "." ident | "[" Expr "]" }
//! Relop      ::= "==" | "!=" | ">" | ">=" | "<" | "<="
//! ```
//!
//! Each production returns an [`Operand`] carrying the kind, type, and
//! address the caller needs for type checks and load requests.  Constants
//! stay unloaded until an operator combines them with something else, which
//! lets a leading minus fold into the literal at compile time.
//!
//! All parsing methods are `pub(crate)` methods on the [`Parser`] struct.

use crate::codegen::{CompareOp, Opcode, Operand, OperandKind};
use crate::parser::lexer::TokenKind;
use crate::parser::parse::Parser;
use crate::symtab::{ObjKind, Type, TypeKind};

impl Parser {
    /// Expr = [ "-" ] Term { ( "+" | "-" ) Term }.
    pub(crate) fn expr(&mut self) -> Operand {
        let negated = self.sym == TokenKind::Minus;
        if negated {
            self.scan();
        }
        let mut x = self.term();

        if negated {
            if !x.ty.compatible_with(&self.tab.int_type) {
                self.error("operand must be of type int");
            }
            if x.kind == OperandKind::Con {
                // Fold the negation into the literal.
                x.val = x.val.wrapping_neg();
            } else {
                self.code.load(&mut x);
                self.code.put(Opcode::Neg);
            }
        }

        while self.sym == TokenKind::Plus || self.sym == TokenKind::Minus {
            let op = self.addop();
            self.code.load(&mut x);
            let mut y = self.term();
            self.code.load(&mut y);
            let int_ty = self.tab.int_type.clone();
            if !x.ty.compatible_with(&int_ty) || !y.ty.compatible_with(&int_ty) {
                self.error("operands must be of type int");
            }
            self.code.put(op);
            x = Operand::stack(int_ty);
        }
        x
    }

    /// Term = Factor { ( "*" | "/" | "%" ) Factor }.
    pub(crate) fn term(&mut self) -> Operand {
        let mut x = self.factor();

        while matches!(
            self.sym,
            TokenKind::Times | TokenKind::Slash | TokenKind::Rem
        ) {
            let op = self.mulop();
            self.code.load(&mut x);
            let mut y = self.factor();
            self.code.load(&mut y);
            let int_ty = self.tab.int_type.clone();
            if !x.ty.compatible_with(&int_ty) || !y.ty.compatible_with(&int_ty) {
                self.error("operands must be of type int");
            }
            self.code.put(op);
            x = Operand::stack(int_ty);
        }
        x
    }

    /// Factor = Designator [ ActPars ] | number | charConst
    ///        | "new" ident [ "[" Expr "]" ] | "(" Expr ")".
    pub(crate) fn factor(&mut self) -> Operand {
        match self.sym {
            TokenKind::Ident => {
                let x = self.designator();
                if self.sym == TokenKind::Lpar {
                    self.act_pars(&x);
                    // The call leaves its result on the stack.
                    Operand::stack(x.ty.clone())
                } else {
                    x
                }
            }
            TokenKind::Number => {
                self.scan();
                Operand::constant(self.t.val, self.tab.int_type.clone())
            }
            TokenKind::CharCon => {
                self.scan();
                Operand::constant(self.t.val, self.tab.char_type.clone())
            }
            TokenKind::New => {
                self.scan();
                self.check(TokenKind::Ident);
                let ty = match self.tab.find(&self.t.text) {
                    Ok(obj) if obj.kind == ObjKind::Type => obj.ty,
                    Ok(_) => {
                        self.error("type expected");
                        self.tab.none_type.clone()
                    }
                    Err(e) => {
                        self.error(&e.to_string());
                        self.tab.none_type.clone()
                    }
                };
                if self.sym == TokenKind::Lbrack {
                    self.scan();
                    let mut len = self.expr();
                    if !len.ty.compatible_with(&self.tab.int_type) {
                        self.error("array size must be of type int");
                    }
                    self.code.load(&mut len);
                    self.check(TokenKind::Rbrack);

                    self.code.put(Opcode::NewArray);
                    self.code.put_byte(if ty.kind == TypeKind::Char { 0 } else { 1 });
                    Operand::stack(Type::array(ty))
                } else {
                    if ty.kind == TypeKind::Class {
                        self.code.put(Opcode::New);
                        self.code.put2(ty.n_fields() as i16);
                    } else if ty.kind != TypeKind::None {
                        self.error("class type expected");
                    }
                    Operand::stack(ty)
                }
            }
            TokenKind::Lpar => {
                self.scan();
                let x = self.expr();
                self.check(TokenKind::Rpar);
                x
            }
            _ => {
                self.error("invalid factor");
                Operand::from_obj(&self.tab.no_obj())
            }
        }
    }

    /// Designator = ident { "." ident | "[" Expr "]" }.
    ///
    /// Folds field accesses and array indexing into successive operand
    /// states, loading the record or array reference as it goes.  A failed
    /// resolution poisons the operand with the none type so the suffixes
    /// still parse without piling up more reports.
    pub(crate) fn designator(&mut self) -> Operand {
        self.check(TokenKind::Ident);
        let mut x = match self.tab.find(&self.t.text) {
            Ok(obj) => Operand::from_obj(&obj),
            Err(e) => {
                self.error(&e.to_string());
                Operand::from_obj(&self.tab.no_obj())
            }
        };

        loop {
            if self.sym == TokenKind::Period {
                self.scan();
                self.check(TokenKind::Ident);
                if x.ty.kind == TypeKind::Class {
                    self.code.load(&mut x);
                    match self.tab.find_field(&self.t.text, &x.ty) {
                        Ok(fld) => {
                            x.kind = OperandKind::Fld;
                            x.adr = fld.adr;
                            x.ty = fld.ty;
                        }
                        Err(e) => {
                            self.error(&e.to_string());
                            x = Operand::from_obj(&self.tab.no_obj());
                        }
                    }
                } else if x.ty.kind != TypeKind::None {
                    self.error("invalid field access");
                }
            } else if self.sym == TokenKind::Lbrack {
                self.scan();
                if x.ty.kind == TypeKind::Arr {
                    self.code.load(&mut x);
                    let mut index = self.expr();
                    if !index.ty.compatible_with(&self.tab.int_type) {
                        self.error("array index must be of type int");
                    }
                    self.code.load(&mut index);
                    self.check(TokenKind::Rbrack);
                    x.kind = OperandKind::Elem;
                    x.ty = match &x.ty.elem {
                        Some(elem) => elem.clone(),
                        None => self.tab.none_type.clone(),
                    };
                } else {
                    if x.ty.kind != TypeKind::None {
                        self.error("invalid array access");
                    }
                    self.expr();
                    self.check(TokenKind::Rbrack);
                    x = Operand::from_obj(&self.tab.no_obj());
                }
            } else {
                break;
            }
        }
        x
    }

    /// Relop = "==" | "!=" | ">" | ">=" | "<" | "<=".
    ///
    /// Recovers with equality so the enclosing condition can finish its
    /// checks after a report.
    pub(crate) fn relop(&mut self) -> CompareOp {
        let op = match self.sym {
            TokenKind::Eql => CompareOp::Eq,
            TokenKind::Neq => CompareOp::Ne,
            TokenKind::Lss => CompareOp::Lt,
            TokenKind::Leq => CompareOp::Le,
            TokenKind::Gtr => CompareOp::Gt,
            TokenKind::Geq => CompareOp::Ge,
            _ => {
                self.error("relational operator expected");
                return CompareOp::Eq;
            }
        };
        self.scan();
        op
    }

    /// Addop = "+" | "-".
    pub(crate) fn addop(&mut self) -> Opcode {
        let op = match self.sym {
            TokenKind::Plus => Opcode::Add,
            TokenKind::Minus => Opcode::Sub,
            _ => {
                self.error("+ or - expected");
                return Opcode::Trap;
            }
        };
        self.scan();
        op
    }

    /// Mulop = "*" | "/" | "%".
    pub(crate) fn mulop(&mut self) -> Opcode {
        let op = match self.sym {
            TokenKind::Times => Opcode::Mul,
            TokenKind::Slash => Opcode::Div,
            TokenKind::Rem => Opcode::Rem,
            _ => {
                self.error("*, / or % expected");
                return Opcode::Trap;
            }
        };
        self.scan();
        op
    }
}
