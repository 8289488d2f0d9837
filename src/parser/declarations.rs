//! Declaration parsing implementation
//!
//! This module handles the declaration productions:
//!
//! ```text
//! Program    ::= "program" ident { ConstDecl | ClassDecl | VarDecl }
//!                "{" { MethodDecl } "}"
//! ConstDecl  ::= "final" Type ident "=" ( number | charConst ) ";"
//! VarDecl    ::= Type ident { "," ident } ";"
//! ClassDecl  ::= "class" ident "{" { VarDecl } "}"
//! MethodDecl ::= ( Type | "void" ) ident "(" [ FormPars ] ")" { VarDecl } Block
//! FormPars   ::= Type ident { "," Type ident }
//! Type       ::= ident [ "[" "]" ]
//! ```
//!
//! Every declaration inserts a symbol into the current scope; program, class,
//! and method bodies each open a scope of their own.  All parsing methods are
//! `pub(crate)` methods on the [`Parser`] struct.

use crate::parser::lexer::TokenKind;
use crate::parser::parse::{Parser, DECL_SYNC};
use crate::symtab::{ObjKind, Type, TypeKind};
use std::rc::Rc;

impl Parser {
    /// Program = "program" ident { ConstDecl | ClassDecl | VarDecl } "{" { MethodDecl } "}".
    pub(crate) fn program(&mut self) {
        self.check(TokenKind::Program);
        self.check(TokenKind::Ident);
        let name = self.t.text.clone();
        let none_ty = self.tab.none_type.clone();
        self.declare(ObjKind::Prog, &name, none_ty);

        self.tab.open_scope();
        loop {
            match self.sym {
                TokenKind::Class => self.class_decl(),
                TokenKind::Final => self.const_decl(),
                TokenKind::Ident => self.var_decl(ObjKind::Var),
                TokenKind::Lbrace | TokenKind::Eof => break,
                _ => {
                    self.error("invalid declaration");
                    self.recover(DECL_SYNC);
                }
            }
        }
        self.check(TokenKind::Lbrace);
        while self.sym == TokenKind::Ident || self.sym == TokenKind::Void {
            self.method_decl();
        }
        self.check(TokenKind::Rbrace);
        self.tab.close_scope();
    }

    /// ConstDecl = "final" Type ident "=" ( number | charConst ) ";".
    pub(crate) fn const_decl(&mut self) {
        self.check(TokenKind::Final);
        let ty = self.parse_type();
        self.check(TokenKind::Ident);
        let name = self.t.text.clone();
        self.declare(ObjKind::Con, &name, ty.clone());

        self.check(TokenKind::Assign);
        match self.sym {
            TokenKind::Number => {
                self.scan();
                if ty.kind != TypeKind::Int && ty.kind != TypeKind::None {
                    self.error("number does not match constant type");
                }
                self.tab.set_const_val(&name, self.t.val);
            }
            TokenKind::CharCon => {
                self.scan();
                if ty.kind != TypeKind::Char && ty.kind != TypeKind::None {
                    self.error("character constant does not match constant type");
                }
                self.tab.set_const_val(&name, self.t.val);
            }
            _ => self.error("number or character constant expected"),
        }
        self.check(TokenKind::Semicolon);
    }

    /// VarDecl = Type ident { "," ident } ";".
    ///
    /// Inserts symbols of the given kind, `Var` for ordinary variables or
    /// `Fld` inside a class body.
    pub(crate) fn var_decl(&mut self, kind: ObjKind) {
        let ty = self.parse_type();
        self.check(TokenKind::Ident);
        let name = self.t.text.clone();
        self.declare(kind, &name, ty.clone());

        while self.sym == TokenKind::Comma {
            self.scan();
            self.check(TokenKind::Ident);
            let name = self.t.text.clone();
            self.declare(kind, &name, ty.clone());
        }
        self.check(TokenKind::Semicolon);
    }

    /// ClassDecl = "class" ident "{" { VarDecl } "}".
    pub(crate) fn class_decl(&mut self) {
        self.check(TokenKind::Class);
        self.check(TokenKind::Ident);
        let name = self.t.text.clone();
        let cls = Type::class();
        // The class name goes into the enclosing scope before the fields are
        // parsed, so fields may reference their own class.
        self.declare(ObjKind::Type, &name, cls.clone());

        self.check(TokenKind::Lbrace);
        self.tab.open_scope();
        while self.sym == TokenKind::Ident {
            self.var_decl(ObjKind::Fld);
        }
        self.check(TokenKind::Rbrace);
        *cls.fields.borrow_mut() = self.tab.close_scope();
    }

    /// MethodDecl = ( Type | "void" ) ident "(" [ FormPars ] ")" { VarDecl } Block.
    pub(crate) fn method_decl(&mut self) {
        let ty = if self.sym == TokenKind::Void {
            self.scan();
            self.tab.none_type.clone()
        } else {
            self.parse_type()
        };
        self.check(TokenKind::Ident);
        let name = self.t.text.clone();
        self.declare(ObjKind::Meth, &name, ty);

        self.tab.open_scope();
        self.check(TokenKind::Lpar);
        let n_pars = if self.sym == TokenKind::Ident {
            self.form_pars()
        } else {
            0
        };
        self.check(TokenKind::Rpar);
        // Publish the signature before the body is parsed so recursive calls
        // resolve against the right parameter list.
        let pars = self.tab.current_locals();
        self.tab.set_method_attrs(&name, n_pars, pars);

        while self.sym == TokenKind::Ident {
            self.var_decl(ObjKind::Var);
        }
        self.block();
        let locals = self.tab.close_scope();
        self.tab.set_method_attrs(&name, n_pars, locals);
    }

    /// FormPars = Type ident { "," Type ident }.  Returns the parameter count.
    pub(crate) fn form_pars(&mut self) -> usize {
        let mut n_pars = 0;
        let ty = self.parse_type();
        self.check(TokenKind::Ident);
        let name = self.t.text.clone();
        self.declare(ObjKind::Var, &name, ty);
        n_pars += 1;

        while self.sym == TokenKind::Comma {
            self.scan();
            let ty = self.parse_type();
            self.check(TokenKind::Ident);
            let name = self.t.text.clone();
            self.declare(ObjKind::Var, &name, ty);
            n_pars += 1;
        }
        n_pars
    }

    /// Type = ident [ "[" "]" ].
    ///
    /// The identifier must resolve to an already declared type; anything else
    /// is reported and the none type takes its place so parsing goes on.
    pub(crate) fn parse_type(&mut self) -> Rc<Type> {
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
            self.check(TokenKind::Rbrack);
            Type::array(ty)
        } else {
            ty
        }
    }
}
