//! Symbol table: declared symbols, type descriptors, and the scope stack.
//!
//! The parser is the only client.  It opens a scope when it enters the
//! program, a class body, or a method, inserts a symbol for every
//! declaration, and resolves identifiers through [`SymTab::find`] and
//! [`SymTab::find_field`].  Scopes nest strictly; closing one returns its
//! symbols so class bodies and methods can keep their own layout.
//!
//! The outermost scope (the universe) is pre-seeded with the `int` and
//! `char` types and the `null` constant before parsing begins.

use std::cell::RefCell;
use std::rc::Rc;
use thiserror::Error;

/// What a declared name stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    Con,
    Var,
    Type,
    Meth,
    Fld,
    Prog,
    None,
}

/// A declared symbol.
#[derive(Debug, Clone)]
pub struct Obj {
    pub kind: ObjKind,
    pub name: String,
    pub ty: Rc<Type>,
    /// Scope-relative storage slot, assigned at insertion (variables and
    /// fields only).
    pub adr: i32,
    /// Scope depth at declaration; 1 is the program scope, so anything at or
    /// below it loads as a global.
    pub level: usize,
    /// Number of formal parameters (methods only).
    pub n_pars: usize,
    /// Formal parameters followed by local variables (methods only).
    pub locals: Vec<Obj>,
    /// Constant value (constants only).
    pub val: i32,
}

/// Type descriptor kinds.  `None` is the universal null/none type: it is the
/// type of the `null` constant, of `void` methods, and of every operand that
/// already failed to resolve, and it is compatible with everything so one
/// mistake does not cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    None,
    Int,
    Char,
    Arr,
    Class,
}

/// A type descriptor.
///
/// Arrays own their element descriptor.  Classes own their field list, which
/// is filled in when the class body's scope closes; interior mutability keeps
/// the descriptor shareable while its fields are still being declared.
#[derive(Debug)]
pub struct Type {
    pub kind: TypeKind,
    pub elem: Option<Rc<Type>>,
    pub fields: RefCell<Vec<Obj>>,
}

impl Type {
    pub fn simple(kind: TypeKind) -> Rc<Type> {
        Rc::new(Type {
            kind,
            elem: None,
            fields: RefCell::new(Vec::new()),
        })
    }

    pub fn array(elem: Rc<Type>) -> Rc<Type> {
        Rc::new(Type {
            kind: TypeKind::Arr,
            elem: Some(elem),
            fields: RefCell::new(Vec::new()),
        })
    }

    pub fn class() -> Rc<Type> {
        Type::simple(TypeKind::Class)
    }

    /// Arrays and classes are reference types; ordering comparisons are
    /// undefined for them.
    pub fn is_ref(&self) -> bool {
        matches!(self.kind, TypeKind::Arr | TypeKind::Class)
    }

    pub fn n_fields(&self) -> usize {
        self.fields.borrow().len()
    }

    /// Two types are compatible when they are the same descriptor, when both
    /// are the same primitive, when both are arrays over the identical
    /// element descriptor, or when either side is the universal null/none
    /// type.  Distinct class descriptors are never compatible.
    ///
    /// Shared descriptors always live behind an `Rc`, so address identity is
    /// descriptor identity.
    pub fn compatible_with(&self, other: &Type) -> bool {
        if self.kind == TypeKind::None || other.kind == TypeKind::None {
            return true;
        }
        if std::ptr::eq(self, other) {
            return true;
        }
        match (self.kind, other.kind) {
            (TypeKind::Int, TypeKind::Int) | (TypeKind::Char, TypeKind::Char) => true,
            (TypeKind::Arr, TypeKind::Arr) => match (&self.elem, &other.elem) {
                (Some(a), Some(b)) => std::ptr::eq(a.as_ref(), b.as_ref()),
                _ => false,
            },
            _ => false,
        }
    }
}

/// Symbol table errors.  The parser reports these as ordinary diagnostics
/// and keeps parsing; on a duplicate declaration the original symbol is
/// retained.
#[derive(Debug, Error)]
pub enum SymTabError {
    #[error("'{0}' declared twice")]
    AlreadyDeclared(String),
    #[error("'{0}' is undeclared")]
    Undeclared(String),
    #[error("'{0}' is not a field")]
    NotAField(String),
}

/// One lexical scope: an ordered list of symbols plus the slot counter that
/// assigns variable and field addresses.
#[derive(Debug, Default)]
struct Scope {
    locals: Vec<Obj>,
    n_vars: i32,
}

/// The scope stack for one compilation.
pub struct SymTab {
    scopes: Vec<Scope>,
    pub int_type: Rc<Type>,
    pub char_type: Rc<Type>,
    pub none_type: Rc<Type>,
}

impl Default for SymTab {
    fn default() -> Self {
        Self::new()
    }
}

impl SymTab {
    /// Create the table with the pre-seeded universe scope.
    pub fn new() -> Self {
        let int_type = Type::simple(TypeKind::Int);
        let char_type = Type::simple(TypeKind::Char);
        let none_type = Type::simple(TypeKind::None);

        let mut tab = SymTab {
            scopes: vec![Scope::default()],
            int_type,
            char_type,
            none_type,
        };
        tab.seed(ObjKind::Type, "int", tab.int_type.clone());
        tab.seed(ObjKind::Type, "char", tab.char_type.clone());
        tab.seed(ObjKind::Con, "null", tab.none_type.clone());
        tab
    }

    fn seed(&mut self, kind: ObjKind, name: &str, ty: Rc<Type>) {
        self.scopes[0].locals.push(Obj {
            kind,
            name: name.to_string(),
            ty,
            adr: 0,
            level: 0,
            n_pars: 0,
            locals: Vec::new(),
            val: 0,
        });
    }

    fn level(&self) -> usize {
        self.scopes.len() - 1
    }

    fn current_mut(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    pub fn open_scope(&mut self) {
        self.scopes.push(Scope::default());
    }

    /// Close the current scope and return its symbols in declaration order.
    /// The universe scope is never popped.
    pub fn close_scope(&mut self) -> Vec<Obj> {
        if self.scopes.len() > 1 {
            self.scopes.pop().map(|s| s.locals).unwrap_or_default()
        } else {
            Vec::new()
        }
    }

    /// The symbols declared so far in the current scope.
    pub fn current_locals(&self) -> Vec<Obj> {
        self.scopes.last().map(|s| s.locals.clone()).unwrap_or_default()
    }

    /// Declare a new symbol in the current scope.  Variables and fields get
    /// the next storage slot of the scope.
    pub fn insert(&mut self, kind: ObjKind, name: &str, ty: Rc<Type>) -> Result<Obj, SymTabError> {
        let level = self.level();
        let scope = self.current_mut();
        if scope.locals.iter().any(|o| o.name == name) {
            return Err(SymTabError::AlreadyDeclared(name.to_string()));
        }

        let mut obj = Obj {
            kind,
            name: name.to_string(),
            ty,
            adr: 0,
            level,
            n_pars: 0,
            locals: Vec::new(),
            val: 0,
        };
        if matches!(kind, ObjKind::Var | ObjKind::Fld) {
            obj.adr = scope.n_vars;
            scope.n_vars += 1;
        }
        scope.locals.push(obj.clone());
        Ok(obj)
    }

    /// Resolve a name, innermost scope first.
    pub fn find(&self, name: &str) -> Result<Obj, SymTabError> {
        for scope in self.scopes.iter().rev() {
            if let Some(obj) = scope.locals.iter().find(|o| o.name == name) {
                return Ok(obj.clone());
            }
        }
        Err(SymTabError::Undeclared(name.to_string()))
    }

    /// Resolve a field name inside a class type.
    pub fn find_field(&self, name: &str, ty: &Type) -> Result<Obj, SymTabError> {
        ty.fields
            .borrow()
            .iter()
            .find(|o| o.name == name)
            .cloned()
            .ok_or_else(|| SymTabError::NotAField(name.to_string()))
    }

    /// Fill in a method symbol's parameter count and locals.  Searches from
    /// the innermost scope outward, so it works both while the method's own
    /// scope is still open and after it has closed.
    pub fn set_method_attrs(&mut self, name: &str, n_pars: usize, locals: Vec<Obj>) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(obj) = scope
                .locals
                .iter_mut()
                .find(|o| o.kind == ObjKind::Meth && o.name == name)
            {
                obj.n_pars = n_pars;
                obj.locals = locals;
                return;
            }
        }
    }

    /// Record a constant's value after its initializer has been parsed.
    pub fn set_const_val(&mut self, name: &str, val: i32) {
        if let Some(obj) = self
            .current_mut()
            .locals
            .iter_mut()
            .find(|o| o.kind == ObjKind::Con && o.name == name)
        {
            obj.val = val;
        }
    }

    /// Placeholder for a name that failed to resolve; its none type keeps
    /// later checks from piling up more errors.
    pub fn no_obj(&self) -> Obj {
        Obj {
            kind: ObjKind::None,
            name: String::new(),
            ty: self.none_type.clone(),
            adr: 0,
            level: 0,
            n_pars: 0,
            locals: Vec::new(),
            val: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_is_seeded() {
        let tab = SymTab::new();
        let int = tab.find("int").unwrap();
        assert_eq!(int.kind, ObjKind::Type);
        assert!(Rc::ptr_eq(&int.ty, &tab.int_type));

        let null = tab.find("null").unwrap();
        assert_eq!(null.kind, ObjKind::Con);
        assert_eq!(null.ty.kind, TypeKind::None);
    }

    #[test]
    fn test_scope_visibility() {
        let mut tab = SymTab::new();
        tab.open_scope();
        tab.insert(ObjKind::Var, "x", tab.int_type.clone()).unwrap();

        tab.open_scope();
        // Outer names are visible inside nested scopes.
        assert!(tab.find("x").is_ok());
        tab.insert(ObjKind::Var, "y", tab.char_type.clone()).unwrap();
        tab.close_scope();

        // Inner names disappear when their scope closes.
        assert!(tab.find("y").is_err());
        assert!(tab.find("x").is_ok());
    }

    #[test]
    fn test_shadowing() {
        let mut tab = SymTab::new();
        tab.open_scope();
        tab.insert(ObjKind::Var, "x", tab.int_type.clone()).unwrap();
        tab.open_scope();
        tab.insert(ObjKind::Var, "x", tab.char_type.clone()).unwrap();

        let inner = tab.find("x").unwrap();
        assert_eq!(inner.ty.kind, TypeKind::Char);
        tab.close_scope();
        let outer = tab.find("x").unwrap();
        assert_eq!(outer.ty.kind, TypeKind::Int);
    }

    #[test]
    fn test_duplicate_keeps_original() {
        let mut tab = SymTab::new();
        tab.open_scope();
        tab.insert(ObjKind::Var, "x", tab.int_type.clone()).unwrap();
        assert!(tab.insert(ObjKind::Var, "x", tab.char_type.clone()).is_err());

        let obj = tab.find("x").unwrap();
        assert_eq!(obj.ty.kind, TypeKind::Int);
    }

    #[test]
    fn test_slot_assignment() {
        let mut tab = SymTab::new();
        tab.open_scope();
        let a = tab.insert(ObjKind::Var, "a", tab.int_type.clone()).unwrap();
        let b = tab.insert(ObjKind::Var, "b", tab.int_type.clone()).unwrap();
        // Constants do not consume a slot.
        let c = tab.insert(ObjKind::Con, "c", tab.int_type.clone()).unwrap();
        let d = tab.insert(ObjKind::Var, "d", tab.int_type.clone()).unwrap();

        assert_eq!((a.adr, b.adr, c.adr, d.adr), (0, 1, 0, 2));
    }

    #[test]
    fn test_find_field() {
        let mut tab = SymTab::new();
        let cls = Type::class();
        tab.open_scope();
        tab.insert(ObjKind::Fld, "x", tab.int_type.clone()).unwrap();
        tab.insert(ObjKind::Fld, "y", tab.int_type.clone()).unwrap();
        *cls.fields.borrow_mut() = tab.close_scope();

        assert_eq!(cls.n_fields(), 2);
        let y = tab.find_field("y", &cls).unwrap();
        assert_eq!(y.adr, 1);
        assert!(tab.find_field("z", &cls).is_err());
    }

    #[test]
    fn test_compatibility() {
        let tab = SymTab::new();
        assert!(tab.int_type.compatible_with(&tab.int_type));
        assert!(!tab.int_type.compatible_with(&tab.char_type));

        // The null/none type is compatible with everything.
        assert!(tab.none_type.compatible_with(&tab.int_type));

        let a = Type::array(tab.int_type.clone());
        let b = Type::array(tab.int_type.clone());
        let c = Type::array(tab.char_type.clone());
        assert!(a.compatible_with(&b));
        assert!(!a.compatible_with(&c));
        assert!(!a.compatible_with(&tab.int_type));
        assert!(tab.none_type.compatible_with(&a));

        // Two classes are distinct types even with identical fields.
        let p = Type::class();
        let q = Type::class();
        assert!(p.compatible_with(&p));
        assert!(!p.compatible_with(&q));
    }

    #[test]
    fn test_method_attrs_visible_during_own_body() {
        let mut tab = SymTab::new();
        tab.open_scope();
        tab.insert(ObjKind::Meth, "fac", tab.int_type.clone()).unwrap();
        tab.open_scope();
        tab.insert(ObjKind::Var, "n", tab.int_type.clone()).unwrap();
        let pars = tab.current_locals();
        tab.set_method_attrs("fac", 1, pars);

        // A recursive call inside the body sees the signature.
        let meth = tab.find("fac").unwrap();
        assert_eq!(meth.n_pars, 1);
        assert_eq!(meth.locals.len(), 1);
    }
}
