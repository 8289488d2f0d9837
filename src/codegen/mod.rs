//! Stack-machine code generation.
//!
//! The parser hands fully typed [`Operand`]s to [`Code`], which appends
//! instructions to a flat byte buffer with an implicit program counter.
//! The generator is an append-only sink: the parser writes loads, operators,
//! and allocations but never reads the buffer back for control decisions.

use crate::symtab::{Obj, ObjKind, Type, TypeKind};
use std::rc::Rc;

/// Instruction opcodes.
///
/// `Trap` stands in for an operation whose operands were already reported as
/// erroneous, so downstream consumers of the buffer see a well-defined
/// placeholder instead of a half-emitted instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Load = 1,
    Load0,
    Load1,
    Load2,
    Load3,
    GetStatic,
    GetField,
    Const0,
    Const1,
    Const2,
    Const3,
    Const4,
    Const5,
    Const,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    New,
    NewArray,
    ALoad,
    BALoad,
    Trap,
}

/// Comparison condition codes, one per relational operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

/// Where an operand's value currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Compile-time constant.
    Con,
    /// Local variable of the current method.
    Local,
    /// Global variable of the program.
    Static,
    /// Field of a record whose reference is on the stack.
    Fld,
    /// Array element whose reference and index are on the stack.
    Elem,
    /// Method, before its call is parsed.
    Meth,
    /// Already on the evaluation stack.
    Stack,
    /// Unresolved; an error has been reported for it.
    None,
}

/// The parser's working value for one expression.
///
/// Created fresh per expression production and consumed immediately by the
/// enclosing production or by [`Code::load`]; never kept across statements.
#[derive(Debug, Clone)]
pub struct Operand {
    pub kind: OperandKind,
    pub ty: Rc<Type>,
    pub val: i32,
    pub adr: i32,
    /// The resolved method symbol, kept for call checking (methods only).
    pub obj: Option<Obj>,
}

impl Operand {
    /// Build an operand from a resolved symbol.
    pub fn from_obj(obj: &Obj) -> Operand {
        let kind = match obj.kind {
            ObjKind::Con => OperandKind::Con,
            ObjKind::Var => {
                if obj.level <= 1 {
                    OperandKind::Static
                } else {
                    OperandKind::Local
                }
            }
            ObjKind::Fld => OperandKind::Fld,
            ObjKind::Meth => OperandKind::Meth,
            _ => OperandKind::None,
        };
        Operand {
            kind,
            ty: obj.ty.clone(),
            val: obj.val,
            adr: obj.adr,
            obj: if obj.kind == ObjKind::Meth {
                Some(obj.clone())
            } else {
                None
            },
        }
    }

    /// A compile-time constant.
    pub fn constant(val: i32, ty: Rc<Type>) -> Operand {
        Operand {
            kind: OperandKind::Con,
            ty,
            val,
            adr: 0,
            obj: None,
        }
    }

    /// A value the emitted code has already left on the evaluation stack.
    pub fn stack(ty: Rc<Type>) -> Operand {
        Operand {
            kind: OperandKind::Stack,
            ty,
            val: 0,
            adr: 0,
            obj: None,
        }
    }
}

/// The instruction buffer for one compilation.
#[derive(Debug, Default)]
pub struct Code {
    buf: Vec<u8>,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free address (the implicit program counter).
    pub fn pc(&self) -> usize {
        self.buf.len()
    }

    pub fn buf(&self) -> &[u8] {
        &self.buf
    }

    /// Append one instruction.
    pub fn put(&mut self, op: Opcode) {
        self.buf.push(op as u8);
    }

    /// Append one operand byte.
    pub fn put_byte(&mut self, b: u8) {
        self.buf.push(b);
    }

    /// Append a 16-bit operand word.
    pub fn put2(&mut self, v: i16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Append a 32-bit operand word.
    pub fn put4(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Materialize an operand's value on the evaluation stack.
    ///
    /// Field and element operands expect their record or array reference
    /// (and index) to be on the stack already; the parser loads those while
    /// it folds designator suffixes.  After the call the operand's kind is
    /// `Stack`.
    pub fn load(&mut self, x: &mut Operand) {
        match x.kind {
            OperandKind::Con => match x.val {
                0 => self.put(Opcode::Const0),
                1 => self.put(Opcode::Const1),
                2 => self.put(Opcode::Const2),
                3 => self.put(Opcode::Const3),
                4 => self.put(Opcode::Const4),
                5 => self.put(Opcode::Const5),
                _ => {
                    self.put(Opcode::Const);
                    self.put4(x.val);
                }
            },
            OperandKind::Local => match x.adr {
                0 => self.put(Opcode::Load0),
                1 => self.put(Opcode::Load1),
                2 => self.put(Opcode::Load2),
                3 => self.put(Opcode::Load3),
                _ => {
                    self.put(Opcode::Load);
                    self.put_byte(x.adr as u8);
                }
            },
            OperandKind::Static => {
                self.put(Opcode::GetStatic);
                self.put2(x.adr as i16);
            }
            OperandKind::Fld => {
                self.put(Opcode::GetField);
                self.put2(x.adr as i16);
            }
            OperandKind::Elem => {
                if x.ty.kind == TypeKind::Char {
                    self.put(Opcode::BALoad);
                } else {
                    self.put(Opcode::ALoad);
                }
            }
            OperandKind::Stack => {}
            // Already reported by the parser; leave a placeholder.
            OperandKind::Meth | OperandKind::None => self.put(Opcode::Trap),
        }
        x.kind = OperandKind::Stack;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symtab::SymTab;

    #[test]
    fn test_load_small_constant() {
        let tab = SymTab::new();
        let mut code = Code::new();
        let mut x = Operand::constant(3, tab.int_type.clone());
        code.load(&mut x);

        assert_eq!(code.buf(), &[Opcode::Const3 as u8]);
        assert_eq!(x.kind, OperandKind::Stack);
    }

    #[test]
    fn test_load_wide_constant() {
        let tab = SymTab::new();
        let mut code = Code::new();
        let mut x = Operand::constant(300, tab.int_type.clone());
        code.load(&mut x);

        assert_eq!(code.pc(), 5);
        assert_eq!(code.buf()[0], Opcode::Const as u8);
        assert_eq!(&code.buf()[1..], &300i32.to_be_bytes());
    }

    #[test]
    fn test_load_global() {
        let tab = SymTab::new();
        let mut code = Code::new();
        let mut x = Operand {
            kind: OperandKind::Static,
            ty: tab.int_type.clone(),
            val: 0,
            adr: 7,
            obj: None,
        };
        code.load(&mut x);

        assert_eq!(code.buf()[0], Opcode::GetStatic as u8);
        assert_eq!(&code.buf()[1..], &7i16.to_be_bytes());
    }

    #[test]
    fn test_load_local_short_forms() {
        let tab = SymTab::new();
        let mut code = Code::new();
        for adr in 0..5 {
            let mut x = Operand {
                kind: OperandKind::Local,
                ty: tab.int_type.clone(),
                val: 0,
                adr,
                obj: None,
            };
            code.load(&mut x);
        }

        assert_eq!(
            code.buf(),
            &[
                Opcode::Load0 as u8,
                Opcode::Load1 as u8,
                Opcode::Load2 as u8,
                Opcode::Load3 as u8,
                Opcode::Load as u8,
                4,
            ]
        );
    }

    #[test]
    fn test_load_element_width() {
        let tab = SymTab::new();
        let mut code = Code::new();
        let mut int_elem = Operand {
            kind: OperandKind::Elem,
            ty: tab.int_type.clone(),
            val: 0,
            adr: 0,
            obj: None,
        };
        let mut char_elem = Operand {
            kind: OperandKind::Elem,
            ty: tab.char_type.clone(),
            val: 0,
            adr: 0,
            obj: None,
        };
        code.load(&mut int_elem);
        code.load(&mut char_elem);

        assert_eq!(code.buf(), &[Opcode::ALoad as u8, Opcode::BALoad as u8]);
    }

    #[test]
    fn test_load_stack_is_a_no_op() {
        let tab = SymTab::new();
        let mut code = Code::new();
        let mut x = Operand::stack(tab.int_type.clone());
        code.load(&mut x);
        assert_eq!(code.pc(), 0);
    }

    #[test]
    fn test_load_unresolved_emits_trap() {
        let tab = SymTab::new();
        let mut code = Code::new();
        let mut x = Operand::from_obj(&tab.no_obj());
        code.load(&mut x);
        assert_eq!(code.buf(), &[Opcode::Trap as u8]);
    }
}
