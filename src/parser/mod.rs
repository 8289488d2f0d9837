//! MicroJava source parser
//!
//! This module turns source text into a checked program skeleton in one
//! left-to-right pass:
//! - [`lexer`]: Tokenization (source text → tokens, one per call)
//! - [`parse`]: Parser state, token window, diagnostics, and recovery
//!
//! # Parser Implementation
//!
//! Hand-written recursive descent with one token of lookahead.  There is no
//! syntax tree: grammar recognition, scope handling, name resolution, type
//! checking, and code emission are interleaved, so by the time a production
//! finishes its symbols are declared, its expressions are typed, and its
//! loads and operators are in the instruction buffer.
//!
//! Errors never abort the pass.  Bad tokens become "X expected" diagnostics,
//! bad declaration or statement starts skip ahead to a synchronization set,
//! and a three-token debounce keeps one root cause from flooding the output.

pub mod lexer;
pub mod parse;

mod declarations;
mod expressions;
mod statements;
