//! # Surface AST
//!
//! The tree handed over by an external front end. Tokenization, parsing and
//! fixity resolution happen before this point; every identifier in a program
//! is expected to name a parameter, a definition or a builtin.
//!
//! Like every other tree in this crate, the AST is generic over a per-node
//! annotation `T`:
//!
//! - **From the front end**: `Program<()>`
//! - **After scope resolution**: `Program<Scoped>` (see [`crate::scope`]), where
//!   each node records the lexical scope it belongs to
//!
//! The closed set of node kinds is [`Expression`] plus the two structural nodes
//! [`Definition`] and [`Program`]. All passes over the tree are exhaustive
//! matches over these.

use lachs::Span;

pub mod build;
pub mod expression;

pub use expression::{Expression, FunctionCall, Ident, IfThenElse, Integer, Lambda, Let};

/// Name that may be bound any number of times and is never referenceable.
pub const DISCARD: &str = "_";

/// Returns `true` if `name` is the discard name.
pub fn is_discard(name: &str) -> bool {
    name == DISCARD
}

/// A complete program: an ordered list of top-level definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Program<T> {
    pub definitions: Vec<Definition<T>>,
    pub position: Span,
    pub info: T,
}

impl<T> Program<T> {
    /// Find the first top-level definition with the given name.
    pub fn definition(&self, name: &str) -> Option<&Definition<T>> {
        self.definitions.iter().find(|def| def.name.value == name)
    }
}

/// A named binding, `name p1 p2 ... = body`.
///
/// A definition without parameters is a plain value binding. Definitions
/// appear at the top level of a [`Program`] and inside [`Let`] blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition<T> {
    pub name: Ident<T>,
    pub params: Vec<Ident<T>>,
    pub body: Box<Expression<T>>,
    pub position: Span,
    pub info: T,
}

impl<T> Definition<T> {
    pub fn is_discard(&self) -> bool {
        is_discard(&self.name.value)
    }
}
