//! # Fixpoint - Recursion Lowering and Lazy Evaluation for a Small Functional Language
//!
//! Fixpoint is the semantic core of an untyped, lazy, purely functional
//! language. It takes a parsed program, works out which definitions are
//! recursive, compiles recursion away into fixed-point combinators, and runs
//! the result under call-by-need.
//!
//! ## Architecture Overview
//!
//! 1. **Scope Resolution** (`scope`) - Builds the scope tree and assigns every definition a dispatch id
//! 2. **Recursion Classification** (`recursion`) - Finds self- and mutually recursive definitions with Tarjan's SCC algorithm
//! 3. **Lowering** (`lower`) - Rewrites the program into one closed lambda-calculus term
//! 4. **Interpreter** (`interpreter`) - Evaluates that term lazily, memoising every argument
//!
//! ## Pipeline Flow
//!
//! ```text
//! Surface AST (ast::Program<()>)        from an external front end
//!     ↓
//! [Scope Resolution] → ast::Program<Scoped> + scope::ScopeTree
//!     ↓
//! [Classifier] → recursion::Classification
//!     ↓
//! [Lowering] → ir::Term
//!     ↓
//! [Interpreter] → ir::Term (an integer, closure or builtin)
//! ```
//!
//! Tokenizing and parsing are not part of this crate. Programs arrive as
//! [`ast::Program`] values, built by a front end or with [`ast::build`].
//!
//! ## Key Design Decisions
//!
//! ### No Recursive Binding Form
//! The IR only has variables, integers, single-parameter lambdas and
//! application. Recursion is expressed with the Y combinator, and mutually
//! recursive groups share a single fixed point that selects a member by its
//! dispatch id. The interpreter has no knowledge of recursion at all.
//!
//! ### Laziness
//! Every argument is passed as a thunk and evaluated at most once. This is
//! what lets the Y combinator terminate, and what lets `if` leave the branch
//! it did not take unevaluated.
//!
//! ### Immutable Passes
//! Each stage produces a new value and never modifies its input. The
//! classifier's results live in their own map keyed by dispatch id.
//!
//! ## Example
//!
//! ```
//! use fixpoint::ast::build::*;
//!
//! // fact n = if n == 0 then 1 else n * fact (n - 1)
//! // main = fact 5
//! let program = program(vec![
//!     define(
//!         "fact",
//!         &["n"],
//!         if_then_else(
//!             binary("==", var("n"), int(0)),
//!             int(1),
//!             binary("*", var("n"), call(var("fact"), binary("-", var("n"), int(1)))),
//!         ),
//!     ),
//!     define("main", &[], call(var("fact"), int(5))),
//! ]);
//!
//! let value = fixpoint::run(program).unwrap();
//! assert_eq!(value.as_int(), Some(120));
//! ```
//!
//! ## Module Structure
//!
//! - [`ast`] - Surface AST and constructors
//! - [`scope`] - Scope tree, dispatch ids and resolution errors
//! - [`recursion`] - Call graphs and recursion classification
//! - [`lower`] - Lowering to IR, fixed-point combinator and dispatch tables
//! - [`ir`] - IR terms and evaluation environments
//! - [`interpreter`] - Lazy evaluator and builtins
//! - [`fmt`] - Pretty printing

pub mod ast;
pub mod fmt;
pub mod interpreter;
pub mod ir;
pub mod lower;
pub mod recursion;
pub mod scope;

use log::debug;
use thiserror::Error;

use interpreter::{Builtins, EvalError, EvalOptions, Interpreter};
use ir::Term;
use lower::LowerError;
use recursion::Classification;
use scope::{Resolution, ResolveError};

/// Type alias for a program as handed over by a front end
pub type ParsedProgram = ast::Program<()>;

/// Any failure of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Lower(#[from] LowerError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

/// Pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Top-level definition the program evaluates to
    pub entry: String,
    pub eval: EvalOptions,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            entry: lower::DEFAULT_ENTRY.to_string(),
            eval: EvalOptions::default(),
        }
    }
}

impl Options {
    pub fn with_entry(mut self, entry: impl Into<String>) -> Self {
        self.entry = entry.into();
        self
    }

    pub fn with_eval(mut self, eval: EvalOptions) -> Self {
        self.eval = eval;
        self
    }
}

/// Every intermediate result of compiling one program.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub resolution: Resolution,
    pub classification: Classification,
    pub term: Term,
}

/// Resolve, classify and lower a program against the given builtins.
pub fn compile(
    program: ParsedProgram,
    builtins: &Builtins,
    options: &Options,
) -> Result<Compiled, Error> {
    let resolution = scope::resolve(program, builtins.names())?;
    let classification = recursion::classify(&resolution.program, &resolution.tree);
    let term = lower::lower_entry(&resolution, &classification, &options.entry)?;
    debug!("lowered program: {}", term);

    Ok(Compiled {
        resolution,
        classification,
        term,
    })
}

/// Compile and evaluate a program with the standard builtins and default
/// options.
pub fn run(program: ParsedProgram) -> Result<Term, Error> {
    run_with(program, &Builtins::standard(), &Options::default())
}

pub fn run_with(
    program: ParsedProgram,
    builtins: &Builtins,
    options: &Options,
) -> Result<Term, Error> {
    let compiled = compile(program, builtins, options)?;
    let mut interpreter = Interpreter::with_options(options.eval);
    Ok(interpreter.evaluate(&compiled.term, &builtins.environment())?)
}
