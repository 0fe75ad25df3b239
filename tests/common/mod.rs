//! Shared programs and helpers for the integration tests

#![allow(dead_code)]

use fixpoint::ast::Program;
use fixpoint::ast::build::*;
use fixpoint::interpreter::Builtins;
use fixpoint::ir::Term;
use fixpoint::recursion::{Classification, Flags, classify};
use fixpoint::scope::{Resolution, resolve};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `n == 0`
pub fn is_zero(n: &str) -> fixpoint::ast::Expression<()> {
    binary("==", var(n), int(0))
}

/// `n - 1`
pub fn pred(n: &str) -> fixpoint::ast::Expression<()> {
    binary("-", var(n), int(1))
}

/// fact n = if n == 0 then 1 else n * fact (n - 1)
pub fn fact() -> fixpoint::ast::Definition<()> {
    define(
        "fact",
        &["n"],
        if_then_else(
            is_zero("n"),
            int(1),
            binary("*", var("n"), call(var("fact"), pred("n"))),
        ),
    )
}

/// isEven n = if n == 0 then 1 else isOdd (n - 1)
pub fn is_even() -> fixpoint::ast::Definition<()> {
    define(
        "isEven",
        &["n"],
        if_then_else(is_zero("n"), int(1), call(var("isOdd"), pred("n"))),
    )
}

/// isOdd n = if n == 0 then 0 else isEven (n - 1)
pub fn is_odd() -> fixpoint::ast::Definition<()> {
    define(
        "isOdd",
        &["n"],
        if_then_else(is_zero("n"), int(0), call(var("isEven"), pred("n"))),
    )
}

/// Resolve and classify against the standard builtin names.
pub fn analyze(program: Program<()>) -> (Resolution, Classification) {
    let builtins = Builtins::standard();
    let resolution = resolve(program, builtins.names()).expect("resolution failed");
    let classification = classify(&resolution.program, &resolution.tree);
    (resolution, classification)
}

pub fn flags_of(resolution: &Resolution, classification: &Classification, name: &str) -> Flags {
    let binding = resolution
        .tree
        .bindings()
        .find(|b| b.name == name)
        .unwrap_or_else(|| panic!("no binding named {}", name));
    classification.flags(binding.id)
}

/// Run a program with the standard builtins and return its integer result.
pub fn run_int(program: Program<()>) -> i64 {
    init_logging();
    match fixpoint::run(program) {
        Ok(value) => value
            .as_int()
            .unwrap_or_else(|| panic!("expected an integer, got {}", value)),
        Err(err) => panic!("program failed: {}", err),
    }
}

pub fn run(program: Program<()>) -> Result<Term, fixpoint::Error> {
    init_logging();
    fixpoint::run(program)
}
