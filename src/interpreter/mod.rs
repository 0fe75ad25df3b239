//! # Lazy Evaluator
//!
//! Executes lowered IR under call-by-need.
//!
//! ## Pipeline Position
//!
//! ```text
//! Scope Resolution → Classifier → Lowering → IR → [INTERPRETER]
//! ```
//!
//! ## Evaluation Rules
//!
//! ```text
//! n                  → n
//! \x. body           → <closure> capturing the current environment
//! (f a)              → evaluate f; suspend a as a thunk; apply
//! x                  → look x up and force it
//! ```
//!
//! Applying a closure binds its parameter to the argument thunk in the
//! closure's own environment and evaluates the body there. Applying a builtin
//! accumulates the thunk until the builtin's arity is reached, then hands all
//! arguments to the builtin, which forces what it needs.
//!
//! ## Sharing
//!
//! A thunk is evaluated at most once: the first force stores its value, every
//! later force returns the stored value. Passing a variable that is already
//! bound to a thunk passes that same thunk on instead of wrapping it again, so
//! all uses of one argument share a single evaluation.
//!
//! There is no special handling of recursion. The fixed-point combinator and
//! the dispatch tables produced by lowering are ordinary terms, and they
//! terminate only because arguments stay suspended until needed.
//!
//! ## Depth Limit
//!
//! Evaluation is recursive, so deeply recursive programs consume host stack.
//! [`EvalOptions::max_depth`] turns that into a [`EvalError::RecursionLimit`]
//! error instead.

mod builtins;
mod error;

use std::rc::Rc;

use log::trace;

use crate::ir::{Closure, Env, Term, Thunk};

pub use builtins::{BuiltinFunction, BuiltinOp, Builtins};
pub use error::EvalError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvalOptions {
    /// Maximum nesting of evaluation steps. `None` means unlimited.
    pub max_depth: Option<usize>,
}

impl EvalOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

#[derive(Debug, Default)]
pub struct Interpreter {
    options: EvalOptions,
    depth: usize,
}

impl Interpreter {
    /// Create an interpreter without a depth limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an interpreter with custom evaluation options.
    ///
    /// # Arguments
    ///
    /// * `options` - Limits applied to every evaluation run by this
    ///   interpreter. A `max_depth` of `None` means evaluation may nest
    ///   until the native stack is exhausted.
    pub fn with_options(options: EvalOptions) -> Self {
        Interpreter { options, depth: 0 }
    }

    pub fn options(&self) -> EvalOptions {
        self.options
    }

    /// Current nesting of evaluation steps.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Evaluate `term` in `env` to a value: an integer, a closure or a
    /// builtin.
    pub fn evaluate(&mut self, term: &Term, env: &Env) -> Result<Term, EvalError> {
        match self.options.max_depth {
            Some(limit) if self.depth >= limit => return Err(EvalError::RecursionLimit { limit }),
            _ => {}
        }

        self.depth += 1;
        let result = self.step(term, env);
        self.depth -= 1;
        result
    }

    fn step(&mut self, term: &Term, env: &Env) -> Result<Term, EvalError> {
        match term {
            Term::IntLiteral(_) | Term::Closure(_) | Term::Builtin(_) => Ok(term.clone()),
            Term::Thunk(thunk) => self.force_thunk(thunk),
            Term::Lambda(lambda) => Ok(Term::Closure(Rc::new(Closure {
                lambda: lambda.clone(),
                env: env.clone(),
            }))),
            Term::Variable(name) => match env.lookup(name) {
                Some(Term::Thunk(thunk)) => self.force_thunk(thunk),
                Some(bound) => self.evaluate(bound, env),
                None => Err(EvalError::UnboundVariable {
                    name: name.to_string(),
                }),
            },
            Term::Application(func, arg) => {
                let function = self.evaluate(func, env)?;
                let argument = suspend(arg, env);
                self.call(&function, argument)
            }
        }
    }

    /// Force a term that may be a thunk. Anything else is evaluated in an
    /// empty environment, so it must be closed.
    pub fn force(&mut self, term: &Term) -> Result<Term, EvalError> {
        match term {
            Term::Thunk(thunk) => self.force_thunk(thunk),
            other => self.evaluate(other, &Env::new()),
        }
    }

    /// Force a term and require an integer. `name` is the builtin asking.
    pub fn force_int(&mut self, name: &str, term: &Term) -> Result<i64, EvalError> {
        let value = self.force(term)?;
        value.as_int().ok_or_else(|| EvalError::ExpectedInteger {
            name: name.to_string(),
            found: value.to_string(),
        })
    }

    fn force_thunk(&mut self, thunk: &Thunk) -> Result<Term, EvalError> {
        if let Some(value) = thunk.value() {
            return Ok(value.clone());
        }

        trace!("forcing {}", thunk.term);
        let value = self.evaluate(&thunk.term, &thunk.env)?;
        Ok(thunk.memoize(value))
    }

    /// Apply `function` to several arguments.
    ///
    /// Closures consume one argument at a time. Once the function is a
    /// builtin, all remaining arguments go to it in one call, so supplying
    /// more than its arity fails with [`EvalError::TooManyArguments`].
    pub fn apply(&mut self, function: &Term, args: &[Term]) -> Result<Term, EvalError> {
        let mut function = self.force(function)?;
        let mut rest = args;

        while let Some((argument, tail)) = rest.split_first() {
            if let Term::Builtin(builtin) = &function {
                return builtin.apply(self, rest);
            }
            function = self.call(&function, argument.clone())?;
            rest = tail;
        }
        Ok(function)
    }

    fn call(&mut self, function: &Term, argument: Term) -> Result<Term, EvalError> {
        match function {
            Term::Closure(closure) => {
                let env = closure.env.extend(closure.lambda.param.clone(), argument);
                self.evaluate(&closure.lambda.body, &env)
            }
            Term::Builtin(builtin) => builtin.apply(self, std::slice::from_ref(&argument)),
            Term::Thunk(thunk) => {
                let function = self.force_thunk(thunk)?;
                self.call(&function, argument)
            }
            other => Err(EvalError::NotAFunction {
                found: other.to_string(),
            }),
        }
    }
}

/// Wrap an argument for a call without evaluating it.
fn suspend(term: &Term, env: &Env) -> Term {
    match term {
        Term::IntLiteral(_) | Term::Closure(_) | Term::Builtin(_) | Term::Thunk(_) => term.clone(),
        Term::Variable(name) => match env.lookup(name) {
            Some(bound) if matches!(bound, Term::Thunk(_)) || bound.is_value() => bound.clone(),
            _ => Term::thunk(term.clone(), env.clone()),
        },
        Term::Lambda(_) | Term::Application(_, _) => Term::thunk(term.clone(), env.clone()),
    }
}

/// Evaluate `term` in `env` with default options.
pub fn evaluate(term: &Term, env: &Env) -> Result<Term, EvalError> {
    Interpreter::new().evaluate(term, env)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> Env {
        Builtins::standard().environment()
    }

    #[test]
    fn test_integer_evaluates_to_itself() {
        assert_eq!(evaluate(&Term::int(42), &Env::new()), Ok(Term::int(42)));
    }

    #[test]
    fn test_lambda_becomes_closure() {
        let value = evaluate(&Term::lambda("x", Term::var("x")), &Env::new())
            .expect("evaluation failed");
        assert!(matches!(value, Term::Closure(_)));
    }

    #[test]
    fn test_beta_reduction() {
        let term = Term::apply(Term::lambda("x", Term::var("x")), Term::int(3));
        assert_eq!(evaluate(&term, &Env::new()), Ok(Term::int(3)));
    }

    #[test]
    fn test_unused_argument_is_never_evaluated() {
        let term = Term::apply(Term::lambda("x", Term::int(1)), Term::var("missing"));
        assert_eq!(evaluate(&term, &Env::new()), Ok(Term::int(1)));
    }

    #[test]
    fn test_unbound_variable() {
        assert_eq!(
            evaluate(&Term::var("missing"), &Env::new()),
            Err(EvalError::UnboundVariable {
                name: "missing".to_string()
            })
        );
    }

    #[test]
    fn test_not_a_function() {
        let term = Term::apply(Term::int(1), Term::int(2));
        assert!(matches!(
            evaluate(&term, &Env::new()),
            Err(EvalError::NotAFunction { .. })
        ));
    }

    #[test]
    fn test_builtin_application() {
        let term = Term::apply_all(Term::var("+"), [Term::int(2), Term::int(3)]);
        assert_eq!(evaluate(&term, &standard()), Ok(Term::int(5)));
    }

    #[test]
    fn test_apply_several_arguments() {
        let mut interpreter = Interpreter::new();
        let k = Term::lambdas(["x", "y"], Term::var("x"));
        assert_eq!(
            interpreter.apply(&k, &[Term::int(1), Term::int(2)]),
            Ok(Term::int(1))
        );
    }

    #[test]
    fn test_apply_hands_remaining_arguments_to_builtin() {
        let env = standard();
        let plus = env.lookup("+").cloned().expect("builtin missing");
        let mut interpreter = Interpreter::new();

        assert_eq!(
            interpreter.apply(&plus, &[Term::int(1), Term::int(2)]),
            Ok(Term::int(3))
        );
        assert!(matches!(
            interpreter.apply(&plus, &[Term::int(1), Term::int(2), Term::int(3)]),
            Err(EvalError::TooManyArguments { supplied: 3, .. })
        ));
    }

    #[test]
    fn test_depth_limit() {
        // (\x. x x) (\x. x x)
        let omega = Term::lambda("x", Term::apply(Term::var("x"), Term::var("x")));
        let term = Term::apply(omega.clone(), omega);

        let mut interpreter = Interpreter::with_options(EvalOptions::default().with_max_depth(64));
        assert_eq!(interpreter.options().max_depth, Some(64));
        assert_eq!(
            interpreter.evaluate(&term, &Env::new()),
            Err(EvalError::RecursionLimit { limit: 64 })
        );
        assert_eq!(interpreter.depth(), 0);
    }

    #[test]
    fn test_default_options_are_unlimited() {
        assert_eq!(Interpreter::new().options(), EvalOptions::default());
        assert_eq!(Interpreter::new().options().max_depth, None);
    }
}
