//! Builtin operations and the table that provides them.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::ir::{Env, Term};

use super::Interpreter;
use super::error::EvalError;

/// Implementation of a builtin. Receives exactly `arity` arguments, each of
/// them possibly an unforced thunk, and decides itself what to force.
pub type BuiltinOp = Rc<dyn Fn(&mut Interpreter, &[Term]) -> Result<Term, EvalError>>;

/// A curried primitive with the arguments supplied so far.
#[derive(Clone)]
pub struct BuiltinFunction {
    pub name: Rc<str>,
    pub arity: usize,
    pub partial: Vec<Term>,
    op: BuiltinOp,
}

impl BuiltinFunction {
    pub fn new(name: impl Into<Rc<str>>, arity: usize, op: BuiltinOp) -> Self {
        BuiltinFunction {
            name: name.into(),
            arity,
            partial: Vec::new(),
            op,
        }
    }

    /// Supply further arguments.
    ///
    /// Fewer than the remaining arity yields a new partially applied builtin,
    /// exactly the remaining arity invokes the operation, and more fails with
    /// [`EvalError::TooManyArguments`].
    pub fn apply(&self, interpreter: &mut Interpreter, args: &[Term]) -> Result<Term, EvalError> {
        let supplied = self.partial.len() + args.len();
        if supplied > self.arity {
            return Err(EvalError::TooManyArguments {
                name: self.name.to_string(),
                arity: self.arity,
                supplied,
            });
        }

        let mut all = Vec::with_capacity(supplied);
        all.extend_from_slice(&self.partial);
        all.extend_from_slice(args);

        if supplied < self.arity {
            return Ok(Term::Builtin(Rc::new(BuiltinFunction {
                partial: all,
                ..self.clone()
            })));
        }

        trace!("invoking builtin `{}`", self.name);
        (self.op)(interpreter, &all)
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("partial", &self.partial.len())
            .finish_non_exhaustive()
    }
}

/// Named builtins available to a program.
#[derive(Clone, Default)]
pub struct Builtins {
    entries: BTreeMap<String, Rc<BuiltinFunction>>,
}

impl Builtins {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Arithmetic and comparison on integers plus the lazy `if`.
    ///
    /// Arithmetic wraps on overflow. Comparisons return `1` for true and `0`
    /// for false. `/=` is also available as `!=`.
    pub fn standard() -> Self {
        let mut builtins = Builtins::empty();

        builtins.insert("+", 2, arithmetic("+", |a, b| Ok(a.wrapping_add(b))));
        builtins.insert("-", 2, arithmetic("-", |a, b| Ok(a.wrapping_sub(b))));
        builtins.insert("*", 2, arithmetic("*", |a, b| Ok(a.wrapping_mul(b))));
        builtins.insert(
            "/",
            2,
            arithmetic("/", |a, b| match b {
                0 => Err(EvalError::DivisionByZero),
                _ => Ok(a.wrapping_div(b)),
            }),
        );

        builtins.insert("==", 2, comparison("==", |a, b| a == b));
        builtins.insert("/=", 2, comparison("/=", |a, b| a != b));
        builtins.insert("!=", 2, comparison("!=", |a, b| a != b));
        builtins.insert("<", 2, comparison("<", |a, b| a < b));
        builtins.insert("<=", 2, comparison("<=", |a, b| a <= b));
        builtins.insert(">", 2, comparison(">", |a, b| a > b));
        builtins.insert(">=", 2, comparison(">=", |a, b| a >= b));

        builtins.insert("if", 3, Rc::new(conditional));

        builtins
    }

    /// Register a builtin, replacing any previous one with the same name.
    pub fn insert(&mut self, name: &str, arity: usize, op: BuiltinOp) {
        self.entries
            .insert(name.to_string(), Rc::new(BuiltinFunction::new(name, arity, op)));
    }

    pub fn with(mut self, name: &str, arity: usize, op: BuiltinOp) -> Self {
        self.insert(name, arity, op);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Rc<BuiltinFunction>> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Environment binding every builtin name to its value.
    pub fn environment(&self) -> Env {
        self.entries
            .iter()
            .map(|(name, builtin)| (name.as_str(), Term::Builtin(builtin.clone())))
            .collect()
    }
}

impl fmt::Debug for Builtins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

fn arithmetic(name: &'static str, op: fn(i64, i64) -> Result<i64, EvalError>) -> BuiltinOp {
    Rc::new(move |interpreter: &mut Interpreter, args: &[Term]| {
        let lhs = interpreter.force_int(name, &args[0])?;
        let rhs = interpreter.force_int(name, &args[1])?;
        op(lhs, rhs).map(Term::int)
    })
}

fn comparison(name: &'static str, op: fn(i64, i64) -> bool) -> BuiltinOp {
    Rc::new(move |interpreter: &mut Interpreter, args: &[Term]| {
        let lhs = interpreter.force_int(name, &args[0])?;
        let rhs = interpreter.force_int(name, &args[1])?;
        Ok(Term::int(op(lhs, rhs) as i64))
    })
}

/// Forces the condition, then exactly one branch.
fn conditional(interpreter: &mut Interpreter, args: &[Term]) -> Result<Term, EvalError> {
    let condition = interpreter.force(&args[0])?;
    let Some(value) = condition.as_int() else {
        return Err(EvalError::ConditionNotInteger {
            found: condition.to_string(),
        });
    };

    let branch = if value != 0 { &args[1] } else { &args[2] };
    interpreter.force(branch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(builtins: &Builtins, name: &str, args: &[Term]) -> Result<Term, EvalError> {
        let builtin = builtins.get(name).expect("unknown builtin").clone();
        builtin.apply(&mut Interpreter::new(), args)
    }

    #[test]
    fn test_standard_names() {
        let names: Vec<_> = Builtins::standard().names().map(str::to_string).collect();
        for name in ["+", "-", "*", "/", "==", "/=", "!=", "<", "<=", ">", ">=", "if"] {
            assert!(names.iter().any(|n| n == name), "missing builtin {}", name);
        }
    }

    #[test]
    fn test_contains() {
        let builtins = Builtins::standard();
        assert!(builtins.contains("=="));
        assert!(!builtins.contains("tick"));

        let extended = builtins.with(
            "tick",
            1,
            Rc::new(|_: &mut Interpreter, args: &[Term]| -> Result<Term, EvalError> {
                Ok(args[0].clone())
            }),
        );
        assert!(extended.contains("tick"));
    }

    #[test]
    fn test_arithmetic() {
        let builtins = Builtins::standard();
        assert_eq!(call(&builtins, "+", &[Term::int(2), Term::int(3)]), Ok(Term::int(5)));
        assert_eq!(call(&builtins, "-", &[Term::int(2), Term::int(3)]), Ok(Term::int(-1)));
        assert_eq!(call(&builtins, "*", &[Term::int(4), Term::int(3)]), Ok(Term::int(12)));
        assert_eq!(call(&builtins, "/", &[Term::int(7), Term::int(2)]), Ok(Term::int(3)));
    }

    #[test]
    fn test_arithmetic_wraps() {
        let builtins = Builtins::standard();
        assert_eq!(
            call(&builtins, "+", &[Term::int(i64::MAX), Term::int(1)]),
            Ok(Term::int(i64::MIN))
        );
    }

    #[test]
    fn test_division_by_zero() {
        let builtins = Builtins::standard();
        assert_eq!(
            call(&builtins, "/", &[Term::int(1), Term::int(0)]),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn test_comparisons_yield_one_or_zero() {
        let builtins = Builtins::standard();
        assert_eq!(call(&builtins, "<", &[Term::int(1), Term::int(2)]), Ok(Term::int(1)));
        assert_eq!(call(&builtins, ">=", &[Term::int(1), Term::int(2)]), Ok(Term::int(0)));
        assert_eq!(call(&builtins, "/=", &[Term::int(1), Term::int(1)]), Ok(Term::int(0)));
        assert_eq!(call(&builtins, "!=", &[Term::int(1), Term::int(2)]), Ok(Term::int(1)));
    }

    #[test]
    fn test_partial_application() {
        let builtins = Builtins::standard();
        let partial = call(&builtins, "+", &[Term::int(1)]).expect("partial application");
        let Term::Builtin(partial) = partial else {
            panic!("expected a builtin, got {:?}", partial);
        };
        assert_eq!(partial.partial.len(), 1);
        assert_eq!(
            partial.apply(&mut Interpreter::new(), &[Term::int(2)]),
            Ok(Term::int(3))
        );
    }

    #[test]
    fn test_too_many_arguments() {
        let builtins = Builtins::standard();
        let result = call(&builtins, "+", &[Term::int(1), Term::int(2), Term::int(3)]);
        assert_eq!(
            result,
            Err(EvalError::TooManyArguments {
                name: "+".to_string(),
                arity: 2,
                supplied: 3,
            })
        );
    }

    #[test]
    fn test_expected_integer() {
        let builtins = Builtins::standard();
        let identity = Term::lambda("x", Term::var("x"));
        let result = call(&builtins, "*", &[identity, Term::int(2)]);
        assert!(matches!(result, Err(EvalError::ExpectedInteger { name, .. }) if name == "*"));
    }

    #[test]
    fn test_if_leaves_other_branch_alone() {
        let builtins = Builtins::standard();
        let unbound = Term::var("nowhere");
        assert_eq!(
            call(&builtins, "if", &[Term::int(0), unbound.clone(), Term::int(9)]),
            Ok(Term::int(9))
        );
        assert_eq!(
            call(&builtins, "if", &[Term::int(5), Term::int(1), unbound]),
            Ok(Term::int(1))
        );
    }

    #[test]
    fn test_environment_binds_every_builtin() {
        let env = Builtins::standard().environment();
        assert!(matches!(env.lookup("if"), Some(Term::Builtin(b)) if b.arity == 3));
        assert!(matches!(env.lookup("+"), Some(Term::Builtin(b)) if b.arity == 2));
    }
}
