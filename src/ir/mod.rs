//! # Intermediate Representation
//!
//! The closed lambda-calculus term produced by lowering, which is also the
//! value language of the interpreter.
//!
//! ## Pipeline Position
//!
//! ```text
//! Scope Resolution → Classifier → Lowering → [IR] → Interpreter
//! ```
//!
//! ## Forms
//!
//! Lowering only ever builds the first four forms:
//!
//! ```text
//! Variable(x)          x
//! IntLiteral(n)        42
//! Lambda(x, body)      \x. body          (exactly one parameter)
//! Application(f, a)    (f a)             (exactly one argument)
//! ```
//!
//! The remaining three exist only at runtime:
//!
//! - [`Closure`]: a lambda plus the environment it was evaluated in
//! - [`Thunk`]: an unevaluated argument plus its environment and a memo cell
//! - [`BuiltinFunction`]: a primitive with its partially supplied arguments
//!
//! Terms are immutable and share subterms through `Rc`, so cloning a term is
//! cheap and lowering can reuse one subterm in several places.

mod env;

use std::cell::OnceCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use log::trace;

pub use env::Env;

pub use crate::interpreter::BuiltinFunction;

#[derive(Clone)]
pub enum Term {
    Variable(Rc<str>),
    IntLiteral(i64),
    Lambda(Rc<Lambda>),
    Application(Rc<Term>, Rc<Term>),
    Closure(Rc<Closure>),
    Thunk(Rc<Thunk>),
    Builtin(Rc<BuiltinFunction>),
}

#[derive(Debug, Clone)]
pub struct Lambda {
    pub param: Rc<str>,
    pub body: Term,
}

/// A lambda together with a snapshot of its defining environment.
#[derive(Debug, Clone)]
pub struct Closure {
    pub lambda: Rc<Lambda>,
    pub env: Env,
}

/// A suspended computation, evaluated at most once.
pub struct Thunk {
    pub term: Term,
    pub env: Env,
    memo: OnceCell<Term>,
}

impl Thunk {
    pub fn new(term: Term, env: Env) -> Self {
        trace!("suspending {}", term);
        Thunk {
            term,
            env,
            memo: OnceCell::new(),
        }
    }

    /// The memoised value, if this thunk has been forced.
    pub fn value(&self) -> Option<&Term> {
        self.memo.get()
    }

    pub fn is_forced(&self) -> bool {
        self.memo.get().is_some()
    }

    /// Store the forced value. The cell is written once; if it already holds
    /// a value, that value is kept and returned.
    pub fn memoize(&self, value: Term) -> Term {
        self.memo.get_or_init(|| value).clone()
    }
}

impl fmt::Debug for Thunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk")
            .field("term", &self.term)
            .field("memo", &self.memo.get())
            .finish_non_exhaustive()
    }
}

impl Term {
    pub fn var(name: impl Into<Rc<str>>) -> Term {
        Term::Variable(name.into())
    }

    pub fn int(value: i64) -> Term {
        Term::IntLiteral(value)
    }

    pub fn lambda(param: impl Into<Rc<str>>, body: Term) -> Term {
        Term::Lambda(Rc::new(Lambda {
            param: param.into(),
            body,
        }))
    }

    /// Nested single-parameter lambdas, outermost parameter first.
    ///
    /// ```
    /// use fixpoint::ir::Term;
    ///
    /// let k = Term::lambdas(["x", "y"], Term::var("x"));
    /// assert_eq!(k.to_string(), r"(\x. (\y. x))");
    /// ```
    pub fn lambdas<I, S>(params: I, body: Term) -> Term
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<Rc<str>>,
    {
        params
            .into_iter()
            .rev()
            .fold(body, |body, param| Term::lambda(param, body))
    }

    pub fn apply(function: Term, argument: Term) -> Term {
        Term::Application(Rc::new(function), Rc::new(argument))
    }

    /// Left-nested applications: `apply_all(f, [a, b])` is `((f a) b)`.
    pub fn apply_all(function: Term, arguments: impl IntoIterator<Item = Term>) -> Term {
        arguments.into_iter().fold(function, Term::apply)
    }

    pub fn thunk(term: Term, env: Env) -> Term {
        Term::Thunk(Rc::new(Thunk::new(term, env)))
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Term::IntLiteral(value) => Some(*value),
            Term::Thunk(thunk) => thunk.value().and_then(Term::as_int),
            _ => None,
        }
    }

    /// Fully evaluated: an integer, a closure, a builtin or a forced thunk.
    pub fn is_value(&self) -> bool {
        match self {
            Term::IntLiteral(_) | Term::Closure(_) | Term::Builtin(_) => true,
            Term::Thunk(thunk) => thunk.is_forced(),
            Term::Variable(_) | Term::Lambda(_) | Term::Application(_, _) => false,
        }
    }

    /// Names occurring free in a lowered term.
    ///
    /// Runtime forms carry their own environments and contribute nothing.
    pub fn free_variables(&self) -> BTreeSet<Rc<str>> {
        fn walk(term: &Term, bound: &mut Vec<Rc<str>>, free: &mut BTreeSet<Rc<str>>) {
            match term {
                Term::Variable(name) => {
                    if !bound.contains(name) {
                        free.insert(name.clone());
                    }
                }
                Term::Lambda(lambda) => {
                    bound.push(lambda.param.clone());
                    walk(&lambda.body, bound, free);
                    bound.pop();
                }
                Term::Application(func, arg) => {
                    walk(func, bound, free);
                    walk(arg, bound, free);
                }
                Term::IntLiteral(_) | Term::Closure(_) | Term::Thunk(_) | Term::Builtin(_) => {}
            }
        }

        let mut free = BTreeSet::new();
        walk(self, &mut Vec::new(), &mut free);
        free
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => f.debug_tuple("Variable").field(name).finish(),
            Term::IntLiteral(value) => f.debug_tuple("IntLiteral").field(value).finish(),
            Term::Lambda(lambda) => f.debug_tuple("Lambda").field(lambda).finish(),
            Term::Application(func, arg) => {
                f.debug_tuple("Application").field(func).field(arg).finish()
            }
            Term::Closure(closure) => f.debug_tuple("Closure").field(&closure.lambda).finish(),
            Term::Thunk(thunk) => f.debug_tuple("Thunk").field(thunk).finish(),
            Term::Builtin(builtin) => f.debug_tuple("Builtin").field(builtin).finish(),
        }
    }
}

/// Structural equality on the lowered forms. Runtime forms compare by
/// identity, except that a forced thunk compares as its value.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Term::Thunk(thunk), other) | (other, Term::Thunk(thunk))
                if thunk.value().is_some() =>
            {
                thunk.value() == Some(other)
                    || matches!(other, Term::Thunk(o) if Rc::ptr_eq(thunk, o))
            }
            (Term::Variable(a), Term::Variable(b)) => a == b,
            (Term::IntLiteral(a), Term::IntLiteral(b)) => a == b,
            (Term::Lambda(a), Term::Lambda(b)) => a.param == b.param && a.body == b.body,
            (Term::Application(f, a), Term::Application(g, b)) => f == g && a == b,
            (Term::Closure(a), Term::Closure(b)) => Rc::ptr_eq(a, b),
            (Term::Thunk(a), Term::Thunk(b)) => Rc::ptr_eq(a, b),
            (Term::Builtin(a), Term::Builtin(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_all_nests_left() {
        let term = Term::apply_all(Term::var("f"), [Term::int(1), Term::int(2)]);
        assert_eq!(
            term,
            Term::apply(Term::apply(Term::var("f"), Term::int(1)), Term::int(2))
        );
    }

    #[test]
    fn test_lambdas_nest_right() {
        let term = Term::lambdas(["x", "y"], Term::var("y"));
        assert_eq!(
            term,
            Term::lambda("x", Term::lambda("y", Term::var("y")))
        );
    }

    #[test]
    fn test_free_variables_respect_binders() {
        // \x. (f x) y
        let term = Term::lambda(
            "x",
            Term::apply_all(Term::var("f"), [Term::var("x"), Term::var("y")]),
        );
        let free: Vec<String> = term.free_variables().iter().map(|n| n.to_string()).collect();
        assert_eq!(free, vec!["f", "y"]);
    }

    #[test]
    fn test_thunk_memo_written_once() {
        let thunk = Thunk::new(Term::var("x"), Env::new());
        assert!(!thunk.is_forced());

        assert_eq!(thunk.memoize(Term::int(1)).as_int(), Some(1));
        assert_eq!(thunk.memoize(Term::int(2)).as_int(), Some(1));
        assert_eq!(thunk.value().and_then(Term::as_int), Some(1));
    }

    #[test]
    fn test_forced_thunk_equals_its_value() {
        let thunk = Term::thunk(Term::var("x"), Env::new());
        if let Term::Thunk(inner) = &thunk {
            inner.memoize(Term::int(7));
        }
        assert_eq!(thunk, Term::int(7));
        assert_eq!(thunk.as_int(), Some(7));
        assert!(thunk.is_value());
    }
}
