//! S-expression rendering of IR terms
//!
//! ```text
//! 42                     integer
//! x                      variable
//! (\x. body)             lambda
//! (f a)                  application
//! <closure (\x. body)>   closure
//! <thunk>                unforced thunk, or the value once forced
//! <builtin +>            builtin, `<builtin + 1/2>` when partially applied
//! ```

use std::fmt::{self, Display};

use crate::ir::{Lambda, Term};

impl Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(name) => write!(f, "{}", name),
            Term::IntLiteral(value) => write!(f, "{}", value),
            Term::Lambda(lambda) => write!(f, "{}", lambda),
            Term::Application(func, arg) => write!(f, "({} {})", func, arg),
            Term::Closure(closure) => write!(f, "<closure {}>", closure.lambda),
            Term::Thunk(thunk) => match thunk.value() {
                Some(value) => write!(f, "{}", value),
                None => write!(f, "<thunk>"),
            },
            Term::Builtin(builtin) if builtin.partial.is_empty() => {
                write!(f, "<builtin {}>", builtin.name)
            }
            Term::Builtin(builtin) => write!(
                f,
                "<builtin {} {}/{}>",
                builtin.name,
                builtin.partial.len(),
                builtin.arity
            ),
        }
    }
}

impl Display for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(\\{}. {})", self.param, self.body)
    }
}
