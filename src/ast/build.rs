//! Constructors for assembling unannotated ASTs.
//!
//! Front ends that produce their own spans build the structs directly; these
//! helpers are for programmatic construction (tests, embedders, the demo
//! binary) where every node gets a default span.
//!
//! ```
//! use fixpoint::ast::build::*;
//!
//! // double x = x + x
//! // main = double 21
//! let program = program(vec![
//!     define("double", &["x"], binary("+", var("x"), var("x"))),
//!     define("main", &[], call(var("double"), int(21))),
//! ]);
//! assert_eq!(program.definitions.len(), 2);
//! ```

use lachs::Span;

use super::expression::{Expression, FunctionCall, Ident, IfThenElse, Integer, Lambda, Let};
use super::{Definition, Program};

fn span() -> Span {
    Span::default()
}

pub fn ident(name: &str) -> Ident<()> {
    Ident {
        value: name.to_string(),
        position: span(),
        info: (),
    }
}

pub fn var(name: &str) -> Expression<()> {
    Expression::Ident(ident(name))
}

pub fn int(value: i64) -> Expression<()> {
    Expression::Integer(Integer {
        value,
        position: span(),
        info: (),
    })
}

pub fn lambda(params: &[&str], body: Expression<()>) -> Expression<()> {
    Expression::Lambda(Lambda {
        params: params.iter().map(|p| ident(p)).collect(),
        body: Box::new(body),
        position: span(),
        info: (),
    })
}

pub fn call(func: Expression<()>, arg: Expression<()>) -> Expression<()> {
    Expression::FunctionCall(FunctionCall {
        func: Box::new(func),
        arg: Box::new(arg),
        position: span(),
        info: (),
    })
}

/// `f a b c` as `((f a) b) c`
pub fn call_n(func: Expression<()>, args: impl IntoIterator<Item = Expression<()>>) -> Expression<()> {
    args.into_iter().fold(func, call)
}

/// Apply an operator name to two operands, `l op r` as `((op l) r)`
pub fn binary(op: &str, left: Expression<()>, right: Expression<()>) -> Expression<()> {
    call_n(var(op), [left, right])
}

pub fn if_then_else(
    condition: Expression<()>,
    then_expr: Expression<()>,
    else_expr: Expression<()>,
) -> Expression<()> {
    Expression::IfThenElse(IfThenElse {
        condition: Box::new(condition),
        then_expr: Box::new(then_expr),
        else_expr: Box::new(else_expr),
        position: span(),
        info: (),
    })
}

pub fn let_in(bindings: Vec<Definition<()>>, body: Expression<()>) -> Expression<()> {
    Expression::Let(Let {
        bindings,
        body: Box::new(body),
        position: span(),
        info: (),
    })
}

pub fn define(name: &str, params: &[&str], body: Expression<()>) -> Definition<()> {
    Definition {
        name: ident(name),
        params: params.iter().map(|p| ident(p)).collect(),
        body: Box::new(body),
        position: span(),
        info: (),
    }
}

pub fn program(definitions: Vec<Definition<()>>) -> Program<()> {
    Program {
        definitions,
        position: span(),
        info: (),
    }
}
