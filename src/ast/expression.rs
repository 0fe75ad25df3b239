use lachs::Span;

use super::Definition;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression<T> {
    Ident(Ident<T>),
    Integer(Integer<T>),
    Lambda(Lambda<T>),
    FunctionCall(FunctionCall<T>),
    IfThenElse(IfThenElse<T>),
    Let(Let<T>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ident<T> {
    pub value: String,
    pub position: Span,
    pub info: T,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Integer<T> {
    pub value: i64,
    pub position: Span,
    pub info: T,
}

/// Anonymous function, `\x y -> body`
#[derive(Debug, Clone, PartialEq)]
pub struct Lambda<T> {
    pub params: Vec<Ident<T>>,
    pub body: Box<Expression<T>>,
    pub position: Span,
    pub info: T,
}

/// Application of a function to exactly one argument
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall<T> {
    pub func: Box<Expression<T>>,
    pub arg: Box<Expression<T>>,
    pub position: Span,
    pub info: T,
}

/// Conditional expression (if-then-else)
#[derive(Debug, Clone, PartialEq)]
pub struct IfThenElse<T> {
    pub condition: Box<Expression<T>>,
    pub then_expr: Box<Expression<T>>,
    pub else_expr: Box<Expression<T>>,
    pub position: Span,
    pub info: T,
}

/// `let { bindings } in body`
///
/// All bindings share one scope, so they can see each other regardless of
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Let<T> {
    pub bindings: Vec<Definition<T>>,
    pub body: Box<Expression<T>>,
    pub position: Span,
    pub info: T,
}

impl<T> Expression<T> {
    pub fn position(&self) -> Span {
        match self {
            Expression::Ident(i) => i.position.clone(),
            Expression::Integer(i) => i.position.clone(),
            Expression::Lambda(l) => l.position.clone(),
            Expression::FunctionCall(f) => f.position.clone(),
            Expression::IfThenElse(i) => i.position.clone(),
            Expression::Let(l) => l.position.clone(),
        }
    }

    pub fn info(&self) -> &T {
        match self {
            Expression::Ident(i) => &i.info,
            Expression::Integer(i) => &i.info,
            Expression::Lambda(l) => &l.info,
            Expression::FunctionCall(f) => &f.info,
            Expression::IfThenElse(i) => &i.info,
            Expression::Let(l) => &l.info,
        }
    }
}
