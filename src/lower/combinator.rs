//! Closed terms that encode recursion.

use std::rc::Rc;

use crate::ir::Term;
use crate::scope::DispatchId;

/// Name the lowered program binds the builtin `if` to.
pub const IF_ALIAS: &str = "<if>";
/// Name the lowered program binds the builtin `==` to.
pub const EQ_ALIAS: &str = "<==>";
/// Parameter of a dispatch table selecting the member.
pub const TAG: &str = "<tag>";

/// Alias of the dispatch table for a mutually recursive group, named after
/// the group's lowest dispatch id.
pub fn dispatch_alias(group: &[DispatchId]) -> Option<Rc<str>> {
    group
        .iter()
        .min()
        .map(|id| Rc::from(format!("<dispatch:{}>", id)))
}

/// `\f. (\x. f (x x)) (\x. f (x x))`
pub fn y_combinator() -> Term {
    let half = Term::lambda(
        "x",
        Term::apply(
            Term::var("f"),
            Term::apply(Term::var("x"), Term::var("x")),
        ),
    );
    Term::lambda("f", Term::apply(half.clone(), half))
}

/// `Y (\alias. body)`: `body` with `alias` referring to the result itself.
pub fn fix(alias: impl Into<Rc<str>>, body: Term) -> Term {
    Term::apply(y_combinator(), Term::lambda(alias, body))
}

/// `if condition then_term else_term` through the hidden `if` alias.
pub fn conditional(condition: Term, then_term: Term, else_term: Term) -> Term {
    Term::apply_all(Term::var(IF_ALIAS), [condition, then_term, else_term])
}

/// `(alias id)`: a reference to one member of a dispatch table.
pub fn dispatch(alias: &Rc<str>, id: DispatchId) -> Term {
    Term::apply(Term::Variable(alias.clone()), Term::int(i64::from(id.get())))
}

/// One fixed point shared by every member of a mutually recursive group:
///
/// ```text
/// Y (\alias. \tag.
///     if tag == id0 then member0
///     else if tag == id1 then member1
///     ...
///     else memberN)
/// ```
///
/// Members are tested in the given order and the last one is the default.
/// Returns `None` for an empty group.
pub fn dispatch_table(alias: &Rc<str>, members: Vec<(DispatchId, Term)>) -> Option<Term> {
    let mut members = members.into_iter().rev();
    let (_, last) = members.next()?;

    let chain = members.fold(last, |rest, (id, member)| {
        let test = Term::apply_all(
            Term::var(EQ_ALIAS),
            [Term::var(TAG), Term::int(i64::from(id.get()))],
        );
        conditional(test, member, rest)
    });

    Some(fix(alias.clone(), Term::lambda(TAG, chain)))
}
