//! Unbound identifier sweep.
//!
//! Resolution itself never fails on an unknown name; lowering reports the
//! first one it meets. This pass reports all of them at once so a front end
//! can print every diagnostic for a submission.

use crate::ast::expression::Expression;
use crate::ast::{Definition, Program};

use super::error::ResolveError;
use super::{ScopeTree, Scoped};

/// Collect an `UnboundIdentifier` error for every identifier in `program`
/// that does not resolve against `tree`, in source order.
pub fn check_identifiers(program: &Program<Scoped>, tree: &ScopeTree) -> Vec<ResolveError> {
    let mut errors = Vec::new();
    for def in &program.definitions {
        check_definition(def, tree, &mut errors);
    }
    errors
}

fn check_definition(def: &Definition<Scoped>, tree: &ScopeTree, errors: &mut Vec<ResolveError>) {
    check_expression(&def.body, tree, errors);
}

fn check_expression(expr: &Expression<Scoped>, tree: &ScopeTree, errors: &mut Vec<ResolveError>) {
    match expr {
        Expression::Ident(ident) => {
            if tree.lookup(ident.info.scope, &ident.value).is_none() {
                errors.push(ResolveError::unbound_identifier(
                    ident.value.clone(),
                    ident.position.clone(),
                ));
            }
        }
        Expression::Integer(_) => {}
        Expression::Lambda(lambda) => check_expression(&lambda.body, tree, errors),
        Expression::FunctionCall(call) => {
            check_expression(&call.func, tree, errors);
            check_expression(&call.arg, tree, errors);
        }
        Expression::IfThenElse(ite) => {
            check_expression(&ite.condition, tree, errors);
            check_expression(&ite.then_expr, tree, errors);
            check_expression(&ite.else_expr, tree, errors);
        }
        Expression::Let(block) => {
            for def in &block.bindings {
                check_definition(def, tree, errors);
            }
            check_expression(&block.body, tree, errors);
        }
    }
}
