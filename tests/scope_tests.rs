mod common;

use common::*;
use fixpoint::ast::build::*;
use fixpoint::interpreter::Builtins;
use fixpoint::scope::{
    BindingKind, DispatchId, Entry, ResolveError, Resolver, ScopeKind, check_identifiers, resolve,
};

#[test]
fn test_duplicate_parameter() {
    let result = resolve(
        program(vec![define("f", &["x", "x"], var("x"))]),
        Builtins::standard().names(),
    );

    assert!(matches!(
        result,
        Err(ResolveError::DuplicateBinding {
            ref name,
            kind: BindingKind::Parameter,
            ..
        }) if name == "x"
    ));
}

#[test]
fn test_duplicate_lambda_parameter() {
    let result = resolve(
        program(vec![define("main", &[], lambda(&["y", "y"], var("y")))]),
        Builtins::standard().names(),
    );

    assert!(matches!(
        result,
        Err(ResolveError::DuplicateBinding {
            kind: BindingKind::Parameter,
            ..
        })
    ));
}

#[test]
fn test_duplicate_let_binding() {
    let result = resolve(
        program(vec![define(
            "main",
            &[],
            let_in(
                vec![define("a", &[], int(1)), define("a", &[], int(2))],
                var("a"),
            ),
        )]),
        Builtins::standard().names(),
    );

    assert!(matches!(
        result,
        Err(ResolveError::DuplicateBinding {
            ref name,
            kind: BindingKind::Definition,
            ..
        }) if name == "a"
    ));
}

#[test]
fn test_same_name_in_different_scopes_is_allowed() {
    let (resolution, _) = analyze(program(vec![
        define("x", &[], int(1)),
        define("f", &["x"], var("x")),
        define(
            "main",
            &[],
            let_in(vec![define("x", &[], int(2))], call(var("f"), var("x"))),
        ),
    ]));

    let xs = resolution.tree.bindings().filter(|b| b.name == "x").count();
    assert_eq!(xs, 2);
}

#[test]
fn test_discard_may_repeat_and_is_never_bound() {
    let (resolution, _) = analyze(program(vec![
        define("_", &[], int(1)),
        define("_", &[], int(2)),
        define("f", &["_", "_"], int(3)),
        define("main", &[], int(4)),
    ]));

    let scope = resolution.program.info.scope;
    assert_eq!(resolution.tree.lookup(scope, "_"), None);

    // Discards still receive dispatch ids.
    assert_eq!(resolution.tree.bindings().count(), 4);
}

#[test]
fn test_program_may_shadow_builtins() {
    let (resolution, _) = analyze(program(vec![
        define("+", &["a", "b"], var("a")),
        define("main", &[], binary("+", int(1), int(2))),
    ]));

    let tree = &resolution.tree;
    assert!(matches!(
        tree.lookup(resolution.program.info.scope, "+"),
        Some(Entry::Binding(_))
    ));
    assert_eq!(tree.lookup(tree.root(), "+"), Some(Entry::Builtin));
}

#[test]
fn test_scope_chain() {
    let (resolution, _) = analyze(program(vec![define(
        "main",
        &["a"],
        let_in(
            vec![define("helper", &["b"], lambda(&["c"], var("c")))],
            var("helper"),
        ),
    )]));

    let tree = &resolution.tree;
    let kinds: Vec<_> = tree.scopes().map(|(_, scope)| scope.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ScopeKind::Builtins,
            ScopeKind::Program,
            ScopeKind::Function,
            ScopeKind::Let,
            ScopeKind::Function,
            ScopeKind::Lambda,
        ]
    );

    let (innermost, _) = tree.scopes().last().expect("scopes");
    let chain: Vec<_> = tree
        .ancestors(innermost)
        .map(|id| tree.scope(id).kind())
        .collect();
    assert_eq!(
        chain,
        vec![
            ScopeKind::Lambda,
            ScopeKind::Function,
            ScopeKind::Let,
            ScopeKind::Function,
            ScopeKind::Program,
            ScopeKind::Builtins,
        ]
    );
    assert_eq!(tree.lookup(innermost, "a"), Some(Entry::Parameter));
    assert_eq!(tree.lookup(innermost, "=="), Some(Entry::Builtin));

    let groupings = tree
        .scopes()
        .filter(|(_, scope)| scope.kind().is_grouping())
        .count();
    assert_eq!(groupings, 2);
}

#[test]
fn test_function_scope_is_owned_by_its_definition() {
    let (resolution, _) = analyze(program(vec![fact(), define("main", &[], int(1))]));

    let def = resolution.program.definition("fact").expect("fact defined");
    let binding = resolution.tree.binding_of(def).expect("fact registered");
    assert_eq!(resolution.tree.scope(def.info.scope).owner(), Some(binding.id));
    assert_eq!(binding.arity, 1);
    assert_eq!(binding.scope, resolution.program.info.scope);
}

#[test]
fn test_dispatch_ids_are_unique() {
    let (resolution, _) = analyze(program(vec![
        is_even(),
        is_odd(),
        define(
            "main",
            &[],
            let_in(
                vec![define("x", &[], int(3)), define("y", &[], int(4))],
                var("x"),
            ),
        ),
    ]));

    let mut ids: Vec<_> = resolution.tree.bindings().map(|b| b.id).collect();
    let count = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), count);
    assert_eq!(count, 5);
}

#[test]
fn test_separate_resolvers_do_not_share_ids() {
    let first = resolve(
        program(vec![define("a", &[], int(1))]),
        Builtins::standard().names(),
    )
    .expect("resolution failed");
    let second = resolve(
        program(vec![define("b", &[], int(1))]),
        Builtins::standard().names(),
    )
    .expect("resolution failed");

    let first_id = first.tree.bindings().next().map(|b| b.id);
    let second_id = second.tree.bindings().next().map(|b| b.id);
    assert_eq!(first_id, Some(DispatchId::new(0)));
    assert_eq!(second_id, Some(DispatchId::new(0)));
}

#[test]
fn test_seeded_resolver_continues_numbering() {
    let resolution = Resolver::new(Builtins::standard().names())
        .starting_at(DispatchId::new(7))
        .resolve(program(vec![fact(), define("main", &[], int(1))]))
        .expect("resolution failed");

    let ids: Vec<_> = resolution.tree.bindings().map(|b| b.id.get()).collect();
    assert_eq!(ids, vec![7, 8]);
}

#[test]
fn test_unbound_identifier_is_deferred() {
    let (resolution, _) = analyze(program(vec![
        define("unused", &[], var("nowhere")),
        define("main", &[], int(1)),
    ]));

    let errors = check_identifiers(&resolution.program, &resolution.tree);
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        &errors[0],
        ResolveError::UnboundIdentifier { name, .. } if name == "nowhere"
    ));
}
