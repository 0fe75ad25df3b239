//! # Recursion Classification
//!
//! Decides, for every definition, whether it is self-recursive, mutually
//! recursive, both, or neither. Lowering picks its strategy from this.
//!
//! ## Groupings
//!
//! Definitions are classified per *grouping*: the top-level definitions of a
//! program form one grouping, and the bindings of each `let` block form
//! another. For each grouping a [`CallGraph`] is built whose nodes are the
//! grouping's dispatch ids. There is an edge `u → v` when an identifier
//! anywhere inside `u`'s definition (its body, anonymous functions, nested
//! `let` blocks and their bindings) resolves to `v`. Edges never cross
//! groupings.
//!
//! ## Algorithm
//!
//! Tarjan's SCC algorithm runs over each call graph:
//!
//! - every member of a component with more than one member is
//!   `mutually_recursive`
//! - every node with an edge to itself is `self_recursive`
//!
//! The two flags are independent. A definition that calls itself directly and
//! also sits on a longer cycle has both.
//!
//! The component order is kept as well: Tarjan emits callees before callers,
//! which is the order lowering binds a grouping's definitions in.
//!
//! ## Example
//!
//! ```text
//! isEven n = if n == 0 then 1 else isOdd (n - 1)
//! isOdd n  = if n == 0 then 0 else isEven (n - 1)
//! fact n   = if n == 0 then 1 else n * fact (n - 1)
//! main     = isEven (fact 3)
//!
//! edges:      isEven → isOdd, isOdd → isEven, fact → fact, main → isEven, main → fact
//! components: {isEven, isOdd}, {fact}, {main}
//! flags:      isEven, isOdd: mutual; fact: self
//! ```

pub mod graph;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use log::debug;

use crate::ast::expression::Expression;
use crate::ast::{Definition, Program};
use crate::scope::{DispatchId, Entry, ScopeId, ScopeTree, Scoped};

pub use graph::CallGraph;

/// Recursion flags of one definition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    pub self_recursive: bool,
    pub mutually_recursive: bool,
}

impl Flags {
    pub fn is_recursive(self) -> bool {
        self.self_recursive || self.mutually_recursive
    }
}

/// Classifier output, keyed by dispatch id and by grouping scope.
///
/// The AST and the scope tree are never modified; lowering reads this map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    flags: BTreeMap<DispatchId, Flags>,
    groupings: HashMap<ScopeId, Vec<Vec<DispatchId>>>,
}

impl Classification {
    /// Flags of a definition. Unclassified ids report no recursion.
    pub fn flags(&self, id: DispatchId) -> Flags {
        self.flags.get(&id).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DispatchId, Flags)> + '_ {
        self.flags.iter().map(|(id, flags)| (*id, *flags))
    }

    /// Components of a grouping in binding order (callees first).
    pub fn components(&self, grouping: ScopeId) -> &[Vec<DispatchId>] {
        self.groupings
            .get(&grouping)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The mutually recursive components of every grouping.
    pub fn mutual_groups(&self) -> impl Iterator<Item = &[DispatchId]> {
        self.groupings
            .values()
            .flatten()
            .filter(|component| component.len() > 1)
            .map(Vec::as_slice)
    }
}

/// Classify every definition of a resolved program.
///
/// Pure function of its inputs, so running it again yields an identical
/// [`Classification`].
pub fn classify(program: &Program<Scoped>, tree: &ScopeTree) -> Classification {
    let mut classifier = Classifier {
        tree,
        result: Classification::default(),
    };
    classifier.grouping(program.info.scope, &program.definitions);
    classifier.result
}

struct Classifier<'a> {
    tree: &'a ScopeTree,
    result: Classification,
}

impl Classifier<'_> {
    fn grouping(&mut self, scope: ScopeId, definitions: &[Definition<Scoped>]) {
        let members: Vec<(DispatchId, &Definition<Scoped>)> = definitions
            .iter()
            .filter_map(|def| self.tree.binding_of(def).map(|b| (b.id, def)))
            .collect();

        let mut graph = CallGraph::new();
        for (id, _) in &members {
            graph.add_node(*id);
        }
        for (id, def) in &members {
            let mut targets = BTreeSet::new();
            references_in_definition(def, self.tree, &mut targets);
            let targets: Vec<DispatchId> = targets
                .into_iter()
                .filter(|t| graph.contains(*t))
                .collect();
            for target in targets {
                graph.add_edge(*id, target);
            }
        }

        let components = graph.strongly_connected_components();
        for component in &components {
            let mutual = component.len() > 1;
            if mutual {
                debug!(
                    "scope {}: mutually recursive group {:?}",
                    scope.index(),
                    component.iter().map(|id| id.get()).collect::<Vec<_>>()
                );
            }
            for &id in component {
                let flags = Flags {
                    self_recursive: graph.has_self_loop(id),
                    mutually_recursive: mutual,
                };
                if flags.self_recursive {
                    debug!("scope {}: dispatch id {} is self-recursive", scope.index(), id);
                }
                self.result.flags.insert(id, flags);
            }
        }
        self.result.groupings.insert(scope, components);

        for def in definitions {
            self.expression(&def.body);
        }
    }

    /// Find nested groupings.
    fn expression(&mut self, expr: &Expression<Scoped>) {
        match expr {
            Expression::Ident(_) | Expression::Integer(_) => {}
            Expression::Lambda(lambda) => self.expression(&lambda.body),
            Expression::FunctionCall(call) => {
                self.expression(&call.func);
                self.expression(&call.arg);
            }
            Expression::IfThenElse(ite) => {
                self.expression(&ite.condition);
                self.expression(&ite.then_expr);
                self.expression(&ite.else_expr);
            }
            Expression::Let(block) => {
                self.grouping(block.info.scope, &block.bindings);
                self.expression(&block.body);
            }
        }
    }
}

fn references_in_definition(
    def: &Definition<Scoped>,
    tree: &ScopeTree,
    targets: &mut BTreeSet<DispatchId>,
) {
    references(&def.body, tree, targets);
}

/// Collect the dispatch ids of every definition referenced inside `expr`.
fn references(expr: &Expression<Scoped>, tree: &ScopeTree, targets: &mut BTreeSet<DispatchId>) {
    match expr {
        Expression::Ident(ident) => {
            if let Some(Entry::Binding(id)) = tree.lookup(ident.info.scope, &ident.value) {
                targets.insert(id);
            }
        }
        Expression::Integer(_) => {}
        Expression::Lambda(lambda) => references(&lambda.body, tree, targets),
        Expression::FunctionCall(call) => {
            references(&call.func, tree, targets);
            references(&call.arg, tree, targets);
        }
        Expression::IfThenElse(ite) => {
            references(&ite.condition, tree, targets);
            references(&ite.then_expr, tree, targets);
            references(&ite.else_expr, tree, targets);
        }
        Expression::Let(block) => {
            for def in &block.bindings {
                references_in_definition(def, tree, targets);
            }
            references(&block.body, tree, targets);
        }
    }
}
