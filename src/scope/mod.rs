//! # Scope Resolution
//!
//! Builds the tree of lexical scopes for a program and assigns every
//! definition a dispatch id.
//!
//! ## Pipeline Position
//!
//! ```text
//! Front end → Program<()> → [SCOPE RESOLUTION] → Classifier → Lowering → Interpreter
//! ```
//!
//! ## Scope Tree
//!
//! Scopes live in an arena ([`ScopeTree`]) and refer to their parent by
//! [`ScopeId`], so the tree has a single owner and no reference cycles.
//!
//! ```text
//! Builtins            + - * / == ... if
//!   └─ Program        fact, main
//!        ├─ Function  (fact) n
//!        └─ Function  (main)
//!             └─ Let  helper
//!                  └─ Function (helper) x
//! ```
//!
//! Each function-like node (definition, anonymous function) gets its own
//! child scope holding its parameters. A `let` block gets one scope shared by
//! all of its bindings, which is what makes them mutually visible.
//!
//! Identifier lookup is deferred: resolution only records, per node, the scope
//! the node lives in (see [`Scoped`]). Looking a name up against the finished
//! tree is what later passes do, which is why an unbound identifier only
//! surfaces when it is used.

mod check;
mod error;
mod resolve;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use lachs::Span;

use crate::ast::Definition;

pub use check::check_identifiers;
pub use error::{BindingKind, ResolveError};
pub use resolve::{Resolution, Resolver, Scoped, resolve};

/// Index of a scope in its [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(usize);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Globally unique identity of a definition, independent of its name.
///
/// Dispatch ids double as call-graph nodes and as the tags of mutual
/// recursion dispatch tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DispatchId(u32);

impl DispatchId {
    pub fn new(id: u32) -> Self {
        DispatchId(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// Root scope holding the builtin operations
    Builtins,
    /// Top-level definitions
    Program,
    /// Parameters of a named definition
    Function,
    /// Parameters of an anonymous function
    Lambda,
    /// Bindings of a `let` block
    Let,
}

impl ScopeKind {
    /// Scopes whose definitions are classified together.
    pub fn is_grouping(self) -> bool {
        matches!(self, ScopeKind::Program | ScopeKind::Let)
    }
}

/// What a name denotes within a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Parameter,
    Binding(DispatchId),
    Builtin,
}

#[derive(Debug, Clone)]
pub struct Scope {
    kind: ScopeKind,
    parent: Option<ScopeId>,
    owner: Option<DispatchId>,
    entries: HashMap<String, Entry>,
    declared: Vec<DispatchId>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>) -> Self {
        Scope {
            kind,
            parent,
            owner: None,
            entries: HashMap::new(),
            declared: Vec::new(),
        }
    }

    pub fn kind(&self) -> ScopeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<ScopeId> {
        self.parent
    }

    /// The definition whose parameters live in this scope (function scopes only).
    pub fn owner(&self) -> Option<DispatchId> {
        self.owner
    }

    pub fn get(&self, name: &str) -> Option<Entry> {
        self.entries.get(name).copied()
    }

    /// Definitions declared directly in this scope, in declaration order.
    /// Includes discard-named definitions, which have no entry.
    pub fn declared(&self) -> &[DispatchId] {
        &self.declared
    }
}

/// A definition registered during resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub id: DispatchId,
    pub name: String,
    /// Scope the definition was declared in
    pub scope: ScopeId,
    /// Scope holding the definition's parameters
    pub local: ScopeId,
    pub arity: usize,
    pub position: Span,
}

/// Arena of scopes plus the table of bindings keyed by dispatch id.
#[derive(Debug, Clone)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
    bindings: BTreeMap<DispatchId, Binding>,
}

impl ScopeTree {
    /// Create a tree whose root scope holds the given builtin names.
    pub fn new<'a>(builtins: impl IntoIterator<Item = &'a str>) -> Self {
        let mut root = Scope::new(ScopeKind::Builtins, None);
        root.entries = builtins
            .into_iter()
            .map(|name| (name.to_string(), Entry::Builtin))
            .collect();

        ScopeTree {
            scopes: vec![root],
            bindings: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// # Panics
    ///
    /// Panics if `id` was not issued by this tree.
    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.0]
    }

    pub fn scopes(&self) -> impl Iterator<Item = (ScopeId, &Scope)> {
        self.scopes.iter().enumerate().map(|(i, s)| (ScopeId(i), s))
    }

    pub fn binding(&self, id: DispatchId) -> Option<&Binding> {
        self.bindings.get(&id)
    }

    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.values()
    }

    /// The binding registered for a resolved definition.
    pub fn binding_of(&self, definition: &Definition<Scoped>) -> Option<&Binding> {
        self.scope(definition.info.scope)
            .owner
            .and_then(|id| self.binding(id))
    }

    /// Resolve a name by walking from `scope` to the root.
    pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<Entry> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let scope = self.scope(id);
            if let Some(entry) = scope.get(name) {
                return Some(entry);
            }
            current = scope.parent;
        }
        None
    }

    /// Ancestors of `scope`, innermost first, including `scope` itself.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |id| self.scope(*id).parent)
    }

    fn push(&mut self, kind: ScopeKind, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope::new(kind, Some(parent)));
        id
    }

    /// Enter `name` into `scope`. Returns `false` if the name is already
    /// present there.
    fn enter(&mut self, scope: ScopeId, name: &str, entry: Entry) -> bool {
        let entries = &mut self.scopes[scope.0].entries;
        if entries.contains_key(name) {
            return false;
        }
        entries.insert(name.to_string(), entry);
        true
    }

    fn register(&mut self, binding: Binding) {
        let scope = &mut self.scopes[binding.scope.0];
        scope.declared.push(binding.id);
        self.scopes[binding.local.0].owner = Some(binding.id);
        self.bindings.insert(binding.id, binding);
    }
}
