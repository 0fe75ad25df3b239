//! # IR Lowering
//!
//! Rewrites a resolved and classified program into a single closed IR term
//! with no recursive binding form.
//!
//! ## Pipeline Position
//!
//! ```text
//! Scope Resolution → Classifier → [LOWERING] → IR → Interpreter
//! ```
//!
//! ## Transformations
//!
//! ### Definitions
//!
//! Parameters fold right to left into single-parameter lambdas:
//!
//! ```text
//! add x y = + x y      →   \x. \y. ((+ x) y)
//! ```
//!
//! What happens next depends on the definition's [`Flags`](crate::recursion::Flags):
//!
//! - **Not recursive**: the folded lambda is bound as is.
//! - **Self-recursive**: wrapped in the fixed-point combinator, with the
//!   definition's name as the combinator's parameter:
//!   `Y (\fact. \n. ... fact ...)`.
//! - **Mutually recursive**: every member of the group goes into one shared
//!   dispatch table bound under `<dispatch:N>`, and every reference to a
//!   member, inside or outside the group, becomes `(<dispatch:N> id)`.
//!   Mutual dispatch also covers members that call themselves directly.
//!
//! ### Groupings
//!
//! The definitions of a program or `let` block become a chain of
//! applications, one per binding:
//!
//! ```text
//! let { a = 1; b = + a 1 } in b    →   (\a. (\b. b) ((+ a) 1)) 1
//! ```
//!
//! A chain is plain shadowing, so bindings are emitted in the classifier's
//! component order, callees first. Every non-recursive reference then points
//! at a binding that is already in scope.
//!
//! ### Program
//!
//! The program chain ends in a reference to the entry definition (`main` by
//! default). The whole chain is closed over two hidden aliases for the
//! builtins `if` and `==`, which surface conditionals and dispatch tables
//! use, so user definitions shadowing those names cannot change them:
//!
//! ```text
//! (\<if>. (\<==>. CHAIN) ==) if
//! ```

mod combinator;
mod error;

use std::collections::HashMap;
use std::rc::Rc;

use lachs::Span;
use log::debug;

use crate::ast::expression::Expression;
use crate::ast::{Definition, Ident};
use crate::ir::Term;
use crate::recursion::Classification;
use crate::scope::{DispatchId, Entry, Resolution, ScopeId, ScopeTree, Scoped};

pub use combinator::{
    EQ_ALIAS, IF_ALIAS, TAG, conditional, dispatch, dispatch_alias, dispatch_table, fix,
    y_combinator,
};
pub use error::LowerError;

/// Name of the definition a program evaluates to.
pub const DEFAULT_ENTRY: &str = "main";

/// Lower a program whose entry point is `main`.
pub fn lower(resolution: &Resolution, classification: &Classification) -> Result<Term, LowerError> {
    lower_entry(resolution, classification, DEFAULT_ENTRY)
}

/// Lower a program whose entry point is the top-level definition `entry`.
pub fn lower_entry(
    resolution: &Resolution,
    classification: &Classification,
    entry: &str,
) -> Result<Term, LowerError> {
    Lowerer::new(&resolution.tree, classification).program(resolution, entry)
}

/// Lowers one resolved program against its classification.
///
/// Dispatch table aliases are assigned up front, so a reference to a group
/// member lowers the same way wherever it appears.
pub struct Lowerer<'a> {
    tree: &'a ScopeTree,
    classification: &'a Classification,
    aliases: HashMap<DispatchId, Rc<str>>,
}

impl<'a> Lowerer<'a> {
    /// # Arguments
    ///
    /// * `tree` - The scope tree the program was resolved against.
    /// * `classification` - Recursion flags and components for the same
    ///   program. A classification of any other program makes lowering fail
    ///   with [`LowerError::UnknownDefinition`].
    pub fn new(tree: &'a ScopeTree, classification: &'a Classification) -> Self {
        let mut aliases = HashMap::new();
        for group in classification.mutual_groups() {
            if let Some(alias) = dispatch_alias(group) {
                for &id in group {
                    aliases.insert(id, alias.clone());
                }
            }
        }

        Lowerer {
            tree,
            classification,
            aliases,
        }
    }

    /// Lower the whole program to a closed term that evaluates `entry`.
    ///
    /// # Arguments
    ///
    /// * `resolution` - The resolved program, whose tree must be the one
    ///   this lowerer was created with.
    /// * `entry` - Name of the top-level definition the term reduces to.
    pub fn program(&self, resolution: &Resolution, entry: &str) -> Result<Term, LowerError> {
        let program = &resolution.program;
        let scope = program.info.scope;

        let Some(Entry::Binding(main)) = self.tree.scope(scope).get(entry) else {
            return Err(LowerError::missing_main(entry, program.position.clone()));
        };
        debug!("lowering program with entry `{}` (dispatch id {})", entry, main);

        let body = self.reference_to(main, entry);
        let chain = self.grouping(scope, &program.definitions, body)?;

        Ok(Term::apply(
            Term::lambda(
                IF_ALIAS,
                Term::apply(Term::lambda(EQ_ALIAS, chain), Term::var("==")),
            ),
            Term::var("if"),
        ))
    }

    /// Bind the definitions of one grouping around `body`.
    fn grouping(
        &self,
        scope: ScopeId,
        definitions: &[Definition<Scoped>],
        body: Term,
    ) -> Result<Term, LowerError> {
        let by_id: HashMap<DispatchId, &Definition<Scoped>> = definitions
            .iter()
            .filter_map(|def| self.tree.binding_of(def).map(|b| (b.id, def)))
            .collect();

        let mut bindings: Vec<(Rc<str>, Term)> = Vec::new();
        for component in self.classification.components(scope) {
            let members = component
                .iter()
                .map(|id| {
                    by_id.get(id).map(|def| (*id, *def)).ok_or_else(|| {
                        LowerError::unknown_definition(*id, Span::default())
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;

            match members.as_slice() {
                [] => {}
                [(id, def)] if !self.aliases.contains_key(id) => {
                    if def.is_discard() {
                        continue;
                    }
                    bindings.push((def.name.value.as_str().into(), self.single(*id, def)?));
                }
                _ => {
                    let (alias, table) = self.dispatcher(&members)?;
                    bindings.push((alias, table));
                }
            }
        }

        Ok(bindings
            .into_iter()
            .rev()
            .fold(body, |rest, (name, value)| {
                Term::apply(Term::lambda(name, rest), value)
            }))
    }

    /// A definition outside any mutually recursive group.
    fn single(&self, id: DispatchId, def: &Definition<Scoped>) -> Result<Term, LowerError> {
        let folded = self.function(&def.params, &def.body)?;
        if self.classification.flags(id).self_recursive {
            debug!("`{}` is self-recursive, wrapping in Y", def.name.value);
            Ok(fix(def.name.value.as_str(), folded))
        } else {
            Ok(folded)
        }
    }

    /// The shared dispatch table of one mutually recursive group.
    fn dispatcher(
        &self,
        members: &[(DispatchId, &Definition<Scoped>)],
    ) -> Result<(Rc<str>, Term), LowerError> {
        let mut members = members.to_vec();
        members.sort_by_key(|(id, _)| *id);

        let Some(&(lowest, first)) = members.first() else {
            return Err(LowerError::empty_group(Span::default()));
        };
        let span = first.position.clone();
        let Some(alias) = self.aliases.get(&lowest).cloned() else {
            return Err(LowerError::unknown_definition(lowest, span));
        };

        debug!(
            "emitting dispatch table {} for {:?}",
            alias,
            members
                .iter()
                .map(|(id, def)| format!("{}={}", def.name.value, id))
                .collect::<Vec<_>>()
        );

        let bodies = members
            .iter()
            .map(|(id, def)| Ok((*id, self.function(&def.params, &def.body)?)))
            .collect::<Result<Vec<_>, LowerError>>()?;

        match dispatch_table(&alias, bodies) {
            Some(table) => Ok((alias, table)),
            None => Err(LowerError::empty_group(span)),
        }
    }

    /// `\p1. \p2. ... body`
    fn function(
        &self,
        params: &[Ident<Scoped>],
        body: &Expression<Scoped>,
    ) -> Result<Term, LowerError> {
        let body = self.expression(body)?;
        Ok(Term::lambdas(
            params.iter().map(|param| param.value.as_str()),
            body,
        ))
    }

    fn expression(&self, expr: &Expression<Scoped>) -> Result<Term, LowerError> {
        match expr {
            Expression::Ident(ident) => self.identifier(ident),
            Expression::Integer(integer) => Ok(Term::int(integer.value)),
            Expression::Lambda(lambda) => self.function(&lambda.params, &lambda.body),
            Expression::FunctionCall(call) => Ok(Term::apply(
                self.expression(&call.func)?,
                self.expression(&call.arg)?,
            )),
            Expression::IfThenElse(ite) => Ok(conditional(
                self.expression(&ite.condition)?,
                self.expression(&ite.then_expr)?,
                self.expression(&ite.else_expr)?,
            )),
            Expression::Let(block) => {
                let body = self.expression(&block.body)?;
                self.grouping(block.info.scope, &block.bindings, body)
            }
        }
    }

    fn identifier(&self, ident: &Ident<Scoped>) -> Result<Term, LowerError> {
        match self.tree.lookup(ident.info.scope, &ident.value) {
            Some(Entry::Binding(id)) => Ok(self.reference_to(id, &ident.value)),
            Some(Entry::Parameter | Entry::Builtin) => Ok(Term::var(ident.value.as_str())),
            None => Err(LowerError::unbound_identifier(
                ident.value.as_str(),
                ident.position.clone(),
            )),
        }
    }

    /// A reference to the definition `id`, routed through its dispatch table
    /// when it has one.
    fn reference_to(&self, id: DispatchId, name: &str) -> Term {
        match self.aliases.get(&id) {
            Some(alias) => dispatch(alias, id),
            None => Term::var(name),
        }
    }
}
