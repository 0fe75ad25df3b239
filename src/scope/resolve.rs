use log::debug;

use crate::ast::expression::{Expression, FunctionCall, Ident, IfThenElse, Integer, Lambda, Let};
use crate::ast::{Definition, Program, is_discard};

use super::error::{BindingKind, ResolveError};
use super::{Binding, DispatchId, Entry, ScopeId, ScopeKind, ScopeTree};

/// Annotation attached to every node of a resolved AST.
///
/// For `Ident`, `Integer`, `FunctionCall` and `IfThenElse` this is the scope
/// the node is evaluated in. For `Definition`, `Lambda`, `Let` and `Program`
/// it is the scope the node itself introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scoped {
    pub scope: ScopeId,
}

/// Output of scope resolution: the scope tree and the annotated program.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub tree: ScopeTree,
    pub program: Program<Scoped>,
}

/// Builds a [`ScopeTree`] and annotates a program with it.
///
/// The resolver owns the dispatch-id counter, so two resolvers never share
/// hidden state. A resolver can be seeded with a starting id when several
/// separately resolved units have to coexist.
pub struct Resolver {
    tree: ScopeTree,
    next_id: u32,
}

impl Resolver {
    /// Create a resolver whose root scope holds the given builtins.
    ///
    /// # Arguments
    ///
    /// * `builtins` - Names visible everywhere unless shadowed by the
    ///   program. Dispatch ids start at 0.
    pub fn new<'a>(builtins: impl IntoIterator<Item = &'a str>) -> Self {
        Resolver {
            tree: ScopeTree::new(builtins),
            next_id: 0,
        }
    }

    /// Issue dispatch ids starting at `first`.
    pub fn starting_at(mut self, first: DispatchId) -> Self {
        self.next_id = first.get();
        self
    }

    /// Resolve every definition of `program`, consuming the resolver.
    ///
    /// Fails on the first parameter or definition name declared twice in one
    /// scope. Unbound identifiers are not reported here, see
    /// [`check_identifiers`](super::check_identifiers).
    pub fn resolve(mut self, program: Program<()>) -> Result<Resolution, ResolveError> {
        let scope = self.tree.push(ScopeKind::Program, self.tree.root());
        debug!("resolving program in scope {}", scope.index());

        let definitions = program
            .definitions
            .into_iter()
            .map(|def| self.definition(def, scope))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Resolution {
            tree: self.tree,
            program: Program {
                definitions,
                position: program.position,
                info: Scoped { scope },
            },
        })
    }

    fn fresh_id(&mut self) -> DispatchId {
        let id = DispatchId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create a child scope and enter each parameter into it.
    fn parameters(
        &mut self,
        kind: ScopeKind,
        params: Vec<Ident<()>>,
        enclosing: ScopeId,
    ) -> Result<(ScopeId, Vec<Ident<Scoped>>), ResolveError> {
        let local = self.tree.push(kind, enclosing);

        let params = params
            .into_iter()
            .map(|param| {
                if !is_discard(&param.value)
                    && !self.tree.enter(local, &param.value, Entry::Parameter)
                {
                    return Err(ResolveError::duplicate_binding(
                        param.value,
                        BindingKind::Parameter,
                        param.position,
                    ));
                }
                Ok(Ident {
                    value: param.value,
                    position: param.position,
                    info: Scoped { scope: local },
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok((local, params))
    }

    /// Parameters and body go into a fresh child scope; the definition itself
    /// is registered in `enclosing` once its body has been resolved.
    fn definition(
        &mut self,
        def: Definition<()>,
        enclosing: ScopeId,
    ) -> Result<Definition<Scoped>, ResolveError> {
        let arity = def.params.len();
        let (local, params) = self.parameters(ScopeKind::Function, def.params, enclosing)?;
        let body = self.expression(*def.body, local)?;

        let id = self.fresh_id();
        let name = def.name.value;
        if !is_discard(&name) && !self.tree.enter(enclosing, &name, Entry::Binding(id)) {
            return Err(ResolveError::duplicate_binding(
                name,
                BindingKind::Definition,
                def.name.position,
            ));
        }

        debug!(
            "registered `{}` as dispatch id {} in scope {}",
            name,
            id,
            enclosing.index()
        );
        self.tree.register(Binding {
            id,
            name: name.clone(),
            scope: enclosing,
            local,
            arity,
            position: def.position.clone(),
        });

        Ok(Definition {
            name: Ident {
                value: name,
                position: def.name.position,
                info: Scoped { scope: enclosing },
            },
            params,
            body: Box::new(body),
            position: def.position,
            info: Scoped { scope: local },
        })
    }

    fn expression(
        &mut self,
        expr: Expression<()>,
        scope: ScopeId,
    ) -> Result<Expression<Scoped>, ResolveError> {
        let here = Scoped { scope };

        Ok(match expr {
            Expression::Ident(ident) => Expression::Ident(Ident {
                value: ident.value,
                position: ident.position,
                info: here,
            }),
            Expression::Integer(integer) => Expression::Integer(Integer {
                value: integer.value,
                position: integer.position,
                info: here,
            }),
            Expression::Lambda(lambda) => {
                let (local, params) = self.parameters(ScopeKind::Lambda, lambda.params, scope)?;
                Expression::Lambda(Lambda {
                    params,
                    body: Box::new(self.expression(*lambda.body, local)?),
                    position: lambda.position,
                    info: Scoped { scope: local },
                })
            }
            Expression::FunctionCall(call) => Expression::FunctionCall(FunctionCall {
                func: Box::new(self.expression(*call.func, scope)?),
                arg: Box::new(self.expression(*call.arg, scope)?),
                position: call.position,
                info: here,
            }),
            Expression::IfThenElse(ite) => Expression::IfThenElse(IfThenElse {
                condition: Box::new(self.expression(*ite.condition, scope)?),
                then_expr: Box::new(self.expression(*ite.then_expr, scope)?),
                else_expr: Box::new(self.expression(*ite.else_expr, scope)?),
                position: ite.position,
                info: here,
            }),
            Expression::Let(block) => {
                let local = self.tree.push(ScopeKind::Let, scope);
                debug!("resolving let block in scope {}", local.index());

                let bindings = block
                    .bindings
                    .into_iter()
                    .map(|def| self.definition(def, local))
                    .collect::<Result<Vec<_>, _>>()?;

                Expression::Let(Let {
                    bindings,
                    body: Box::new(self.expression(*block.body, local)?),
                    position: block.position,
                    info: Scoped { scope: local },
                })
            }
        })
    }
}

/// Resolve a program against the given builtin names.
pub fn resolve<'a>(
    program: Program<()>,
    builtins: impl IntoIterator<Item = &'a str>,
) -> Result<Resolution, ResolveError> {
    Resolver::new(builtins).resolve(program)
}
