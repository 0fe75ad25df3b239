//! # Resolution Errors
//!
//! Errors produced while building the scope tree, and the deferred
//! unbound-identifier diagnostic reported when a name is used.
//!
//! Both are recoverable from the point of view of a front end: a REPL can
//! report them and discard the offending submission.

use std::fmt;

use lachs::Span;

/// Which kind of name was bound twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Parameter,
    Definition,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BindingKind::Parameter => write!(f, "parameter"),
            BindingKind::Definition => write!(f, "definition"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A non-discard name entered twice into the same scope.
    DuplicateBinding {
        name: String,
        kind: BindingKind,
        span: Span,
    },

    /// A name not found on the scope chain up to the root.
    UnboundIdentifier { name: String, span: Span },
}

impl ResolveError {
    pub fn duplicate_binding(name: String, kind: BindingKind, span: Span) -> Self {
        ResolveError::DuplicateBinding { name, kind, span }
    }

    pub fn unbound_identifier(name: String, span: Span) -> Self {
        ResolveError::UnboundIdentifier { name, span }
    }

    pub fn span(&self) -> &Span {
        match self {
            ResolveError::DuplicateBinding { span, .. } => span,
            ResolveError::UnboundIdentifier { span, .. } => span,
        }
    }
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            ResolveError::DuplicateBinding { name, kind, .. } => {
                format!("`{}` is already defined in this scope (redefined as {})", name, kind)
            }
            ResolveError::UnboundIdentifier { name, .. } => {
                format!("use of undefined symbol `{}`", name)
            }
        };

        let span = self.span();
        if span.source.is_empty() {
            write!(f, "Resolution error: {}", msg)
        } else {
            write!(f, "{}", span.to_string(&msg))
        }
    }
}

impl std::error::Error for ResolveError {}
