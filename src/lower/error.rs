use std::fmt;

use lachs::Span;

use crate::scope::DispatchId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LowerError {
    /// The program declares no top-level definition with the entry name.
    MissingMain { entry: String, span: Span },

    /// An identifier that resolves nowhere, reported at its first use.
    UnboundIdentifier { name: String, span: Span },

    /// A dispatch id with no matching definition. Only a classification
    /// computed for a different program can cause this.
    UnknownDefinition { id: DispatchId, span: Span },

    /// A recursive group with no members.
    EmptyGroup { span: Span },
}

impl LowerError {
    pub fn missing_main(entry: impl Into<String>, span: Span) -> Self {
        LowerError::MissingMain {
            entry: entry.into(),
            span,
        }
    }

    pub fn unbound_identifier(name: impl Into<String>, span: Span) -> Self {
        LowerError::UnboundIdentifier {
            name: name.into(),
            span,
        }
    }

    pub fn unknown_definition(id: DispatchId, span: Span) -> Self {
        LowerError::UnknownDefinition { id, span }
    }

    pub fn empty_group(span: Span) -> Self {
        LowerError::EmptyGroup { span }
    }

    pub fn span(&self) -> &Span {
        match self {
            LowerError::MissingMain { span, .. } => span,
            LowerError::UnboundIdentifier { span, .. } => span,
            LowerError::UnknownDefinition { span, .. } => span,
            LowerError::EmptyGroup { span } => span,
        }
    }
}

impl fmt::Display for LowerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let msg = match self {
            LowerError::MissingMain { entry, .. } => {
                format!("program has no `{}` function", entry)
            }
            LowerError::UnboundIdentifier { name, .. } => {
                format!("use of undefined symbol `{}`", name)
            }
            LowerError::UnknownDefinition { id, .. } => {
                format!("no definition with dispatch id {}", id)
            }
            LowerError::EmptyGroup { .. } => "recursive group has no members".to_string(),
        };

        let span = self.span();
        if span.source.is_empty() {
            write!(f, "Lowering error: {}", msg)
        } else {
            write!(f, "{}", span.to_string(&msg))
        }
    }
}

impl std::error::Error for LowerError {}
