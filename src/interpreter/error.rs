use thiserror::Error;

/// Fatal evaluation errors. Any of them aborts the current evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// Lookup of a name bound nowhere in the environment. Lowering never
    /// produces such a term, so this indicates a term built by hand.
    #[error("unbound variable `{name}`")]
    UnboundVariable { name: String },

    #[error("cannot apply {found}: not a function")]
    NotAFunction { found: String },

    #[error("condition of `if` must be an integer, found {found}")]
    ConditionNotInteger { found: String },

    #[error("builtin `{name}` takes {arity} argument(s) but {supplied} were supplied")]
    TooManyArguments {
        name: String,
        arity: usize,
        supplied: usize,
    },

    #[error("builtin `{name}` expects integer operands, found {found}")]
    ExpectedInteger { name: String, found: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("evaluation exceeded the depth limit of {limit}")]
    RecursionLimit { limit: usize },
}
