use thiserror::Error;

/// Errors raised while reading a model or transforming it.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Syntax(String),

    #[error("duplicate class `{0}`")]
    DuplicateClass(String),

    #[error("duplicate element `{0}`")]
    DuplicateName(String),

    #[error("unknown class `{name}` referenced by {context}")]
    UnknownClass { name: String, context: String },

    /// Associations need at least two ends to be emitted as `between` blocks.
    #[error("association `{0}` has fewer than two ends")]
    TooFewEnds(String),

    #[error("association `{0}` declares attributes or operations; use `associationclass`")]
    MembersOnAssociation(String),

    #[error("no element named `{0}` in the model")]
    UnknownSelection(String),

    /// The host handed out an id it cannot resolve.
    #[error("dangling {kind} reference #{index}")]
    DanglingReference { kind: &'static str, index: usize },
}
