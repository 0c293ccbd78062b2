//! Errors produced while generating, mutating or scheduling fuzz inputs.

/// Possible errors when producing inputs for a contract function.
#[derive(Debug, thiserror::Error)]
pub enum FuzzError {
    #[error("no handler for ABI type `{0}`")]
    UnsupportedType(String),
    #[error("cannot parse `{input}` as `{ty}`")]
    InvalidFormat { ty: String, input: String },
    #[error("value {value} is outside the domain of `{ty}`")]
    OutOfRange { ty: String, value: String },
    #[error("`{ty}` expects {expected} elements, got {actual}")]
    SizeMismatch {
        ty: String,
        expected: usize,
        actual: usize,
    },
    #[error("expected a `{expected}` value, found {found}")]
    TypeMismatch { expected: String, found: String },
    #[error("seed pool has no entries for `{0}`")]
    NoSeeds(String),
    #[error("function `{0}` not found")]
    FunctionNotFound(String),
    #[error("contract `{0}` not found")]
    ContractNotFound(String),
    #[error(
        "stored arguments of function `{function}` have {actual} fields, expected {expected}"
    )]
    SeedsListInvalid {
        function: String,
        expected: usize,
        actual: usize,
    },
    #[error("unknown fuzzing type `{0}`")]
    FuzzerTypeNotFound(String),
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub type Result<T, E = FuzzError> = std::result::Result<T, E>;
