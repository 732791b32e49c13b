use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProxyError {
    #[error("Unsupported signature for {method}: {reason}")]
    SignatureUnsupported { method: String, reason: String },

    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("Not implemented: {0}")]
    UnimplementedCapability(String),

    #[error("Argument count mismatch: expected {expected}, got {actual}")]
    ArgumentCountMismatch { expected: usize, actual: usize },

    #[error("Argument index {index} out of bounds (frame only has {count})")]
    ArgumentOutOfRange { index: usize, count: usize },

    #[error("Argument {0} is not passed by reference")]
    NotByRef(usize),

    #[error("Generic arity mismatch for {method}: expected {expected}, got {actual}")]
    GenericArityMismatch {
        method: String,
        expected: usize,
        actual: usize,
    },

    #[error("Method not found: {0}")]
    MethodNotFound(String),

    #[error("Null reference: {0}")]
    NullReference(String),

    #[error("Invalid proxy type request: {0}")]
    InvalidProxyType(String),

    #[error("Interceptor failed: {0}")]
    Interceptor(String),
}

impl ProxyError {
    pub(crate) fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    pub(crate) fn unsupported(method: impl std::fmt::Debug, reason: impl Into<String>) -> Self {
        Self::SignatureUnsupported {
            method: format!("{method:?}"),
            reason: reason.into(),
        }
    }
}
