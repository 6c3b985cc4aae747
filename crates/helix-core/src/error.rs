use thiserror::Error as ThisError;

///
/// HelixError
///
/// Top-level error type for query construction, compilation, and
/// execution. The library recovers nothing locally; every variant
/// surfaces to the caller unchanged.
///

#[derive(Debug, ThisError)]
pub enum HelixError {
    /// `delete()` or `delete_bulk()` was invoked with no restricting
    /// predicate.
    #[error("refusing to execute {operation} without a restricting predicate")]
    UnboundedMutation { operation: &'static str },

    #[error(transparent)]
    Expectation(#[from] ExpectationError),

    /// The entity shape cannot participate in the requested operation
    /// (e.g. the reflective grouping path over an unknown attribute).
    #[error("unsupported entity shape: {0}")]
    UnsupportedEntityShape(String),

    /// The IR contains a construct the driver contract cannot express.
    #[error("translation failure: {0}")]
    Translation(String),

    /// Driver-side failure, propagated unchanged.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl HelixError {
    #[must_use]
    pub const fn is_expectation_violation(&self) -> bool {
        matches!(self, Self::Expectation(_))
    }
}

///
/// ExpectationError
///
/// A terminal operation's stated expectation about result cardinality
/// was not met. Raised before any mutation takes place.
///

#[derive(Debug, ThisError)]
pub enum ExpectationError {
    #[error("{operation} expected {expected} matching rows, found {actual}")]
    CountMismatch {
        operation: &'static str,
        expected: u64,
        actual: u64,
    },

    #[error("{operation} matched no rows")]
    NoMatchingRows { operation: &'static str },

    #[error("query for {entity} returned more than one result")]
    NonUniqueResult { entity: &'static str },
}

///
/// RuntimeError
///
/// Failures signalled by the underlying persistence runtime. The core
/// never maps or wraps these beyond the `HelixError::Runtime` envelope.
///

#[derive(Debug, ThisError)]
pub enum RuntimeError {
    #[error("no write transaction is active on this session")]
    TransactionRequired,

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unsupported by this driver: {0}")]
    Unsupported(String),

    #[error("driver internal error: {0}")]
    Internal(String),
}
