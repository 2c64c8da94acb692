//! Error types shared across the crate.
//!
//! Two families of errors exist and are deliberately kept apart:
//!
//! - [`SchemaError`] signals a programming or configuration defect discovered
//!   while building schemas or wiring the processor (bad rule arguments,
//!   unknown classes, misused modifiers). These must never be handled as a
//!   data-validation outcome.
//! - [`InvalidData`](crate::types::InvalidData) carries the annotated type
//!   descriptor tree for data that failed validation.
//!
//! [`ProcessingError`] is the sum of the two, returned by the processing
//! entry points so callers can tell the families apart with a single match.

use crate::record::ClassId;
use crate::types::InvalidData;

/// Errors raised while resolving schemas or configuring the mapper.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The class is not registered as a mapped record.
    #[error("class '{0}' is not registered as a mapped record")]
    ClassNotFound(ClassId),

    /// The class is registered but cannot be instantiated.
    #[error("class '{0}' must be instantiable")]
    NotInstantiable(ClassId),

    /// A rule, modifier or directive received malformed arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A documented current limitation was hit.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// An operation was invoked on an object in the wrong state.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

/// Result alias for schema-building operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Error returned by the processing entry points.
///
/// `Schema` wraps configuration defects, `Data` wraps validation failures;
/// the two intentionally do not convert into each other.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Data(#[from] InvalidData),
}

impl ProcessingError {
    /// Returns the validation failure, if this is a data error.
    pub fn as_data(&self) -> Option<&InvalidData> {
        match self {
            Self::Data(data) => Some(data),
            Self::Schema(_) => None,
        }
    }

    /// Returns the schema error, if this is a configuration defect.
    pub fn as_schema(&self) -> Option<&SchemaError> {
        match self {
            Self::Schema(err) => Some(err),
            Self::Data(_) => None,
        }
    }

    /// Consumes the error, yielding the validation failure if present.
    pub fn into_data(self) -> Option<InvalidData> {
        match self {
            Self::Data(data) => Some(data),
            Self::Schema(_) => None,
        }
    }
}
