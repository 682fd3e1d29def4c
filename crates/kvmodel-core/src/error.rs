use crate::{kv::KvError, patch::MergePatchError, types::RecordId};
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// Not a stable API; intended for internal use and may change without notice.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without a detail payload.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct a model-origin unsupported error.
    pub(crate) fn model_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Model, message)
    }

    /// Construct an index-origin unsupported error.
    pub(crate) fn index_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Index, message)
    }

    /// Construct a store-origin corruption error.
    pub(crate) fn store_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Store, message)
    }

    /// Construct an index-origin corruption error.
    pub(crate) fn index_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Index, message)
    }

    /// Construct a serialize-origin internal error.
    pub(crate) fn serialize_internal(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Internal, ErrorOrigin::Serialize, message)
    }

    /// Construct a serialize-origin corruption error.
    pub(crate) fn serialize_corruption(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Corruption, ErrorOrigin::Serialize, message)
    }

    /// Construct a config-origin unsupported error.
    pub(crate) fn config_unsupported(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, ErrorOrigin::Config, message)
    }

    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self.class, ErrorClass::Corruption)
    }

    /// Borrow the underlying store failure, if this error came from the store.
    #[must_use]
    pub const fn store_error(&self) -> Option<&KvError> {
        match &self.detail {
            Some(ErrorDetail::Store(err)) => Some(err),
            _ => None,
        }
    }

    /// Borrow the rejected patch failure, if this error came from a merge.
    #[must_use]
    pub const fn patch_error(&self) -> Option<&MergePatchError> {
        match &self.detail {
            Some(ErrorDetail::Patch(err)) => Some(err),
            _ => None,
        }
    }
}

// Store failures pass through untranslated; the original error rides along
// as detail so callers can still match on it.
impl From<KvError> for InternalError {
    fn from(err: KvError) -> Self {
        Self {
            class: ErrorClass::Internal,
            origin: ErrorOrigin::Store,
            message: err.to_string(),
            detail: Some(ErrorDetail::Store(err)),
        }
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    Store(KvError),

    #[error("{0}")]
    Patch(MergePatchError),
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    Corruption,
    Internal,
    Unsupported,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Corruption => "corruption",
            Self::Internal => "internal",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
/// Not a stable API; may change without notice.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Config,
    Index,
    Model,
    Patch,
    Serialize,
    Store,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Config => "config",
            Self::Index => "index",
            Self::Model => "model",
            Self::Patch => "patch",
            Self::Serialize => "serialize",
            Self::Store => "store",
        };
        write!(f, "{label}")
    }
}

///
/// WriteOp
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WriteOp {
    Create,
    Update,
    Delete,
}

impl fmt::Display for WriteOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{label}")
    }
}

///
/// ConflictError
///
/// The atomic commit for a mutation was rejected because another commit
/// touched an overlapping key. Nothing from the rejected commit was applied;
/// the caller owns the decision to retry the whole read-modify-write.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("transaction conflict: {op} on {collection}/{id}")]
pub struct ConflictError {
    pub collection: &'static str,
    pub op: WriteOp,
    pub id: RecordId,
}

impl ConflictError {
    #[must_use]
    pub const fn new(collection: &'static str, op: WriteOp, id: RecordId) -> Self {
        Self { collection, op, id }
    }
}

///
/// WriteError
///
/// Failure surface for mutating operations. Conflicts are kept apart from
/// every other failure because they are the only retryable outcome.
///

#[derive(Debug, ThisError)]
pub enum WriteError {
    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl WriteError {
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    #[must_use]
    pub const fn as_conflict(&self) -> Option<&ConflictError> {
        match self {
            Self::Conflict(err) => Some(err),
            Self::Internal(_) => None,
        }
    }

    #[must_use]
    pub const fn as_internal(&self) -> Option<&InternalError> {
        match self {
            Self::Internal(err) => Some(err),
            Self::Conflict(_) => None,
        }
    }
}

impl From<KvError> for WriteError {
    fn from(err: KvError) -> Self {
        Self::Internal(err.into())
    }
}
