use derive_more::Display;
use kvmodel_core::{
    error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError, WriteError},
    patch::MergePatchError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// Only a commit conflict is worth retrying as-is; the caller re-runs the
    /// whole read-modify-write.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Conflict)
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = if let Some(patch) = err.patch_error() {
            ErrorKind::Patch(patch.into())
        } else {
            match (err.class, err.origin) {
                (ErrorClass::Corruption, _) => ErrorKind::Corruption,
                (ErrorClass::Unsupported, _) => ErrorKind::Unsupported,
                (ErrorClass::Internal, CoreErrorOrigin::Store) => ErrorKind::Store,
                (ErrorClass::Internal, _) => ErrorKind::Internal,
            }
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<WriteError> for Error {
    fn from(err: WriteError) -> Self {
        match err {
            WriteError::Conflict(conflict) => Self::new(
                ErrorKind::Conflict,
                ErrorOrigin::Executor,
                conflict.to_string(),
            ),
            WriteError::Internal(err) => err.into(),
        }
    }
}

impl From<MergePatchError> for Error {
    fn from(err: MergePatchError) -> Self {
        Self::new(
            ErrorKind::Patch(PatchErrorKind::from(&err)),
            ErrorOrigin::Patch,
            err.to_string(),
        )
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// Another commit touched an overlapping key; nothing was applied.
    Conflict,

    /// The store failed or was unreachable.
    Store,

    /// Stored bytes did not decode.
    Corruption,

    /// The request names something the model does not declare.
    Unsupported,

    Patch(PatchErrorKind),

    /// The caller cannot remediate this.
    Internal,
}

///
/// PatchErrorKind
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PatchErrorKind {
    InvalidShape,
    Rejected,
}

impl From<&MergePatchError> for PatchErrorKind {
    fn from(err: &MergePatchError) -> Self {
        match err.leaf() {
            MergePatchError::InvalidShape { .. } => Self::InvalidShape,
            _ => Self::Rejected,
        }
    }
}

///
/// ErrorOrigin
/// Public origin taxonomy for callers.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Config,

    /// Commit outcomes reported by the write executors.
    Executor,
    Index,
    Model,
    Patch,
    Serialize,
    Store,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Config => Self::Config,
            CoreErrorOrigin::Index => Self::Index,
            CoreErrorOrigin::Model => Self::Model,
            CoreErrorOrigin::Patch => Self::Patch,
            CoreErrorOrigin::Serialize => Self::Serialize,
            CoreErrorOrigin::Store => Self::Store,
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use kvmodel_core::{
        error::{ConflictError, WriteOp},
        kv::KvError,
        types::RecordId,
    };

    #[test]
    fn conflict_is_the_only_retryable_kind() {
        let err: Error =
            WriteError::from(ConflictError::new("users", WriteOp::Update, RecordId::from("x")))
                .into();

        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.is_retryable());
        assert!(err.message.contains("users/x"));

        let err: Error = WriteError::from(KvError::Unavailable("down".to_string())).into();
        assert_eq!(err.kind, ErrorKind::Store);
        assert_eq!(err.origin, ErrorOrigin::Store);
        assert!(!err.is_retryable());
    }

    #[test]
    fn patch_errors_keep_their_leaf_kind() {
        let err: Error = MergePatchError::InvalidShape {
            expected: "text",
            actual: "int",
        }
        .with_field("email")
        .into();

        assert_eq!(err.kind, ErrorKind::Patch(PatchErrorKind::InvalidShape));
        assert_eq!(err.origin, ErrorOrigin::Patch);
    }

    #[test]
    fn patch_failure_inside_write_error_keeps_its_kind() {
        let shape = MergePatchError::InvalidShape {
            expected: "text",
            actual: "int",
        }
        .with_field("email");
        let err: Error = WriteError::from(InternalError::from(shape)).into();
        assert_eq!(err.kind, ErrorKind::Patch(PatchErrorKind::InvalidShape));
        assert_eq!(err.origin, ErrorOrigin::Patch);

        let rejected = MergePatchError::Rejected {
            reason: "locked".to_string(),
        };
        let err: Error = WriteError::from(InternalError::from(rejected)).into();
        assert_eq!(err.kind, ErrorKind::Patch(PatchErrorKind::Rejected));
    }

    #[test]
    fn error_serializes_with_stable_names() {
        let err = Error::new(ErrorKind::Corruption, ErrorOrigin::Index, "bad pointer");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "kind": "Corruption",
                "origin": "Index",
                "message": "bad pointer",
            })
        );
        assert_eq!(serde_json::from_value::<Error>(json).unwrap(), err);
    }
}
