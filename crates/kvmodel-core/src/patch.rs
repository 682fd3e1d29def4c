use crate::error::{ErrorClass, ErrorDetail, ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

///
/// MergePatch
///
/// Partial-update contract for a record type. `merge` overwrites exactly the
/// fields the patch carries and leaves every other field untouched.
///

pub trait MergePatch {
    type Patch;

    fn merge(&mut self, patch: Self::Patch) -> Result<(), MergePatchError>;
}

///
/// MergePatchError
///
/// Structured failures for user-driven patch application.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum MergePatchError {
    #[error("invalid patch shape: expected {expected}, found {actual}")]
    InvalidShape {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("patch rejected: {reason}")]
    Rejected { reason: String },

    #[error("patch merge failed at {path}: {source}")]
    Context {
        path: String,
        #[source]
        source: Box<Self>,
    },
}

impl MergePatchError {
    /// Prepend a field segment to the merge error path.
    #[must_use]
    pub fn with_field(self, field: impl AsRef<str>) -> Self {
        let segment = field.as_ref();
        match self {
            Self::Context { path, source } => Self::Context {
                path: format!("{segment}.{path}"),
                source,
            },
            source => Self::Context {
                path: segment.to_string(),
                source: Box::new(source),
            },
        }
    }

    /// Return the full contextual path, if available.
    #[must_use]
    pub const fn path(&self) -> Option<&str> {
        match self {
            Self::Context { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }

    /// Return the innermost, non-context merge error variant.
    #[must_use]
    pub fn leaf(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.leaf(),
            _ => self,
        }
    }
}

// The patch error rides along as detail so callers can still tell a shape
// mismatch from a rejection.
impl From<MergePatchError> for InternalError {
    fn from(err: MergePatchError) -> Self {
        Self {
            class: ErrorClass::Unsupported,
            origin: ErrorOrigin::Patch,
            message: err.to_string(),
            detail: Some(ErrorDetail::Patch(err)),
        }
    }
}

/// Overwrite `value` when the patch carries a replacement.
pub fn merge_field<T>(value: &mut T, patch: Option<T>) {
    if let Some(next) = patch {
        *value = next;
    }
}

/// Patch an optional field: `Some(Some(v))` sets, `Some(None)` clears,
/// `None` leaves the field as it is.
pub fn merge_optional<T>(value: &mut Option<T>, patch: Option<Option<T>>) {
    if let Some(next) = patch {
        *value = next;
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_field_only_overwrites_present_values() {
        let mut value = 1;
        merge_field(&mut value, None);
        assert_eq!(value, 1);

        merge_field(&mut value, Some(9));
        assert_eq!(value, 9);
    }

    #[test]
    fn merge_optional_distinguishes_clear_from_skip() {
        let mut value = Some("a");
        merge_optional(&mut value, None);
        assert_eq!(value, Some("a"));

        merge_optional(&mut value, Some(None));
        assert_eq!(value, None);

        merge_optional(&mut value, Some(Some("b")));
        assert_eq!(value, Some("b"));
    }

    #[test]
    fn context_paths_nest_outermost_first() {
        let err = MergePatchError::InvalidShape {
            expected: "text",
            actual: "int",
        }
        .with_field("email")
        .with_field("profile");

        assert_eq!(err.path(), Some("profile.email"));
        assert!(matches!(err.leaf(), MergePatchError::InvalidShape { .. }));
    }
}
