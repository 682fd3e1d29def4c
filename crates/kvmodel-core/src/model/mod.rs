//! Runtime data model definitions.
//!
//! `traits::Model` declares *what exists*; this module checks a declaration
//! once before a collection handle is handed out and resolves indexed fields
//! by name.
pub mod index;

use crate::{MAX_INDEXED_FIELDS, error::InternalError, model::index::IndexModel, traits::Model};
use std::collections::BTreeSet;

/// Check one collection declaration.
pub fn validate<M: Model>() -> Result<(), InternalError> {
    if M::COLLECTION.is_empty() {
        return Err(InternalError::model_unsupported(
            "collection name must not be empty",
        ));
    }

    if M::INDEXES.len() > MAX_INDEXED_FIELDS {
        return Err(InternalError::model_unsupported(format!(
            "collection '{}' declares {} indexed fields (limit {MAX_INDEXED_FIELDS})",
            M::COLLECTION,
            M::INDEXES.len(),
        )));
    }

    let mut seen = BTreeSet::new();
    for index in M::INDEXES {
        if index.field.is_empty() {
            return Err(InternalError::model_unsupported(format!(
                "collection '{}' declares an indexed field with an empty name",
                M::COLLECTION,
            )));
        }
        if !seen.insert(index.field) {
            return Err(InternalError::model_unsupported(format!(
                "collection '{}' declares indexed field '{}' more than once",
                M::COLLECTION,
                index.field,
            )));
        }
    }

    Ok(())
}

/// Resolve an indexed field by name.
#[must_use]
pub fn index_for<M: Model>(field: &str) -> Option<&'static IndexModel<M>> {
    M::INDEXES.iter().find(|index| index.field == field)
}
