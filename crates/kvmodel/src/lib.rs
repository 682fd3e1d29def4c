//! ## Crate layout
//! - `core`: keys, the store boundary, record executors, and observability.
//! - `db`: the session facade that reports errors as [`Error`].
//! - `error`: the public error taxonomy.
//!
//! The `prelude` module covers everything needed to declare a model and run
//! operations against a store.

pub use kvmodel_core as core;

pub mod db;
pub mod error;

pub use error::Error;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

///
/// Prelude
///

pub mod prelude {
    pub use crate::{
        core::{
            config::ModelConfig,
            kv::{KvStore as _, ListOptions, MemoryKv},
            prelude::*,
        },
        db::{DbSession, SessionCollection},
        error::{Error, ErrorKind},
    };
}
