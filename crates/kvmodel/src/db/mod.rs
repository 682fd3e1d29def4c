mod session;

pub use kvmodel_core::db::{IntegrityReport, Record};
pub use session::{DbSession, SessionCollection};
