//! medsim-core
//!
//! Pure domain types and the case catalog for the clinical simulation.
//! No async runtime and no AWS dependency. This is the shared vocabulary
//! of the engine, the stores and the API.

pub mod catalog;
pub mod error;
pub mod models;

pub use catalog::CaseCatalog;
pub use error::{CatalogError, SimError};
