//! # Domain Layer

pub mod errors;
pub mod outcome;

pub use errors::{IngestError, Stage};
pub use outcome::Outcome;
