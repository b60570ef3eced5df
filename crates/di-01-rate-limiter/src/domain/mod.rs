//! # Domain Layer
//!
//! Attempt entity, policy value object and decision type.

pub mod entities;
pub mod errors;
pub mod policy;

pub use entities::Attempt;
pub use errors::RateLimitError;
pub use policy::{RateDecision, RateLimitPolicy};
