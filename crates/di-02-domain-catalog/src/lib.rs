//! # DI-02 Domain Catalog
//!
//! Durable, deduplicated set of admitted apex zones plus the heuristic that
//! derives an apex zone from free-form text.
//!
//! **Subsystem ID:** 02
//! **Architecture:** Hexagonal (domain + ports/adapters)
//!
//! ## Uniqueness as Concurrency Control
//!
//! `insert_if_absent` is a single conditional insert executed by the storage
//! engine. There is no "exists?" query followed by an insert: that sequence
//! races between its two steps and breaks as soon as two processes share a
//! backend. Among simultaneous callers inserting the same zone exactly one
//! observes `true`.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Unique zone | At most one entry per `apex_zone`, enforced by storage |
//! | 2 | Normalized zone | `apex_zone` is lowercase `<label>.<tld>` |
//! | 3 | Immutable entry | Entries are never updated or deleted |
//! | 4 | Duplicate is not an error | A conflicting insert returns `Ok(false)` |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryDomainStore;
pub use domain::{extract_apex_zone, ApexZone, DomainEntry, MalformedInputError, MAX_LABELS};
pub use ports::outbound::DomainStore;
pub use service::DomainCatalog;
