//! # DI-03 Ingestion Pipeline
//!
//! Turns one raw message from one identity into exactly one [`Outcome`].
//!
//! **Subsystem ID:** 03
//! **Architecture:** Hexagonal (domain + ports + service)
//!
//! ## Flow
//!
//! ```text
//! ingest(identity, raw_message)
//!   ├── RateLimiter::can_pass(identity)       error → Failed(RateLimit)
//!   │     └── denied                           → RateLimited
//!   ├── extract_apex_zone(raw_message)        error → Malformed
//!   └── DomainCatalog::insert_if_absent(zone) error → Failed(Catalog)
//!         ├── true                             → Admitted(zone)
//!         └── false                            → Duplicate(zone)
//! ```
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Quota first | The rate limit is checked before extraction, so malformed and duplicate submissions consume quota |
//! | 2 | Short circuit | A denied or malformed message never reaches the catalog |
//! | 3 | Faults stay faults | A storage error is never reported as `RateLimited` or `Malformed` |
//! | 4 | One outcome | Every call ends in exactly one terminal outcome |

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{IngestError, Outcome, Stage};
pub use ports::{IngestApi, ZoneExtractor};
pub use service::{IngestionPipeline, RECORD_FAILURE_STAGE};
