//! # DI-01 Attempt Ledger & Rate Limiter
//!
//! Rolling-window, per-identity admission quota backed by durable storage.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (domain + ports/adapters)
//!
//! ## Algorithm
//!
//! Attempts are an append-only log, not a mutable counter:
//!
//! ```text
//! can_pass(identity, now)
//!   ├── count = ledger.count_attempts(identity, now - window)   (error → indeterminate)
//!   ├── allowed = count < max_attempts
//!   ├── ledger.record_attempt(identity, now)                   (always, even when denied)
//!   └── return allowed
//! ```
//!
//! A denied identity keeps consuming quota by retrying, so it cannot free
//! capacity faster by hammering the system.
//!
//! ## Domain Invariants
//!
//! | ID | Invariant | Description |
//! |----|-----------|-------------|
//! | 1 | Attempts are immutable | Rows are appended, never updated |
//! | 2 | One record per check | Exactly one attempt recorded per successful count |
//! | 3 | Sliding window | Only `occurred_at >= now - window` counts |
//! | 4 | No cached state | Every decision re-reads the ledger |
//!
//! ## Concurrency
//!
//! Count and record are two separate storage operations. Two concurrent
//! calls from the same identity can both read a count just under the limit,
//! so a window may over-admit by at most the concurrency degree. Enable
//! [`RateLimitPolicy::serialize_per_identity`] to remove that slack within a
//! single process.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryAttemptLedger;
pub use domain::{Attempt, RateDecision, RateLimitError, RateLimitPolicy};
pub use ports::outbound::AttemptLedger;
pub use service::RateLimiter;
