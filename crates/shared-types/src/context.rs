//! # Call Context
//!
//! Deadline and cancellation carried into every storage operation.
//!
//! A context is cheap to clone and is created once per inbound message. Storage
//! adapters race their work against it with [`CallContext::guard`]; expiry maps
//! to [`StorageError::Timeout`], cancellation to [`StorageError::Cancelled`].
//! Nothing is retried.

use crate::errors::StorageError;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Per-call deadline and cancellation signal.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<watch::Receiver<bool>>,
}

impl CallContext {
    /// A context with no deadline and no cancellation.
    pub fn background() -> Self {
        Self::default()
    }

    /// A context that expires `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_at(Instant::now() + timeout)
    }

    /// Set an absolute deadline.
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Attach a cancellation signal. The call is cancelled once the channel
    /// holds `true`.
    pub fn cancelled_by(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// The deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the cancellation signal has fired.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Fail fast if the context is already cancelled or expired.
    pub fn check(&self) -> Result<(), StorageError> {
        if self.is_cancelled() {
            return Err(StorageError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Err(StorageError::Timeout),
            _ => Ok(()),
        }
    }

    /// Drive `fut` to completion unless the deadline passes or the call is
    /// cancelled first.
    ///
    /// Dropping `fut` on expiry is the only cleanup performed here. Adapters
    /// that hand work to another thread must make that work abandonable
    /// themselves.
    pub async fn guard<F>(&self, fut: F) -> Result<F::Output, StorageError>
    where
        F: Future,
    {
        self.check()?;

        let deadline = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = wait_cancelled(self.cancel.clone()) => Err(StorageError::Cancelled),
            _ = deadline => Err(StorageError::Timeout),
            out = fut => Ok(out),
        }
    }
}

async fn wait_cancelled(cancel: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = cancel else {
        return std::future::pending::<()>().await;
    };
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender dropped without cancelling: never fires.
            return std::future::pending::<()>().await;
        }
    }
}
