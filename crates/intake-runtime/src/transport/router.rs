//! # Message Router
//!
//! Decides what happens to each inbound message:
//!
//! ```text
//! bot sender / empty text           → dropped
//! /start, /info, /help              → fixed reply
//! any other command                 → dropped
//! everything else                   → ingestion pipeline
//!     Admitted(zone)                → reply "`zone`"
//!     Duplicate / RateLimited / Malformed → silence
//!     Failed                        → operator alert
//! ```

use super::codec::{InboundMessage, OutboundLine};
use super::replies::{start_text, HELP_TEXT, INFO_TEXT};
use chrono::Utc;
use di_03_ingestion::{IngestApi, Outcome};
use shared_types::CallContext;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

/// Commands answered without touching storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Info,
    Help,
}

impl Command {
    /// Exact match only; arguments are not accepted.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "/start" => Some(Command::Start),
            "/info" => Some(Command::Info),
            "/help" => Some(Command::Help),
            _ => None,
        }
    }

    pub fn reply_text(&self) -> String {
        match self {
            Command::Start => start_text(),
            Command::Info => INFO_TEXT.to_string(),
            Command::Help => HELP_TEXT.to_string(),
        }
    }
}

/// Messages that never reach a handler.
pub fn should_discard(msg: &InboundMessage) -> bool {
    msg.is_bot || msg.text.trim().is_empty()
}

fn is_command(text: &str) -> bool {
    text.trim_start().starts_with('/')
}

pub struct Router {
    pipeline: Arc<dyn IngestApi>,
    op_timeout: Duration,
    operator_channel: Option<String>,
    cancel: Option<watch::Receiver<bool>>,
}

impl Router {
    pub fn new(pipeline: Arc<dyn IngestApi>, op_timeout: Duration) -> Self {
        Self {
            pipeline,
            op_timeout,
            operator_channel: None,
            cancel: None,
        }
    }

    pub fn with_operator_channel(mut self, channel: Option<String>) -> Self {
        self.operator_channel = channel;
        self
    }

    /// Cancel in-flight storage work once `cancel` holds `true`.
    pub fn with_cancel(mut self, cancel: watch::Receiver<bool>) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn call_context(&self) -> CallContext {
        let ctx = CallContext::with_timeout(self.op_timeout);
        match &self.cancel {
            Some(cancel) => ctx.cancelled_by(cancel.clone()),
            None => ctx,
        }
    }

    /// Route one message. Returns the lines to write, possibly none.
    pub async fn route(&self, msg: &InboundMessage) -> Vec<OutboundLine> {
        if should_discard(msg) {
            debug!(identity = %msg.identity, message_id = msg.message_id, "Discarded message");
            return Vec::new();
        }

        if let Some(command) = Command::parse(&msg.text) {
            debug!(identity = %msg.identity, ?command, "Command");
            return vec![OutboundLine::Reply {
                reply_to: msg.message_id,
                text: command.reply_text(),
            }];
        }
        if is_command(&msg.text) {
            debug!(identity = %msg.identity, "Discarded unknown command");
            return Vec::new();
        }

        let ctx = self.call_context();
        let outcome = self
            .pipeline
            .ingest(&ctx, &msg.identity, &msg.text, Utc::now())
            .await;
        intake_telemetry::record_outcome(outcome.label());

        match outcome {
            Outcome::Admitted(zone) => {
                info!(identity = %msg.identity, apex_zone = %zone, "Domain admitted");
                vec![OutboundLine::Reply {
                    reply_to: msg.message_id,
                    text: format!("`{zone}`"),
                }]
            }
            Outcome::Failed(err) => {
                intake_telemetry::record_storage_error(err.stage.as_str());
                error!(
                    identity = %msg.identity,
                    message_id = msg.message_id,
                    stage = %err.stage,
                    error = %err.source,
                    "Failed to ingest message"
                );
                vec![OutboundLine::OperatorAlert {
                    operator: self.operator_channel.clone(),
                    alert: format!(
                        "🚨 An unexpected error occurred. Please check the logs...\n\n```\n{err}\n```"
                    ),
                }]
            }
            Outcome::Duplicate(_) | Outcome::RateLimited | Outcome::Malformed(_) => Vec::new(),
        }
    }
}
