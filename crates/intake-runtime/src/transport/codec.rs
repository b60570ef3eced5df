//! JSON-lines wire format.
//!
//! Inbound, one object per line:
//!
//! ```text
//! {"identity": "1234", "message_id": 7, "text": "https://example.ir", "is_bot": false}
//! ```
//!
//! Outbound lines are either a reply to the submitter or an operator alert.

use serde::{Deserialize, Serialize};
use shared_types::Identity;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    pub identity: Identity,
    pub message_id: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_bot: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OutboundLine {
    Reply {
        reply_to: i64,
        text: String,
    },
    OperatorAlert {
        operator: Option<String>,
        alert: String,
    },
}

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Malformed inbound line: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Failed to encode outbound line: {0}")]
    Encode(#[source] serde_json::Error),
}

pub fn decode_line(line: &str) -> Result<InboundMessage, CodecError> {
    serde_json::from_str(line).map_err(CodecError::Decode)
}

/// Encode without the trailing newline.
pub fn encode_line(line: &OutboundLine) -> Result<String, CodecError> {
    serde_json::to_string(line).map_err(CodecError::Encode)
}
