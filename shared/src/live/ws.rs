//! Live WebSocket protocol
//!
//! Server → Client: LiveServerMessage (推送)
//! Client → Server: LiveClientCommand

use super::event::{ChangeEnvelope, LiveSnapshot};
use crate::error::ErrorCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server → client frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LiveServerMessage {
    /// Full live state for the scope; sent on connect, on resync and after lag
    Ready { snapshot: LiveSnapshot },
    /// One change inside the scope
    Change { envelope: ChangeEnvelope },
    /// Session-level failure; the server closes the socket afterwards
    Error { code: ErrorCode, message: String },
}

/// Client → server frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LiveClientCommand {
    /// Ask for a fresh `Ready` snapshot (reconciling refetch)
    Resync,
}

/// Frame that does not match the protocol
#[derive(Debug, Error)]
#[error("invalid live frame: {0}")]
pub struct FrameError(#[from] serde_json::Error);

/// Decode a server frame at the transport boundary
pub fn decode_server_message(text: &str) -> Result<LiveServerMessage, FrameError> {
    Ok(serde_json::from_str(text)?)
}

/// Decode a client frame at the transport boundary
pub fn decode_client_command(text: &str) -> Result<LiveClientCommand, FrameError> {
    Ok(serde_json::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::live::ChangeEvent;
    use crate::models::{Call, CallType};

    #[test]
    fn test_change_frame_is_tagged() {
        let msg = LiveServerMessage::Change {
            envelope: ChangeEnvelope {
                store_id: 1,
                seq: 7,
                event: ChangeEvent::CallInserted {
                    call: Call {
                        id: 11,
                        store_id: 1,
                        table_no: "3".into(),
                        call_type: CallType::Waiter,
                        active: true,
                        created_at: 0,
                    },
                },
            },
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "Change");
        assert_eq!(json["envelope"]["seq"], 7);
        assert_eq!(json["envelope"]["event"]["kind"], "call_inserted");
        assert_eq!(json["envelope"]["event"]["call"]["call_type"], "waiter");
    }

    #[test]
    fn test_decode_rejects_loose_payloads() {
        assert!(decode_server_message(r#"{"type":"Change","envelope":{"store_id":1}}"#).is_err());
        assert!(decode_server_message(r#"{"type":"Teleport"}"#).is_err());
        assert!(decode_server_message("not json").is_err());
    }

    #[test]
    fn test_decode_client_command() {
        assert_eq!(
            decode_client_command(r#"{"type":"Resync"}"#).unwrap(),
            LiveClientCommand::Resync
        );
    }
}
