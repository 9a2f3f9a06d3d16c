//! WebSocket protocol message definitions
//! Every frame is a JSON object `{"event": <name>, "data": <payload>}`

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::game::{ConnectionId, WorldSnapshot};

/// Messages sent from client to server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMsg {
    /// Raw control command; parsed into a `Command` at the gateway
    #[serde(rename = "control")]
    Control(String),

    /// Chat line to relay to everyone
    #[serde(rename = "chat message")]
    ChatMessage(ChatMessage),
}

/// Messages sent from server to client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerMsg {
    /// Sent once after the connection is established
    #[serde(rename = "welcome", rename_all = "camelCase")]
    Welcome {
        connection_id: ConnectionId,
        server_time: u64,
    },

    /// World state after a tick
    #[serde(rename = "update")]
    Update(WorldSnapshot),

    /// Relayed chat line
    #[serde(rename = "chat message")]
    ChatMessage(ChatMessage),
}

impl ServerMsg {
    /// Serialize once for fan-out to every connection
    pub fn to_frame(&self) -> Result<Frame, serde_json::Error> {
        serde_json::to_string(self).map(Arc::from)
    }
}

/// A serialized server message, shared between connections
pub type Frame = Arc<str>;

/// Chat payload, relayed verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub user_id: String,
    pub text: String,
}
