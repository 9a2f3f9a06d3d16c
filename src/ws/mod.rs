//! WebSocket gateway: connection lifecycle and wire protocol

pub mod handler;
pub mod protocol;
