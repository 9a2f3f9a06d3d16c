//! Triplane Server - authoritative multiplayer arcade flight simulator
//!
//! The server owns the only copy of the world. Clients connect over a
//! WebSocket, send control commands, and receive the full world state once
//! per tick.

pub mod app;
pub mod config;
pub mod game;
pub mod http;
pub mod util;
pub mod ws;
