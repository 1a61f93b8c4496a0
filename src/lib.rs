//! Two-player timed chess over a session relay.
//!
//! The crate splits into a pure, per-client rules engine ([`engine`]), the
//! protocol glue one client drives ([`game`]), and the WebSocket relay
//! server ([`websocket`], [`models`], [`routes`]) that pairs two clients in
//! a room and passes their traffic through without inspecting it.

pub mod engine;
pub mod game;
pub mod models;
pub mod routes;
pub mod websocket;
