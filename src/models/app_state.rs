use actix::Addr;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::room::Room;
use crate::websocket::handler::RelayWebSocket;

/// Application state shared between connections.
pub struct AppState {
    pub rooms: Mutex<HashMap<String, Room>>,
    pub sessions: Mutex<HashMap<String, Addr<RelayWebSocket>>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            sessions: Mutex::new(HashMap::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
