pub mod handler;
pub mod room_handlers;

pub use handler::{ws_index, RelayWebSocket};
