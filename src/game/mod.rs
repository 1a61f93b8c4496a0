pub mod session;

pub use session::{ClientGame, SessionEvent, SessionUpdate};
