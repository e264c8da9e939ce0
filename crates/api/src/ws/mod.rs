//! WebSocket infrastructure for live slide updates.
//!
//! Browsers connect to `/cable`; the server only pushes. Connection
//! bookkeeping lives in [`WsManager`], pings in [`start_heartbeat`].

mod handler;
mod heartbeat;
pub mod manager;

pub use handler::ws_handler;
pub use heartbeat::{start_heartbeat, HEARTBEAT_INTERVAL};
pub use manager::WsManager;
