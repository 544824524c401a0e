pub mod room;
pub mod signaling;

pub use room::{RoomRegistry, RoomState, allocate_code};
pub use signaling::{Binding, SignalingService, ws_handler};
