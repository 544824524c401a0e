mod connection;
mod room;
mod signal;

pub use connection::ConnectionId;
pub use room::{Role, RoomCode};
pub use signal::{Facing, Quality, SignalMessage};
