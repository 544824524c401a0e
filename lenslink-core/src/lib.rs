pub mod model;

pub use model::{ConnectionId, Facing, Quality, Role, RoomCode, SignalMessage};
