mod peer_link;
mod track_source;

pub use peer_link::*;
pub use track_source::*;
