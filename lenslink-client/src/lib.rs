pub mod error;
pub mod negotiation;
pub mod rtc;
pub mod traits;

pub use error::{LinkError, MediaError, NegotiationError};
pub use negotiation::{NegotiationState, Negotiator};
pub use traits::{MediaSource, PeerLink, SignalSink};
