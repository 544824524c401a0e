use lenslink_core::{Facing, Quality};
use thiserror::Error;

/// Failure to acquire a capture stream from the local device.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("capture access denied")]
    Denied,

    #[error("capture device busy: {0}")]
    Busy(String),

    #[error("no capture device for {facing} at {quality}")]
    NoDevice { facing: Facing, quality: Quality },
}

/// Failure reported by the peer-connection layer.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("session description rejected: {0}")]
    Description(String),

    #[error("candidate rejected: {0}")]
    Candidate(String),

    #[error("track substitution failed: {0}")]
    Track(String),
}

/// Errors surfaced by the negotiation state machine. None of these tear the
/// machine down; the failed attempt is reported and the session stays usable.
#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Link(#[from] LinkError),
}
