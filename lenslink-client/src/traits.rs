use crate::error::{LinkError, MediaError};
use async_trait::async_trait;
use lenslink_core::{Facing, Quality, SignalMessage};

/// Capture subsystem seam. The negotiation machine acquires a stream on first
/// pairing and a replacement on control commands; it never looks inside the
/// handle.
#[async_trait]
pub trait MediaSource: Send + Sync {
    type Handle: Send + Sync;

    async fn acquire(&self, facing: Facing, quality: Quality) -> Result<Self::Handle, MediaError>;

    async fn release(&self, handle: Self::Handle);
}

/// Peer-connection seam, generic over the media handle the capture subsystem
/// produces. `create_offer`/`create_answer` attach the handle as the outgoing
/// track and return local SDP; `replace_track` substitutes it in place on the
/// existing transceiver.
#[async_trait]
pub trait PeerLink<H: Send + Sync>: Send + Sync {
    async fn create_offer(&self, local: &H) -> Result<String, LinkError>;

    async fn create_answer(&self, local: &H) -> Result<String, LinkError>;

    async fn set_remote_offer(&self, sdp: &str) -> Result<(), LinkError>;

    async fn set_remote_answer(&self, sdp: &str) -> Result<(), LinkError>;

    async fn add_candidate(&self, candidate: &str) -> Result<(), LinkError>;

    async fn replace_track(&self, replacement: &H) -> Result<(), LinkError>;

    async fn close(&self);
}

/// Outbound signaling seam: delivers a message to the signaling transport.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send(&self, msg: SignalMessage);
}
