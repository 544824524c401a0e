use crate::error::MediaError;
use crate::traits::MediaSource;
use async_trait::async_trait;
use lenslink_core::{Facing, Quality};
use std::sync::Arc;
use webrtc::api::media_engine::MIME_TYPE_VP8;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// `MediaSource` producing sample-fed local video tracks, one per
/// facing/quality request. Feeding frames into the returned track is the
/// application's concern; the negotiation layer only attaches and swaps it.
pub struct SampleTrackSource {
    stream_id: String,
}

impl SampleTrackSource {
    pub fn new(stream_id: impl Into<String>) -> Self {
        Self {
            stream_id: stream_id.into(),
        }
    }
}

#[async_trait]
impl MediaSource for SampleTrackSource {
    type Handle = Arc<TrackLocalStaticSample>;

    async fn acquire(&self, facing: Facing, quality: Quality) -> Result<Self::Handle, MediaError> {
        let track = TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_VP8.to_owned(),
                ..Default::default()
            },
            format!("camera-{}-{}", facing, quality),
            self.stream_id.clone(),
        );
        Ok(Arc::new(track))
    }

    async fn release(&self, handle: Self::Handle) {
        // The writer stops feeding samples once its reference is gone.
        drop(handle);
    }
}
