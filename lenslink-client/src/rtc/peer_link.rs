use crate::error::LinkError;
use crate::traits::PeerLink;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_sender::RTCRtpSender;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// Native `PeerLink` over an `RTCPeerConnection` from the `webrtc` crate.
///
/// Generated ICE candidates are serialized to JSON and pushed into
/// `candidate_tx`; the application forwards them to the signaling transport as
/// `ice-candidate` payloads.
pub struct RtcPeerLink {
    pc: Arc<RTCPeerConnection>,
    sender: Mutex<Option<Arc<RTCRtpSender>>>,
}

impl RtcPeerLink {
    pub async fn new(
        ice_urls: Vec<String>,
        candidate_tx: mpsc::UnboundedSender<String>,
    ) -> Result<Self, LinkError> {
        let mut media_engine = MediaEngine::default();
        media_engine
            .register_default_codecs()
            .map_err(description_err)?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)
            .map_err(description_err)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if ice_urls.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: ice_urls,
                ..Default::default()
            }]
        };

        let pc = Arc::new(
            api.new_peer_connection(RTCConfiguration {
                ice_servers,
                ..Default::default()
            })
            .await
            .map_err(description_err)?,
        );

        pc.on_ice_candidate(Box::new(move |candidate| {
            let candidate_tx = candidate_tx.clone();
            Box::pin(async move {
                if let Some(c) = candidate {
                    if let Ok(json) = c.to_json() {
                        if let Ok(text) = serde_json::to_string(&json) {
                            let _ = candidate_tx.send(text);
                        }
                    }
                }
            })
        }));

        Ok(Self {
            pc,
            sender: Mutex::new(None),
        })
    }

    /// Attaches the outgoing track once; later handles go through
    /// `replace_track` on the sender created here.
    async fn attach(&self, track: &Arc<TrackLocalStaticSample>) -> Result<(), LinkError> {
        let mut sender = self.sender.lock().await;
        if sender.is_none() {
            let rtp_sender = self
                .pc
                .add_track(Arc::clone(track) as Arc<dyn TrackLocal + Send + Sync>)
                .await
                .map_err(|e| LinkError::Track(e.to_string()))?;
            *sender = Some(rtp_sender);
        }
        Ok(())
    }
}

#[async_trait]
impl PeerLink<Arc<TrackLocalStaticSample>> for RtcPeerLink {
    async fn create_offer(&self, local: &Arc<TrackLocalStaticSample>) -> Result<String, LinkError> {
        self.attach(local).await?;
        let offer = self.pc.create_offer(None).await.map_err(description_err)?;
        self.pc
            .set_local_description(offer.clone())
            .await
            .map_err(description_err)?;
        Ok(offer.sdp)
    }

    async fn create_answer(
        &self,
        local: &Arc<TrackLocalStaticSample>,
    ) -> Result<String, LinkError> {
        self.attach(local).await?;
        let answer = self.pc.create_answer(None).await.map_err(description_err)?;
        self.pc
            .set_local_description(answer.clone())
            .await
            .map_err(description_err)?;
        Ok(answer.sdp)
    }

    async fn set_remote_offer(&self, sdp: &str) -> Result<(), LinkError> {
        let desc = RTCSessionDescription::offer(sdp.to_owned()).map_err(description_err)?;
        self.pc
            .set_remote_description(desc)
            .await
            .map_err(description_err)
    }

    async fn set_remote_answer(&self, sdp: &str) -> Result<(), LinkError> {
        let desc = RTCSessionDescription::answer(sdp.to_owned()).map_err(description_err)?;
        self.pc
            .set_remote_description(desc)
            .await
            .map_err(description_err)
    }

    async fn add_candidate(&self, candidate: &str) -> Result<(), LinkError> {
        // Candidates normally travel as the JSON produced on the generating
        // side; a bare candidate line is accepted as a fallback.
        let init: RTCIceCandidateInit =
            serde_json::from_str(candidate).unwrap_or_else(|_| RTCIceCandidateInit {
                candidate: candidate.to_owned(),
                ..Default::default()
            });
        self.pc
            .add_ice_candidate(init)
            .await
            .map_err(|e| LinkError::Candidate(e.to_string()))
    }

    async fn replace_track(
        &self,
        replacement: &Arc<TrackLocalStaticSample>,
    ) -> Result<(), LinkError> {
        let sender = self.sender.lock().await;
        let Some(sender) = sender.as_ref() else {
            return Err(LinkError::Track("no outgoing track attached".to_owned()));
        };
        sender
            .replace_track(Some(
                Arc::clone(replacement) as Arc<dyn TrackLocal + Send + Sync>
            ))
            .await
            .map_err(|e| LinkError::Track(e.to_string()))
    }

    async fn close(&self) {
        let _ = self.pc.close().await;
    }
}

fn description_err(e: webrtc::Error) -> LinkError {
    LinkError::Description(e.to_string())
}
