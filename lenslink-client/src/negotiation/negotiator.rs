use crate::error::NegotiationError;
use crate::negotiation::NegotiationState;
use crate::traits::{MediaSource, PeerLink, SignalSink};
use lenslink_core::{Facing, Quality, Role, RoomCode, SignalMessage};
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Endpoint-side negotiation state machine. The same type runs on both roles;
/// directionality is fixed by `role`: the responder (capture device) originates
/// the first offer once paired, the initiator (viewer) only answers it.
///
/// All mutable protocol state lives in explicit fields here so it can be
/// inspected and tested without any transport wiring.
pub struct Negotiator<P, M, S>
where
    M: MediaSource,
    P: PeerLink<M::Handle>,
    S: SignalSink,
{
    role: Role,
    state: NegotiationState,
    /// Guard against overlapping offer generation.
    offer_in_flight: bool,
    remote_description_set: bool,
    /// Candidates that arrived before the remote description, FIFO.
    pending_candidates: VecDeque<String>,
    facing: Facing,
    quality: Quality,
    media: Option<M::Handle>,
    link: P,
    source: M,
    signals: S,
}

impl<P, M, S> Negotiator<P, M, S>
where
    M: MediaSource,
    P: PeerLink<M::Handle>,
    S: SignalSink,
{
    pub fn new(role: Role, link: P, source: M, signals: S) -> Self {
        Self {
            role,
            state: NegotiationState::Idle,
            offer_in_flight: false,
            remote_description_set: false,
            pending_candidates: VecDeque::new(),
            facing: Facing::Back,
            quality: Quality::Medium,
            media: None,
            link,
            source,
            signals,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Announces this endpoint to the coordinator under `code`.
    pub async fn join_room(&self, code: &RoomCode) {
        let code = code.as_str().to_owned();
        let join = match self.role {
            Role::Initiator => SignalMessage::JoinInitiator { code },
            Role::Responder => SignalMessage::JoinResponder { code },
        };
        self.signals.send(join).await;
    }

    /// Single inbound handler keyed by message kind.
    pub async fn handle_signal(&mut self, msg: SignalMessage) -> Result<(), NegotiationError> {
        match msg {
            SignalMessage::PeerReady => self.handle_peer_ready().await,
            SignalMessage::Offer { sdp } => self.handle_remote_offer(&sdp).await,
            SignalMessage::Answer { sdp } => self.handle_remote_answer(&sdp).await,
            SignalMessage::IceCandidate { candidate } => self.handle_candidate(candidate).await,
            SignalMessage::FlipCamera => self.handle_flip_camera().await,
            SignalMessage::ChangeQuality { quality } => self.handle_change_quality(quality).await,
            SignalMessage::PeerDisconnected => {
                self.teardown().await;
                Ok(())
            }
            SignalMessage::JoinInitiator { .. } | SignalMessage::JoinResponder { .. } => {
                debug!("Join kinds are client-to-server; ignoring");
                Ok(())
            }
        }
    }

    /// App-triggered renegotiation, e.g. after attaching a new media source.
    /// The offer-in-flight guard keeps overlapping triggers from generating a
    /// second offer while one is outstanding.
    pub async fn renegotiate(&mut self) -> Result<(), NegotiationError> {
        if self.role != Role::Responder {
            debug!("Only the responder originates offers");
            return Ok(());
        }
        if self.state == NegotiationState::Idle {
            debug!("No counterpart; nothing to renegotiate");
            return Ok(());
        }
        self.ensure_media().await?;
        self.send_offer().await
    }

    async fn handle_peer_ready(&mut self) -> Result<(), NegotiationError> {
        if self.state != NegotiationState::Idle {
            warn!("peer-ready while {:?}; ignoring", self.state);
            return Ok(());
        }
        self.state = NegotiationState::PeerReady;

        if self.role == Role::Responder {
            self.ensure_media().await?;
            self.send_offer().await?;
        }
        Ok(())
    }

    async fn send_offer(&mut self) -> Result<(), NegotiationError> {
        if self.offer_in_flight {
            debug!("Offer already in flight; not generating another");
            return Ok(());
        }
        let Some(media) = self.media.as_ref() else {
            warn!("Cannot offer without local media");
            return Ok(());
        };

        self.offer_in_flight = true;
        let sdp = match self.link.create_offer(media).await {
            Ok(sdp) => sdp,
            Err(e) => {
                self.offer_in_flight = false;
                return Err(e.into());
            }
        };
        self.signals.send(SignalMessage::Offer { sdp }).await;
        self.state = NegotiationState::OfferSent;
        Ok(())
    }

    async fn handle_remote_offer(&mut self, sdp: &str) -> Result<(), NegotiationError> {
        if self.role != Role::Initiator {
            warn!("Offer received on the responder; only the initiator answers");
            return Ok(());
        }

        self.link.set_remote_offer(sdp).await?;
        self.remote_description_set = true;
        self.state = NegotiationState::OfferReceived;
        self.drain_candidates().await;

        self.ensure_media().await?;
        let Some(media) = self.media.as_ref() else {
            return Ok(());
        };
        let answer = self.link.create_answer(media).await?;
        self.signals.send(SignalMessage::Answer { sdp: answer }).await;
        self.state = NegotiationState::Stable;
        Ok(())
    }

    async fn handle_remote_answer(&mut self, sdp: &str) -> Result<(), NegotiationError> {
        if self.role != Role::Responder || self.state != NegotiationState::OfferSent {
            warn!("Unexpected answer in {:?}; ignoring", self.state);
            return Ok(());
        }

        self.link.set_remote_answer(sdp).await?;
        self.remote_description_set = true;
        self.offer_in_flight = false;
        self.drain_candidates().await;
        self.state = NegotiationState::Stable;
        Ok(())
    }

    /// Queues candidates until the remote description lands, then applies them
    /// in arrival order. A candidate the link rejects is logged and dropped;
    /// the session continues.
    async fn handle_candidate(&mut self, candidate: String) -> Result<(), NegotiationError> {
        if !self.remote_description_set {
            self.pending_candidates.push_back(candidate);
            return Ok(());
        }
        if let Err(e) = self.link.add_candidate(&candidate).await {
            warn!("Discarding candidate: {}", e);
        }
        Ok(())
    }

    async fn drain_candidates(&mut self) {
        while let Some(candidate) = self.pending_candidates.pop_front() {
            if let Err(e) = self.link.add_candidate(&candidate).await {
                warn!("Discarding queued candidate: {}", e);
            }
        }
    }

    /// `flip-camera`: swap the capture facing and substitute the outgoing
    /// track in place. Track replacement on the existing transceiver needs no
    /// new offer/answer round; the session stays `Stable`.
    async fn handle_flip_camera(&mut self) -> Result<(), NegotiationError> {
        if self.role != Role::Responder {
            debug!("flip-camera targets the responder; ignoring");
            return Ok(());
        }
        let facing = self.facing.flipped();
        self.swap_capture(facing, self.quality).await?;
        self.facing = facing;
        Ok(())
    }

    async fn handle_change_quality(&mut self, quality: Quality) -> Result<(), NegotiationError> {
        if self.role != Role::Responder {
            debug!("change-quality targets the responder; ignoring");
            return Ok(());
        }
        self.swap_capture(self.facing, quality).await?;
        self.quality = quality;
        Ok(())
    }

    /// Acquires a replacement stream under new constraints and substitutes the
    /// outgoing track. On failure the previous stream stays attached and the
    /// attempt is surfaced; negotiation state is untouched and retryable.
    async fn swap_capture(&mut self, facing: Facing, quality: Quality) -> Result<(), NegotiationError> {
        let replacement = self.source.acquire(facing, quality).await?;

        if let Err(e) = self.link.replace_track(&replacement).await {
            self.source.release(replacement).await;
            return Err(e.into());
        }
        if let Some(previous) = self.media.replace(replacement) {
            self.source.release(previous).await;
        }
        Ok(())
    }

    async fn ensure_media(&mut self) -> Result<(), NegotiationError> {
        if self.media.is_none() {
            let handle = self.source.acquire(self.facing, self.quality).await?;
            self.media = Some(handle);
        }
        Ok(())
    }

    /// Unconditional teardown: queue cleared, flags reset, media released,
    /// link closed, back to `Idle`. Driven by `peer-disconnected` and by
    /// transport-level close alike.
    pub async fn teardown(&mut self) {
        self.pending_candidates.clear();
        self.offer_in_flight = false;
        self.remote_description_set = false;
        if let Some(media) = self.media.take() {
            self.source.release(media).await;
        }
        self.link.close().await;
        self.state = NegotiationState::Idle;
    }
}
