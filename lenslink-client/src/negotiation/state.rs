/// Where an endpoint stands in the offer/answer exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    /// No counterpart known.
    Idle,
    /// Counterpart known, no session description exchanged yet.
    PeerReady,
    /// Local offer sent, waiting for the remote answer.
    OfferSent,
    /// Remote offer applied, local answer being produced.
    OfferReceived,
    /// Local and remote descriptions both set.
    Stable,
}
