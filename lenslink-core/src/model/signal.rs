use serde::{Deserialize, Serialize};
use std::fmt;

/// Camera facing requested from the capture subsystem.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    Front,
    Back,
}

impl Facing {
    pub fn flipped(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Back => write!(f, "back"),
        }
    }
}

/// Quality tag carried by `change-quality`. The server relays it opaquely; the
/// responder maps it to capture constraints.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Low,
    Medium,
    High,
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Quality::Low => write!(f, "low"),
            Quality::Medium => write!(f, "medium"),
            Quality::High => write!(f, "high"),
        }
    }
}

/// The fixed set of message kinds exchanged over the signaling transport.
///
/// SDP and candidate payloads are opaque to the server; only the kind (and, for
/// control commands, the sender's role) affects routing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", content = "data", rename_all = "kebab-case")]
pub enum SignalMessage {
    JoinInitiator { code: String },
    JoinResponder { code: String },
    /// Server to client: the other role slot is now occupied.
    PeerReady,
    Offer { sdp: String },
    Answer { sdp: String },
    IceCandidate { candidate: String },
    FlipCamera,
    ChangeQuality { quality: Quality },
    /// Server to client: the counterpart left or was displaced.
    PeerDisconnected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_use_kebab_case_tags() {
        let json = serde_json::to_string(&SignalMessage::JoinResponder {
            code: "AB12CD".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"join-responder","data":{"code":"AB12CD"}}"#);

        let json = serde_json::to_string(&SignalMessage::PeerReady).unwrap();
        assert_eq!(json, r#"{"kind":"peer-ready"}"#);

        let json = serde_json::to_string(&SignalMessage::ChangeQuality {
            quality: Quality::High,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"change-quality","data":{"quality":"high"}}"#);
    }

    #[test]
    fn offer_payload_round_trips_untouched() {
        let text = r#"{"kind":"offer","data":{"sdp":"v=0\r\no=- 1 1 IN IP4 0.0.0.0"}}"#;
        let msg: SignalMessage = serde_json::from_str(text).unwrap();
        match &msg {
            SignalMessage::Offer { sdp } => assert!(sdp.starts_with("v=0")),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
