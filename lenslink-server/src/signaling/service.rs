use crate::room::RoomRegistry;
use dashmap::DashMap;
use lenslink_core::{ConnectionId, Role, RoomCode, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Room and role a connection is currently bound to.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub code: RoomCode,
    pub role: Role,
}

struct ServiceInner {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<SignalMessage>>,
    bindings: DashMap<ConnectionId, Binding>,
    registry: RoomRegistry,
}

/// Per-connection lifecycle and message dispatch.
///
/// The transport registers each connection's outbound channel, feeds every
/// inbound frame to `handle_message`, and reports closure via `disconnect`.
/// Everything else (pairing, relay, notifications) happens in here.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<ServiceInner>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                peers: DashMap::new(),
                bindings: DashMap::new(),
                registry: RoomRegistry::new(),
            }),
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    /// Wires a connection's outbound transport channel. The connection stays
    /// inert (no room, no role) until it sends a join command.
    pub fn register(&self, id: ConnectionId, tx: mpsc::UnboundedSender<SignalMessage>) {
        self.inner.peers.insert(id, tx);
    }

    pub fn binding(&self, id: ConnectionId) -> Option<Binding> {
        self.inner.bindings.get(&id).map(|b| b.value().clone())
    }

    /// Single inbound handler keyed by message kind.
    pub fn handle_message(&self, conn: ConnectionId, msg: SignalMessage) {
        match msg {
            SignalMessage::JoinInitiator { code } => self.join(conn, Role::Initiator, &code),
            SignalMessage::JoinResponder { code } => self.join(conn, Role::Responder, &code),
            SignalMessage::Offer { .. }
            | SignalMessage::Answer { .. }
            | SignalMessage::IceCandidate { .. } => self.relay(conn, msg),
            SignalMessage::FlipCamera | SignalMessage::ChangeQuality { .. } => {
                self.relay_control(conn, msg)
            }
            // Server-to-client kinds arriving inbound are stray frames.
            SignalMessage::PeerReady | SignalMessage::PeerDisconnected => {
                debug!("Ignoring server-bound kind from {}", conn);
            }
        }
    }

    fn join(&self, conn: ConnectionId, role: Role, raw_code: &str) {
        let Some(code) = RoomCode::parse(raw_code) else {
            debug!("Ignoring join with empty room code from {}", conn);
            return;
        };

        if let Some(prev) = self.binding(conn) {
            // Re-joining the slot already held changes nothing; re-announcing
            // the pairing would duplicate peer-ready.
            if prev.code == code && prev.role == role {
                debug!("Connection {} already occupies {} in {}", conn, role, code);
                return;
            }
            // A re-join elsewhere vacates the old slot first so no room is
            // left holding a dangling identifier.
            self.leave(conn, &prev);
        }

        let outcome = self.inner.registry.occupy(&code, role, conn);
        self.inner.bindings.insert(
            conn,
            Binding {
                code: code.clone(),
                role,
            },
        );
        info!("Connection {} joined room {} as {}", conn, code, role);

        // Last writer wins; the displaced occupant is told its session is over
        // and unbound so it cannot keep relaying into this room. Its former
        // counterpart may be mid-session with it and must tear that session
        // down before the fresh pairing below is announced.
        if let Some(displaced) = outcome.displaced {
            self.inner.bindings.remove(&displaced);
            self.send(displaced, SignalMessage::PeerDisconnected);
            if let Some((_, other)) = outcome.counterpart {
                self.send(other, SignalMessage::PeerDisconnected);
            }
        }

        if let Some((_, other)) = outcome.counterpart {
            self.send(other, SignalMessage::PeerReady);
            self.send(conn, SignalMessage::PeerReady);
        }
    }

    /// Tears down a connection: the counterpart (looked up before release,
    /// otherwise it cannot be found) gets exactly one `peer-disconnected`.
    pub fn disconnect(&self, conn: ConnectionId) {
        self.inner.peers.remove(&conn);
        if let Some((_, binding)) = self.inner.bindings.remove(&conn) {
            self.leave(conn, &binding);
        }
        info!("Connection {} gone", conn);
    }

    fn leave(&self, conn: ConnectionId, binding: &Binding) {
        if let Some((_, other)) = self.inner.registry.counterpart(&binding.code, conn) {
            self.send(other, SignalMessage::PeerDisconnected);
        }
        self.inner.registry.release(&binding.code, conn);
    }

    pub(crate) fn send(&self, target: ConnectionId, msg: SignalMessage) {
        let Some(peer) = self.inner.peers.get(&target) else {
            debug!("Dropping signal for unknown connection {}", target);
            return;
        };
        if peer.send(msg).is_err() {
            debug!("Outbound channel for {} is closed", target);
        }
    }
}

impl Default for SignalingService {
    fn default() -> Self {
        Self::new()
    }
}
