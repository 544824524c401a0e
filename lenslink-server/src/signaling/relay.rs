use super::SignalingService;
use lenslink_core::{ConnectionId, Role, SignalMessage};
use tracing::debug;

/// Routing of negotiation traffic between the two occupants of a room.
///
/// Payloads are forwarded untouched; a message with no room binding or no
/// counterpart is dropped silently, since traffic before pairing or after peer
/// departure is expected and harmless.
impl SignalingService {
    pub(crate) fn relay(&self, sender: ConnectionId, msg: SignalMessage) {
        let Some(binding) = self.binding(sender) else {
            debug!("Dropping relay from unbound connection {}", sender);
            return;
        };
        let Some((_, other)) = self.registry().counterpart(&binding.code, sender) else {
            debug!("No counterpart in room {}; dropping relay", binding.code);
            return;
        };
        self.send(other, msg);
    }

    /// `flip-camera` / `change-quality` carry an extra gate: only an initiator
    /// may control the capture device, and only while a responder is present.
    pub(crate) fn relay_control(&self, sender: ConnectionId, msg: SignalMessage) {
        let Some(binding) = self.binding(sender) else {
            debug!("Dropping control from unbound connection {}", sender);
            return;
        };
        if binding.role != Role::Initiator {
            debug!("Dropping control command from non-initiator {}", sender);
            return;
        }
        match self.registry().counterpart(&binding.code, sender) {
            Some((Role::Responder, other)) => self.send(other, msg),
            _ => debug!("No responder in room {}; dropping control", binding.code),
        }
    }
}
