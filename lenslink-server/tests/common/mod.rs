use lenslink_core::{ConnectionId, SignalMessage};
use lenslink_server::SignalingService;
use tokio::sync::mpsc;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// One registered connection: its identifier plus the receiving end of the
/// outbound channel the transport would normally drain into a socket.
pub struct TestPeer {
    pub id: ConnectionId,
    pub rx: mpsc::UnboundedReceiver<SignalMessage>,
}

impl TestPeer {
    pub fn connect(service: &SignalingService) -> Self {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        service.register(id, tx);
        Self { id, rx }
    }

    /// Everything delivered so far.
    pub fn drain(&mut self) -> Vec<SignalMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }

    pub fn assert_silent(&mut self) {
        let delivered = self.drain();
        assert!(delivered.is_empty(), "expected no messages, got {delivered:?}");
    }
}
