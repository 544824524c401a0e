mod common;

use common::{TestPeer, init_tracing};
use lenslink_core::{Role, RoomCode, SignalMessage};
use lenslink_server::SignalingService;

fn join(role: Role, code: &str) -> SignalMessage {
    match role {
        Role::Initiator => SignalMessage::JoinInitiator {
            code: code.to_owned(),
        },
        Role::Responder => SignalMessage::JoinResponder {
            code: code.to_owned(),
        },
    }
}

#[tokio::test]
async fn single_occupant_waits_silently() {
    init_tracing();
    let service = SignalingService::new();
    let mut source = TestPeer::connect(&service);

    service.handle_message(source.id, join(Role::Responder, "ROOM01"));

    source.assert_silent();
    assert_eq!(service.registry().room_count(), 1);
}

#[tokio::test]
async fn pairing_delivers_peer_ready_to_both_sides_once() {
    init_tracing();
    let service = SignalingService::new();
    let mut source = TestPeer::connect(&service);
    let mut viewer = TestPeer::connect(&service);

    service.handle_message(source.id, join(Role::Responder, "ROOM01"));
    // Codes are case-insensitive and trimmed before lookup.
    service.handle_message(viewer.id, join(Role::Initiator, " room01 "));

    assert_eq!(source.drain(), vec![SignalMessage::PeerReady]);
    assert_eq!(viewer.drain(), vec![SignalMessage::PeerReady]);
}

#[tokio::test]
async fn empty_room_code_is_silently_ignored() {
    init_tracing();
    let service = SignalingService::new();
    let mut source = TestPeer::connect(&service);

    service.handle_message(source.id, join(Role::Responder, "   "));

    source.assert_silent();
    assert!(service.binding(source.id).is_none());
    assert_eq!(service.registry().room_count(), 0);
}

#[tokio::test]
async fn second_occupant_of_a_role_displaces_the_first() {
    init_tracing();
    let service = SignalingService::new();
    let mut first = TestPeer::connect(&service);
    let mut source = TestPeer::connect(&service);
    let mut second = TestPeer::connect(&service);

    service.handle_message(first.id, join(Role::Initiator, "ABCDEF"));
    service.handle_message(source.id, join(Role::Responder, "ABCDEF"));
    first.drain();
    source.drain();

    service.handle_message(second.id, join(Role::Initiator, "ABCDEF"));

    assert_eq!(first.drain(), vec![SignalMessage::PeerDisconnected]);
    assert!(
        service.binding(first.id).is_none(),
        "displaced occupant must be unbound"
    );

    // The survivor tears down its old session before the new pairing is
    // announced to both current occupants.
    assert_eq!(
        source.drain(),
        vec![SignalMessage::PeerDisconnected, SignalMessage::PeerReady]
    );
    assert_eq!(second.drain(), vec![SignalMessage::PeerReady]);

    let code = RoomCode::parse("ABCDEF").unwrap();
    let room = service.registry().resolve(&code);
    assert_eq!(room.occupant(Role::Initiator), Some(second.id));
}

#[tokio::test]
async fn rejoining_the_same_slot_repeats_nothing() {
    init_tracing();
    let service = SignalingService::new();
    let mut source = TestPeer::connect(&service);
    let mut viewer = TestPeer::connect(&service);

    service.handle_message(source.id, join(Role::Responder, "ROOM01"));
    service.handle_message(viewer.id, join(Role::Initiator, "ROOM01"));
    source.drain();
    viewer.drain();

    service.handle_message(source.id, join(Role::Responder, "ROOM01"));

    source.assert_silent();
    viewer.assert_silent();

    let code = RoomCode::parse("ROOM01").unwrap();
    assert_eq!(
        service.registry().resolve(&code).occupant(Role::Responder),
        Some(source.id)
    );
}

#[tokio::test]
async fn disconnect_notifies_survivor_exactly_once() {
    init_tracing();
    let service = SignalingService::new();
    let mut source = TestPeer::connect(&service);
    let mut viewer = TestPeer::connect(&service);

    service.handle_message(source.id, join(Role::Responder, "ROOM01"));
    service.handle_message(viewer.id, join(Role::Initiator, "ROOM01"));
    source.drain();
    viewer.drain();

    service.disconnect(source.id);

    assert_eq!(viewer.drain(), vec![SignalMessage::PeerDisconnected]);

    let code = RoomCode::parse("ROOM01").unwrap();
    let room = service.registry().resolve(&code);
    assert_eq!(room.occupant(Role::Initiator), Some(viewer.id));
    assert_eq!(room.occupant(Role::Responder), None);
}

#[tokio::test]
async fn room_is_deleted_when_the_last_occupant_leaves() {
    init_tracing();
    let service = SignalingService::new();
    let source = TestPeer::connect(&service);
    let viewer = TestPeer::connect(&service);

    service.handle_message(source.id, join(Role::Responder, "ROOM01"));
    service.handle_message(viewer.id, join(Role::Initiator, "ROOM01"));

    service.disconnect(source.id);
    assert_eq!(service.registry().room_count(), 1);

    service.disconnect(viewer.id);
    assert_eq!(service.registry().room_count(), 0);

    // A later resolve yields a fresh empty room, no residual state.
    let code = RoomCode::parse("ROOM01").unwrap();
    assert!(service.registry().resolve(&code).is_empty());
}

#[tokio::test]
async fn rejoin_to_another_room_vacates_the_old_slot() {
    init_tracing();
    let service = SignalingService::new();
    let mut viewer = TestPeer::connect(&service);
    let mut source = TestPeer::connect(&service);

    service.handle_message(viewer.id, join(Role::Initiator, "OLD999"));
    service.handle_message(source.id, join(Role::Responder, "OLD999"));
    viewer.drain();
    source.drain();

    service.handle_message(source.id, join(Role::Responder, "NEW111"));

    assert_eq!(viewer.drain(), vec![SignalMessage::PeerDisconnected]);

    let old = RoomCode::parse("OLD999").unwrap();
    assert_eq!(
        service.registry().resolve(&old).occupant(Role::Responder),
        None,
        "old room must not keep a dangling identifier"
    );
    let binding = service.binding(source.id).unwrap();
    assert_eq!(binding.code, RoomCode::parse("NEW111").unwrap());
}
