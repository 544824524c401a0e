use lenslink_core::RoomCode;
use uuid::Uuid;

/// Uppercase letters and digits minus the look-alikes I, O, 0 and 1.
const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const CODE_LEN: usize = 6;

/// Draws a fresh room code from UUIDv4 randomness.
///
/// The keyspace (32^6) is large enough that collisions are accepted as
/// negligible; no uniqueness check against live rooms is performed.
pub fn allocate_code() -> RoomCode {
    let seed = Uuid::new_v4();
    let code: String = seed
        .as_bytes()
        .iter()
        .take(CODE_LEN)
        .map(|byte| CODE_ALPHABET[*byte as usize % CODE_ALPHABET.len()] as char)
        .collect();

    RoomCode::parse(&code).expect("generated codes are never empty")
}
