use dashmap::DashMap;
use lenslink_core::{ConnectionId, Role, RoomCode};
use tracing::{debug, info};

/// Occupancy of one room: at most one connection per role.
#[derive(Debug, Default, Clone)]
pub struct RoomState {
    initiator: Option<ConnectionId>,
    responder: Option<ConnectionId>,
}

impl RoomState {
    pub fn occupant(&self, role: Role) -> Option<ConnectionId> {
        match role {
            Role::Initiator => self.initiator,
            Role::Responder => self.responder,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.initiator.is_none() && self.responder.is_none()
    }

    fn slot_mut(&mut self, role: Role) -> &mut Option<ConnectionId> {
        match role {
            Role::Initiator => &mut self.initiator,
            Role::Responder => &mut self.responder,
        }
    }
}

/// Result of an `occupy` call, reported from inside the room lock so the
/// caller can send notifications after releasing it.
#[derive(Debug)]
pub struct Occupied {
    /// Previous occupant of the written role, when it was a different connection.
    pub displaced: Option<ConnectionId>,
    /// Occupant of the other role after the write, when present.
    pub counterpart: Option<(Role, ConnectionId)>,
}

/// Mapping from room code to role occupancy.
///
/// Rooms are created lazily on the first `occupy` and deleted the instant both
/// slots are empty. Per-room mutation happens under the map's per-entry lock;
/// no notification is ever sent while a lock is held.
pub struct RoomRegistry {
    rooms: DashMap<String, RoomState>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: DashMap::new(),
        }
    }

    /// Snapshot of the room for `code`. An unknown code yields an empty state
    /// without inserting anything; empty rooms never live in the map.
    pub fn resolve(&self, code: &RoomCode) -> RoomState {
        self.rooms
            .get(code.as_str())
            .map(|room| room.value().clone())
            .unwrap_or_default()
    }

    /// Assigns `id` to `role` in the room for `code`, overwriting any previous
    /// occupant unconditionally (last writer wins).
    pub fn occupy(&self, code: &RoomCode, role: Role, id: ConnectionId) -> Occupied {
        let mut room = self.rooms.entry(code.as_str().to_owned()).or_default();

        let displaced = room.slot_mut(role).replace(id).filter(|prev| *prev != id);
        let counterpart = room
            .occupant(role.other())
            .filter(|other| *other != id)
            .map(|other| (role.other(), other));

        if displaced.is_some() {
            info!("Room {}: {} displaced as {}", code, id, role);
        } else {
            debug!("Room {}: {} occupies {}", code, id, role);
        }

        Occupied {
            displaced,
            counterpart,
        }
    }

    /// Clears `id` from whichever role it occupies in the room for `code`.
    /// Deletes the room once both slots are empty. No-op for absent occupants.
    pub fn release(&self, code: &RoomCode, id: ConnectionId) {
        let Some(mut room) = self.rooms.get_mut(code.as_str()) else {
            return;
        };

        for role in [Role::Initiator, Role::Responder] {
            let slot = room.slot_mut(role);
            if *slot == Some(id) {
                *slot = None;
            }
        }
        let empty = room.is_empty();
        drop(room);

        if empty
            && self
                .rooms
                .remove_if(code.as_str(), |_, room| room.is_empty())
                .is_some()
        {
            // remove_if re-checks under the entry lock: a concurrent join may
            // have landed between the drop above and the removal.
            debug!("Room {} deleted", code);
        }
    }

    /// The occupant of the other role, when `id` occupies a slot in the room
    /// and the other slot holds a different connection.
    pub fn counterpart(&self, code: &RoomCode, id: ConnectionId) -> Option<(Role, ConnectionId)> {
        let room = self.rooms.get(code.as_str())?;
        let own_role = [Role::Initiator, Role::Responder]
            .into_iter()
            .find(|role| room.occupant(*role) == Some(id))?;

        room.occupant(own_role.other())
            .filter(|other| *other != id)
            .map(|other| (own_role.other(), other))
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
