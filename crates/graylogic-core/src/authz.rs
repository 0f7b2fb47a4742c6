// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The caller-scope shared by every read/write/command path (§9
//! "Authorisation scope"): a device-registry lookup, a scene activation and
//! a WebSocket subscription all consult the same `RoomScope`, never a
//! client-supplied filter.

use uuid::Uuid;

use crate::model::Role;

/// The set of rooms a caller may act on, derived from their `User`/`Panel`
/// record (or JWT claims) at the edge and threaded down into every
/// operation that touches a room-scoped entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomScope {
    /// `owner`/`admin` roles, or a panel provisioned with no room
    /// restriction: every room is visible.
    All,
    /// Restricted to exactly these rooms.
    Rooms(Vec<Uuid>),
}

impl RoomScope {
    pub fn for_role(role: Role, room_access: Vec<Uuid>) -> Self {
        match role {
            Role::Owner | Role::Admin => Self::All,
            Role::User => Self::Rooms(room_access),
        }
    }

    /// Whether this scope may see/act on a device or scene in `room_id`.
    /// A room-less entity (`None`) is visible to every scope: unassigned
    /// devices and site-wide scenes are not room-gated.
    pub fn allows(&self, room_id: Option<Uuid>) -> bool {
        match (self, room_id) {
            (Self::All, _) => true,
            (Self::Rooms(_), None) => true,
            (Self::Rooms(rooms), Some(id)) => rooms.contains(&id),
        }
    }
}

#[cfg(test)]
#[path = "authz_tests.rs"]
mod tests;
