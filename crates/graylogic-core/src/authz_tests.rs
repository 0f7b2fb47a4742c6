// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use uuid::Uuid;

use super::*;

#[test]
fn owner_and_admin_see_every_room() {
    let room = Uuid::new_v4();
    assert!(RoomScope::for_role(Role::Owner, Vec::new()).allows(Some(room)));
    assert!(RoomScope::for_role(Role::Admin, Vec::new()).allows(Some(room)));
}

#[test]
fn user_is_restricted_to_their_rooms() {
    let allowed = Uuid::new_v4();
    let other = Uuid::new_v4();
    let scope = RoomScope::for_role(Role::User, vec![allowed]);
    assert!(scope.allows(Some(allowed)));
    assert!(!scope.allows(Some(other)));
}

#[test]
fn room_less_entities_are_always_visible() {
    let scope = RoomScope::for_role(Role::User, Vec::new());
    assert!(scope.allows(None));
}