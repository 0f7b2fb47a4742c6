// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use uuid::Uuid;

use super::*;

fn action(parallel: bool, sort_order: i32) -> SceneAction {
    SceneAction {
        id: Uuid::new_v4(),
        scene_id: Uuid::new_v4(),
        device_id: Uuid::new_v4(),
        command: graylogic_core::model::SceneCommandKind::On,
        parameters: serde_json::Value::Null,
        delay_ms: 0,
        fade_ms: 0,
        parallel,
        continue_on_error: false,
        sort_order,
    }
}

#[test]
fn a_leading_parallel_action_still_starts_its_own_group() {
    let actions = vec![action(true, 0)];
    let groups = group_actions(&actions);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 1);
}

#[test]
fn consecutive_parallel_actions_join_the_preceding_serial_group() {
    let actions = vec![action(false, 0), action(true, 1), action(true, 2), action(false, 3)];
    let groups = group_actions(&actions);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].len(), 3);
    assert_eq!(groups[1].len(), 1);
}

#[test]
fn an_empty_action_list_yields_no_groups() {
    let groups = group_actions(&[]);
    assert!(groups.is_empty());
}