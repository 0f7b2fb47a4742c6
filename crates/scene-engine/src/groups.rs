// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Folds a scene's sorted action list into serial groups (§4.6 rule 4): a
//! group starts on the first action or any action with `parallel == false`,
//! and every following `parallel == true` action joins that group. Groups
//! run strictly one after another; actions within a group run concurrently.

use graylogic_core::model::SceneAction;

pub fn group_actions(actions: &[SceneAction]) -> Vec<Vec<&SceneAction>> {
    let mut groups: Vec<Vec<&SceneAction>> = Vec::new();
    for action in actions {
        if action.parallel {
            if let Some(group) = groups.last_mut() {
                group.push(action);
                continue;
            }
        }
        groups.push(vec![action]);
    }
    groups
}

#[cfg(test)]
#[path = "groups_tests.rs"]
mod tests;
