// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scene activation and execution (§4.6): ordered/parallel per-device action
//! programmes with delay/fade/continue-on-error semantics, one active
//! execution per scene, a per-room fair-share issuance limit, and durable
//! execution history via `catalogue-store`.

mod engine;
mod events;
mod groups;
mod limiter;

pub use engine::SceneEngine;
pub use events::SceneEvent;
