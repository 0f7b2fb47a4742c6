// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn two_generated_tokens_are_distinct() {
    assert_ne!(generate(), generate());
}

#[test]
fn hashing_is_deterministic() {
    let token = generate();
    assert_eq!(hash(&token), hash(&token));
}

#[test]
fn distinct_tokens_hash_differently() {
    assert_ne!(hash(&generate()), hash(&generate()));
}