// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn a_correct_password_verifies_against_its_own_hash() {
    let hashed = hash("correct horse battery staple").unwrap();
    assert!(verify("correct horse battery staple", &hashed));
}

#[test]
fn an_incorrect_password_does_not_verify() {
    let hashed = hash("correct horse battery staple").unwrap();
    assert!(!verify("wrong password", &hashed));
}

#[test]
fn a_malformed_stored_hash_never_verifies() {
    assert!(!verify("anything", "not a valid phc hash"));
}