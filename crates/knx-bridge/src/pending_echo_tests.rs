// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use telegram_codec::GroupAddress;
use tokio::sync::oneshot;

use super::*;

#[tokio::test]
async fn resolve_delivers_applied_to_the_registered_waiter() {
    let echoes = PendingEchoes::new();
    let address = GroupAddress::new(1, 1, 5).unwrap();
    let (tx, rx) = oneshot::channel();
    echoes.register(address, tx);

    echoes.resolve(address);
    assert_eq!(rx.await.unwrap(), Stage2Outcome::Applied);
}

#[tokio::test]
async fn resolve_on_unregistered_address_is_a_no_op() {
    let echoes = PendingEchoes::new();
    echoes.resolve(GroupAddress::new(2, 2, 2).unwrap());
}