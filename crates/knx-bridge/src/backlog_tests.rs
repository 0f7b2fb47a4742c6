// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use telegram_codec::{Apci, Apdu, GroupAddress, IndividualAddress, Telegram};

use super::*;

fn sample() -> Telegram {
    Telegram::new(
        IndividualAddress::new(1, 1, 1).unwrap(),
        GroupAddress::new(1, 1, 5).unwrap(),
        Apci::Write,
        Apdu::Short(1),
    )
    .unwrap()
}

#[tokio::test]
async fn offer_delivers_until_capacity_then_drops() {
    let (backlog, mut rx, dropped) = Backlog::new(1);
    backlog.offer(sample());
    backlog.offer(sample());
    assert_eq!(dropped.get(), 1);
    assert!(rx.recv().await.is_some());
    assert!(rx.try_recv().is_err());
}