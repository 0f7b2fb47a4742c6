// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn jittered_backoff_never_exceeds_base() {
    for _ in 0..50 {
        let base = Duration::from_millis(400);
        assert!(jittered(base) <= base);
    }
}

#[tokio::test]
async fn new_client_starts_disconnected() {
    let source = IndividualAddress::new(1, 1, 1).unwrap();
    let target = DaemonTarget::Tcp { host: "127.0.0.1".to_owned(), port: 0 };
    let (client, rx) = DaemonClient::new(target, source, CancellationToken::new());
    assert_eq!(client.state(), ConnectionState::Disconnected);
    assert_eq!(*rx.borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn send_without_connection_is_rejected() {
    let source = IndividualAddress::new(1, 1, 1).unwrap();
    let target = DaemonTarget::Tcp { host: "127.0.0.1".to_owned(), port: 0 };
    let (client, _rx) = DaemonClient::new(target, source, CancellationToken::new());
    let dest = GroupAddress::new(1, 1, 5).unwrap();
    let result = client.send(dest, Apci::Write, Apdu::Short(1)).await;
    assert!(matches!(result, Err(AppError::NotConnected)));
}
