// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use catalogue_store::CatalogueStore;
use graylogic_core::model::{Role, User};
use graylogic_core::Slug;

use super::*;

async fn store_with_user(username: &str, password: &str, active: bool) -> (CatalogueStore, User) {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let user = User {
        id: Uuid::new_v4(),
        username: username.to_owned(),
        password_hash: password::hash(password),
        role: Role::Admin,
        active,
        room_access: Vec::new(),
        created_at: Utc::now(),
    };
    store.insert_user(user.clone()).await.unwrap();
    (store, user)
}

#[tokio::test]
async fn login_then_authenticate_session_succeeds() {
    let (store, user) = store_with_user("ada", "correct horse", true).await;
    let service = AuthService::new(store, "secret".to_owned());

    let (jwt, logged_in) = service.login("ada", "correct horse").await.unwrap();
    assert_eq!(logged_in.id, user.id);

    let ctx = service.authenticate_session(&jwt).await.unwrap();
    assert_eq!(ctx.actor, user.id.to_string());
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let (store, _user) = store_with_user("ada", "correct horse", true).await;
    let service = AuthService::new(store, "secret".to_owned());

    let err = service.login("ada", "wrong password").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn login_for_an_inactive_user_is_rejected() {
    let (store, _user) = store_with_user("ada", "correct horse", false).await;
    let service = AuthService::new(store, "secret".to_owned());

    let err = service.login("ada", "correct horse").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn authenticate_session_after_logout_is_rejected() {
    let (store, _user) = store_with_user("ada", "correct horse", true).await;
    let service = AuthService::new(store, "secret".to_owned());

    let (jwt, _) = service.login("ada", "correct horse").await.unwrap();
    service.logout(&jwt).await.unwrap();

    let err = service.authenticate_session(&jwt).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn authenticate_session_with_a_tampered_token_is_rejected() {
    let (store, _user) = store_with_user("ada", "correct horse", true).await;
    let service = AuthService::new(store, "secret".to_owned());

    let (mut jwt, _) = service.login("ada", "correct horse").await.unwrap();
    jwt.push('x');

    let err = service.authenticate_session(&jwt).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn authenticate_session_with_a_different_secret_is_rejected() {
    let (store, _user) = store_with_user("ada", "correct horse", true).await;
    let issuing = AuthService::new(store.clone(), "secret".to_owned());
    let (jwt, _) = issuing.login("ada", "correct horse").await.unwrap();

    let verifying = AuthService::new(store, "other secret".to_owned());
    let err = verifying.authenticate_session(&jwt).await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}

#[tokio::test]
async fn create_panel_then_authenticate_panel_succeeds() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let service = AuthService::new(store, "secret".to_owned());

    let (panel, raw_token) = service
        .create_panel("Front Door".to_owned(), Slug::new("front-door").unwrap(), Vec::new())
        .await
        .unwrap();

    let ctx = service.authenticate_panel(&raw_token).await.unwrap();
    assert_eq!(ctx.actor, format!("panel:{}", panel.id));
}

#[tokio::test]
async fn authenticate_panel_with_an_unknown_token_is_rejected() {
    let store = CatalogueStore::open_in_memory().await.unwrap();
    let service = AuthService::new(store, "secret".to_owned());

    let err = service.authenticate_panel("not-a-real-token").await.unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
}