//! Authentication integration tests
//!
//! Every route requires a valid bearer token; all failures look the same.

use axum::http::{Method, StatusCode};

use crate::common::{assertions::assert_error, claims_for, sign_claims, TestApp};

async fn list_groups_with(app: &TestApp, token: Option<&str>) -> StatusCode {
    let (status, body) = app.call(Method::GET, "/v1/groups", token, None).await;
    if status != StatusCode::OK {
        assert_error(status, &body, StatusCode::UNAUTHORIZED, "UNAUTHENTICATED");
    }
    status
}

#[tokio::test]
async fn test_valid_token_is_accepted() {
    let app = TestApp::new();
    let frodo = app.account("frodo").await;

    assert_eq!(list_groups_with(&app, Some(&frodo.token)).await, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_token_is_unauthenticated() {
    let app = TestApp::new();
    assert_eq!(list_groups_with(&app, None).await, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_token_is_unauthenticated() {
    let app = TestApp::new();
    assert_eq!(
        list_groups_with(&app, Some("not-a-jwt")).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_tampered_token_is_unauthenticated() {
    let app = TestApp::new();
    let frodo = app.account("frodo").await;

    // Change one character inside the signature segment
    let index = frodo.token.rfind('.').unwrap() + 5;
    let mut bytes = frodo.token.clone().into_bytes();
    bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
    let token = String::from_utf8(bytes).unwrap();

    assert_eq!(
        list_groups_with(&app, Some(&token)).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_expired_token_is_unauthenticated() {
    let app = TestApp::new();
    let frodo = app.account("frodo").await;

    let expired = sign_claims(&claims_for(frodo.id, 25 * 3600, 24 * 3600), "ed25519_private.pem");
    assert_eq!(
        list_groups_with(&app, Some(&expired)).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_foreign_key_token_is_unauthenticated() {
    let app = TestApp::new();
    let frodo = app.account("frodo").await;

    let forged = sign_claims(&claims_for(frodo.id, 0, 3600), "ed25519_other_private.pem");
    assert_eq!(
        list_groups_with(&app, Some(&forged)).await,
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn test_externally_signed_valid_token_is_accepted() {
    let app = TestApp::new();
    let frodo = app.account("frodo").await;

    let token = sign_claims(&claims_for(frodo.id, 60, 3600), "ed25519_private.pem");
    assert_eq!(list_groups_with(&app, Some(&token)).await, StatusCode::OK);
}
