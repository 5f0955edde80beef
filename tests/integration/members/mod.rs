//! Group membership endpoint integration tests
//!
//! - POST /v1/groups/{group_id}/members
//! - GET /v1/groups/{group_id}/members
//! - GET /v1/groups/{group_id}/members/{account_id}
//! - PATCH /v1/groups/{group_id}/members/{account_id}
//! - DELETE /v1/groups/{group_id}/members/{account_id}

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{assertions::assert_error, TestApp};

fn member_uri(group_id: &str, account: &fellowship_auth::AccountId) -> String {
    format!("/v1/groups/{}/members/{}", group_id, account)
}

#[tokio::test]
async fn test_member_can_add_member() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;
    let pippin = app.account("pippin").await;
    let merry = app.account("merry").await;
    let group_id = app.create_group(&gandalf, "Fellowship").await;
    app.add_member(&group_id, &gandalf, &pippin).await;

    // A plain member may add others
    let (status, body) = app
        .post(
            &format!("/v1/groups/{}/members", group_id),
            &pippin,
            json!({ "account_id": merry.id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "user");
    assert_eq!(body["account_id"], merry.id.to_string());
}

#[tokio::test]
async fn test_add_member_failures() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;
    let pippin = app.account("pippin").await;
    let gollum = app.account("gollum").await;
    let group_id = app.create_group(&gandalf, "Fellowship").await;
    let uri = format!("/v1/groups/{}/members", group_id);

    let (status, body) = app
        .post(&uri, &gollum, json!({ "account_id": pippin.id }))
        .await;
    assert_error(status, &body, StatusCode::FORBIDDEN, "PERMISSION_DENIED");

    let (status, body) = app
        .post(&uri, &gandalf, json!({ "account_id": gandalf.id }))
        .await;
    assert_error(status, &body, StatusCode::CONFLICT, "ALREADY_EXISTS");

    let (status, body) = app
        .post(&uri, &gandalf, json!({ "account_id": uuid::Uuid::new_v4() }))
        .await;
    assert_error(status, &body, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_last_admin_leaving_promotes_earliest_member() {
    let app = TestApp::new();
    let a = app.account("aragorn").await;
    let b = app.account("boromir").await;
    let c = app.account("celeborn").await;
    let group_id = app.create_group(&a, "Fellowship").await;
    tokio::time::sleep(Duration::from_millis(2)).await;
    app.add_member(&group_id, &a, &b).await;
    tokio::time::sleep(Duration::from_millis(2)).await;
    app.add_member(&group_id, &a, &c).await;

    let (status, _) = app.delete(&member_uri(&group_id, &a.id), &a).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, members) = app
        .get(&format!("/v1/groups/{}/members", group_id), &b)
        .await;
    assert_eq!(members.as_array().unwrap().len(), 2);
    assert_eq!(app.role_of(&group_id, &b, &b).await.as_deref(), Some("admin"));
    assert_eq!(app.role_of(&group_id, &c, &b).await.as_deref(), Some("user"));
}

#[tokio::test]
async fn test_non_admin_cannot_remove_others() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;
    let pippin = app.account("pippin").await;
    let merry = app.account("merry").await;
    let group_id = app.create_group(&gandalf, "Fellowship").await;
    app.add_member(&group_id, &gandalf, &pippin).await;
    app.add_member(&group_id, &gandalf, &merry).await;

    let (status, body) = app.delete(&member_uri(&group_id, &merry.id), &pippin).await;
    assert_error(status, &body, StatusCode::FORBIDDEN, "PERMISSION_DENIED");
    assert_eq!(app.role_of(&group_id, &merry, &merry).await.as_deref(), Some("user"));

    // Leaving is always allowed
    let (status, _) = app.delete(&member_uri(&group_id, &pippin.id), &pippin).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Admins may remove anyone
    let (status, _) = app.delete(&member_uri(&group_id, &merry.id), &gandalf).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, members) = app
        .get(&format!("/v1/groups/{}/members", group_id), &gandalf)
        .await;
    assert_eq!(members.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_remove_non_member_is_not_found() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;
    let gollum = app.account("gollum").await;
    let group_id = app.create_group(&gandalf, "Fellowship").await;

    let (status, body) = app.delete(&member_uri(&group_id, &gollum.id), &gollum).await;
    assert_error(status, &body, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_role_updates() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;
    let pippin = app.account("pippin").await;
    let group_id = app.create_group(&gandalf, "Fellowship").await;
    app.add_member(&group_id, &gandalf, &pippin).await;

    // Non-admins cannot change roles
    let (status, body) = app
        .patch(&member_uri(&group_id, &pippin.id), &pippin, json!({ "role": "admin" }))
        .await;
    assert_error(status, &body, StatusCode::FORBIDDEN, "PERMISSION_DENIED");

    // The last admin cannot be demoted
    let (status, body) = app
        .patch(&member_uri(&group_id, &gandalf.id), &gandalf, json!({ "role": "user" }))
        .await;
    assert_error(
        status,
        &body,
        StatusCode::PRECONDITION_FAILED,
        "FAILED_PRECONDITION",
    );

    let (status, body) = app
        .patch(&member_uri(&group_id, &pippin.id), &gandalf, json!({ "role": "admin" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "admin");

    // With a second admin, demotion is allowed
    let (status, body) = app
        .patch(&member_uri(&group_id, &gandalf.id), &pippin, json!({ "role": "user" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "user");
}

#[tokio::test]
async fn test_member_listing_is_paged() {
    let app = TestApp::new();
    let owner = app.account("owner").await;
    let group_id = app.create_group(&owner, "Large").await;
    for i in 0..24 {
        let account = app.account(&format!("walker{}", i)).await;
        app.add_member(&group_id, &owner, &account).await;
    }

    let uri = format!("/v1/groups/{}/members", group_id);
    let (_, page) = app.get(&uri, &owner).await;
    assert_eq!(page.as_array().unwrap().len(), 10);

    let (_, page) = app.get(&format!("{}?limit=100", uri), &owner).await;
    assert_eq!(page.as_array().unwrap().len(), 20);

    let (_, page) = app.get(&format!("{}?offset=20&limit=20", uri), &owner).await;
    assert_eq!(page.as_array().unwrap().len(), 5);

    let (_, first) = app.get(&format!("{}?limit=1", uri), &owner).await;
    assert_eq!(first[0]["account_id"], owner.id.to_string());
}

#[tokio::test]
async fn test_members_of_unknown_group_is_not_found() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;

    let (status, body) = app
        .get(&format!("/v1/groups/{}/members", uuid::Uuid::new_v4()), &gandalf)
        .await;
    assert_error(status, &body, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_storage_deadline_surfaces_as_gateway_timeout() {
    let app = TestApp::with_timeout(Duration::from_millis(20));
    let gandalf = app.account("gandalf").await;

    // An open unit of work holds the in-memory store
    let _held = {
        use fellowship_groups::Store;
        app.store.begin().await.unwrap()
    };

    let (status, body) = app
        .post("/v1/groups", &gandalf, json!({ "name": "Late" }))
        .await;
    assert_error(
        status,
        &body,
        StatusCode::GATEWAY_TIMEOUT,
        "DEADLINE_EXCEEDED",
    );
}

#[tokio::test]
async fn test_malformed_member_bodies_are_invalid_argument() {
    let app = TestApp::new();
    let admin = app.account("aragorn").await;
    let user = app.account("boromir").await;
    let group_id = app.create_group(&admin, "Fellowship").await;
    app.add_member(&group_id, &admin, &user).await;

    let (status, body) = app
        .post(
            &format!("/v1/groups/{}/members", group_id),
            &admin,
            json!({ "account_id": "not-a-uuid" }),
        )
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT");

    let (status, body) = app
        .patch(
            &format!("/v1/groups/{}/members/{}", group_id, user.id),
            &admin,
            json!({ "role": "overlord" }),
        )
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT");
    assert_eq!(
        app.role_of(&group_id, &user, &admin).await.as_deref(),
        Some("user")
    );
}
