//! Group endpoint integration tests
//!
//! - POST /v1/groups
//! - GET /v1/groups
//! - GET /v1/groups/{group_id}
//! - PATCH /v1/groups/{group_id}
//! - DELETE /v1/groups/{group_id}

use axum::http::StatusCode;
use serde_json::json;

use crate::common::{assertions::assert_error, TestApp};

#[tokio::test]
async fn test_create_group_makes_caller_admin() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;

    let (status, body) = app
        .post(
            "/v1/groups",
            &gandalf,
            json!({ "name": "Fellowship", "description": "Nine walkers" }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Fellowship");
    assert_eq!(body["description"], "Nine walkers");

    let group_id = body["id"].as_str().unwrap();
    let (status, members) = app
        .get(&format!("/v1/groups/{}/members", group_id), &gandalf)
        .await;
    assert_eq!(status, StatusCode::OK);
    let members = members.as_array().unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0]["account_id"], gandalf.id.to_string());
    assert_eq!(members[0]["role"], "admin");
}

#[tokio::test]
async fn test_create_group_validates_input() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;

    let (status, body) = app.post("/v1/groups", &gandalf, json!({ "name": "" })).await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT");

    let long_name = "x".repeat(101);
    let (status, body) = app
        .post("/v1/groups", &gandalf, json!({ "name": long_name }))
        .await;
    assert_error(status, &body, StatusCode::BAD_REQUEST, "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_get_and_list_groups() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;
    let stranger = app.account("stranger").await;
    let first = app.create_group(&gandalf, "First").await;
    let second = app.create_group(&gandalf, "Second").await;

    // Reads are open to any authenticated account
    let (status, body) = app.get(&format!("/v1/groups/{}", first), &stranger).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "First");

    let (status, body) = app.get("/v1/groups", &stranger).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);

    let (status, body) = app.get("/v1/groups?offset=1&limit=1", &stranger).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], second);
}

#[tokio::test]
async fn test_get_unknown_group_is_not_found() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;

    let (status, body) = app
        .get(&format!("/v1/groups/{}", uuid::Uuid::new_v4()), &gandalf)
        .await;
    assert_error(status, &body, StatusCode::NOT_FOUND, "NOT_FOUND");
}

#[tokio::test]
async fn test_update_group_requires_admin() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;
    let pippin = app.account("pippin").await;
    let group_id = app.create_group(&gandalf, "Fellowship").await;
    app.add_member(&group_id, &gandalf, &pippin).await;

    let uri = format!("/v1/groups/{}", group_id);
    let (status, body) = app
        .patch(&uri, &pippin, json!({ "name": "Took's Company" }))
        .await;
    assert_error(status, &body, StatusCode::FORBIDDEN, "PERMISSION_DENIED");

    let (status, body) = app
        .patch(&uri, &gandalf, json!({ "description": "To Mordor" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Fellowship");
    assert_eq!(body["description"], "To Mordor");
}

#[tokio::test]
async fn test_delete_group_cascades() {
    let app = TestApp::new();
    let gandalf = app.account("gandalf").await;
    let pippin = app.account("pippin").await;
    let merry = app.account("merry").await;
    let group_id = app.create_group(&gandalf, "Fellowship").await;
    app.add_member(&group_id, &gandalf, &pippin).await;

    let (status, invite) = app
        .post(
            "/v1/invites",
            &pippin,
            json!({ "group_id": group_id, "recipient_account_id": merry.id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let uri = format!("/v1/groups/{}", group_id);
    let (status, body) = app.delete(&uri, &pippin).await;
    assert_error(status, &body, StatusCode::FORBIDDEN, "PERMISSION_DENIED");

    let (status, _) = app.delete(&uri, &gandalf).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.get(&uri, &gandalf).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app
        .get(&format!("/v1/invites/{}", invite["id"].as_str().unwrap()), &merry)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
