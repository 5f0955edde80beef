//! Admin continuity under concurrent requests
//!
//! Every group with members keeps at least one admin, however departures
//! interleave.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::common::TestApp;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_departures_leave_consistent_group() {
    let app = Arc::new(TestApp::new());

    for _ in 0..10 {
        let a = app.account("aragorn").await;
        let b = app.account("boromir").await;
        let c = app.account("celeborn").await;
        let group_id = app.create_group(&a, "Fellowship").await;
        app.add_member(&group_id, &a, &b).await;
        app.add_member(&group_id, &a, &c).await;

        let mut handles = Vec::new();
        for leaver in [a.clone(), b.clone()] {
            let app = app.clone();
            let uri = format!("/v1/groups/{}/members/{}", group_id, leaver.id);
            handles.push(tokio::spawn(async move { app.delete(&uri, &leaver).await.0 }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::NO_CONTENT);
        }

        let (_, members) = app
            .get(&format!("/v1/groups/{}/members", group_id), &c)
            .await;
        let members = members.as_array().unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0]["account_id"], c.id.to_string());
        assert_eq!(members[0]["role"], "admin");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_admin_and_user_leaving_together_empty_the_group() {
    let app = Arc::new(TestApp::new());

    for _ in 0..10 {
        let a = app.account("aragorn").await;
        let b = app.account("boromir").await;
        let group_id = app.create_group(&a, "Fellowship").await;
        app.add_member(&group_id, &a, &b).await;

        let mut handles = Vec::new();
        for leaver in [a.clone(), b.clone()] {
            let app = app.clone();
            let uri = format!("/v1/groups/{}/members/{}", group_id, leaver.id);
            handles.push(tokio::spawn(async move { app.delete(&uri, &leaver).await.0 }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), StatusCode::NO_CONTENT);
        }

        let (status, members) = app
            .get(&format!("/v1/groups/{}/members", group_id), &a)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(members.as_array().unwrap().is_empty());

        let (status, _) = app.get(&format!("/v1/groups/{}", group_id), &a).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_demotions_keep_an_admin() {
    let app = Arc::new(TestApp::new());

    for _ in 0..10 {
        let a = app.account("aragorn").await;
        let b = app.account("boromir").await;
        let group_id = app.create_group(&a, "Fellowship").await;
        app.add_member(&group_id, &a, &b).await;
        let (status, _) = app
            .patch(
                &format!("/v1/groups/{}/members/{}", group_id, b.id),
                &a,
                serde_json::json!({ "role": "admin" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        // Each admin demotes the other at the same time
        let mut handles = Vec::new();
        for (actor, target) in [(a.clone(), b.clone()), (b.clone(), a.clone())] {
            let app = app.clone();
            let uri = format!("/v1/groups/{}/members/{}", group_id, target.id);
            handles.push(tokio::spawn(async move {
                app.patch(&uri, &actor, serde_json::json!({ "role": "user" }))
                    .await
                    .0
            }));
        }
        let mut statuses = Vec::new();
        for handle in handles {
            statuses.push(handle.await.unwrap());
        }
        statuses.sort();
        // Whoever goes second is no longer an admin
        assert_eq!(statuses, vec![StatusCode::OK, StatusCode::FORBIDDEN]);

        let (_, members) = app
            .get(&format!("/v1/groups/{}/members", group_id), &a)
            .await;
        let admins = members
            .as_array()
            .unwrap()
            .iter()
            .filter(|m| m["role"] == "admin")
            .count();
        assert_eq!(admins, 1);
    }
}
