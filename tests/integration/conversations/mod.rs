//! Conversation endpoint integration tests

use axum::http::StatusCode;
use uuid::Uuid;

use crate::common::{parse_body, tick, TestApp};

#[tokio::test]
async fn test_list_conversations_empty_for_new_user() {
    let app = TestApp::new();
    let user = Uuid::new_v4();

    let resp = app
        .get(&format!("/v1/users/{}/conversations", user))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = parse_body(resp).await;
    assert_eq!(body["total"], 0);
    assert_eq!(body["page"], 1);
    assert_eq!(body["limit"], 20);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_first_message_creates_conversation_for_both_users() {
    let app = TestApp::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let message = app.send_message(a, b, "hi").await;
    let conversation_id = message["conversation_id"].as_str().unwrap().to_string();

    let a_body = parse_body(app.get(&format!("/v1/users/{}/conversations", a)).await).await;
    let b_body = parse_body(app.get(&format!("/v1/users/{}/conversations", b)).await).await;

    assert_eq!(a_body["total"], 1);
    assert_eq!(b_body["total"], 1);
    assert_eq!(a_body["items"][0]["id"], conversation_id.as_str());
    assert_eq!(b_body["items"][0]["id"], conversation_id.as_str());
    assert_eq!(a_body["items"][0]["last_message_content"], "hi");
    assert_eq!(b_body["items"][0]["last_message_content"], "hi");
    assert_eq!(a_body["items"][0]["participant_b"], b.to_string());
    assert_eq!(b_body["items"][0]["participant_b"], a.to_string());
}

#[tokio::test]
async fn test_conversations_never_include_non_participant() {
    let app = TestApp::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let outsider = Uuid::new_v4();

    app.send_message(a, b, "between a and b").await;

    let body = parse_body(
        app.get(&format!("/v1/users/{}/conversations", outsider))
            .await,
    )
    .await;
    assert_eq!(body["total"], 0);
    assert!(body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_conversations_ordered_by_recency() {
    let app = TestApp::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let c = Uuid::new_v4();

    let first = app.send_message(a, b, "older thread").await;
    tick().await;
    let second = app.send_message(a, c, "newer thread").await;

    let body = parse_body(app.get(&format!("/v1/users/{}/conversations", a)).await).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["items"][0]["id"], second["conversation_id"]);
    assert_eq!(body["items"][1]["id"], first["conversation_id"]);

    // A reply in the older thread moves it back to the front
    tick().await;
    app.send_message(b, a, "reply").await;
    let body = parse_body(app.get(&format!("/v1/users/{}/conversations", a)).await).await;
    assert_eq!(body["items"][0]["id"], first["conversation_id"]);
    assert_eq!(body["items"][0]["last_message_content"], "reply");
}

#[tokio::test]
async fn test_conversation_list_pagination() {
    let app = TestApp::new();
    let a = Uuid::new_v4();

    for i in 0..3 {
        app.send_message(a, Uuid::new_v4(), &format!("thread {}", i))
            .await;
        tick().await;
    }

    let body = parse_body(
        app.get(&format!("/v1/users/{}/conversations?page=1&limit=2", a))
            .await,
    )
    .await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["limit"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);

    let body = parse_body(
        app.get(&format!("/v1/users/{}/conversations?page=2&limit=2", a))
            .await,
    )
    .await;
    assert_eq!(body["total"], 3);
    assert_eq!(body["page"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_get_conversation_by_id() {
    let app = TestApp::new();
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();

    let message = app.send_message(a, b, "hello").await;
    let conversation_id = message["conversation_id"].as_str().unwrap().to_string();

    let resp = app.get(&format!("/v1/conversations/{}", conversation_id)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = parse_body(resp).await;
    assert_eq!(body["id"], conversation_id.as_str());
    assert_eq!(body["last_message_content"], "hello");

    let participants = [
        body["participant_a"].as_str().unwrap().to_string(),
        body["participant_b"].as_str().unwrap().to_string(),
    ];
    assert!(participants.contains(&a.to_string()));
    assert!(participants.contains(&b.to_string()));
}

#[tokio::test]
async fn test_get_conversation_unknown_id_returns_404() {
    let app = TestApp::new();

    let resp = app
        .get(&format!("/v1/conversations/{}", Uuid::new_v4()))
        .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = parse_body(resp).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
