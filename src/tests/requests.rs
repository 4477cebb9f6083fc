use axum::http::StatusCode;
use serde_json::Value;

use crate::requests::RequestEntry;
use crate::tests::helper;
use crate::tests::helper::TestApp;
use crate::tests::helper::TestRequest;

async fn feed(app: &mut TestApp, uri: &str) -> (i64, Vec<Value>) {
    let response = helper::send(app, TestRequest::get(uri).ajax()).await;
    assert_eq!(StatusCode::OK, response.status_code);

    let json = response.json();

    (
        json[0].as_i64().unwrap(),
        json[1].as_array().unwrap().clone(),
    )
}

async fn update_priority(app: &mut TestApp, path: &str, priority: &str) -> Value {
    let request = TestRequest::post("/requests_ajax/")
        .ajax()
        .form(&[("path", path), ("priority", priority)]);

    let response = helper::send(app, request).await;
    assert_eq!(StatusCode::OK, response.status_code);

    response.json()
}

#[tokio::test]
async fn test_requests_are_logged() {
    let mut app = helper::setup_test_app().await;

    helper::send(&mut app, TestRequest::get("/")).await;
    helper::send(&mut app, TestRequest::get("/login/")).await;

    let entries = app.database.find_all::<RequestEntry>().await.unwrap();
    assert_eq!(2, entries.len());

    // newest first
    assert_eq!("/login/", entries[0].path);
    assert_eq!("GET", entries[0].method);
    assert_eq!("/", entries[1].path);
    assert!(entries.iter().all(|entry| entry.is_new));
    assert!(entries.iter().all(|entry| entry.priority == 0));
    assert!(entries.iter().all(|entry| entry.user_id.is_none()));
}

#[tokio::test]
async fn test_logged_in_user_is_attached() {
    let mut app = helper::setup_test_app().await;

    let cookie = helper::login(&mut app).await;
    helper::send(&mut app, TestRequest::get("/").cookie(&cookie)).await;

    let user = app
        .database
        .find_single_user_by_username(helper::USERNAME)
        .await
        .unwrap()
        .unwrap();

    let entry = app
        .database
        .find_latest_request_entry_by_path("/")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(Some(user.id), entry.user_id);
}

#[tokio::test]
async fn test_feed_is_not_logged() {
    let mut app = helper::setup_test_app().await;

    let (count, entries) = feed(&mut app, "/requests_ajax/").await;
    assert_eq!(0, count);
    assert!(entries.is_empty());

    update_priority(&mut app, "/", "3").await;

    assert_eq!(0, app.database.count::<RequestEntry>().await.unwrap());
}

#[tokio::test]
async fn test_feed_ajax_only() {
    let mut app = helper::setup_test_app().await;

    let response = helper::send(&mut app, TestRequest::get("/requests_ajax/")).await;
    assert_eq!(StatusCode::BAD_REQUEST, response.status_code);
    assert_eq!("AJAX requests only", response.json()["error"]);

    let request = TestRequest::post("/requests_ajax/").form(&[("path", "/"), ("priority", "1")]);
    let response = helper::send(&mut app, request).await;
    assert_eq!(StatusCode::BAD_REQUEST, response.status_code);
}

#[tokio::test]
async fn test_priority_is_inherited() {
    let mut app = helper::setup_test_app().await;

    helper::send(&mut app, TestRequest::get("/")).await;
    helper::send(&mut app, TestRequest::get("/login/")).await;

    let acknowledgement = update_priority(&mut app, "/", "1").await;
    assert_eq!("ok", acknowledgement["status"]);
    assert_eq!(1, acknowledgement["updated"]);

    helper::send(&mut app, TestRequest::get("/")).await;
    helper::send(&mut app, TestRequest::get("/login/")).await;

    let latest = app
        .database
        .find_latest_request_entry_by_path("/")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(1, latest.priority);

    let latest = app
        .database
        .find_latest_request_entry_by_path("/login/")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(0, latest.priority);

    // higher priority sorts first, even when older
    let (count, entries) = feed(&mut app, "/requests_ajax/").await;
    assert_eq!(4, count);
    assert_eq!(4, entries.len());
    assert_eq!("card.requestentry", entries[0]["model"]);
    assert_eq!("/", entries[0]["fields"]["path"]);
    assert_eq!(1, entries[0]["fields"]["priority"]);
    assert_eq!("/", entries[1]["fields"]["path"]);
    assert_eq!("/login/", entries[2]["fields"]["path"]);
    assert_eq!(1, entries[2]["fields"]["new_request"]);
}

#[tokio::test]
async fn test_negative_priority_is_ignored() {
    let mut app = helper::setup_test_app().await;

    helper::send(&mut app, TestRequest::get("/")).await;

    let acknowledgement = update_priority(&mut app, "/", "-1").await;
    assert_eq!("ok", acknowledgement["status"]);
    assert_eq!(0, acknowledgement["updated"]);

    let latest = app
        .database
        .find_latest_request_entry_by_path("/")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(0, latest.priority);
}

#[tokio::test]
async fn test_feed_is_limited() {
    let mut app = helper::setup_test_app().await;

    for _ in 0..12 {
        helper::send(&mut app, TestRequest::get("/")).await;
    }

    let (count, entries) = feed(&mut app, "/requests_ajax/").await;
    assert_eq!(12, count);
    assert_eq!(10, entries.len());
}

#[tokio::test]
async fn test_requests_page_marks_seen() {
    let mut app = helper::setup_test_app().await;

    helper::send(&mut app, TestRequest::get("/")).await;
    helper::send(&mut app, TestRequest::get("/")).await;

    let response = helper::send(&mut app, TestRequest::get("/requests/")).await;
    assert_eq!(StatusCode::OK, response.status_code);
    assert!(response.body.contains("/static/js/requests.js"));

    // the requests page itself is logged, and seen right away
    let (count, entries) = feed(&mut app, "/requests_ajax/").await;
    assert_eq!(0, count);
    assert_eq!(3, entries.len());
    assert!(entries.iter().all(|entry| entry["fields"]["new_request"] == 0));
}

#[tokio::test]
async fn test_feed_viewed_marks_seen() {
    let mut app = helper::setup_test_app().await;

    helper::send(&mut app, TestRequest::get("/")).await;

    // counted before being marked as seen
    let (count, _) = feed(&mut app, "/requests_ajax/?viewed=yes").await;
    assert_eq!(1, count);

    let (count, _) = feed(&mut app, "/requests_ajax/?viewed=").await;
    assert_eq!(0, count);

    helper::send(&mut app, TestRequest::get("/")).await;

    let (count, _) = feed(&mut app, "/requests_ajax/").await;
    assert_eq!(1, count);
}
