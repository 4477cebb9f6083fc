use axum::http::StatusCode;

use crate::tests::helper;
use crate::tests::helper::TestRequest;

#[tokio::test]
async fn test_login() {
    let mut app = helper::setup_test_app().await;

    let cookie = helper::login(&mut app).await;
    assert!(cookie.starts_with("session="));
    assert!(cookie.len() > 20);

    let response = helper::send(&mut app, TestRequest::get("/form/").cookie(&cookie)).await;
    assert_eq!(StatusCode::OK, response.status_code);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let mut app = helper::setup_test_app().await;

    let response = helper::login_with_password(&mut app, "wrong").await;

    assert_eq!(StatusCode::OK, response.status_code);
    assert!(response.set_cookie.is_none());
    assert!(
        response
            .body
            .contains("Please enter a correct username and password.")
    );
}

#[tokio::test]
async fn test_login_follows_local_next_only() {
    let mut app = helper::setup_test_app().await;

    let request = TestRequest::post("/login/").form(&[
        ("username", helper::USERNAME),
        ("password", helper::PASSWORD),
        ("next", "/form/"),
    ]);
    let response = helper::send(&mut app, request).await;
    assert_eq!(Some("/form/".to_string()), response.location);

    let request = TestRequest::post("/login/").form(&[
        ("username", helper::USERNAME),
        ("password", helper::PASSWORD),
        ("next", "https://www.example.com/"),
    ]);
    let response = helper::send(&mut app, request).await;
    assert_eq!(Some("/".to_string()), response.location);
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let mut app = helper::setup_test_app().await;

    let cookie = helper::login(&mut app).await;

    let response = helper::send(&mut app, TestRequest::get("/logout/").cookie(&cookie)).await;
    assert_eq!(StatusCode::SEE_OTHER, response.status_code);
    assert!(response.set_cookie.unwrap().contains("Max-Age=0"));

    // the old cookie is no longer accepted
    let response = helper::send(&mut app, TestRequest::get("/form/").cookie(&cookie)).await;
    assert_eq!(StatusCode::SEE_OTHER, response.status_code);
    assert_eq!(
        Some("/login/?next=%2Fform%2F".to_string()),
        response.location
    );
}
