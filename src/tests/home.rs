use axum::http::StatusCode;

use crate::contacts::Contact;
use crate::tests::helper;
use crate::tests::helper::TestRequest;

#[tokio::test]
async fn test_home_page() {
    let mut app = helper::setup_test_app().await;

    let response = helper::send(&mut app, TestRequest::get("/")).await;

    assert_eq!(StatusCode::OK, response.status_code);
    assert!(response.body.contains("Jane"));
    assert!(response.body.contains("Feb. 25, 1990"));
    assert!(response.body.contains("jane.doe@example.com"));

    // anonymous visitors get no edit links
    assert!(!response.body.contains("/form/"));
    assert!(!response.body.contains("/admin/card/contact/"));
}

#[tokio::test]
async fn test_home_page_edit_link() {
    let mut app = helper::setup_test_app().await;

    let cookie = helper::login(&mut app).await;

    let contact = app.database.find_first_contact().await.unwrap().unwrap();

    let response = helper::send(&mut app, TestRequest::get("/").cookie(&cookie)).await;

    assert_eq!(StatusCode::OK, response.status_code);
    assert!(response.body.contains(r#"href="/form/""#));
    assert!(
        response
            .body
            .contains(&format!(r#"href="/admin/card/contact/{}/""#, contact.id))
    );
}

#[tokio::test]
async fn test_home_page_without_contact() {
    let mut app = helper::setup_test_app().await;

    let contacts = app.database.find_all::<Contact>().await.unwrap();
    for contact in &contacts {
        app.database.delete(contact).await.unwrap();
    }

    let response = helper::send(&mut app, TestRequest::get("/")).await;

    assert_eq!(StatusCode::OK, response.status_code);
    assert!(response.body.contains("Contact data no yet"));
    assert!(!response.body.contains("<dl>"));
    assert!(!response.body.contains("jane.doe@example.com"));
}
