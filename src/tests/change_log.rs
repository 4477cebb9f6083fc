use crate::contacts::Contact;
use crate::notes::Action;
use crate::notes::Note;
use crate::tests::helper;
use crate::tests::helper::TestRequest;

#[tokio::test]
async fn test_contact_save_is_noted() {
    let mut app = helper::setup_test_app().await;

    let cookie = helper::login(&mut app).await;

    let request = TestRequest::post("/form/")
        .cookie(&cookie)
        .ajax()
        .multipart(&helper::contact_fields(), None);
    helper::send(&mut app, request).await;

    let notes = app.database.find_all::<Note>().await.unwrap();
    let contact_notes = notes
        .iter()
        .filter(|note| note.model == "Contact")
        .collect::<Vec<_>>();

    assert_eq!(1, contact_notes.len());
    assert_eq!(Action::Changed, contact_notes[0].action_type);
    assert_eq!("Ivanov Ivan", contact_notes[0].instance);
}

#[tokio::test]
async fn test_logged_requests_are_noted() {
    let mut app = helper::setup_test_app().await;

    helper::send(&mut app, TestRequest::get("/")).await;

    let notes = app.database.find_all::<Note>().await.unwrap();

    // newest first
    assert_eq!("Request entry", notes[0].model);
    assert_eq!(Action::Created, notes[0].action_type);
    assert_eq!("/ - GET", notes[0].instance);
}

#[tokio::test]
async fn test_contact_delete_is_noted() {
    let app = helper::setup_test_app().await;

    let contact = app.database.find_first_contact().await.unwrap().unwrap();
    app.database.delete(&contact).await.unwrap();

    let notes = app.database.find_all::<Note>().await.unwrap();
    assert_eq!("Contact", notes[0].model);
    assert_eq!(Action::Deleted, notes[0].action_type);
    assert_eq!(0, app.database.count::<Contact>().await.unwrap());

    // removing notes leaves no trace in the log
    let before = app.database.count::<Note>().await.unwrap();
    app.database.delete(&notes[0]).await.unwrap();
    assert_eq!(before - 1, app.database.count::<Note>().await.unwrap());
}
