//! Sign-in, sign-out and the guard in front of mutating routes

mod common;

use crate::common::{TestApp, PASSWORD, USERNAME};
use http::StatusCode;

const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

#[tokio::test]
async fn test_sign_in_success() {
    let mut app = TestApp::new().await;

    let response = app
        .post_form("/users/signin", &format!("username={}&password={}", USERNAME, PASSWORD))
        .await;
    response.assert_redirect_home();

    let home = app.get("/").await;
    assert_eq!(home.status, StatusCode::OK);
    assert!(home.body.contains("Welcome!"));
    assert!(home.body.contains("Signed in as admin."));
    assert!(home.body.contains("href=\"/new\""));
}

#[tokio::test]
async fn test_sign_in_issues_new_session_id() {
    let mut app = TestApp::new().await;

    // rejected visit leaves an anonymous session carrying the flash
    app.get("/new").await.assert_redirect_home();
    let anonymous = app.cookie().map(str::to_string);
    assert!(anonymous.is_some());

    app.sign_in().await;
    let signed_in = app.cookie().map(str::to_string);
    assert!(signed_in.is_some());
    assert_ne!(anonymous, signed_in);
}

#[tokio::test]
async fn test_sign_in_wrong_password() {
    let mut app = TestApp::new().await;

    let response = app
        .post_form("/users/signin", "username=admin&password=hunter2")
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Invalid credentials"));
    assert!(response.body.contains("value=\"admin\""));

    // still anonymous
    let home = app.get("/").await;
    assert!(home.body.contains("You are not signed in."));
    assert!(!home.body.contains("Invalid credentials"));
}

#[tokio::test]
async fn test_sign_in_unknown_user() {
    let mut app = TestApp::new().await;

    let response = app
        .post_form("/users/signin", "username=mallory&password=secret")
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Invalid credentials"));
    assert!(response.body.contains("value=\"mallory\""));
}

#[tokio::test]
async fn test_sign_in_missing_fields() {
    let mut app = TestApp::new().await;

    let response = app.post_form("/users/signin", "").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.body.contains("Invalid credentials"));
}

#[tokio::test]
async fn test_sign_in_form() {
    let mut app = TestApp::new().await;

    let response = app.get("/users/signin").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("name=\"username\""));
    assert!(response.body.contains("name=\"password\""));
}

#[tokio::test]
async fn test_sign_out() {
    let mut app = TestApp::signed_in().await;

    let response = app.post_form("/users/signout", "").await;
    response.assert_redirect_home();

    let home = app.get("/").await;
    assert!(home.body.contains("You have been signed out."));
    assert!(home.body.contains("You are not signed in."));

    let response = app.get("/new").await;
    response.assert_redirect_home();
}

#[tokio::test]
async fn test_credentials_file_is_reread() {
    let mut app = TestApp::new().await;

    // the running app has never seen this account
    let users_path = app.store.root().parent().unwrap().join("users.txt");
    let line = ::common::credentials::credential_line(
        "editor",
        &::common::credentials::hash_password("pa55").unwrap(),
    );
    let mut contents = std::fs::read_to_string(&users_path).unwrap();
    contents.push_str(&line);
    contents.push('\n');
    std::fs::write(&users_path, contents).unwrap();

    let response = app
        .post_form("/users/signin", "username=editor&password=pa55")
        .await;
    response.assert_redirect_home();
}

#[tokio::test]
async fn test_protected_routes_require_sign_in() {
    let requests: [(&str, &str, Option<&str>); 5] = [
        ("GET", "/new", None),
        ("POST", "/new", Some("new_filename=sneaky.md")),
        ("GET", "/about.md/edit", None),
        ("POST", "/about.md", Some("file_content=defaced")),
        ("POST", "/about.md/delete", Some("")),
    ];

    for (method, uri, form) in requests {
        let mut app = TestApp::new().await;
        app.seed("about.md", "# About").await;

        let response = match form {
            Some(form) => app.post_form(uri, form).await,
            None => app.get(uri).await,
        };
        assert_eq!(response.status, StatusCode::FOUND, "{} {}", method, uri);
        assert_eq!(response.location(), Some("/"), "{} {}", method, uri);

        let home = app.get("/").await;
        assert!(
            home.body.contains(SIGN_IN_REQUIRED),
            "{} {} did not flash",
            method,
            uri
        );

        // nothing changed on disk
        assert_eq!(app.store.list().await.unwrap(), vec!["about.md".to_string()]);
        let about = app.store.read("about.md").await.unwrap();
        assert_eq!(about.text(), "# About");
    }
}

#[tokio::test]
async fn test_viewing_does_not_require_sign_in() {
    let mut app = TestApp::new().await;
    app.seed("about.md", "# About").await;

    let response = app.get("/about.md").await;
    assert_eq!(response.status, StatusCode::OK);
}
