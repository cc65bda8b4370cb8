//! One-shot flash messages

mod common;

use crate::common::TestApp;
use http::StatusCode;

#[tokio::test]
async fn test_flash_shows_exactly_once() {
    let mut app = TestApp::new().await;

    app.get("/missing.md").await.assert_redirect_home();

    let first = app.get("/").await;
    assert!(first.body.contains("missing.md does not exist."));

    let second = app.get("/").await;
    assert!(!second.body.contains("does not exist."));
}

#[tokio::test]
async fn test_flash_survives_unrendered_views() {
    let mut app = TestApp::signed_in().await;
    app.seed("raw.txt", "plain").await;

    app.post_form("/new", "new_filename=fresh.md")
        .await
        .assert_redirect_home();

    // plaintext is served without the layout
    let view = app.get("/raw.txt").await;
    assert_eq!(view.status, StatusCode::OK);
    assert!(!view.body.contains("has been created."));

    let home = app.get("/").await;
    assert!(home.body.contains("fresh.md has been created."));
}

#[tokio::test]
async fn test_flash_rendered_on_markdown_page() {
    let mut app = TestApp::signed_in().await;
    app.seed("guide.md", "## Guide").await;

    app.post_form("/guide.md", "file_content=%23%23+Guide+v2")
        .await
        .assert_redirect_home();

    let view = app.get("/guide.md").await;
    assert!(view.body.contains("guide.md has been updated."));
    assert!(view.body.contains("<h2>Guide v2</h2>"));

    let home = app.get("/").await;
    assert!(!home.body.contains("has been updated."));
}

#[tokio::test]
async fn test_flashes_are_per_client() {
    let mut app = TestApp::new().await;
    app.get("/missing.md").await.assert_redirect_home();

    // a different browser hitting the same server
    app.forget_cookie();
    let home = app.get("/").await;
    assert!(!home.body.contains("does not exist."));
}
