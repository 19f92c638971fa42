mod common;

use axum::http::StatusCode;

use common::TestApp;
use course_api::detail::{self, UserType};
use course_types::models::Role;

#[tokio::test]
async fn guest_is_never_enrolled() {
    let app = TestApp::new().await;
    let id = app.seed_course("Intro to Go", "desc", app.category, false);
    app.state.db.create_lesson(id, "Second", 2).unwrap();
    app.state.db.create_lesson(id, "First", 1).unwrap();

    let (status, body) = app.get(&format!("/courses/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_enrolled"], false);
    assert_eq!(body["user_type"], "guest");
    assert_eq!(body["data"]["teacher"]["name"], "Grace Hopper");
    assert_eq!(body["data"]["category"]["name"], "Programming");
    assert_eq!(body["data"]["lessons"][0]["title"], "First");
    assert_eq!(body["data"]["lessons"][1]["title"], "Second");
}

#[tokio::test]
async fn enrolled_viewer() {
    let app = TestApp::new().await;
    let id = app.seed_course("Intro to Go", "desc", app.category, true);
    app.state.db.set_enrollment(&app.student.to_string(), id, true).unwrap();
    let token = app.token(app.student, Role::Student);

    let (status, body) = app.get(&format!("/courses/{id}"), Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_enrolled"], true);
    assert_eq!(body["user_type"], "authenticated");
    assert_eq!(body["data"]["lessons"], serde_json::json!([]));
}

#[tokio::test]
async fn inactive_enrollment_does_not_count() {
    let app = TestApp::new().await;
    let id = app.seed_course("Intro to Go", "desc", app.category, true);
    app.state.db.set_enrollment(&app.student.to_string(), id, false).unwrap();
    let token = app.token(app.student, Role::Student);

    let (_, body) = app.get(&format!("/courses/{id}"), Some(&token)).await;
    assert_eq!(body["is_enrolled"], false);
    assert_eq!(body["user_type"], "authenticated");
}

#[tokio::test]
async fn enrollment_is_per_course() {
    let app = TestApp::new().await;
    let enrolled = app.seed_course("A", "desc", app.category, false);
    let other = app.seed_course("B", "desc", app.category, false);
    app.state.db.set_enrollment(&app.student.to_string(), enrolled, true).unwrap();
    let token = app.token(app.student, Role::Student);

    let (_, body) = app.get(&format!("/courses/{other}"), Some(&token)).await;
    assert_eq!(body["is_enrolled"], false);
}

#[tokio::test]
async fn show_is_idempotent() {
    let app = TestApp::new().await;
    let id = app.seed_course("Intro to Go", "desc", app.category, false);
    app.state.db.set_enrollment(&app.student.to_string(), id, true).unwrap();
    let viewer = app.claims(app.student, Role::Student);

    let first = detail::show(&app.state, id, Some(&viewer)).await.unwrap();
    let second = detail::show(&app.state, id, Some(&viewer)).await.unwrap();
    assert!(first.access.is_enrolled);
    assert_eq!(first.access, second.access);
}

#[tokio::test]
async fn access_record_describes_viewer() {
    let app = TestApp::new().await;
    let id = app.seed_course("Intro to Go", "desc", app.category, false);

    let guest = detail::show(&app.state, id, None).await.unwrap();
    assert_eq!(guest.access.viewer_id, None);
    assert!(!guest.access.is_authenticated);
    assert_eq!(guest.access.user_type, UserType::Guest);
    assert!(!guest.access.is_enrolled);

    let viewer = app.claims(app.teacher, Role::Teacher);
    let member = detail::show(&app.state, id, Some(&viewer)).await.unwrap();
    assert_eq!(member.access.viewer_id, Some(app.teacher));
    assert!(member.access.is_authenticated);
    assert_eq!(member.access.user_type, UserType::Authenticated);
    assert_eq!(member.course.lessons, Some(vec![]));
}

#[tokio::test]
async fn missing_course_is_not_found() {
    let app = TestApp::new().await;
    let (status, body) = app.get("/courses/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Course not found.");
}

#[tokio::test]
async fn bad_token_is_rejected_not_downgraded() {
    let app = TestApp::new().await;
    let id = app.seed_course("Intro to Go", "desc", app.category, false);

    let (status, _) = app.get(&format!("/courses/{id}"), Some("garbage")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn thumbnail_url_uses_public_base() {
    let app = TestApp::new().await;
    let path = app.stored_file("png").await;
    let id = app.seed_course_for(app.teacher, "Pictured", "desc", app.category, false, Some(&path));

    let (_, body) = app.get(&format!("/courses/{id}"), None).await;
    assert_eq!(body["data"]["thumbnail"], path.as_str());
    assert_eq!(
        body["data"]["thumbnail_url"],
        format!("{}/storage/{}", common::PUBLIC_URL, path)
    );

    let (status, body) = app.get(&format!("/storage/{path}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::Value::String("old-image".into()));
}
