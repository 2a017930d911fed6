mod common;

use axum::http::StatusCode;
use common::{parse_body, session_cookie, TestApp};
use serde_json::json;

#[tokio::test]
async fn test_registration_issues_token_and_sends_mail() {
    let app = TestApp::new().await;
    let (attendee_id, token, session) = app.register("Ada Lovelace", "Ada@Example.com").await;

    assert!(!attendee_id.is_empty());
    assert!(!session.is_empty());
    assert_eq!(app.token_count(&attendee_id, "default").await, 1);

    let mails = app.wait_for_mails(1).await;
    assert_eq!(mails[0].recipient, "ada@example.com");
    assert!(mails[0].subject.contains("Conference"));
    assert!(mails[0].html_body.contains(&format!("http://checkin.test/api/v1/qr/image/{}", token)));
    assert!(!mails[0].html_body.contains("&#x2F;"));
    // A GET on the redemption URL checks in, so the body must not link it.
    assert!(!mails[0].html_body.contains(&format!("/redeem/{}", token)));

    assert_eq!(mails[0].attachment_name.as_deref(), Some("checkin-qr.png"));
    let png = mails[0].attachment.as_ref().expect("QR attachment");
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_re_registration_updates_name_and_rotates_token() {
    let app = TestApp::new().await;
    let (first_id, first_token, _) = app.register("Ada", "ada@example.com").await;
    let (second_id, second_token, _) = app.register("Ada Lovelace", "ada@example.com").await;

    assert_eq!(first_id, second_id);
    assert_ne!(first_token, second_token);
    assert_eq!(app.token_count(&first_id, "default").await, 1);

    let (name,): (String,) = sqlx::query_as("SELECT name FROM attendees WHERE id = ?")
        .bind(&first_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(name, "Ada Lovelace");
}

#[tokio::test]
async fn test_registration_validation() {
    let app = TestApp::new().await;

    let res = app.post_json("/api/v1/register", json!({ "email": "a@example.com" }), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.post_json("/api/v1/register", json!({ "name": "  ", "email": "a@example.com" }), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app.post_json("/api/v1/register", json!({ "name": "A", "email": "not-an-email" }), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(session_cookie(&res).is_none());
}

#[tokio::test]
async fn test_my_qr_reflects_session_attendee() {
    let app = TestApp::new().await;
    let (_, token, session) = app.register("Grace Hopper", "grace@example.com").await;

    let res = app.get("/api/v1/me/qr", Some(&session)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["token"], token.as_str());
    assert_eq!(body["checkedIn"], false);
    assert_eq!(body["qrImageUrl"], format!("http://checkin.test/api/v1/qr/image/{}", token));

    app.get(&format!("/api/v1/redeem/{}", token), None).await;

    let body = parse_body(app.get("/api/v1/me/qr", Some(&session)).await).await;
    assert_eq!(body["checkedIn"], true);
}

#[tokio::test]
async fn test_my_qr_requires_attendee_session() {
    let app = TestApp::new().await;
    let admin = app.admin_login().await;

    let res = app.get("/api/v1/me/qr", None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.get("/api/v1/me/qr", Some("forged.session.value")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.get("/api/v1/me/qr", Some(&admin)).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_logout_clears_session_cookie() {
    let app = TestApp::new().await;
    let (_, _, session) = app.register("Dorothy Vaughan", "dorothy@example.com").await;

    let res = app.post_json("/api/v1/auth/logout", json!({}), Some(&session)).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(session_cookie(&res).as_deref(), Some(""));
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let res = app.get("/health", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["status"], "ok");
}

#[tokio::test]
async fn test_login_by_email_resends_current_qr() {
    let app = TestApp::new().await;
    let (attendee_id, token, _) = app.register("Katherine Johnson", "katherine@example.com").await;
    app.wait_for_mails(1).await;

    let res = app.post_json("/api/v1/login", json!({ "email": " Katherine@Example.com " }), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(session_cookie(&res).is_none());
    let body = parse_body(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Your QR code has been sent to your email");

    let mails = app.wait_for_mails(2).await;
    assert_eq!(mails[1].recipient, "katherine@example.com");
    assert!(mails[1].html_body.contains(&format!("/api/v1/qr/image/{}", token)));
    assert_eq!(app.token_count(&attendee_id, "default").await, 1);
}

#[tokio::test]
async fn test_login_by_email_replaces_expired_token() {
    let app = TestApp::new().await;
    let (attendee_id, token, _) = app.register("Mary Jackson", "mary@example.com").await;

    sqlx::query("UPDATE tokens SET expires_at = ? WHERE token = ?")
        .bind(chrono::Utc::now() - chrono::Duration::days(1))
        .bind(&token)
        .execute(&app.pool)
        .await
        .unwrap();

    let res = app.post_json("/api/v1/login", json!({ "email": "mary@example.com" }), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let (current,): (String,) = sqlx::query_as("SELECT token FROM tokens WHERE attendee_id = ? AND event_id = 'default'")
        .bind(&attendee_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_ne!(current, token);
}

#[tokio::test]
async fn test_login_by_unknown_email() {
    let app = TestApp::new().await;

    let res = app.post_json("/api/v1/login", json!({ "email": "nobody@example.com" }), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(parse_body(res).await["error"], "User not found. Please register first.");

    let res = app.post_json("/api/v1/login", json!({}), None).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}
