#![allow(dead_code)]

use checkin_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::ports::EmailService,
    infra::{
        auth::jwt_identity::JwtIdentityResolver,
        factory::{load_templates, sqlite_options, sqlite_repositories},
    },
    error::AppError,
};
use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
    Router,
};
use async_trait::async_trait;
use chrono::Utc;
use tower::ServiceExt;
use serde_json::{json, Value};

pub const ADMIN_SECRET: &str = "test-admin-secret";

#[derive(Clone, Debug)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub attachment_name: Option<String>,
    pub attachment: Option<Vec<u8>>,
}

#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        html_body: &str,
        attachment_name: Option<&str>,
        attachment_data: Option<&[u8]>
    ) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
            attachment_name: attachment_name.map(String::from),
            attachment: attachment_data.map(<[u8]>::to_vec),
        });
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub mailer: Arc<MockEmailService>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(sqlite_options(&db_url))
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            public_base_url: "http://checkin.test".to_string(),
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            session_secret: "test-session-secret".to_string(),
            admin_secret: ADMIN_SECRET.to_string(),
            auth_issuer: "test-issuer".to_string(),
            default_event_id: "default".to_string(),
            token_ttl_days: 30,
        };

        let mailer = Arc::new(MockEmailService::default());
        let identity = Arc::new(JwtIdentityResolver::new(&config.session_secret, config.auth_issuer.clone()));
        let templates = Arc::new(load_templates().expect("Failed to load templates"));

        let state = Arc::new(AppState::assemble(
            config,
            sqlite_repositories(&pool),
            mailer.clone(),
            identity,
            templates,
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
            mailer,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, session: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(s) = session {
            builder = builder.header(header::COOKIE, format!("session={}", s));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, session: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(s) = session {
            builder = builder.header(header::COOKIE, format!("session={}", s));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn delete(&self, uri: &str, session: Option<&str>) -> Response {
        let mut builder = Request::builder().method("DELETE").uri(uri);
        if let Some(s) = session {
            builder = builder.header(header::COOKIE, format!("session={}", s));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Logs in as admin and returns the session cookie value.
    pub async fn admin_login(&self) -> String {
        let response = self.post_json("/api/v1/admin/login", json!({ "secret": ADMIN_SECRET }), None).await;

        if !response.status().is_success() {
            panic!("Admin login failed in test helper: status {}", response.status());
        }
        session_cookie(&response).expect("No session cookie returned")
    }

    pub async fn create_event(&self, admin: &str, id: &str, website_url: Option<&str>) -> Value {
        let response = self.post_json(
            "/api/v1/admin/events",
            json!({
                "id": id,
                "name": format!("Event {}", id),
                "startTime": Utc::now().to_rfc3339(),
                "endTime": (Utc::now() + chrono::Duration::days(1)).to_rfc3339(),
                "location": "Hall A",
                "websiteUrl": website_url,
            }),
            Some(admin),
        ).await;

        assert!(response.status().is_success(), "event create failed: {}", response.status());
        parse_body(response).await
    }

    /// Creates a session under `event_id` and returns its id.
    pub async fn create_session(&self, admin: &str, event_id: &str, title: &str, max_capacity: Option<i32>) -> String {
        let response = self.post_json(
            &format!("/api/v1/admin/events/{}/sessions", event_id),
            json!({
                "title": title,
                "startTime": Utc::now().to_rfc3339(),
                "endTime": (Utc::now() + chrono::Duration::hours(1)).to_rfc3339(),
                "maxCapacity": max_capacity,
            }),
            Some(admin),
        ).await;

        assert!(response.status().is_success(), "session create failed: {}", response.status());
        parse_body(response).await["id"].as_str().unwrap().to_string()
    }

    pub async fn seat_count(&self, session_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM session_registrations WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Registers an attendee; returns (attendee id, token, attendee session).
    pub async fn register(&self, name: &str, email: &str) -> (String, String, String) {
        let response = self.post_json(
            "/api/v1/register",
            json!({ "name": name, "email": email }),
            None,
        ).await;

        assert!(response.status().is_success(), "registration failed: {}", response.status());
        let session = session_cookie(&response).expect("No attendee session cookie");
        let body = parse_body(response).await;

        (
            body["attendeeId"].as_str().unwrap().to_string(),
            body["token"].as_str().unwrap().to_string(),
            session,
        )
    }

    pub async fn issue_token(&self, session: &str, attendee_id: &str, event_id: &str) -> String {
        let response = self.post_json(
            "/api/v1/tokens",
            json!({ "attendeeId": attendee_id, "eventId": event_id }),
            Some(session),
        ).await;

        assert!(response.status().is_success(), "token issue failed: {}", response.status());
        parse_body(response).await["token"].as_str().unwrap().to_string()
    }

    pub async fn check_in_count(&self, attendee_id: &str, event_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM check_ins WHERE attendee_id = ? AND event_id = ?")
            .bind(attendee_id)
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn token_count(&self, attendee_id: &str, event_id: &str) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM tokens WHERE attendee_id = ? AND event_id = ?")
            .bind(attendee_id)
            .bind(event_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    /// Waits for background mail dispatch to deliver at least `n` mails.
    pub async fn wait_for_mails(&self, n: usize) -> Vec<SentMail> {
        for _ in 0..100 {
            {
                let sent = self.mailer.sent.lock().unwrap();
                if sent.len() >= n {
                    return sent.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("expected {} mails, got {}", n, self.mailer.sent.lock().unwrap().len());
    }
}

pub fn session_cookie(response: &Response) -> Option<String> {
    response.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find(|c| c.starts_with("session="))
        .map(|c| {
            let value = &c["session=".len()..];
            value.split(';').next().unwrap_or_default().to_string()
        })
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
