use chrono::{Duration as ChronoDuration, Utc};
use colored::*;
use governor::{Quota, RateLimiter};
use hdrhistogram::Histogram;
use reqwest::Client;
use serde_json::{json, Value};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const DURATION_SECS: u64 = 20;
const BASE_URL: &str = "http://localhost:3000";

struct Target {
    name: &'static str,
    method: &'static str,
    url: String,
    body: Option<serde_json::Value>,
}

#[tokio::main]
async fn main() {
    println!("{}", "🚀 Starting Check-in Benchmark Suite".bold().green());
    println!("Target URL: {}", BASE_URL);

    let admin_secret = std::env::var("ADMIN_SECRET").unwrap_or_else(|_| "admin".to_string());

    let client = Client::builder()
        .pool_max_idle_per_host(1000)
        .timeout(Duration::from_secs(10))
        .cookie_store(true)
        .build()
        .unwrap();

    if client.get(format!("{}/health", BASE_URL)).send().await.is_err() {
        eprintln!("{}", "❌ Server is NOT reachable at localhost:3000. Please start it first.".red().bold());
        return;
    }

    println!("\n{}", "⚙️  Setting up benchmark data...".yellow());
    let event_id = format!("bench-{}", Uuid::new_v4());
    setup_event(&client, &admin_secret, &event_id).await;
    let (attendee_id, token) = setup_attendee(&client, &admin_secret, &event_id).await;

    println!("{}", "✅ Data created successfully.".green());
    println!("   Event ID:    {}", event_id);
    println!("   Attendee ID: {}", attendee_id);

    let targets = vec![
        Target {
            name: "Health Check (Public)",
            method: "GET",
            url: format!("{}/health", BASE_URL),
            body: None,
        },
        Target {
            name: "Redeem Token (Idempotent Scan)",
            method: "GET",
            url: format!("{}/api/v1/redeem/{}", BASE_URL, token),
            body: None,
        },
        Target {
            name: "QR Image (PNG Rendering)",
            method: "GET",
            url: format!("{}/api/v1/qr/image/{}", BASE_URL, token),
            body: None,
        },
        Target {
            name: "Redeem Unknown Token (Miss Path)",
            method: "GET",
            url: format!("{}/api/v1/redeem/{}", BASE_URL, "doesnotexist"),
            body: None,
        },
    ];

    let rps_stages = vec![10, 50, 200, 1000];

    for target in targets {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking Endpoint: {}", target.name.cyan().bold());
        println!("URL: {}", target.url);
        println!("{}", "=".repeat(60));

        println!("{:<10} | {:<15} | {:<15} | {:<15}", "RPS", "Mean (ms)", "P99 (ms)", "Success Rate");
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &rps in &rps_stages {
            run_stage(&client, &target, rps).await;
        }
    }
}

async fn admin_login(client: &Client, admin_secret: &str) {
    let res = client.post(format!("{}/api/v1/admin/login", BASE_URL))
        .json(&json!({ "secret": admin_secret }))
        .send()
        .await
        .expect("Login failed during setup");

    if !res.status().is_success() {
        panic!("Admin login failed. Status: {}", res.status());
    }
}

async fn setup_event(client: &Client, admin_secret: &str, event_id: &str) {
    admin_login(client, admin_secret).await;

    let res = client.post(format!("{}/api/v1/admin/events", BASE_URL))
        .json(&json!({
            "id": event_id,
            "name": "Benchmark Summit",
            "description": "Load testing",
            "startTime": Utc::now().to_rfc3339(),
            "endTime": (Utc::now() + ChronoDuration::days(2)).to_rfc3339(),
            "location": "Server Room"
        }))
        .send()
        .await
        .expect("Failed to create event");

    if !res.status().is_success() {
        let status = res.status();
        let txt = res.text().await.unwrap_or_default();
        panic!("Failed to create event data. Status: {}. Body: {}", status, txt);
    }
}

async fn setup_attendee(client: &Client, admin_secret: &str, event_id: &str) -> (String, String) {
    let res = client.post(format!("{}/api/v1/register", BASE_URL))
        .json(&json!({
            "name": "Bench Attendee",
            "email": format!("bench-{}@example.com", Uuid::new_v4())
        }))
        .send()
        .await
        .expect("Failed to register attendee");

    if !res.status().is_success() {
        panic!("Failed to register attendee: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse registration response");
    let attendee_id = body["attendeeId"].as_str().expect("No attendeeId").to_string();

    // Registration replaced the admin cookie with an attendee session.
    admin_login(client, admin_secret).await;

    let res = client.post(format!("{}/api/v1/tokens", BASE_URL))
        .json(&json!({ "attendeeId": attendee_id, "eventId": event_id }))
        .send()
        .await
        .expect("Failed to issue token");

    if !res.status().is_success() {
        panic!("Failed to issue token: status {}", res.status());
    }

    let body: Value = res.json().await.expect("Failed to parse token response");
    let token = body["token"].as_str().expect("No token").to_string();
    (attendee_id, token)
}

async fn run_stage(client: &Client, target: &Target, rps: u32) {
    let limiter = Arc::new(RateLimiter::direct(
        Quota::per_second(NonZeroU32::new(rps).unwrap())
    ));

    let (tx, mut rx) = mpsc::channel(50000);
    let start_time = Instant::now();
    let duration = Duration::from_secs(DURATION_SECS);

    loop {
        if start_time.elapsed() > duration {
            break;
        }

        if limiter.check().is_ok() {
            let client = client.clone();
            let url = target.url.clone();
            let body = target.body.clone();
            let method = target.method;
            let tx = tx.clone();

            tokio::spawn(async move {
                let req_start = Instant::now();
                let res = match method {
                    "POST" => {
                        let mut req = client.post(&url);
                        if let Some(b) = body {
                            req = req.json(&b);
                        }
                        req.send().await
                    },
                    _ => client.get(&url).send().await,
                };
                let latency = req_start.elapsed();

                // 404 is the expected answer on the miss path.
                let success = match res {
                    Ok(r) => r.status().is_success() || r.status() == reqwest::StatusCode::NOT_FOUND,
                    Err(_) => false,
                };

                let _ = tx.send((latency, success)).await;
            });
        } else {
            tokio::task::yield_now().await;
        }
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut successes = 0;
    let mut total = 0;

    while let Some((latency, success)) = rx.recv().await {
        total += 1;
        if success { successes += 1; }
        histogram.record(latency.as_micros() as u64).unwrap();
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let success_rate = if total > 0 { (successes as f64 / total as f64) * 100.0 } else { 0.0 };

    println!(
        "{:<10} | {:<15.2} | {:<15.2} | {:<14.1}%",
        rps,
        mean_ms,
        p99_ms,
        success_rate
    );

    tokio::time::sleep(Duration::from_millis(500)).await;
}
