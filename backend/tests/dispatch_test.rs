use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use http::StatusCode;
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use worklog_backend::{routes, AppState, Config, DispatchSummary, Dispatcher, SendGridClient, SupabaseClient};
use worklog_common::ReportMonth;

fn test_config(supabase_url: &str, sendgrid_url: &str) -> Config {
    Config {
        host: "0.0.0.0".to_string(),
        port: 8080,
        supabase_url: supabase_url.to_string(),
        supabase_service_role_key: "service-role-key".to_string(),
        sendgrid_api_key: "sendgrid-key".to_string(),
        sender_email: "reports@worklog.test".to_string(),
        sendgrid_base_url: sendgrid_url.to_string(),
        log_level: "info".to_string(),
        cors_origins: "*".to_string(),
    }
}

fn test_dispatcher(config: &Config) -> Dispatcher {
    let store = SupabaseClient::new(&config.supabase_url, &config.supabase_service_role_key);
    let mailer = SendGridClient::new(&config.sendgrid_base_url, &config.sendgrid_api_key);
    Dispatcher::new(store, mailer, config.sender_email.clone())
}

async fn mock_distinct_users(server: &MockServer, user_ids: &[Uuid]) {
    let rows: Vec<_> = user_ids.iter().map(|id| json!({ "user_id": id })).collect();
    Mock::given(method("GET"))
        .and(path("/rest/v1/work_entries"))
        .and(query_param("select", "user_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

async fn mock_identity(server: &MockServer, user_id: Uuid, email: &str, full_name: Option<&str>) {
    let mut user = json!({ "id": user_id, "email": email });
    if let Some(name) = full_name {
        user["user_metadata"] = json!({ "full_name": name });
    }
    Mock::given(method("GET"))
        .and(path(format!("/auth/v1/admin/users/{}", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(user))
        .mount(server)
        .await;
}

async fn mock_entries(server: &MockServer, user_id: Uuid, rows: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/work_entries"))
        .and(query_param("user_id", format!("eq.{}", user_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

fn may_entries(user_id: Uuid) -> serde_json::Value {
    json!([
        { "user_id": user_id, "project_name": "Alpha", "work_date": "2024-05-02", "hours_worked": 3.5 },
        { "user_id": user_id, "project_name": "Beta", "work_date": "2024-05-10", "hours_worked": 2.25 },
    ])
}

#[tokio::test]
async fn test_user_without_entries_in_target_month_gets_no_email() {
    let supabase = MockServer::start().await;
    let sendgrid = MockServer::start().await;

    let user = Uuid::new_v4();
    mock_distinct_users(&supabase, &[user]).await;
    mock_identity(&supabase, user, "idle@example.com", None).await;
    mock_entries(&supabase, user, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&sendgrid)
        .await;

    let config = test_config(&supabase.uri(), &sendgrid.uri());
    let summary = test_dispatcher(&config)
        .run(ReportMonth::new(2024, 5))
        .await
        .unwrap();

    assert_eq!(
        summary,
        DispatchSummary {
            sent: 0,
            skipped: 1,
            failed: 0
        }
    );
}

#[tokio::test]
async fn test_identity_failure_does_not_block_remaining_users() {
    let supabase = MockServer::start().await;
    let sendgrid = MockServer::start().await;

    let user_a = Uuid::new_v4();
    let user_b = Uuid::new_v4();
    let user_c = Uuid::new_v4();

    mock_distinct_users(&supabase, &[user_a, user_b, user_c]).await;
    mock_identity(&supabase, user_a, "a@example.com", Some("User A")).await;
    // user B's identity lookup fails; no admin mock means no entries query either
    Mock::given(method("GET"))
        .and(path(format!("/auth/v1/admin/users/{}", user_b)))
        .respond_with(ResponseTemplate::new(500))
        .mount(&supabase)
        .await;
    mock_identity(&supabase, user_c, "c@example.com", Some("User C")).await;
    mock_entries(&supabase, user_a, may_entries(user_a)).await;
    mock_entries(&supabase, user_c, may_entries(user_c)).await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(2)
        .mount(&sendgrid)
        .await;

    let config = test_config(&supabase.uri(), &sendgrid.uri());
    let summary = test_dispatcher(&config)
        .run(ReportMonth::new(2024, 5))
        .await
        .unwrap();

    assert_eq!(
        summary,
        DispatchSummary {
            sent: 2,
            skipped: 0,
            failed: 1
        }
    );

    let sends = sendgrid.received_requests().await.unwrap();
    let bodies: Vec<String> = sends
        .iter()
        .map(|request| String::from_utf8_lossy(&request.body).into_owned())
        .collect();
    assert!(bodies.iter().any(|body| body.contains("a@example.com")));
    assert!(bodies.iter().any(|body| body.contains("c@example.com")));
    assert!(!bodies.iter().any(|body| body.contains("b@example.com")));
}

#[tokio::test]
async fn test_mail_payload_carries_subject_filename_and_pdf() {
    let supabase = MockServer::start().await;
    let sendgrid = MockServer::start().await;

    let user = Uuid::new_v4();
    mock_distinct_users(&supabase, &[user]).await;
    mock_identity(&supabase, user, "ana@example.com", Some("Ana Silva")).await;
    mock_entries(&supabase, user, may_entries(user)).await;

    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(1)
        .mount(&sendgrid)
        .await;

    let config = test_config(&supabase.uri(), &sendgrid.uri());
    let summary = test_dispatcher(&config)
        .run(ReportMonth::new(2024, 5))
        .await
        .unwrap();
    assert_eq!(summary.sent, 1);

    let sends = sendgrid.received_requests().await.unwrap();
    assert_eq!(sends.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&sends[0].body).unwrap();

    assert_eq!(body["subject"], "Monthly Hours Report - May 2024");
    assert_eq!(body["from"]["email"], "reports@worklog.test");
    assert_eq!(body["personalizations"][0]["to"][0]["email"], "ana@example.com");
    assert!(body["content"][0]["value"]
        .as_str()
        .unwrap()
        .contains("Hello Ana Silva,"));

    let attachment = &body["attachments"][0];
    assert_eq!(attachment["filename"], "Report_Hours_May_2024.pdf");
    assert_eq!(attachment["type"], "application/pdf");
    assert_eq!(attachment["disposition"], "attachment");
    let pdf = BASE64.decode(attachment["content"].as_str().unwrap()).unwrap();
    assert_eq!(&pdf[..5], b"%PDF-");
}

#[tokio::test]
async fn test_entry_query_targets_the_whole_month_ascending() {
    let supabase = MockServer::start().await;
    let sendgrid = MockServer::start().await;

    let user = Uuid::new_v4();
    mock_distinct_users(&supabase, &[user]).await;
    mock_identity(&supabase, user, "ana@example.com", None).await;
    mock_entries(&supabase, user, json!([])).await;

    let config = test_config(&supabase.uri(), &sendgrid.uri());
    test_dispatcher(&config)
        .run(ReportMonth::new(2024, 5))
        .await
        .unwrap();

    let requests = supabase.received_requests().await.unwrap();
    let entry_query = requests
        .iter()
        .find_map(|request| {
            let query = request.url.query().unwrap_or_default();
            query.contains("work_date").then(|| query.to_string())
        })
        .expect("entries request was made");
    assert!(entry_query.contains("work_date=gte.2024-05-01"));
    assert!(entry_query.contains("work_date=lte.2024-05-31"));
    assert!(entry_query.contains("order=work_date.asc"));
}

#[tokio::test]
async fn test_trigger_responds_200_once_dispatch_is_kicked_off() {
    let supabase = MockServer::start().await;
    let sendgrid = MockServer::start().await;

    mock_distinct_users(&supabase, &[]).await;

    let config = test_config(&supabase.uri(), &sendgrid.uri());
    let state = Arc::new(AppState {
        dispatcher: test_dispatcher(&config),
        config,
    });
    let app = routes::reports::router(state);

    let request = http::Request::builder()
        .method(http::Method::POST)
        .uri("/send-monthly-report")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_trigger_responds_500_when_enumeration_fails() {
    let supabase = MockServer::start().await;
    let sendgrid = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/work_entries"))
        .respond_with(ResponseTemplate::new(500).set_body_string("connection refused"))
        .mount(&supabase)
        .await;

    let config = test_config(&supabase.uri(), &sendgrid.uri());
    let state = Arc::new(AppState {
        dispatcher: test_dispatcher(&config),
        config,
    });
    let app = routes::reports::router(state);

    let request = http::Request::builder()
        .method(http::Method::POST)
        .uri("/send-monthly-report")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_run_with_empty_store_sends_nothing() {
    let supabase = MockServer::start().await;
    let sendgrid = MockServer::start().await;

    mock_distinct_users(&supabase, &[]).await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(ResponseTemplate::new(202))
        .expect(0)
        .mount(&sendgrid)
        .await;

    let config = test_config(&supabase.uri(), &sendgrid.uri());
    let summary = test_dispatcher(&config)
        .run(ReportMonth::new(2024, 5))
        .await
        .unwrap();
    assert_eq!(summary, DispatchSummary::default());
}
