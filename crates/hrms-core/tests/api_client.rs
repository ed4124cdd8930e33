//! Tests for the HRMS API client against a mock backend.

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use hrms_core::api::{ApiRequest, QueryParams};
use hrms_core::cache::{CacheKey, ManualClock, ResponseCache, DEFAULT_FRESHNESS};
use hrms_core::models::{AttendanceStatus, MarkAttendance, NewEmployee, Photo};
use hrms_core::{ApiClient, ApiError};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Helper: client against `server` with a manually driven cache clock.
fn client_for(server: &MockServer) -> (ApiClient, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::default());
    let cache = ResponseCache::with_clock(DEFAULT_FRESHNESS, clock.clone());
    let client = ApiClient::with_cache(&server.uri(), Duration::from_secs(10), cache).unwrap();
    (client, clock)
}

fn employee_json(employee_id: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "employee_id": employee_id,
        "full_name": "Ada Lovelace",
        "email": "ada@example.com",
        "department": "Engineering",
        "photo_path": null,
        "created_at": "2024-05-01T09:30:00",
        "updated_at": "2024-05-01T09:30:00"
    })
}

fn stats_json() -> serde_json::Value {
    json!({"total_employees": 3, "present_today": 2, "absent_today": 1})
}

fn attendance_json() -> serde_json::Value {
    json!({
        "id": 7,
        "employee_id": "EMP001",
        "date": "2024-03-07",
        "status": "Present",
        "created_at": "2024-03-07T08:00:00",
        "updated_at": "2024-03-07T08:00:00"
    })
}

fn content_type(request: &Request) -> Option<String> {
    request
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn mount_stats(server: &MockServer, expected_calls: u64) {
    Mock::given(method("GET"))
        .and(path("/api/dashboard/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stats_json()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

/// An address nothing is listening on
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

// ── caching ──────────────────────────────────────────────────────────

#[tokio::test]
async fn repeated_get_within_window_uses_cache() {
    let server = MockServer::start().await;
    mount_stats(&server, 1).await;
    let (client, clock) = client_for(&server);

    let first = client.send(ApiRequest::get("/api/dashboard/stats")).await.unwrap();
    clock.advance(chrono::Duration::minutes(4));
    let second = client.send(ApiRequest::get("/api/dashboard/stats")).await.unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.body, second.body);

    let stats = client.dashboard_stats().await.unwrap();
    assert_eq!(stats.total_employees, 3);
}

#[tokio::test]
async fn get_after_window_refetches_and_refreshes_timestamp() {
    let server = MockServer::start().await;
    mount_stats(&server, 2).await;
    let (client, clock) = client_for(&server);
    let key = CacheKey::new("/api/dashboard/stats", &[]);

    client.dashboard_stats().await.unwrap();
    let first_stamp = client.cache().entry(&key).unwrap().cached_at;

    clock.advance(chrono::Duration::minutes(5));
    let response = client.send(ApiRequest::get("/api/dashboard/stats")).await.unwrap();
    assert!(!response.from_cache);

    let second_stamp = client.cache().entry(&key).unwrap().cached_at;
    assert_eq!(second_stamp, first_stamp + chrono::Duration::minutes(5));
}

#[tokio::test]
async fn query_parameter_order_does_not_miss_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/employees"))
        .and(query_param("skip", "0"))
        .and(query_param("limit", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([employee_json("E1")])))
        .expect(1)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let employees = client.list_employees(0, 100).await.unwrap();
    assert_eq!(employees.len(), 1);

    let reordered = QueryParams::new().with("limit", 100).with("skip", 0);
    let response = client
        .send(ApiRequest::get("/api/employees").query(reordered))
        .await
        .unwrap();
    assert!(response.from_cache);
}

#[tokio::test]
async fn different_parameters_are_cached_separately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/employees"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(2)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    client.list_employees(0, 100).await.unwrap();
    client.list_employees(100, 100).await.unwrap();
    assert_eq!(client.cache_size(), 2);
}

#[tokio::test]
async fn failed_get_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"detail": "Down"})))
        .expect(2)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    assert!(client.health_check().await.is_err());
    assert!(client.health_check().await.is_err());
    assert_eq!(client.cache_size(), 0);
}

#[tokio::test]
async fn clear_expired_sweeps_only_stale_entries() {
    let server = MockServer::start().await;
    mount_stats(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "healthy", "version": "1.0.0"})))
        .expect(1)
        .mount(&server)
        .await;
    let (client, clock) = client_for(&server);

    client.dashboard_stats().await.unwrap();
    clock.advance(chrono::Duration::minutes(6));
    let health = client.health_check().await.unwrap();
    assert!(health.is_healthy());

    assert_eq!(client.clear_expired_cache(), 1);
    assert_eq!(client.cache_size(), 1);
}

// ── invalidation ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_employee_clears_cache() {
    let server = MockServer::start().await;
    mount_stats(&server, 2).await;
    Mock::given(method("POST"))
        .and(path("/api/employees"))
        .respond_with(ResponseTemplate::new(201).set_body_json(employee_json("EMP002")))
        .expect(1)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    client.dashboard_stats().await.unwrap();
    let created = client
        .create_employee(&NewEmployee::new("EMP002", "Ada Lovelace", "ada@example.com", "Engineering"))
        .await
        .unwrap();
    assert_eq!(created.employee_id, "EMP002");
    assert_eq!(client.cache_size(), 0);

    client.dashboard_stats().await.unwrap();
}

#[tokio::test]
async fn in_flight_get_does_not_repopulate_after_mutation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/employees"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([employee_json("EMP001")]))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/employees/EMP001"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.list_employees(0, 100).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    client.delete_employee("EMP001").await.unwrap();

    // the list started before the delete, so its body must not be stored
    let stale = pending.await.unwrap().unwrap();
    assert_eq!(stale.len(), 1);
    assert_eq!(client.cache_size(), 0);

    let response = client
        .send(
            ApiRequest::get("/api/employees")
                .query(QueryParams::new().with("skip", 0).with("limit", 100)),
        )
        .await
        .unwrap();
    assert!(!response.from_cache);
}

#[tokio::test]
async fn delete_employee_clears_cache() {
    let server = MockServer::start().await;
    mount_stats(&server, 2).await;
    Mock::given(method("DELETE"))
        .and(path("/api/employees/EMP001"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    client.dashboard_stats().await.unwrap();
    client.delete_employee("EMP001").await.unwrap();
    client.dashboard_stats().await.unwrap();
}

#[tokio::test]
async fn failed_mark_attendance_still_clears_cache() {
    let server = MockServer::start().await;
    mount_stats(&server, 2).await;
    Mock::given(method("POST"))
        .and(path("/api/attendance"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"detail": "Employee with ID 'GHOST' not found"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    client.dashboard_stats().await.unwrap();
    let mark = MarkAttendance::new(
        "GHOST",
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        AttendanceStatus::Present,
    );
    let err = client.mark_attendance(&mark).await.unwrap_err();
    assert_eq!(err.detail().as_deref(), Some("Employee with ID 'GHOST' not found"));

    let response = client.send(ApiRequest::get("/api/dashboard/stats")).await.unwrap();
    assert!(!response.from_cache);
}

// ── content type ─────────────────────────────────────────────────────

#[tokio::test]
async fn create_employee_sends_multipart_without_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/employees"))
        .respond_with(ResponseTemplate::new(201).set_body_json(employee_json("EMP003")))
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let new = NewEmployee::new("EMP003", "Grace Hopper", "grace@example.com", "Research").with_photo(Photo {
        file_name: "grace.png".to_string(),
        mime_type: "image/png".to_string(),
        bytes: vec![0x89, b'P', b'N', b'G'],
    });
    client.create_employee(&new).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let content_type = content_type(&requests[0]).unwrap();
    assert!(content_type.starts_with("multipart/form-data; boundary="));

    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"employee_id\""));
    assert!(body.contains("EMP003"));
    assert!(body.contains("name=\"photo\"; filename=\"grace.png\""));
}

#[tokio::test]
async fn mark_attendance_sends_json_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/attendance"))
        .respond_with(ResponseTemplate::new(201).set_body_json(attendance_json()))
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let mark = MarkAttendance::new(
        "EMP001",
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        AttendanceStatus::Present,
    );
    let record = client.mark_attendance(&mark).await.unwrap();
    assert!(record.is_present());

    let requests = server.received_requests().await.unwrap();
    assert_eq!(content_type(&requests[0]).as_deref(), Some("application/json"));
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(
        sent,
        json!({"employee_id": "EMP001", "date": "2024-03-07", "status": "Present"})
    );
}

#[tokio::test]
async fn mark_attendance_keeps_caller_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/attendance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(attendance_json()))
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json; charset=utf-8"));
    let mark = MarkAttendance::new(
        "EMP001",
        NaiveDate::from_ymd_opt(2024, 3, 7).unwrap(),
        AttendanceStatus::Absent,
    );
    client.mark_attendance_with(&mark, headers).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(
        content_type(&requests[0]).as_deref(),
        Some("application/json; charset=utf-8")
    );
}

// ── errors ───────────────────────────────────────────────────────────

#[tokio::test]
async fn server_error_surfaces_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/employees"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "Employee already exists"})),
        )
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let err = client
        .create_employee(&NewEmployee::new("EMP001", "Ada", "ada@example.com", "Engineering"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Server { .. }));
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert_eq!(err.detail().as_deref(), Some("Employee already exists"));
    assert_eq!(err.user_message("Failed to add employee."), "Employee already exists");
}

#[tokio::test]
async fn connection_failure_is_network_error() {
    let client = ApiClient::new(&closed_port_url()).unwrap();

    let err = client.health_check().await.unwrap_err();

    assert!(err.is_network());
    assert_eq!(err.detail(), None);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn timeout_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "healthy"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    let client = ApiClient::with_cache(
        &server.uri(),
        Duration::from_millis(200),
        ResponseCache::default(),
    )
    .unwrap();

    let err = client.health_check().await.unwrap_err();
    match err {
        ApiError::Network(inner) => assert!(inner.is_timeout()),
        other => panic!("expected network error, got {:?}", other),
    }
}

#[tokio::test]
async fn malformed_base_url_is_setup_error() {
    let client = ApiClient::new("not a url").unwrap();
    let err = client.health_check().await.unwrap_err();
    assert!(matches!(err, ApiError::RequestSetup(_)));
}

#[tokio::test]
async fn unexpected_body_shape_is_invalid_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/attendance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let err = client.list_attendance().await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn server_error_with_truncated_body_keeps_status() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let backend = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let _ = stream.read(&mut buf).unwrap();
        stream
            .write_all(
                b"HTTP/1.1 500 Internal Server Error\r\n\
                  Content-Length: 100\r\n\
                  Connection: close\r\n\r\npartial",
            )
            .unwrap();
        stream.flush().unwrap();
    });
    let client = ApiClient::new(&url).unwrap();

    let err = client.health_check().await.unwrap_err();
    backend.join().unwrap();

    match &err {
        ApiError::Server { status, .. } => assert_eq!(status.as_u16(), 500),
        other => panic!("expected server error, got {:?}", other),
    }
    assert!(!err.is_network());
    assert_eq!(err.detail(), None);
}

// ── endpoints ────────────────────────────────────────────────────────

#[tokio::test]
async fn attendance_by_employee_omits_missing_dates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/attendance/employee/EMP001"))
        .and(query_param("start_date", "2024-03-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([attendance_json()])))
        .expect(1)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let records = client
        .attendance_by_employee("EMP001", NaiveDate::from_ymd_opt(2024, 3, 1), None)
        .await
        .unwrap();
    assert_eq!(records.len(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("start_date=2024-03-01"));
}

#[tokio::test]
async fn employee_id_is_path_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/employees/EMP%20001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(employee_json("EMP 001")))
        .expect(1)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let employee = client.get_employee("EMP 001").await.unwrap();
    assert_eq!(employee.employee_id, "EMP 001");
}

#[tokio::test]
async fn employee_id_with_slash_is_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/employees/A%2FB"))
        .respond_with(ResponseTemplate::new(200).set_body_json(employee_json("A/B")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/employees/A%2FB"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let (client, _clock) = client_for(&server);

    let employee = client.get_employee("A/B").await.unwrap();
    assert_eq!(employee.employee_id, "A/B");
    client.delete_employee("A/B").await.unwrap();
}
