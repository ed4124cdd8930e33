//! API client for the HRMS REST backend.
//!
//! `ApiClient::send` is the single boundary every call goes through: it
//! serves GETs from the response cache, classifies and logs failures, and
//! clears the cache after any mutating call. The typed operations below it
//! only build requests and decode bodies.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::cache::{CacheKey, ResponseCache};
use crate::config::{Config, DEFAULT_TIMEOUT_SECS};
use crate::models::{
    AttendanceRecord, DashboardStats, Employee, HealthStatus, MarkAttendance, NewEmployee,
};

use super::base_url::normalize_base_url;
use super::request::{apply_content_type, ApiRequest, Payload, QueryParams};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const EMPLOYEES_PATH: &str = "/api/employees";
const ATTENDANCE_PATH: &str = "/api/attendance";
const DASHBOARD_STATS_PATH: &str = "/api/dashboard/stats";
const HEALTH_PATH: &str = "/api/health";

/// Default page window for the employee list
pub const DEFAULT_SKIP: u32 = 0;
pub const DEFAULT_LIMIT: u32 = 100;

/// Decoded body of a successful call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub body: Value,
    /// Served from the response cache without a network call
    pub from_cache: bool,
}

/// API client for the HRMS backend.
/// Clone is cheap; clones share the connection pool and the response cache.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    cache: Arc<ResponseCache>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("cache", &self.cache)
            .finish()
    }
}

impl ApiClient {
    /// Create a client with the default timeout and a fresh cache
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_cache(
            base_url,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            ResponseCache::default(),
        )
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::with_cache(
            config.base_url(),
            config.timeout(),
            ResponseCache::new(config.cache_ttl()),
        )
    }

    /// Create a client that owns `cache`. The base URL is normalized here, once.
    pub fn with_cache(
        base_url: &str,
        timeout: Duration,
        cache: ResponseCache,
    ) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestSetup(e.to_string()))?;

        Ok(Self {
            client,
            base_url: normalize_base_url(base_url),
            cache: Arc::new(cache),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    // ===== Request Boundary =====

    /// Send a request, serving fresh GETs from the cache.
    ///
    /// Failures are logged once here and returned unchanged. Non-GET calls
    /// clear the whole cache once they complete, whatever the outcome.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let method = request.method.clone();
        let path = request.path.clone();

        let key = request
            .is_cacheable()
            .then(|| CacheKey::new(&request.path, request.query.pairs()));

        if let Some(ref key) = key {
            if let Some(body) = self.cache.get(key) {
                debug!(key = %key, "Serving response from cache");
                return Ok(ApiResponse {
                    body,
                    from_cache: true,
                });
            }
        }

        let generation = self.cache.generation();
        let result = self.execute(request).await;

        match (&result, key) {
            (Ok(body), Some(key)) => {
                self.cache.insert_if_current(key, body.clone(), generation);
            }
            (Err(e), _) => Self::log_failure(&method, &path, e),
            _ => {}
        }

        if method != Method::GET {
            self.cache.clear();
        }

        result.map(|body| ApiResponse {
            body,
            from_cache: false,
        })
    }

    fn log_failure(method: &Method, path: &str, err: &ApiError) {
        match err {
            ApiError::Server { status, .. } => {
                error!(%method, path, status = status.as_u16(), error = %err, "API error")
            }
            ApiError::Network(_) => error!(%method, path, error = %err, "Network error"),
            ApiError::RequestSetup(_) => error!(%method, path, error = %err, "Request setup error"),
            ApiError::InvalidResponse(_) => warn!(%method, path, error = %err, "Invalid response"),
        }
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let raw = format!("{}{}", self.base_url, path);
        Url::parse(&raw).map_err(|e| ApiError::RequestSetup(format!("invalid URL '{}': {}", raw, e)))
    }

    async fn execute(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let ApiRequest {
            method,
            path,
            query,
            payload,
            mut headers,
        } = request;

        let url = self.url_for(&path)?;
        apply_content_type(&mut headers, payload.as_ref());

        let mut builder = self.client.request(method, url).headers(headers);
        if !query.is_empty() {
            builder = builder.query(query.pairs());
        }
        builder = match payload {
            Some(Payload::Json(body)) => {
                let bytes = serde_json::to_vec(&body)
                    .map_err(|e| ApiError::RequestSetup(format!("failed to encode body: {}", e)))?;
                builder.body(bytes)
            }
            Some(Payload::Multipart(form)) => builder.multipart(form),
            None => builder,
        };

        let response = builder.send().await.map_err(ApiError::from_transport)?;
        let response = Self::check_response(response).await?;

        let text = response.text().await.map_err(ApiError::Network)?;
        Self::parse_body(&path, &text)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    debug!(status = status.as_u16(), error = %e, "Failed to read error body");
                    String::new()
                }
            };
            Err(ApiError::Server { status, body })
        }
    }

    /// Empty bodies decode as JSON null
    fn parse_body(path: &str, text: &str) -> Result<Value, ApiError> {
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(text)
            .map_err(|e| ApiError::InvalidResponse(format!("{}: {}", path, e)))
    }

    fn decode<T: DeserializeOwned>(path: &str, response: ApiResponse) -> Result<T, ApiError> {
        serde_json::from_value(response.body).map_err(|e| {
            warn!(path, error = %e, "Failed to decode response");
            ApiError::InvalidResponse(format!("{}: {}", path, e))
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: QueryParams) -> Result<T, ApiError> {
        let response = self.send(ApiRequest::get(path).query(query)).await?;
        Self::decode(path, response)
    }

    // ===== Employees =====

    /// List employees, `skip`/`limit` paging on the server
    pub async fn list_employees(&self, skip: u32, limit: u32) -> Result<Vec<Employee>, ApiError> {
        let query = QueryParams::new().with("skip", skip).with("limit", limit);
        self.get(EMPLOYEES_PATH, query).await
    }

    pub async fn get_employee(&self, employee_id: &str) -> Result<Employee, ApiError> {
        let path = format!("{}/{}", EMPLOYEES_PATH, urlencoding::encode(employee_id));
        self.get(&path, QueryParams::new()).await
    }

    /// Create an employee from a multipart form (with optional photo)
    pub async fn create_employee(&self, employee: &NewEmployee) -> Result<Employee, ApiError> {
        let form = match employee.to_form() {
            Ok(form) => form,
            Err(e) => {
                let err = ApiError::RequestSetup(format!("invalid photo: {}", e));
                Self::log_failure(&Method::POST, EMPLOYEES_PATH, &err);
                // Nothing went out, but a create was attempted
                self.cache.clear();
                return Err(err);
            }
        };
        let response = self
            .send(ApiRequest::post(EMPLOYEES_PATH).multipart(form))
            .await?;
        Self::decode(EMPLOYEES_PATH, response)
    }

    pub async fn delete_employee(&self, employee_id: &str) -> Result<(), ApiError> {
        let path = format!("{}/{}", EMPLOYEES_PATH, urlencoding::encode(employee_id));
        self.send(ApiRequest::delete(path)).await?;
        Ok(())
    }

    // ===== Attendance =====

    pub async fn mark_attendance(
        &self,
        attendance: &MarkAttendance,
    ) -> Result<AttendanceRecord, ApiError> {
        self.mark_attendance_with(attendance, reqwest::header::HeaderMap::new())
            .await
    }

    /// Mark attendance with extra request headers; a caller-supplied
    /// `Content-Type` is kept.
    pub async fn mark_attendance_with(
        &self,
        attendance: &MarkAttendance,
        headers: reqwest::header::HeaderMap,
    ) -> Result<AttendanceRecord, ApiError> {
        let body = serde_json::to_value(attendance)
            .map_err(|e| ApiError::RequestSetup(format!("failed to encode attendance: {}", e)))?;
        let mut request = ApiRequest::post(ATTENDANCE_PATH).json(body);
        request.headers = headers;
        let response = self.send(request).await?;
        Self::decode(ATTENDANCE_PATH, response)
    }

    pub async fn list_attendance(&self) -> Result<Vec<AttendanceRecord>, ApiError> {
        self.get(ATTENDANCE_PATH, QueryParams::new()).await
    }

    /// Attendance for one employee, optionally bounded by date (inclusive)
    pub async fn attendance_by_employee(
        &self,
        employee_id: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<AttendanceRecord>, ApiError> {
        let path = format!(
            "{}/employee/{}",
            ATTENDANCE_PATH,
            urlencoding::encode(employee_id)
        );
        let query = QueryParams::new()
            .with_opt("start_date", start_date)
            .with_opt("end_date", end_date);
        self.get(&path, query).await
    }

    // ===== Dashboard =====

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get(DASHBOARD_STATS_PATH, QueryParams::new()).await
    }

    pub async fn health_check(&self) -> Result<HealthStatus, ApiError> {
        self.get(HEALTH_PATH, QueryParams::new()).await
    }

    // ===== Cache Utilities =====

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Drop stale cache entries; returns how many were removed
    pub fn clear_expired_cache(&self) -> usize {
        self.cache.clear_expired()
    }

    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }
}

// ============================================================================
// Tests
// ============================================================================
