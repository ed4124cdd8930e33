//! Request description types consumed by `ApiClient::send`.

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use reqwest::Method;
use serde_json::Value;

/// Query parameters in insertion order.
///
/// Parameters without a value are never recorded, so they appear neither
/// in the request URL nor in the cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl ToString) -> Self {
        self.pairs.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_opt<V: ToString>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.with(name, v),
            None => self,
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Outgoing request body.
pub enum Payload {
    Json(Value),
    /// Multipart form, used for employee creation with an optional photo.
    Multipart(Form),
}

impl std::fmt::Debug for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Payload::Multipart(_) => f.write_str("Multipart(..)"),
        }
    }
}

/// A single call against the backend, relative to the client's base URL.
#[derive(Debug)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: QueryParams,
    pub payload: Option<Payload>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            payload: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.payload = Some(Payload::Json(body));
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.payload = Some(Payload::Multipart(form));
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// GET is the only method served from and stored into the cache.
    pub fn is_cacheable(&self) -> bool {
        self.method == Method::GET
    }
}

/// Pick the `Content-Type` for a request body.
///
/// Multipart bodies must go out without an explicit content type so the
/// HTTP client can write the boundary itself. JSON bodies default to
/// `application/json` but keep a caller-supplied content type.
pub fn apply_content_type(headers: &mut HeaderMap, payload: Option<&Payload>) {
    match payload {
        Some(Payload::Multipart(_)) => {
            headers.remove(header::CONTENT_TYPE);
        }
        Some(Payload::Json(_)) => {
            headers
                .entry(header::CONTENT_TYPE)
                .or_insert_with(|| HeaderValue::from_static("application/json"));
        }
        None => {}
    }
}
