use std::fmt;

/// Cache key: request path plus query parameters serialized in sorted order.
///
/// Sorting makes `?skip=0&limit=10` and `?limit=10&skip=0` the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    path: String,
    params: String,
}

impl CacheKey {
    pub fn new(path: &str, params: &[(String, String)]) -> Self {
        let mut sorted: Vec<(&str, &str)> = params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        sorted.sort();

        // A Vec of string pairs always serializes
        let params = serde_json::to_string(&sorted).unwrap_or_default();

        Self {
            path: path.to_string(),
            params,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}?{}", self.path, self.params)
    }
}
