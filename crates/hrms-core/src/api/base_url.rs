/// Rewrite common misconfigurations of an environment-supplied base URL.
///
/// - `:8000` becomes `http://localhost:8000`
/// - `//host` becomes `http://host`
/// - a bare `host:port` gets an `http://` prefix
///
/// A trailing slash is stripped. Anything else is returned unchanged.
pub fn normalize_base_url(raw: &str) -> String {
    let raw = raw.trim();

    let mut url = if raw.starts_with(':') {
        format!("http://localhost{}", raw)
    } else if raw.starts_with("//") {
        format!("http:{}", raw)
    } else if !has_http_scheme(raw) && is_bare_host_port(raw) {
        format!("http://{}", raw)
    } else {
        raw.to_string()
    };

    if url.ends_with('/') {
        url.pop();
    }
    url
}

fn has_http_scheme(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// `host:port` where host is `[A-Za-z0-9_.-]+` and port is all digits
fn is_bare_host_port(s: &str) -> bool {
    let Some((host, port)) = s.rsplit_once(':') else {
        return false;
    };
    !host.is_empty()
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.' || c == '-')
        && !port.is_empty()
        && port.chars().all(|c| c.is_ascii_digit())
}
