//! Framework-neutral request/response views.
//!
//! The repository only needs cookie lookup and the transport security of the
//! request, and a place to put response cookies. These types carry exactly
//! that, plus enough of the request (method, path, headers, query, body) for
//! [`crate::CsrfGuard`] to find the echoed token.

use crate::error::{CsrfError, Result};
use crate::response_cookie::ResponseCookie;
use cookie::Cookie;
use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use rampart_log::warn;
use std::collections::{BTreeMap, HashMap};

/// TLS session details of the connection a request arrived on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SslInfo {
    session_id: Option<String>,
}

impl SslInfo {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }
}

/// Inbound request view
#[derive(Debug, Clone)]
pub struct ServerRequest {
    method: Method,
    path: String,
    headers: HeaderMap,
    query_params: HashMap<String, String>,
    body: Vec<u8>,
    ssl_info: Option<SslInfo>,
}

impl ServerRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query_params: HashMap::new(),
            body: Vec::new(),
            ssl_info: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append a header. Names or values that are not valid HTTP are dropped
    /// with a warning.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => warn!("Ignoring invalid request header '{}'", name),
        }
        self
    }

    /// Add a `name=value` pair to the request cookies
    pub fn with_cookie(self, name: &str, value: &str) -> Self {
        self.with_header(COOKIE.as_str(), &format!("{}={}", name, value))
    }

    /// Remove every cookie called `name`, keeping the other pairs
    pub fn without_cookie(mut self, name: &str) -> Self {
        let kept: Vec<String> = self
            .headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| {
                Cookie::split_parse(header)
                    .filter_map(|c| c.ok())
                    .filter(|c| c.name() != name)
                    .map(|c| format!("{}={}", c.name(), c.value()))
                    .collect::<Vec<_>>()
            })
            .collect();

        self.headers.remove(COOKIE);
        if !kept.is_empty() {
            if let Ok(value) = HeaderValue::from_str(&kept.join("; ")) {
                self.headers.insert(COOKIE, value);
            }
        }
        self
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Mark the request as received over TLS
    pub fn with_ssl_info(mut self, ssl_info: SslInfo) -> Self {
        self.ssl_info = Some(ssl_info);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn query(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn ssl_info(&self) -> Option<&SslInfo> {
        self.ssl_info.as_ref()
    }

    /// Whether TLS session info was observed for this request
    pub fn is_secure(&self) -> bool {
        self.ssl_info.is_some()
    }

    /// Raw value of the first cookie named exactly `name`.
    ///
    /// Pairs that fail to parse (for instance a bare name without `=`) are
    /// skipped, so a malformed cookie reads as an absent one.
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .find_map(|header| {
                Cookie::split_parse(header)
                    .filter_map(|c| c.ok())
                    .find(|c| c.name() == name)
                    .map(|c| c.value().to_string())
            })
    }
}

impl<B: Into<Vec<u8>>> From<http::Request<B>> for ServerRequest {
    fn from(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();

        let query_params = parts
            .uri
            .query()
            .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
            .map(|pairs| pairs.into_iter().collect())
            .unwrap_or_default();

        Self {
            method: parts.method,
            path: parts.uri.path().to_string(),
            headers: parts.headers,
            query_params,
            body: body.into(),
            ssl_info: parts.extensions.get::<SslInfo>().cloned(),
        }
    }
}

/// Outbound response view. Holds at most one cookie per name; the last
/// write wins.
#[derive(Debug, Clone, Default)]
pub struct ServerResponse {
    cookies: BTreeMap<String, ResponseCookie>,
}

impl ServerResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_cookie(&mut self, cookie: ResponseCookie) {
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    pub fn cookie(&self, name: &str) -> Option<&ResponseCookie> {
        self.cookies.get(name)
    }

    pub fn cookies(&self) -> impl Iterator<Item = &ResponseCookie> {
        self.cookies.values()
    }

    pub fn has_cookies(&self) -> bool {
        !self.cookies.is_empty()
    }

    /// Append one `Set-Cookie` header per cookie
    pub fn write_headers(&self, headers: &mut HeaderMap) -> Result<()> {
        for cookie in self.cookies.values() {
            let value = HeaderValue::from_str(&cookie.to_header_value()).map_err(|e| {
                CsrfError::Transport(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("cookie '{}' is not a valid header value: {}", cookie.name, e),
                ))
            })?;
            headers.append(SET_COOKIE, value);
        }
        Ok(())
    }

    /// Follow-up request as a browser would send it: cookies from this
    /// response replace same-named request cookies, and deletion cookies
    /// (`Max-Age=0`) remove them.
    pub fn apply_to(&self, request: ServerRequest) -> ServerRequest {
        self.cookies.values().fold(request, |request, cookie| {
            let request = request.without_cookie(&cookie.name);
            if cookie.is_removal() {
                request
            } else {
                request.with_cookie(&cookie.name, &cookie.value)
            }
        })
    }
}

/// Paired request and response for one HTTP interaction
#[derive(Debug, Clone)]
pub struct ServerExchange {
    request: ServerRequest,
    response: ServerResponse,
}

impl ServerExchange {
    pub fn new(request: ServerRequest) -> Self {
        Self {
            request,
            response: ServerResponse::new(),
        }
    }

    pub fn request(&self) -> &ServerRequest {
        &self.request
    }

    pub fn response(&self) -> &ServerResponse {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut ServerResponse {
        &mut self.response
    }

    pub fn into_parts(self) -> (ServerRequest, ServerResponse) {
        (self.request, self.response)
    }
}

impl From<ServerRequest> for ServerExchange {
    fn from(request: ServerRequest) -> Self {
        Self::new(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_lookup_by_exact_name() {
        let request = ServerRequest::get("/")
            .with_cookie("XSRF-TOKEN-OLD", "old")
            .with_cookie("XSRF-TOKEN", "abc");

        assert_eq!(request.cookie("XSRF-TOKEN").as_deref(), Some("abc"));
        assert_eq!(request.cookie("xsrf-token"), None);
        assert_eq!(request.cookie("missing"), None);
    }

    #[test]
    fn test_cookie_lookup_in_combined_header() {
        let request = ServerRequest::get("/").with_header("cookie", "a=1; XSRF-TOKEN=xyz; b=2");
        assert_eq!(request.cookie("XSRF-TOKEN").as_deref(), Some("xyz"));
        assert_eq!(request.cookie("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_valueless_cookie_reads_as_absent() {
        let request = ServerRequest::get("/").with_header("cookie", "XSRF-TOKEN");
        assert_eq!(request.cookie("XSRF-TOKEN"), None);
    }

    #[test]
    fn test_empty_cookie_value() {
        let request = ServerRequest::get("/").with_cookie("XSRF-TOKEN", "");
        assert_eq!(request.cookie("XSRF-TOKEN").as_deref(), Some(""));
    }

    #[test]
    fn test_without_cookie_keeps_others() {
        let request = ServerRequest::get("/")
            .with_header("cookie", "a=1; XSRF-TOKEN=xyz")
            .with_cookie("b", "2")
            .without_cookie("XSRF-TOKEN");

        assert_eq!(request.cookie("XSRF-TOKEN"), None);
        assert_eq!(request.cookie("a").as_deref(), Some("1"));
        assert_eq!(request.cookie("b").as_deref(), Some("2"));
    }

    #[test]
    fn test_invalid_header_is_ignored() {
        let request = ServerRequest::get("/").with_header("bad header", "v");
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_secure_only_with_ssl_info() {
        assert!(!ServerRequest::get("/").is_secure());

        let request = ServerRequest::get("/").with_ssl_info(SslInfo::new("session"));
        assert!(request.is_secure());
        assert_eq!(request.ssl_info().and_then(SslInfo::session_id), Some("session"));
    }

    #[test]
    fn test_from_http_request() {
        let mut request = http::Request::builder()
            .method(Method::POST)
            .uri("https://example.com/transfer?_csrf=abc&x=1")
            .header("cookie", "XSRF-TOKEN=abc")
            .body(b"amount=10".to_vec())
            .unwrap();
        request.extensions_mut().insert(SslInfo::new("tls"));

        let request = ServerRequest::from(request);
        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path(), "/transfer");
        assert_eq!(request.query("_csrf"), Some("abc"));
        assert_eq!(request.cookie("XSRF-TOKEN").as_deref(), Some("abc"));
        assert_eq!(request.body(), b"amount=10");
        assert!(request.is_secure());
    }

    #[test]
    fn test_last_cookie_write_wins() {
        let mut response = ServerResponse::new();
        response.set_cookie(ResponseCookie::new("XSRF-TOKEN", "first"));
        response.set_cookie(ResponseCookie::new("XSRF-TOKEN", "second"));

        assert_eq!(response.cookies().count(), 1);
        assert_eq!(response.cookie("XSRF-TOKEN").map(|c| c.value.as_str()), Some("second"));
    }

    #[test]
    fn test_write_headers() {
        let mut response = ServerResponse::new();
        response.set_cookie(ResponseCookie::new("a", "1"));
        response.set_cookie(ResponseCookie::new("b", "2"));

        let mut headers = HeaderMap::new();
        response.write_headers(&mut headers).unwrap();

        let values: Vec<_> = headers
            .get_all(SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(values, vec!["a=1", "b=2"]);
    }

    #[test]
    fn test_write_headers_rejects_invalid_value() {
        let mut response = ServerResponse::new();
        response.set_cookie(ResponseCookie::new("a", "line\nbreak"));

        let mut headers = HeaderMap::new();
        assert!(matches!(
            response.write_headers(&mut headers),
            Err(CsrfError::Transport(_))
        ));
    }

    #[test]
    fn test_apply_to_replaces_and_removes() {
        let mut response = ServerResponse::new();
        response.set_cookie(ResponseCookie::new("keep", "new"));
        let mut removal = ResponseCookie::new("gone", "");
        removal.max_age = 0;
        response.set_cookie(removal);

        let next = response.apply_to(
            ServerRequest::post("/")
                .with_cookie("keep", "old")
                .with_cookie("gone", "x")
                .with_cookie("other", "y"),
        );

        assert_eq!(next.cookie("keep").as_deref(), Some("new"));
        assert_eq!(next.cookie("gone"), None);
        assert_eq!(next.cookie("other").as_deref(), Some("y"));
    }
}
