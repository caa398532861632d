use crate::error::{CsrfError, Result};
use crate::exchange::{ServerExchange, ServerRequest};
use crate::repository::CsrfTokenRepository;
use crate::token::CsrfToken;
use http::Method;
use rampart_log::{debug, warn};
use std::sync::Arc;

/// CSRF protection for request handling.
///
/// Safe methods and excluded paths pass through. Any other request must
/// echo the stored token, either in the token's header or in its parameter
/// (URL-encoded or JSON body, then query string).
#[derive(Debug)]
pub struct CsrfGuard<R> {
    repository: Arc<R>,
    safe_methods: Vec<Method>,
    exclude_paths: Vec<String>,
}

impl<R> Clone for CsrfGuard<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            safe_methods: self.safe_methods.clone(),
            exclude_paths: self.exclude_paths.clone(),
        }
    }
}

impl<R: CsrfTokenRepository> CsrfGuard<R> {
    pub fn new(repository: R) -> Self {
        Self::shared(Arc::new(repository))
    }

    /// Guard over a repository that is also used elsewhere
    pub fn shared(repository: Arc<R>) -> Self {
        Self {
            repository,
            safe_methods: vec![Method::GET, Method::HEAD, Method::OPTIONS, Method::TRACE],
            exclude_paths: Vec::new(),
        }
    }

    pub fn with_safe_methods(mut self, methods: Vec<Method>) -> Self {
        self.safe_methods = methods;
        self
    }

    /// Path prefixes that are never checked (webhooks and the like)
    pub fn with_exclude_paths(mut self, paths: Vec<String>) -> Self {
        self.exclude_paths = paths;
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn needs_protection(&self, request: &ServerRequest) -> bool {
        if self.safe_methods.contains(request.method()) {
            return false;
        }

        !self
            .exclude_paths
            .iter()
            .any(|excluded| request.path().starts_with(excluded.as_str()))
    }

    /// The token for this exchange, issuing and saving a new one if the
    /// client has none yet.
    pub async fn ensure_token(&self, exchange: &mut ServerExchange) -> Result<CsrfToken> {
        if let Some(token) = self.repository.load_token(exchange).await {
            return Ok(token);
        }

        let token = self.repository.generate_token(exchange).await;
        self.repository.save_token(exchange, Some(&token)).await?;
        debug!("Issued new CSRF token for {}", exchange.request().path());
        Ok(token)
    }

    /// Check that a state-changing request echoes the stored token.
    pub async fn validate(&self, exchange: &ServerExchange) -> Result<()> {
        let request = exchange.request();
        if !self.needs_protection(request) {
            return Ok(());
        }

        let Some(expected) = self.repository.load_token(exchange).await else {
            warn!(
                "Rejected {} {}: no CSRF token stored",
                request.method(),
                request.path()
            );
            return Err(CsrfError::MissingToken);
        };

        let Some(actual) = actual_token(request, &expected) else {
            warn!(
                "Rejected {} {}: request did not provide '{}' header or '{}' parameter",
                request.method(),
                request.path(),
                expected.header_name(),
                expected.parameter_name()
            );
            return Err(CsrfError::MissingToken);
        };

        if !expected.matches(&actual) {
            warn!(
                "Rejected {} {}: CSRF token mismatch",
                request.method(),
                request.path()
            );
            return Err(CsrfError::InvalidToken);
        }

        Ok(())
    }

    /// Erase the stored token, e.g. on logout.
    pub async fn clear(&self, exchange: &mut ServerExchange) -> Result<()> {
        self.repository.save_token(exchange, None).await
    }
}

fn actual_token(request: &ServerRequest, expected: &CsrfToken) -> Option<String> {
    header_token(request, expected.header_name())
        .or_else(|| body_token(request, expected.parameter_name()))
        .or_else(|| request.query(expected.parameter_name()).map(str::to_string))
        .filter(|value| !value.is_empty())
}

fn header_token(request: &ServerRequest, header_name: &str) -> Option<String> {
    request
        .headers()
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn body_token(request: &ServerRequest, parameter_name: &str) -> Option<String> {
    let body = request.body();
    if body.is_empty() {
        return None;
    }

    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(body) {
        return json
            .get(parameter_name)
            .and_then(|value| value.as_str())
            .map(str::to_string);
    }

    serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
        .ok()?
        .into_iter()
        .find(|(key, _)| key == parameter_name)
        .map(|(_, value)| value)
}
