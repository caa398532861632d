use crate::config::CookieCsrfConfig;
use crate::error::{CsrfError, Result};
use crate::response_cookie::ResponseCookie;
use crate::exchange::ServerExchange;
use crate::token::CsrfToken;
use async_trait::async_trait;
use rampart_log::{debug, trace, warn};
use std::sync::Arc;

/// Storage of CSRF tokens between requests.
///
/// Implementations hold only configuration; all per-request state lives in
/// the [`ServerExchange`]. Every method returns a lazy future: nothing is
/// read or written until it is awaited.
///
/// # Examples
///
/// ```
/// use rampart_csrf::{CookieCsrfTokenRepository, CsrfTokenRepository, ServerExchange, ServerRequest};
///
/// tokio_test::block_on(async {
///     let repository = CookieCsrfTokenRepository::default();
///     let mut exchange = ServerExchange::new(ServerRequest::get("/form"));
///
///     let token = repository.generate_token(&exchange).await;
///     repository.save_token(&mut exchange, Some(&token)).await.unwrap();
///
///     let cookie = exchange.response().cookie("XSRF-TOKEN").unwrap();
///     assert_eq!(cookie.value, token.token());
/// });
/// ```
#[async_trait]
pub trait CsrfTokenRepository: Send + Sync {
    /// Create a new token. Nothing is persisted.
    async fn generate_token(&self, exchange: &ServerExchange) -> CsrfToken;

    /// Persist `token`, or erase the stored token when `None`.
    ///
    /// Fails without writing anything if the token cannot be stored.
    async fn save_token(
        &self,
        exchange: &mut ServerExchange,
        token: Option<&CsrfToken>,
    ) -> Result<()>;

    /// The stored token, or `None` if there is none (or it was erased).
    async fn load_token(&self, exchange: &ServerExchange) -> Option<CsrfToken>;
}

/// Keeps the token in a cookie on the client.
#[derive(Debug, Clone, Default)]
pub struct CookieCsrfTokenRepository {
    config: Arc<CookieCsrfConfig>,
}

impl CookieCsrfTokenRepository {
    /// Build a repository, rejecting an invalid cookie policy up front.
    pub fn new(config: CookieCsrfConfig) -> Result<Self> {
        config.check()?;
        debug!(
            "CSRF cookie repository configured: cookie '{}', header '{}', parameter '{}'",
            config.cookie_name, config.header_name, config.parameter_name
        );
        Ok(Self {
            config: Arc::new(config),
        })
    }

    /// Repository whose cookie can be read by client-side scripts
    pub fn http_only_false() -> Self {
        Self {
            config: Arc::new(CookieCsrfConfig::http_only_false()),
        }
    }

    pub fn config(&self) -> &CookieCsrfConfig {
        &self.config
    }
}

#[async_trait]
impl CsrfTokenRepository for CookieCsrfTokenRepository {
    async fn generate_token(&self, _exchange: &ServerExchange) -> CsrfToken {
        CsrfToken::generate(&self.config.header_name, &self.config.parameter_name)
    }

    async fn save_token(
        &self,
        exchange: &mut ServerExchange,
        token: Option<&CsrfToken>,
    ) -> Result<()> {
        let (value, max_age) = match token {
            Some(token) => (token.token().to_string(), self.config.cookie_max_age),
            None => (String::new(), 0),
        };

        if !ResponseCookie::is_valid_value(&value) {
            warn!(
                "Refusing to write CSRF cookie '{}': value is not a valid cookie value",
                self.config.cookie_name
            );
            return Err(CsrfError::InvalidCookieValue(self.config.cookie_name.clone()));
        }

        let cookie = self
            .config
            .cookie_for(value, max_age, exchange.request().is_secure());

        if cookie.is_removal() {
            debug!("Clearing CSRF cookie '{}'", cookie.name);
        } else {
            debug!(
                "Writing CSRF cookie '{}' (max-age {}, secure {})",
                cookie.name, cookie.max_age, cookie.secure
            );
        }

        exchange.response_mut().set_cookie(cookie);
        Ok(())
    }

    async fn load_token(&self, exchange: &ServerExchange) -> Option<CsrfToken> {
        let value = exchange.request().cookie(&self.config.cookie_name)?;

        if value.trim().is_empty() {
            trace!("CSRF cookie '{}' present but empty", self.config.cookie_name);
            return None;
        }

        Some(CsrfToken::new(
            &self.config.header_name,
            &self.config.parameter_name,
            value,
        ))
    }
}
