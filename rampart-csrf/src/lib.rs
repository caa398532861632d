//! # Rampart CSRF
//!
//! Cookie-backed storage of anti-forgery tokens for the synchronizer token
//! pattern.
//!
//! ## Features
//!
//! - **Token repository** - generate, save and load tokens through the
//!   [`CsrfTokenRepository`] trait
//! - **Cookie policy** - name, path, domain, max-age, `Secure` (fixed or
//!   following the request transport), `HttpOnly`, `SameSite`
//! - **Lazy operations** - repository futures touch the exchange only when
//!   awaited
//! - **Request guard** - reject state-changing requests that do not echo the
//!   stored token
//! - **File and env configuration** - via `rampart-config`
//!
//! ## Quick Start
//!
//! ```rust
//! use rampart_csrf::{CookieCsrfConfig, CookieCsrfTokenRepository, CsrfGuard};
//!
//! let config = CookieCsrfConfig::new()
//!     .with_cookie_max_age(3600)
//!     .with_cookie_path("/app");
//!
//! let repository = CookieCsrfTokenRepository::new(config).unwrap();
//! let guard = CsrfGuard::new(repository);
//! ```
//!
//! ## Round Trip
//!
//! ```rust
//! use rampart_csrf::*;
//!
//! tokio_test::block_on(async {
//!     let repository = CookieCsrfTokenRepository::default();
//!
//!     // First response issues the cookie
//!     let mut exchange = ServerExchange::new(ServerRequest::get("/form"));
//!     let token = repository.generate_token(&exchange).await;
//!     repository.save_token(&mut exchange, Some(&token)).await.unwrap();
//!
//!     // The browser sends it back on the next request
//!     let next = exchange.response().apply_to(ServerRequest::post("/submit"));
//!     let loaded = repository.load_token(&ServerExchange::new(next)).await;
//!     assert_eq!(loaded, Some(token));
//! });
//! ```

pub mod config;
pub mod error;
pub mod exchange;
pub mod guard;
pub mod repository;
pub mod response_cookie;
pub mod token;

pub use config::{
    CookieCsrfConfig, DEFAULT_CSRF_COOKIE_NAME, DEFAULT_CSRF_HEADER_NAME,
    DEFAULT_CSRF_PARAMETER_NAME, SameSite, SecurePolicy,
};
pub use error::{CsrfError, Result};
pub use exchange::{ServerExchange, ServerRequest, ServerResponse, SslInfo};
pub use guard::CsrfGuard;
pub use repository::{CookieCsrfTokenRepository, CsrfTokenRepository};
pub use response_cookie::ResponseCookie;
pub use token::CsrfToken;
