// Rampart - cookie-backed CSRF protection for Rust HTTP services
//
// This library stores anti-forgery tokens in a client cookie and checks that
// state-changing requests echo them back.

// Re-export the CSRF repository, cookie policy and guard
pub use rampart_csrf::*;

// Re-export supporting crates
pub use rampart_config;
pub use rampart_log;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CookieCsrfConfig, CookieCsrfTokenRepository, CsrfError, CsrfGuard, CsrfToken,
        CsrfTokenRepository, ResponseCookie, SameSite, SecurePolicy, ServerExchange,
        ServerRequest, ServerResponse, SslInfo,
    };
}
