use rampart_config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CsrfError {
    #[error("Invalid CSRF configuration: {0}")]
    InvalidConfig(String),

    #[error("Missing CSRF token")]
    MissingToken,

    #[error("Invalid CSRF token")]
    InvalidToken,

    #[error("CSRF token value cannot be stored in cookie '{0}'")]
    InvalidCookieValue(String),

    #[error("Failed to write CSRF cookie: {0}")]
    Transport(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, CsrfError>;
