use serde::{Deserialize, Serialize};
use std::fmt;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// An issued anti-forgery token.
///
/// Besides the secret value it carries the names under which the client is
/// expected to echo it back: an HTTP header or a form/query parameter.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CsrfToken {
    header_name: String,
    parameter_name: String,
    token: String,
}

impl CsrfToken {
    pub fn new(
        header_name: impl Into<String>,
        parameter_name: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            header_name: header_name.into(),
            parameter_name: parameter_name.into(),
            token: token.into(),
        }
    }

    /// Create a token with a fresh random (UUID v4) value.
    pub fn generate(header_name: impl Into<String>, parameter_name: impl Into<String>) -> Self {
        Self::new(header_name, parameter_name, Uuid::new_v4().to_string())
    }

    pub fn header_name(&self) -> &str {
        &self.header_name
    }

    pub fn parameter_name(&self) -> &str {
        &self.parameter_name
    }

    /// The secret value.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Compare a client-supplied value against the secret in constant time.
    pub fn matches(&self, candidate: &str) -> bool {
        self.token.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfToken")
            .field("header_name", &self.header_name)
            .field("parameter_name", &self.parameter_name)
            .field("token", &"***")
            .finish()
    }
}
