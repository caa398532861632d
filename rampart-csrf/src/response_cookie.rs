use crate::config::SameSite;
use std::fmt;

/// A cookie to be emitted with the response.
///
/// `max_age` follows the usual convention: negative for a session cookie
/// (no `Max-Age` attribute), zero to delete the cookie, positive seconds
/// otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    pub max_age: i64,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: Option<SameSite>,
}

impl ResponseCookie {
    /// Session cookie with no attributes set
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: -1,
            domain: None,
            path: None,
            secure: false,
            http_only: false,
            same_site: None,
        }
    }

    /// Whether the value can be sent unquoted: RFC 6265 cookie-octets only,
    /// so no whitespace, `"`, `,`, `;` or `\`.
    pub fn is_valid_value(value: &str) -> bool {
        value
            .bytes()
            .all(|b| matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E))
    }

    pub fn is_session_cookie(&self) -> bool {
        self.max_age < 0
    }

    /// Whether this cookie instructs the client to delete its copy
    pub fn is_removal(&self) -> bool {
        self.max_age == 0
    }

    /// Render as a `Set-Cookie` header value
    pub fn to_header_value(&self) -> String {
        let mut header = format!("{}={}", self.name, self.value);

        if let Some(ref path) = self.path {
            header.push_str(&format!("; Path={}", path));
        }

        if let Some(ref domain) = self.domain {
            header.push_str(&format!("; Domain={}", domain));
        }

        if self.max_age >= 0 {
            header.push_str(&format!("; Max-Age={}", self.max_age));
        }

        if self.secure {
            header.push_str("; Secure");
        }

        if self.http_only {
            header.push_str("; HttpOnly");
        }

        if let Some(same_site) = self.same_site {
            header.push_str(&format!("; SameSite={}", same_site.as_str()));
        }

        header
    }
}

impl fmt::Display for ResponseCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_has_no_max_age() {
        let cookie = ResponseCookie::new("XSRF-TOKEN", "abc");
        assert!(cookie.is_session_cookie());
        assert_eq!(cookie.to_header_value(), "XSRF-TOKEN=abc");
    }

    #[test]
    fn test_full_attribute_order() {
        let cookie = ResponseCookie {
            name: "csrf".to_string(),
            value: "v".to_string(),
            max_age: 3600,
            domain: Some("example.com".to_string()),
            path: Some("/app".to_string()),
            secure: true,
            http_only: true,
            same_site: Some(SameSite::Strict),
        };

        assert_eq!(
            cookie.to_string(),
            "csrf=v; Path=/app; Domain=example.com; Max-Age=3600; Secure; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn test_value_octets() {
        assert!(ResponseCookie::is_valid_value(""));
        assert!(ResponseCookie::is_valid_value("3f2c1a9e-7b1d-4c8e-9a55-0d6e2f4b8c11"));
        assert!(ResponseCookie::is_valid_value("a=b/c+d"));
        assert!(!ResponseCookie::is_valid_value("a;b"));
        assert!(!ResponseCookie::is_valid_value(" padded "));
        assert!(!ResponseCookie::is_valid_value("x; Domain=evil.example"));
        assert!(!ResponseCookie::is_valid_value("\"quoted\""));
        assert!(!ResponseCookie::is_valid_value("a,b"));
        assert!(!ResponseCookie::is_valid_value("a\\b"));
        assert!(!ResponseCookie::is_valid_value("caf\u{e9}"));
    }

    #[test]
    fn test_removal_cookie() {
        let mut cookie = ResponseCookie::new("XSRF-TOKEN", "");
        cookie.max_age = 0;
        cookie.path = Some("/".to_string());

        assert!(cookie.is_removal());
        assert!(!cookie.is_session_cookie());
        assert_eq!(cookie.to_header_value(), "XSRF-TOKEN=; Path=/; Max-Age=0");
    }
}
