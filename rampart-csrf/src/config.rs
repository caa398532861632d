use crate::error::{CsrfError, Result};
use crate::response_cookie::ResponseCookie;
use rampart_config::{
    ConfigError, ConfigLoader, ConfigManager, ConfigValidator, EnvLoader, FileFormat, Validate,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_CSRF_COOKIE_NAME: &str = "XSRF-TOKEN";
pub const DEFAULT_CSRF_HEADER_NAME: &str = "X-XSRF-TOKEN";
pub const DEFAULT_CSRF_PARAMETER_NAME: &str = "_csrf";

/// Cookie SameSite attribute. Parsed case-insensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

impl FromStr for SameSite {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(SameSite::Strict),
            "lax" => Ok(SameSite::Lax),
            "none" => Ok(SameSite::None),
            other => Err(format!("unknown SameSite value '{}'", other)),
        }
    }
}

impl TryFrom<String> for SameSite {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

/// How the `Secure` cookie flag is decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurePolicy {
    /// Secure iff the current request arrived over TLS
    #[default]
    Auto,
    Always,
    Never,
}

impl SecurePolicy {
    /// Decide the flag for one request. An explicit setting always wins.
    pub fn resolve(self, transport_secure: bool) -> bool {
        match self {
            SecurePolicy::Auto => transport_secure,
            SecurePolicy::Always => true,
            SecurePolicy::Never => false,
        }
    }
}

impl From<bool> for SecurePolicy {
    fn from(secure: bool) -> Self {
        if secure {
            SecurePolicy::Always
        } else {
            SecurePolicy::Never
        }
    }
}

impl FromStr for SecurePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(SecurePolicy::Auto),
            "true" | "1" | "always" => Ok(SecurePolicy::Always),
            "false" | "0" | "never" => Ok(SecurePolicy::Never),
            other => Err(format!("unknown secure policy '{}'", other)),
        }
    }
}

// Accepts `true`, `false` or a string such as "auto".
impl<'de> Deserialize<'de> for SecurePolicy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Word(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Flag(flag) => Ok(flag.into()),
            Raw::Word(word) => word.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Cookie policy of the cookie-backed token repository.
///
/// Built once and shared read-only between requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CookieCsrfConfig {
    /// Name of the cookie carrying the token
    pub cookie_name: String,

    /// Header the client echoes the token in
    pub header_name: String,

    /// Form or query parameter alternative to the header
    pub parameter_name: String,

    pub cookie_path: String,

    pub cookie_domain: Option<String>,

    /// Max-Age in seconds; negative means a session cookie
    pub cookie_max_age: i64,

    pub cookie_secure: SecurePolicy,

    pub cookie_http_only: bool,

    pub cookie_same_site: Option<SameSite>,
}

impl Default for CookieCsrfConfig {
    fn default() -> Self {
        Self {
            cookie_name: DEFAULT_CSRF_COOKIE_NAME.to_string(),
            header_name: DEFAULT_CSRF_HEADER_NAME.to_string(),
            parameter_name: DEFAULT_CSRF_PARAMETER_NAME.to_string(),
            cookie_path: "/".to_string(),
            cookie_domain: None,
            cookie_max_age: -1,
            cookie_secure: SecurePolicy::Auto,
            cookie_http_only: true,
            cookie_same_site: None,
        }
    }
}

impl CookieCsrfConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults, but with a cookie that client-side scripts can read so they
    /// can copy it into the request header.
    pub fn http_only_false() -> Self {
        Self::default().with_cookie_http_only(false)
    }

    pub fn with_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.cookie_name = name.into();
        self
    }

    pub fn with_header_name(mut self, name: impl Into<String>) -> Self {
        self.header_name = name.into();
        self
    }

    pub fn with_parameter_name(mut self, name: impl Into<String>) -> Self {
        self.parameter_name = name.into();
        self
    }

    pub fn with_cookie_path(mut self, path: impl Into<String>) -> Self {
        self.cookie_path = path.into();
        self
    }

    pub fn with_cookie_domain(mut self, domain: impl Into<String>) -> Self {
        self.cookie_domain = Some(domain.into());
        self
    }

    pub fn with_cookie_max_age(mut self, seconds: i64) -> Self {
        self.cookie_max_age = seconds;
        self
    }

    /// Pin the `Secure` flag instead of following the request transport
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure.into();
        self
    }

    pub fn with_secure_policy(mut self, policy: SecurePolicy) -> Self {
        self.cookie_secure = policy;
        self
    }

    pub fn with_cookie_http_only(mut self, http_only: bool) -> Self {
        self.cookie_http_only = http_only;
        self
    }

    pub fn with_cookie_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = Some(same_site);
        self
    }

    /// Concrete cookie for one save.
    ///
    /// Pure: depends only on the policy, the given value and max-age, and
    /// whether the current request was observed over TLS.
    pub fn cookie_for(
        &self,
        value: impl Into<String>,
        max_age: i64,
        transport_secure: bool,
    ) -> ResponseCookie {
        ResponseCookie {
            name: self.cookie_name.clone(),
            value: value.into(),
            max_age,
            domain: self.cookie_domain.clone(),
            path: Some(self.cookie_path.clone()),
            secure: self.cookie_secure.resolve(transport_secure),
            http_only: self.cookie_http_only,
            same_site: self.cookie_same_site,
        }
    }

    /// Load from a JSON, TOML or env file. Missing keys keep their defaults.
    ///
    /// Env files use the same keys as [`CookieCsrfConfig::from_env`] without
    /// a prefix (`COOKIE_NAME=...`).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let loader = ConfigLoader::auto(path)?;

        if loader.format() == FileFormat::Env {
            let vars = match loader.load_file(path)? {
                Value::Object(map) => map
                    .into_iter()
                    .filter_map(|(k, v)| v.as_str().map(|v| (k.to_lowercase(), v.to_string())))
                    .collect(),
                _ => HashMap::new(),
            };
            return Self::from_env_map(&vars);
        }

        let manager = ConfigManager::new();
        manager.load_file(path)?;
        Ok(manager.load_validated()?)
    }

    /// Load from `<prefix>_COOKIE_NAME`, `<prefix>_COOKIE_MAX_AGE`, ...
    pub fn from_env(prefix: &str) -> Result<Self> {
        let vars = EnvLoader::new(Some(prefix.to_string())).load();
        Self::from_env_map(&vars)
    }

    /// Build from already stripped, lowercased env keys such as `cookie_name`.
    pub fn from_env_map(vars: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();

        for (key, value) in vars {
            match key.as_str() {
                "cookie_name" => config.cookie_name = value.clone(),
                "header_name" => config.header_name = value.clone(),
                "parameter_name" => config.parameter_name = value.clone(),
                "cookie_path" => config.cookie_path = value.clone(),
                "cookie_domain" => {
                    config.cookie_domain = Some(value.clone()).filter(|d| !d.trim().is_empty())
                }
                "cookie_max_age" => config.cookie_max_age = parse_value(key, value)?,
                "cookie_secure" => config.cookie_secure = parse_value(key, value)?,
                "cookie_http_only" => config.cookie_http_only = parse_flag(key, value)?,
                "cookie_same_site" => config.cookie_same_site = Some(parse_value(key, value)?),
                _ => {}
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Fail-fast check run when a repository is built from this policy
    pub fn check(&self) -> Result<()> {
        self.validate()
            .map_err(|e| CsrfError::InvalidConfig(e.to_string()))
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        CsrfError::Config(ConfigError::ParseError(format!("{}: {}", key, e)))
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(CsrfError::Config(ConfigError::ParseError(format!(
            "{}: expected a boolean, got '{}'",
            key, other
        )))),
    }
}

impl Validate for CookieCsrfConfig {
    fn validate(&self) -> rampart_config::Result<()> {
        ConfigValidator::is_http_token(&self.cookie_name, "cookie_name")?;
        ConfigValidator::is_http_token(&self.header_name, "header_name")?;
        ConfigValidator::not_empty(&self.parameter_name, "parameter_name")?;
        ConfigValidator::starts_with(&self.cookie_path, "/", "cookie_path")?;
        if let Some(ref domain) = self.cookie_domain {
            ConfigValidator::not_empty(domain, "cookie_domain")?;
        }
        // Zero is reserved for the deletion cookie written on logout.
        ConfigValidator::not_zero(self.cookie_max_age, "cookie_max_age")?;
        Ok(())
    }
}
