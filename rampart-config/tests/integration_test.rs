//! Integration tests for rampart-config

use rampart_config::*;
use serde::Deserialize;
use std::io::Write;

#[derive(Debug, Deserialize)]
#[serde(default)]
struct CookieSettings {
    cookie_name: String,
    cookie_path: String,
    cookie_max_age: i64,
    cookie_http_only: bool,
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self {
            cookie_name: "XSRF-TOKEN".to_string(),
            cookie_path: "/".to_string(),
            cookie_max_age: -1,
            cookie_http_only: true,
        }
    }
}

impl Validate for CookieSettings {
    fn validate(&self) -> Result<()> {
        ConfigValidator::is_http_token(&self.cookie_name, "cookie_name")?;
        ConfigValidator::starts_with(&self.cookie_path, "/", "cookie_path")
    }
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
    path
}

#[test]
fn test_load_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(
        &dir,
        "csrf.toml",
        "cookie_name = \"csrf\"\ncookie_max_age = 600\n",
    );

    let manager = ConfigManager::new();
    manager.load_file(&path).unwrap();

    let settings: CookieSettings = manager.load_validated().unwrap();
    assert_eq!(settings.cookie_name, "csrf");
    assert_eq!(settings.cookie_max_age, 600);
    assert_eq!(settings.cookie_path, "/");
}

#[test]
fn test_json_file_overrides_toml() {
    let dir = tempfile::tempdir().unwrap();
    let base = write_file(&dir, "base.toml", "cookie_name = \"csrf\"\ncookie_path = \"/app\"\n");
    let local = write_file(&dir, "local.json", r#"{"cookie_http_only": false, "cookie_path": "/"}"#);

    let manager = ConfigManager::new();
    manager.load_file(&base).unwrap();
    manager.load_file(&local).unwrap();

    let settings: CookieSettings = manager.load_validated().unwrap();
    assert_eq!(settings.cookie_name, "csrf");
    assert_eq!(settings.cookie_path, "/");
    assert!(!settings.cookie_http_only);
}

#[test]
fn test_env_file_values_are_strings() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, ".env", "COOKIE_NAME=csrf\nCOOKIE_PATH=/app\n");

    let value = ConfigLoader::auto(&path).unwrap().load_file(&path).unwrap();
    assert_eq!(value["COOKIE_NAME"], "csrf");
    assert_eq!(value["COOKIE_PATH"], "/app");
}

#[test]
fn test_invalid_settings_fail_validation() {
    let manager = ConfigManager::new();
    manager
        .load_str("cookie_path = \"app\"", FileFormat::Toml)
        .unwrap();

    let result = manager.load_validated::<CookieSettings>();
    assert!(matches!(result, Err(ConfigError::ValidationError(_))));
}

#[test]
fn test_missing_file_is_load_error() {
    let manager = ConfigManager::new();
    let result = manager.load_file("/nonexistent/rampart/csrf.toml");
    assert!(matches!(result, Err(ConfigError::LoadError(_))));
}

#[test]
fn test_unsupported_extension() {
    assert!(ConfigLoader::auto("settings.yaml").is_err());
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let manager = ConfigManager::new();
    let result = manager.load_str("cookie_name = ", FileFormat::Toml);
    assert!(matches!(result, Err(ConfigError::ParseError(_))));
}
