//! Formatting of log records onto stderr.

use crate::{Format, Level, LogConfig};
use std::io::Write;

pub(crate) fn write(config: &LogConfig, level: Level, target: &str, message: &str) {
    let line = match config.format {
        Format::Pretty => pretty(config, level, target, message),
        Format::Compact => compact(config, level, target, message),
        Format::Json => json(config, level, target, message),
    };
    let _ = writeln!(std::io::stderr().lock(), "{}", line);
}

fn pretty(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    let mut line = String::new();
    if config.timestamps {
        line.push_str(&chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f ").to_string());
    }
    line.push_str(&format!("{:5} ", level.as_str()));
    if !target.is_empty() {
        line.push_str(&format!("[{}] ", target));
    }
    line.push_str(message);
    line
}

fn compact(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    let mut line = String::new();
    if config.timestamps {
        line.push_str(&chrono::Local::now().format("%H:%M:%S ").to_string());
    }
    line.push(level.as_str().chars().next().unwrap_or('?'));
    line.push(' ');
    if !target.is_empty() {
        line.push_str(target);
        line.push_str(": ");
    }
    line.push_str(message);
    line
}

#[cfg(feature = "json")]
fn json(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    use serde::Serialize;

    #[derive(Serialize)]
    struct Record<'a> {
        #[serde(skip_serializing_if = "Option::is_none")]
        timestamp: Option<String>,
        level: &'a str,
        target: &'a str,
        message: &'a str,
    }

    let record = Record {
        timestamp: config.timestamps.then(|| chrono::Utc::now().to_rfc3339()),
        level: level.as_str(),
        target,
        message,
    };

    serde_json::to_string(&record).unwrap_or_else(|_| message.to_string())
}

#[cfg(not(feature = "json"))]
fn json(config: &LogConfig, level: Level, target: &str, message: &str) -> String {
    compact(config, level, target, message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn untimed(format: Format) -> LogConfig {
        LogConfig {
            format,
            timestamps: false,
            ..LogConfig::default()
        }
    }

    #[test]
    fn test_pretty_line() {
        let line = pretty(&untimed(Format::Pretty), Level::Warn, "rampart::csrf", "hello");
        assert_eq!(line, "WARN  [rampart::csrf] hello");
    }

    #[test]
    fn test_compact_line() {
        let line = compact(&untimed(Format::Compact), Level::Debug, "t", "msg");
        assert_eq!(line, "D t: msg");
    }

    #[cfg(feature = "json")]
    #[test]
    fn test_json_line_escapes_message() {
        let line = json(&untimed(Format::Json), Level::Info, "t", "say \"hi\"");
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "INFO");
        assert_eq!(value["message"], "say \"hi\"");
        assert!(value.get("timestamp").is_none());
    }
}
