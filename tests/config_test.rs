//! Tests for configuration loading and validation.

use noughts_lobby::LobbyConfig;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_defaults() {
    let config = LobbyConfig::default();
    assert_eq!(config.host(), "127.0.0.1");
    assert_eq!(*config.port(), 3000);
    assert_eq!(config.reaper_interval(), Duration::from_secs(30));
    assert_eq!(*config.default_page_size(), 10);
    assert_eq!(config.delivery_timeout(), Duration::from_millis(2000));
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_full_file() {
    let file = write_config(
        r#"
host = "0.0.0.0"
port = 8080
reaper_interval_secs = 5
default_page_size = 3
delivery_timeout_ms = 250
"#,
    );

    let config = LobbyConfig::from_file(file.path()).unwrap();
    assert_eq!(config.host(), "0.0.0.0");
    assert_eq!(*config.port(), 8080);
    assert_eq!(config.reaper_interval(), Duration::from_secs(5));
    assert_eq!(*config.default_page_size(), 3);
    assert_eq!(config.delivery_timeout(), Duration::from_millis(250));
}

#[test]
fn test_missing_keys_keep_defaults() {
    let file = write_config("port = 4000\n");
    let config = LobbyConfig::from_file(file.path()).unwrap();
    assert_eq!(config, LobbyConfig::default().with_port(4000));
}

#[test]
fn test_malformed_file_is_rejected() {
    let file = write_config("port = \"not a number\"\n");
    let err = LobbyConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("parse"));
}

#[test]
fn test_missing_file_is_rejected() {
    let err = LobbyConfig::from_file("/nonexistent/lobby.toml").unwrap_err();
    assert!(err.message.contains("read"));
}

#[test]
fn test_zero_interval_is_rejected() {
    let file = write_config("reaper_interval_secs = 0\n");
    assert!(LobbyConfig::from_file(file.path()).is_err());

    let config = LobbyConfig::default().with_delivery_timeout_ms(0);
    assert!(config.validate().is_err());
}
