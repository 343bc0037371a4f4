// Config loading and validation tests

use shotvault::config::AppConfig;

const VALID_CONFIG: &str = r#"
[server]
port = 5001
host = "0.0.0.0"

[database]
path = "data/screenshots.db"
max_pool_size = 4

[auth]
api_key = "from-file"

[upload]
require_image = false
max_body_bytes = 1024

[query]
max_per_page = 50
default_per_page = 20
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 5001);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.database.path, "data/screenshots.db");
    assert_eq!(config.database.max_pool_size, 4);
    assert_eq!(config.auth.api_key, "from-file");
    assert!(!config.upload.require_image);
    assert_eq!(config.upload.max_body_bytes, 1024);
    assert_eq!(config.upload.default_content_type, "image/png");
    assert_eq!(config.query.max_per_page, 50);
    assert_eq!(config.query.default_per_page, 20);
    assert_eq!(config.query.max_ids, 500);
    assert!(!config.query.require_selector);
}

#[test]
fn test_config_optional_sections_default() {
    let minimal = r#"
[server]
port = 5001
host = "127.0.0.1"

[database]
path = "x.db"

[auth]
api_key = "k"
"#;
    let config = AppConfig::load_from_str(minimal).unwrap();
    assert_eq!(config.database.max_pool_size, 5);
    assert!(config.upload.require_image);
    assert_eq!(config.upload.max_body_bytes, 16 * 1024 * 1024);
    assert_eq!(config.query.default_per_page, 10);
    assert_eq!(config.query.max_per_page, 100);
}

#[test]
fn test_env_key_overrides_file_key() {
    let config =
        AppConfig::load_with_key_override(VALID_CONFIG, Some("from-env".into())).unwrap();
    assert_eq!(config.auth.api_key, "from-env");

    let blank = AppConfig::load_with_key_override(VALID_CONFIG, Some("  ".into())).unwrap();
    assert_eq!(blank.auth.api_key, "from-file");
}

#[test]
fn test_config_validation_rejects_missing_api_key() {
    let bad = VALID_CONFIG.replace("api_key = \"from-file\"", "api_key = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("auth.api_key"));
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 5001", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_empty_db_path() {
    let bad = VALID_CONFIG.replace("path = \"data/screenshots.db\"", "path = \"\"");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("database.path"));
}

#[test]
fn test_config_validation_rejects_max_pool_size_zero() {
    let bad = VALID_CONFIG.replace("max_pool_size = 4", "max_pool_size = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_pool_size"));
}

#[test]
fn test_config_validation_rejects_default_above_max_per_page() {
    let bad = VALID_CONFIG.replace("default_per_page = 20", "default_per_page = 80");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("default_per_page"));
}

#[test]
fn test_config_validation_rejects_zero_body_limit() {
    let bad = VALID_CONFIG.replace("max_body_bytes = 1024", "max_body_bytes = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_body_bytes"));
}

#[test]
fn test_config_validation_rejects_non_image_default_content_type() {
    for bad_type in ["text/html", "image/svg+xml", ""] {
        let bad = VALID_CONFIG.replace(
            "max_body_bytes = 1024",
            &format!("max_body_bytes = 1024\ndefault_content_type = \"{}\"", bad_type),
        );
        let err = AppConfig::load_from_str(&bad).unwrap_err();
        assert!(err.to_string().contains("default_content_type"), "{bad_type}");
    }
}

#[test]
fn test_config_missing_section_fails() {
    let bad = VALID_CONFIG.replace("[auth]\napi_key = \"from-file\"\n", "");
    assert!(AppConfig::load_from_str(&bad).is_err());
}

#[test]
fn test_debug_output_redacts_api_key() {
    let config = AppConfig::load_from_str(VALID_CONFIG).unwrap();
    let dbg = format!("{:?}", config);
    assert!(!dbg.contains("from-file"));
    assert!(dbg.contains("<redacted>"));
}
