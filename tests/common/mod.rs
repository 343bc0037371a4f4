// Shared test helpers
#![allow(dead_code)]

use shotvault::config::AppConfig;
use shotvault::models::{NewImage, NewScreenshot};
use shotvault::screenshot_repo::ScreenshotRepo;
use tempfile::TempDir;

pub const TEST_API_KEY: &str = "test-key";

pub const TEST_CONFIG: &str = r#"
[server]
port = 5001
host = "127.0.0.1"

[database]
path = "data/test.db"
max_pool_size = 2

[auth]
api_key = "test-key"
"#;

pub fn test_app_config() -> AppConfig {
    AppConfig::load_from_str(TEST_CONFIG).unwrap()
}

/// Fresh, initialized repo in a temp dir. Keep the TempDir alive for the test's duration.
pub async fn temp_repo() -> (TempDir, ScreenshotRepo) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("screenshots.db");
    let repo = ScreenshotRepo::connect(path.to_str().unwrap(), 2)
        .await
        .unwrap();
    repo.init().await.unwrap();
    (dir, repo)
}

pub fn new_screenshot(computer_name: &str, location: &str) -> NewScreenshot {
    NewScreenshot {
        computer_name: computer_name.into(),
        system: "Windows 10".into(),
        processor: "Intel Core i7".into(),
        public_ip: "192.168.1.1".into(),
        location: location.into(),
        image: Some(NewImage {
            bytes: format!("png:{}", computer_name).into_bytes(),
            content_type: "image/png".into(),
        }),
    }
}
