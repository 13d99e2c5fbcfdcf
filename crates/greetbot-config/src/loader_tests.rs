use super::*;
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

use crate::schema::VisionProviderKind;

#[test]
fn test_load_empty_config() {
    let config = ConfigLoader::load_str("").unwrap();
    assert_eq!(config.run.candidate_limit, 50);
}

#[test]
fn test_expand_path() {
    let expanded = ConfigLoader::expand_path("~/.greetbot");
    assert!(!expanded.starts_with('~'));
}

#[test]
fn test_load_full_config() {
    let content = r#"
        [browser]
        cdp_url = "http://127.0.0.1:9333"

        [vision]
        provider = "kimi"
        api_key = "sk-test"

        [run]
        job_description = "Rust后端，3年以上"
        candidate_limit = 10

        [pacing]
        between_candidates = { min_ms = 100, max_ms = 200 }

        [capture]
        max_height = 30000

        [selectors]
        card_name = ".geek-name"
    "#;
    let config = ConfigLoader::load_str(content).unwrap();
    assert_eq!(config.browser.cdp_url, "http://127.0.0.1:9333");
    assert_eq!(config.vision.provider, VisionProviderKind::Kimi);
    assert_eq!(config.vision.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.run.candidate_limit, 10);
    assert_eq!(config.pacing.between_candidates.max_ms, 200);
    assert_eq!(config.capture.max_height, 30000.0);
    assert_eq!(config.selectors.card_name, ".geek-name");
    // Unspecified selectors keep their defaults.
    assert_eq!(config.selectors.continue_text, "继续沟通");
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[run]").unwrap();
    writeln!(file, "daily_limit = 40").unwrap();

    let config = ConfigLoader::load(file.path()).unwrap();
    assert_eq!(config.run.daily_limit, 40);
}

#[test]
fn test_load_nonexistent_file() {
    let result = ConfigLoader::load(Path::new("/nonexistent/path/config.toml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_load_or_default_explicit_missing_is_error() {
    let result = ConfigLoader::load_or_default(Some(Path::new("/nonexistent/greetbot.toml")));
    assert!(result.is_err());
}

#[test]
fn test_load_invalid_toml() {
    let result = ConfigLoader::load_str("invalid = [unclosed");
    assert!(result.is_err());
}

#[test]
fn test_unknown_provider_rejected() {
    let result = ConfigLoader::load_str("[vision]\nprovider = \"claude\"");
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");
    let mut config = crate::schema::Config::default();
    config.run.job_description = "前端工程师".to_string();

    ConfigLoader::save(&config, &path).unwrap();
    let loaded = ConfigLoader::load(&path).unwrap();
    assert_eq!(loaded.run.job_description, "前端工程师");
}

#[test]
fn test_expand_env_vars() {
    // SAFETY: This test runs in isolation and sets a unique test-only env var
    unsafe {
        std::env::set_var("GREETBOT_TEST_KEY_VAR", "test_value");
    }
    let content = "[vision]\napi_key = \"${GREETBOT_TEST_KEY_VAR}\"";
    let config = ConfigLoader::load_str(content).unwrap();
    assert_eq!(config.vision.api_key.as_deref(), Some("test_value"));
    unsafe {
        std::env::remove_var("GREETBOT_TEST_KEY_VAR");
    }
}

#[test]
fn test_expand_env_vars_not_set() {
    let content = "value = \"${NONEXISTENT_GREETBOT_VAR_12345}\"";
    let result = ConfigLoader::expand_env_vars(content);
    assert!(matches!(result, Err(ConfigError::EnvVarNotSet(_))));
}

#[test]
fn test_expand_env_vars_no_vars() {
    let content = "value = \"no variables here\"";
    let expanded = ConfigLoader::expand_env_vars(content).unwrap();
    assert_eq!(expanded, content);
}

#[test]
fn test_expand_path_with_tilde() {
    let expanded = ConfigLoader::expand_path("~/test");
    assert!(!expanded.starts_with('~'));
    assert!(expanded.ends_with("/test"));
}
