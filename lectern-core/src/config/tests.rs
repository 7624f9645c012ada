use super::*;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.provider, "openai");
    assert_eq!(config.api_key, None);
    assert_eq!(config.model, "gpt-4o-mini");
    assert_eq!(config.chat, ChatConfig::default());
    assert_eq!(config.endpoints, EndpointConfig::default());
}

#[test]
fn test_chat_config_defaults() {
    let chat = ChatConfig::default();
    assert_eq!(chat.temperature, 0.7);
    assert_eq!(chat.max_tokens, 1000);
    assert_eq!(chat.request_timeout_secs, 60);
    assert_eq!(chat.context_max_chars, 2000);
    assert_eq!(chat.preview_max_chars, 100);
}

#[test]
fn test_parse_minimal_toml() {
    let toml = r#"provider = "anthropic""#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.provider, "anthropic");
    assert_eq!(config.api_key, None);
    assert_eq!(config.model, "gpt-4o-mini"); // default
}

#[test]
fn test_parse_full_toml() {
    let toml = r#"
provider = "anthropic"
api_key = "sk-ant-test"
model = "claude-3-haiku-20240307"

[chat]
temperature = 0.2
max_tokens = 512
request_timeout_secs = 15
context_max_chars = 1200
preview_max_chars = 40

[endpoints]
openai = "http://localhost:8080/v1/chat/completions"
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.provider, "anthropic");
    assert_eq!(config.api_key, Some("sk-ant-test".to_string()));
    assert_eq!(config.model, "claude-3-haiku-20240307");
    assert_eq!(config.chat.temperature, 0.2);
    assert_eq!(config.chat.max_tokens, 512);
    assert_eq!(config.chat.request_timeout_secs, 15);
    assert_eq!(config.chat.context_max_chars, 1200);
    assert_eq!(config.chat.preview_max_chars, 40);
    assert_eq!(
        config.endpoints.openai.as_deref(),
        Some("http://localhost:8080/v1/chat/completions")
    );
    assert_eq!(config.endpoints.anthropic, None);
}

#[test]
fn test_parse_partial_chat_section() {
    let toml = r#"
[chat]
max_tokens = 256
"#;
    let config: Config = toml::from_str(toml).unwrap();
    assert_eq!(config.chat.max_tokens, 256);
    assert_eq!(config.chat.temperature, 0.7);
    assert_eq!(config.chat.context_max_chars, 2000);
}

#[test]
fn test_parse_empty_toml() {
    let config: Config = toml::from_str("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_load_from_path() {
    use std::io::Write;
    let dir = std::env::temp_dir();
    let path = dir.join("lectern_test_config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, r#"provider = "test-provider""#).unwrap();
    drop(file);

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.provider, "test-provider");

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_parse_invalid_toml() {
    use std::io::Write;
    let dir = std::env::temp_dir();
    let path = dir.join("lectern_invalid_config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, r#"invalid = ["#).unwrap();
    drop(file);

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(ConfigError::ParseError { .. })));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_load_from_nonexistent_file() {
    let result = Config::load_from("/nonexistent/path/config.toml");
    assert!(matches!(result, Err(ConfigError::IoError { .. })));
}

#[test]
fn test_api_key_env_var_names() {
    assert_eq!(api_key_env_var("openai"), Some("OPENAI_API_KEY"));
    assert_eq!(api_key_env_var("anthropic"), Some("ANTHROPIC_API_KEY"));
    assert_eq!(api_key_env_var("mock"), None);
}

#[test]
fn test_credential_from_config_for_unknown_provider() {
    let config = Config {
        api_key: Some("config-key".to_string()),
        ..Config::default()
    };
    assert_eq!(
        config.credential_for("custom"),
        Some("config-key".to_string())
    );
}

#[test]
fn test_credential_empty_config_key_is_absent() {
    let config = Config {
        api_key: Some(String::new()),
        ..Config::default()
    };
    assert_eq!(config.credential_for("custom"), None);
}

#[test]
fn test_credential_env_var_takes_precedence() {
    // SAFETY: This test is the only one touching ANTHROPIC_API_KEY
    unsafe { std::env::set_var("ANTHROPIC_API_KEY", "env-key-value") };

    let config = Config {
        api_key: Some("config-key-value".to_string()),
        ..Config::default()
    };
    assert_eq!(
        config.credential_for("anthropic"),
        Some("env-key-value".to_string())
    );

    // SAFETY: This test is the only one touching ANTHROPIC_API_KEY
    unsafe { std::env::remove_var("ANTHROPIC_API_KEY") };
}
