use super::*;
use crate::provider::ErrorKind;
use crate::provider::test_server::{self, serve_once};

fn provider_at(url: &str) -> AnthropicProvider {
    AnthropicProvider::new(Duration::from_secs(5))
        .with_endpoint(url)
        .with_client(test_server::client())
}

#[test]
fn test_split_system_lifts_leading_system_message() {
    let messages = [
        Message::new(Role::System, "You are a helpful assistant."),
        Message::new(Role::User, "Hello"),
        Message::new(Role::Assistant, "Hi there"),
        Message::new(Role::User, "Who wrote this?"),
    ];

    let (system, turns) = AnthropicProvider::split_system(&messages);

    assert_eq!(system.as_deref(), Some("You are a helpful assistant."));
    assert_eq!(turns.len(), 3);
    assert_eq!(turns[0].role, "user");
    assert_eq!(turns[1].role, "assistant");
    assert_eq!(turns[2].content, "Who wrote this?");
    assert!(turns.iter().all(|t| t.content != "You are a helpful assistant."));
}

#[test]
fn test_split_system_lifts_system_message_after_turns() {
    let messages = [
        Message::new(Role::User, "Hello"),
        Message::new(Role::System, "Be brief."),
        Message::new(Role::User, "Who wrote this?"),
    ];

    let (system, turns) = AnthropicProvider::split_system(&messages);

    assert_eq!(system.as_deref(), Some("Be brief."));
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].content, "Hello");
    assert_eq!(turns[1].content, "Who wrote this?");
}

#[test]
fn test_split_system_keeps_first_of_several() {
    let messages = [
        Message::new(Role::System, "You help readers."),
        Message::new(Role::User, "Hello"),
        Message::new(Role::System, "A stale prompt."),
    ];

    let (system, turns) = AnthropicProvider::split_system(&messages);

    assert_eq!(system.as_deref(), Some("You help readers."));
    assert_eq!(turns.len(), 1);
    assert!(turns.iter().all(|t| t.role == "user"));
}

#[test]
fn test_split_system_without_system_message() {
    let messages = [Message::new(Role::User, "Hello")];

    let (system, turns) = AnthropicProvider::split_system(&messages);

    assert_eq!(system, None);
    assert_eq!(turns.len(), 1);
}

#[test]
fn test_api_request_serialization() {
    let request = AnthropicProvider::build_request(
        &[Message::new(Role::User, "Hello, Claude")],
        RequestOptions::default().resolve(DEFAULT_MODEL),
    );

    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["model"], "claude-3-5-sonnet-20241022");
    assert_eq!(json["max_tokens"], 1000);
    assert_eq!(json["messages"][0]["role"], "user");
    assert_eq!(json["messages"][0]["content"], "Hello, Claude");
    assert!(json.get("system").is_none());
}

#[test]
fn test_api_request_serialization_with_system() {
    let request = AnthropicProvider::build_request(
        &[
            Message::new(Role::System, "You are a helpful assistant."),
            Message::new(Role::User, "Hello"),
        ],
        RequestOptions::default().resolve(DEFAULT_MODEL),
    );

    let json = serde_json::to_value(&request).unwrap();

    assert_eq!(json["system"], "You are a helpful assistant.");
    assert_eq!(json["messages"].as_array().unwrap().len(), 1);
}

#[test]
fn test_extract_reply_first_block() {
    let provider = AnthropicProvider::new(Duration::from_secs(5));
    let body = r#"{
        "content": [
            {"type": "text", "text": "First part."},
            {"type": "text", "text": "Second part."}
        ]
    }"#;

    assert_eq!(provider.extract_reply(body).unwrap(), "First part.");
}

#[test]
fn test_extract_reply_empty_content_array() {
    let provider = AnthropicProvider::new(Duration::from_secs(5));
    let err = provider.extract_reply(r#"{"content": []}"#).unwrap_err();
    assert_eq!(err, ProviderError::EmptyResponse("Anthropic".to_string()));
}

#[test]
fn test_extract_reply_block_without_text() {
    let provider = AnthropicProvider::new(Duration::from_secs(5));
    let body = r#"{"content": [{"type": "text", "text": ""}]}"#;
    assert_eq!(provider.extract_reply(body).unwrap_err().kind(), ErrorKind::EmptyResponse);
}

#[test]
fn test_descriptor_and_models() {
    let provider = AnthropicProvider::new(Duration::from_secs(5));
    assert_eq!(provider.descriptor().name, "anthropic");
    assert!(provider.descriptor().auth_required);
    assert_eq!(provider.models()[0].id, "claude-3-5-sonnet-20241022");
    assert_eq!(provider.models().len(), 2);
}

#[tokio::test]
async fn test_chat_without_credential_sends_nothing() {
    let provider = provider_at("http://127.0.0.1:9/v1/messages");

    let err = provider
        .chat(
            &[Message::new(Role::User, "Hi")],
            &RequestOptions::default(),
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::MissingApiKey(msg) if msg.contains("Anthropic")));
}

#[tokio::test]
async fn test_chat_success_sends_headers_and_system_field() {
    let server = serve_once(
        "200 OK",
        r#"{"content":[{"type":"text","text":"Call me Ishmael."}]}"#,
    )
    .await;
    let provider = provider_at(&server.url);
    let messages = [
        Message::new(Role::System, "Book context."),
        Message::new(Role::User, "How does it open?"),
    ];
    let options = RequestOptions {
        model: Some("claude-3-haiku-20240307".to_string()),
        temperature: Some(0.3),
        max_tokens: Some(200),
    };

    let reply = provider
        .chat(&messages, &options, Some("sk-ant-test"))
        .await
        .unwrap();
    assert_eq!(reply, "Call me Ishmael.");

    let request = server.request().await;
    assert_eq!(request.header("x-api-key").as_deref(), Some("sk-ant-test"));
    assert_eq!(
        request.header("anthropic-version").as_deref(),
        Some("2023-06-01")
    );
    let body = request.json();
    assert_eq!(body["model"], "claude-3-haiku-20240307");
    assert_eq!(body["max_tokens"], 200);
    assert_eq!(body["system"], "Book context.");
    assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    assert_eq!(body["messages"][0]["role"], "user");
}

#[tokio::test]
async fn test_chat_empty_content_is_empty_response() {
    let server = serve_once("200 OK", r#"{"content":[]}"#).await;
    let provider = provider_at(&server.url);

    let err = provider
        .chat(
            &[Message::new(Role::User, "Hi")],
            &RequestOptions::default(),
            Some("sk-ant-test"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::EmptyResponse);
}

#[tokio::test]
async fn test_chat_overloaded_carries_provider_message() {
    let server = serve_once(
        "529 Site Overloaded",
        r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
    )
    .await;
    let provider = provider_at(&server.url);

    let err = provider
        .chat(
            &[Message::new(Role::User, "Hi")],
            &RequestOptions::default(),
            Some("sk-ant-test"),
        )
        .await
        .unwrap_err();

    assert!(matches!(
        &err,
        ProviderError::Status { status: 529, detail: Some(d), .. } if d == "Overloaded"
    ));
}
