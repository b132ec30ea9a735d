//! HTTP-level tests for the OpenAI-compatible provider against a mock server

use serde_json::json;
use steward_provider::{
    ChatParams, Message, OpenAiCompatProvider, Provider, ProviderError, Tool, ToolCall,
};

fn provider_for(server: &mockito::ServerGuard) -> OpenAiCompatProvider {
    OpenAiCompatProvider::new(
        "test-key",
        Some(server.url()),
        Some("test-model".to_string()),
    )
}

fn params() -> ChatParams {
    ChatParams {
        model: "test-model".to_string(),
        messages: vec![Message::system("sys"), Message::user("list files")],
        tools: vec![Tool::new(
            "list_files",
            "List workspace files",
            json!({"type": "object", "properties": {}}),
        )],
        ..ChatParams::default()
    }
}

#[tokio::test]
async fn test_chat_text_answer() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(mockito::Matcher::PartialJson(json!({
            "model": "test-model",
            "tool_choice": "auto"
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "Nothing to do."},
                    "finish_reason": "stop"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = provider_for(&server).chat(params()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.content.as_deref(), Some("Nothing to do."));
    assert!(!response.has_tool_calls());
}

#[tokio::test]
async fn test_chat_tool_calls() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_1",
                            "type": "function",
                            "function": {"name": "list_files", "arguments": "{}"}
                        }]
                    },
                    "finish_reason": "tool_calls"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let response = provider_for(&server).chat(params()).await.unwrap();

    assert_eq!(
        response.tool_calls,
        vec![ToolCall::new("call_1", "list_files", "{}")]
    );
}

#[tokio::test]
async fn test_chat_api_error_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(json!({"error": {"message": "model not found"}}).to_string())
        .create_async()
        .await;

    let result = provider_for(&server).chat(params()).await;

    match result {
        Err(ProviderError::Api(msg)) => assert_eq!(msg, "model not found"),
        other => panic!("expected api error, got {:?}", other.map(|r| r.content)),
    }
}

#[tokio::test]
async fn test_chat_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body("slow down")
        .create_async()
        .await;

    let result = provider_for(&server).chat(params()).await;
    assert!(matches!(result, Err(ProviderError::RateLimited)));
}

#[tokio::test]
async fn test_chat_non_json_body_is_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let result = provider_for(&server).chat(params()).await;
    assert!(matches!(result, Err(ProviderError::Json(_))));
}

#[tokio::test]
async fn test_chat_gateway_error_page_keeps_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(502)
        .with_header("content-type", "text/html")
        .with_body("<html><body>Bad Gateway</body></html>")
        .create_async()
        .await;

    let result = provider_for(&server).chat(params()).await;

    match result {
        Err(ProviderError::Api(msg)) => assert_eq!(msg, "http 502"),
        other => panic!("expected api error, got {:?}", other.map(|r| r.content)),
    }
}

#[tokio::test]
async fn test_chat_error_without_message_field() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"detail":"boom"}"#)
        .create_async()
        .await;

    let result = provider_for(&server).chat(params()).await;
    assert!(matches!(result, Err(ProviderError::Api(msg)) if msg == "http 500"));
}
