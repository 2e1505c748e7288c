use futures::StreamExt;
use generative::providers::gemini;
use generative::{CompletionClient, Conversation, EmbeddingsClient};
use httpmock::MockServer;
use serde_json::json;

fn terse_conversation() -> Conversation {
    let mut conversation = Conversation::new();
    conversation.push_system("Be terse.");
    conversation.push_user("What is 2+2?");
    conversation
}

#[tokio::test]
async fn test_complete_appends_assistant_turn() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/v1beta/models/gemini-1.5-flash:generateContent")
            .query_param("key", "TEST");
        then.status(200).json_body(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "4" }], "role": "model" },
                "finishReason": "STOP"
            }],
            "usageMetadata": { "promptTokenCount": 8, "candidatesTokenCount": 1, "totalTokenCount": 9 }
        }));
    });

    let client = gemini::Client::builder("TEST")
        .base_url(&server.base_url())
        .build();

    let mut conversation = terse_conversation();
    let message = client.complete(&mut conversation, None).await.unwrap();

    mock.assert();
    assert_eq!(message.content.as_deref(), Some("4"));
    assert_eq!(conversation.len(), 3);
}

#[tokio::test]
async fn test_complete_stream_terminates_on_finish_reason() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/v1beta/models/gemini-1.5-flash:streamGenerateContent")
            .query_param("alt", "sse")
            .query_param("key", "TEST");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(concat!(
                "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"2+2 \"}],\"role\":\"model\"}}]}\n\n",
                "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"is 4\"}],\"role\":\"model\"},\"finishReason\":\"STOP\"}]}\n\n",
            ));
    });

    let client = gemini::Client::builder("TEST")
        .base_url(&server.base_url())
        .build();

    let mut conversation = terse_conversation();
    let mut stream = client.complete_stream(&mut conversation, None).await.unwrap();

    let mut fragments = vec![];
    while let Some(fragment) = stream.next().await {
        fragments.push(fragment.unwrap());
    }

    assert_eq!(fragments, vec!["2+2 ".to_string(), "is 4".to_string()]);
    assert_eq!(
        stream.message().unwrap().content.as_deref(),
        Some("2+2 is 4")
    );
    assert_eq!(conversation.len(), 3);
    assert_eq!(
        conversation.messages()[2].content.as_deref(),
        Some("2+2 is 4")
    );
}

#[tokio::test]
async fn test_stream_without_finish_reason_is_unexpected_end() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/v1beta/models/gemini-1.5-flash:streamGenerateContent");
        then.status(200)
            .header("content-type", "text/event-stream")
            .body(
                "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"partial\"}],\"role\":\"model\"}}]}\n\n",
            );
    });

    let client = gemini::Client::builder("TEST")
        .base_url(&server.base_url())
        .build();

    let mut conversation = terse_conversation();
    let mut stream = client.complete_stream(&mut conversation, None).await.unwrap();

    assert_eq!(stream.next().await.unwrap().unwrap(), "partial");
    let err = stream.next().await.unwrap().unwrap_err();
    assert!(matches!(
        err,
        generative::CompletionError::UnexpectedEndOfStream
    ));
    assert_eq!(conversation.len(), 2);
}

#[tokio::test]
async fn test_provider_error_carries_status_and_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/v1beta/models/gemini-1.5-flash:generateContent");
        then.status(400)
            .body(r#"{"error":{"message":"API key not valid"}}"#);
    });

    let client = gemini::Client::builder("TEST")
        .base_url(&server.base_url())
        .build();

    let mut conversation = terse_conversation();
    let err = client.complete(&mut conversation, None).await.unwrap_err();

    match err {
        generative::CompletionError::ProviderError { status, body } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("API key not valid"));
        }
        other => panic!("expected ProviderError, got {other:?}"),
    }
    assert_eq!(conversation.len(), 2);
}

#[tokio::test]
async fn test_embed_returns_vector() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(httpmock::Method::POST)
            .path("/v1beta/models/text-embedding-004:embedContent")
            .query_param("key", "TEST");
        then.status(200)
            .json_body(json!({ "embedding": { "values": [0.5, -0.5, 0.25] } }));
    });

    let client = gemini::Client::builder("TEST")
        .base_url(&server.base_url())
        .build();

    let vector = client.embed("hello", None).await.unwrap();
    mock.assert();
    assert_eq!(vector, vec![0.5, -0.5, 0.25]);
}
