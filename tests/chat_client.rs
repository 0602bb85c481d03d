//! End-to-end adapter tests against a mock chat-completions endpoint.

use futures::StreamExt;
use mockito::Matcher;
use serde_json::json;

use tgi_chat::{Error, Message, ModelOptions, Prompt, TgiChatClient, TgiChatOptions, Usage};

const CHAT_PATH: &str = "/v1/chat/completions";

fn client_for(server: &mockito::Server) -> TgiChatClient {
    TgiChatClient::builder()
        .base_url(server.url())
        .build()
        .expect("client should build")
}

#[tokio::test]
async fn one_shot_call_produces_single_generation_with_message_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CHAT_PATH)
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({
            "model": "mistralai/Mistral-7B-Instruct-v0.2",
            "messages": [{"role": "user", "content": "Tell me a joke"}],
            "stream": false,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "model": "mistralai/Mistral-7B-Instruct-v0.2",
                "created": 1710521574,
                "message": {"role": "assistant", "content": "Why did the chicken cross the road?"},
                "done": true,
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let prompt = Prompt::new(vec![Message::user("Tell me a joke")]);
    let response = client.call(&prompt).await.unwrap();

    assert_eq!(response.generations.len(), 1);
    assert_eq!(
        response.generations[0].text,
        "Why did the chicken cross the road?"
    );
    assert_eq!(response.generations[0].usage, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn one_shot_call_attaches_usage_when_server_reports_counts() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_body(
            json!({
                "model": "m",
                "message": {"role": "assistant", "content": "hi"},
                "done": true,
                "prompt_eval_count": 7,
                "prompt_eval_duration": 120000,
                "eval_count": 21,
                "eval_duration": 450000,
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let response = client
        .call(&Prompt::new(vec![Message::user("hi")]))
        .await
        .unwrap();

    assert_eq!(
        response.generations[0].usage,
        Some(Usage {
            prompt_tokens: 7,
            generation_tokens: 21
        })
    );
}

#[tokio::test]
async fn non_2xx_response_surfaces_as_remote_error_with_body() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(500)
        .with_body("server error")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .call(&Prompt::new(vec![Message::user("hi")]))
        .await
        .unwrap_err();

    match err {
        Error::Remote { status, body, .. } => {
            assert_eq!(status, 500);
            assert_eq!(body, "server error");
        }
        other => panic!("expected Remote error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_one_shot_body_is_a_protocol_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_body("this is not json")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client
        .call(&Prompt::new(vec![Message::user("hi")]))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Protocol(_)));
}

#[tokio::test]
async fn streaming_yields_one_generation_per_chunk_in_order() {
    let body = concat!(
        r#"{"id":"1","object":"text_completion","choices":[{"index":0,"delta":{"role":"assistant","content":"Why"},"logprobs":null,"finish_reason":null}]}"#,
        "\n",
        r#"{"id":"2","object":"text_completion","choices":[{"index":0,"delta":{"content":" did"},"logprobs":null,"finish_reason":null}]}"#,
        "\n",
        r#"{"id":"3","object":"text_completion","choices":[]}"#,
        "\n",
        r#"{"id":"4","object":"text_completion","choices":[{"index":0,"delta":{"content":" the"},"logprobs":null,"finish_reason":"stop"}]}"#,
        "\n",
        "data: [DONE]\n",
    );

    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CHAT_PATH)
        .match_body(Matcher::PartialJson(json!({"stream": true})))
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server);
    let stream = client
        .stream(&Prompt::new(vec![Message::user("Tell me a joke")]))
        .await
        .unwrap();

    let responses: Vec<_> = stream.map(|r| r.unwrap()).collect().await;

    let texts: Vec<&str> = responses
        .iter()
        .map(|r| r.generations[0].text.as_str())
        .collect();
    assert_eq!(texts, vec!["Why", " did", "No content", " the"]);
    mock.assert_async().await;
}

#[tokio::test]
async fn streaming_survives_a_malformed_record() {
    let body = concat!(
        r#"{"choices":[{"index":0,"delta":{"content":"ok"}}]}"#,
        "\n",
        "garbage that is not json\n",
        r#"{"choices":[{"index":0,"delta":{"content":"still ok"}}]}"#,
        "\n",
    );

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server);
    let results: Vec<_> = client
        .stream(&Prompt::new(vec![Message::user("hi")]))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().generations[0].text, "ok");
    assert!(matches!(results[1], Err(Error::Protocol(_))));
    assert_eq!(results[2].as_ref().unwrap().generations[0].text, "still ok");
}

#[tokio::test]
async fn dropping_a_stream_early_releases_the_connection() {
    let body = concat!(
        r#"{"choices":[{"index":0,"delta":{"content":"first"}}]}"#,
        "\n",
        r#"{"choices":[{"index":0,"delta":{"content":"second"}}]}"#,
        "\n",
        r#"{"choices":[{"index":0,"delta":{"content":"third"}}]}"#,
        "\n",
    );

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_body(body)
        .expect_at_least(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let mut stream = client
        .stream(&Prompt::new(vec![Message::user("hi")]))
        .await
        .unwrap();

    let first = stream.next().await.unwrap().unwrap();
    assert_eq!(first.generations[0].text, "first");
    drop(stream);

    // The client stays usable after abandoning a stream mid-flight.
    let second = client
        .stream(&Prompt::new(vec![Message::user("hi")]))
        .await
        .unwrap();
    let all: Vec<_> = second.map(|r| r.unwrap()).collect().await;
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn streaming_error_status_fails_before_any_chunk_is_emitted() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(503)
        .with_body("overloaded")
        .create_async()
        .await;

    let client = client_for(&server);
    match client.stream(&Prompt::new(vec![Message::user("hi")])).await {
        Err(Error::Remote { status, body, .. }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        Err(other) => panic!("expected Remote error, got {other:?}"),
        Ok(_) => panic!("expected Remote error, got a stream"),
    }
}

#[tokio::test]
async fn chunk_with_unknown_role_fails_that_element_only() {
    let body = concat!(
        r#"{"choices":[{"index":0,"delta":{"role":"assistant","content":"ok"}}]}"#,
        "\n",
        r#"{"choices":[{"index":0,"delta":{"role":"bogus","content":"x"}}]}"#,
        "\n",
        r#"{"choices":[{"index":0,"delta":{"content":"still ok"}}]}"#,
        "\n",
    );

    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", CHAT_PATH)
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;

    let client = client_for(&server);
    let results: Vec<_> = client
        .stream(&Prompt::new(vec![Message::user("hi")]))
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap().generations[0].text, "ok");
    assert!(matches!(results[1], Err(Error::Protocol(_))));
    assert_eq!(results[2].as_ref().unwrap().generations[0].text, "still ok");
}

#[derive(Debug)]
struct EmbeddingOptions;

impl ModelOptions for EmbeddingOptions {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[tokio::test]
async fn foreign_options_kind_is_rejected_without_touching_the_network() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CHAT_PATH)
        .expect(0)
        .create_async()
        .await;

    let client = client_for(&server);
    let prompt = Prompt::with_options(vec![Message::user("hi")], EmbeddingOptions);

    let err = client.call(&prompt).await.unwrap_err();
    assert!(matches!(err, Error::InvalidOptionsType { .. }));
    mock.assert_async().await;
}

#[tokio::test]
async fn runtime_options_override_defaults_in_the_wire_request() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", CHAT_PATH)
        .match_body(Matcher::PartialJson(json!({
            "model": "X",
            "options": {"temperature": 0.5, "top_k": 40},
        })))
        .with_status(200)
        .with_body(
            json!({
                "model": "X",
                "message": {"role": "assistant", "content": "ok"},
                "done": true,
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let prompt = Prompt::with_options(
        vec![Message::user("hi")],
        TgiChatOptions::new().with_model("X").with_top_k(40),
    );

    client.call(&prompt).await.unwrap();
    mock.assert_async().await;
}
