//! OllamaClient - Ollama の `/api/chat` を使う `InferenceClient`
//!
//! 1 回の呼び出しで非ストリーミングの POST を 1 回送ります:
//! `{ model, messages: [{role, content}], stream: false, options: { temperature, num_predict } }`
//! 応答テキストは `message.content` から読み取ります。

use async_trait::async_trait;
use reqwest::{Client as HttpClient, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ParleyError, TransportError};
use crate::ports::{InferenceClient, InferenceRequest};

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
    options: ChatOptions,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: String,
}

/// OllamaClient は 1 台の Ollama ホスト用 HTTP クライアント
#[derive(Debug, Clone)]
pub struct OllamaClient {
    http_client: HttpClient,
    chat_url: Url,
}

impl OllamaClient {
    /// `endpoint` 向けのクライアントを作成
    ///
    /// ホストのみ（`http://host:11434`）、`/api` 付き、`/api/chat` までの
    /// 完全な URL のいずれも受け付けます。
    pub fn new(endpoint: &str) -> Result<Self, ParleyError> {
        Ok(Self {
            http_client: HttpClient::new(),
            chat_url: chat_endpoint(endpoint)?,
        })
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }
}

fn chat_endpoint(endpoint: &str) -> Result<Url, ParleyError> {
    let raw = endpoint.trim();
    let invalid = |err: String| ParleyError::invalid(format!("invalid endpoint '{endpoint}': {err}"));

    let sanitized = raw.trim_end_matches('/');
    if sanitized.ends_with("/api/chat") {
        return Url::parse(sanitized).map_err(|e| invalid(e.to_string()));
    }

    let base = if sanitized.ends_with("/api") {
        format!("{sanitized}/")
    } else {
        format!("{sanitized}/api/")
    };
    let base = Url::parse(&base).map_err(|e| invalid(e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", base.scheme())));
    }
    base.join("chat").map_err(|e| invalid(e.to_string()))
}

#[async_trait]
impl InferenceClient for OllamaClient {
    async fn complete(&self, request: &InferenceRequest) -> Result<String, TransportError> {
        let payload = ChatRequest {
            model: &request.model,
            messages: request
                .turns
                .iter()
                .map(|t| ChatMessage {
                    role: t.role.as_str(),
                    content: &t.content,
                })
                .collect(),
            stream: false,
            options: ChatOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };
        debug!(
            url = %self.chat_url,
            model = %request.model,
            turns = request.turns.len(),
            "sending chat request"
        );

        let response = self
            .http_client
            .post(self.chat_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(body.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Role, Turn};
    use rstest::rstest;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[rstest]
    #[case::bare_host("http://localhost:11434")]
    #[case::trailing_slash("http://localhost:11434/")]
    #[case::api_prefix("http://localhost:11434/api")]
    #[case::full_path("http://localhost:11434/api/chat")]
    fn endpoint_is_normalized(#[case] endpoint: &str) {
        let client = OllamaClient::new(endpoint).unwrap();
        assert_eq!(client.chat_url().as_str(), "http://localhost:11434/api/chat");
    }

    #[rstest]
    #[case::garbage("not a url")]
    #[case::wrong_scheme("ftp://host")]
    fn bad_endpoint_is_configuration_error(#[case] endpoint: &str) {
        let err = OllamaClient::new(endpoint).unwrap_err();
        assert!(matches!(err, ParleyError::ConfigurationInvalid(_)));
    }

    fn request() -> InferenceRequest {
        InferenceRequest {
            model: "llama3".into(),
            turns: vec![
                Turn::new(Role::System, "rules"),
                Turn::new(Role::User, "round 1"),
            ],
            temperature: 0.7,
            max_tokens: 256,
        }
    }

    #[tokio::test]
    async fn sends_chat_payload_and_reads_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .and(body_partial_json(serde_json::json!({
                "model": "llama3",
                "stream": false,
                "messages": [
                    {"role": "system", "content": "rules"},
                    {"role": "user", "content": "round 1"}
                ],
                "options": {"num_predict": 256}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "model": "llama3",
                "message": {"role": "assistant", "content": "I will.\nCOOPERATE"},
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri()).unwrap();
        let text = client.complete(&request()).await.unwrap();
        assert_eq!(text, "I will.\nCOOPERATE");
    }

    #[tokio::test]
    async fn server_error_maps_to_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model not loaded"))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri()).unwrap();
        let err = client.complete(&request()).await.unwrap_err();
        assert_eq!(
            err,
            TransportError::Status {
                status: 500,
                body: "model not loaded".into()
            }
        );
    }

    #[tokio::test]
    async fn malformed_body_maps_to_decode() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"done": true})))
            .mount(&server)
            .await;

        let client = OllamaClient::new(&server.uri()).unwrap();
        let err = client.complete(&request()).await.unwrap_err();
        assert!(matches!(err, TransportError::Decode(_)));
    }
}
