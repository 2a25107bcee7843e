//! Text generation over an OpenAI-compatible chat completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::policies::ExponentialBackoff;
use reqwest_retry::RetryTransientMiddleware;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::client::middleware::AuthMiddleware;
use crate::config::AiConfig;
use crate::error::{Result, WikiError};

/// Generates text from a prompt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model's answer to `prompt`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the answer is empty.
    async fn generate(&self, prompt: &str, model: &str) -> Result<String>;
}

/// Client for `POST {base_url}/chat/completions`.
pub struct OpenAiCompatibleGenerator {
    client: ClientWithMiddleware,
    endpoint: Url,
}

impl OpenAiCompatibleGenerator {
    /// Create a new generator from the AI configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the URL is invalid.
    pub fn new(config: &AiConfig) -> Result<Self> {
        let inner_client = Client::builder()
            .user_agent(format!("wikisync/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.max_retries);

        let client = ClientBuilder::new(inner_client)
            .with(AuthMiddleware::new(config.api_key.as_deref()))
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            endpoint: chat_completions_url(&config.base_url)?,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    async fn generate(&self, prompt: &str, model: &str) -> Result<String> {
        let request = ChatRequest {
            model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(self.endpoint.clone())
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(serde_json::to_string(&request)?)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(WikiError::ApiError { status, message });
        }

        let body: ChatResponse = response.json().await?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| WikiError::ApiError {
                status: 200,
                message: "response contained no text".to_string(),
            })
    }
}

/// Joins `chat/completions` onto the base URL, keeping any path prefix such as `/v1`.
fn chat_completions_url(base: &Url) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("chat/completions")?)
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatAnswer,
}

#[derive(Deserialize)]
struct ChatAnswer {
    #[serde(default)]
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer, key: Option<&str>) -> AiConfig {
        AiConfig {
            provider: Some("openai".to_string()),
            model: Some("test-model".to_string()),
            base_url: Url::parse(&format!("{}/v1", server.uri())).unwrap(),
            api_key: key.map(str::to_string),
            max_retries: 0,
        }
    }

    #[test]
    fn endpoint_keeps_path_prefix() {
        let base = Url::parse("https://api.example.com/v1").unwrap();
        assert_eq!(
            chat_completions_url(&base).unwrap().as_str(),
            "https://api.example.com/v1/chat/completions"
        );

        let base = Url::parse("https://api.example.com/v1/").unwrap();
        assert_eq!(
            chat_completions_url(&base).unwrap().as_str(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn generate_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(serde_json::json!({
                "model": "test-model",
                "stream": false,
                "messages": [{ "role": "user", "content": "describe" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": "Add journal entry" } }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let generator = OpenAiCompatibleGenerator::new(&config(&server, Some("sk-test"))).unwrap();
        let text = generator.generate("describe", "test-model").await.unwrap();

        assert_eq!(text, "Add journal entry");
    }

    #[tokio::test]
    async fn error_status_becomes_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&server)
            .await;

        let generator = OpenAiCompatibleGenerator::new(&config(&server, None)).unwrap();
        let err = generator.generate("describe", "test-model").await.unwrap_err();

        assert!(matches!(err, WikiError::ApiError { status: 401, .. }));
    }

    #[tokio::test]
    async fn empty_answer_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "   " } }]
            })))
            .mount(&server)
            .await;

        let generator = OpenAiCompatibleGenerator::new(&config(&server, None)).unwrap();
        assert!(generator.generate("describe", "test-model").await.is_err());
    }
}
