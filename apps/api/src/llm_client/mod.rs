/// LLM Client: the single point of entry for all text-generation calls in CovRes.
///
/// Talks to a locally hosted Ollama-compatible `/api/generate` endpoint.
/// No other module may call the model endpoint directly; tailoring and cover
/// letters go through the `TextGenerator` trait implemented here.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod extract;
pub mod prompts;

/// Message returned when the model endpoint cannot be reached at all.
pub const UNREACHABLE_MESSAGE: &str =
    "Could not connect to Ollama. Make sure Ollama is running.";

#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection refused / host unreachable. Recoverable once the endpoint is up.
    #[error("Could not connect to Ollama. Make sure Ollama is running.")]
    Unreachable,

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

impl LlmError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, LlmError::Unreachable)
    }
}

/// Per-call knobs. Defaults come from `Config`.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    pub model_id: String,
    pub endpoint_url: String,
    pub temperature: f32,
    pub timeout: Duration,
}

impl QueryOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model_id: config.ollama_model.clone(),
            endpoint_url: config.ollama_api_url.clone(),
            temperature: config.ollama_temperature,
            timeout: Duration::from_secs(config.ollama_timeout_secs),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

/// Anything that can turn a prompt into text. Lets tailoring run against a stub.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// The single model client used by all services in CovRes.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    options: QueryOptions,
}

impl LlmClient {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            // Timeouts are applied per request so each call honours its own options.
            client: Client::new(),
            options,
        }
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Sends one non-streaming generate request and returns the `response` text.
    ///
    /// A missing `response` field yields an empty string. Nothing is retried;
    /// retry is a user action.
    pub async fn query(&self, prompt: &str, options: &QueryOptions) -> Result<String, LlmError> {
        let body = GenerateRequest {
            model: &options.model_id,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: options.temperature,
            },
        };

        let response = self
            .client
            .post(&options.endpoint_url)
            .timeout(options.timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, options.timeout))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!("Model endpoint returned {}: {}", status, message);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| classify_transport_error(e, options.timeout))?;
        let decoded: GenerateResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::MalformedBody(e.to_string()))?;
        let output = decoded.response.unwrap_or_default();

        debug!(
            "Model call succeeded: model={}, prompt_chars={}, response_chars={}",
            options.model_id,
            prompt.len(),
            output.len()
        );

        Ok(output)
    }
}

#[async_trait]
impl TextGenerator for LlmClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        self.query(prompt, &self.options).await
    }
}

fn classify_transport_error(error: reqwest::Error, timeout: Duration) -> LlmError {
    if error.is_connect() {
        LlmError::Unreachable
    } else if error.is_timeout() {
        LlmError::Timeout(timeout.as_secs())
    } else if error.is_decode() {
        LlmError::MalformedBody(error.to_string())
    } else {
        LlmError::Http(error)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Serves `/api/generate` on an ephemeral port, recording request bodies.
    async fn spawn_endpoint(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
        let seen: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route(
                "/api/generate",
                post(
                    move |State(seen): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| {
                        let reply = reply.clone();
                        async move {
                            seen.lock().unwrap().push(body);
                            (status, Json(reply))
                        }
                    },
                ),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/api/generate"), seen)
    }

    fn options_for(url: &str) -> QueryOptions {
        QueryOptions {
            model_id: "gemma3:1b".to_string(),
            endpoint_url: url.to_string(),
            temperature: 0.7,
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn test_query_returns_response_field_and_sends_expected_body() {
        let (url, seen) = spawn_endpoint(StatusCode::OK, json!({"response": "Hello"})).await;
        let options = options_for(&url);
        let client = LlmClient::new(options.clone());

        let text = client.query("Say hello", &options).await.unwrap();
        assert_eq!(text, "Hello");

        let bodies = seen.lock().unwrap();
        assert_eq!(bodies.len(), 1);
        assert_eq!(bodies[0]["model"], "gemma3:1b");
        assert_eq!(bodies[0]["prompt"], "Say hello");
        assert_eq!(bodies[0]["stream"], false);
        assert!((bodies[0]["options"]["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_query_missing_response_field_is_empty_text() {
        let (url, _) = spawn_endpoint(StatusCode::OK, json!({"done": true})).await;
        let options = options_for(&url);
        let text = LlmClient::new(options.clone())
            .query("x", &options)
            .await
            .unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_query_non_success_status_is_api_error() {
        let (url, _) =
            spawn_endpoint(StatusCode::NOT_FOUND, json!({"error": "model not found"})).await;
        let options = options_for(&url);
        let err = LlmClient::new(options.clone())
            .query("x", &options)
            .await
            .unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 404);
                assert!(message.contains("model not found"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_query_refused_connection_is_unreachable() {
        // Bind then drop to obtain a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let options = options_for(&format!("http://{addr}/api/generate"));
        let err = LlmClient::new(options.clone())
            .query("x", &options)
            .await
            .unwrap_err();
        assert!(err.is_unreachable());
        assert_eq!(err.to_string(), UNREACHABLE_MESSAGE);
    }

    #[tokio::test]
    async fn test_text_generator_uses_client_defaults() {
        let (url, seen) = spawn_endpoint(StatusCode::OK, json!({"response": "ok"})).await;
        let client = LlmClient::new(options_for(&url));
        assert_eq!(client.generate("prompt").await.unwrap(), "ok");
        assert_eq!(seen.lock().unwrap()[0]["prompt"], "prompt");
    }
}
