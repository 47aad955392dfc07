//! Gemini `generateContent` REST client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::InferenceConfig;
use crate::engine::llm::{CompletionRequest, LlmClient};
use crate::error::{EngineError, TripError};

/// Maximum number of response-body bytes kept in a status error.
const ERROR_BODY_LIMIT: usize = 512;

/// Client for the Gemini API. The key is sent as a header, never in the URL.
pub struct GeminiClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a client from a validated configuration.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, TripError> {
        config.validate()?;
        let http = Client::builder()
            .user_agent(concat!("tripcrew/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(EngineError::from)?;

        Ok(GeminiClient {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Endpoint for `model`. Accepts both `gemini-x` and `gemini/gemini-x` forms.
    pub fn endpoint(&self, model: &str) -> String {
        let model = model.rsplit('/').next().unwrap_or(model);
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

/// Request body for one completion.
pub fn build_request_body(request: &CompletionRequest) -> serde_json::Value {
    serde_json::json!({
        "systemInstruction": {
            "parts": [{ "text": request.system_prompt }],
        },
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }],
        }],
        "generationConfig": {
            "temperature": request.temperature,
        },
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// Extract the text of the first candidate from a response body.
pub fn parse_response(task: &str, body: &str) -> Result<String, EngineError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| EngineError::Decode(e.to_string()))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(EngineError::Inference {
            task: task.to_string(),
            message: format!("prompt blocked: {reason}"),
        });
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| EngineError::EmptyResponse {
            task: task.to_string(),
        })?;

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        if let Some(reason) = candidate.finish_reason {
            return Err(EngineError::Inference {
                task: task.to_string(),
                message: format!("no text returned (finish reason {reason})"),
            });
        }
        return Err(EngineError::EmptyResponse {
            task: task.to_string(),
        });
    }
    Ok(text)
}

fn truncate(body: &str) -> String {
    if body.len() <= ERROR_BODY_LIMIT {
        return body.to_string();
    }
    let mut end = ERROR_BODY_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, EngineError> {
        let url = self.endpoint(&request.model);
        debug!(task = %request.task, %url, "sending generateContent request");

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request_body(&request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(task = %request.task, status = status.as_u16(), "inference request failed");
            return Err(EngineError::Status {
                code: status.as_u16(),
                body: truncate(&body),
            });
        }

        parse_response(&request.task, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MODEL;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Read one HTTP/1.1 request: headers plus a `content-length` body.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let body_len = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + body_len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Serve a single canned response; the handle yields the raw request.
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
            request
        });
        (format!("http://{addr}/v1beta"), handle)
    }

    fn client_for(base_url: &str) -> GeminiClient {
        GeminiClient::from_config(
            &InferenceConfig::new(DEFAULT_MODEL, "secret-key").with_base_url(base_url),
        )
        .unwrap()
    }

    fn request() -> CompletionRequest {
        CompletionRequest {
            task: "itinerary".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            system_prompt: "You are a planner.".to_string(),
            prompt: "Plan 3 days.".to_string(),
        }
    }

    #[test]
    fn test_request_body_carries_prompts_and_temperature() {
        let body = build_request_body(&request());
        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            "You are a planner."
        );
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "Plan 3 days.");
        let temperature = body["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_endpoint_strips_provider_prefix() {
        let client = GeminiClient::from_config(
            &InferenceConfig::new(DEFAULT_MODEL, "k").with_base_url("http://localhost:9/v1beta/"),
        )
        .unwrap();
        assert_eq!(
            client.endpoint("gemini/gemini-1.5-pro-latest"),
            "http://localhost:9/v1beta/models/gemini-1.5-pro-latest:generateContent"
        );
    }

    #[test]
    fn test_from_config_rejects_blank_key() {
        let err = GeminiClient::from_config(&InferenceConfig::new(DEFAULT_MODEL, "")).unwrap_err();
        assert!(matches!(err, TripError::Configuration(_)));
    }

    #[test]
    fn test_parse_response_joins_text_parts() {
        let body = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "Day 1: "}, {"text": "Belem"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }"#;
        assert_eq!(parse_response("itinerary", body).unwrap(), "Day 1: Belem");
    }

    #[test]
    fn test_parse_response_reports_blocked_prompt() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = parse_response("itinerary", body).unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_parse_response_without_candidates_is_empty() {
        let err = parse_response("budget", r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, EngineError::EmptyResponse { .. }));
    }

    #[test]
    fn test_parse_response_rejects_malformed_json() {
        let err = parse_response("budget", "not json").unwrap_err();
        assert!(matches!(err, EngineError::Decode(_)));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let body = "é".repeat(ERROR_BODY_LIMIT);
        let cut = truncate(&body);
        assert!(cut.ends_with("..."));
        assert!(cut.len() <= ERROR_BODY_LIMIT + 3);
    }

    #[tokio::test]
    async fn test_complete_sends_key_header_and_returns_text() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "Day 1: Alfama"}]}}]}"#;
        let (base_url, server) = serve_once("200 OK", body.to_string()).await;

        let text = client_for(&base_url).complete(request()).await.unwrap();
        assert_eq!(text, "Day 1: Alfama");

        let sent = server.await.unwrap();
        let lowered = sent.to_lowercase();
        assert!(sent.starts_with(
            "POST /v1beta/models/gemini-1.5-pro-latest:generateContent HTTP/1.1"
        ));
        assert!(lowered.contains("x-goog-api-key: secret-key"));
        assert!(!sent.contains("?key="));
        assert!(sent.contains("\"systemInstruction\""));
    }

    #[tokio::test]
    async fn test_non_success_status_maps_to_status_error() {
        let (base_url, server) =
            serve_once("503 Service Unavailable", "x".repeat(ERROR_BODY_LIMIT + 100)).await;

        let err = client_for(&base_url).complete(request()).await.unwrap_err();
        server.await.unwrap();
        match err {
            EngineError::Status { code, body } => {
                assert_eq!(code, 503);
                assert!(body.ends_with("..."));
                assert_eq!(body.len(), ERROR_BODY_LIMIT + 3);
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }
}
