//! Google Gemini `generateContent` provider.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use preptest_core::error::EngineError;
use preptest_core::model::Question;
use preptest_core::parser::parse_questions;
use preptest_core::practice::PracticeRequest;
use preptest_core::traits::{FeedbackRequest, QuestionRequest, QuestionService};

use crate::error::ProviderError;
use crate::prompt::{feedback_prompt, practice_prompt, question_prompt};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash-latest";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Gemini API question service.
pub struct GeminiProvider {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(
        api_key: &str,
        base_url: Option<String>,
        model: Option<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            api_key: api_key.to_string(),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Send one prompt and return the first candidate's text.
    async fn generate_text(&self, prompt: String, json_mode: bool) -> anyhow::Result<String> {
        let start = Instant::now();
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config: json_mode.then(|| GenerationConfig {
                response_mime_type: "application/json".to_string(),
            }),
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    ProviderError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(5)
                * 1000;
            return Err(ProviderError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status == 401 || status == 403 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::AuthenticationFailed(body).into());
        }
        if status == 404 {
            return Err(ProviderError::ModelNotFound(self.model.clone()).into());
        }
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status,
                message: body,
            }
            .into());
        }

        let api_response: GeminiResponse =
            response
                .json()
                .await
                .map_err(|e| ProviderError::ApiError {
                    status: 0,
                    message: format!("failed to parse response: {e}"),
                })?;

        if let Some(reason) = api_response
            .prompt_feedback
            .and_then(|f| f.block_reason)
        {
            return Err(ProviderError::Blocked(reason).into());
        }

        let text = api_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| EngineError::NoContent("response has no candidate text".into()))?;

        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            chars = text.len(),
            "gemini response received"
        );
        Ok(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[async_trait]
impl QuestionService for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip(self, request), fields(model = %self.model, count = request.count))]
    async fn generate_questions(&self, request: &QuestionRequest) -> anyhow::Result<Vec<Question>> {
        let text = self.generate_text(question_prompt(request), true).await?;
        Ok(parse_questions(&text, request.count)?)
    }

    #[instrument(skip(self, request), fields(model = %self.model, score = request.score))]
    async fn generate_feedback(&self, request: &FeedbackRequest) -> anyhow::Result<String> {
        let prompt = feedback_prompt(request).context("failed to encode performance data")?;
        self.generate_text(prompt, false).await
    }

    #[instrument(skip(self, request), fields(model = %self.model, count = request.count))]
    async fn generate_practice(&self, request: &PracticeRequest) -> anyhow::Result<String> {
        self.generate_text(practice_prompt(request), false).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use preptest_core::model::{Choice, Difficulty};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const MODEL_PATH: &str = "/v1beta/models/gemini-1.5-flash-latest:generateContent";

    fn text_response(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": text}], "role": "model"},
                "finishReason": "STOP"
            }]
        })
    }

    fn questions_json(n: usize) -> String {
        let qs: Vec<serde_json::Value> = (0..n)
            .map(|i| {
                serde_json::json!({
                    "subject": "Physics",
                    "question": format!("Question {i}?"),
                    "options": ["A) 1", "B) 2", "C) 3", "D) 4"],
                    "correctAnswer": "B"
                })
            })
            .collect();
        serde_json::to_string(&qs).unwrap()
    }

    fn request(count: usize) -> QuestionRequest {
        QuestionRequest {
            count,
            subject: "Physics".into(),
            topic: "Kinematics".into(),
            difficulty: Difficulty::Medium,
        }
    }

    fn feedback_request() -> FeedbackRequest {
        FeedbackRequest {
            topic: "Kinematics".into(),
            subject: "Physics".into(),
            score: 3,
            total_marks: 8,
            correct_count: 1,
            incorrect_count: 1,
            per_question: vec![],
        }
    }

    async fn provider(server: &MockServer) -> GeminiProvider {
        GeminiProvider::new("test-key", Some(server.uri()), None).unwrap()
    }

    #[tokio::test]
    async fn generates_questions_in_json_mode() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(serde_json::json!({
                "generationConfig": {"responseMimeType": "application/json"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&questions_json(4))))
            .mount(&server)
            .await;

        let questions = provider(&server)
            .await
            .generate_questions(&request(4))
            .await
            .unwrap();
        assert_eq!(questions.len(), 4);
        assert_eq!(questions[0].correct_answer, Choice::B);
    }

    #[tokio::test]
    async fn accepts_fenced_question_payload() {
        let server = MockServer::start().await;
        let fenced = format!("```json\n{}\n```", questions_json(2));

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&fenced)))
            .mount(&server)
            .await;

        let questions = provider(&server)
            .await
            .generate_questions(&request(2))
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[tokio::test]
    async fn wrong_question_count_is_malformed() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(&questions_json(3))))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .generate_questions(&request(4))
            .await
            .unwrap_err();
        assert!(matches!(
            EngineError::from_service(err),
            EngineError::MalformedResponse(_)
        ));
    }

    #[tokio::test]
    async fn generates_feedback_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(text_response("<h3>Well done</h3>")),
            )
            .mount(&server)
            .await;

        let text = provider(&server)
            .await
            .generate_feedback(&feedback_request())
            .await
            .unwrap();
        assert_eq!(text, "<h3>Well done</h3>");
    }

    #[tokio::test]
    async fn generates_practice_set_as_plain_text() {
        let server = MockServer::start().await;
        let set = "**Question 1:** Define work.\n[---SOLUTION---]\n**Correct Answer:** W = F.d";

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response(set)))
            .expect(1)
            .mount(&server)
            .await;

        let request = PracticeRequest::new("Physics", "Work and energy", "JEE Main", 1);
        let text = provider(&server)
            .await
            .generate_practice(&request)
            .await
            .unwrap();
        assert_eq!(text, set);

        let received = server.received_requests().await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&received[0].body).unwrap();
        assert!(body.get("generationConfig").is_none());
        let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(prompt.contains("\"Work and energy\""));
    }

    #[tokio::test]
    async fn empty_candidates_is_no_content() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .generate_feedback(&feedback_request())
            .await
            .unwrap_err();
        assert!(matches!(
            EngineError::from_service(err),
            EngineError::NoContent(_)
        ));
    }

    #[tokio::test]
    async fn blocked_prompt() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "promptFeedback": {"blockReason": "SAFETY"}
            })))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .generate_questions(&request(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::Blocked(reason)) if reason == "SAFETY"
        ));
    }

    #[tokio::test]
    async fn server_error_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .generate_questions(&request(1))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn bad_key_is_authentication_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .generate_questions(&request(1))
            .await
            .unwrap_err();
        let provider_err = err.downcast_ref::<ProviderError>().unwrap();
        assert!(provider_err.is_permanent());
        assert!(provider_err.to_string().contains("API key not valid"));
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(MODEL_PATH))
            .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = provider(&server)
            .await
            .generate_questions(&request(1))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ProviderError>(),
            Some(ProviderError::RateLimited { retry_after_ms: 7000 })
        ));
    }

    #[tokio::test]
    async fn custom_model_changes_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(text_response("ok")))
            .mount(&server)
            .await;

        let provider = GeminiProvider::new(
            "key",
            Some(format!("{}/", server.uri())),
            Some("gemini-2.0-flash".into()),
        )
        .unwrap();
        assert_eq!(provider.model(), "gemini-2.0-flash");
        let text = provider.generate_feedback(&feedback_request()).await.unwrap();
        assert_eq!(text, "ok");
    }
}
