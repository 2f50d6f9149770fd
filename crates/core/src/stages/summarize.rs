use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{error::SummarizationError, provider::Provider, stages::Summarizer};

const SYSTEM_PROMPT: &str = "You are a helpful video transcriber tool.";

/// Length constraints for the summary and the per-keyword analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub summary_sentence_count: u32,
    pub keywords: Vec<String>,
    pub per_keyword_sentence_count: u32,
}

pub fn build_user_prompt(transcript: &str, request: &SummaryRequest) -> String {
    let mut prompt = format!(
        "Summarize the following video transcript in a strict length of {} sentences: {}. \
         In the summary, avoid specifying the speaker's identity and use gender-neutral \
         pronouns like 'they' or 'them'.",
        request.summary_sentence_count, transcript
    );

    if !request.keywords.is_empty() {
        prompt.push_str(&format!(
            " After the summary, analyze how the following keywords are discussed in the video: {}. \
             Provide a separate analysis for each keyword, limited to {} sentences per keyword. \
             Ensure there is a break between the analysis of different keywords.",
            request.keywords.join(", "),
            request.per_keyword_sentence_count
        ));
    }

    prompt
}

/// Map a rejected API call onto the error taxonomy. Oversized input shows up
/// as 413, as a `context_length_exceeded` code, or as a 400 whose message
/// talks about tokens or context length.
fn classify_api_error(status: StatusCode, body: &str) -> SummarizationError {
    let parsed: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let code = parsed["error"]["code"].as_str().unwrap_or_default();
    let message = parsed["error"]["message"]
        .as_str()
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string());
    let lowered = message.to_lowercase();

    let too_large = status == StatusCode::PAYLOAD_TOO_LARGE
        || code == "context_length_exceeded"
        || (status == StatusCode::BAD_REQUEST
            && (lowered.contains("token") || lowered.contains("context length")));

    if too_large {
        SummarizationError::InputTooLarge { reason: message }
    } else {
        SummarizationError::Failed {
            reason: format!("{status}: {message}"),
        }
    }
}

/// Summarizer backed by an OpenAI-compatible chat completions endpoint.
pub struct ChatSummarizer {
    client: reqwest::Client,
    api_url: String,
    model: String,
    api_key: String,
}

impl ChatSummarizer {
    pub fn new(api_url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    pub fn from_provider(provider: &Provider) -> Result<Self, SummarizationError> {
        let config = provider.config();
        let api_key = provider.validate_api_key()?;
        Ok(Self::new(config.api_url, config.model, api_key))
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    async fn summarize(
        &self,
        transcript: &str,
        request: &SummaryRequest,
    ) -> Result<String, SummarizationError> {
        let response = self
            .client
            .post(&self.api_url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({
                "model": self.model,
                "messages": [
                    {
                        "role": "system",
                        "content": SYSTEM_PROMPT,
                    },
                    {
                        "role": "user",
                        "content": build_user_prompt(transcript, request),
                    },
                ],
            }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_api_error(status, &body));
        }

        let value: Value = serde_json::from_str(&body)?;
        let content = value["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| SummarizationError::Failed {
                reason: format!("Invalid API response: {value}"),
            })?;

        Ok(content.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };

    use super::*;

    fn request(keywords: &[&str]) -> SummaryRequest {
        SummaryRequest {
            summary_sentence_count: 3,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            per_keyword_sentence_count: 2,
        }
    }

    async fn summarizer_against(template: ResponseTemplate) -> (MockServer, ChatSummarizer) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "test-model"})))
            .respond_with(template)
            .mount(&server)
            .await;
        let summarizer = ChatSummarizer::new(Provider::Openai.config().api_url, "gpt-4o-mini", "test-key")
            .with_api_url(format!("{}/v1/chat/completions", server.uri()))
            .with_model("test-model");
        (server, summarizer)
    }

    #[test]
    fn prompt_carries_lengths_and_keywords() {
        let prompt = build_user_prompt("hello world", &request(&["rust", "tokio"]));

        assert!(prompt.contains("strict length of 3 sentences: hello world."));
        assert!(prompt.contains("gender-neutral"));
        assert!(prompt.contains("discussed in the video: rust, tokio."));
        assert!(prompt.contains("limited to 2 sentences per keyword"));
    }

    #[test]
    fn prompt_without_keywords_skips_keyword_analysis() {
        let prompt = build_user_prompt("hello world", &request(&[]));

        assert!(!prompt.contains("keywords"));
    }

    #[test]
    fn api_errors_are_classified() {
        let too_long = r#"{"error":{"message":"This model's maximum context length is 16385 tokens.","code":"context_length_exceeded"}}"#;
        assert!(matches!(
            classify_api_error(StatusCode::BAD_REQUEST, too_long),
            SummarizationError::InputTooLarge { .. }
        ));
        assert!(matches!(
            classify_api_error(StatusCode::PAYLOAD_TOO_LARGE, "too big"),
            SummarizationError::InputTooLarge { .. }
        ));
        assert!(matches!(
            classify_api_error(StatusCode::UNAUTHORIZED, r#"{"error":{"message":"invalid token"}}"#),
            SummarizationError::Failed { .. }
        ));
    }

    #[tokio::test]
    async fn returns_message_content() {
        let (_server, summarizer) = summarizer_against(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "  They talk about Rust.  "}}]
        })))
        .await;

        let summary = summarizer.summarize("transcript", &request(&["rust"])).await.unwrap();

        assert_eq!(summary, "They talk about Rust.");
    }

    #[tokio::test]
    async fn oversized_transcript_is_reported_as_input_too_large() {
        let (_server, summarizer) = summarizer_against(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "This model's maximum context length is 16385 tokens. However, your messages resulted in 90000 tokens.",
                "type": "invalid_request_error",
                "code": "context_length_exceeded"
            }
        })))
        .await;

        let err = summarizer.summarize("very long", &request(&[])).await.unwrap_err();

        assert!(matches!(err, SummarizationError::InputTooLarge { .. }));
    }

    #[tokio::test]
    async fn server_error_is_a_generic_failure() {
        let (_server, summarizer) =
            summarizer_against(ResponseTemplate::new(500).set_body_string("upstream exploded")).await;

        let err = summarizer.summarize("t", &request(&[])).await.unwrap_err();

        assert!(matches!(err, SummarizationError::Failed { .. }));
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_failure() {
        let (_server, summarizer) =
            summarizer_against(ResponseTemplate::new(200).set_body_json(json!({"choices": []}))).await;

        let err = summarizer.summarize("t", &request(&[])).await.unwrap_err();

        assert!(matches!(err, SummarizationError::Failed { .. }));
    }
}
