//! Ticket subject generation with an OpenAI chat completion.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::base::{SubjectError, SubjectExtractor};

pub const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_SUBJECT_MODEL: &str = "gpt-4";

const SYSTEM_PROMPT: &str = "You write short, precise support ticket subjects.";

#[derive(Debug, Clone)]
pub struct SubjectConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

impl SubjectConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_url: CHAT_COMPLETIONS_URL.to_string(),
            model: DEFAULT_SUBJECT_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

fn user_prompt(conversation: &str) -> String {
    format!(
        "Below is a phone conversation between a caller and a support assistant. \
         Write a subject line of five to seven words, in Title Case, that names the \
         caller's problem.\n\nConversation:\n{conversation}\n\n\
         Reply with the subject line and nothing else."
    )
}

pub struct OpenAISubjectExtractor {
    config: SubjectConfig,
    http_client: Client,
}

impl OpenAISubjectExtractor {
    pub fn new(config: SubjectConfig) -> Self {
        Self {
            config,
            http_client: Client::new(),
        }
    }
}

#[async_trait]
impl SubjectExtractor for OpenAISubjectExtractor {
    async fn extract_subject(&self, conversation: &str) -> Result<String, SubjectError> {
        let request = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: Some(SYSTEM_PROMPT.to_string()),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Some(user_prompt(conversation)),
                },
            ],
        };

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SubjectError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubjectError::ProviderError(format!("{status}: {body}")));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| SubjectError::ProviderError(format!("Invalid response: {e}")))?;

        let subject = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().trim_matches('"').trim().to_string())
            .unwrap_or_default();

        if subject.is_empty() {
            return Err(SubjectError::EmptySubject);
        }

        debug!(%subject, "Generated ticket subject");
        Ok(subject)
    }
}
