use serde::{Deserialize, Serialize};

use super::{Client, ProviderError};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 2000;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Message {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

impl Message {
    pub fn system(content: &str) -> Self {
        Self {
            role: "system".to_string(),
            content: Some(content.to_string()),
        }
    }

    pub fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: Some(content.to_string()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// A stateless request: the system instruction followed by one user turn.
    pub fn single_turn(model: &str, system: &str, query: &str) -> Self {
        Self {
            model: model.to_string(),
            messages: vec![Message::system(system), Message::user(query)],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CompletionChoice {
    #[serde(default)]
    pub finish_reason: Option<String>,
    #[serde(default)]
    pub index: i64,
    pub message: Message,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CompletionUsage {
    pub completion_tokens: i64,
    pub prompt_tokens: i64,
    pub total_tokens: i64,
}

// OpenAI-compatible servers disagree on the envelope; only `choices` is required.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}

impl CompletionResponse {
    /// Content of the first choice. `Ok(None)` when the provider sent a
    /// choice without text; an error when it sent no choice at all.
    pub fn into_first_content(self) -> Result<Option<String>, ProviderError> {
        let choice = self
            .choices
            .into_iter()
            .next()
            .ok_or(ProviderError::NoChoices)?;

        Ok(choice.message.content.filter(|content| !content.is_empty()))
    }
}

impl Client {
    pub async fn completion(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let started = std::time::Instant::now();

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let response_body = response.json::<CompletionResponse>().await?;

        tracing::debug!(
            model = %request.model,
            elapsed = ?started.elapsed(),
            "completion finished"
        );

        Ok(response_body)
    }
}
