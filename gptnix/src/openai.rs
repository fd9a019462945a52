use std::fmt;

use async_trait::async_trait;
use miette::Diagnostic;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use thiserror::Error;

use crate::APP_USER_AGENT;

pub mod completion;

use completion::{CompletionRequest, CompletionResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Process-wide provider configuration, read once at startup.
#[derive(Clone)]
pub struct Config {
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("Could not find OPENAI_API_KEY env var")]
    #[diagnostic(
        code(gptnix::config::missing_api_key),
        help("export OPENAI_API_KEY before starting")
    )]
    MissingApiKey,
    #[error("Could not create header value")]
    #[diagnostic(code(gptnix::config::invalid_api_key))]
    InvalidApiKey(#[source] reqwest::header::InvalidHeaderValue),
    #[error("Could not build reqwest client")]
    #[diagnostic(code(gptnix::config::client))]
    Client(#[source] reqwest::Error),
}

#[derive(Error, Diagnostic, Debug)]
pub enum ProviderError {
    #[error("completion request failed: {0}")]
    #[diagnostic(code(gptnix::provider::request))]
    Request(#[from] reqwest::Error),
    #[error("provider answered {status}: {body}")]
    #[diagnostic(code(gptnix::provider::status))]
    Status { status: u16, body: String },
    #[error("provider returned no choices")]
    #[diagnostic(code(gptnix::provider::no_choices))]
    NoChoices,
}

/// Anything that can answer a chat completion request.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, ProviderError>;
}

pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = non_blank(lookup("OPENAI_API_KEY")).ok_or(ConfigError::MissingApiKey)?;
        let base_url = non_blank(lookup("OPENAI_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let model = non_blank(lookup("OPENAI_MODEL")).unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_owned(),
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> Result<Client, ConfigError> {
        let mut headers = reqwest::header::HeaderMap::new();

        let value = format!("Bearer {}", self.api_key);
        let mut value = HeaderValue::from_str(&value).map_err(ConfigError::InvalidApiKey)?;
        value.set_sensitive(true);

        headers.insert(AUTHORIZATION, value);

        let http = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(headers)
            .build()
            .map_err(ConfigError::Client)?;

        Ok(Client {
            http,
            base_url: self.base_url.clone(),
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

#[async_trait]
impl CompletionProvider for Client {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        self.completion(request).await
    }
}
