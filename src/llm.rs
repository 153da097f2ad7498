//! LLM chat provider adapters
//!
//! The architecture generator talks to whichever chat-completion provider
//! has a key configured. Each adapter implements `ChatProvider`; the
//! `ProviderChain` tries them in configured priority order and reports
//! failures uniformly, so callers never deal with provider-specific errors.
//! API keys are read from the environment at chain construction; providers
//! without a key are simply left out of the chain.

use crate::config::LlmConfig;
use crate::error::{ArchcostError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";
const MISTRAL_API_URL: &str = "https://api.mistral.ai/v1";
const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// A chat-completion backend: system message + prompt in, text out
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn complete(&self, system_message: &str, prompt: &str) -> Result<String>;
}

fn provider_error(
    provider: &str,
    message: impl Into<String>,
    source: Option<reqwest::Error>,
) -> ArchcostError {
    ArchcostError::LlmProvider {
        provider: provider.to_string(),
        message: message.into(),
        source: source.map(|e| Box::new(e) as Box<dyn std::error::Error + Send + Sync>),
    }
}

// OpenAI-compatible chat completions response; Mistral shares the shape
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

async fn openai_style_complete(
    client: &reqwest::Client,
    provider: &'static str,
    base_url: &str,
    api_key: &str,
    model: &str,
    system_message: &str,
    prompt: &str,
) -> Result<String> {
    let body = json!({
        "model": model,
        "messages": [
            {"role": "system", "content": system_message},
            {"role": "user", "content": prompt}
        ]
    });

    let response = client
        .post(format!("{}/chat/completions", base_url))
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .map_err(|e| provider_error(provider, "request failed", Some(e)))?;

    if !response.status().is_success() {
        return Err(provider_error(
            provider,
            format!("HTTP {}", response.status()),
            None,
        ));
    }

    let parsed: ChatCompletionResponse = response
        .json()
        .await
        .map_err(|e| provider_error(provider, "unparseable response", Some(e)))?;

    parsed
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .ok_or_else(|| provider_error(provider, "response contained no choices", None))
}

pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, OPENAI_API_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, system_message: &str, prompt: &str) -> Result<String> {
        openai_style_complete(
            &self.client,
            self.name(),
            &self.base_url,
            &self.api_key,
            &self.model,
            system_message,
            prompt,
        )
        .await
    }
}

pub struct MistralProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl MistralProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, MISTRAL_API_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ChatProvider for MistralProvider {
    fn name(&self) -> &'static str {
        "mistral"
    }

    async fn complete(&self, system_message: &str, prompt: &str) -> Result<String> {
        openai_style_complete(
            &self.client,
            self.name(),
            &self.base_url,
            &self.api_key,
            &self.model,
            system_message,
            prompt,
        )
        .await
    }
}

// Gemini has no system role on this endpoint; the system message is
// prepended to the user prompt instead.
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: String,
}

pub struct GeminiProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, GEMINI_API_URL.to_string())
    }

    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, system_message: &str, prompt: &str) -> Result<String> {
        let full_prompt = format!("{}\n\n{}", system_message, prompt);
        let body = json!({
            "contents": [{"parts": [{"text": full_prompt}]}]
        });

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| provider_error(self.name(), "request failed", Some(e)))?;

        if !response.status().is_success() {
            return Err(provider_error(
                self.name(),
                format!("HTTP {}", response.status()),
                None,
            ));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| provider_error(self.name(), "unparseable response", Some(e)))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| provider_error(self.name(), "response contained no candidates", None))
    }
}

/// Providers tried in priority order until one succeeds
pub struct ProviderChain {
    providers: Vec<Box<dyn ChatProvider>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Box<dyn ChatProvider>>) -> Self {
        Self { providers }
    }

    /// Build the chain from configured priority order and environment keys.
    /// Providers whose key is absent are skipped.
    pub fn from_env(config: &LlmConfig) -> Self {
        let mut providers: Vec<Box<dyn ChatProvider>> = Vec::new();
        for name in &config.provider_order {
            match name.as_str() {
                "openai" => {
                    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
                        providers
                            .push(Box::new(OpenAiProvider::new(key, config.openai_model.clone())));
                    }
                }
                "gemini" => {
                    if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                        providers
                            .push(Box::new(GeminiProvider::new(key, config.gemini_model.clone())));
                    }
                }
                "mistral" => {
                    if let Ok(key) = std::env::var("MISTRAL_API_KEY") {
                        providers.push(Box::new(MistralProvider::new(
                            key,
                            config.mistral_model.clone(),
                        )));
                    }
                }
                other => warn!("Unknown LLM provider '{}' in config, skipping", other),
            }
        }
        Self { providers }
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Ask each provider in order; the first success wins.
    pub async fn complete(&self, system_message: &str, prompt: &str) -> Result<String> {
        if self.providers.is_empty() {
            return Err(ArchcostError::LlmExhausted(
                "no providers configured; set OPENAI_API_KEY, GEMINI_API_KEY or MISTRAL_API_KEY"
                    .to_string(),
            ));
        }

        let mut failures = Vec::new();
        for provider in &self.providers {
            info!("Trying LLM provider '{}'", provider.name());
            match provider.complete(system_message, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) => {
                    warn!("Provider '{}' failed: {}", provider.name(), e);
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }

        Err(ArchcostError::LlmExhausted(failures.join("; ")))
    }
}
