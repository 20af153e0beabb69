use anyhow::{Context, Result};
use futures_util::{Stream, StreamExt};
use reqwest::Client;
use serde::Serialize;
use std::borrow::Cow;
use std::pin::Pin;
use tracing::debug;

use super::Translator;
use super::language::language_name;
use super::prompt::build_system_prompt;
use super::sse_parser::sse_to_text_stream;
use crate::error::Error;

#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub source_text: String,
    pub source_language: String,
    pub target_language: String,
    pub model: String,
}

// Use Cow to avoid cloning strings that are only borrowed for serialization
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: Cow<'a, str>,
}

#[derive(Debug, Clone)]
pub struct TranslationClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl TranslationClient {
    pub fn new(endpoint: String, api_key: Option<String>, model: String) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            model,
        }
    }

    pub async fn translate_stream(
        &self,
        request: &TranslationRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String>> + Send>>> {
        let url = format!(
            "{}/v1/chat/completions",
            self.endpoint.trim_end_matches('/')
        );

        let system_prompt = build_system_prompt(
            language_name(&request.source_language).unwrap_or(request.source_language.as_str()),
            language_name(&request.target_language).unwrap_or(request.target_language.as_str()),
        );

        let chat_request = ChatCompletionRequest {
            model: &request.model,
            messages: vec![
                Message {
                    role: "system",
                    content: Cow::Owned(system_prompt),
                },
                Message {
                    role: "user",
                    content: Cow::Borrowed(&request.source_text),
                },
            ],
            stream: true,
        };

        let mut http_request = self.client.post(&url).json(&chat_request);

        if let Some(api_key) = &self.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request
            .send()
            .await
            .with_context(|| format!("Failed to connect to API endpoint: {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API request failed with status {status}: {body}");
        }

        Ok(Box::pin(sse_to_text_stream(response.bytes_stream())))
    }

    async fn translate_to_string(&self, request: &TranslationRequest) -> Result<String> {
        let mut stream = self.translate_stream(request).await?;
        let mut translated = String::new();

        while let Some(chunk) = stream.next().await {
            translated.push_str(&chunk?);
        }

        Ok(translated.trim().to_string())
    }
}

impl Translator for TranslationClient {
    async fn translate(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> crate::error::Result<String> {
        // Empty input translates to empty output without a request.
        if text.is_empty() {
            return Ok(String::new());
        }

        let request = TranslationRequest {
            source_text: text.to_string(),
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            model: self.model.clone(),
        };

        debug!(
            from = source_language,
            to = target_language,
            chars = text.chars().count(),
            "Requesting translation"
        );

        self.translate_to_string(&request)
            .await
            .map_err(|e| Error::Translation(format!("{e:#}")))
    }
}
