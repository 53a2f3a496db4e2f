use crate::domain::{AdCopyDraft, CopyBrief, GeneratedCopy, Platform};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Generation service unavailable: {0}")]
    Unavailable(String),
    #[error("Generation request timed out")]
    Timeout,
    #[error("Rate limited by generation service")]
    Throttled,
    #[error("Malformed generation response: {0}")]
    Format(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Seam for the external text-generation service. Injected into the
/// application service so tests can substitute a double and count calls.
#[async_trait]
pub trait CopyGenerator: Send + Sync {
    /// Produce platform-ready copy for a validated brief. Must not touch
    /// the account store; `account_id` only stamps ownership on the result.
    async fn generate(
        &self,
        account_id: Uuid,
        brief: &CopyBrief,
    ) -> Result<GeneratedCopy, CompletionError>;
}

pub struct OpenAiClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(
        api_key: &str,
        base_url: String,
        model: String,
        timeout: Duration,
    ) -> Result<Self, CompletionError> {
        let mut headers = header::HeaderMap::new();
        let auth_value = match header::HeaderValue::from_str(&format!("Bearer {}", api_key)) {
            Ok(val) => val,
            Err(e) => {
                return Err(CompletionError::InvalidConfig(format!(
                    "Invalid API key format: {}",
                    e
                )))
            }
        };
        headers.insert(header::AUTHORIZATION, auth_value);
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| {
                CompletionError::InvalidConfig(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            model,
        })
    }
}

const SYSTEM_PROMPT: &str = "You are an expert copywriter specializing in creating \
high-converting ad copy. Your responses should be concise, compelling, and formatted as JSON.";

/// Character budgets the major ad networks enforce, restated as prompt
/// constraints so the model stays inside them.
fn platform_constraints(platform: Platform) -> &'static str {
    match platform {
        Platform::Facebook => "Headline must be at most 40 characters, body at most 125 characters.",
        Platform::Google => "Headline must be at most 30 characters, body at most 90 characters.",
        Platform::Instagram => {
            "Headline must be at most 40 characters, body at most 125 characters and hashtag-friendly."
        }
        Platform::Linkedin => "Headline must be at most 70 characters, body at most 150 characters.",
        Platform::Tiktok => {
            "Headline must be at most 40 characters, body at most 80 characters, casual voice."
        }
        Platform::Generic => "Headline must be at most 60 characters, body at most 90 words.",
    }
}

fn build_prompt(brief: &CopyBrief) -> String {
    let mut prompt = format!(
        "Create a compelling ad copy for the following:\n\
         Product/Service: {}\n\
         Target Audience: {}\n\
         Unique Selling Points: {}\n\
         Tone: {}\n\
         Platform: {}\n",
        brief.product, brief.audience, brief.usp, brief.tone, brief.platform
    );

    if let Some(location) = &brief.location {
        prompt.push_str(&format!("Location: {}\n", location));
    }
    if let Some(demographic) = &brief.demographic {
        prompt.push_str(&format!("Demographic: {}\n", demographic));
    }
    if let Some(keywords) = &brief.keywords {
        prompt.push_str(&format!("Keywords: {}\n", keywords));
    }

    prompt.push_str(&format!(
        "\nConstraints: {} The call to action must be at most 30 characters.\n\
         \nRespond with a JSON object with \"headline\", \"body\" and \"cta\" fields. \
         You may also include a \"targeting\" object with \"radius_miles\", \"demographic\" \
         and \"keywords\" fields, and a \"recommendedBudget\" string.",
        platform_constraints(brief.platform)
    ));

    prompt
}

/// Strict parse of the model's message content. Anything that is not a JSON
/// object carrying the required fields is a format error, never empty copy.
fn draft_from_content(content: &str) -> Result<AdCopyDraft, CompletionError> {
    serde_json::from_str(content).map_err(|e| CompletionError::Format(e.to_string()))
}

#[async_trait]
impl CopyGenerator for OpenAiClient {
    async fn generate(
        &self,
        account_id: Uuid,
        brief: &CopyBrief,
    ) -> Result<GeneratedCopy, CompletionError> {
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(brief) }
            ],
            "response_format": { "type": "json_object" },
        });

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CompletionError::Timeout
                } else {
                    CompletionError::Unavailable(e.to_string())
                }
            })?;

        let status = resp.status();
        if status.as_u16() == 429 {
            return Err(CompletionError::Throttled);
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %text, "Completion request rejected");
            return Err(CompletionError::Unavailable(format!("status {}", status)));
        }

        let envelope: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| CompletionError::Format(e.to_string()))?;

        let content = envelope
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str())
            .ok_or_else(|| CompletionError::Format("Missing message content".to_string()))?;

        let draft = draft_from_content(content)?;
        let copy = draft
            .into_copy(account_id, brief.platform)
            .map_err(|e| CompletionError::Format(e.to_string()))?;

        info!(platform = %brief.platform, "Generated ad copy");
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brief() -> CopyBrief {
        CopyBrief {
            product: "Acme Widget".to_string(),
            audience: "homeowners".to_string(),
            usp: "30% cheaper".to_string(),
            tone: "friendly".to_string(),
            platform: Platform::Facebook,
            location: Some("Austin, TX".to_string()),
            demographic: None,
            keywords: None,
        }
    }

    #[test]
    fn prompt_carries_brief_fields_and_platform_budget() {
        let prompt = build_prompt(&brief());
        assert!(prompt.contains("Product/Service: Acme Widget"));
        assert!(prompt.contains("Target Audience: homeowners"));
        assert!(prompt.contains("Unique Selling Points: 30% cheaper"));
        assert!(prompt.contains("Tone: friendly"));
        assert!(prompt.contains("Location: Austin, TX"));
        assert!(prompt.contains("at most 40 characters"));
        assert!(!prompt.contains("Demographic:"));
    }

    #[test]
    fn generic_platform_uses_word_budget() {
        let mut b = brief();
        b.platform = Platform::Generic;
        let prompt = build_prompt(&b);
        assert!(prompt.contains("at most 90 words"));
    }

    #[test]
    fn well_formed_content_parses() {
        let draft = draft_from_content(
            r#"{"headline": "h", "body": "b", "cta": "Shop now"}"#,
        )
        .unwrap();
        assert_eq!(draft.cta.as_deref(), Some("Shop now"));
    }

    #[test]
    fn free_text_content_is_a_format_error() {
        let err = draft_from_content("Headline: Buy now\n\nBody: It's great").unwrap_err();
        assert!(matches!(err, CompletionError::Format(_)));
    }

    #[test]
    fn draft_missing_cta_fails_promotion() {
        let draft = draft_from_content(r#"{"headline": "h", "body": "b"}"#).unwrap();
        let err = draft
            .into_copy(Uuid::new_v4(), Platform::Facebook)
            .unwrap_err();
        assert_eq!(err.to_string(), "response missing required field: cta");
    }
}
