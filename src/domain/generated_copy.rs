use crate::domain::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// A stored, immutable piece of ad copy. Created only from a schema-valid
/// model response and persisted exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedCopy {
    pub id: Uuid,
    pub account_id: Uuid,
    pub platform: Platform,
    pub headline: String,
    pub body: String,
    pub call_to_action: String,
    pub targeting: Option<TargetingSuggestion>,
    pub recommended_budget: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TargetingSuggestion {
    pub radius_miles: Option<i32>,
    pub demographic: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// The model's raw output shape. Accepts both `cta` and `callToAction`
/// spellings; everything is optional here so that a missing field is
/// reported as a format error rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdCopyDraft {
    pub headline: Option<String>,
    pub body: Option<String>,
    #[serde(alias = "callToAction", alias = "call_to_action")]
    pub cta: Option<String>,
    pub targeting: Option<TargetingSuggestion>,
    #[serde(alias = "recommendedBudget")]
    pub recommended_budget: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("response missing required field: {0}")]
pub struct MissingDraftField(pub &'static str);

fn required(value: Option<String>, field: &'static str) -> Result<String, MissingDraftField> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(MissingDraftField(field))
}

impl AdCopyDraft {
    /// Promote a draft into a domain `GeneratedCopy`. Fails if any of the
    /// required fields (headline, body, cta) is absent or blank.
    pub fn into_copy(
        self,
        account_id: Uuid,
        platform: Platform,
    ) -> Result<GeneratedCopy, MissingDraftField> {
        Ok(GeneratedCopy {
            id: Uuid::new_v4(),
            account_id,
            platform,
            headline: required(self.headline, "headline")?,
            body: required(self.body, "body")?,
            call_to_action: required(self.cta, "cta")?,
            targeting: self.targeting,
            recommended_budget: self.recommended_budget,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> AdCopyDraft {
        AdCopyDraft {
            headline: Some("Half the price, twice the shine".to_string()),
            body: Some("Acme Widget does the job for 30% less.".to_string()),
            cta: Some("Shop now".to_string()),
            targeting: None,
            recommended_budget: Some("$20/day".to_string()),
        }
    }

    #[test]
    fn complete_draft_promotes() {
        let copy = draft()
            .into_copy(Uuid::new_v4(), Platform::Facebook)
            .unwrap();
        assert_eq!(copy.call_to_action, "Shop now");
        assert_eq!(copy.recommended_budget.as_deref(), Some("$20/day"));
    }

    #[test]
    fn missing_cta_is_rejected() {
        let mut d = draft();
        d.cta = None;
        let err = d.into_copy(Uuid::new_v4(), Platform::Generic).unwrap_err();
        assert_eq!(err, MissingDraftField("cta"));
    }

    #[test]
    fn blank_headline_is_rejected() {
        let mut d = draft();
        d.headline = Some("   ".to_string());
        let err = d.into_copy(Uuid::new_v4(), Platform::Generic).unwrap_err();
        assert_eq!(err, MissingDraftField("headline"));
    }

    #[test]
    fn draft_accepts_camel_case_aliases() {
        let json = serde_json::json!({
            "headline": "h",
            "body": "b",
            "callToAction": "c",
            "recommendedBudget": "$5/day",
            "targeting": {"radius_miles": 25, "demographic": "ages 30-55", "keywords": ["widgets"]}
        });
        let d: AdCopyDraft = serde_json::from_value(json).unwrap();
        assert_eq!(d.cta.as_deref(), Some("c"));
        let t = d.targeting.as_ref().unwrap();
        assert_eq!(t.radius_miles, Some(25));
        assert_eq!(d.recommended_budget.as_deref(), Some("$5/day"));
    }
}
