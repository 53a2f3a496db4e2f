use crate::application::{GenerationReceipt, UsageSummary};
use crate::domain::{GeneratedCopy, RawCopyBrief, TargetingSuggestion};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Serialize, ToSchema)]
pub(super) struct HealthResponse {
    pub(super) status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) error: Option<String>,
}

/// Body of `POST /generate`. Identity comes from the bearer token, never
/// from the body; any extra fields (including a client-supplied user id)
/// are ignored.
#[derive(Deserialize, ToSchema)]
pub(super) struct GenerateAdRequest {
    #[schema(example = "Acme Widget")]
    pub(super) product: Option<String>,
    #[schema(example = "homeowners")]
    pub(super) audience: Option<String>,
    #[schema(example = "30% cheaper than competitors")]
    pub(super) usp: Option<String>,
    #[schema(example = "friendly")]
    pub(super) tone: Option<String>,
    #[schema(example = "facebook")]
    pub(super) platform: Option<String>,
    pub(super) location: Option<String>,
    pub(super) demographic: Option<String>,
    pub(super) keywords: Option<String>,
}

impl From<GenerateAdRequest> for RawCopyBrief {
    fn from(req: GenerateAdRequest) -> Self {
        Self {
            product: req.product,
            audience: req.audience,
            usp: req.usp,
            tone: req.tone,
            platform: req.platform,
            location: req.location,
            demographic: req.demographic,
            keywords: req.keywords,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct TargetingResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) radius_miles: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) demographic: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub(super) keywords: Vec<String>,
}

impl From<TargetingSuggestion> for TargetingResponse {
    fn from(t: TargetingSuggestion) -> Self {
        Self {
            radius_miles: t.radius_miles,
            demographic: t.demographic,
            keywords: t.keywords,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct AdCopyResponse {
    pub(super) headline: String,
    pub(super) body: String,
    pub(super) call_to_action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) targeting: Option<TargetingResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) recommended_budget: Option<String>,
    /// Absent on uncapped plans.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) ads_remaining: Option<i32>,
}

impl AdCopyResponse {
    pub(super) fn from_copy(copy: GeneratedCopy) -> Self {
        Self {
            headline: copy.headline,
            body: copy.body,
            call_to_action: copy.call_to_action,
            targeting: copy.targeting.map(Into::into),
            recommended_budget: copy.recommended_budget,
            ads_remaining: None,
        }
    }
}

impl From<GenerationReceipt> for AdCopyResponse {
    fn from(receipt: GenerationReceipt) -> Self {
        let ads_remaining = receipt.ads_remaining;
        let mut response = Self::from_copy(receipt.copy);
        response.ads_remaining = ads_remaining;
        response
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct UsageResponse {
    pub(super) plan: String,
    pub(super) ads_generated: i32,
    pub(super) limit: Option<i32>,
    pub(super) ads_remaining: Option<i32>,
    pub(super) last_reset: chrono::DateTime<chrono::Utc>,
}

impl From<UsageSummary> for UsageResponse {
    fn from(summary: UsageSummary) -> Self {
        Self {
            plan: summary.plan.to_string(),
            ads_generated: summary.ads_generated,
            limit: summary.limit,
            ads_remaining: summary.ads_remaining,
            last_reset: summary.last_reset,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct CopySummaryResponse {
    pub(super) id: Uuid,
    pub(super) platform: String,
    pub(super) headline: String,
    pub(super) body: String,
    pub(super) call_to_action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) recommended_budget: Option<String>,
    pub(super) created_at: chrono::DateTime<chrono::Utc>,
}

impl From<GeneratedCopy> for CopySummaryResponse {
    fn from(copy: GeneratedCopy) -> Self {
        Self {
            id: copy.id,
            platform: copy.platform.to_string(),
            headline: copy.headline,
            body: copy.body,
            call_to_action: copy.call_to_action,
            recommended_budget: copy.recommended_budget,
            created_at: copy.created_at,
        }
    }
}

#[derive(Deserialize, Debug, IntoParams, ToSchema)]
pub(super) struct PaginationParams {
    #[serde(default = "default_limit")]
    #[param(default = 20, maximum = 100)]
    pub(super) limit: i64,
    #[serde(default)]
    #[param(default = 0)]
    pub(super) offset: i64,
}

pub(super) fn default_limit() -> i64 {
    20
}
