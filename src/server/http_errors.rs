use super::http_types::AdCopyResponse;
use crate::application::GenerationError;
use crate::infrastructure::{AuthError, CompletionError};
use axum::http::StatusCode;

pub(super) fn map_auth_error(err: &AuthError) -> (StatusCode, serde_json::Value) {
    match err {
        AuthError::MissingToken | AuthError::InvalidToken => (
            StatusCode::UNAUTHORIZED,
            serde_json::json!({ "error": "Unauthorized" }),
        ),
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            serde_json::json!({
                "error": "identity_provider_unavailable",
                "message": "Could not verify the session, please retry"
            }),
        ),
    }
}

/// Collapse the orchestrator's terminal states onto the canonical wire
/// schema. Provider-internal payloads are logged at the call site and never
/// forwarded here.
pub(super) fn map_generation_error(err: GenerationError) -> (StatusCode, serde_json::Value) {
    match err {
        GenerationError::Invalid(invalid) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({
                "error": "Missing required fields",
                "details": invalid.details
            }),
        ),
        GenerationError::QuotaExceeded { plan, limit } => (
            StatusCode::FORBIDDEN,
            serde_json::json!({
                "error": "ad_limit_reached",
                "message": format!(
                    "You have reached your monthly ad generation limit of {}. Please upgrade your plan.",
                    limit
                ),
                "currentPlan": plan.to_string()
            }),
        ),
        GenerationError::Upstream(CompletionError::Throttled) => (
            StatusCode::TOO_MANY_REQUESTS,
            serde_json::json!({
                "error": "upstream_throttled",
                "message": "The generation service is rate limiting requests, please retry shortly"
            }),
        ),
        GenerationError::Upstream(CompletionError::Timeout) => (
            StatusCode::GATEWAY_TIMEOUT,
            serde_json::json!({
                "error": "upstream_timeout",
                "message": "The generation service did not respond in time"
            }),
        ),
        GenerationError::Upstream(CompletionError::Format(details)) => (
            StatusCode::BAD_GATEWAY,
            serde_json::json!({
                "error": "upstream_format_error",
                "details": details
            }),
        ),
        GenerationError::Upstream(CompletionError::Unavailable(_)) => (
            StatusCode::BAD_GATEWAY,
            serde_json::json!({ "error": "upstream_unavailable" }),
        ),
        GenerationError::Unsaved { copy, .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({
                "error": "copy_not_saved",
                "message": "The ad copy was generated but could not be saved; it was not counted against your quota",
                "copy": AdCopyResponse::from_copy(copy)
            }),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            serde_json::json!({ "error": "internal_error", "message": "Please retry" }),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FieldErrors, InvalidBrief, PlanTier};

    #[test]
    fn quota_errors_carry_plan_and_limit() {
        let (status, body) = map_generation_error(GenerationError::QuotaExceeded {
            plan: PlanTier::Free,
            limit: 5,
        });
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "ad_limit_reached");
        assert_eq!(body["currentPlan"], "free");
    }

    #[test]
    fn validation_errors_expose_field_details() {
        let err = GenerationError::Invalid(InvalidBrief {
            details: FieldErrors {
                product: Some("Product is required".to_string()),
                ..Default::default()
            },
        });
        let (status, body) = map_generation_error(err);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["product"], "Product is required");
        assert!(body["details"]["usp"].is_null());
    }

    #[test]
    fn upstream_causes_map_to_distinct_statuses() {
        let timeout = map_generation_error(CompletionError::Timeout.into());
        assert_eq!(timeout.0, StatusCode::GATEWAY_TIMEOUT);

        let throttled = map_generation_error(CompletionError::Throttled.into());
        assert_eq!(throttled.0, StatusCode::TOO_MANY_REQUESTS);

        let format = map_generation_error(CompletionError::Format("bad".to_string()).into());
        assert_eq!(format.0, StatusCode::BAD_GATEWAY);
    }
}
