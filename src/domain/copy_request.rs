use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use thiserror::Error;
use validator::Validate;

/// Advertising surface the copy is written for. Drives the character
/// budgets handed to the model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Facebook,
    Google,
    Instagram,
    Linkedin,
    Tiktok,
    Generic,
}

impl Default for Platform {
    fn default() -> Self {
        Platform::Generic
    }
}

/// A generation request exactly as the client sent it, before any
/// normalization. Field order mirrors the wire schema.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RawCopyBrief {
    #[validate(length(max = 200))]
    pub product: Option<String>,
    #[validate(length(max = 300))]
    pub audience: Option<String>,
    #[validate(length(max = 500))]
    pub usp: Option<String>,
    pub tone: Option<String>,
    pub platform: Option<String>,
    pub location: Option<String>,
    pub demographic: Option<String>,
    pub keywords: Option<String>,
}

/// A validated, trimmed brief. Every downstream component works on this
/// shape; nothing past validation re-checks the inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CopyBrief {
    pub product: String,
    pub audience: String,
    pub usp: String,
    pub tone: String,
    pub platform: Platform,
    pub location: Option<String>,
    pub demographic: Option<String>,
    pub keywords: Option<String>,
}

/// Per-field problem report for the 400 response. Fields that passed
/// serialize as `null`, matching the canonical error schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FieldErrors {
    pub product: Option<String>,
    pub audience: Option<String>,
    pub usp: Option<String>,
    pub platform: Option<String>,
}

impl FieldErrors {
    fn is_empty(&self) -> bool {
        self.product.is_none()
            && self.audience.is_none()
            && self.usp.is_none()
            && self.platform.is_none()
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("Missing required fields")]
pub struct InvalidBrief {
    pub details: FieldErrors,
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

impl RawCopyBrief {
    /// Normalize and check the brief. Pure: no I/O, no state, same result
    /// for the same input every time. Must run before the quota gate so a
    /// malformed request never consumes quota.
    pub fn validate_brief(&self, default_tone: &str) -> Result<CopyBrief, InvalidBrief> {
        let mut details = FieldErrors::default();

        let product = trimmed(&self.product);
        if product.is_none() {
            details.product = Some("Product is required".to_string());
        }
        let audience = trimmed(&self.audience);
        if audience.is_none() {
            details.audience = Some("Target audience is required".to_string());
        }
        let usp = trimmed(&self.usp);
        if usp.is_none() {
            details.usp = Some("Unique selling points are required".to_string());
        }

        let platform = match trimmed(&self.platform) {
            Some(raw) => match Platform::from_str(&raw.to_lowercase()) {
                Ok(p) => p,
                Err(_) => {
                    details.platform = Some(format!("Unknown platform: {}", raw));
                    Platform::Generic
                }
            },
            None => Platform::Generic,
        };

        if let Err(errors) = self.validate() {
            let too_long = errors.field_errors();
            if too_long.contains_key("product") {
                details.product.get_or_insert("Product is too long".to_string());
            }
            if too_long.contains_key("audience") {
                details
                    .audience
                    .get_or_insert("Target audience is too long".to_string());
            }
            if too_long.contains_key("usp") {
                details
                    .usp
                    .get_or_insert("Unique selling points are too long".to_string());
            }
        }

        if !details.is_empty() {
            return Err(InvalidBrief { details });
        }

        Ok(CopyBrief {
            product: product.unwrap_or_default(),
            audience: audience.unwrap_or_default(),
            usp: usp.unwrap_or_default(),
            tone: trimmed(&self.tone).unwrap_or_else(|| default_tone.to_string()),
            platform,
            location: trimmed(&self.location),
            demographic: trimmed(&self.demographic),
            keywords: trimmed(&self.keywords),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_brief() -> RawCopyBrief {
        RawCopyBrief {
            product: Some("Acme Widget".to_string()),
            audience: Some("homeowners".to_string()),
            usp: Some("30% cheaper".to_string()),
            tone: Some("friendly".to_string()),
            platform: Some("facebook".to_string()),
            location: Some("  Austin, TX ".to_string()),
            demographic: None,
            keywords: Some("".to_string()),
        }
    }

    #[test]
    fn valid_brief_is_trimmed_and_normalized() {
        let brief = full_brief().validate_brief("professional").unwrap();
        assert_eq!(brief.product, "Acme Widget");
        assert_eq!(brief.platform, Platform::Facebook);
        assert_eq!(brief.location.as_deref(), Some("Austin, TX"));
        assert_eq!(brief.keywords, None);
    }

    #[test]
    fn missing_required_fields_reported_per_field() {
        let raw = RawCopyBrief {
            product: Some("   ".to_string()),
            usp: Some("fast".to_string()),
            ..Default::default()
        };
        let err = raw.validate_brief("professional").unwrap_err();
        assert_eq!(err.details.product.as_deref(), Some("Product is required"));
        assert_eq!(
            err.details.audience.as_deref(),
            Some("Target audience is required")
        );
        assert!(err.details.usp.is_none());
    }

    #[test]
    fn tone_defaults_when_absent() {
        let mut raw = full_brief();
        raw.tone = None;
        let brief = raw.validate_brief("professional").unwrap();
        assert_eq!(brief.tone, "professional");
    }

    #[test]
    fn missing_platform_falls_back_to_generic() {
        let mut raw = full_brief();
        raw.platform = None;
        let brief = raw.validate_brief("professional").unwrap();
        assert_eq!(brief.platform, Platform::Generic);
    }

    #[test]
    fn unknown_platform_is_a_validation_failure() {
        let mut raw = full_brief();
        raw.platform = Some("myspace".to_string());
        let err = raw.validate_brief("professional").unwrap_err();
        assert_eq!(
            err.details.platform.as_deref(),
            Some("Unknown platform: myspace")
        );
    }

    #[test]
    fn validation_is_idempotent() {
        let raw = RawCopyBrief::default();
        let first = raw.validate_brief("professional").unwrap_err();
        let second = raw.validate_brief("professional").unwrap_err();
        assert_eq!(first, second);
    }

    #[test]
    fn overlong_product_is_rejected() {
        let mut raw = full_brief();
        raw.product = Some("x".repeat(201));
        let err = raw.validate_brief("professional").unwrap_err();
        assert!(err.details.product.is_some());
    }
}
