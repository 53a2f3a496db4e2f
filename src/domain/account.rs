use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    pub id: Uuid,
    /// Identity-provider subject id. Unique and immutable.
    pub subject: String,
    pub email: String,
    pub plan: PlanTier,
    pub ads_generated: i32,
    pub last_reset: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Starter,
    Pro,
    Agency,
}

/// Monthly generation caps per plan tier. `None` means uncapped.
///
/// The numbers are configuration, not business logic; `AppConfig` overrides
/// the defaults from the environment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PlanLimits {
    pub free: i32,
    pub starter: i32,
    pub pro: i32,
    pub agency: Option<i32>,
}

impl Default for PlanLimits {
    fn default() -> Self {
        Self {
            free: 5,
            starter: 50,
            pro: 100,
            agency: None,
        }
    }
}

impl PlanLimits {
    pub fn limit_for(&self, plan: PlanTier) -> Option<i32> {
        match plan {
            PlanTier::Free => Some(self.free),
            PlanTier::Starter => Some(self.starter),
            PlanTier::Pro => Some(self.pro),
            PlanTier::Agency => self.agency,
        }
    }
}

impl Account {
    pub fn new(subject: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            subject,
            email,
            plan: PlanTier::Free,
            ads_generated: 0,
            last_reset: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stand-in address until the identity provider resolves the real one.
    pub fn placeholder_email(subject: &str) -> String {
        format!("{}@placeholder.email", subject)
    }

    /// True when `last_reset` falls in an earlier calendar month (or year)
    /// than `now`, i.e. the counter is due for its once-per-period reset.
    pub fn period_elapsed(&self, now: DateTime<Utc>) -> bool {
        self.last_reset.month() != now.month() || self.last_reset.year() != now.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn limit_table_matches_tiers() {
        let limits = PlanLimits::default();
        assert_eq!(limits.limit_for(PlanTier::Free), Some(5));
        assert_eq!(limits.limit_for(PlanTier::Starter), Some(50));
        assert_eq!(limits.limit_for(PlanTier::Pro), Some(100));
        assert_eq!(limits.limit_for(PlanTier::Agency), None);
    }

    #[test]
    fn period_elapsed_across_month_boundary() {
        let mut account = Account::new("user-1".to_string(), "u@example.com".to_string());
        account.last_reset = Utc.with_ymd_and_hms(2025, 3, 31, 23, 0, 0).unwrap();

        let same_month = Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 0).unwrap();
        assert!(!account.period_elapsed(same_month));

        let next_month = Utc.with_ymd_and_hms(2025, 4, 1, 0, 1, 0).unwrap();
        assert!(account.period_elapsed(next_month));
    }

    #[test]
    fn period_elapsed_same_month_different_year() {
        let mut account = Account::new("user-1".to_string(), "u@example.com".to_string());
        account.last_reset = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();

        let next_year = Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap();
        assert!(account.period_elapsed(next_year));
    }

    #[test]
    fn plan_tier_round_trips_through_strings() {
        use std::str::FromStr;
        assert_eq!(PlanTier::Free.to_string(), "free");
        assert_eq!(PlanTier::from_str("agency").unwrap(), PlanTier::Agency);
        assert!(PlanTier::from_str("platinum").is_err());
    }
}
