use crate::domain::{
    Account, GeneratedCopy, InvalidBrief, PlanLimits, PlanTier, RawCopyBrief,
};
use crate::infrastructure::{
    AccountRepository, CompletionError, CopyGenerator, CopyRepository, RepositoryError,
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Missing required fields")]
    Invalid(#[from] InvalidBrief),
    #[error("Monthly ad generation limit reached: {limit} on plan {plan}")]
    QuotaExceeded { plan: PlanTier, limit: i32 },
    #[error("Generation failed: {0}")]
    Upstream(#[from] CompletionError),
    #[error("Generated copy could not be saved")]
    Unsaved {
        copy: GeneratedCopy,
        source: RepositoryError,
    },
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// What a successful generation hands back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReceipt {
    pub copy: GeneratedCopy,
    pub plan: PlanTier,
    /// `None` on uncapped plans.
    pub ads_remaining: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UsageSummary {
    pub plan: PlanTier,
    pub ads_generated: i32,
    pub limit: Option<i32>,
    pub ads_remaining: Option<i32>,
    pub last_reset: DateTime<Utc>,
}

/// Sequences a generation request: validate, gate on quota, call the model,
/// persist and count. Each step either advances or maps to exactly one
/// terminal error; nothing is retried here.
pub struct CopyStudioService<A, C, G>
where
    A: AccountRepository,
    C: CopyRepository,
    G: CopyGenerator,
{
    account_repo: Arc<A>,
    copy_repo: Arc<C>,
    generator: Arc<G>,
    limits: PlanLimits,
    default_tone: String,
}

impl<A, C, G> CopyStudioService<A, C, G>
where
    A: AccountRepository,
    C: CopyRepository,
    G: CopyGenerator,
{
    pub fn new(
        account_repo: Arc<A>,
        copy_repo: Arc<C>,
        generator: Arc<G>,
        limits: PlanLimits,
        default_tone: String,
    ) -> Self {
        Self {
            account_repo,
            copy_repo,
            generator,
            limits,
            default_tone,
        }
    }

    /// Load the caller's account and roll the counter over if a new billing
    /// month has started. Any store failure surfaces as an error: the gate
    /// fails closed, it never allows generation on a missing account.
    async fn current_account(
        &self,
        subject: &str,
        email: &str,
    ) -> Result<Account, RepositoryError> {
        let account = self.account_repo.get_or_create(subject, email).await?;

        let now = Utc::now();
        if account.period_elapsed(now) {
            info!(subject = %account.subject, "Resetting monthly generation counter");
            return self.account_repo.reset_if_period_elapsed(account.id, now).await;
        }

        Ok(account)
    }

    pub async fn generate(
        &self,
        subject: &str,
        email: &str,
        raw: &RawCopyBrief,
    ) -> Result<GenerationReceipt, GenerationError> {
        // Validation runs before any store or network access, so malformed
        // input never consumes quota.
        let brief = raw.validate_brief(&self.default_tone)?;

        let account = self.current_account(subject, email).await?;

        let limit = self.limits.limit_for(account.plan);
        if let Some(cap) = limit {
            if account.ads_generated >= cap {
                info!(subject = %account.subject, plan = %account.plan, cap, "Generation denied: limit reached");
                return Err(GenerationError::QuotaExceeded {
                    plan: account.plan,
                    limit: cap,
                });
            }
        }

        let copy = self.generator.generate(account.id, &brief).await?;

        match self.copy_repo.store_and_count(&copy, limit).await {
            Ok((true, counter)) => {
                info!(subject = %account.subject, copy_id = %copy.id, "Stored generated copy");
                Ok(GenerationReceipt {
                    copy,
                    plan: account.plan,
                    ads_remaining: limit.map(|cap| (cap - counter).max(0)),
                })
            }
            Ok((false, _)) => {
                // A concurrent request took the last slot between the gate
                // check and the commit.
                warn!(subject = %account.subject, "Quota exhausted while persisting");
                Err(GenerationError::QuotaExceeded {
                    plan: account.plan,
                    limit: limit.unwrap_or(0),
                })
            }
            Err(source) => {
                warn!(subject = %account.subject, error = %source, "Generated copy not saved");
                Err(GenerationError::Unsaved { copy, source })
            }
        }
    }

    pub async fn usage(
        &self,
        subject: &str,
        email: &str,
    ) -> Result<UsageSummary, GenerationError> {
        let account = self.current_account(subject, email).await?;
        let limit = self.limits.limit_for(account.plan);

        Ok(UsageSummary {
            plan: account.plan,
            ads_generated: account.ads_generated,
            limit,
            ads_remaining: limit.map(|cap| (cap - account.ads_generated).max(0)),
            last_reset: account.last_reset,
        })
    }

    pub async fn history(
        &self,
        subject: &str,
        email: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GeneratedCopy>, GenerationError> {
        let account = self.current_account(subject, email).await?;
        Ok(self
            .copy_repo
            .list_by_account(account.id, limit, offset)
            .await?)
    }
}
