use crate::domain::{Account, GeneratedCopy, PlanTier, Platform, TargetingSuggestion};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Load the account for an identity-provider subject, creating it with
    /// the FREE tier and a zero counter on first sight (upsert semantics).
    #[must_use]
    async fn get_or_create(&self, subject: &str, email: &str) -> Result<Account, RepositoryError>;
    /// Zero the counter if `last_reset` falls in an earlier calendar month
    /// than `now`. The guard and the write are one atomic statement, so the
    /// reset happens exactly once per period transition regardless of
    /// concurrent requests. Returns the fresh row either way.
    #[must_use]
    async fn reset_if_period_elapsed(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Account, RepositoryError>;
    /// Plan changes arrive from the billing collaborator keyed by subject.
    #[must_use]
    async fn update_plan(&self, subject: &str, plan: PlanTier) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CopyRepository: Send + Sync {
    /// Store the copy and increment the owning account's counter in one
    /// transaction. The increment carries a `counter < limit` guard, so two
    /// concurrent requests racing for the last quota slot cannot both
    /// commit. Returns `(success, counter)`: on success the post-increment
    /// counter, on refusal the counter as it stood.
    #[must_use]
    async fn store_and_count(
        &self,
        copy: &GeneratedCopy,
        limit: Option<i32>,
    ) -> Result<(bool, i32), RepositoryError>;
    #[must_use]
    async fn list_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GeneratedCopy>, RepositoryError>;
}

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn get_or_create(&self, subject: &str, email: &str) -> Result<Account, RepositoryError> {
        let account = Account::new(subject.to_string(), email.to_string());

        sqlx::query(
            r#"
            INSERT INTO accounts (id, subject, email, plan, ads_generated, last_reset, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (subject) DO NOTHING
            "#,
        )
        .bind(account.id)
        .bind(&account.subject)
        .bind(&account.email)
        .bind(account.plan.to_string())
        .bind(account.ads_generated)
        .bind(account.last_reset)
        .bind(account.created_at)
        .bind(account.updated_at)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT id, subject, email, plan, ads_generated, last_reset, created_at, updated_at
            FROM accounts
            WHERE subject = $1
            "#,
        )
        .bind(subject)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound(format!("Account {}", subject)),
            _ => RepositoryError::DatabaseError(e),
        })?;

        row_to_account(&row)
    }

    async fn reset_if_period_elapsed(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Account, RepositoryError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET ads_generated = 0, last_reset = $2, updated_at = $2
            WHERE id = $1
              AND (date_part('month', last_reset) <> date_part('month', $2::timestamptz)
                   OR date_part('year', last_reset) <> date_part('year', $2::timestamptz))
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let row = sqlx::query(
            r#"
            SELECT id, subject, email, plan, ads_generated, last_reset, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => RepositoryError::NotFound(format!("Account {}", id)),
            _ => RepositoryError::DatabaseError(e),
        })?;

        row_to_account(&row)
    }

    async fn update_plan(&self, subject: &str, plan: PlanTier) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET plan = $1, updated_at = $2
            WHERE subject = $3
            "#,
        )
        .bind(plan.to_string())
        .bind(Utc::now())
        .bind(subject)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(format!("Account {}", subject)));
        }

        Ok(())
    }
}

fn row_to_account(row: &sqlx::postgres::PgRow) -> Result<Account, RepositoryError> {
    let plan_str: String = row.try_get("plan")?;
    let plan = PlanTier::from_str(&plan_str)
        .map_err(|_| RepositoryError::InvalidData(format!("Unknown plan: {}", plan_str)))?;

    Ok(Account {
        id: row.try_get("id")?,
        subject: row.try_get("subject")?,
        email: row.try_get("email")?,
        plan,
        ads_generated: row.try_get("ads_generated")?,
        last_reset: row.try_get("last_reset")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

pub struct PostgresCopyRepository {
    pool: PgPool,
}

impl PostgresCopyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CopyRepository for PostgresCopyRepository {
    async fn store_and_count(
        &self,
        copy: &GeneratedCopy,
        limit: Option<i32>,
    ) -> Result<(bool, i32), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let counted: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE accounts
            SET ads_generated = ads_generated + 1, updated_at = $3
            WHERE id = $1
              AND ($2::int IS NULL OR ads_generated < $2)
            RETURNING ads_generated
            "#,
        )
        .bind(copy.account_id)
        .bind(limit)
        .bind(Utc::now())
        .fetch_optional(&mut *tx)
        .await?;

        let counter = match counted {
            Some(counter) => counter,
            None => {
                // Quota raced out between the gate and the commit. Report the
                // standing counter so the caller can answer precisely.
                let current: i32 = sqlx::query_scalar(
                    "SELECT ads_generated FROM accounts WHERE id = $1",
                )
                .bind(copy.account_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| match e {
                    sqlx::Error::RowNotFound => {
                        RepositoryError::NotFound(format!("Account {}", copy.account_id))
                    }
                    _ => RepositoryError::DatabaseError(e),
                })?;
                tx.rollback().await?;
                return Ok((false, current));
            }
        };

        let targeting_json = copy
            .targeting
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| {
                RepositoryError::InvalidData(format!("Failed to serialize targeting: {}", e))
            })?;

        sqlx::query(
            r#"
            INSERT INTO generated_copies (id, account_id, platform, headline, body,
                                          call_to_action, targeting, recommended_budget, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(copy.id)
        .bind(copy.account_id)
        .bind(copy.platform.to_string())
        .bind(&copy.headline)
        .bind(&copy.body)
        .bind(&copy.call_to_action)
        .bind(targeting_json)
        .bind(&copy.recommended_budget)
        .bind(copy.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((true, counter))
    }

    async fn list_by_account(
        &self,
        account_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GeneratedCopy>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, platform, headline, body, call_to_action,
                   targeting, recommended_budget, created_at
            FROM generated_copies
            WHERE account_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(account_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(row_to_copy).collect()
    }
}

fn row_to_copy(row: &sqlx::postgres::PgRow) -> Result<GeneratedCopy, RepositoryError> {
    let platform_str: String = row.try_get("platform")?;
    let platform = Platform::from_str(&platform_str)
        .map_err(|_| RepositoryError::InvalidData(format!("Unknown platform: {}", platform_str)))?;

    let targeting: Option<TargetingSuggestion> = row
        .try_get::<Option<serde_json::Value>, _>("targeting")?
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| RepositoryError::InvalidData(format!("Invalid targeting data: {}", e)))?;

    Ok(GeneratedCopy {
        id: row.try_get("id")?,
        account_id: row.try_get("account_id")?,
        platform,
        headline: row.try_get("headline")?,
        body: row.try_get("body")?,
        call_to_action: row.try_get("call_to_action")?,
        targeting,
        recommended_budget: row.try_get("recommended_budget")?,
        created_at: row.try_get("created_at")?,
    })
}
