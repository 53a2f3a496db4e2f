use crate::application::CopyStudioService;
use crate::infrastructure::{
    AppConfig, HttpSessionVerifier, OpenAiClient, PostgresAccountRepository,
    PostgresCopyRepository,
};
use anyhow::Context;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

pub type CopyStudioServiceType =
    CopyStudioService<PostgresAccountRepository, PostgresCopyRepository, OpenAiClient>;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub studio: Arc<CopyStudioServiceType>,
    pub verifier: Arc<HttpSessionVerifier>,
}

/// Build full state from config + an existing pool.
///
/// Intended for embedding into a larger service that already manages a `PgPool`.
pub async fn build_state_with_pool(
    config: AppConfig,
    pool: PgPool,
    run_migrations: bool,
) -> anyhow::Result<AppState> {
    if run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("run migrations")?;
    }

    let generator = Arc::new(
        OpenAiClient::new(
            &config.openai_api_key,
            config.openai_base_url.clone(),
            config.openai_model.clone(),
            Duration::from_secs(config.generation_timeout_secs),
        )
        .context("init OpenAI client")?,
    );

    let verifier = Arc::new(
        HttpSessionVerifier::new(config.identity_base_url.clone()).context("init session verifier")?,
    );

    let account_repo = Arc::new(PostgresAccountRepository::new(pool.clone()));
    let copy_repo = Arc::new(PostgresCopyRepository::new(pool.clone()));

    let studio = Arc::new(CopyStudioService::new(
        account_repo,
        copy_repo,
        generator,
        config.plan_limits(),
        config.default_tone,
    ));

    Ok(AppState {
        pool,
        studio,
        verifier,
    })
}

/// Build state for the standalone server.
///
/// Creates the `PgPool`, runs migrations, and wires repositories/services.
pub async fn build_state_from_env(config: AppConfig) -> anyhow::Result<AppState> {
    let pool = PgPool::connect(&config.database_url)
        .await
        .context("connect database")?;
    build_state_with_pool(config, pool, true).await
}
