use crate::domain::PlanLimits;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub identity_base_url: String,
    pub server_host: String,
    pub server_port: u16,

    /// Tone used when the request omits one.
    pub default_tone: String,
    /// Upper bound on a single completion call, in seconds.
    pub generation_timeout_secs: u64,

    // Monthly generation caps per plan tier. Absent agency cap = uncapped.
    pub quota_free: i32,
    pub quota_starter: i32,
    pub quota_pro: i32,
    #[serde(default)]
    pub quota_agency: Option<i32>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("COPYFORGE").separator("_"))
            .set_default("server_host", "0.0.0.0")?
            .set_default("server_port", 8080)?
            .set_default("openai_base_url", "https://api.openai.com/v1")?
            .set_default("openai_model", "gpt-4-turbo-preview")?
            .set_default("identity_base_url", "https://api.clerk.com")?
            .set_default("default_tone", "professional")?
            .set_default("generation_timeout_secs", 10)?
            .set_default("quota_free", 5)?
            .set_default("quota_starter", 50)?
            .set_default("quota_pro", 100)?
            .build()?;

        config.try_deserialize()
    }

    pub fn plan_limits(&self) -> PlanLimits {
        PlanLimits {
            free: self.quota_free,
            starter: self.quota_starter,
            pro: self.quota_pro,
            agency: self.quota_agency,
        }
    }
}
