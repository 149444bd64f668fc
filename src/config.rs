use serde::Deserialize;

/// Bearer-token lifecycle settings.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    pub ttl_minutes: i64,
    pub reuse_window_secs: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub token: TokenConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let token = TokenConfig {
            ttl_minutes: std::env::var("TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            reuse_window_secs: std::env::var("TOKEN_REUSE_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
        };
        Ok(Self {
            database_url,
            token,
        })
    }
}
