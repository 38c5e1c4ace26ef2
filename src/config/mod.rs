use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_host: String,
    pub server_port: u16,
    pub api_base_uri: String,
    pub parent_token_expiration_secs: u64,
    pub child_token_expiration_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        // Token lifetimes accept an optional `h` suffix, e.g. "24h".
        let parent_token_expiration = env::var("PARENT_TOKEN_EXPIRATION")
            .unwrap_or_default()
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(24);
        let child_token_expiration = env::var("CHILD_TOKEN_EXPIRATION")
            .unwrap_or_default()
            .trim_end_matches('h')
            .parse::<u64>()
            .unwrap_or(12);
        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            jwt_secret: env::var("JWT_SECRET")?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "::".to_string()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            api_base_uri: env::var("API_BASE_URI").unwrap_or_else(|_| "/api".to_string()),
            parent_token_expiration_secs: parent_token_expiration * 3600,
            child_token_expiration_secs: child_token_expiration * 3600,
        })
    }

    pub fn parent_token_expiration(&self) -> Duration {
        Duration::from_secs(self.parent_token_expiration_secs)
    }

    pub fn child_token_expiration(&self) -> Duration {
        Duration::from_secs(self.child_token_expiration_secs)
    }
}
