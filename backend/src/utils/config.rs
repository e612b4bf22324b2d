use anyhow::Result;
use std::env;
use crate::constants::{DEFAULT_SERVER_PORT, DEFAULT_SESSION_INACTIVITY_MINUTES};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub session_inactivity_minutes: i64,
    pub secure_cookies: bool,
    pub allowed_origins: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_SERVER_PORT.to_string())
                .parse()
                .unwrap_or(DEFAULT_SERVER_PORT),
            session_inactivity_minutes: env::var("SESSION_INACTIVITY_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|minutes: &i64| *minutes > 0)
                .unwrap_or(DEFAULT_SESSION_INACTIVITY_MINUTES),
            secure_cookies: env::var("SECURE_COOKIES")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
            allowed_origins: env::var("ALLOWED_ORIGINS").ok(),
        })
    }
}
