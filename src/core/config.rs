use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub admin_api: AdminApiConfig,
    pub reorder: ReorderConfig,
}

/// Connection settings for the admin categories API
#[derive(Debug, Clone)]
pub struct AdminApiConfig {
    /// Base URL without trailing slash, e.g. `https://shop.example.com`
    pub base_url: String,
    /// Bearer token forwarded on every request (optional)
    pub access_token: Option<String>,
    pub timeout: Duration,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct ReorderConfig {
    /// Retries after a stale-version rejection (0 = single attempt)
    pub max_retries: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            admin_api: AdminApiConfig::from_env()?,
            reorder: ReorderConfig::from_env()?,
        })
    }
}

impl AdminApiConfig {
    const DEFAULT_TIMEOUT_SECS: u64 = 10;
    const DEFAULT_USER_AGENT: &'static str = "PharmacyCatalogAdmin/1.0";

    pub fn from_env() -> Result<Self, String> {
        let base_url = env::var("ADMIN_API_BASE_URL")
            .map_err(|_| "ADMIN_API_BASE_URL must be set".to_string())?;

        let access_token = env::var("ADMIN_API_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        let timeout_secs = env::var("ADMIN_API_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "ADMIN_API_TIMEOUT_SECS must be a valid number".to_string())?;

        let user_agent = env::var("ADMIN_API_USER_AGENT")
            .unwrap_or_else(|_| Self::DEFAULT_USER_AGENT.to_string());

        Ok(Self::new(base_url, access_token)
            .with_timeout(Duration::from_secs(timeout_secs))
            .with_user_agent(user_agent))
    }

    pub fn new(base_url: impl Into<String>, access_token: Option<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: Self::DEFAULT_USER_AGENT.to_string(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl ReorderConfig {
    const DEFAULT_MAX_RETRIES: usize = 2;

    pub fn from_env() -> Result<Self, String> {
        let max_retries = env::var("REORDER_MAX_RETRIES")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_RETRIES.to_string())
            .parse::<usize>()
            .map_err(|_| "REORDER_MAX_RETRIES must be a valid number".to_string())?;

        Ok(Self { max_retries })
    }
}

impl Default for ReorderConfig {
    fn default() -> Self {
        Self {
            max_retries: Self::DEFAULT_MAX_RETRIES,
        }
    }
}
