use std::env;
use std::time::Duration;

/// Default upstream endpoint for gold prices
pub const DEFAULT_PRICE_FEED_URL: &str = "https://api.collectapi.com/economy/goldPrice";

/// Key sent when no COLLECTAPI_KEY is configured
pub const DEMO_API_KEY: &str = "demo-key";

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Upstream market-data feed configuration
#[derive(Debug, Clone)]
pub struct PriceFeedConfig {
    pub url: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub price_feed: PriceFeedConfig,
    pub log_level: String,
    pub http_port: u16,
    pub environment: String,
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(10);

        let acquire_timeout_secs = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(30);

        let idle_timeout_secs = env::var("DATABASE_IDLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(600); // 10 minutes

        let max_lifetime_secs = env::var("DATABASE_MAX_LIFETIME_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(1800); // 30 minutes

        let test_before_acquire = env::var("DATABASE_TEST_BEFORE_ACQUIRE")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(true);

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/gift_ledger".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl PriceFeedConfig {
    /// Create price feed config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("PRICE_FEED_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PRICE_FEED_URL.to_string());

        let api_key = env::var("COLLECTAPI_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEMO_API_KEY.to_string());

        let timeout_secs = match env::var("PRICE_FEED_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse::<u64>()
                .map_err(|_| format!("Invalid PRICE_FEED_TIMEOUT_SECS: {}", raw))?,
            Err(_) => 5,
        };

        if timeout_secs == 0 {
            return Err("PRICE_FEED_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            api_key,
            timeout_secs,
        })
    }

    /// Get the request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when no real API key was supplied
    pub fn uses_demo_key(&self) -> bool {
        self.api_key == DEMO_API_KEY
    }
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_PRICE_FEED_URL.to_string(),
            api_key: DEMO_API_KEY.to_string(),
            timeout_secs: 5,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let price_feed = PriceFeedConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL")
            .unwrap_or_else(|_| "info".to_string());

        let http_port = match env::var("HTTP_PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| format!("Invalid HTTP_PORT: {}", raw))?,
            Err(_) => 8080,
        };

        let environment = env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string());

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            database,
            price_feed,
            log_level: log_level.to_lowercase(),
            http_port,
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            price_feed: PriceFeedConfig::default(),
            log_level: "info".to_string(),
            http_port: 8080,
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_price_feed_default_uses_demo_key() {
        let config = PriceFeedConfig::default();
        assert_eq!(config.url, DEFAULT_PRICE_FEED_URL);
        assert!(config.uses_demo_key());
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.http_port, 8080);
        assert!(config.is_development());
        assert!(!config.is_production());
    }
}
