use std::env;

/// Realistic desktop client identity sent with every page load. Reduces
/// trivial headless-browser blocking; not an anti-bot measure.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Engine configuration loaded from environment variables. Everything has
/// a default: the engine runs credential-free on fallback data.
#[derive(Debug, Clone)]
pub struct Config {
    /// Override for the Chromium binary path (`CHROME_BIN`).
    pub chrome_executable: Option<String>,
    /// Per-navigation timeout in seconds (`NAV_TIMEOUT_SECS`).
    pub nav_timeout_secs: u64,
    /// Inter-item politeness delay in milliseconds (`ITEM_DELAY_MS`).
    pub item_delay_ms: u64,
    /// Client identity string (`ENGINE_USER_AGENT`).
    pub user_agent: String,
    /// Keyword-rank lookup endpoint (`RANK_API_URL`). None disables live lookups.
    pub rank_api_url: Option<String>,
    /// Keyword-rank API key (`RANK_API_KEY`).
    pub rank_api_key: Option<String>,
    /// Seed for the fallback data provider (`FALLBACK_SEED`).
    pub fallback_seed: u64,
    /// Worker count for the optional bounded-concurrency mode
    /// (`MAX_CONCURRENCY`). 1 keeps the default strictly-sequential batch.
    pub max_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            nav_timeout_secs: 30,
            item_delay_ms: 1500,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            rank_api_url: None,
            rank_api_key: None,
            fallback_seed: 0,
            max_concurrency: 1,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            chrome_executable: env::var("CHROME_BIN").ok(),
            nav_timeout_secs: parsed_env("NAV_TIMEOUT_SECS", defaults.nav_timeout_secs),
            item_delay_ms: parsed_env("ITEM_DELAY_MS", defaults.item_delay_ms),
            user_agent: env::var("ENGINE_USER_AGENT").unwrap_or(defaults.user_agent),
            rank_api_url: env::var("RANK_API_URL").ok(),
            rank_api_key: env::var("RANK_API_KEY").ok(),
            fallback_seed: parsed_env("FALLBACK_SEED", defaults.fallback_seed),
            max_concurrency: parsed_env("MAX_CONCURRENCY", defaults.max_concurrency).max(1),
        }
    }

    /// Log the loaded configuration without leaking the API key.
    pub fn log_redacted(&self) {
        tracing::info!(
            chrome_executable = self.chrome_executable.as_deref().unwrap_or("(auto)"),
            nav_timeout_secs = self.nav_timeout_secs,
            item_delay_ms = self.item_delay_ms,
            rank_api = self.rank_api_url.as_deref().unwrap_or("(disabled)"),
            rank_api_key_set = self.rank_api_key.is_some(),
            fallback_seed = self.fallback_seed,
            max_concurrency = self.max_concurrency,
            "Config loaded"
        );
    }
}

fn parsed_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.nav_timeout_secs, 30);
        assert_eq!(config.item_delay_ms, 1500);
        assert_eq!(config.max_concurrency, 1);
        assert!(config.rank_api_url.is_none());
    }
}
