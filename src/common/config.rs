// src/common/config.rs
//! Service configuration loaded from environment variables

use std::collections::HashSet;
use std::env;
use std::time::Duration;
use tracing::{info, warn};

/// Settings for the profile completion gate
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Delay between a "show" decision and the dialog becoming visible
    pub debounce: Duration,
    /// Maximum age of a persisted completion record
    pub cache_ttl: chrono::Duration,
    /// Length of the "skip for now" window
    pub snooze: chrono::Duration,
    /// Lower-cased emails that never see the dialog
    pub exempt_emails: HashSet<String>,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(1000),
            cache_ttl: chrono::Duration::days(30),
            snooze: chrono::Duration::hours(12),
            exempt_emails: HashSet::new(),
        }
    }
}

impl GateConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // PROFILE_GATE_DEBOUNCE_MS - delay before the dialog is surfaced
        if let Some(ms) = parse_env::<u64>("PROFILE_GATE_DEBOUNCE_MS") {
            config.debounce = Duration::from_millis(ms);
        }

        // PROFILE_GATE_CACHE_TTL_DAYS - lifetime of the local completion record
        if let Some(days) = parse_env::<i64>("PROFILE_GATE_CACHE_TTL_DAYS") {
            match chrono::Duration::try_days(days) {
                Some(ttl) => config.cache_ttl = ttl,
                None => warn!(days, "PROFILE_GATE_CACHE_TTL_DAYS out of range, using default"),
            }
        }

        // PROFILE_GATE_SNOOZE_HOURS - how long "skip for now" lasts
        if let Some(hours) = parse_env::<i64>("PROFILE_GATE_SNOOZE_HOURS") {
            match chrono::Duration::try_hours(hours) {
                Some(snooze) => config.snooze = snooze,
                None => warn!(hours, "PROFILE_GATE_SNOOZE_HOURS out of range, using default"),
            }
        }

        // PROFILE_GATE_EXEMPT_EMAILS - comma-separated allow-list
        if let Ok(raw) = env::var("PROFILE_GATE_EXEMPT_EMAILS") {
            config.exempt_emails = parse_email_list(&raw);
        }

        config
    }

    pub fn is_exempt(&self, email: &str) -> bool {
        self.exempt_emails.contains(&email.trim().to_lowercase())
    }
}

/// Settings for the agency KYC redirect
#[derive(Debug, Clone)]
pub struct RedirectConfig {
    pub delay: Duration,
    pub kyc_path: String,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(1500),
            kyc_path: "/employer/kyc-verification".to_string(),
        }
    }
}

impl RedirectConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse_env::<u64>("KYC_REDIRECT_DELAY_MS") {
            config.delay = Duration::from_millis(ms);
        }

        if let Ok(path) = env::var("KYC_REDIRECT_PATH") {
            if !path.trim().is_empty() {
                config.kyc_path = path.trim().to_string();
            }
        }

        config
    }
}

/// Top-level service configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub portal_api_url: String,
    pub portal_timeout: Duration,
    pub cors_origins: Vec<String>,
    pub dashboard_list_limit: u32,
    /// Sessions untouched for this long are evicted
    pub session_idle_timeout: Duration,
    pub session_sweep_interval: Duration,
    pub gate: GateConfig,
    pub redirect: RedirectConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = parse_env::<u16>("PORT").unwrap_or(8080);

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://dashboard_sessions.db".to_string());

        let portal_api_url = env::var("PORTAL_API_URL")
            .unwrap_or_else(|_| "http://localhost:5000/api".to_string())
            .trim_end_matches('/')
            .to_string();

        let portal_timeout = Duration::from_secs(parse_env::<u64>("PORTAL_TIMEOUT_SECS").unwrap_or(30));

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let dashboard_list_limit = parse_env::<u32>("DASHBOARD_LIST_LIMIT").unwrap_or(5);

        let session_idle_timeout =
            Duration::from_secs(parse_env::<u64>("SESSION_IDLE_TIMEOUT_SECS").unwrap_or(30 * 60));
        let session_sweep_interval = Duration::from_secs(
            parse_env::<u64>("SESSION_SWEEP_INTERVAL_SECS")
                .unwrap_or(60)
                .max(1),
        );

        Self {
            port,
            database_url,
            portal_api_url,
            portal_timeout,
            cors_origins,
            dashboard_list_limit,
            session_idle_timeout,
            session_sweep_interval,
            gate: GateConfig::from_env(),
            redirect: RedirectConfig::from_env(),
        }
    }
}

/// Log the effective configuration on startup
pub fn log_config(config: &AppConfig) {
    info!(
        port = config.port,
        portal_api_url = %config.portal_api_url,
        portal_timeout_secs = config.portal_timeout.as_secs(),
        cors_origins = ?config.cors_origins,
        session_idle_timeout_secs = config.session_idle_timeout.as_secs(),
        "Service configuration loaded"
    );
    info!(
        debounce_ms = config.gate.debounce.as_millis() as u64,
        cache_ttl_days = config.gate.cache_ttl.num_days(),
        snooze_hours = config.gate.snooze.num_hours(),
        exempt_emails = config.gate.exempt_emails.len(),
        kyc_redirect_delay_ms = config.redirect.delay.as_millis() as u64,
        kyc_redirect_path = %config.redirect.kyc_path,
        "Profile gate configuration loaded"
    );
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

fn parse_email_list(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_config_defaults() {
        let config = GateConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(1000));
        assert_eq!(config.cache_ttl, chrono::Duration::days(30));
        assert_eq!(config.snooze, chrono::Duration::hours(12));
        assert!(config.exempt_emails.is_empty());
    }

    #[test]
    fn test_redirect_config_defaults() {
        let config = RedirectConfig::default();
        assert_eq!(config.delay, Duration::from_millis(1500));
        assert_eq!(config.kyc_path, "/employer/kyc-verification");
    }

    #[test]
    fn test_out_of_range_durations_keep_defaults() {
        std::env::set_var("PROFILE_GATE_CACHE_TTL_DAYS", "99999999999999");
        std::env::set_var("PROFILE_GATE_SNOOZE_HOURS", "-99999999999999999");
        let config = GateConfig::from_env();
        std::env::remove_var("PROFILE_GATE_CACHE_TTL_DAYS");
        std::env::remove_var("PROFILE_GATE_SNOOZE_HOURS");

        assert_eq!(config.cache_ttl, chrono::Duration::days(30));
        assert_eq!(config.snooze, chrono::Duration::hours(12));
    }

    #[test]
    fn test_email_list_is_normalized() {
        let emails = parse_email_list(" Ops@Example.com, ,qa@example.com ");
        assert_eq!(emails.len(), 2);
        assert!(emails.contains("ops@example.com"));
        assert!(emails.contains("qa@example.com"));
    }

    #[test]
    fn test_exemption_ignores_case() {
        let mut config = GateConfig::default();
        config.exempt_emails = parse_email_list("ops@example.com");
        assert!(config.is_exempt("OPS@example.com "));
        assert!(!config.is_exempt("someone@example.com"));
    }
}
