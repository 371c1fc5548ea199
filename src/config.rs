use std::net::SocketAddr;
use std::time::Duration;

/// Application-level constants
pub const APP_NAME: &str = "Theta Assistant";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulated response latency of the scripted assistant.
pub const REPLY_DELAY: Duration = Duration::from_millis(1500);

/// Sender address for confirmation emails.
pub const DEFAULT_MAIL_FROM: &str = "info@thetaclinical.com";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

/// Upper bound on live chat sessions (one worker task each).
pub const DEFAULT_MAX_SESSIONS: usize = 500;

/// Sessions without visitor activity for this long may be evicted.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Log filter used when `RUST_LOG` is not set.
pub fn default_log_filter() -> &'static str {
    "info,theta_assistant_lib=debug"
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// Runtime settings for the HTTP server, read from `THETA_*` variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub reply_delay: Duration,
    /// Origin of the static site allowed to call the API. `None` disables CORS.
    pub allowed_origin: Option<String>,
    pub mail_from: String,
    pub max_sessions: usize,
    pub session_idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8787)),
            reply_delay: REPLY_DELAY,
            allowed_origin: None,
            mail_from: DEFAULT_MAIL_FROM.to_string(),
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle_timeout: SESSION_IDLE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank values keep
    /// the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get("THETA_BIND_ADDR") {
            config.bind_addr = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "THETA_BIND_ADDR",
                value: value.clone(),
            })?;
        }
        if let Some(value) = get("THETA_REPLY_DELAY_MS") {
            let millis: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "THETA_REPLY_DELAY_MS",
                value: value.clone(),
            })?;
            config.reply_delay = Duration::from_millis(millis);
        }
        if let Some(value) = get("THETA_ALLOWED_ORIGIN") {
            config.allowed_origin = Some(value.trim().to_string());
        }
        if let Some(value) = get("THETA_MAIL_FROM") {
            config.mail_from = value.trim().to_string();
        }
        if let Some(value) = get("THETA_MAX_SESSIONS") {
            config.max_sessions = value
                .trim()
                .parse()
                .ok()
                .filter(|max: &usize| *max > 0)
                .ok_or_else(|| ConfigError::InvalidValue {
                    var: "THETA_MAX_SESSIONS",
                    value: value.clone(),
                })?;
        }
        if let Some(value) = get("THETA_SESSION_IDLE_SECS") {
            let secs: u64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "THETA_SESSION_IDLE_SECS",
                value: value.clone(),
            })?;
            config.session_idle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
