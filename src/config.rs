use std::env;

const DEFAULT_PORT: u16 = 8787;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 20;

/// Runtime settings, read from the environment once at startup. Every knob
/// has a default so the binary runs with no configuration at all.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub fetch_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env_parsed("PORT", DEFAULT_PORT),
            fetch_timeout_secs: env_parsed("FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS),
        }
    }
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(name, value = %raw, "ignoring unparseable environment value");
            default
        }),
        Err(_) => default,
    }
}
