use std::env;
use std::time::Duration;
use governor::Quota;
use crate::render::Pacing;

#[derive(Clone, Debug)]
pub struct Config {
    // Query targets, kept verbatim so blank entries can be rejected
    pub servers: Vec<String>,
    pub show_in_chat: bool,

    // Rate limiting configs
    pub cooldown_secs: u64,

    // Network
    pub query_timeout_ms: u64,

    // Output pacing
    pub output_batch_size: usize,
    pub output_batch_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            show_in_chat: false,
            cooldown_secs: 5,
            query_timeout_ms: 2000,
            output_batch_size: 10,
            output_batch_delay_ms: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            servers: env::var("QLX_SERVERS")
                .map(|v| parse_server_list(&v))
                .unwrap_or(defaults.servers),

            show_in_chat: env::var("QLX_SERVERS_SHOW_IN_CHAT")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.show_in_chat),

            cooldown_secs: env::var("SERVERS_COOLDOWN_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cooldown_secs),

            query_timeout_ms: env::var("QUERY_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.query_timeout_ms),

            output_batch_size: env::var("OUTPUT_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.output_batch_size),

            output_batch_delay_ms: env::var("OUTPUT_BATCH_DELAY_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.output_batch_delay_ms),
        }
    }

    /// `None` when the cooldown is disabled.
    pub fn cooldown_quota(&self) -> Option<Quota> {
        Quota::with_period(Duration::from_secs(self.cooldown_secs))
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            batch_size: self.output_batch_size,
            delay: Duration::from_millis(self.output_batch_delay_ms),
        }
    }
}

pub fn parse_server_list(raw: &str) -> Vec<String> {
    raw.split(',').map(str::to_string).collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
