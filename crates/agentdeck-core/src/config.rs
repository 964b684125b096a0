use std::collections::HashMap;

use anyhow::Result;

/// Application configuration, loaded from env with `.env` fallback.
/// The upstream base URL is the only value the gateway strictly needs;
/// everything else has a workable default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the external agent task service.
    pub base_url: String,

    // Web gateway
    pub web_bind: String,
    pub web_port: u16,
    pub dashboard_dist_dir: String,

    // Client tuning
    /// Poll period for task watchers, clamped to 1–3 s.
    pub poll_interval_ms: u64,
    pub request_timeout_s: u64,
}

fn parse_dotenv() -> HashMap<String, String> {
    let mut map = HashMap::new();
    let Ok(contents) = std::fs::read_to_string(".env") else {
        return map;
    };
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    map
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_u64(key: &str, dotenv: &HashMap<String, String>, default: u64) -> u64 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn get_u16(key: &str, dotenv: &HashMap<String, String>, default: u16) -> u16 {
    get(key, dotenv)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let dotenv = parse_dotenv();

        let base_url = get_str("AGENTEX_BASE_URL", &dotenv, "http://localhost:5003");
        // Trailing slash would double up when joining paths.
        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Config {
            base_url,
            web_bind: get_str("WEB_BIND", &dotenv, "127.0.0.1"),
            web_port: get_u16("WEB_PORT", &dotenv, 3000),
            dashboard_dist_dir: get_str("DASHBOARD_DIST_DIR", &dotenv, "dashboard/dist"),
            poll_interval_ms: get_u64("POLL_INTERVAL_MS", &dotenv, 1000).clamp(1000, 3000),
            request_timeout_s: get_u64("REQUEST_TIMEOUT_S", &dotenv, 10),
        })
    }

    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.poll_interval_ms)
    }
}
