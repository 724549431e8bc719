use std::{
    env, fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    time::Duration,
};

use anyhow::anyhow;

pub const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
pub const DEFAULT_MODEL: &str = "@cf/black-forest-labs/flux-2-dev";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

#[derive(Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub account_id: String,
    pub api_token: String,
    pub api_base_url: String,
    pub model: String,
    pub upstream_timeout: Option<Duration>,
    pub max_upload_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let listen_addr = var("SERVER_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8787".into())
            .parse()
            .unwrap_or_else(|_| SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 8787));

        let account_id = var("CLOUDFLARE_ACCOUNT_ID")
            .ok_or_else(|| anyhow!("CLOUDFLARE_ACCOUNT_ID must be set"))?;
        let api_token = var("CLOUDFLARE_API_TOKEN")
            .ok_or_else(|| anyhow!("CLOUDFLARE_API_TOKEN must be set"))?;

        let api_base_url = var("WORKERS_AI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let model = var("WORKERS_AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let upstream_timeout = var("UPSTREAM_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .filter(|secs: &u64| *secs > 0)
            .map(Duration::from_secs);
        let max_upload_bytes = var("MAX_UPLOAD_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        Ok(Self {
            listen_addr,
            account_id,
            api_token,
            api_base_url,
            model,
            upstream_timeout,
            max_upload_bytes,
        })
    }

    pub fn run_url(&self) -> String {
        format!(
            "{}/accounts/{}/ai/run/{}",
            self.api_base_url, self.account_id, self.model
        )
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("listen_addr", &self.listen_addr)
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("model", &self.model)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}
