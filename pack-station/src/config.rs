use crate::error::{StationError, StationResult};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Station configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HQ_BASE_URL | http://localhost:8080 | HQ API root |
/// | HQ_TOKEN | (none) | Bearer token for HQ |
/// | HQ_TIMEOUT_SECS | 30 | Per-request timeout |
/// | PACK_USER_ID | (none) | Signed-in packer |
/// | PACK_PRINTERS | (empty) | `name=host:port` list, `*` marks the default |
/// | PACK_LOG_DIR | (none) | Daily log files go here when set |
/// | SCAN_TIMEOUT_MS | 100 | Scanner inactivity window |
///
/// A `.env` file in the working directory is read first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub hq_base_url: String,
    pub hq_token: Option<String>,
    pub hq_timeout_secs: u64,
    pub user_id: Option<String>,
    pub printers: String,
    pub log_dir: Option<PathBuf>,
    pub scan_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());
        Self {
            hq_base_url: non_empty("HQ_BASE_URL").unwrap_or_else(|| "http://localhost:8080".into()),
            hq_token: non_empty("HQ_TOKEN"),
            hq_timeout_secs: var("HQ_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            user_id: non_empty("PACK_USER_ID"),
            printers: var("PACK_PRINTERS").unwrap_or_default(),
            log_dir: non_empty("PACK_LOG_DIR").map(PathBuf::from),
            scan_timeout_ms: var("SCAN_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
        }
    }

    /// Command line flags win over the environment
    pub fn merge(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.hq_url {
            self.hq_base_url = url.clone();
        }
        if let Some(user) = &cli.user {
            self.user_id = Some(user.clone());
        }
        if let Some(printers) = &cli.printers {
            self.printers = printers.clone();
        }
        if let Some(dir) = &cli.log_dir {
            self.log_dir = Some(dir.clone());
        }
        self
    }

    pub fn validate(&self) -> StationResult<()> {
        if self.hq_base_url.trim().is_empty() {
            return Err(StationError::Config("HQ_BASE_URL is empty".into()));
        }
        if self.hq_timeout_secs == 0 {
            return Err(StationError::Config("HQ_TIMEOUT_SECS must be positive".into()));
        }
        if self.scan_timeout_ms == 0 {
            return Err(StationError::Config("SCAN_TIMEOUT_MS must be positive".into()));
        }
        Ok(())
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_millis(self.scan_timeout_ms)
    }

    pub fn client_config(&self) -> hq_client::ClientConfig {
        let config =
            hq_client::ClientConfig::new(self.hq_base_url.clone()).with_timeout(self.hq_timeout_secs);
        match &self.hq_token {
            Some(token) => config.with_token(token.clone()),
            None => config,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

#[derive(Parser, Debug)]
#[command(name = "pack-station", version, about = "Scan, pack and ship one order")]
pub struct Cli {
    /// Order to open
    pub order_id: String,

    /// HQ API root (overrides HQ_BASE_URL)
    #[arg(long)]
    pub hq_url: Option<String>,

    /// Signed-in packer (overrides PACK_USER_ID)
    #[arg(long)]
    pub user: Option<String>,

    /// Printer list (overrides PACK_PRINTERS)
    #[arg(long)]
    pub printers: Option<String>,

    /// Log directory (overrides PACK_LOG_DIR)
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}
