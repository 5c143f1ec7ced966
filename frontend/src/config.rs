use std::time::Duration;
use shared::SyncConfig;

pub struct Config {
    pub api_base_url: &'static str,
    pub poll_interval_ms: u64,
    pub stale_after_failures: u32,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            api_base_url: "/api",
            poll_interval_ms: 3000,
            stale_after_failures: 3,
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            directory_interval: Duration::from_millis(self.poll_interval_ms),
            detail_interval: Duration::from_millis(self.poll_interval_ms),
            stale_after_failures: self.stale_after_failures,
        }
    }
}

pub const CONFIG: Config = Config::new();
