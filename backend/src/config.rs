use std::{env, fmt::{Debug, Display}, path::PathBuf, str::FromStr};

use tracing::{info, warn};

pub struct Config {
    pub data_file: PathBuf,
    pub persist_interval_secs: u64,
    pub vote_limit_per_minute: u32,
    pub create_limit_per_hour: u32,
}

impl Config {
    pub fn load() -> Self {
        let defaults = Self::default();
        Self {
            data_file: try_load("POLL_DATA_FILE", defaults.data_file),
            persist_interval_secs: try_load("POLL_PERSIST_INTERVAL_SECS", defaults.persist_interval_secs),
            vote_limit_per_minute: try_load("POLL_VOTE_LIMIT_PER_MINUTE", defaults.vote_limit_per_minute),
            create_limit_per_hour: try_load("POLL_CREATE_LIMIT_PER_HOUR", defaults.create_limit_per_hour),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("polls.json"),
            persist_interval_secs: 2,
            vote_limit_per_minute: 10,
            create_limit_per_hour: 20,
        }
    }
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Debug,
    T::Err: Display,
{
    let Ok(raw) = env::var(key) else {
        info!("{key} not set, using default: {default:?}");
        return default;
    };
    raw.parse().unwrap_or_else(|e| {
        warn!("Invalid {key} value {raw:?}: {e}, using default: {default:?}");
        default
    })
}
