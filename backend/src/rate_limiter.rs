use std::collections::HashMap;
use std::sync::Mutex;
use time::{OffsetDateTime, Duration};
use tracing::{warn, error};
use crate::error::ApiError;

#[derive(Debug)]
struct RateLimit {
    attempts: u32,
    first_attempt: OffsetDateTime,
}

/// Fixed-window attempt counter per key.
#[derive(Debug)]
pub struct RateLimiter {
    limits: Mutex<HashMap<String, RateLimit>>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            limits: Mutex::new(HashMap::new()),
            max_attempts,
            window,
        }
    }

    pub fn per_minute(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::minutes(1))
    }

    pub fn per_hour(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::hours(1))
    }

    pub fn check_rate_limit(&self, key: &str) -> Result<(), ApiError> {
        self.check_at(key, OffsetDateTime::now_utc())
    }

    fn check_at(&self, key: &str, now: OffsetDateTime) -> Result<(), ApiError> {
        let mut limits = self.limits.lock().map_err(|e| {
            error!("Failed to acquire rate limit lock: {}", e);
            ApiError::Internal("rate limiter unavailable".into())
        })?;

        limits.retain(|_, limit| now - limit.first_attempt <= self.window * 2);

        match limits.get_mut(key) {
            Some(limit) if now - limit.first_attempt > self.window => {
                *limit = RateLimit { attempts: 1, first_attempt: now };
                Ok(())
            }
            Some(limit) if limit.attempts >= self.max_attempts => {
                let seconds_to_wait = (limit.first_attempt + self.window - now).whole_seconds();
                warn!("Rate limit triggered for key {}", key);
                Err(ApiError::RateLimited(format!(
                    "Rate limit exceeded. Please try again in {} seconds.",
                    seconds_to_wait.max(1)
                )))
            }
            Some(limit) => {
                limit.attempts += 1;
                Ok(())
            }
            None => {
                limits.insert(key.to_string(), RateLimit { attempts: 1, first_attempt: now });
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_resets_after_expiry() {
        let limiter = RateLimiter::per_minute(2);
        let start = OffsetDateTime::now_utc();
        assert!(limiter.check_at("k", start).is_ok());
        assert!(limiter.check_at("k", start).is_ok());
        assert!(matches!(limiter.check_at("k", start), Err(ApiError::RateLimited(_))));
        assert!(limiter.check_at("other", start).is_ok());
        assert!(limiter.check_at("k", start + Duration::seconds(61)).is_ok());
    }
}
