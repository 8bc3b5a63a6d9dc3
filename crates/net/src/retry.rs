//! Retry logic and backoff calculations

use std::time::Duration;

/// Retry configuration for API requests
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries
    pub max_retries: u32,
    /// Initial backoff delay
    pub initial_delay: Duration,
    /// Maximum backoff delay
    pub max_delay: Duration,
    /// Backoff multiplier
    pub backoff_multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

/// Calculate exponential backoff delay with jitter
pub(crate) fn calculate_backoff_delay(retry_config: &RetryConfig, attempt: u32) -> Duration {
    let base_delay = {
        // Precision loss acceptable for backoff calculations - we don't need nanosecond precision
        #[allow(clippy::cast_precision_loss)]
        {
            retry_config
                .initial_delay
                .as_millis()
                .min(u128::from(u64::MAX)) as f64
        }
    };
    let multiplier = retry_config.backoff_multiplier;
    let max_delay = {
        #[allow(clippy::cast_precision_loss)]
        {
            retry_config.max_delay.as_millis().min(u128::from(u64::MAX)) as f64
        }
    };

    let delay = base_delay
        * multiplier.powi({
            // Retry attempts are small, so this cast is safe
            #[allow(clippy::cast_possible_wrap)]
            {
                attempt.saturating_sub(1) as i32
            }
        });
    let delay = delay.min(max_delay);

    // Add jitter
    let jitter = delay * retry_config.jitter_factor * (rand::random::<f64>() - 0.5);
    let final_delay = {
        // Safe cast: max(0.0) ensures non-negative, round() handles fractional part
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        {
            (delay + jitter).max(0.0).round() as u64
        }
    };

    Duration::from_millis(final_delay)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> RetryConfig {
        RetryConfig {
            max_retries: 5,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1_000),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let config = config();
        assert_eq!(calculate_backoff_delay(&config, 1), Duration::from_millis(100));
        assert_eq!(calculate_backoff_delay(&config, 2), Duration::from_millis(200));
        assert_eq!(calculate_backoff_delay(&config, 3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_is_capped() {
        let config = config();
        assert_eq!(calculate_backoff_delay(&config, 10), Duration::from_millis(1_000));
    }

    #[test]
    fn test_jitter_stays_in_band() {
        let config = RetryConfig {
            jitter_factor: 0.5,
            ..config()
        };
        for _ in 0..50 {
            let delay = calculate_backoff_delay(&config, 2).as_millis();
            assert!((150..=250).contains(&delay), "delay {delay} out of band");
        }
    }
}
