//! Configuration for the sync agent.

use rand::Rng;
use std::time::Duration;

/// Configuration for a sync agent.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Socket URL of the server, e.g. `ws://127.0.0.1:3001/ws`.
    pub url: String,
    /// Reconnect behavior.
    pub reconnect: ReconnectConfig,
}

impl AgentConfig {
    /// Creates a configuration for `url` with default reconnect behavior.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            reconnect: ReconnectConfig::default(),
        }
    }

    /// Sets the reconnect configuration.
    pub fn with_reconnect(mut self, reconnect: ReconnectConfig) -> Self {
        self.reconnect = reconnect;
        self
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new("ws://127.0.0.1:3001/ws")
    }
}

/// Configuration for reconnect behavior.
///
/// Delays grow exponentially from `initial_delay` by `backoff_multiplier`
/// and are capped at `max_delay`, plus up to 25% jitter.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Maximum number of consecutive failed attempts before giving up.
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
    /// Delay before the first reconnect.
    pub initial_delay: Duration,
    /// Maximum delay between reconnects.
    pub max_delay: Duration,
    /// Multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to delays.
    pub add_jitter: bool,
}

impl ReconnectConfig {
    /// Creates the default backoff: 3s doubling up to 30s, retrying forever.
    pub fn new() -> Self {
        Self {
            max_attempts: None,
            initial_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }

    /// Creates a fixed delay between reconnects, without jitter.
    pub fn fixed(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            initial_delay: delay,
            max_delay: delay,
            backoff_multiplier: 1.0,
            add_jitter: false,
        }
    }

    /// Creates a configuration that never reconnects.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: Some(0),
            ..Self::fixed(Duration::ZERO)
        }
    }

    /// Sets the attempt limit.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sets the initial delay.
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the backoff multiplier.
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enables or disables jitter.
    pub fn with_jitter(mut self, add_jitter: bool) -> Self {
        self.add_jitter = add_jitter;
        self
    }

    /// Returns true if reconnect attempt `attempt` (1-indexed) is allowed.
    pub fn allows_attempt(&self, attempt: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempt <= max)
    }

    /// Calculates the delay before a given attempt (0-indexed).
    ///
    /// Attempt 0 is the initial connect and has no delay.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let base_delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let delay_secs = base_delay.min(self.max_delay.as_secs_f64());

        if self.add_jitter {
            // Up to 25% jitter
            let jitter = delay_secs * 0.25 * rand::thread_rng().gen::<f64>();
            Duration::from_secs_f64(delay_secs + jitter)
        } else {
            Duration::from_secs_f64(delay_secs)
        }
    }
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agent_config_builder() {
        let config = AgentConfig::new("ws://example.com/ws")
            .with_reconnect(ReconnectConfig::fixed(Duration::from_secs(3)));

        assert_eq!(config.url, "ws://example.com/ws");
        assert_eq!(config.reconnect.initial_delay, Duration::from_secs(3));
        assert!(!config.reconnect.add_jitter);
    }

    #[test]
    fn defaults() {
        let config = ReconnectConfig::default();
        assert_eq!(config.max_attempts, None);
        assert_eq!(config.initial_delay, Duration::from_secs(3));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert!(config.allows_attempt(u32::MAX));
    }

    #[test]
    fn no_retry_allows_nothing() {
        let config = ReconnectConfig::no_retry();
        assert!(!config.allows_attempt(1));
    }

    #[test]
    fn attempt_limit() {
        let config = ReconnectConfig::new().with_max_attempts(2);
        assert!(config.allows_attempt(1));
        assert!(config.allows_attempt(2));
        assert!(!config.allows_attempt(3));
    }

    #[test]
    fn fixed_delay_is_constant() {
        let config = ReconnectConfig::fixed(Duration::from_secs(3));
        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        for attempt in 1..10 {
            assert_eq!(config.delay_for_attempt(attempt), Duration::from_secs(3));
        }
    }

    #[test]
    fn backoff_delay_calculation() {
        let config = ReconnectConfig::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_backoff_multiplier(2.0);

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);

        // Jitter makes exact values unpredictable, but bounds hold
        let delay1 = config.delay_for_attempt(1);
        assert!(delay1 >= Duration::from_millis(100));
        assert!(delay1 <= Duration::from_millis(125));

        let delay3 = config.delay_for_attempt(3);
        assert!(delay3 >= Duration::from_millis(400));
        assert!(delay3 <= Duration::from_millis(500));
    }

    #[test]
    fn backoff_respects_max() {
        let config = ReconnectConfig::new();
        for attempt in [5, 10, 64, u32::MAX] {
            let delay = config.delay_for_attempt(attempt);
            assert!(delay >= Duration::from_secs(30));
            assert!(delay <= Duration::from_millis(37_500));
        }
    }
}
