use serde::Deserialize;
use std::time::Duration;

use crate::error::ThrottleError;
use crate::throttle::token_bucket::MAX_CAPACITY;

const DEFAULT_CAPACITY: usize = 10;
const DEFAULT_PERIOD_MS: u64 = 1000;

/// Overrides read from the process environment, e.g.
/// `THROTTLE_CAPACITY=5 THROTTLE_PERIOD_MS=250`.
#[derive(Deserialize, Debug, Default)]
pub struct EnvConfig {
    pub throttle_capacity: Option<usize>,
    pub throttle_period_ms: Option<u64>,
}

/// Admission policy of a throttled client: at most `capacity` requests
/// back to back, topped back up every `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    pub capacity: usize,
    pub period: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        ThrottleConfig {
            capacity: DEFAULT_CAPACITY,
            period: Duration::from_millis(DEFAULT_PERIOD_MS),
        }
    }
}

impl ThrottleConfig {
    pub fn new(capacity: usize, period: Duration) -> Self {
        ThrottleConfig { capacity, period }
    }

    pub fn from_env() -> Result<Self, ThrottleError> {
        let overrides = envy::from_env::<EnvConfig>()?;
        Self::from_overrides(overrides)
    }

    pub fn from_overrides(overrides: EnvConfig) -> Result<Self, ThrottleError> {
        let defaults = ThrottleConfig::default();
        let config = ThrottleConfig {
            capacity: overrides.throttle_capacity.unwrap_or(defaults.capacity),
            period: overrides
                .throttle_period_ms
                .map_or(defaults.period, Duration::from_millis),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ThrottleError> {
        if self.capacity == 0 || self.capacity > MAX_CAPACITY {
            return Err(ThrottleError::InvalidCapacity(self.capacity));
        }
        if self.period.is_zero() {
            return Err(ThrottleError::InvalidPeriod(self.period));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(vars: &[(&str, &str)]) -> Result<ThrottleConfig, ThrottleError> {
        let overrides = envy::from_iter::<_, EnvConfig>(
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        )?;
        ThrottleConfig::from_overrides(overrides)
    }

    #[test]
    fn empty_environment_uses_defaults() {
        assert_eq!(parse(&[]).unwrap(), ThrottleConfig::default());
    }

    #[test]
    fn overrides_replace_defaults() {
        let config = parse(&[("THROTTLE_CAPACITY", "4"), ("THROTTLE_PERIOD_MS", "250")]).unwrap();
        assert_eq!(config, ThrottleConfig::new(4, Duration::from_millis(250)));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            parse(&[("THROTTLE_CAPACITY", "0")]),
            Err(ThrottleError::InvalidCapacity(0))
        ));
    }

    #[test]
    fn capacity_above_maximum_is_rejected() {
        let too_big = (MAX_CAPACITY + 1).to_string();
        assert!(matches!(
            parse(&[("THROTTLE_CAPACITY", too_big.as_str())]),
            Err(ThrottleError::InvalidCapacity(_))
        ));
        assert!(matches!(
            ThrottleConfig::new(usize::MAX, Duration::from_secs(1)).validate(),
            Err(ThrottleError::InvalidCapacity(usize::MAX))
        ));
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(matches!(
            parse(&[("THROTTLE_PERIOD_MS", "0")]),
            Err(ThrottleError::InvalidPeriod(_))
        ));
    }

    #[test]
    fn garbage_is_a_config_error() {
        assert!(matches!(
            parse(&[("THROTTLE_CAPACITY", "lots")]),
            Err(ThrottleError::Config(_))
        ));
    }
}
