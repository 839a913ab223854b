use crate::{
    error::Error,
    request_spec::{LogLevel, RequestSpec},
};
use std::{env, time::Duration};

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Harness settings read from `<PREFIX>_BASE_ADDRESS`, `<PREFIX>_LOG_LEVEL`
/// and `<PREFIX>_TIMEOUT_SECS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    pub base_address: String,
    pub log_level: LogLevel,
    pub timeout: Duration,
}

impl HarnessConfig {
    pub fn new<S: Into<String>>(base_address: S) -> Self {
        Self {
            base_address: base_address.into(),
            log_level: LogLevel::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn from_env(prefix: &str, default_base_address: &str) -> Result<Self, Error> {
        Self::from_lookup(prefix, default_base_address, |key| env::var(key).ok())
    }

    pub fn from_lookup<F>(prefix: &str, default_base_address: &str, lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(&format!("{}_{}", prefix, name))
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::new(read("BASE_ADDRESS").unwrap_or_else(|| default_base_address.into()));

        if let Some(log_level) = read("LOG_LEVEL") {
            config.log_level = log_level.parse()?;
        }

        if let Some(timeout) = read("TIMEOUT_SECS") {
            let seconds: u64 = timeout.parse().map_err(|_| {
                Error::InvalidConfig(format!(
                    "{}_TIMEOUT_SECS should be a whole number of seconds, got `{}`",
                    prefix, timeout
                ))
            })?;
            if seconds == 0 {
                return Err(Error::InvalidConfig(format!(
                    "{}_TIMEOUT_SECS should be greater than zero",
                    prefix
                )));
            }
            config.timeout = Duration::from_secs(seconds);
        }

        Ok(config)
    }

    pub fn request_spec(&self) -> RequestSpec {
        RequestSpec::build(self.base_address.clone(), self.log_level)
    }
}
