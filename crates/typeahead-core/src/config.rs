//! Configuration for the search pipeline

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{CoreError, Result};

/// Default quiescence window before a query is dispatched
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Default number of results per page
pub const DEFAULT_PAGE_SIZE: usize = 25;

pub const ENV_DEBOUNCE_MS: &str = "TYPEAHEAD_DEBOUNCE_MS";
pub const ENV_PAGE_SIZE: &str = "TYPEAHEAD_PAGE_SIZE";

/// Configuration for a search controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Quiescence window in milliseconds
    pub debounce_ms: u64,

    /// Results requested per page
    pub page_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchConfig {
    /// Defaults overridden by `TYPEAHEAD_DEBOUNCE_MS` / `TYPEAHEAD_PAGE_SIZE`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(value) = lookup(ENV_DEBOUNCE_MS) {
            config.debounce_ms = parse_value(ENV_DEBOUNCE_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_PAGE_SIZE) {
            config.page_size = parse_value(ENV_PAGE_SIZE, &value)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(CoreError::InvalidConfig {
                key: "page_size".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| CoreError::InvalidConfig {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
