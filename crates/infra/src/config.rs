//! Finance module configuration.

use std::time::Duration;

use anyhow::Context;

use klabis_core::MoneyAmount;

use crate::event_store::query::MAX_PAGE_SIZE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinanceConfig {
    /// Balance of the account opened for a newly registered member.
    pub opening_balance: MoneyAmount,
    /// How often background workers check for shutdown while idle.
    pub worker_tick: Duration,
    /// Retries of a write that lost an optimistic concurrency race.
    pub max_retries: u32,
    pub max_page_size: u32,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            opening_balance: MoneyAmount::ZERO,
            worker_tick: Duration::from_millis(250),
            max_retries: 3,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl FinanceConfig {
    /// Read overrides from the process environment.
    ///
    /// - `KLABIS_OPENING_BALANCE`: minor units (e.g. `10000` for 100.00)
    /// - `KLABIS_WORKER_TICK_MS`
    /// - `KLABIS_MAX_RETRIES`
    /// - `KLABIS_MAX_PAGE_SIZE`
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, with an explicit variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("KLABIS_OPENING_BALANCE") {
            let minor: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("KLABIS_OPENING_BALANCE must be an amount in minor units, got '{v}'"))?;
            config.opening_balance = MoneyAmount::new(minor);
        }

        if let Some(v) = lookup("KLABIS_WORKER_TICK_MS") {
            let ms: u64 = v
                .trim()
                .parse()
                .with_context(|| format!("KLABIS_WORKER_TICK_MS must be a number of milliseconds, got '{v}'"))?;
            anyhow::ensure!(ms > 0, "KLABIS_WORKER_TICK_MS must be positive");
            config.worker_tick = Duration::from_millis(ms);
        }

        if let Some(v) = lookup("KLABIS_MAX_RETRIES") {
            config.max_retries = v
                .trim()
                .parse()
                .with_context(|| format!("KLABIS_MAX_RETRIES must be a non-negative integer, got '{v}'"))?;
        }

        if let Some(v) = lookup("KLABIS_MAX_PAGE_SIZE") {
            let size: u32 = v
                .trim()
                .parse()
                .with_context(|| format!("KLABIS_MAX_PAGE_SIZE must be a positive integer, got '{v}'"))?;
            anyhow::ensure!(size > 0, "KLABIS_MAX_PAGE_SIZE must be positive");
            config.max_page_size = size.min(MAX_PAGE_SIZE);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        assert_eq!(FinanceConfig::from_lookup(lookup(&[])).unwrap(), FinanceConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = FinanceConfig::from_lookup(lookup(&[
            ("KLABIS_OPENING_BALANCE", "10000"),
            ("KLABIS_WORKER_TICK_MS", "20"),
            ("KLABIS_MAX_RETRIES", "0"),
            ("KLABIS_MAX_PAGE_SIZE", "5000"),
        ]))
        .unwrap();

        assert_eq!(config.opening_balance, MoneyAmount::of(100));
        assert_eq!(config.worker_tick, Duration::from_millis(20));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.max_page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn malformed_values_name_the_variable() {
        let err = FinanceConfig::from_lookup(lookup(&[("KLABIS_MAX_RETRIES", "many")])).unwrap_err();
        assert!(err.to_string().contains("KLABIS_MAX_RETRIES"));

        assert!(FinanceConfig::from_lookup(lookup(&[("KLABIS_WORKER_TICK_MS", "0")])).is_err());
    }
}
