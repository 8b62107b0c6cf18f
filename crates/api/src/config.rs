//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use tally_accounting::InMemoryAuditLog;

pub const BIND_ADDR_VAR: &str = "TALLY_BIND_ADDR";
pub const REQUEST_TIMEOUT_VAR: &str = "TALLY_REQUEST_TIMEOUT_MS";
pub const AUDIT_CAPACITY_VAR: &str = "TALLY_AUDIT_CAPACITY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// How long a request waits for its ledger operation. The operation
    /// itself is never cancelled.
    pub request_timeout: Duration,
    /// Number of audit records retained in memory.
    pub audit_capacity: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            request_timeout: Duration::from_millis(5_000),
            audit_capacity: InMemoryAuditLog::DEFAULT_CAPACITY,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Missing, unparseable or
    /// out-of-range values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let bind_addr = parse_or(&lookup, BIND_ADDR_VAR, defaults.bind_addr);
        // A zero timeout would answer 504 to every request.
        let timeout_ms = parse_where(
            &lookup,
            REQUEST_TIMEOUT_VAR,
            defaults.request_timeout.as_millis() as u64,
            |ms| *ms > 0,
        );
        let audit_capacity = parse_or(&lookup, AUDIT_CAPACITY_VAR, defaults.audit_capacity);

        Self {
            bind_addr,
            request_timeout: Duration::from_millis(timeout_ms),
            audit_capacity,
        }
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + core::fmt::Debug,
{
    parse_where(lookup, key, default, |_| true)
}

fn parse_where<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
    accept: impl Fn(&T) -> bool,
) -> T
where
    T: FromStr + core::fmt::Debug,
{
    match lookup(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) if accept(&v) => v,
            _ => {
                tracing::warn!("{key}={raw:?} is not valid; using default {default:?}");
                default
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(ApiConfig::from_lookup(|_| None), ApiConfig::default());
    }

    #[test]
    fn reads_all_values() {
        let cfg = ApiConfig::from_lookup(lookup_from(&[
            (BIND_ADDR_VAR, "127.0.0.1:9000"),
            (REQUEST_TIMEOUT_VAR, "250"),
            (AUDIT_CAPACITY_VAR, "16"),
        ]));

        assert_eq!(cfg.bind_addr, "127.0.0.1:9000".parse().unwrap());
        assert_eq!(cfg.request_timeout, Duration::from_millis(250));
        assert_eq!(cfg.audit_capacity, 16);
    }

    #[test]
    fn garbage_falls_back_to_defaults() {
        let cfg = ApiConfig::from_lookup(lookup_from(&[
            (BIND_ADDR_VAR, "not-an-addr"),
            (REQUEST_TIMEOUT_VAR, "-3"),
        ]));

        let defaults = ApiConfig::default();
        assert_eq!(cfg.bind_addr, defaults.bind_addr);
        assert_eq!(cfg.request_timeout, defaults.request_timeout);
    }

    #[test]
    fn zero_timeout_falls_back_to_default() {
        let cfg = ApiConfig::from_lookup(lookup_from(&[(REQUEST_TIMEOUT_VAR, "0")]));
        assert_eq!(cfg.request_timeout, ApiConfig::default().request_timeout);

        let cfg = ApiConfig::from_lookup(lookup_from(&[(REQUEST_TIMEOUT_VAR, "1")]));
        assert_eq!(cfg.request_timeout, Duration::from_millis(1));
    }
}
