use std::fmt;

use crate::error::ConfigError;

/// Which runtime the tool is hosted in. Picks the transport and the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    /// Managed plugin runtime, requests go through the sandbox bridge.
    Forge,
    /// Legacy host page, requests go through the host's request call.
    Connect,
}

impl AppEnvironment {
    /// Default chosen at build time with the `forge` feature.
    pub fn build_default() -> Self {
        if cfg!(feature = "forge") {
            AppEnvironment::Forge
        } else {
            AppEnvironment::Connect
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            AppEnvironment::Forge => "requestJira() performance test",
            AppEnvironment::Connect => "AP.request() performance test",
        }
    }
}

impl fmt::Display for AppEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnvironment::Forge => f.write_str("forge"),
            AppEnvironment::Connect => f.write_str("connect"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub jira_base_url: String,
    pub bind_addr: String,
    pub default_count: usize,
    pub default_concurrency: usize,
}

impl AppConfig {
    /// Reads configuration from the process environment (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match lookup("REQUEST_PERF_ENV") {
            None => AppEnvironment::build_default(),
            Some(value) => {
                let normalized = value.trim().to_lowercase();
                match normalized.as_str() {
                    "forge" => AppEnvironment::Forge,
                    "connect" => AppEnvironment::Connect,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            key: "REQUEST_PERF_ENV",
                            value,
                        })
                    }
                }
            }
        };

        let jira_base_url = lookup("JIRA_BASE_URL")
            .unwrap_or_else(|| "http://localhost:2990/jira".to_string())
            .trim_end_matches('/')
            .to_string();
        if url::Url::parse(&jira_base_url).is_err() {
            return Err(ConfigError::InvalidValue {
                key: "JIRA_BASE_URL",
                value: jira_base_url,
            });
        }

        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let default_count = parse_usize(&lookup, "DEFAULT_REQUEST_COUNT", 1)?;
        let default_concurrency = parse_usize(&lookup, "DEFAULT_CONCURRENCY", 5)?;
        if default_concurrency == 0 {
            return Err(ConfigError::InvalidValue {
                key: "DEFAULT_CONCURRENCY",
                value: "0".to_string(),
            });
        }

        Ok(Self {
            environment,
            jira_base_url,
            bind_addr,
            default_count,
            default_concurrency,
        })
    }
}

fn parse_usize<F>(lookup: &F, key: &'static str, default: usize) -> Result<usize, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.environment, AppEnvironment::build_default());
        assert_eq!(config.jira_base_url, "http://localhost:2990/jira");
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.default_count, 1);
        assert_eq!(config.default_concurrency, 5);
    }

    #[test]
    fn overrides_are_read() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("REQUEST_PERF_ENV", "Forge"),
            ("JIRA_BASE_URL", "https://example.atlassian.net/"),
            ("DEFAULT_REQUEST_COUNT", "20"),
            ("DEFAULT_CONCURRENCY", "3"),
        ]))
        .unwrap();
        assert_eq!(config.environment, AppEnvironment::Forge);
        assert_eq!(config.jira_base_url, "https://example.atlassian.net");
        assert_eq!(config.default_count, 20);
        assert_eq!(config.default_concurrency, 3);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(AppConfig::from_lookup(lookup_from(&[("REQUEST_PERF_ENV", "cloud")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("DEFAULT_CONCURRENCY", "0")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("DEFAULT_REQUEST_COUNT", "-1")])).is_err());
        assert!(AppConfig::from_lookup(lookup_from(&[("JIRA_BASE_URL", "not a url")])).is_err());
    }

    #[test]
    fn banner_follows_environment() {
        assert_eq!(AppEnvironment::Forge.banner(), "requestJira() performance test");
        assert_eq!(AppEnvironment::Connect.banner(), "AP.request() performance test");
    }
}
