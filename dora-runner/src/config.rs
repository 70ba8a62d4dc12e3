//! Runner configuration
//!
//! Defines all configurable parameters for the runner: the simulated team's
//! performance level, GitHub connection settings, and the polling intervals
//! used while waiting for status checks and deployments.

use dora_core::domain::{PerformanceTier, TeamLevel};
use std::time::Duration;
use thiserror::Error;

use crate::error::RunnerError;

const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
const DEFAULT_BASE_URL: &str = "https://github.com";
const DEFAULT_DEPLOY_CHECK_NAME: &str = "deploy";
const DEFAULT_CHANGE_FILE_PATH: &str = "envs/dev/terragrunt.hcl";

/// Configuration errors
///
/// Any of these aborts startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("unknown team performance level: {0}")]
    UnknownLevel(String),

    #[error("invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Performance tier the simulated team deploys at
    pub tier: PerformanceTier,

    /// Personal access token used for the API and for git over HTTPS
    pub token: String,

    /// Organisation (or user) owning the repository
    pub org: String,

    /// Repository name
    pub repo_name: String,

    /// GraphQL endpoint
    pub graphql_url: String,

    /// Web base URL the repository is cloned from (e.g., "https://github.com")
    pub base_url: String,

    /// Maximum time to wait for status checks or a deployment
    pub poll_timeout: Duration,

    /// How often to query while waiting
    pub poll_interval: Duration,

    /// How long to wait before asking again after a skipped cycle
    pub recheck_interval: Duration,

    /// Name of the workflow job whose result marks a deployment
    pub deploy_check_name: String,

    /// File rewritten by each generated change, relative to the repository root
    pub change_file_path: String,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(level: TeamLevel, token: String, org: String, repo_name: String) -> Self {
        Self {
            tier: PerformanceTier::for_level(level),
            token,
            org,
            repo_name,
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_timeout: Duration::from_secs(600), // 10 minutes
            poll_interval: Duration::from_secs(10),
            recheck_interval: Duration::from_secs(300),
            deploy_check_name: DEFAULT_DEPLOY_CHECK_NAME.to_string(),
            change_file_path: DEFAULT_CHANGE_FILE_PATH.to_string(),
        }
    }

    /// Loads and validates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - DORA_TEAM_PERFORMANCE_LEVEL (required, elite|high|medium|low, any case)
    /// - GH_PAT (required)
    /// - GH_ORG (required)
    /// - GH_REPO_NAME (required)
    /// - GH_GRAPHQL_URL (optional, default: https://api.github.com/graphql)
    /// - GH_BASE_URL (optional, default: https://github.com)
    /// - POLL_TIMEOUT (optional, seconds, default: 600)
    /// - POLL_INTERVAL (optional, seconds, default: 10)
    /// - RECHECK_INTERVAL (optional, seconds, default: 300)
    /// - DEPLOY_CHECK_NAME (optional, default: deploy)
    /// - CHANGE_FILE_PATH (optional, default: envs/dev/terragrunt.hcl)
    pub fn load() -> Result<Self, RunnerError> {
        Self::load_from(|key| std::env::var(key).ok())
    }

    /// Loads and validates configuration from an arbitrary variable lookup
    pub fn load_from<F>(lookup: F) -> Result<Self, RunnerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = Self::from_lookup(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Creates configuration from an arbitrary variable lookup
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let level_name = require("DORA_TEAM_PERFORMANCE_LEVEL")?;
        let level = level_name
            .parse::<TeamLevel>()
            .map_err(|_| ConfigError::UnknownLevel(level_name.clone()))?;

        let mut config = Self::new(
            level,
            require("GH_PAT")?,
            require("GH_ORG")?,
            require("GH_REPO_NAME")?,
        );

        if let Some(url) = get("GH_GRAPHQL_URL") {
            config.graphql_url = url;
        }
        if let Some(url) = get("GH_BASE_URL") {
            config.base_url = url;
        }
        if let Some(timeout) = parse_seconds(&get, "POLL_TIMEOUT")? {
            config.poll_timeout = timeout;
        }
        if let Some(interval) = parse_seconds(&get, "POLL_INTERVAL")? {
            config.poll_interval = interval;
        }
        if let Some(interval) = parse_seconds(&get, "RECHECK_INTERVAL")? {
            config.recheck_interval = interval;
        }
        if let Some(name) = get("DEPLOY_CHECK_NAME") {
            config.deploy_check_name = name;
        }
        if let Some(path) = get("CHANGE_FILE_PATH") {
            config.change_file_path = path;
        }

        Ok(config)
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var, url) in [
            ("GH_GRAPHQL_URL", &self.graphql_url),
            ("GH_BASE_URL", &self.base_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    var,
                    value: url.clone(),
                });
            }
        }

        for (var, duration) in [
            ("POLL_TIMEOUT", self.poll_timeout),
            ("POLL_INTERVAL", self.poll_interval),
            ("RECHECK_INTERVAL", self.recheck_interval),
        ] {
            if duration.is_zero() {
                return Err(ConfigError::Invalid {
                    var,
                    value: "0".to_string(),
                });
            }
        }

        Ok(())
    }

    /// URL the repository is cloned from and pushed to
    pub fn remote_url(&self) -> String {
        format!(
            "{}/{}/{}.git",
            self.base_url.trim_end_matches('/'),
            self.org,
            self.repo_name
        )
    }
}

fn parse_seconds<G>(get: &G, var: &'static str) -> Result<Option<Duration>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    get(var)
        .map(|value| {
            value
                .trim()
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|_| ConfigError::Invalid { var, value })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![
            ("DORA_TEAM_PERFORMANCE_LEVEL", "elite"),
            ("GH_PAT", "test-pat"),
            ("GH_ORG", "test-org"),
            ("GH_REPO_NAME", "test-repo-name"),
        ]
    }

    #[test]
    fn test_config_from_required_vars() {
        let config = Config::from_lookup(lookup(&required())).unwrap();

        assert_eq!(config.tier.level, TeamLevel::Elite);
        assert_eq!(config.token, "test-pat");
        assert_eq!(config.org, "test-org");
        assert_eq!(config.repo_name, "test-repo-name");
        assert_eq!(config.graphql_url, "https://api.github.com/graphql");
        assert_eq!(config.base_url, "https://github.com");
        assert_eq!(config.poll_timeout, Duration::from_secs(600));
        assert_eq!(config.poll_interval, Duration::from_secs(10));
        assert_eq!(config.deploy_check_name, "deploy");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_overrides() {
        let mut vars = required();
        vars.extend([
            ("DORA_TEAM_PERFORMANCE_LEVEL", "LOW"),
            ("GH_GRAPHQL_URL", "http://localhost:9000/graphql"),
            ("GH_BASE_URL", "https://github.example.com/"),
            ("POLL_TIMEOUT", "60"),
            ("POLL_INTERVAL", "2"),
            ("DEPLOY_CHECK_NAME", "release"),
        ]);

        let config = Config::from_lookup(lookup(&vars)).unwrap();

        assert_eq!(config.tier.level, TeamLevel::Low);
        assert_eq!(config.graphql_url, "http://localhost:9000/graphql");
        assert_eq!(config.poll_timeout, Duration::from_secs(60));
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.deploy_check_name, "release");
        assert_eq!(
            config.remote_url(),
            "https://github.example.com/test-org/test-repo-name.git"
        );
    }

    #[test]
    fn test_config_missing_vars() {
        for missing in ["DORA_TEAM_PERFORMANCE_LEVEL", "GH_PAT", "GH_ORG", "GH_REPO_NAME"] {
            let vars: Vec<_> = required().into_iter().filter(|(k, _)| *k != missing).collect();
            let err = Config::from_lookup(lookup(&vars)).unwrap_err();
            assert_eq!(err, ConfigError::Missing(missing));
        }
    }

    #[test]
    fn test_config_empty_value_is_missing() {
        let mut vars = required();
        vars.push(("GH_PAT", ""));

        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::Missing("GH_PAT"));
    }

    #[test]
    fn test_config_unknown_level() {
        let mut vars = required();
        vars.push(("DORA_TEAM_PERFORMANCE_LEVEL", "superb"));

        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert_eq!(err, ConfigError::UnknownLevel("superb".to_string()));
    }

    #[test]
    fn test_config_invalid_interval() {
        let mut vars = required();
        vars.push(("POLL_INTERVAL", "soon"));

        let err = Config::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "POLL_INTERVAL", .. }));
    }

    #[test]
    fn test_load_reports_config_errors() {
        let vars: Vec<_> = required()
            .into_iter()
            .filter(|(k, _)| *k != "GH_ORG")
            .collect();
        let err = Config::load_from(lookup(&vars)).unwrap_err();
        assert!(matches!(err, RunnerError::Config(ConfigError::Missing("GH_ORG"))));
        assert_eq!(err.to_string(), "configuration error: GH_ORG is not set");

        let mut vars = required();
        vars.push(("POLL_TIMEOUT", "0"));
        let err = Config::load_from(lookup(&vars)).unwrap_err();
        assert!(matches!(
            err,
            RunnerError::Config(ConfigError::Invalid { var: "POLL_TIMEOUT", .. })
        ));
    }

    #[test]
    fn test_load_accepts_required_vars() {
        let config = Config::load_from(lookup(&required())).unwrap();
        assert_eq!(config.repo_name, "test-repo-name");
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::from_lookup(lookup(&required())).unwrap();
        assert!(config.validate().is_ok());

        config.base_url = "github.com".to_string();
        assert!(config.validate().is_err());

        config.base_url = "https://github.com".to_string();
        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
