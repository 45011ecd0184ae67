//! Pipeline configuration: parallelism, timeouts, and pod-readiness
//! polling, loaded from TOML with per-field defaults.
//!
//! Grounded on the teacher's `config::{load_config, load_config_str}`
//! pair and its `OffloadConfig` schema (serde defaults via
//! `#[serde(default = "...")]` functions rather than a hand-rolled
//! `Default` impl per field, matching the teacher's style of one free
//! function per default).

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Root pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PipelineConfig {
    /// Maximum number of tests run concurrently for one submission.
    /// Spec suggests 4 as a starting point; left configurable since the
    /// right number depends on cluster capacity.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    /// Wall-clock budget for one test's full pipeline run (stage + exec
    /// + classify), in seconds.
    #[serde(default = "default_test_timeout_secs")]
    pub test_timeout_secs: u64,

    /// Interval between pod-readiness polls, in milliseconds. The
    /// original sleeps 5s between polls; kept as the default here.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on readiness polls before giving up with
    /// [`crate::error::Error::Sandbox`]. `None` preserves the original's
    /// unbounded wait; the redesigned default is bounded.
    #[serde(default = "default_poll_max_attempts")]
    pub poll_max_attempts: Option<u32>,

    /// Kubernetes namespace pods are created in. The original hardcodes
    /// `"default"`.
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Path to a kubeconfig file. `None` defers to the `KUBECONFIG`
    /// environment variable, then to the `kube` crate's own default
    /// resolution (in-cluster config, then `~/.kube/config`).
    #[serde(default)]
    pub kubeconfig_path: Option<String>,
}

fn default_max_parallel() -> usize {
    4
}

fn default_test_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_poll_max_attempts() -> Option<u32> {
    Some(24) // 24 * 5s = 2 minutes before giving up
}

fn default_namespace() -> String {
    "default".to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            test_timeout_secs: default_test_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_attempts: default_poll_max_attempts(),
            namespace: default_namespace(),
            kubeconfig_path: None,
        }
    }
}

impl PipelineConfig {
    /// Resolves the kubeconfig path: the config file's explicit value,
    /// else the `KUBECONFIG` environment variable, else `None`.
    pub fn resolve_kubeconfig_path(&self) -> Option<String> {
        self.kubeconfig_path
            .clone()
            .or_else(|| std::env::var("KUBECONFIG").ok())
    }
}

/// Loads a [`PipelineConfig`] from a TOML file on disk.
pub fn load_config(path: &Path) -> Result<PipelineConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    load_config_str(&content)
}

/// Loads a [`PipelineConfig`] from a TOML string.
pub fn load_config_str(content: &str) -> Result<PipelineConfig> {
    let config: PipelineConfig =
        toml::from_str(content).context("Failed to parse config")?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_on_empty_document() {
        let cfg = load_config_str("").unwrap();
        assert_eq!(cfg.max_parallel, 4);
        assert_eq!(cfg.namespace, "default");
        assert_eq!(cfg.poll_max_attempts, Some(24));
        assert!(cfg.kubeconfig_path.is_none());
    }

    #[test]
    fn overrides_parse() {
        let cfg = load_config_str(
            r#"
            max_parallel = 8
            namespace = "submissions"
            poll_max_attempts = 0
            "#,
        )
        .unwrap();
        assert_eq!(cfg.max_parallel, 8);
        assert_eq!(cfg.namespace, "submissions");
        assert_eq!(cfg.poll_max_attempts, Some(0));
    }

    #[test]
    fn malformed_toml_is_rejected() {
        assert!(load_config_str("max_parallel = [").is_err());
    }

    #[test]
    fn kubeconfig_path_falls_back_to_env_var() {
        std::env::set_var("KUBECONFIG", "/tmp/does-not-need-to-exist/config");
        let cfg = load_config_str("").unwrap();
        assert_eq!(
            cfg.resolve_kubeconfig_path(),
            Some("/tmp/does-not-need-to-exist/config".to_string())
        );
        std::env::remove_var("KUBECONFIG");
    }

    #[test]
    fn explicit_kubeconfig_path_wins_over_env_var() {
        std::env::set_var("KUBECONFIG", "/tmp/env-path");
        let cfg = load_config_str(r#"kubeconfig_path = "/tmp/explicit-path""#).unwrap();
        assert_eq!(
            cfg.resolve_kubeconfig_path(),
            Some("/tmp/explicit-path".to_string())
        );
        std::env::remove_var("KUBECONFIG");
    }
}
