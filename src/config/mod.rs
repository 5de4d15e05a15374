pub mod paths;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::hardware::{ComputeCapability, ResolverOptions, DEFAULT_FALLBACK_CAPABILITY};

pub use paths::PathConfig;

/// Operator override for the detected compute capability
pub const CUDA_ARCH_ENV: &str = "CUDA_ARCH_BIN";
/// Alternate device-tree node, mostly for testing off-device
pub const MODEL_PATH_ENV: &str = "JETSON_MODEL_PATH";
/// Capability used for unrecognized boards
pub const FALLBACK_ARCH_ENV: &str = "JETSON_FALLBACK_ARCH";

/// Deployment configuration, built once at startup and passed by reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    pub project_name: String,
    pub paths: PathConfig,
    pub fallback_capability: ComputeCapability,
    pub capability_override: Option<ComputeCapability>,
    pub confirm_timeout_secs: u64,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            project_name: "jetson-deploy".to_string(),
            paths: PathConfig::default(),
            fallback_capability: DEFAULT_FALLBACK_CAPABILITY,
            capability_override: None,
            confirm_timeout_secs: 10,
        }
    }
}

impl DeploymentConfig {
    /// Load from a JSON file; missing fields take their defaults
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&json)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    /// Layer environment overrides on top of this config
    ///
    /// `lookup` is usually `|k| std::env::var(k).ok()`.
    pub fn apply_env<F>(mut self, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(CUDA_ARCH_ENV).filter(|v| !v.trim().is_empty()) {
            let cc = value
                .parse::<ComputeCapability>()
                .with_context(|| format!("Invalid {}", CUDA_ARCH_ENV))?;
            self.capability_override = Some(cc);
        }

        if let Some(value) = lookup(FALLBACK_ARCH_ENV).filter(|v| !v.trim().is_empty()) {
            self.fallback_capability = value
                .parse::<ComputeCapability>()
                .with_context(|| format!("Invalid {}", FALLBACK_ARCH_ENV))?;
        }

        if let Some(value) = lookup(MODEL_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            self.paths.device_model_path = PathBuf::from(value);
        }

        Ok(self)
    }

    /// Apply a command-line capability override, which beats the environment
    pub fn with_override(mut self, cuda_arch: Option<&str>) -> anyhow::Result<Self> {
        if let Some(arch) = cuda_arch {
            let cc = arch
                .parse::<ComputeCapability>()
                .with_context(|| format!("Invalid --cuda-arch {:?}", arch))?;
            self.capability_override = Some(cc);
        }
        Ok(self)
    }

    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            fallback_capability: self.fallback_capability,
        }
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map.into_iter().collect(),
            _ => HashMap::new(),
        }
    }

    pub fn from_dict(data: HashMap<String, serde_json::Value>) -> anyhow::Result<Self> {
        let json = serde_json::to_string(&data)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DeploymentConfig::default();
        assert_eq!(config.fallback_capability, ComputeCapability::SM_72);
        assert!(config.capability_override.is_none());
        assert_eq!(config.paths.env_file, PathBuf::from(".env"));
        assert_eq!(
            config.paths.device_model_path,
            PathBuf::from("/proc/device-tree/model")
        );
    }

    #[test]
    fn test_apply_env_overrides() {
        let config = DeploymentConfig::default()
            .apply_env(env_of(&[
                (CUDA_ARCH_ENV, "8.7"),
                (FALLBACK_ARCH_ENV, "5.3"),
                (MODEL_PATH_ENV, "/tmp/model"),
            ]))
            .unwrap();

        assert_eq!(config.capability_override, Some(ComputeCapability::SM_87));
        assert_eq!(config.fallback_capability, ComputeCapability::SM_53);
        assert_eq!(config.paths.device_model_path, PathBuf::from("/tmp/model"));
    }

    #[test]
    fn test_apply_env_ignores_blank_values() {
        let config = DeploymentConfig::default()
            .apply_env(env_of(&[(CUDA_ARCH_ENV, "  ")]))
            .unwrap();
        assert!(config.capability_override.is_none());
    }

    #[test]
    fn test_apply_env_rejects_bad_capability() {
        let err = DeploymentConfig::default()
            .apply_env(env_of(&[(CUDA_ARCH_ENV, "ampere")]))
            .unwrap_err();
        assert!(format!("{:#}", err).contains(CUDA_ARCH_ENV));
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{"fallback_capability": "6.2", "paths": {"env_file": "deploy.env"}}"#;
        let config: DeploymentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.fallback_capability, ComputeCapability::SM_62);
        assert_eq!(config.paths.env_file, PathBuf::from("deploy.env"));
        assert_eq!(config.paths.bundle_dir, PathBuf::from("dist/client"));
        assert_eq!(config.project_name, "jetson-deploy");
    }

    #[test]
    fn test_dict_round_trip() {
        let config = DeploymentConfig {
            capability_override: Some(ComputeCapability::SM_87),
            ..Default::default()
        };
        let dict = config.to_dict();
        assert!(dict.contains_key("paths"));
        assert_eq!(dict["capability_override"], "8.7");
        assert_eq!(DeploymentConfig::from_dict(dict).unwrap(), config);
    }
}
