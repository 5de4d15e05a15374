//! Client distribution bundle
//!
//! A bundle is the generated configuration handed to client machines that
//! run the containers: the hardware `.env`, the resolved profile as JSON and
//! a manifest describing both.

use crate::config::DeploymentConfig;
use crate::env::EnvFile;
use crate::hardware::HardwareProfile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_FILE_NAME: &str = ".env";
pub const PROFILE_FILE_NAME: &str = "hardware_profile.json";
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("bundle directory {0} is not empty (use overwrite to replace it)")]
    NotEmpty(PathBuf),

    #[error(transparent)]
    Env(#[from] crate::env::EnvError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Describes the contents of an exported bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    pub project_name: String,
    pub generator_version: String,
    pub created_at: String,
    pub family: String,
    pub cuda_compute_capability: String,
    pub files: Vec<String>,
}

impl BundleManifest {
    /// Load a manifest from an exported bundle directory
    pub fn load<P: AsRef<Path>>(bundle_dir: P) -> Result<Self, BundleError> {
        let json = fs::read_to_string(bundle_dir.as_ref().join(MANIFEST_FILE_NAME))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Write a client bundle for `profile` into `out_dir`
pub fn export_bundle(
    profile: &HardwareProfile,
    config: &DeploymentConfig,
    out_dir: &Path,
    overwrite: bool,
) -> Result<BundleManifest, BundleError> {
    if out_dir.exists() && !overwrite && fs::read_dir(out_dir)?.next().is_some() {
        return Err(BundleError::NotEmpty(out_dir.to_path_buf()));
    }
    fs::create_dir_all(out_dir)?;

    EnvFile::from_profile(profile).save(out_dir.join(ENV_FILE_NAME))?;
    fs::write(
        out_dir.join(PROFILE_FILE_NAME),
        serde_json::to_string_pretty(profile)?,
    )?;

    let manifest = BundleManifest {
        project_name: config.project_name.clone(),
        generator_version: env!("CARGO_PKG_VERSION").to_string(),
        created_at: chrono::Utc::now().to_rfc3339(),
        family: profile.family.as_str().to_string(),
        cuda_compute_capability: profile.cuda_compute_capability.to_string(),
        files: vec![ENV_FILE_NAME.to_string(), PROFILE_FILE_NAME.to_string()],
    };
    fs::write(
        out_dir.join(MANIFEST_FILE_NAME),
        serde_json::to_string_pretty(&manifest)?,
    )?;

    tracing::info!("Exported client bundle to {}", out_dir.display());
    Ok(manifest)
}
