use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::hardware::detection::DEVICE_MODEL_PATH;

/// Path configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub device_model_path: PathBuf,
    pub env_file: PathBuf,
    pub bundle_dir: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            device_model_path: PathBuf::from(DEVICE_MODEL_PATH),
            env_file: PathBuf::from(".env"),
            bundle_dir: PathBuf::from("dist/client"),
        }
    }
}
