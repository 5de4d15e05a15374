//! Hardware detection for NVIDIA Jetson modules

use crate::config::DeploymentConfig;
use crate::hardware::profiles::{classify, resolve_with, DeviceFamily, HardwareProfile};
use std::fs;
use std::path::Path;

/// Device-tree node holding the board model string on L4T
pub const DEVICE_MODEL_PATH: &str = "/proc/device-tree/model";

/// Read the raw board model string
///
/// Returns `None` on non-Jetson hosts (file missing or empty). The
/// device-tree string is NUL-terminated, which is stripped here.
pub fn read_model_string<P: AsRef<Path>>(path: P) -> Option<String> {
    let path = path.as_ref();
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Could not read {}: {}", path.display(), e);
            return None;
        }
    };

    let model = String::from_utf8_lossy(&bytes)
        .trim_end_matches('\0')
        .trim()
        .to_string();

    if model.is_empty() {
        None
    } else {
        Some(model)
    }
}

/// Auto-detect the board and resolve its profile
///
/// Uses `model` when given instead of reading the device tree. The
/// operator's capability override, if configured, always wins.
pub fn detect_profile(config: &DeploymentConfig, model: Option<&str>) -> HardwareProfile {
    let model = match model {
        Some(m) => Some(m.trim().to_string()),
        None => read_model_string(&config.paths.device_model_path),
    };
    let model = model.unwrap_or_default();

    let profile = resolve_with(&model, &config.resolver_options());
    tracing::debug!(
        "Resolved {:?} as {:?} (CUDA {})",
        model,
        profile.family,
        profile.cuda_compute_capability
    );

    if !profile.is_recognized() {
        tracing::warn!(
            "Unrecognized hardware {:?}, using fallback compute capability {}",
            model,
            profile.cuda_compute_capability
        );
    }

    match config.capability_override {
        Some(cc) => {
            tracing::info!("Using operator-supplied compute capability {}", cc);
            profile.with_capability_override(cc)
        }
        None => profile,
    }
}

/// True when the device tree names a recognized Jetson module
pub fn is_jetson<P: AsRef<Path>>(path: P) -> bool {
    read_model_string(path)
        .map(|model| classify(&model) != DeviceFamily::Unknown)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{CapabilitySource, ComputeCapability};
    use tempfile::TempDir;

    #[test]
    fn test_read_strips_nul_terminator() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model");
        fs::write(&path, b"NVIDIA Jetson AGX Orin Developer Kit\0").unwrap();

        assert_eq!(
            read_model_string(&path).as_deref(),
            Some("NVIDIA Jetson AGX Orin Developer Kit")
        );
        assert!(is_jetson(&path));
    }

    #[test]
    fn test_missing_or_empty_node() {
        let dir = TempDir::new().unwrap();
        assert_eq!(read_model_string(dir.path().join("absent")), None);

        let empty = dir.path().join("empty");
        fs::write(&empty, b"\0").unwrap();
        assert_eq!(read_model_string(&empty), None);
        assert!(!is_jetson(&empty));
    }

    #[test]
    fn test_detect_without_device_tree_falls_back() {
        let dir = TempDir::new().unwrap();
        let mut config = DeploymentConfig::default();
        config.paths.device_model_path = dir.path().join("absent");

        let profile = detect_profile(&config, None);
        assert_eq!(profile.family, DeviceFamily::Unknown);
        assert_eq!(profile.cuda_compute_capability, ComputeCapability::SM_72);
        assert_eq!(profile.capability_source, CapabilitySource::Fallback);
        assert!(profile.model.is_empty());
    }

    #[test]
    fn test_explicit_model_and_override() {
        let config = DeploymentConfig {
            capability_override: Some(ComputeCapability::new(7, 5)),
            ..Default::default()
        };

        let profile = detect_profile(&config, Some("NVIDIA Jetson Xavier NX"));
        assert_eq!(profile.family, DeviceFamily::XavierNX);
        assert_eq!(profile.cuda_compute_capability, ComputeCapability::new(7, 5));
        assert_eq!(profile.capability_source, CapabilitySource::Override);
    }
}
