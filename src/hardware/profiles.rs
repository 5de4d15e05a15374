//! Jetson device families and their deployment profiles
//!
//! The model string published by the device tree is matched against a fixed,
//! ordered list of tokens. Family names are substrings of each other
//! ("Orin" vs "Orin Nano", "Xavier" vs "AGX Xavier"), so the more specific
//! tokens are always tested first.

use crate::hardware::capability::ComputeCapability;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Jetson module family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceFamily {
    Orin,
    OrinNX,
    OrinNano,
    OrinSuper,
    AGXXavier,
    XavierNX,
    Nano,
    TX2,
    Unknown,
}

impl DeviceFamily {
    pub const ALL: [DeviceFamily; 9] = [
        DeviceFamily::Orin,
        DeviceFamily::OrinNX,
        DeviceFamily::OrinNano,
        DeviceFamily::OrinSuper,
        DeviceFamily::AGXXavier,
        DeviceFamily::XavierNX,
        DeviceFamily::Nano,
        DeviceFamily::TX2,
        DeviceFamily::Unknown,
    ];

    pub fn is_orin(&self) -> bool {
        matches!(
            self,
            DeviceFamily::Orin
                | DeviceFamily::OrinNX
                | DeviceFamily::OrinNano
                | DeviceFamily::OrinSuper
        )
    }

    pub fn is_xavier(&self) -> bool {
        matches!(self, DeviceFamily::AGXXavier | DeviceFamily::XavierNX)
    }

    /// Compute capability for a recognized family, `None` for `Unknown`
    pub fn compute_capability(&self) -> Option<ComputeCapability> {
        match self {
            f if f.is_orin() => Some(ComputeCapability::SM_87),
            f if f.is_xavier() => Some(ComputeCapability::SM_72),
            DeviceFamily::Nano => Some(ComputeCapability::SM_53),
            DeviceFamily::TX2 => Some(ComputeCapability::SM_62),
            _ => None,
        }
    }

    /// Stable identifier written into `.env` files
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceFamily::Orin => "orin",
            DeviceFamily::OrinNX => "orin-nx",
            DeviceFamily::OrinNano => "orin-nano",
            DeviceFamily::OrinSuper => "orin-super",
            DeviceFamily::AGXXavier => "agx-xavier",
            DeviceFamily::XavierNX => "xavier-nx",
            DeviceFamily::Nano => "nano",
            DeviceFamily::TX2 => "tx2",
            DeviceFamily::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DeviceFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceFamily::Orin => "AGX Orin",
            DeviceFamily::OrinNX => "Orin NX",
            DeviceFamily::OrinNano => "Orin Nano",
            DeviceFamily::OrinSuper => "Orin Super",
            DeviceFamily::AGXXavier => "AGX Xavier",
            DeviceFamily::XavierNX => "Xavier NX",
            DeviceFamily::Nano => "Nano",
            DeviceFamily::TX2 => "TX2",
            DeviceFamily::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

/// TensorRT numeric precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrecisionMode {
    FP16,
    FP32,
}

impl fmt::Display for PrecisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PrecisionMode::FP16 => "FP16",
            PrecisionMode::FP32 => "FP32",
        })
    }
}

/// Where the profile's compute capability came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilitySource {
    /// Looked up from the recognized family
    Detected,
    /// Unrecognized hardware, configured fallback used
    Fallback,
    /// Supplied explicitly by the operator
    Override,
}

/// Options for [`resolve_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverOptions {
    /// Capability reported for unrecognized hardware
    pub fallback_capability: ComputeCapability,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            fallback_capability: DEFAULT_FALLBACK_CAPABILITY,
        }
    }
}

/// Xavier's capability, used when the board cannot be identified
pub const DEFAULT_FALLBACK_CAPABILITY: ComputeCapability = ComputeCapability::SM_72;

/// Resolved deployment profile for one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub family: DeviceFamily,
    pub model: String,
    pub cuda_compute_capability: ComputeCapability,
    pub capability_source: CapabilitySource,
    pub max_performance_mode: bool,
    pub tensor_cores_enabled: bool,
    pub malloc_arena_max: u8,
    pub tensorrt_precision: PrecisionMode,
}

impl HardwareProfile {
    /// Replace the compute capability with an operator-supplied value
    ///
    /// Family and tuning flags are left untouched.
    pub fn with_capability_override(mut self, capability: ComputeCapability) -> Self {
        self.cuda_compute_capability = capability;
        self.capability_source = CapabilitySource::Override;
        self
    }

    pub fn is_recognized(&self) -> bool {
        self.family != DeviceFamily::Unknown
    }

    /// Print a summary of this profile
    pub fn print_summary(&self) {
        let model = if self.model.is_empty() {
            "(not a Jetson device)"
        } else {
            self.model.as_str()
        };
        let source = match self.capability_source {
            CapabilitySource::Detected => "detected",
            CapabilitySource::Fallback => "fallback",
            CapabilitySource::Override => "override",
        };

        println!("Jetson Hardware Profile:");
        println!("  Model:              {}", model);
        println!("  Family:             {}", self.family);
        println!(
            "  CUDA capability:    {} ({})",
            self.cuda_compute_capability, source
        );
        println!("  Max performance:    {}", self.max_performance_mode);
        println!("  Tensor cores:       {}", self.tensor_cores_enabled);
        println!("  MALLOC_ARENA_MAX:   {}", self.malloc_arena_max);
        println!("  TensorRT precision: {}", self.tensorrt_precision);
    }
}

/// Classify a raw device-tree model string into a family
pub fn classify(model: &str) -> DeviceFamily {
    if model.contains("Orin") {
        if model.contains("NX") {
            DeviceFamily::OrinNX
        } else if model.contains("Nano") {
            DeviceFamily::OrinNano
        } else if model.contains("Super") {
            DeviceFamily::OrinSuper
        } else {
            DeviceFamily::Orin
        }
    } else if model.contains("AGX Xavier") {
        DeviceFamily::AGXXavier
    } else if model.contains("Xavier") {
        DeviceFamily::XavierNX
    } else if model.contains("Nano") {
        DeviceFamily::Nano
    } else if model.contains("TX") {
        DeviceFamily::TX2
    } else {
        DeviceFamily::Unknown
    }
}

/// Resolve a model string with the default fallback capability
pub fn resolve(model: &str) -> HardwareProfile {
    resolve_with(model, &ResolverOptions::default())
}

/// Resolve a model string into a full profile. Never fails.
pub fn resolve_with(model: &str, options: &ResolverOptions) -> HardwareProfile {
    let family = classify(model);

    let (cuda_compute_capability, capability_source) = match family.compute_capability() {
        Some(cc) => (cc, CapabilitySource::Detected),
        None => (options.fallback_capability, CapabilitySource::Fallback),
    };

    let (max_performance_mode, tensor_cores_enabled, malloc_arena_max) = match family {
        DeviceFamily::OrinNano => (false, false, 2),
        DeviceFamily::Orin | DeviceFamily::OrinNX | DeviceFamily::OrinSuper => (true, true, 4),
        DeviceFamily::AGXXavier | DeviceFamily::XavierNX => (true, false, 2),
        DeviceFamily::Nano | DeviceFamily::TX2 | DeviceFamily::Unknown => (false, false, 1),
    };

    let tensorrt_precision = if family.is_orin() || family.is_xavier() {
        PrecisionMode::FP16
    } else {
        PrecisionMode::FP32
    };

    HardwareProfile {
        family,
        model: model.to_string(),
        cuda_compute_capability,
        capability_source,
        max_performance_mode,
        tensor_cores_enabled,
        malloc_arena_max,
        tensorrt_precision,
    }
}
