pub mod capability;
pub mod detection;
pub mod profiles;

pub use capability::{CapabilityError, ComputeCapability};
pub use detection::{detect_profile, is_jetson, read_model_string, DEVICE_MODEL_PATH};
pub use profiles::{
    classify, resolve, resolve_with, CapabilitySource, DeviceFamily, HardwareProfile,
    PrecisionMode, ResolverOptions, DEFAULT_FALLBACK_CAPABILITY,
};
