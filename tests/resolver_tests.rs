use jetson_deploy::hardware::{
    classify, resolve, CapabilitySource, ComputeCapability, DeviceFamily, PrecisionMode,
};

#[test]
fn test_orin_nx_regardless_of_other_tokens() {
    for model in [
        "NVIDIA Jetson Orin NX",
        "NVIDIA Jetson Orin NX 16GB",
        "NVIDIA Jetson Orin Nano NX",
        "Super Orin NX TX2 Xavier",
        "OrinNX",
    ] {
        let profile = resolve(model);
        assert_eq!(profile.family, DeviceFamily::OrinNX, "{}", model);
        assert_eq!(profile.cuda_compute_capability, ComputeCapability::SM_87);
    }
}

#[test]
fn test_agx_xavier() {
    let profile = resolve("NVIDIA Jetson AGX Xavier");
    assert_eq!(profile.family, DeviceFamily::AGXXavier);
    assert_eq!(profile.cuda_compute_capability.to_string(), "7.2");
    assert_eq!(profile.tensorrt_precision, PrecisionMode::FP16);
}

#[test]
fn test_nano() {
    let profile = resolve("NVIDIA Jetson Nano");
    assert_eq!(profile.family, DeviceFamily::Nano);
    assert_eq!(profile.cuda_compute_capability.to_string(), "5.3");
    assert_eq!(profile.tensorrt_precision, PrecisionMode::FP32);
    assert_eq!(profile.malloc_arena_max, 1);
}

#[test]
fn test_unknown_inputs_do_not_fail() {
    for model in ["", "some unrelated board"] {
        let profile = resolve(model);
        assert_eq!(profile.family, DeviceFamily::Unknown);
        assert_eq!(profile.cuda_compute_capability.to_string(), "7.2");
        assert_eq!(profile.capability_source, CapabilitySource::Fallback);
        assert_eq!(profile.tensorrt_precision, PrecisionMode::FP32);
        assert!(!profile.max_performance_mode);
        assert_eq!(profile.malloc_arena_max, 1);
    }
}

#[test]
fn test_resolve_is_idempotent() {
    let first = resolve("NVIDIA Jetson AGX Orin Developer Kit");
    let second = resolve("NVIDIA Jetson AGX Orin Developer Kit");
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_orin_nano_is_neither_orin_nor_nano() {
    let family = classify("NVIDIA Jetson Orin Nano");
    assert_eq!(family, DeviceFamily::OrinNano);
    assert_ne!(family, DeviceFamily::Orin);
    assert_ne!(family, DeviceFamily::Nano);
}

#[test]
fn test_tx2() {
    let profile = resolve("NVIDIA Jetson TX2");
    assert_eq!(profile.family, DeviceFamily::TX2);
    assert_eq!(profile.cuda_compute_capability.to_string(), "6.2");
}

#[test]
fn test_xavier_nx_and_orin_super() {
    assert_eq!(classify("NVIDIA Jetson Xavier NX Developer Kit"), DeviceFamily::XavierNX);
    assert_eq!(classify("NVIDIA Jetson Orin Super Developer Kit"), DeviceFamily::OrinSuper);
    assert!(resolve("NVIDIA Jetson Orin Super").tensor_cores_enabled);
}
