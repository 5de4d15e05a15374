//! Jetson deployment configuration
//!
//! This crate detects which NVIDIA Jetson module it is running on and turns
//! that into the configuration the container build and runtime consume.
//!
//! ## Overview
//!
//! The board model string from the device tree is mapped to a device
//! family, and the family to a fixed profile:
//! - CUDA compute capability (`CUDA_ARCH_BIN`)
//! - power and memory tuning (`MAX_PERFORMANCE_MODE`, `MALLOC_ARENA_MAX`)
//! - TensorRT precision
//!
//! Resolution never fails. Unrecognized hardware gets conservative defaults.
//!
//! ## Main Components
//!
//! - `hardware`: Device-tree detection and the profile resolver
//! - `env`: `.env` rendering, parsing and merging
//! - `config`: Deployment configuration
//! - `bundle`: Client distribution bundle export
//! - `utils`: Operator confirmation prompts

pub mod bundle;
pub mod config;
pub mod env;
pub mod hardware;
pub mod utils;

pub use config::DeploymentConfig;
pub use hardware::{resolve, DeviceFamily, HardwareProfile};

/// Library errors
pub use anyhow::{Error, Result};
