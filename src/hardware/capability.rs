//! CUDA compute-capability tokens
//!
//! Jetson modules report their GPU generation as a `major.minor` token
//! (`8.7` for Orin, `7.2` for Xavier). The same token is what the container
//! build expects in `CUDA_ARCH_BIN`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CapabilityError {
    #[error("compute capability must not be empty")]
    Empty,

    #[error("compute capability must look like MAJOR.MINOR (e.g. 8.7), got {0:?}")]
    Malformed(String),
}

static CAPABILITY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})\.(\d{1,2})$").unwrap());

/// GPU architecture generation as a `major.minor` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComputeCapability {
    pub major: u8,
    pub minor: u8,
}

impl ComputeCapability {
    /// Maxwell (Nano)
    pub const SM_53: Self = Self::new(5, 3);
    /// Pascal (TX2)
    pub const SM_62: Self = Self::new(6, 2);
    /// Volta (Xavier)
    pub const SM_72: Self = Self::new(7, 2);
    /// Ampere (Orin)
    pub const SM_87: Self = Self::new(8, 7);

    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    /// Token without the dot, as used in `sm_87` style arch flags
    pub fn sm_token(&self) -> String {
        format!("{}{}", self.major, self.minor)
    }
}

impl fmt::Display for ComputeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl FromStr for ComputeCapability {
    type Err = CapabilityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(CapabilityError::Empty);
        }

        let caps = CAPABILITY_PATTERN
            .captures(token)
            .ok_or_else(|| CapabilityError::Malformed(token.to_string()))?;

        // Both groups are at most two digits, so they always fit in u8
        let major = caps[1]
            .parse()
            .map_err(|_| CapabilityError::Malformed(token.to_string()))?;
        let minor = caps[2]
            .parse()
            .map_err(|_| CapabilityError::Malformed(token.to_string()))?;

        Ok(Self::new(major, minor))
    }
}

impl Serialize for ComputeCapability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ComputeCapability {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        token.parse().map_err(serde::de::Error::custom)
    }
}
