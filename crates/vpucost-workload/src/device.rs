//! VPU device generations.

use std::fmt;
use std::str::FromStr;

use crate::types::ParseTagError;

/// A VPU hardware generation.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum VpuDevice {
    /// VPU 2.0.
    Vpu2_0,
    /// VPU 2.1.
    Vpu2_1,
    /// VPU 2.7.
    Vpu2_7,
    /// VPU 4.0.
    Vpu4_0,
}

impl VpuDevice {
    /// All known generations, oldest first.
    pub const ALL: [VpuDevice; 4] = [Self::Vpu2_0, Self::Vpu2_1, Self::Vpu2_7, Self::Vpu4_0];

    /// Whether this generation executes DPU workloads in NTHW-NTK cuboid
    /// modes rather than the legacy matrix/vector modes.
    pub fn uses_cuboid_modes(self) -> bool {
        matches!(self, Self::Vpu2_7 | Self::Vpu4_0)
    }

    /// Canonical tag name, as it appears in serialized descriptors.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vpu2_0 => "VPU_2_0",
            Self::Vpu2_1 => "VPU_2_1",
            Self::Vpu2_7 => "VPU_2_7",
            Self::Vpu4_0 => "VPU_4_0",
        }
    }
}

impl fmt::Display for VpuDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VpuDevice {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|d| s.eq_ignore_ascii_case(d.as_str()))
            .copied()
            .ok_or_else(|| ParseTagError::new("device", s, "VPU_2_0, VPU_2_1, VPU_2_7, VPU_4_0"))
    }
}
