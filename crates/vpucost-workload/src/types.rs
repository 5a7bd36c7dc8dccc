//! Symbolic tags shared by workload descriptors.
//!
//! Every tag is a closed enum with a canonical serialized name; parsing is
//! case-insensitive. The `EnumName.VARIANT` qualification used by the
//! estimator boundary is applied only when a descriptor is rendered, never
//! stored here.

use std::fmt;
use std::str::FromStr;

/// A choice flag value did not match any known tag.
#[derive(Clone, Debug, thiserror::Error)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseTagError {
    kind: &'static str,
    value: String,
    expected: &'static str,
}

impl ParseTagError {
    /// A parse failure for a `kind` flag, with the accepted tags listed in
    /// `expected`.
    pub fn new(kind: &'static str, value: &str, expected: &'static str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
            expected,
        }
    }
}

/// Looks up `s` among `(tag, value)` pairs, ignoring ASCII case.
fn lookup<T: Copy>(
    s: &str,
    table: &[(&'static str, T)],
    kind: &'static str,
    expected: &'static str,
) -> Result<T, ParseTagError> {
    table
        .iter()
        .find(|(tag, _)| s.eq_ignore_ascii_case(tag))
        .map(|&(_, value)| value)
        .ok_or_else(|| ParseTagError::new(kind, s, expected))
}

/// Per-tensor element type.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum DataType {
    /// Unsigned 8-bit integer.
    Uint8,
    /// Signed 8-bit integer.
    Int8,
    /// IEEE half-precision float.
    Float16,
    /// Brain float.
    Bfloat16,
}

impl DataType {
    /// Element size in bytes.
    pub fn size_bytes(self) -> u32 {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Float16 | Self::Bfloat16 => 2,
        }
    }

    /// Whether this type belongs to the floating-point family.
    pub fn is_float_family(self) -> bool {
        matches!(self, Self::Float16 | Self::Bfloat16)
    }

    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uint8 => "UINT8",
            Self::Int8 => "INT8",
            Self::Float16 => "FLOAT16",
            Self::Bfloat16 => "BFLOAT16",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataType {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            s,
            &[
                ("UINT8", Self::Uint8),
                ("INT8", Self::Int8),
                ("FLOAT16", Self::Float16),
                ("BFLOAT16", Self::Bfloat16),
            ],
            "data type",
            "UINT8, INT8, FLOAT16, BFLOAT16",
        )
    }
}

/// DPU operation kind.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Operation {
    /// Dense convolution.
    Convolution,
    /// Depthwise convolution.
    DwConvolution,
    /// Element-wise binary operation.
    Eltwise,
    /// Max pooling.
    Maxpool,
    /// Channel-major (compressed input) convolution.
    CmConvolution,
}

impl Operation {
    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Convolution => "CONVOLUTION",
            Self::DwConvolution => "DW_CONVOLUTION",
            Self::Eltwise => "ELTWISE",
            Self::Maxpool => "MAXPOOL",
            Self::CmConvolution => "CM_CONVOLUTION",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            s,
            &[
                ("CONVOLUTION", Self::Convolution),
                ("DW_CONVOLUTION", Self::DwConvolution),
                ("ELTWISE", Self::Eltwise),
                ("MAXPOOL", Self::Maxpool),
                ("CM_CONVOLUTION", Self::CmConvolution),
            ],
            "operation",
            "CONVOLUTION, DW_CONVOLUTION, ELTWISE, MAXPOOL, CM_CONVOLUTION",
        )
    }
}

/// ODU output tensor layout.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Layout {
    Zxy,
    Xzy,
    Yxz,
    Yzx,
    Zyx,
    Xyz,
}

impl Layout {
    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Zxy => "ZXY",
            Self::Xzy => "XZY",
            Self::Yxz => "YXZ",
            Self::Yzx => "YZX",
            Self::Zyx => "ZYX",
            Self::Xyz => "XYZ",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            s,
            &[
                ("ZXY", Self::Zxy),
                ("XZY", Self::Xzy),
                ("YXZ", Self::Yxz),
                ("YZX", Self::Yzx),
                ("ZYX", Self::Zyx),
                ("XYZ", Self::Xyz),
            ],
            "layout",
            "ZXY, XZY, YXZ, YZX, ZYX, XYZ",
        )
    }
}

/// Activation applied after the operation.
///
/// Accepted on the command line for parity with the descriptor schema but
/// not part of either workload shape.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ActivationFunction {
    None,
    Relu,
    Mult,
    Lrelu,
    Add,
    Sub,
}

impl ActivationFunction {
    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Relu => "RELU",
            Self::Mult => "MULT",
            Self::Lrelu => "LRELU",
            Self::Add => "ADD",
            Self::Sub => "SUB",
        }
    }
}

impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivationFunction {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            s,
            &[
                ("NONE", Self::None),
                ("RELU", Self::Relu),
                ("MULT", Self::Mult),
                ("LRELU", Self::Lrelu),
                ("ADD", Self::Add),
                ("SUB", Self::Sub),
            ],
            "activation",
            "NONE, RELU, MULT, LRELU, ADD, SUB",
        )
    }
}

/// MPE grid configuration on pre-2.7 devices.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum MpeMode {
    Mode4x4,
    Mode16x1,
    Mode4x1,
}

impl MpeMode {
    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mode4x4 => "4x4",
            Self::Mode16x1 => "16x1",
            Self::Mode4x1 => "4x1",
        }
    }
}

impl fmt::Display for MpeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MpeMode {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            s,
            &[
                ("4x4", Self::Mode4x4),
                ("16x1", Self::Mode16x1),
                ("4x1", Self::Mode4x1),
            ],
            "MPE mode",
            "4x4, 16x1, 4x1",
        )
    }
}

/// NTHW-NTK ratio on 2.7+ devices.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum NthwNtk {
    Nthw4x16,
    Nthw8x8,
    Nthw16x4,
}

impl NthwNtk {
    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nthw4x16 => "4x16",
            Self::Nthw8x8 => "8x8",
            Self::Nthw16x4 => "16x4",
        }
    }
}

impl fmt::Display for NthwNtk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NthwNtk {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            s,
            &[
                ("4x16", Self::Nthw4x16),
                ("8x8", Self::Nthw8x8),
                ("16x4", Self::Nthw16x4),
            ],
            "NTHW-NTK mode",
            "4x16, 8x8, 16x4",
        )
    }
}

/// Memory addressing permutation key for a tensor.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Swizzling {
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
}

impl Swizzling {
    /// Maps a raw integer key to a swizzling tag. Keys above 5 are unknown.
    pub fn from_key(key: u8) -> Option<Self> {
        match key {
            0 => Some(Self::Key0),
            1 => Some(Self::Key1),
            2 => Some(Self::Key2),
            3 => Some(Self::Key3),
            4 => Some(Self::Key4),
            5 => Some(Self::Key5),
            _ => None,
        }
    }

    /// The raw integer key.
    pub fn key(self) -> u8 {
        match self {
            Self::Key0 => 0,
            Self::Key1 => 1,
            Self::Key2 => 2,
            Self::Key3 => 3,
            Self::Key4 => 4,
            Self::Key5 => 5,
        }
    }

    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Key0 => "KEY_0",
            Self::Key1 => "KEY_1",
            Self::Key2 => "KEY_2",
            Self::Key3 => "KEY_3",
            Self::Key4 => "KEY_4",
            Self::Key5 => "KEY_5",
        }
    }
}

impl fmt::Display for Swizzling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inter-slice-interconnect tiling strategy.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum IsiStrategy {
    /// No split; the workload stays on one tile.
    Clustering,
    /// Split over the height axis.
    SplitOverH,
    /// Split over the output-channel axis.
    SplitOverK,
}

impl IsiStrategy {
    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clustering => "CLUSTERING",
            Self::SplitOverH => "SPLIT_OVER_H",
            Self::SplitOverK => "SPLIT_OVER_K",
        }
    }
}

impl fmt::Display for IsiStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IsiStrategy {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        lookup(
            s,
            &[
                ("CLUSTERING", Self::Clustering),
                ("SPLIT_OVER_H", Self::SplitOverH),
                ("SPLIT_OVER_K", Self::SplitOverK),
            ],
            "ISI strategy",
            "clustering, split_over_h, split_over_k",
        )
    }
}

/// Tensor location in the memory hierarchy.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum MemoryLocation {
    /// Off-chip DRAM.
    Dram,
    /// On-chip CMX scratchpad.
    Cmx,
}

impl MemoryLocation {
    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dram => "DRAM",
            Self::Cmx => "CMX",
        }
    }
}

impl fmt::Display for MemoryLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Internal compute-engine configuration of a DPU workload.
///
/// Derived from the device generation and per-operation parameters; see
/// [`crate::select_execution_mode`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum ExecutionMode {
    /// 4x4 MPE matrix mode (pre-2.7, integer types).
    Matrix,
    /// Vector mode (pre-2.7, integer types).
    Vector,
    /// Vector mode for FP16/BF16 inputs (pre-2.7).
    VectorFp16,
    /// NTHW-NTK 4x16 cuboid (2.7+).
    Cuboid4x16,
    /// NTHW-NTK 8x8 cuboid (2.7+).
    Cuboid8x16,
    /// NTHW-NTK 16x4 cuboid and the 2.7+ fallback.
    Cuboid16x16,
}

impl ExecutionMode {
    /// Whether this is one of the 2.7+ cuboid modes.
    pub fn is_cuboid(self) -> bool {
        matches!(
            self,
            Self::Cuboid4x16 | Self::Cuboid8x16 | Self::Cuboid16x16
        )
    }

    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matrix => "MATRIX",
            Self::Vector => "VECTOR",
            Self::VectorFp16 => "VECTOR_FP16",
            Self::Cuboid4x16 => "CUBOID_4x16",
            Self::Cuboid8x16 => "CUBOID_8x16",
            Self::Cuboid16x16 => "CUBOID_16x16",
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
