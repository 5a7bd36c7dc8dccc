//! Operation parameters and the two workload-descriptor shapes.

use std::fmt;

use crate::device::VpuDevice;
use crate::geometry::{infer_input_dims, GeometryError};
use crate::mode::select_execution_mode;
use crate::types::{
    ActivationFunction, DataType, ExecutionMode, IsiStrategy, Layout, MemoryLocation, MpeMode,
    NthwNtk, Operation, Swizzling,
};

/// The flat, user-supplied description of one hardware operation.
///
/// Parsed once per invocation and never mutated afterwards; both descriptor
/// shapes are derived from it. For DPU queries `width`/`height` describe the
/// input tensor, for DMA queries they describe the destination tensor and
/// the source extents are inferred from the operation geometry.
#[derive(Clone, Debug)]
pub struct OperationParameters {
    /// Target device generation.
    pub device: VpuDevice,
    /// Operation kind.
    pub operation: Operation,
    /// Tensor width.
    pub width: u32,
    /// Tensor height.
    pub height: u32,
    /// Input channel count.
    pub input_channels: u32,
    /// Output channel count.
    pub output_channels: u32,
    /// Batch size.
    pub batch: u32,
    /// Square kernel extent, applied to both spatial axes.
    pub kernel: u32,
    /// Symmetric padding, applied to both spatial axes.
    pub padding: u32,
    /// Stride, applied to both spatial axes.
    pub stride: u32,
    /// Input tensor element type.
    pub input_dtype: DataType,
    /// Output tensor element type.
    pub output_dtype: DataType,
    /// Output tensor layout.
    pub output_layout: Layout,
    /// Post-operation activation; carried for schema parity, not part of
    /// either descriptor shape.
    pub activation: ActivationFunction,
    /// MPE grid, meaningful on pre-2.7 devices.
    pub mpe_mode: MpeMode,
    /// NTHW-NTK ratio, meaningful on 2.7+ devices.
    pub nthw_ntk: NthwNtk,
    /// Inter-slice-interconnect strategy.
    pub isi_strategy: IsiStrategy,
    /// Activation tensor sparsity rate in `[0, 1]`.
    pub activation_sparsity: f32,
    /// Whether weight sparsity acceleration is enabled.
    pub weight_sparsity_enabled: bool,
    /// Weight tensor sparsity rate in `[0, 1]`.
    pub weight_sparsity: f32,
    /// Input tensor swizzling key.
    pub input_swizzling: Swizzling,
    /// Weight tensor swizzling key.
    pub weight_swizzling: Swizzling,
    /// Output tensor swizzling key.
    pub output_swizzling: Swizzling,
    /// How many tiles the output is broadcast to (1 means no broadcast).
    pub output_write_tiles: u32,
}

impl Default for OperationParameters {
    /// A 56x56x64 UINT8 convolution on VPU 2.7, mirroring the CLI defaults.
    fn default() -> Self {
        Self {
            device: VpuDevice::Vpu2_7,
            operation: Operation::Convolution,
            width: 56,
            height: 56,
            input_channels: 64,
            output_channels: 64,
            batch: 1,
            kernel: 1,
            padding: 0,
            stride: 1,
            input_dtype: DataType::Uint8,
            output_dtype: DataType::Uint8,
            output_layout: Layout::Zxy,
            activation: ActivationFunction::None,
            mpe_mode: MpeMode::Mode4x4,
            nthw_ntk: NthwNtk::Nthw8x8,
            isi_strategy: IsiStrategy::Clustering,
            activation_sparsity: 0.0,
            weight_sparsity_enabled: false,
            weight_sparsity: 0.0,
            input_swizzling: Swizzling::Key0,
            weight_swizzling: Swizzling::Key0,
            output_swizzling: Swizzling::Key0,
            output_write_tiles: 1,
        }
    }
}

/// Descriptor for one DPU compute workload.
///
/// Fully determined by the parameters it is built from; constructed fresh
/// per query and discarded after the estimator call returns.
#[derive(Clone, Debug, PartialEq)]
pub struct DpuWorkload {
    pub device: VpuDevice,
    pub operation: Operation,
    pub input_width: u32,
    pub input_height: u32,
    pub input_channels: u32,
    pub batch: u32,
    pub output_channels: u32,
    pub input_dtype: DataType,
    pub output_dtype: DataType,
    pub output_layout: Layout,
    pub execution_mode: ExecutionMode,
    pub kernel_height: u32,
    pub kernel_width: u32,
    pub stride_height: u32,
    pub stride_width: u32,
    /// Top padding; bottom padding is assumed symmetric.
    pub pad_top: u32,
    /// Left padding; right padding is assumed symmetric.
    pub pad_left: u32,
    pub input_sparsity_rate: f32,
    pub weight_sparsity_enabled: bool,
    pub weight_sparsity_rate: f32,
    pub input_swizzling: Swizzling,
    pub weight_swizzling: Swizzling,
    pub output_swizzling: Swizzling,
    pub output_write_tiles: u32,
    pub isi_strategy: IsiStrategy,
}

impl DpuWorkload {
    /// Builds the compute descriptor, deriving the execution mode from the
    /// device generation and mode parameters.
    ///
    /// The single kernel/stride/padding scalars fan out to both spatial
    /// axes; asymmetric geometry is not expressible at this surface.
    pub fn from_params(params: &OperationParameters) -> Self {
        Self {
            device: params.device,
            operation: params.operation,
            input_width: params.width,
            input_height: params.height,
            input_channels: params.input_channels,
            batch: params.batch,
            output_channels: params.output_channels,
            input_dtype: params.input_dtype,
            output_dtype: params.output_dtype,
            output_layout: params.output_layout,
            execution_mode: select_execution_mode(
                params.device,
                params.input_dtype,
                params.mpe_mode,
                params.nthw_ntk,
            ),
            kernel_height: params.kernel,
            kernel_width: params.kernel,
            stride_height: params.stride,
            stride_width: params.stride,
            pad_top: params.padding,
            pad_left: params.padding,
            input_sparsity_rate: params.activation_sparsity,
            weight_sparsity_enabled: params.weight_sparsity_enabled,
            weight_sparsity_rate: params.weight_sparsity,
            input_swizzling: params.input_swizzling,
            weight_swizzling: params.weight_swizzling,
            output_swizzling: params.output_swizzling,
            output_write_tiles: params.output_write_tiles,
            isi_strategy: params.isi_strategy,
        }
    }

    /// Serialized field list in estimator schema order, with tag-qualified
    /// enum values (`VPUDevice.VPU_2_7`, `Operation.CONVOLUTION`, ...).
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("device", format!("VPUDevice.{}", self.device)),
            ("operation", format!("Operation.{}", self.operation)),
            ("input_0_width", self.input_width.to_string()),
            ("input_0_height", self.input_height.to_string()),
            ("input_0_channels", self.input_channels.to_string()),
            ("input_0_batch", self.batch.to_string()),
            ("output_0_channels", self.output_channels.to_string()),
            ("input_0_datatype", format!("DataType.{}", self.input_dtype)),
            (
                "output_0_datatype",
                format!("DataType.{}", self.output_dtype),
            ),
            ("output_0_layout", format!("Layout.{}", self.output_layout)),
            (
                "execution_order",
                format!("ExecutionMode.{}", self.execution_mode),
            ),
            ("kernel_height", self.kernel_height.to_string()),
            ("kernel_width", self.kernel_width.to_string()),
            ("kernel_stride_height", self.stride_height.to_string()),
            ("kernel_stride_width", self.stride_width.to_string()),
            ("kernel_pad_top", self.pad_top.to_string()),
            ("kernel_pad_left", self.pad_left.to_string()),
            ("input_sparsity_rate", self.input_sparsity_rate.to_string()),
            (
                "weight_sparsity_enabled",
                self.weight_sparsity_enabled.to_string(),
            ),
            (
                "weight_sparsity_rate",
                self.weight_sparsity_rate.to_string(),
            ),
            (
                "input_0_swizzling",
                format!("Swizzling.{}", self.input_swizzling),
            ),
            (
                "input_1_swizzling",
                format!("Swizzling.{}", self.weight_swizzling),
            ),
            (
                "output_0_swizzling",
                format!("Swizzling.{}", self.output_swizzling),
            ),
            ("output_write_tiles", self.output_write_tiles.to_string()),
            (
                "isi_strategy",
                format!("ISIStrategy.{}", self.isi_strategy),
            ),
        ]
    }
}

impl fmt::Display for DpuWorkload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_banner(f, &self.fields())
    }
}

/// Descriptor for one DMA data-movement workload.
///
/// Describes moving the pre-operation tensor from off-chip DRAM into CMX;
/// the source extents are reconstructed from the destination geometry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DmaWorkload {
    pub device: VpuDevice,
    /// Source extents as `[width, height, channels, batch]`.
    pub input_dimension: [u32; 4],
    /// Destination extents as `[width, height, channels, batch]`.
    pub output_dimension: [u32; 4],
    pub input_location: MemoryLocation,
    pub output_location: MemoryLocation,
    pub input_dtype: DataType,
    pub output_dtype: DataType,
}

impl DmaWorkload {
    /// Builds the data-movement descriptor.
    ///
    /// The user-supplied width/height are the destination (post-operation)
    /// extents; the source extents un-apply the kernel/padding/stride via
    /// [`infer_input_dims`]. Source and destination locations are fixed at
    /// DRAM and CMX.
    pub fn from_params(params: &OperationParameters) -> Result<Self, GeometryError> {
        let inferred = infer_input_dims(
            &[params.height, params.width],
            &[params.kernel, params.kernel],
            &[params.padding, params.padding],
            &[params.stride, params.stride],
        )?;
        let (input_height, input_width) = (inferred[0], inferred[1]);
        Ok(Self {
            device: params.device,
            input_dimension: [
                input_width,
                input_height,
                params.input_channels,
                params.batch,
            ],
            output_dimension: [
                params.width,
                params.height,
                params.output_channels,
                params.batch,
            ],
            input_location: MemoryLocation::Dram,
            output_location: MemoryLocation::Cmx,
            input_dtype: params.input_dtype,
            output_dtype: params.output_dtype,
        })
    }

    /// Serialized field list in estimator schema order.
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("device", format!("VPUDevice.{}", self.device)),
            ("input_dimension", format!("{:?}", self.input_dimension)),
            ("output_dimension", format!("{:?}", self.output_dimension)),
            (
                "input_location",
                format!("MemoryLocation.{}", self.input_location),
            ),
            (
                "output_location",
                format!("MemoryLocation.{}", self.output_location),
            ),
            ("input_dtype", format!("DataType.{}", self.input_dtype)),
            ("output_dtype", format!("DataType.{}", self.output_dtype)),
        ]
    }
}

impl fmt::Display for DmaWorkload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_banner(f, &self.fields())
    }
}

/// A fully-built descriptor, ready for exactly one estimator query.
#[derive(Clone, Debug, PartialEq)]
pub enum Workload {
    /// Compute workload.
    Dpu(DpuWorkload),
    /// Data-movement workload.
    Dma(DmaWorkload),
}

impl fmt::Display for Workload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dpu(wl) => wl.fmt(f),
            Self::Dma(wl) => wl.fmt(f),
        }
    }
}

fn write_banner(f: &mut fmt::Formatter<'_>, fields: &[(&'static str, String)]) -> fmt::Result {
    writeln!(f, "====================== Operation ======================")?;
    for (key, value) in fields {
        writeln!(f, "\t{key} = {value}")?;
    }
    write!(f, "=======================================================")
}
