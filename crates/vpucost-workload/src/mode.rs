//! Execution-mode selection.

use crate::device::VpuDevice;
use crate::types::{DataType, ExecutionMode, MpeMode, NthwNtk};

/// Selects the execution mode for a DPU workload.
///
/// Device generation is the primary branch: 2.7+ devices run one of the
/// cuboid modes keyed by the NTHW-NTK ratio, older devices pick among the
/// legacy modes from the input data type and MPE grid. The estimator only
/// attaches meaning to mode labels within their generation, so unmatched
/// combinations degrade to a fallback instead of failing.
pub fn select_execution_mode(
    device: VpuDevice,
    input_dtype: DataType,
    mpe_mode: MpeMode,
    nthw_ntk: NthwNtk,
) -> ExecutionMode {
    if device.uses_cuboid_modes() {
        match nthw_ntk {
            NthwNtk::Nthw4x16 => ExecutionMode::Cuboid4x16,
            NthwNtk::Nthw8x8 => ExecutionMode::Cuboid8x16,
            // 16x4 and any ratio the generation does not distinguish land on
            // the 16x16 cuboid.
            NthwNtk::Nthw16x4 => ExecutionMode::Cuboid16x16,
        }
    } else if input_dtype.is_float_family() {
        ExecutionMode::VectorFp16
    } else if mpe_mode == MpeMode::Mode4x4 {
        ExecutionMode::Matrix
    } else {
        ExecutionMode::Vector
    }
}
