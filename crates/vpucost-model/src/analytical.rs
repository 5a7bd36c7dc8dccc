//! Analytical fallback estimator.
//!
//! Coarse datapath arithmetic standing in when no trained estimator is
//! available: MAC counting against per-generation datapath widths for the
//! DPU, bandwidth plus fixed latency for the DMA, and a per-operation
//! power-factor table for activity estimates. The numbers are intentionally
//! lower-fidelity than a trained estimator; callers learn about the
//! substitution through [`CostModel::is_degraded`](crate::CostModel).

use vpucost_workload::{output_dim, DataType, DmaWorkload, DpuWorkload, Operation, VpuDevice};

use crate::{CostOracle, OracleError};

/// Fixed per-workload start overhead, in DPU cycles.
const SETUP_CYCLES: f64 = 64.0;

/// Datapath widths of one device generation.
struct DeviceProfile {
    macs_per_cycle: f64,
    dma_bytes_per_cycle: f64,
    dma_latency_cycles: f64,
}

fn profile(device: VpuDevice) -> DeviceProfile {
    match device {
        VpuDevice::Vpu2_0 | VpuDevice::Vpu2_1 => DeviceProfile {
            macs_per_cycle: 256.0,
            dma_bytes_per_cycle: 16.0,
            dma_latency_cycles: 56.0,
        },
        VpuDevice::Vpu2_7 => DeviceProfile {
            macs_per_cycle: 2048.0,
            dma_bytes_per_cycle: 32.0,
            dma_latency_cycles: 96.0,
        },
        VpuDevice::Vpu4_0 => DeviceProfile {
            macs_per_cycle: 4096.0,
            dma_bytes_per_cycle: 64.0,
            dma_latency_cycles: 128.0,
        },
    }
}

/// Built-in analytical cost estimator.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyticalModel;

impl AnalyticalModel {
    /// Creates the estimator.
    pub fn new() -> Self {
        Self
    }

    /// Ideal (pure MAC) cycle count, after sparsity discounts.
    fn ideal_cycles(&self, workload: &DpuWorkload) -> Result<f64, OracleError> {
        let dense = dense_macs(workload)? as f64;
        let mut effective = dense * (1.0 - clamp_rate(workload.input_sparsity_rate));
        if workload.weight_sparsity_enabled && has_weights(workload.operation) {
            effective *= 1.0 - clamp_rate(workload.weight_sparsity_rate);
        }
        Ok((effective / profile(workload.device).macs_per_cycle)
            .ceil()
            .max(1.0))
    }
}

impl CostOracle for AnalyticalModel {
    fn compute_cycles(&self, workload: &DpuWorkload) -> Result<f64, OracleError> {
        Ok(self.ideal_cycles(workload)? + SETUP_CYCLES)
    }

    fn compute_activity_factor(&self, workload: &DpuWorkload) -> Result<f64, OracleError> {
        let factor = power_factor(
            workload.device,
            workload.operation,
            workload.input_channels,
            workload.input_dtype,
        );
        Ok(factor * self.compute_utilization(workload)?)
    }

    fn compute_utilization(&self, workload: &DpuWorkload) -> Result<f64, OracleError> {
        let ideal = self.ideal_cycles(workload)?;
        Ok(ideal / (ideal + SETUP_CYCLES))
    }

    fn data_movement_cycles(&self, workload: &DmaWorkload) -> Result<f64, OracleError> {
        let profile = profile(workload.device);
        let bytes = transfer_bytes(workload)?;
        Ok(profile.dma_latency_cycles + (bytes / profile.dma_bytes_per_cycle).ceil())
    }

    fn data_movement_power(&self, workload: &DmaWorkload) -> Result<f64, OracleError> {
        // Achieved bandwidth as a fraction of peak.
        let profile = profile(workload.device);
        let bytes = transfer_bytes(workload)?;
        let cycles = self.data_movement_cycles(workload)?;
        Ok(bytes / (cycles * profile.dma_bytes_per_cycle))
    }
}

fn has_weights(operation: Operation) -> bool {
    matches!(
        operation,
        Operation::Convolution | Operation::CmConvolution | Operation::DwConvolution
    )
}

fn clamp_rate(rate: f32) -> f64 {
    f64::from(rate).clamp(0.0, 1.0)
}

/// Dense (no sparsity) MAC count of a compute workload.
fn dense_macs(workload: &DpuWorkload) -> Result<u128, OracleError> {
    for (name, value) in [
        ("input_0_width", workload.input_width),
        ("input_0_height", workload.input_height),
        ("input_0_channels", workload.input_channels),
        ("input_0_batch", workload.batch),
        ("output_0_channels", workload.output_channels),
    ] {
        if value == 0 {
            return Err(OracleError::MalformedWorkload(format!("{name} is zero")));
        }
    }

    let output_width = output_dim(
        workload.input_width,
        workload.kernel_width,
        workload.pad_left,
        workload.stride_width,
    );
    let output_height = output_dim(
        workload.input_height,
        workload.kernel_height,
        workload.pad_top,
        workload.stride_height,
    );
    let (ow, oh) = match (output_width, output_height) {
        (Some(ow), Some(oh)) if ow > 0 && oh > 0 => (ow, oh),
        _ => {
            return Err(OracleError::MalformedWorkload(format!(
                "kernel {}x{} stride {}x{} pad {}/{} yields no output for a {}x{} input",
                workload.kernel_height,
                workload.kernel_width,
                workload.stride_height,
                workload.stride_width,
                workload.pad_top,
                workload.pad_left,
                workload.input_height,
                workload.input_width,
            )))
        }
    };

    let spatial = u128::from(ow)
        * u128::from(oh)
        * u128::from(workload.output_channels)
        * u128::from(workload.batch);
    let window = u128::from(workload.kernel_height) * u128::from(workload.kernel_width);
    Ok(match workload.operation {
        Operation::Convolution | Operation::CmConvolution => {
            spatial * window * u128::from(workload.input_channels)
        }
        Operation::DwConvolution | Operation::Maxpool => spatial * window,
        Operation::Eltwise => spatial,
    })
}

/// Bytes a DMA transfer moves, taking the larger of the two endpoints.
fn transfer_bytes(workload: &DmaWorkload) -> Result<f64, OracleError> {
    let volume = |dims: [u32; 4], dtype: DataType, name: &str| -> Result<u128, OracleError> {
        if dims.contains(&0) {
            return Err(OracleError::MalformedWorkload(format!(
                "{name} contains a zero extent: {dims:?}"
            )));
        }
        Ok(dims.iter().map(|&d| u128::from(d)).product::<u128>()
            * u128::from(dtype.size_bytes()))
    };
    let input = volume(workload.input_dimension, workload.input_dtype, "input_dimension")?;
    let output = volume(
        workload.output_dimension,
        workload.output_dtype,
        "output_dimension",
    )?;
    Ok(input.max(output) as f64)
}

/// Relative power factor of an operation, interpolated over log2 of the
/// input channel count.
///
/// Factors come from silicon measurements taken at specific channel counts;
/// between entries the factor is interpolated linearly in log2 space and
/// outside the measured range it clamps to the nearest entry.
fn power_factor(device: VpuDevice, operation: Operation, input_channels: u32, dtype: DataType) -> f64 {
    // (log2 input channels, measured factor), ordered by channel count.
    const LEGACY_CONV: &[(f64, f64)] = &[
        (4.0, 0.87),
        (5.0, 0.92),
        (6.0, 1.0),
        (7.0, 0.95),
        (8.0, 0.86),
        (9.0, 0.87),
    ];
    const LEGACY_DW: &[(f64, f64)] = &[(6.0, 5.84)];
    const LEGACY_MAXPOOL: &[(f64, f64)] = &[(6.0, 5.29)];
    const LEGACY_ELTWISE: &[(f64, f64)] = &[(7.0, 232.71)];

    const GEN2_CONV: &[(f64, f64)] = &[
        (4.0, 1.97),
        (7.0, 1.20),
        (8.0, 1.08),
        (9.0, 1.07),
        (10.0, 1.01),
        (11.0, 0.97),
    ];
    const GEN2_DW: &[(f64, f64)] = &[(6.0, 1.43)];
    const GEN2_MAXPOOL: &[(f64, f64)] = &[(6.0, 1.15)];
    const GEN2_ELTWISE: &[(f64, f64)] = &[(8.0, 0.11)];

    let gen2 = device.uses_cuboid_modes();
    let table = match (gen2, operation) {
        (false, Operation::Convolution | Operation::CmConvolution) => LEGACY_CONV,
        (false, Operation::DwConvolution) => LEGACY_DW,
        (false, Operation::Maxpool) => LEGACY_MAXPOOL,
        (false, Operation::Eltwise) => LEGACY_ELTWISE,
        (true, Operation::Convolution | Operation::CmConvolution) => GEN2_CONV,
        (true, Operation::DwConvolution) => GEN2_DW,
        (true, Operation::Maxpool) => GEN2_MAXPOOL,
        (true, Operation::Eltwise) => GEN2_ELTWISE,
    };

    let value = interpolate(table, f64::from(input_channels.max(1)).log2());

    // Measured references: integer compute on legacy silicon, float compute
    // on 2.7+. The other family scales down.
    if !gen2 && dtype.is_float_family() {
        value * 0.87
    } else if gen2 && !dtype.is_float_family() {
        value * 0.79
    } else {
        value
    }
}

fn interpolate(table: &[(f64, f64)], at: f64) -> f64 {
    let (first, last) = (table[0], table[table.len() - 1]);
    if at <= first.0 {
        return first.1;
    }
    if at >= last.0 {
        return last.1;
    }
    for pair in table.windows(2) {
        let ((lo, lo_v), (hi, hi_v)) = (pair[0], pair[1]);
        if at <= hi {
            let t = (at - lo) / (hi - lo);
            return lo_v + t * (hi_v - lo_v);
        }
    }
    last.1
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpucost_workload::OperationParameters;

    fn dpu(params: &OperationParameters) -> DpuWorkload {
        DpuWorkload::from_params(params)
    }

    #[test]
    fn pointwise_conv_cycles() {
        // 56*56*64 outputs, 64 input channels: 12_845_056 MACs at 2048
        // MACs/cycle is exactly 6272 ideal cycles.
        let wl = dpu(&OperationParameters::default());
        let cycles = AnalyticalModel::new().compute_cycles(&wl).unwrap();
        assert_eq!(cycles, 6272.0 + SETUP_CYCLES);
    }

    #[test]
    fn utilization_is_ideal_over_estimated() {
        let wl = dpu(&OperationParameters::default());
        let model = AnalyticalModel::new();
        let util = model.compute_utilization(&wl).unwrap();
        assert!((util - 6272.0 / 6336.0).abs() < 1e-12);
        assert!(util > 0.0 && util < 1.0);
    }

    #[test]
    fn weight_sparsity_discounts_conv() {
        let model = AnalyticalModel::new();
        let dense = model
            .compute_cycles(&dpu(&OperationParameters::default()))
            .unwrap();
        let sparse = model
            .compute_cycles(&dpu(&OperationParameters {
                weight_sparsity_enabled: true,
                weight_sparsity: 0.5,
                ..Default::default()
            }))
            .unwrap();
        assert_eq!(sparse - SETUP_CYCLES, (dense - SETUP_CYCLES) / 2.0);
    }

    #[test]
    fn weight_sparsity_ignored_without_weights() {
        let model = AnalyticalModel::new();
        let base = OperationParameters {
            operation: Operation::Maxpool,
            kernel: 2,
            stride: 2,
            ..Default::default()
        };
        let dense = model.compute_cycles(&dpu(&base)).unwrap();
        let sparse = model
            .compute_cycles(&dpu(&OperationParameters {
                weight_sparsity_enabled: true,
                weight_sparsity: 0.9,
                ..base
            }))
            .unwrap();
        assert_eq!(dense, sparse);
    }

    #[test]
    fn oversized_kernel_is_malformed() {
        let wl = dpu(&OperationParameters {
            width: 2,
            height: 2,
            kernel: 5,
            ..Default::default()
        });
        assert!(matches!(
            AnalyticalModel::new().compute_cycles(&wl),
            Err(OracleError::MalformedWorkload(_))
        ));
    }

    #[test]
    fn zero_extent_is_malformed() {
        let wl = dpu(&OperationParameters {
            input_channels: 0,
            ..Default::default()
        });
        assert!(matches!(
            AnalyticalModel::new().compute_cycles(&wl),
            Err(OracleError::MalformedWorkload(_))
        ));
    }

    #[test]
    fn power_factor_at_measured_point() {
        // Legacy convolution at 64 input channels sits exactly on the
        // log2 = 6 entry.
        let factor = power_factor(
            VpuDevice::Vpu2_0,
            Operation::Convolution,
            64,
            DataType::Uint8,
        );
        assert!((factor - 1.0).abs() < 1e-12);
    }

    #[test]
    fn power_factor_interpolates_between_entries() {
        // 32 channels (log2 = 5) falls a third of the way from the
        // log2 = 4 entry (1.97) to the log2 = 7 entry (1.20).
        let factor = power_factor(
            VpuDevice::Vpu2_7,
            Operation::Convolution,
            32,
            DataType::Float16,
        );
        assert!((factor - (1.97 + (1.20 - 1.97) / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn power_factor_clamps_outside_range() {
        let factor = power_factor(
            VpuDevice::Vpu2_7,
            Operation::Convolution,
            8,
            DataType::Float16,
        );
        assert!((factor - 1.97).abs() < 1e-12);
    }

    #[test]
    fn power_factor_scales_by_compute_family() {
        let float = power_factor(
            VpuDevice::Vpu2_7,
            Operation::Convolution,
            128,
            DataType::Float16,
        );
        let int = power_factor(
            VpuDevice::Vpu2_7,
            Operation::Convolution,
            128,
            DataType::Uint8,
        );
        assert!((int - float * 0.79).abs() < 1e-12);
    }

    #[test]
    fn activity_factor_combines_factor_and_utilization() {
        let wl = dpu(&OperationParameters::default());
        let model = AnalyticalModel::new();
        let af = model.compute_activity_factor(&wl).unwrap();
        let util = model.compute_utilization(&wl).unwrap();
        let factor = power_factor(wl.device, wl.operation, wl.input_channels, wl.input_dtype);
        assert!((af - factor * util).abs() < 1e-12);
    }

    #[test]
    fn dma_cycles_latency_plus_bandwidth() {
        let wl = DmaWorkload::from_params(&OperationParameters::default()).unwrap();
        // 56*56*64 UINT8 elements in both directions: 200_704 bytes at 32
        // bytes/cycle plus 96 cycles of latency.
        let cycles = AnalyticalModel::new().data_movement_cycles(&wl).unwrap();
        assert_eq!(cycles, 96.0 + 6272.0);
    }

    #[test]
    fn dma_power_is_bandwidth_fraction() {
        let wl = DmaWorkload::from_params(&OperationParameters::default()).unwrap();
        let power = AnalyticalModel::new().data_movement_power(&wl).unwrap();
        assert!(power > 0.9 && power < 1.0);
    }

    #[test]
    fn wider_datapath_is_faster() {
        let old = dpu(&OperationParameters {
            device: VpuDevice::Vpu2_0,
            ..Default::default()
        });
        let new = dpu(&OperationParameters::default());
        let model = AnalyticalModel::new();
        assert!(model.compute_cycles(&old).unwrap() > model.compute_cycles(&new).unwrap());
    }
}
