//! Spatial geometry rules.
//!
//! Data-movement workloads describe the pre-operation tensor, whose spatial
//! extents the user does not supply directly. [`infer_input_dims`] reverses
//! the convolution output-size identity to reconstruct them, re-applying the
//! forward formula to confirm the inversion is exact. A wrong inferred size
//! would silently corrupt every downstream estimate, so any inconsistency is
//! a hard error.

/// An inconsistent kernel/padding/stride combination.
///
/// Carries the axis index and the values that failed so the diagnostic can
/// point at the exact flag combination.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GeometryError {
    /// Stride must be at least one.
    #[error(
        "axis {axis}: stride must be >= 1 \
         (output={output}, kernel={kernel}, padding={padding}, stride={stride})"
    )]
    InvalidStride {
        axis: usize,
        output: u32,
        kernel: u32,
        padding: u32,
        stride: u32,
    },

    /// Output extents must describe a real tensor.
    #[error("axis {axis}: output dimension must be >= 1")]
    InvalidOutput { axis: usize },

    /// The inversion produced a zero or negative input extent.
    #[error(
        "axis {axis}: inferred input dimension {inferred} is not positive \
         (output={output}, kernel={kernel}, padding={padding}, stride={stride})"
    )]
    NonPositiveInput {
        axis: usize,
        inferred: i128,
        output: u32,
        kernel: u32,
        padding: u32,
        stride: u32,
    },

    /// The inferred input extent does not fit a 32-bit dimension.
    #[error("axis {axis}: inferred input dimension {inferred} exceeds the representable range")]
    DimensionOverflow { axis: usize, inferred: i128 },

    /// Re-applying the forward output-size formula did not reproduce the
    /// requested output extent.
    #[error(
        "axis {axis}: output {output} does not round-trip \
         (input {inferred} re-derives {rederived}; \
         kernel={kernel}, padding={padding}, stride={stride})"
    )]
    RoundTripMismatch {
        axis: usize,
        output: u32,
        inferred: u32,
        rederived: i128,
        kernel: u32,
        padding: u32,
        stride: u32,
    },

    /// The per-axis parameter arrays are not parallel.
    #[error(
        "per-axis arrays differ in length \
         (outputs={outputs}, kernels={kernels}, paddings={paddings}, strides={strides})"
    )]
    AxisCountMismatch {
        outputs: usize,
        kernels: usize,
        paddings: usize,
        strides: usize,
    },
}

/// Forward convolution output size: `(i + 2p - k) / s + 1`.
///
/// Returns `None` when the stride is zero or the padded input is smaller
/// than the kernel.
pub fn output_dim(input: u32, kernel: u32, padding: u32, stride: u32) -> Option<u32> {
    if stride == 0 {
        return None;
    }
    let span = i128::from(input) + 2 * i128::from(padding) - i128::from(kernel);
    if span < 0 {
        return None;
    }
    u32::try_from(span / i128::from(stride) + 1).ok()
}

/// Infers per-axis input extents from output extents and the operation
/// geometry, inverting the output-size identity: `i = (o - 1) * s - 2p + k`.
///
/// The slices are parallel arrays, one entry per spatial axis, and the
/// result preserves their order. Each axis is checked independently; the
/// first inconsistent axis aborts the whole inference.
pub fn infer_input_dims(
    output: &[u32],
    kernel: &[u32],
    padding: &[u32],
    stride: &[u32],
) -> Result<Vec<u32>, GeometryError> {
    if output.len() != kernel.len() || output.len() != padding.len() || output.len() != stride.len()
    {
        return Err(GeometryError::AxisCountMismatch {
            outputs: output.len(),
            kernels: kernel.len(),
            paddings: padding.len(),
            strides: stride.len(),
        });
    }
    output
        .iter()
        .zip(kernel)
        .zip(padding)
        .zip(stride)
        .enumerate()
        .map(|(axis, (((&o, &k), &p), &s))| infer_axis(axis, o, k, p, s))
        .collect()
}

fn infer_axis(axis: usize, o: u32, k: u32, p: u32, s: u32) -> Result<u32, GeometryError> {
    if s < 1 {
        return Err(GeometryError::InvalidStride {
            axis,
            output: o,
            kernel: k,
            padding: p,
            stride: s,
        });
    }
    if o < 1 {
        return Err(GeometryError::InvalidOutput { axis });
    }

    let inferred =
        (i128::from(o) - 1) * i128::from(s) - 2 * i128::from(p) + i128::from(k);
    if inferred < 1 {
        return Err(GeometryError::NonPositiveInput {
            axis,
            inferred,
            output: o,
            kernel: k,
            padding: p,
            stride: s,
        });
    }
    let input =
        u32::try_from(inferred).map_err(|_| GeometryError::DimensionOverflow { axis, inferred })?;

    // Floor division makes the forward direction lossy, so the inversion is
    // only trusted once it reproduces the requested output exactly.
    let rederived =
        (i128::from(input) + 2 * i128::from(p) - i128::from(k)).div_euclid(i128::from(s)) + 1;
    if rederived != i128::from(o) {
        return Err(GeometryError::RoundTripMismatch {
            axis,
            output: o,
            inferred: input,
            rederived,
            kernel: k,
            padding: p,
            stride: s,
        });
    }

    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_kernel_is_identity() {
        assert_eq!(
            infer_input_dims(&[56, 56], &[1, 1], &[0, 0], &[1, 1]).unwrap(),
            vec![56, 56]
        );
    }

    #[test]
    fn three_by_three_unpadded() {
        // (4 - 1) * 1 - 0 + 3 = 6, and (6 + 0 - 3) / 1 + 1 = 4.
        assert_eq!(infer_input_dims(&[4], &[3], &[0], &[1]).unwrap(), vec![6]);
    }

    #[test]
    fn strided_conv() {
        // (28 - 1) * 2 - 2 + 3 = 55, and (55 + 2 - 3) / 2 + 1 = 28.
        assert_eq!(infer_input_dims(&[28], &[3], &[1], &[2]).unwrap(), vec![55]);
    }

    #[test]
    fn axis_order_is_preserved() {
        let dims = infer_input_dims(&[14, 28], &[3, 3], &[1, 1], &[2, 2]).unwrap();
        assert_eq!(dims, vec![27, 55]);
    }

    #[test]
    fn round_trip_law() {
        for o in 1..40u32 {
            for k in 1..8 {
                for p in 0..3 {
                    for s in 1..4 {
                        if let Ok(dims) = infer_input_dims(&[o], &[k], &[p], &[s]) {
                            assert_eq!(output_dim(dims[0], k, p, s), Some(o));
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn zero_stride_is_rejected() {
        assert!(matches!(
            infer_input_dims(&[4], &[3], &[0], &[0]),
            Err(GeometryError::InvalidStride { axis: 0, .. })
        ));
    }

    #[test]
    fn excess_padding_is_rejected() {
        // (1 - 1) * 1 - 4 + 1 = -3.
        let err = infer_input_dims(&[1], &[1], &[2], &[1]).unwrap_err();
        assert!(matches!(
            err,
            GeometryError::NonPositiveInput {
                axis: 0,
                inferred: -3,
                ..
            }
        ));
        let msg = err.to_string();
        assert!(msg.contains("axis 0"));
        assert!(msg.contains("padding=2"));
    }

    #[test]
    fn second_axis_reported() {
        let err = infer_input_dims(&[4, 1], &[3, 1], &[0, 2], &[1, 1]).unwrap_err();
        assert!(matches!(err, GeometryError::NonPositiveInput { axis: 1, .. }));
    }

    #[test]
    fn zero_output_is_rejected() {
        // An oversized kernel can make a zero output "round-trip" under
        // floor division; it must be refused up front.
        assert!(matches!(
            infer_input_dims(&[0], &[10], &[0], &[1]),
            Err(GeometryError::InvalidOutput { axis: 0 })
        ));
    }

    #[test]
    fn mismatched_arrays_rejected() {
        assert!(matches!(
            infer_input_dims(&[4, 4], &[3], &[0], &[1]),
            Err(GeometryError::AxisCountMismatch { .. })
        ));
    }

    #[test]
    fn forward_formula_edge_cases() {
        assert_eq!(output_dim(6, 3, 0, 1), Some(4));
        assert_eq!(output_dim(2, 5, 0, 1), None); // kernel larger than input
        assert_eq!(output_dim(6, 3, 0, 0), None); // zero stride
    }
}
