//! Routing from parameters and target metric to one oracle entry point.

use std::fmt;
use std::str::FromStr;

use vpucost_workload::{
    DmaWorkload, DpuWorkload, GeometryError, OperationParameters, ParseTagError, Workload,
};

use crate::{CostModel, OracleError};

/// Which engine a query profiles.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum QueryMode {
    /// Compute (DPU) workload.
    Dpu,
    /// Data-movement (DMA) workload.
    Dma,
}

impl QueryMode {
    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dpu => "DPU",
            Self::Dma => "DMA",
        }
    }
}

impl fmt::Display for QueryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryMode {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("DPU") {
            Ok(Self::Dpu)
        } else if s.eq_ignore_ascii_case("DMA") {
            Ok(Self::Dma)
        } else {
            Err(ParseTagError::new("mode", s, "DPU, DMA"))
        }
    }
}

/// Which metric a query requests.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Target {
    /// Cycle count.
    Cycles,
    /// Activity factor (DPU) or bandwidth fraction (DMA).
    Power,
    /// MAC-array utilization; a compute-engine concept with no DMA
    /// counterpart.
    Utilization,
}

impl Target {
    /// Canonical tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cycles => "cycles",
            Self::Power => "power",
            Self::Utilization => "utilization",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Target {
    type Err = ParseTagError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("cycles") {
            Ok(Self::Cycles)
        } else if s.eq_ignore_ascii_case("power") {
            Ok(Self::Power)
        } else if s.eq_ignore_ascii_case("utilization") {
            Ok(Self::Utilization)
        } else {
            Err(ParseTagError::new("target", s, "cycles, power, utilization"))
        }
    }
}

/// A dispatch failure.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The workload geometry is inconsistent; detected before any oracle
    /// call is made.
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    /// The oracle rejected the query.
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

/// Builds the descriptor for `mode` from a parameter set.
///
/// The DPU path derives the execution mode; the DMA path reconstructs the
/// source extents and fails on inconsistent geometry before any oracle is
/// consulted.
pub fn build_workload(
    params: &OperationParameters,
    mode: QueryMode,
) -> Result<Workload, GeometryError> {
    match mode {
        QueryMode::Dpu => Ok(Workload::Dpu(DpuWorkload::from_params(params))),
        QueryMode::Dma => Ok(Workload::Dma(DmaWorkload::from_params(params)?)),
    }
}

/// Routes a built descriptor and target metric to exactly one oracle entry
/// point, returning the scalar unmodified.
///
/// DMA workloads have no utilization entry point; the power query answers
/// both non-cycle targets there.
pub fn query(model: &CostModel, workload: &Workload, target: Target) -> Result<f64, OracleError> {
    let oracle = model.oracle();
    match (workload, target) {
        (Workload::Dpu(wl), Target::Cycles) => oracle.compute_cycles(wl),
        (Workload::Dpu(wl), Target::Power) => oracle.compute_activity_factor(wl),
        (Workload::Dpu(wl), Target::Utilization) => oracle.compute_utilization(wl),
        (Workload::Dma(wl), Target::Cycles) => oracle.data_movement_cycles(wl),
        (Workload::Dma(wl), Target::Power | Target::Utilization) => {
            oracle.data_movement_power(wl)
        }
    }
}

/// Builds the descriptor for `(params, mode)` and runs one `target` query
/// against `model`.
pub fn run(
    model: &CostModel,
    params: &OperationParameters,
    mode: QueryMode,
    target: Target,
) -> Result<f64, QueryError> {
    let workload = build_workload(params, mode)?;
    Ok(query(model, &workload, target)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_and_target_parse() {
        assert_eq!("dpu".parse::<QueryMode>().unwrap(), QueryMode::Dpu);
        assert_eq!("DMA".parse::<QueryMode>().unwrap(), QueryMode::Dma);
        assert_eq!("CYCLES".parse::<Target>().unwrap(), Target::Cycles);
        assert!("watts".parse::<Target>().is_err());
    }

    #[test]
    fn build_selects_descriptor_shape() {
        let params = OperationParameters::default();
        assert!(matches!(
            build_workload(&params, QueryMode::Dpu),
            Ok(Workload::Dpu(_))
        ));
        assert!(matches!(
            build_workload(&params, QueryMode::Dma),
            Ok(Workload::Dma(_))
        ));
    }

    #[test]
    fn run_surfaces_geometry_failure() {
        let params = OperationParameters {
            width: 1,
            height: 1,
            padding: 2,
            ..Default::default()
        };
        let model = CostModel::fallback();
        let err = run(&model, &params, QueryMode::Dma, Target::Cycles).unwrap_err();
        assert!(matches!(err, QueryError::Geometry(_)));
    }
}
