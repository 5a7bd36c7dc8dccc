#![warn(missing_docs)]
//! Cost estimation seam for VPU workloads.
//!
//! Defines the [`CostOracle`] trait every estimator implements, the
//! [`CostModel`] resource handle that owns one, the built-in
//! [`AnalyticalModel`] fallback, and the dispatch layer that routes a
//! parameter set and target metric to exactly one oracle entry point.

use std::fmt::Debug;

use vpucost_workload::{DmaWorkload, DpuWorkload};

mod analytical;
mod dispatch;
mod handle;

pub use analytical::AnalyticalModel;
pub use dispatch::{build_workload, query, run, QueryError, QueryMode, Target};
pub use handle::CostModel;

/// Errors surfaced by a cost oracle.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// The descriptor does not describe a realizable workload.
    #[error("malformed workload: {0}")]
    MalformedWorkload(String),
    /// The underlying estimator failed to produce a value.
    #[error("estimator failure: {0}")]
    Estimator(String),
}

/// An estimator answering cost queries for workload descriptors.
///
/// Trained estimators live behind external bindings; this crate ships the
/// [`AnalyticalModel`] fallback. Implementations must be safe for
/// concurrent read-only queries: every entry point takes `&self` and a
/// descriptor built fresh by the caller.
pub trait CostOracle: Debug + Send + Sync {
    /// Estimated DPU cycle count for a compute workload.
    fn compute_cycles(&self, workload: &DpuWorkload) -> Result<f64, OracleError>;

    /// Estimated DPU activity factor for a compute workload.
    fn compute_activity_factor(&self, workload: &DpuWorkload) -> Result<f64, OracleError>;

    /// Estimated MAC-array utilization for a compute workload, in `[0, 1]`.
    fn compute_utilization(&self, workload: &DpuWorkload) -> Result<f64, OracleError>;

    /// Estimated DMA cycle count for a data-movement workload.
    fn data_movement_cycles(&self, workload: &DmaWorkload) -> Result<f64, OracleError>;

    /// Estimated DMA power proxy for a data-movement workload.
    fn data_movement_power(&self, workload: &DmaWorkload) -> Result<f64, OracleError>;
}
