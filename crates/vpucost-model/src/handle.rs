//! The cost-model resource handle.

use std::path::Path;

use crate::{AnalyticalModel, CostOracle};

/// Handle to the estimator answering cost queries.
///
/// Explicitly constructed and passed to the dispatch layer; there is no
/// process-wide instance. A handle either wraps an initialized trained
/// estimator or runs degraded on the built-in [`AnalyticalModel`], and
/// [`is_degraded`](Self::is_degraded) tells the two apart. Degradation is
/// advisory: queries against a degraded handle still succeed, at lower
/// fidelity.
#[derive(Debug)]
pub struct CostModel {
    trained: Option<Box<dyn CostOracle>>,
    fallback: AnalyticalModel,
}

impl CostModel {
    /// Wraps an initialized trained estimator.
    pub fn new(oracle: Box<dyn CostOracle>) -> Self {
        Self {
            trained: Some(oracle),
            fallback: AnalyticalModel::new(),
        }
    }

    /// A degraded handle backed only by the analytical estimator.
    pub fn fallback() -> Self {
        Self {
            trained: None,
            fallback: AnalyticalModel::new(),
        }
    }

    /// Initializes the estimator for a serialized model at `path`.
    ///
    /// Trained-estimator runtimes are external components wired in through
    /// [`CostModel::new`]; `load` covers the tool flow, where a missing or
    /// unusable file degrades to analytical estimates with a warning
    /// instead of failing the run.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.is_file() {
            log::warn!("cost model file {} does not exist", path.display());
        }
        log::warn!("cost model not initialized, using analytical estimates");
        Self::fallback()
    }

    /// Whether queries are answered by the analytical fallback rather than
    /// a trained estimator.
    pub fn is_degraded(&self) -> bool {
        self.trained.is_none()
    }

    /// The oracle answering this handle's queries.
    pub fn oracle(&self) -> &dyn CostOracle {
        match &self.trained {
            Some(oracle) => oracle.as_ref(),
            None => &self.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vpucost_workload::{DpuWorkload, OperationParameters};

    #[test]
    fn load_missing_file_degrades() {
        let model = CostModel::load("does/not/exist.vpunn");
        assert!(model.is_degraded());
    }

    #[test]
    fn degraded_handle_still_answers() {
        let model = CostModel::fallback();
        let wl = DpuWorkload::from_params(&OperationParameters::default());
        assert!(model.oracle().compute_cycles(&wl).unwrap() > 0.0);
    }

    #[test]
    fn wrapped_oracle_is_not_degraded() {
        let model = CostModel::new(Box::new(AnalyticalModel::new()));
        assert!(!model.is_degraded());
    }
}
