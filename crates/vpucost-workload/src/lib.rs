//! Workload descriptors for VPU cost estimation.
//!
//! Translates the flat, user-supplied parameters of one hardware operation
//! into the typed descriptor shapes a cost estimator consumes: geometry
//! inference for data-movement workloads, execution-mode selection for
//! compute workloads, and the descriptor structs themselves.

mod device;
mod geometry;
mod mode;
mod types;
mod workload;

pub use device::VpuDevice;
pub use geometry::{infer_input_dims, output_dim, GeometryError};
pub use mode::select_execution_mode;
pub use types::{
    ActivationFunction, DataType, ExecutionMode, IsiStrategy, Layout, MemoryLocation, MpeMode,
    NthwNtk, Operation, ParseTagError, Swizzling,
};
pub use workload::{DmaWorkload, DpuWorkload, OperationParameters, Workload};
