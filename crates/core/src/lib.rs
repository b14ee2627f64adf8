mod adapter;
mod assemble;
mod data;
mod error;
mod filter;
mod param_spec;
mod params;
mod parallel;
mod spatial;
mod tensor;

pub mod nodes;

pub use adapter::{derive_samples, Samples, Variant};
pub use assemble::{assemble_output, COUNT_ATTRIBUTE, TENSOR_ATTRIBUTE};
pub use data::DataObject;
pub use error::FilterError;
pub use filter::{
    compute_tensors, execute, execute_grid, FilterCacheStats, StructureTensorFilter,
    StructureTensorSettings, DEFAULT_RADIUS,
};
pub use param_spec::{ParamKind, ParamOption, ParamRange, ParamSpec, ParamWidget};
pub use params::{NodeParams, ParamValue};
pub use spatial::SpatialIndex;
pub use tensor::{accumulate, TensorSample};

pub use orientfield_grid as grid;
