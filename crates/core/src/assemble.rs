use orientfield_grid::{AttributeDomain, AttributeStorage, UnstructuredGrid};

use crate::adapter::Variant;
use crate::error::FilterError;
use crate::tensor::TensorSample;

pub const COUNT_ATTRIBUTE: &str = "N";
pub const TENSOR_ATTRIBUTE: &str = "Structure Tensor";

/// Copies `input` and appends the per-cell neighbor count and tensor fields.
/// Point-based output stores full row-major 3x3 tensors, volume-weighted
/// output the packed `[XX, YY, ZZ, XY, YZ, XZ]` form.
pub fn assemble_output(
    input: &UnstructuredGrid,
    variant: Variant,
    samples: &[TensorSample],
) -> Result<UnstructuredGrid, FilterError> {
    let mut output = input.clone();
    let counts = samples.iter().map(|sample| sample.count as f64).collect();
    let tensors = match variant {
        Variant::PointBased => {
            AttributeStorage::Tensor(samples.iter().map(TensorSample::to_full).collect())
        }
        Variant::VolumeWeighted => {
            AttributeStorage::SymTensor(samples.iter().map(TensorSample::to_packed).collect())
        }
    };
    output.set_attribute(AttributeDomain::Cell, COUNT_ATTRIBUTE, AttributeStorage::Float(counts))?;
    output.set_attribute(AttributeDomain::Cell, TENSOR_ATTRIBUTE, tensors)?;
    Ok(output)
}
