pub mod structure_tensor;

use crate::data::DataObject;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PinType {
    UnstructuredGrid,
}

#[derive(Debug, Clone)]
pub struct PinDefinition {
    pub name: String,
    pub pin_type: PinType,
}

#[derive(Debug, Clone)]
pub struct NodeDefinition {
    pub name: String,
    pub category: String,
    pub inputs: Vec<PinDefinition>,
    pub outputs: Vec<PinDefinition>,
}

pub fn grid_in(name: &str) -> PinDefinition {
    PinDefinition {
        name: name.to_string(),
        pin_type: PinType::UnstructuredGrid,
    }
}

pub fn grid_out(name: &str) -> PinDefinition {
    PinDefinition {
        name: name.to_string(),
        pin_type: PinType::UnstructuredGrid,
    }
}

pub fn require_input<'a>(
    inputs: &'a [DataObject],
    index: usize,
    message: &str,
) -> Result<&'a DataObject, String> {
    inputs.get(index).ok_or_else(|| message.to_string())
}
