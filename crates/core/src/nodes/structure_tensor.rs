use std::collections::BTreeMap;

use crate::adapter::Variant;
use crate::data::DataObject;
use crate::filter::{execute, StructureTensorSettings, DEFAULT_RADIUS};
use crate::nodes::{grid_in, grid_out, require_input, NodeDefinition};
use crate::param_spec::ParamSpec;
use crate::params::{NodeParams, ParamValue};

pub const NAME: &str = "Structure Tensor";

pub fn definition() -> NodeDefinition {
    NodeDefinition {
        name: NAME.to_string(),
        category: "Filters".to_string(),
        inputs: vec![grid_in("Cells")],
        outputs: vec![grid_out("out")],
    }
}

pub fn default_params() -> NodeParams {
    NodeParams {
        values: BTreeMap::from([
            ("radius".to_string(), ParamValue::Float(DEFAULT_RADIUS)),
            ("variant".to_string(), ParamValue::Int(Variant::PointBased.index())),
        ]),
    }
}

pub fn param_specs() -> Vec<ParamSpec> {
    vec![
        ParamSpec::float_at_least("radius", "Radius", 0.0)
            .with_help("Search radius around each cell."),
        ParamSpec::int_enum(
            "variant",
            "Weighting",
            vec![
                (Variant::PointBased.index(), Variant::PointBased.label()),
                (Variant::VolumeWeighted.index(), Variant::VolumeWeighted.label()),
            ],
        )
        .with_help("Uniform weights over grid points, or cell-volume weights over cell centroids."),
    ]
}

pub fn settings_from_params(params: &NodeParams) -> Result<StructureTensorSettings, String> {
    let index = params.get_int("variant", Variant::PointBased.index());
    let variant = Variant::from_index(index)
        .ok_or_else(|| format!("Structure Tensor: unknown weighting {}", index))?;
    Ok(StructureTensorSettings {
        radius: params.get_float("radius", DEFAULT_RADIUS),
        variant,
    })
}

pub fn compute(params: &NodeParams, inputs: &[DataObject]) -> Result<DataObject, String> {
    let input = require_input(inputs, 0, "Structure Tensor requires a cells input")?;
    let settings = settings_from_params(params)?;
    let output = execute(&settings, input).map_err(|err| format!("Structure Tensor: {}", err))?;
    Ok(DataObject::UnstructuredGrid(output))
}
