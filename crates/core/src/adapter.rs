use glam::DVec3;
use orientfield_grid::{
    cell_bounding_sphere, cell_centers, AttributeDomain, AttributeError, AttributeStorage,
    AttributeType, PointCloud, UnstructuredGrid, VOLUME_ATTRIBUTE,
};
use serde::{Deserialize, Serialize};

use crate::error::FilterError;

/// How cells are turned into query positions, indexed points and weights.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// Query from each cell's bounding-sphere center against the grid points,
    /// every neighbor weighted 1. Emits a full 3x3 tensor.
    #[default]
    PointBased,
    /// Query from each cell's volumetric centroid against all cell centroids,
    /// neighbors weighted by cell volume. Emits a packed symmetric tensor.
    VolumeWeighted,
}

impl Variant {
    /// Added to each neighbor distance before normalizing the direction.
    pub fn distance_epsilon(self) -> f64 {
        match self {
            Variant::PointBased => 0.0,
            Variant::VolumeWeighted => 1.0e-10,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Variant::PointBased => "Point Based",
            Variant::VolumeWeighted => "Volume Weighted",
        }
    }

    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Variant::PointBased),
            1 => Some(Variant::VolumeWeighted),
            _ => None,
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Variant::PointBased => 0,
            Variant::VolumeWeighted => 1,
        }
    }
}

/// Per-execution geometry derived from the input grid.
#[derive(Debug, Clone)]
pub struct Samples {
    /// One query position per cell.
    pub queries: Vec<DVec3>,
    /// Point set the spatial index is built over.
    pub points: Vec<[f64; 3]>,
    /// Per indexed point; `None` means uniform weight 1.
    pub weights: Option<Vec<f64>>,
}

impl Samples {
    pub fn weight(&self, point: usize) -> f64 {
        self.weights.as_ref().map_or(1.0, |weights| weights[point])
    }
}

pub fn derive_samples(variant: Variant, grid: &UnstructuredGrid) -> Result<Samples, FilterError> {
    match variant {
        Variant::PointBased => {
            let queries = (0..grid.cell_count())
                .map(|cell| cell_bounding_sphere(grid, cell).center)
                .collect();
            Ok(Samples {
                queries,
                points: grid.points.clone(),
                weights: None,
            })
        }
        Variant::VolumeWeighted => {
            let mut centers = cell_centers(grid);
            let volumes = take_volumes(&mut centers)?;
            Ok(Samples {
                queries: centers.positions.iter().map(|p| DVec3::from(*p)).collect(),
                points: centers.positions,
                weights: Some(volumes),
            })
        }
    }
}

/// Moves the per-cell volumes out of a cell-center cloud.
fn take_volumes(centers: &mut PointCloud) -> Result<Vec<f64>, AttributeError> {
    match centers.attributes.remove(AttributeDomain::Point, VOLUME_ATTRIBUTE) {
        Some(AttributeStorage::Float(volumes)) => Ok(volumes),
        Some(other) => Err(AttributeError::InvalidType {
            expected: AttributeType::Float,
            actual: other.data_type(),
        }),
        None => Err(AttributeError::Missing(VOLUME_ATTRIBUTE.to_string())),
    }
}
