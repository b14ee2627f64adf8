mod attributes;
mod cell;
mod geometry;
mod grid;

pub use attributes::{
    AttributeDomain, AttributeError, AttributeInfo, AttributeRef, AttributeStorage, AttributeType,
    GridAttributes,
};
pub use cell::CellType;
pub use geometry::{
    bounding_sphere, cell_bounding_sphere, cell_centers, cell_centroid, cell_volume, Sphere,
    VOLUME_ATTRIBUTE,
};
pub use grid::{GridError, PointCloud, UnstructuredGrid};
