use std::fmt;

use glam::DVec3;

use crate::attributes::{
    AttributeDomain, AttributeError, AttributeInfo, AttributeRef, AttributeStorage, AttributeType,
    GridAttributes,
};
use crate::cell::CellType;

#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    PointOutOfRange {
        cell: usize,
        point: u32,
        point_count: usize,
    },
    WrongPointCount {
        cell: usize,
        cell_type: CellType,
        actual: usize,
    },
    MalformedOffsets,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::PointOutOfRange {
                cell,
                point,
                point_count,
            } => write!(
                f,
                "cell {} references point {} but the grid has {} points",
                cell, point, point_count
            ),
            GridError::WrongPointCount {
                cell,
                cell_type,
                actual,
            } => write!(
                f,
                "cell {} of type {} has {} points",
                cell,
                cell_type.name(),
                actual
            ),
            GridError::MalformedOffsets => write!(f, "cell offsets do not match connectivity"),
        }
    }
}

impl std::error::Error for GridError {}

/// Cells of mixed type over a shared point array. Cell `i` uses
/// `connectivity[offsets[i]..offsets[i + 1]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnstructuredGrid {
    pub points: Vec<[f64; 3]>,
    pub cell_types: Vec<CellType>,
    pub offsets: Vec<usize>,
    pub connectivity: Vec<u32>,
    pub attributes: GridAttributes,
}

impl Default for UnstructuredGrid {
    fn default() -> Self {
        Self {
            points: Vec::new(),
            cell_types: Vec::new(),
            offsets: vec![0],
            connectivity: Vec::new(),
            attributes: GridAttributes::default(),
        }
    }
}

impl UnstructuredGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_points(points: Vec<[f64; 3]>) -> Self {
        Self {
            points,
            ..Self::default()
        }
    }

    /// Appends a cell and returns its index.
    pub fn push_cell(
        &mut self,
        cell_type: CellType,
        point_ids: &[u32],
    ) -> Result<usize, GridError> {
        let cell = self.cell_count();
        check_cell(cell, cell_type, point_ids, self.points.len())?;
        self.cell_types.push(cell_type);
        self.connectivity.extend_from_slice(point_ids);
        self.offsets.push(self.connectivity.len());
        Ok(cell)
    }

    pub fn cell_count(&self) -> usize {
        self.cell_types.len()
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn cell_type(&self, cell: usize) -> CellType {
        self.cell_types[cell]
    }

    pub fn cell_point_ids(&self, cell: usize) -> &[u32] {
        &self.connectivity[self.offsets[cell]..self.offsets[cell + 1]]
    }

    pub fn cell_positions(&self, cell: usize) -> Vec<DVec3> {
        self.cell_point_ids(cell)
            .iter()
            .map(|&id| DVec3::from(self.points[id as usize]))
            .collect()
    }

    /// Checks offsets and every cell's connectivity. Grids assembled through
    /// `push_cell` always pass; grids built field by field may not.
    pub fn validate(&self) -> Result<(), GridError> {
        if self.offsets.len() != self.cell_types.len() + 1
            || self.offsets.first() != Some(&0)
            || self.offsets.last() != Some(&self.connectivity.len())
            || self.offsets.windows(2).any(|pair| pair[0] > pair[1])
        {
            return Err(GridError::MalformedOffsets);
        }
        for (cell, cell_type) in self.cell_types.iter().enumerate() {
            check_cell(cell, *cell_type, self.cell_point_ids(cell), self.points.len())?;
        }
        Ok(())
    }

    pub fn attribute_domain_len(&self, domain: AttributeDomain) -> usize {
        match domain {
            AttributeDomain::Point => self.points.len(),
            AttributeDomain::Cell => self.cell_types.len(),
            AttributeDomain::Field => 1,
        }
    }

    pub fn list_attributes(&self) -> Vec<AttributeInfo> {
        let mut list = Vec::new();
        if !self.points.is_empty() {
            list.push(AttributeInfo {
                name: "P".to_string(),
                domain: AttributeDomain::Point,
                data_type: AttributeType::Vec3,
                len: self.points.len(),
                implicit: true,
            });
        }
        list.extend(self.attributes.list());
        list
    }

    pub fn attribute(&self, domain: AttributeDomain, name: &str) -> Option<AttributeRef<'_>> {
        match (name, domain) {
            ("P", AttributeDomain::Point) => Some(AttributeRef::Vec3(self.points.as_slice())),
            _ => self
                .attributes
                .get(domain, name)
                .map(AttributeStorage::as_ref),
        }
    }

    pub fn set_attribute(
        &mut self,
        domain: AttributeDomain,
        name: impl Into<String>,
        storage: AttributeStorage,
    ) -> Result<(), AttributeError> {
        let name = name.into();
        let expected_len = self.attribute_domain_len(domain);
        let actual_len = storage.len();
        if actual_len != expected_len {
            return Err(AttributeError::InvalidLength {
                expected: expected_len,
                actual: actual_len,
            });
        }

        match (name.as_str(), domain) {
            ("P", AttributeDomain::Point) => {
                if let AttributeStorage::Vec3(values) = storage {
                    self.points = values;
                    return Ok(());
                }
                return Err(AttributeError::InvalidType {
                    expected: AttributeType::Vec3,
                    actual: storage.data_type(),
                });
            }
            ("P", _) => return Err(AttributeError::InvalidDomain),
            _ => {}
        }

        self.attributes.insert(domain, name, storage);
        Ok(())
    }
}

fn check_cell(
    cell: usize,
    cell_type: CellType,
    point_ids: &[u32],
    point_count: usize,
) -> Result<(), GridError> {
    let count_ok = match cell_type.point_count() {
        Some(expected) => point_ids.len() == expected,
        None => point_ids.len() >= cell_type.min_point_count(),
    };
    if !count_ok {
        return Err(GridError::WrongPointCount {
            cell,
            cell_type,
            actual: point_ids.len(),
        });
    }
    if let Some(&point) = point_ids.iter().find(|&&id| id as usize >= point_count) {
        return Err(GridError::PointOutOfRange {
            cell,
            point,
            point_count,
        });
    }
    Ok(())
}

/// Free points with attributes, no cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub positions: Vec<[f64; 3]>,
    pub attributes: GridAttributes,
}

impl PointCloud {
    pub fn with_positions(positions: Vec<[f64; 3]>) -> Self {
        Self {
            positions,
            attributes: GridAttributes::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn attribute(&self, domain: AttributeDomain, name: &str) -> Option<AttributeRef<'_>> {
        match (name, domain) {
            ("P", AttributeDomain::Point) => Some(AttributeRef::Vec3(self.positions.as_slice())),
            _ => self
                .attributes
                .get(domain, name)
                .map(AttributeStorage::as_ref),
        }
    }

    pub fn set_attribute(
        &mut self,
        domain: AttributeDomain,
        name: impl Into<String>,
        storage: AttributeStorage,
    ) -> Result<(), AttributeError> {
        let expected_len = match domain {
            AttributeDomain::Point => self.positions.len(),
            AttributeDomain::Field => 1,
            AttributeDomain::Cell => return Err(AttributeError::InvalidDomain),
        };
        if storage.len() != expected_len {
            return Err(AttributeError::InvalidLength {
                expected: expected_len,
                actual: storage.len(),
            });
        }
        let name = name.into();
        if name == "P" {
            return Err(AttributeError::InvalidDomain);
        }
        self.attributes.insert(domain, name, storage);
        Ok(())
    }
}
