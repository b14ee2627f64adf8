use orientfield_grid::{PointCloud, UnstructuredGrid};

/// A value travelling between pipeline stages.
#[derive(Debug, Clone, PartialEq)]
pub enum DataObject {
    UnstructuredGrid(UnstructuredGrid),
    PointCloud(PointCloud),
}

impl DataObject {
    pub fn kind_name(&self) -> &'static str {
        match self {
            DataObject::UnstructuredGrid(_) => "unstructured grid",
            DataObject::PointCloud(_) => "point cloud",
        }
    }

    pub fn as_unstructured_grid(&self) -> Option<&UnstructuredGrid> {
        match self {
            DataObject::UnstructuredGrid(grid) => Some(grid),
            _ => None,
        }
    }

    pub fn into_unstructured_grid(self) -> Option<UnstructuredGrid> {
        match self {
            DataObject::UnstructuredGrid(grid) => Some(grid),
            _ => None,
        }
    }
}

impl From<UnstructuredGrid> for DataObject {
    fn from(grid: UnstructuredGrid) -> Self {
        DataObject::UnstructuredGrid(grid)
    }
}

impl From<PointCloud> for DataObject {
    fn from(cloud: PointCloud) -> Self {
        DataObject::PointCloud(cloud)
    }
}
