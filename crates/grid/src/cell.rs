/// Linear cell types. Point ordering and face tables follow the usual
/// unstructured-grid conventions (bottom face first, then top / apex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    Vertex,
    PolyVertex,
    Line,
    PolyLine,
    Triangle,
    Quad,
    Polygon,
    Tetra,
    Hexahedron,
    Wedge,
    Pyramid,
}

const TETRA_FACES: &[&[usize]] = &[&[0, 1, 3], &[1, 2, 3], &[2, 0, 3], &[0, 2, 1]];

const HEXAHEDRON_FACES: &[&[usize]] = &[
    &[0, 4, 7, 3],
    &[1, 2, 6, 5],
    &[0, 1, 5, 4],
    &[3, 7, 6, 2],
    &[0, 3, 2, 1],
    &[4, 5, 6, 7],
];

const WEDGE_FACES: &[&[usize]] = &[
    &[0, 1, 2],
    &[3, 5, 4],
    &[0, 3, 4, 1],
    &[1, 4, 5, 2],
    &[2, 5, 3, 0],
];

const PYRAMID_FACES: &[&[usize]] = &[
    &[0, 3, 2, 1],
    &[0, 1, 4],
    &[1, 2, 4],
    &[2, 3, 4],
    &[3, 0, 4],
];

impl CellType {
    pub fn dimension(self) -> u8 {
        match self {
            CellType::Vertex | CellType::PolyVertex => 0,
            CellType::Line | CellType::PolyLine => 1,
            CellType::Triangle | CellType::Quad | CellType::Polygon => 2,
            CellType::Tetra | CellType::Hexahedron | CellType::Wedge | CellType::Pyramid => 3,
        }
    }

    /// Exact number of points for fixed-size cells, `None` for poly cells.
    pub fn point_count(self) -> Option<usize> {
        match self {
            CellType::Vertex => Some(1),
            CellType::Line => Some(2),
            CellType::Triangle => Some(3),
            CellType::Quad => Some(4),
            CellType::Tetra => Some(4),
            CellType::Hexahedron => Some(8),
            CellType::Wedge => Some(6),
            CellType::Pyramid => Some(5),
            CellType::PolyVertex | CellType::PolyLine | CellType::Polygon => None,
        }
    }

    pub fn min_point_count(self) -> usize {
        match self {
            CellType::PolyVertex => 1,
            CellType::PolyLine => 2,
            CellType::Polygon => 3,
            fixed => fixed.point_count().unwrap_or(1),
        }
    }

    /// Boundary faces as local point indices. Empty for cells below 3D.
    pub fn faces(self) -> &'static [&'static [usize]] {
        match self {
            CellType::Tetra => TETRA_FACES,
            CellType::Hexahedron => HEXAHEDRON_FACES,
            CellType::Wedge => WEDGE_FACES,
            CellType::Pyramid => PYRAMID_FACES,
            _ => &[],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CellType::Vertex => "vertex",
            CellType::PolyVertex => "poly-vertex",
            CellType::Line => "line",
            CellType::PolyLine => "poly-line",
            CellType::Triangle => "triangle",
            CellType::Quad => "quad",
            CellType::Polygon => "polygon",
            CellType::Tetra => "tetra",
            CellType::Hexahedron => "hexahedron",
            CellType::Wedge => "wedge",
            CellType::Pyramid => "pyramid",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faces_only_for_volumetric_cells() {
        for cell_type in [
            CellType::Tetra,
            CellType::Hexahedron,
            CellType::Wedge,
            CellType::Pyramid,
        ] {
            assert_eq!(cell_type.dimension(), 3);
            let count = cell_type.point_count().unwrap();
            for face in cell_type.faces() {
                assert!(face.iter().all(|&idx| idx < count));
            }
        }
        assert!(CellType::Quad.faces().is_empty());
        assert!(CellType::Vertex.faces().is_empty());
    }

    #[test]
    fn hexahedron_faces_use_each_point_three_times() {
        let mut uses = [0; 8];
        for face in CellType::Hexahedron.faces() {
            for &idx in *face {
                uses[idx] += 1;
            }
        }
        assert_eq!(uses, [3; 8]);
    }
}
