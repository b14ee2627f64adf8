use std::hash::{Hash, Hasher};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use orientfield_grid::UnstructuredGrid;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapter::{derive_samples, Variant};
use crate::assemble::assemble_output;
use crate::data::DataObject;
use crate::error::{check_radius, FilterError};
use crate::parallel::map_indexed;
use crate::spatial::SpatialIndex;
use crate::tensor::{accumulate, TensorSample};

pub const DEFAULT_RADIUS: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructureTensorSettings {
    pub radius: f64,
    pub variant: Variant,
}

impl Default for StructureTensorSettings {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            variant: Variant::default(),
        }
    }
}

/// Runs the filter on a host data object. Only unstructured grids are
/// accepted.
pub fn execute(
    settings: &StructureTensorSettings,
    input: &DataObject,
) -> Result<UnstructuredGrid, FilterError> {
    execute_grid(settings, require_grid(input)?)
}

fn require_grid(input: &DataObject) -> Result<&UnstructuredGrid, FilterError> {
    input
        .as_unstructured_grid()
        .ok_or(FilterError::InvalidInputType {
            expected: "unstructured grid",
            actual: input.kind_name(),
        })
}

/// Annotates every cell of `grid` with its neighbor count `"N"` and its
/// `"Structure Tensor"`. Pure: the same grid and settings always produce the
/// same output.
pub fn execute_grid(
    settings: &StructureTensorSettings,
    grid: &UnstructuredGrid,
) -> Result<UnstructuredGrid, FilterError> {
    let tensors = compute_tensors(settings, grid)?;
    assemble_output(grid, settings.variant, &tensors)
}

/// Per-cell neighbor counts and tensors in cell order, before they are
/// packed onto the output grid.
pub fn compute_tensors(
    settings: &StructureTensorSettings,
    grid: &UnstructuredGrid,
) -> Result<Vec<TensorSample>, FilterError> {
    let radius = check_radius(settings.radius)?;
    grid.validate()?;

    let start = Instant::now();
    let variant = settings.variant;
    let samples = derive_samples(variant, grid)?;
    let index = SpatialIndex::build(&samples.points);
    debug!(
        "structure tensor: {} cells, {} indexed points, radius {}, {}",
        grid.cell_count(),
        index.len(),
        radius,
        variant.label()
    );

    let epsilon = variant.distance_epsilon();
    let tensors = map_indexed(grid.cell_count(), |cell| {
        let center = samples.queries[cell];
        let neighbors = index.within_radius_unchecked(center, radius);
        accumulate(
            center,
            neighbors
                .into_iter()
                .map(|idx| (index.point(idx), samples.weight(idx))),
            epsilon,
        )
    });

    let empty = tensors.iter().filter(|sample| sample.count == 0).count();
    if empty > 0 {
        debug!(
            "structure tensor: {} of {} cells have no neighbors within {}",
            empty,
            tensors.len(),
            radius
        );
    }
    info!(
        "structure tensor: {} cells in {:.2} ms",
        tensors.len(),
        start.elapsed().as_secs_f32() * 1000.0
    );
    Ok(tensors)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCacheStats {
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug)]
struct CachedTensors {
    signature: u64,
    settings: StructureTensorSettings,
    tensors: Vec<TensorSample>,
}

/// Host-facing filter instance. Holds the configuration for its lifetime and
/// memoizes the last per-cell tensors against the input's geometry signature
/// and the settings they were computed with.
#[derive(Debug, Default)]
pub struct StructureTensorFilter {
    settings: StructureTensorSettings,
    modified: u64,
    cache: Option<CachedTensors>,
    pub stats: FilterCacheStats,
}

impl StructureTensorFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: StructureTensorSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &StructureTensorSettings {
        &self.settings
    }

    pub fn radius(&self) -> f64 {
        self.settings.radius
    }

    /// Bumped whenever a setter actually changes a value.
    pub fn modified(&self) -> u64 {
        self.modified
    }

    /// Returns `true` if the value changed and the filter is now dirty.
    pub fn set_radius(&mut self, radius: f64) -> bool {
        if self.settings.radius == radius {
            return false;
        }
        self.settings.radius = radius;
        self.mark_modified();
        true
    }

    pub fn set_variant(&mut self, variant: Variant) -> bool {
        if self.settings.variant == variant {
            return false;
        }
        self.settings.variant = variant;
        self.mark_modified();
        true
    }

    fn mark_modified(&mut self) {
        self.modified = self.modified.wrapping_add(1);
    }

    /// Recomputes the tensors only when the input geometry or the settings
    /// differ from the cached run. The output is always assembled onto the
    /// current input so its attributes are carried forward.
    pub fn update(&mut self, input: &DataObject) -> Result<UnstructuredGrid, FilterError> {
        let grid = require_grid(input)?;
        let signature = grid_signature(grid);
        if let Some(cached) = &self.cache {
            if cached.signature == signature && cached.settings == self.settings {
                self.stats.hits += 1;
                debug!("structure tensor: reusing cached tensors");
                return assemble_output(grid, self.settings.variant, &cached.tensors);
            }
        }

        let tensors = compute_tensors(&self.settings, grid)?;
        self.stats.misses += 1;
        let output = assemble_output(grid, self.settings.variant, &tensors)?;
        self.cache = Some(CachedTensors {
            signature,
            settings: self.settings,
            tensors,
        });
        Ok(output)
    }
}

/// Hash over points, cell types and connectivity. Attributes do not affect
/// the tensors.
fn grid_signature(grid: &UnstructuredGrid) -> u64 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    grid.points.len().hash(&mut hasher);
    for point in &grid.points {
        for value in point {
            value.to_bits().hash(&mut hasher);
        }
    }
    grid.cell_types.hash(&mut hasher);
    grid.offsets.hash(&mut hasher);
    grid.connectivity.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use glam::{DMat3, DVec3};
    use orientfield_grid::{AttributeDomain, AttributeRef, AttributeStorage, CellType, PointCloud};

    use super::*;
    use crate::assemble::{COUNT_ATTRIBUTE, TENSOR_ATTRIBUTE};

    fn vertex_cells(points: &[[f64; 3]]) -> UnstructuredGrid {
        let mut grid = UnstructuredGrid::with_points(points.to_vec());
        for idx in 0..points.len() {
            grid.push_cell(CellType::Vertex, &[idx as u32]).unwrap();
        }
        grid
    }

    /// Tetrahedra in a row along x; cell `i` spans x in [i, i + 1].
    fn tetra_strip(count: usize) -> UnstructuredGrid {
        let mut grid = UnstructuredGrid::new();
        for i in 0..count {
            let x = i as f64;
            let base = grid.points.len() as u32;
            grid.points.extend_from_slice(&[
                [x, 0.0, 0.0],
                [x + 1.0, 0.0, 0.0],
                [x, 1.0, 0.0],
                [x, 0.0, 1.0],
            ]);
            grid.push_cell(CellType::Tetra, &[base, base + 1, base + 2, base + 3])
                .unwrap();
        }
        grid
    }

    fn settings(radius: f64, variant: Variant) -> StructureTensorSettings {
        StructureTensorSettings { radius, variant }
    }

    fn counts(grid: &UnstructuredGrid) -> Vec<f64> {
        match grid.attribute(AttributeDomain::Cell, COUNT_ATTRIBUTE) {
            Some(AttributeRef::Float(values)) => values.to_vec(),
            other => panic!("unexpected count field {other:?}"),
        }
    }

    fn full_tensors(grid: &UnstructuredGrid) -> Vec<[f64; 9]> {
        match grid.attribute(AttributeDomain::Cell, TENSOR_ATTRIBUTE) {
            Some(AttributeRef::Tensor(values)) => values.to_vec(),
            other => panic!("unexpected tensor field {other:?}"),
        }
    }

    fn packed_tensors(grid: &UnstructuredGrid) -> Vec<[f64; 6]> {
        match grid.attribute(AttributeDomain::Cell, TENSOR_ATTRIBUTE) {
            Some(AttributeRef::SymTensor(values)) => values.to_vec(),
            other => panic!("unexpected tensor field {other:?}"),
        }
    }

    fn bits<const N: usize>(rows: &[[f64; N]]) -> Vec<u64> {
        rows.iter().flatten().map(|v| v.to_bits()).collect()
    }

    const CUBE_CORNERS: [[f64; 3]; 4] = [
        [0.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];

    #[test]
    fn default_settings() {
        let settings = StructureTensorSettings::default();
        assert_eq!(settings.radius, 1.0);
        assert_eq!(settings.variant, Variant::PointBased);
    }

    #[test]
    fn settings_load_from_partial_json() {
        let settings: StructureTensorSettings =
            serde_json::from_str(r#"{ "variant": "VolumeWeighted" }"#).unwrap();
        assert_eq!(settings.radius, DEFAULT_RADIUS);
        assert_eq!(settings.variant, Variant::VolumeWeighted);
    }

    #[test]
    fn cube_corners_see_each_other_and_themselves() {
        let grid = vertex_cells(&CUBE_CORNERS);
        let output = execute_grid(&settings(2.0, Variant::PointBased), &grid).unwrap();
        assert_eq!(counts(&output), vec![4.0; 4]);
        // Each vertex cell's own point sits at distance zero.
        for tensor in full_tensors(&output) {
            assert!(tensor.iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn zero_radius_without_coincident_points_is_empty() {
        let grid = tetra_strip(3);
        let output = execute_grid(&settings(0.0, Variant::PointBased), &grid).unwrap();
        assert_eq!(counts(&output), vec![0.0; 3]);
        assert!(full_tensors(&output)
            .iter()
            .all(|tensor| tensor.iter().all(|v| v.is_nan())));
    }

    #[test]
    fn single_vertex_cell_finds_itself() {
        let grid = vertex_cells(&[[0.5, 0.5, 0.5]]);
        for radius in [0.0, 1.0, 100.0] {
            let output = execute_grid(&settings(radius, Variant::PointBased), &grid).unwrap();
            assert_eq!(counts(&output), vec![1.0]);
            assert!(full_tensors(&output)[0].iter().all(|v| v.is_nan()));
        }
    }

    #[test]
    fn stacked_vertex_cells_count_each_other() {
        let mut points = vec![[1.0, 1.0, 1.0]; 200];
        points.push([5.0, 5.0, 5.0]);
        let grid = vertex_cells(&points);
        let output = execute_grid(&settings(0.0, Variant::PointBased), &grid).unwrap();
        let mut expected = vec![200.0; 200];
        expected.push(1.0);
        assert_eq!(counts(&output), expected);

        let output = execute_grid(&settings(0.0, Variant::VolumeWeighted), &grid).unwrap();
        assert_eq!(counts(&output), expected);
    }

    #[test]
    fn fibre_along_an_axis() {
        let points: Vec<[f64; 3]> = (0..100).map(|i| [i as f64, 0.0, 0.0]).collect();
        let mut grid = UnstructuredGrid::with_points(points);
        for i in 0..99u32 {
            grid.push_cell(CellType::Line, &[i, i + 1]).unwrap();
        }
        let output = execute_grid(&settings(1.0, Variant::PointBased), &grid).unwrap();
        // Each segment's sphere is centered at its midpoint and reaches both
        // of its end points only.
        assert_eq!(counts(&output), vec![2.0; 99]);
        for tensor in full_tensors(&output) {
            assert!((tensor[0] - 1.0).abs() < 1.0e-12);
            assert!(tensor[1..].iter().all(|v| v.abs() < 1.0e-12));
        }

        let vertices = vertex_cells(&grid.points);
        let output = execute_grid(&settings(1.0, Variant::PointBased), &vertices).unwrap();
        let found = counts(&output);
        assert_eq!((found[0], found[50], found[99]), (2.0, 3.0, 2.0));
    }

    #[test]
    fn point_based_tensors_are_symmetric_with_unit_trace() {
        let grid = tetra_strip(4);
        let output = execute_grid(&settings(1.5, Variant::PointBased), &grid).unwrap();
        assert_eq!(output.cell_count(), grid.cell_count());
        for (count, tensor) in counts(&output).iter().zip(full_tensors(&output)) {
            assert!(*count > 0.0);
            let m = DMat3::from_cols_array(&tensor);
            assert!(m.abs_diff_eq(m.transpose(), 1.0e-12));
            assert!((tensor[0] + tensor[4] + tensor[8] - 1.0).abs() < 1.0e-12);
        }
    }

    #[test]
    fn volume_weighted_guards_self_distance() {
        let grid = tetra_strip(3);
        let output = execute_grid(&settings(1.5, Variant::VolumeWeighted), &grid).unwrap();
        assert_eq!(counts(&output), vec![2.0, 3.0, 2.0]);
        let tensors = packed_tensors(&output);
        for tensor in &tensors {
            assert!(tensor.iter().all(|v| v.is_finite()));
        }
        // Equal volumes: the middle cell keeps 2/3 of the weight on the x axis
        // and the self term adds weight without direction.
        assert!((tensors[1][0] - 2.0 / 3.0).abs() < 1.0e-9);
        assert!((tensors[0][0] - 0.5).abs() < 1.0e-9);
        assert!(tensors[1][1].abs() < 1.0e-12);
    }

    #[test]
    fn zero_volume_neighborhood_is_nan() {
        let mut grid = UnstructuredGrid::with_points(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [10.0, 0.0, 0.0],
            [11.0, 0.0, 0.0],
            [10.0, 1.0, 0.0],
            [10.0, 0.0, 1.0],
        ]);
        grid.push_cell(CellType::Triangle, &[0, 1, 2]).unwrap();
        grid.push_cell(CellType::Line, &[0, 1]).unwrap();
        grid.push_cell(CellType::Tetra, &[3, 4, 5, 6]).unwrap();
        let output = execute_grid(&settings(1.0, Variant::VolumeWeighted), &grid).unwrap();
        assert_eq!(counts(&output), vec![2.0, 2.0, 1.0]);
        let tensors = packed_tensors(&output);
        assert!(tensors[0].iter().all(|v| v.is_nan()));
        assert!(tensors[1].iter().all(|v| v.is_nan()));
        // Only itself in range: weight but no direction.
        assert_eq!(tensors[2], [0.0; 6]);
    }

    #[test]
    fn counts_grow_with_radius() {
        let grid = tetra_strip(6);
        for variant in [Variant::PointBased, Variant::VolumeWeighted] {
            let mut previous = vec![0.0; grid.cell_count()];
            for radius in [0.0, 0.3, 0.8, 1.2, 2.5, 4.0, 10.0] {
                let output = execute_grid(&settings(radius, variant), &grid).unwrap();
                let current = counts(&output);
                for (before, after) in previous.iter().zip(&current) {
                    assert!(after >= before);
                }
                previous = current;
            }
        }
    }

    #[test]
    fn repeated_runs_are_bit_identical() {
        let grid = tetra_strip(400);
        for variant in [Variant::PointBased, Variant::VolumeWeighted] {
            let first = execute_grid(&settings(2.0, variant), &grid).unwrap();
            let second = execute_grid(&settings(2.0, variant), &grid).unwrap();
            assert_eq!(counts(&first), counts(&second));
            match variant {
                Variant::PointBased => {
                    assert_eq!(bits(&full_tensors(&first)), bits(&full_tensors(&second)))
                }
                Variant::VolumeWeighted => {
                    assert_eq!(bits(&packed_tensors(&first)), bits(&packed_tensors(&second)))
                }
            }
        }
    }

    #[test]
    fn parallel_run_matches_serial_accumulation() {
        let grid = tetra_strip(1500);
        let output = execute_grid(&settings(1.2, Variant::VolumeWeighted), &grid).unwrap();
        let tensors = packed_tensors(&output);
        let samples = derive_samples(Variant::VolumeWeighted, &grid).unwrap();
        for cell in [0, 700, 1499] {
            let center = samples.queries[cell];
            let neighbors = samples
                .points
                .iter()
                .enumerate()
                .filter(|(_, p)| DVec3::from(**p).distance(center) <= 1.2)
                .map(|(idx, p)| (DVec3::from(*p), samples.weight(idx)));
            let expected = accumulate(center, neighbors, 1.0e-10).to_packed();
            for (a, b) in expected.iter().zip(&tensors[cell]) {
                assert!((a - b).abs() < 1.0e-12);
            }
        }
    }

    #[test]
    fn empty_grid_produces_empty_fields() {
        let output = execute_grid(&settings(1.0, Variant::PointBased), &UnstructuredGrid::new())
            .unwrap();
        assert_eq!(output.cell_count(), 0);
        assert!(counts(&output).is_empty());
    }

    #[test]
    fn rejects_negative_radius_before_work() {
        let grid = vertex_cells(&CUBE_CORNERS);
        let err = execute_grid(&settings(-1.0, Variant::PointBased), &grid).unwrap_err();
        assert!(matches!(err, FilterError::InvalidArgument { name: "radius", .. }));
    }

    #[test]
    fn rejects_non_grid_input() {
        let input = DataObject::PointCloud(PointCloud::with_positions(vec![[0.0; 3]]));
        let err = execute(&StructureTensorSettings::default(), &input).unwrap_err();
        assert_eq!(
            err,
            FilterError::InvalidInputType {
                expected: "unstructured grid",
                actual: "point cloud"
            }
        );
    }

    #[test]
    fn rejects_malformed_grid() {
        let mut grid = vertex_cells(&CUBE_CORNERS);
        grid.connectivity[2] = 42;
        let err = execute_grid(&StructureTensorSettings::default(), &grid).unwrap_err();
        assert!(matches!(err, FilterError::InvalidGrid(_)));
    }

    #[test]
    fn set_radius_only_dirties_on_change() {
        let mut filter = StructureTensorFilter::new();
        assert_eq!(filter.radius(), 1.0);
        assert!(!filter.set_radius(1.0));
        assert_eq!(filter.modified(), 0);
        assert!(filter.set_radius(2.5));
        assert_eq!(filter.modified(), 1);
        assert!(!filter.set_radius(2.5));
        assert_eq!(filter.modified(), 1);
    }

    #[test]
    fn update_reuses_output_until_inputs_change() {
        let mut grid = vertex_cells(&CUBE_CORNERS);
        let mut filter = StructureTensorFilter::new();
        let first = filter.update(&DataObject::from(grid.clone())).unwrap();
        let again = filter.update(&DataObject::from(grid.clone())).unwrap();
        assert_eq!(filter.stats, FilterCacheStats { hits: 1, misses: 1 });
        assert_eq!(counts(&first), counts(&again));

        // Attribute edits reuse the tensors but still reach the output.
        grid.set_attribute(AttributeDomain::Cell, "id", AttributeStorage::Int(vec![0, 1, 2, 3]))
            .unwrap();
        let relabeled = filter.update(&DataObject::from(grid.clone())).unwrap();
        assert_eq!(filter.stats.hits, 2);
        assert!(relabeled.attribute(AttributeDomain::Cell, "id").is_some());

        grid.points[0] = [5.0, 5.0, 5.0];
        let moved = filter.update(&DataObject::from(grid.clone())).unwrap();
        assert_eq!(filter.stats.misses, 2);
        assert_eq!(counts(&moved)[0], 1.0);

        filter.set_radius(0.5);
        let shrunk = filter.update(&DataObject::from(grid)).unwrap();
        assert_eq!(filter.stats.misses, 3);
        assert_eq!(counts(&shrunk), vec![1.0; 4]);
    }
}
