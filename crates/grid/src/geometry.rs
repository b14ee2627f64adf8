use glam::{DMat3, DVec3};

use crate::attributes::{AttributeDomain, AttributeStorage};
use crate::grid::{PointCloud, UnstructuredGrid};

/// Above this many points the enclosing sphere is approximated.
const EXACT_SPHERE_MAX_POINTS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    pub center: DVec3,
    pub radius: f64,
}

impl Sphere {
    fn contains_all(&self, points: &[DVec3]) -> bool {
        let tolerance = 1.0e-9 * self.radius.max(1.0);
        points
            .iter()
            .all(|p| p.distance(self.center) <= self.radius + tolerance)
    }
}

/// Smallest sphere enclosing `points`. Exact for up to a dozen points by
/// testing every sphere supported by two, three or four of them; larger
/// point sets use Ritter's growing sphere. An empty slice gives a zero sphere
/// at the origin.
pub fn bounding_sphere(points: &[DVec3]) -> Sphere {
    match points.len() {
        0 => Sphere {
            center: DVec3::ZERO,
            radius: 0.0,
        },
        1 => Sphere {
            center: points[0],
            radius: 0.0,
        },
        2 => diametral_sphere(points[0], points[1]),
        n if n <= EXACT_SPHERE_MAX_POINTS => {
            exact_bounding_sphere(points).unwrap_or_else(|| ritter_sphere(points))
        }
        _ => ritter_sphere(points),
    }
}

fn diametral_sphere(a: DVec3, b: DVec3) -> Sphere {
    Sphere {
        center: (a + b) * 0.5,
        radius: a.distance(b) * 0.5,
    }
}

fn exact_bounding_sphere(points: &[DVec3]) -> Option<Sphere> {
    let n = points.len();
    let mut best: Option<Sphere> = None;
    let mut consider = |candidate: Sphere| {
        if best.is_some_and(|b| b.radius <= candidate.radius) {
            return;
        }
        if candidate.contains_all(points) {
            best = Some(candidate);
        }
    };

    for i in 0..n {
        for j in (i + 1)..n {
            consider(diametral_sphere(points[i], points[j]));
            for k in (j + 1)..n {
                if let Some(sphere) = circumsphere_triangle(points[i], points[j], points[k]) {
                    consider(sphere);
                }
                for l in (k + 1)..n {
                    if let Some(sphere) =
                        circumsphere_tetra(points[i], points[j], points[k], points[l])
                    {
                        consider(sphere);
                    }
                }
            }
        }
    }
    best
}

fn circumsphere_triangle(a: DVec3, b: DVec3, c: DVec3) -> Option<Sphere> {
    let ab = b - a;
    let ac = c - a;
    let normal = ab.cross(ac);
    let denom = 2.0 * normal.length_squared();
    if denom <= f64::EPSILON * ab.length_squared() * ac.length_squared() {
        return None;
    }
    let offset = (normal.cross(ab) * ac.length_squared() + ac.cross(normal) * ab.length_squared())
        / denom;
    Some(Sphere {
        center: a + offset,
        radius: offset.length(),
    })
}

fn circumsphere_tetra(a: DVec3, b: DVec3, c: DVec3, d: DVec3) -> Option<Sphere> {
    let rows = DMat3::from_cols(b - a, c - a, d - a).transpose();
    let det = rows.determinant();
    let scale = (b - a).length() * (c - a).length() * (d - a).length();
    if det.abs() <= 1.0e-12 * scale {
        return None;
    }
    let rhs = DVec3::new(
        (b - a).length_squared(),
        (c - a).length_squared(),
        (d - a).length_squared(),
    ) * 0.5;
    let offset = rows.inverse() * rhs;
    Some(Sphere {
        center: a + offset,
        radius: offset.length(),
    })
}

fn ritter_sphere(points: &[DVec3]) -> Sphere {
    let farthest_from = |origin: DVec3| {
        points
            .iter()
            .copied()
            .max_by(|a, b| a.distance_squared(origin).total_cmp(&b.distance_squared(origin)))
            .unwrap_or(origin)
    };
    let y = farthest_from(points[0]);
    let z = farthest_from(y);
    let mut sphere = diametral_sphere(y, z);
    for &p in points {
        let dist = p.distance(sphere.center);
        if dist > sphere.radius {
            let radius = (sphere.radius + dist) * 0.5;
            sphere.center += (p - sphere.center) * ((radius - sphere.radius) / dist);
            sphere.radius = radius;
        }
    }
    sphere
}

pub fn cell_bounding_sphere(grid: &UnstructuredGrid, cell: usize) -> Sphere {
    bounding_sphere(&grid.cell_positions(cell))
}

fn vertex_average(points: &[DVec3]) -> DVec3 {
    if points.is_empty() {
        return DVec3::ZERO;
    }
    points.iter().copied().sum::<DVec3>() / points.len() as f64
}

/// Volume and volume-weighted centroid of a 3D cell, from tetrahedra joining
/// the cell's vertex average to each fan triangle of each face. Cells below
/// 3D have zero volume and fall back to the vertex average.
fn volume_moments(grid: &UnstructuredGrid, cell: usize) -> (f64, DVec3) {
    let points = grid.cell_positions(cell);
    let center = vertex_average(&points);
    let cell_type = grid.cell_type(cell);
    if cell_type.dimension() < 3 {
        return (0.0, center);
    }

    let mut volume = 0.0;
    let mut moment = DVec3::ZERO;
    for face in cell_type.faces() {
        let corners: Vec<DVec3> = face.iter().map(|&idx| points[idx]).collect();
        let face_center = vertex_average(&corners);
        for (k, &a) in corners.iter().enumerate() {
            let b = corners[(k + 1) % corners.len()];
            let tet = ((a - center).cross(b - center).dot(face_center - center) / 6.0).abs();
            volume += tet;
            moment += (center + face_center + a + b) * (tet * 0.25);
        }
    }

    if volume > 0.0 {
        (volume, moment / volume)
    } else {
        (0.0, center)
    }
}

/// 3D size measure of a cell; zero for vertices, lines and faces.
pub fn cell_volume(grid: &UnstructuredGrid, cell: usize) -> f64 {
    volume_moments(grid, cell).0
}

pub fn cell_centroid(grid: &UnstructuredGrid, cell: usize) -> [f64; 3] {
    volume_moments(grid, cell).1.to_array()
}

pub const VOLUME_ATTRIBUTE: &str = "Volume";

/// One point per cell at its volumetric centroid, carrying the cell volume
/// as the `"Volume"` point attribute. Point `i` corresponds to cell `i`.
pub fn cell_centers(grid: &UnstructuredGrid) -> PointCloud {
    let (volumes, positions): (Vec<f64>, Vec<[f64; 3]>) = (0..grid.cell_count())
        .map(|cell| {
            let (volume, centroid) = volume_moments(grid, cell);
            (volume, centroid.to_array())
        })
        .unzip();
    let mut cloud = PointCloud::with_positions(positions);
    cloud.attributes.insert(
        AttributeDomain::Point,
        VOLUME_ATTRIBUTE.to_string(),
        AttributeStorage::Float(volumes),
    );
    cloud
}
