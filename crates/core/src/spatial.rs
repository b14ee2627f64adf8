use std::collections::HashMap;

use glam::DVec3;

use crate::error::{check_radius, FilterError};

type BucketKey = (i64, i64, i64);

/// Fixed-radius neighbor lookup over a point set that does not change after
/// construction. Points are hashed into a uniform grid of cubic buckets, so
/// coincident or collinear sets only make some buckets fuller. Queries take
/// `&self` and are safe to issue from several threads at once.
pub struct SpatialIndex {
    points: Vec<[f64; 3]>,
    inv_cell: f64,
    buckets: Vec<Vec<usize>>,
    keys: Vec<BucketKey>,
    lookup: HashMap<BucketKey, usize>,
    key_min: BucketKey,
    key_max: BucketKey,
}

impl SpatialIndex {
    pub fn build(points: &[[f64; 3]]) -> Self {
        let inv_cell = 1.0 / bucket_size(points);
        let mut buckets: Vec<Vec<usize>> = Vec::new();
        let mut keys = Vec::new();
        let mut lookup = HashMap::new();
        let mut key_min = (i64::MAX, i64::MAX, i64::MAX);
        let mut key_max = (i64::MIN, i64::MIN, i64::MIN);

        for (idx, p) in points.iter().enumerate() {
            let key = bucket_key(DVec3::from(*p), inv_cell);
            let slot = *lookup.entry(key).or_insert_with(|| {
                buckets.push(Vec::new());
                keys.push(key);
                buckets.len() - 1
            });
            buckets[slot].push(idx);
            key_min = (key_min.0.min(key.0), key_min.1.min(key.1), key_min.2.min(key.2));
            key_max = (key_max.0.max(key.0), key_max.1.max(key.1), key_max.2.max(key.2));
        }

        Self {
            points: points.to_vec(),
            inv_cell,
            buckets,
            keys,
            lookup,
            key_min,
            key_max,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn point(&self, index: usize) -> DVec3 {
        DVec3::from(self.points[index])
    }

    /// Indices of every point with `distance(point, center) <= radius`, in no
    /// particular order. A point coinciding with `center` is always included.
    pub fn within_radius(&self, center: DVec3, radius: f64) -> Result<Vec<usize>, FilterError> {
        let radius = check_radius(radius)?;
        Ok(self.within_radius_unchecked(center, radius))
    }

    /// Same as [`within_radius`](Self::within_radius) for a radius already
    /// validated by the caller.
    pub(crate) fn within_radius_unchecked(&self, center: DVec3, radius: f64) -> Vec<usize> {
        let mut found = Vec::new();
        if self.is_empty() {
            return found;
        }

        // One bucket of slack on each side absorbs rounding in the key
        // computation; every candidate is re-checked with the exact distance.
        let reach = DVec3::splat(radius);
        let lo = bucket_key(center - reach, self.inv_cell);
        let hi = bucket_key(center + reach, self.inv_cell);
        let lo = (
            lo.0.saturating_sub(1).max(self.key_min.0),
            lo.1.saturating_sub(1).max(self.key_min.1),
            lo.2.saturating_sub(1).max(self.key_min.2),
        );
        let hi = (
            hi.0.saturating_add(1).min(self.key_max.0),
            hi.1.saturating_add(1).min(self.key_max.1),
            hi.2.saturating_add(1).min(self.key_max.2),
        );
        if lo.0 > hi.0 || lo.1 > hi.1 || lo.2 > hi.2 {
            return found;
        }

        let mut visit = |bucket: &[usize]| {
            found.extend(
                bucket
                    .iter()
                    .copied()
                    .filter(|&idx| self.point(idx).distance(center) <= radius),
            );
        };

        if box_span(lo, hi) <= self.buckets.len() as u128 {
            for x in lo.0..=hi.0 {
                for y in lo.1..=hi.1 {
                    for z in lo.2..=hi.2 {
                        if let Some(&slot) = self.lookup.get(&(x, y, z)) {
                            visit(&self.buckets[slot]);
                        }
                    }
                }
            }
        } else {
            for (key, bucket) in self.keys.iter().zip(&self.buckets) {
                let inside = (lo.0..=hi.0).contains(&key.0)
                    && (lo.1..=hi.1).contains(&key.1)
                    && (lo.2..=hi.2).contains(&key.2);
                if inside {
                    visit(bucket);
                }
            }
        }
        found
    }
}

/// Bucket edge length aiming at a handful of points per occupied bucket.
/// Axes the points do not spread along are left out of the estimate.
fn bucket_size(points: &[[f64; 3]]) -> f64 {
    let mut min = DVec3::splat(f64::INFINITY);
    let mut max = DVec3::splat(f64::NEG_INFINITY);
    for p in points {
        let p = DVec3::from(*p);
        if p.is_finite() {
            min = min.min(p);
            max = max.max(p);
        }
    }

    let extent = max - min;
    let longest = extent.max_element();
    let dims = extent
        .to_array()
        .iter()
        .filter(|&&e| e > longest * 1.0e-6)
        .count()
        .max(1);
    let per_axis = (points.len() as f64).powf(1.0 / dims as f64).ceil().max(1.0);
    let size = longest / per_axis;
    if size.is_normal() {
        size
    } else {
        1.0
    }
}

fn bucket_key(p: DVec3, inv_cell: f64) -> BucketKey {
    let cell = (p * inv_cell).floor();
    (cell.x as i64, cell.y as i64, cell.z as i64)
}

fn box_span(lo: BucketKey, hi: BucketKey) -> u128 {
    let axis = |a: i64, b: i64| (b as i128 - a as i128 + 1) as u128;
    axis(lo.0, hi.0)
        .saturating_mul(axis(lo.1, hi.1))
        .saturating_mul(axis(lo.2, hi.2))
}
