use glam::{DMat3, DVec3};

/// Outcome of accumulating one neighborhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorSample {
    /// Raw neighbor count, zero-weight neighbors included.
    pub count: usize,
    /// Normalized weighted outer-product sum. All components are NaN when
    /// the neighborhood is empty.
    pub tensor: DMat3,
}

impl TensorSample {
    pub fn empty() -> Self {
        Self {
            count: 0,
            tensor: DMat3::from_cols_array(&[f64::NAN; 9]),
        }
    }

    /// Row-major 3x3 components.
    pub fn to_full(&self) -> [f64; 9] {
        // DMat3 stores columns.
        self.tensor.transpose().to_cols_array()
    }

    /// Packed symmetric components `[XX, YY, ZZ, XY, YZ, XZ]`.
    pub fn to_packed(&self) -> [f64; 6] {
        let m = &self.tensor;
        [
            m.x_axis.x,
            m.y_axis.y,
            m.z_axis.z,
            m.y_axis.x,
            m.z_axis.y,
            m.z_axis.x,
        ]
    }
}

/// Sums `w * u * u^T` over unit directions `u` from `center` to each
/// neighbor and divides by the total weight.
///
/// `epsilon` is added to every distance before normalizing. With
/// `epsilon == 0` a neighbor at the query position divides zero by zero and
/// the whole tensor turns NaN; with a positive epsilon that neighbor adds its
/// weight but no direction. A neighborhood whose weights sum to zero also
/// yields NaN. Neither case is an error.
pub fn accumulate<I>(center: DVec3, neighbors: I, epsilon: f64) -> TensorSample
where
    I: IntoIterator<Item = (DVec3, f64)>,
{
    let mut count = 0;
    let mut sum = DMat3::ZERO;
    let mut total_weight = 0.0;
    for (position, weight) in neighbors {
        let offset = position - center;
        let unit = offset / (offset.length() + epsilon);
        sum += outer(unit, unit) * weight;
        total_weight += weight;
        count += 1;
    }

    if count == 0 {
        return TensorSample::empty();
    }
    TensorSample {
        count,
        tensor: sum * (1.0 / total_weight),
    }
}

fn outer(a: DVec3, b: DVec3) -> DMat3 {
    DMat3::from_cols(a * b.x, a * b.y, a * b.z)
}
