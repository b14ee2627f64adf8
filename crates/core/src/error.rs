use std::fmt;

use orientfield_grid::{AttributeError, GridError};

/// Structural failures, reported before any per-cell work starts. Numeric
/// degeneracies inside a neighborhood are never errors; they surface as NaN
/// tensor components.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    InvalidInputType {
        expected: &'static str,
        actual: &'static str,
    },
    InvalidArgument {
        name: &'static str,
        value: f64,
    },
    InvalidGrid(GridError),
    Attribute(AttributeError),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvalidInputType { expected, actual } => {
                write!(f, "invalid input type: expected {}, got {}", expected, actual)
            }
            FilterError::InvalidArgument { name, value } => {
                write!(f, "invalid argument: {} = {}", name, value)
            }
            FilterError::InvalidGrid(err) => write!(f, "invalid grid: {}", err),
            FilterError::Attribute(err) => write!(f, "attribute error: {}", err),
        }
    }
}

impl std::error::Error for FilterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FilterError::InvalidGrid(err) => Some(err),
            FilterError::Attribute(err) => Some(err),
            _ => None,
        }
    }
}

impl From<GridError> for FilterError {
    fn from(err: GridError) -> Self {
        FilterError::InvalidGrid(err)
    }
}

impl From<AttributeError> for FilterError {
    fn from(err: AttributeError) -> Self {
        FilterError::Attribute(err)
    }
}

/// Rejects negative, NaN and infinite search radii.
pub(crate) fn check_radius(radius: f64) -> Result<f64, FilterError> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(radius)
    } else {
        Err(FilterError::InvalidArgument {
            name: "radius",
            value: radius,
        })
    }
}
