/// Invalid input to a vector or quaternion operation.
///
/// These are caller bugs rather than numeric edge cases; near-degenerate
/// geometry is handled by the operations themselves.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MathError {
    ZeroLength,
    LengthMismatch { left: usize, right: usize },
}

impl std::fmt::Display for MathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathError::ZeroLength => write!(f, "cannot normalize a zero-length vector"),
            MathError::LengthMismatch { left, right } => {
                write!(f, "vector length mismatch: {left} vs {right}")
            }
        }
    }
}

impl std::error::Error for MathError {}

/// A geographic coordinate outside its valid range.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeoError {
    LatitudeOutOfRange(f64),
    LongitudeOutOfRange(f64),
}

impl std::fmt::Display for GeoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoError::LatitudeOutOfRange(v) => {
                write!(f, "latitude {v} must be between -90 and 90 degrees")
            }
            GeoError::LongitudeOutOfRange(v) => {
                write!(f, "longitude {v} must be between -180 and 180 degrees")
            }
        }
    }
}

impl std::error::Error for GeoError {}
