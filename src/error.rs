use core::fmt;
use std::io;

/// Inconsistent or unusable scalar grid.
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidGridError {
    SizeMismatch { expected: usize, actual: usize },
    ZeroDimension { nx: usize, ny: usize },
    DimensionOverflow { nx: usize, ny: usize },
    DegenerateSpacing { dx: f64, dy: f64 },
    NonFiniteOrigin { ox: f64, oy: f64 },
    NonFiniteValue { index: usize },
}

impl fmt::Display for InvalidGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SizeMismatch { expected, actual } => {
                write!(f, "value count mismatch: expected {expected}, got {actual}")
            }
            Self::ZeroDimension { nx, ny } => write!(f, "zero grid dimension: {nx}x{ny}"),
            Self::DimensionOverflow { nx, ny } => {
                write!(f, "grid dimensions overflow: {nx}x{ny}")
            }
            Self::DegenerateSpacing { dx, dy } => {
                write!(f, "degenerate grid spacing: ({dx}, {dy})")
            }
            Self::NonFiniteOrigin { ox, oy } => write!(f, "non-finite grid origin: ({ox}, {oy})"),
            Self::NonFiniteValue { index } => write!(f, "non-finite scalar value at index {index}"),
        }
    }
}

impl std::error::Error for InvalidGridError {}

/// No segment was produced for the isovalue.
///
/// Not a failure: extraction still returns an (empty) mesh. Callers that want
/// to treat it as one can propagate this value with `?`.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct EmptyResultError {
    pub isovalue: f64,
    pub min: f64,
    pub max: f64,
}

impl EmptyResultError {
    pub fn out_of_range(&self) -> bool {
        self.isovalue < self.min || self.isovalue > self.max
    }
}

impl fmt::Display for EmptyResultError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no contour segments for isovalue {} (data range [{}, {}])",
            self.isovalue, self.min, self.max
        )
    }
}

impl std::error::Error for EmptyResultError {}

#[derive(Debug)]
pub enum Error {
    InvalidGrid(InvalidGridError),
    InvalidIsovalue(f64),
    InvalidStitchTolerance(f64),
    PreviewTooLarge { nx: usize, ny: usize, scale: usize },
    Io(io::Error),
    Json(serde_json::Error),
    Image(image::ImageError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGrid(e) => write!(f, "invalid grid: {e}"),
            Self::InvalidIsovalue(v) => write!(f, "isovalue must be finite, got {v}"),
            Self::InvalidStitchTolerance(v) => {
                write!(f, "stitch tolerance must be finite and non-negative, got {v}")
            }
            Self::PreviewTooLarge { nx, ny, scale } => {
                write!(f, "preview of {nx}x{ny} grid at scale {scale} exceeds the pixel limit")
            }
            Self::Io(e) => write!(f, "i/o error: {e}"),
            Self::Json(e) => write!(f, "json error: {e}"),
            Self::Image(e) => write!(f, "image error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidGrid(e) => Some(e),
            Self::InvalidIsovalue(_)
            | Self::InvalidStitchTolerance(_)
            | Self::PreviewTooLarge { .. } => None,
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Image(e) => Some(e),
        }
    }
}

impl From<InvalidGridError> for Error {
    fn from(e: InvalidGridError) -> Self {
        Self::InvalidGrid(e)
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Self::Image(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_result_reports_range() {
        let e = EmptyResultError {
            isovalue: 12.0,
            min: 0.0,
            max: 10.0,
        };
        assert!(e.out_of_range());
        assert_eq!(
            e.to_string(),
            "no contour segments for isovalue 12 (data range [0, 10])"
        );

        let inside = EmptyResultError { isovalue: 5.0, ..e };
        assert!(!inside.out_of_range());
    }

    #[test]
    fn grid_error_converts() {
        let e: Error = InvalidGridError::ZeroDimension { nx: 0, ny: 1 }.into();
        assert_eq!(e.to_string(), "invalid grid: zero grid dimension: 0x1");
    }
}
