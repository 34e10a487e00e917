use crate::error::InvalidGridError;
use crate::geom::Point2;

/// Row-major flat grid. No per-cell objects.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub w: usize,
    pub h: usize,
}

impl<T: Copy> Grid<T> {
    /// Wrap an existing row-major buffer. Fails when `data.len() != w * h`.
    pub fn from_vec(w: usize, h: usize, data: Vec<T>) -> Result<Self, InvalidGridError> {
        let expected = w
            .checked_mul(h)
            .ok_or(InvalidGridError::DimensionOverflow { nx: w, ny: h })?;
        if data.len() != expected {
            return Err(InvalidGridError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self { data, w, h })
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.w && y < self.h);
        y * self.w + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> T {
        self.data[self.idx(x, y)]
    }
}

/// Uniformly sampled 2D scalar field.
///
/// Grid point `(x, y)` sits at `origin + (x, y) * spacing` and its value lives
/// at `y * nx + x` in the flat array. Values are validated once on
/// construction, so extraction never sees NaN or a zero spacing.
#[derive(Clone, Debug, PartialEq)]
pub struct ScalarGrid {
    values: Grid<f64>,
    spacing: [f64; 2],
    origin: [f64; 2],
}

impl ScalarGrid {
    pub fn new(
        dimensions: [usize; 2],
        spacing: [f64; 2],
        origin: [f64; 2],
        values: Vec<f64>,
    ) -> Result<Self, InvalidGridError> {
        let [nx, ny] = dimensions;
        if nx == 0 || ny == 0 {
            return Err(InvalidGridError::ZeroDimension { nx, ny });
        }
        let [dx, dy] = spacing;
        if !dx.is_finite() || !dy.is_finite() || dx == 0.0 || dy == 0.0 {
            return Err(InvalidGridError::DegenerateSpacing { dx, dy });
        }
        let [ox, oy] = origin;
        if !ox.is_finite() || !oy.is_finite() {
            return Err(InvalidGridError::NonFiniteOrigin { ox, oy });
        }
        let values = Grid::from_vec(nx, ny, values)?;
        if let Some(index) = values.data.iter().position(|v| !v.is_finite()) {
            return Err(InvalidGridError::NonFiniteValue { index });
        }

        Ok(Self {
            values,
            spacing,
            origin,
        })
    }

    #[inline]
    pub fn nx(&self) -> usize {
        self.values.w
    }

    #[inline]
    pub fn ny(&self) -> usize {
        self.values.h
    }

    pub fn dimensions(&self) -> [usize; 2] {
        [self.values.w, self.values.h]
    }

    pub fn spacing(&self) -> [f64; 2] {
        self.spacing
    }

    pub fn origin(&self) -> [f64; 2] {
        self.origin
    }

    pub fn values(&self) -> &[f64] {
        &self.values.data
    }

    /// Number of cells, `(nx-1) * (ny-1)`; zero for single-row/column grids.
    pub fn cell_count(&self) -> usize {
        self.nx().saturating_sub(1) * self.ny().saturating_sub(1)
    }

    #[inline]
    pub fn value(&self, x: usize, y: usize) -> f64 {
        self.values.get(x, y)
    }

    /// Physical position of grid point `(x, y)`.
    #[inline]
    pub fn position(&self, x: usize, y: usize) -> Point2 {
        Point2::new(
            self.origin[0] + x as f64 * self.spacing[0],
            self.origin[1] + y as f64 * self.spacing[1],
        )
    }

    /// `(min, max)` over all scalar values.
    pub fn value_range(&self) -> (f64, f64) {
        self.values
            .data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}
