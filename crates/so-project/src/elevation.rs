//! North-up elevation grid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use so_core::{ElevationSampler, Point, Real};

use crate::{ProjectError, ProjectResult};

/// Raster of elevations with a GDAL-style affine geotransform
/// `[x0, pixel_width, 0, y0, 0, -pixel_height]`.
///
/// The grid is assumed to share the stream network's frame.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ElevationGrid {
    pub transform: [f64; 6],
    pub rows: usize,
    pub cols: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodata: Option<f64>,
    /// Row-major, top row first.
    pub values: Vec<f64>,
}

impl ElevationGrid {
    pub fn new(
        transform: [f64; 6],
        rows: usize,
        cols: usize,
        values: Vec<f64>,
    ) -> ProjectResult<Self> {
        let grid = Self {
            transform,
            rows,
            cols,
            nodata: None,
            values,
        };
        grid.check()?;
        Ok(grid)
    }

    pub fn load(path: &Path) -> ProjectResult<Self> {
        let grid: ElevationGrid = crate::load_document(path)?;
        grid.check()?;
        Ok(grid)
    }

    fn check(&self) -> ProjectResult<()> {
        let invalid = |what: String| ProjectError::InvalidConfig { what };
        let [x0, width, rot_x, y0, rot_y, height] = self.transform;
        if rot_x != 0.0 || rot_y != 0.0 {
            return Err(invalid("elevation grid must be north-up".to_string()));
        }
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height < 0.0) {
            return Err(invalid(format!(
                "elevation grid pixel size ({width}, {height}) must be positive width and negative height"
            )));
        }
        if !(x0.is_finite() && y0.is_finite()) {
            return Err(invalid("elevation grid origin must be finite".to_string()));
        }
        let cells = self.rows.checked_mul(self.cols).ok_or_else(|| {
            invalid(format!(
                "elevation grid of {}x{} cells is too large",
                self.rows, self.cols
            ))
        })?;
        if self.values.len() != cells {
            return Err(invalid(format!(
                "elevation grid has {} values for {}x{} cells",
                self.values.len(),
                self.rows,
                self.cols
            )));
        }
        Ok(())
    }

    /// Pixel `(col, row)` containing `point`, if inside the grid.
    pub fn pixel_of(&self, point: Point) -> Option<(usize, usize)> {
        let [x0, width, _, y0, _, height] = self.transform;
        let col = ((point.x - x0) / width).floor();
        let row = ((point.y - y0) / height).floor();
        if !(col.is_finite() && row.is_finite()) || col < 0.0 || row < 0.0 {
            return None;
        }
        let (col, row) = (col as usize, row as usize);
        (col < self.cols && row < self.rows).then_some((col, row))
    }
}

impl ElevationSampler for ElevationGrid {
    fn elevation_at(&self, point: Point) -> Option<Real> {
        let (col, row) = self.pixel_of(point)?;
        let index = row.checked_mul(self.cols)?.checked_add(col)?;
        let value = *self.values.get(index)?;
        if !value.is_finite() || self.nodata.is_some_and(|nd| nd == value) {
            return None;
        }
        Some(value)
    }
}
