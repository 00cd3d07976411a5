//! Terrain sampling seam used to orient braided segments.

use crate::geometry::Point;
use crate::numeric::Real;

/// Elevation lookup in the stream network's reference frame.
///
/// Implementations own any reprojection between the network frame and the
/// raster frame. `None` means no usable sample (outside coverage, nodata).
pub trait ElevationSampler {
    fn elevation_at(&self, point: Point) -> Option<Real>;
}

impl<F> ElevationSampler for F
where
    F: Fn(Point) -> Option<Real>,
{
    fn elevation_at(&self, point: Point) -> Option<Real> {
        self(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_samplers() {
        let plane = |p: Point| Some(100.0 - p.x);
        assert_eq!(plane.elevation_at(Point::new(10.0, 0.0)), Some(90.0));
    }
}
