//! Planar coordinates of line endpoints and nodes.

use crate::numeric::Real;

/// A point in the stream network's projected reference frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: Real,
    pub y: Real,
}

impl Point {
    pub const fn new(x: Real, y: Real) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(self, other: Point) -> Real {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// True when `other` lies within `tolerance` (inclusive).
    ///
    /// Each axis is checked against the tolerance before the squared
    /// distance is computed, so far-apart pairs exit after one subtraction.
    pub fn within(self, other: Point, tolerance: Real) -> bool {
        let dx = (self.x - other.x).abs();
        if dx > tolerance {
            return false;
        }
        let dy = (self.y - other.y).abs();
        if dy > tolerance {
            return false;
        }
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

impl From<[Real; 2]> for Point {
    fn from(xy: [Real; 2]) -> Self {
        Self::new(xy[0], xy[1])
    }
}

impl From<Point> for [Real; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn within_is_inclusive() {
        let a = Point::new(0.0, 0.0);
        assert!(a.within(Point::new(3.0, 4.0), 5.0));
        assert!(!a.within(Point::new(3.0, 4.0), 4.99));
        assert!(a.within(a, 0.0));
    }

    #[test]
    fn axis_prefilter_does_not_admit_corners() {
        // Inside the square, outside the circle.
        let a = Point::new(0.0, 0.0);
        assert!(!a.within(Point::new(0.9, 0.9), 1.0));
    }

    proptest! {
        #[test]
        fn within_is_symmetric(
            ax in -1e3_f64..1e3, ay in -1e3_f64..1e3,
            bx in -1e3_f64..1e3, by in -1e3_f64..1e3,
            tol in 0.0_f64..50.0,
        ) {
            let a = Point::new(ax, ay);
            let b = Point::new(bx, by);
            prop_assert_eq!(a.within(b, tol), b.within(a, tol));
        }
    }
}
