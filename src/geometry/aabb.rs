use std::ops::{Add, Sub};

use nalgebra::{ClosedAddAssign, ClosedDivAssign, Point, Scalar};
use num_traits::One;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }

    pub fn with_size<S>(min: Point, size: &S) -> AABB<Point>
    where
        for<'a> &'a Point: Add<&'a S, Output = Point>,
    {
        let max = &min + size;
        AABB { min, max }
    }

    pub fn map<Point2, F: FnMut(&Point) -> Point2>(&self, mut f: F) -> AABB<Point2> {
        AABB {
            min: f(&self.min),
            max: f(&self.max),
        }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl<T: Scalar + Copy + Sub> AABB<nalgebra::Point2<T>> {
    pub fn width(&self) -> T::Output {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> T::Output {
        self.max[1] - self.min[1]
    }
}

impl<T: Scalar + ClosedAddAssign + ClosedDivAssign + One, const D: usize> AABB<Point<T, D>> {
    pub fn center(&self) -> Point<T, D> {
        let two = T::one() + T::one();
        let avg_coords = (&self.min.coords + &self.max.coords) / two;
        Point::from(avg_coords)
    }
}

impl<T: Scalar + Copy + PartialOrd, const D: usize> AABB<Point<T, D>> {
    /// Grows the box to cover `point`.
    pub fn extend(&mut self, point: &Point<T, D>) {
        for i in 0..D {
            if point[i] < self.min[i] {
                self.min[i] = point[i];
            }
            if point[i] > self.max[i] {
                self.max[i] = point[i];
            }
        }
    }

    pub fn contains(&self, point: &Point<T, D>) -> bool {
        (0..D).all(|i| self.min[i] <= point[i] && point[i] <= self.max[i])
    }
}

impl<Point> From<(Point, Point)> for AABB<Point> {
    fn from(value: (Point, Point)) -> Self {
        let (min, max) = value;
        AABB { min, max }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{WorldBox, WorldPoint};
    use assert2::assert;

    #[test]
    fn center_is_midpoint() {
        let b = WorldBox::new([0.0, 2.0, -4.0].into(), [2.0, 4.0, 0.0].into());
        assert!(b.center() == WorldPoint::new(1.0, 3.0, -2.0));
    }

    #[test]
    fn extend_grows_to_cover() {
        let mut b = WorldBox::new([0.0, 0.0, 0.0].into(), [1.0, 1.0, 1.0].into());
        b.extend(&[2.0, -1.0, 0.5].into());
        assert!(b.min == WorldPoint::new(0.0, -1.0, 0.0));
        assert!(b.max == WorldPoint::new(2.0, 1.0, 1.0));
        assert!(b.contains(&[2.0, -1.0, 0.5].into()));
    }

    #[test]
    fn with_size_from_origin() {
        let b = crate::geometry::ScreenBlock::with_size(
            crate::geometry::ScreenPoint::origin(),
            &crate::geometry::ScreenSize::new(4, 3),
        );
        assert!(b.width() == 4);
        assert!(b.height() == 3);
    }
}
