mod aabb;

pub use aabb::AABB;

pub type FloatType = f32;

/// Offset applied to ray origins to avoid self-intersection ("shadow acne").
pub const EPSILON: FloatType = 1e-4;

pub type ScreenPoint = nalgebra::Point2<u32>;
pub type ScreenSize = nalgebra::Vector2<u32>;
pub type ScreenBlock = AABB<ScreenPoint>;

pub type WorldPoint = nalgebra::Point3<FloatType>;
pub type WorldVector = nalgebra::Vector3<FloatType>;
pub type WorldBox = AABB<WorldPoint>;

#[derive(Copy, Clone, Debug)]
pub struct Ray {
    pub origin: WorldPoint,
    /// Normalized direction of the ray
    pub direction: WorldVector,
}

impl Ray {
    pub fn new(origin: WorldPoint, direction: WorldVector) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, distance: FloatType) -> WorldPoint {
        self.origin + self.direction * distance
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    #[test]
    fn ray_direction_is_normalized() {
        let ray = Ray::new([1.0, 2.0, 3.0].into(), [0.0, 3.0, 4.0].into());
        assert!((ray.direction.norm() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn point_at_walks_along_direction() {
        let ray = Ray::new([0.0, 0.0, 0.0].into(), [2.0, 0.0, 0.0].into());
        let p = ray.point_at(5.0);
        assert!((p - WorldPoint::new(5.0, 0.0, 0.0)).norm() < 1e-6);
    }
}
