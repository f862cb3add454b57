use assert2::assert;
use bon::bon;
use nalgebra::Unit;

use crate::geometry::{EPSILON, FloatType, Ray, ScreenPoint, ScreenSize, WorldPoint, WorldVector};

/// Pinhole camera generating one jittered primary ray per sample.
///
/// Image coordinates follow the usual raster convention: x grows to the
/// right, y grows downward.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    center: WorldPoint,
    resolution: ScreenSize,

    forward: Unit<WorldVector>,
    up: Unit<WorldVector>,
    right: Unit<WorldVector>,

    /// Distance from the pinhole to the image plane, in pixel units.
    focal_length: FloatType,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        center: WorldPoint,
        forward: WorldVector,
        up: WorldVector,
        resolution: ScreenSize,
        /// Focal length as a multiple of the image height (1.0 gives a
        /// vertical field of view of roughly 53 degrees).
        focal_length: FloatType,
    ) -> Self {
        let forward = Unit::try_new(forward, EPSILON).expect("Forward vector must be non-zero");
        let up = Unit::try_new(up, EPSILON).expect("Up vector must be non-zero");
        let right = Unit::try_new(forward.cross(&up), EPSILON)
            .expect("`up` and `forward` must be linearly independent");
        let up = Unit::new_normalize(right.cross(&forward));

        assert!(resolution.x > 0);
        assert!(resolution.y > 0);
        assert!(focal_length > 0.0);

        Camera {
            center,
            resolution,
            forward,
            up,
            right,
            focal_length: focal_length * (resolution.y as FloatType),
        }
    }
}

impl Camera {
    pub fn resolution(&self) -> ScreenSize {
        self.resolution
    }

    /// Samples a primary ray for the given pixel, jittered inside the pixel
    /// footprint.
    pub fn sample_ray(&self, point: &ScreenPoint, rng: &mut impl rand::Rng) -> Ray {
        let u = point.x as FloatType - (self.resolution.x as FloatType) / 2.0
            + rng.random_range(-0.5..=0.5);
        let v = point.y as FloatType - (self.resolution.y as FloatType) / 2.0
            + rng.random_range(-0.5..=0.5);

        let direction = self.right.as_ref() * u - self.up.as_ref() * v
            + self.forward.as_ref() * self.focal_length;

        Ray::new(self.center, direction)
    }
}
