use std::sync::LazyLock;

use crate::geometry::{FloatType, Ray, WorldPoint, WorldVector};
use crate::scene::{Primitive, Shape};

pub const PLANE_COUNT: usize = 7;

/// Support-plane normals of the k-DOP: the three coordinate axes plus the
/// four diagonals of a regular tetrahedral arrangement.
pub static PLANE_SET_NORMALS: LazyLock<[WorldVector; PLANE_COUNT]> = LazyLock::new(|| {
    let d = FloatType::sqrt(3.0) / 3.0;
    [
        WorldVector::new(1.0, 0.0, 0.0),
        WorldVector::new(0.0, 1.0, 0.0),
        WorldVector::new(0.0, 0.0, 1.0),
        WorldVector::new(d, d, d),
        WorldVector::new(-d, d, d),
        WorldVector::new(-d, -d, d),
        WorldVector::new(d, -d, d),
    ]
});

/// k-DOP bounding volume: a (min, max) interval along each support-plane
/// normal. Built once per object and never shrunk afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Extents {
    pub slabs: [[FloatType; 2]; PLANE_COUNT],
}

/// Successful slab test: entry/exit distances along the ray and the index of
/// the plane pair that produced the entry point.
#[derive(Copy, Clone, Debug)]
pub struct SlabHit {
    pub t_near: FloatType,
    pub t_far: FloatType,
    pub plane: usize,
}

impl Extents {
    pub fn new() -> Extents {
        Extents {
            slabs: [[FloatType::INFINITY, FloatType::NEG_INFINITY]; PLANE_COUNT],
        }
    }

    pub fn from_primitives(primitives: &[Primitive]) -> Extents {
        let mut extents = Extents::new();
        for primitive in primitives {
            match &primitive.shape {
                Shape::Triangle(triangle) => {
                    extents.extend_by_point(&triangle.v0.position);
                    extents.extend_by_point(&triangle.v1.position);
                    extents.extend_by_point(&triangle.v2.position);
                }
                Shape::Sphere(sphere) => {
                    extents.extend_by_sphere(&sphere.center, sphere.radius);
                }
            }
        }
        extents
    }

    pub fn extend_by_point(&mut self, point: &WorldPoint) {
        for (slab, normal) in self.slabs.iter_mut().zip(PLANE_SET_NORMALS.iter()) {
            let d = normal.dot(&point.coords);
            slab[0] = slab[0].min(d);
            slab[1] = slab[1].max(d);
        }
    }

    /// The extreme points of a sphere along a unit normal are
    /// `center ± radius * normal`, which project to `d ± radius`.
    pub fn extend_by_sphere(&mut self, center: &WorldPoint, radius: FloatType) {
        for (slab, normal) in self.slabs.iter_mut().zip(PLANE_SET_NORMALS.iter()) {
            let d = normal.dot(&center.coords);
            slab[0] = slab[0].min(d - radius);
            slab[1] = slab[1].max(d + radius);
        }
    }

    /// Union with another Extents.
    pub fn extend_by(&mut self, other: &Extents) {
        for (slab, other_slab) in self.slabs.iter_mut().zip(other.slabs.iter()) {
            slab[0] = slab[0].min(other_slab[0]);
            slab[1] = slab[1].max(other_slab[1]);
        }
    }

    /// True when `other` lies inside this volume along every slab direction.
    pub fn contains(&self, other: &Extents) -> bool {
        self.slabs
            .iter()
            .zip(other.slabs.iter())
            .all(|(slab, other_slab)| slab[0] <= other_slab[0] && slab[1] >= other_slab[1])
    }

    /// Centroid from the midpoints of the three axis-aligned slabs.
    pub fn centroid(&self) -> WorldPoint {
        WorldPoint::new(
            (self.slabs[0][0] + self.slabs[0][1]) / 2.0,
            (self.slabs[1][0] + self.slabs[1][1]) / 2.0,
            (self.slabs[2][0] + self.slabs[2][1]) / 2.0,
        )
    }

    /// Slab test against a ray whose plane projections were precomputed once
    /// in `slabs`. Tightens a running `[t_near, t_far]` interval plane pair
    /// by plane pair and fails fast as soon as it inverts.
    pub fn intersect(&self, ray_slabs: &RaySlabs) -> Option<SlabHit> {
        let mut t_near = FloatType::NEG_INFINITY;
        let mut t_far = FloatType::INFINITY;
        let mut plane = 0;

        for i in 0..PLANE_COUNT {
            let mut tn = (self.slabs[i][0] - ray_slabs.numerator[i]) / ray_slabs.denominator[i];
            let mut tf = (self.slabs[i][1] - ray_slabs.numerator[i]) / ray_slabs.denominator[i];
            if ray_slabs.denominator[i] < 0.0 {
                std::mem::swap(&mut tn, &mut tf);
            }
            if tn > t_near {
                t_near = tn;
                plane = i;
            }
            if tf < t_far {
                t_far = tf;
            }
            if t_near > t_far {
                return None;
            }
        }

        Some(SlabHit {
            t_near,
            t_far,
            plane,
        })
    }
}

impl Default for Extents {
    fn default() -> Self {
        Extents::new()
    }
}

/// Per-ray plane projections, computed once and reused for every Extents
/// tested against the same ray: the numerators and denominators of the slab
/// test depend only on the ray, not on the volume being queried.
#[derive(Clone, Debug)]
pub struct RaySlabs {
    numerator: [FloatType; PLANE_COUNT],
    denominator: [FloatType; PLANE_COUNT],
}

impl RaySlabs {
    pub fn new(ray: &Ray) -> RaySlabs {
        let mut numerator = [0.0; PLANE_COUNT];
        let mut denominator = [0.0; PLANE_COUNT];
        for i in 0..PLANE_COUNT {
            numerator[i] = PLANE_SET_NORMALS[i].dot(&ray.origin.coords);
            denominator[i] = PLANE_SET_NORMALS[i].dot(&ray.direction);
        }
        RaySlabs {
            numerator,
            denominator,
        }
    }
}
