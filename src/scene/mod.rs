pub mod kdop_bvh;
mod material;
mod mesh;
mod primitives;
mod test_model;

pub use kdop_bvh::{Bvh, BvhStatistics};
pub use material::{Color, Material};
pub use mesh::MeshError;
pub use primitives::{Primitive, Shape, Sphere, Triangle, Vertex};
pub use test_model::cornell_box;

use assert2::assert;

use crate::geometry::{FloatType, Ray, WorldPoint};

/// An ownership group of primitives indexed as one unit by the acceleration
/// structure (e.g. all triangles of one wall, or one mesh).
#[derive(Clone, Debug)]
pub struct Object {
    pub primitives: Vec<Primitive>,
}

impl Object {
    pub fn new(primitives: Vec<Primitive>) -> Object {
        Object { primitives }
    }
}

/// Result of a nearest-hit query. Borrows the hit primitive from the scene;
/// absence of a hit is `None` at the query site.
#[derive(Copy, Clone, Debug)]
pub struct Intersection<'a> {
    pub position: WorldPoint,
    pub distance: FloatType,
    pub primitive: &'a Primitive,
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    objects: Vec<Object>,
    bvh: Option<Bvh>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }

    /// Objects may only be added before the acceleration structure is built.
    pub fn push_object(&mut self, object: Object) {
        assert!(self.bvh.is_none(), "scene is frozen once the BVH is built");
        self.objects.push(object);
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn build_bvh(&mut self) {
        log::info!(
            "building acceleration structure over {} objects",
            self.objects.len()
        );
        self.bvh = Some(Bvh::build(&self.objects));
    }

    pub fn bvh(&self) -> Option<&Bvh> {
        self.bvh.as_ref()
    }

    /// Nearest hit along the ray. Delegates to the BVH when one was built,
    /// otherwise tests every primitive of every object.
    pub fn intersect(&self, ray: &Ray) -> Option<Intersection<'_>> {
        match &self.bvh {
            Some(bvh) => bvh.intersect(&self.objects, ray),
            None => self.intersect_brute_force(ray),
        }
    }

    fn intersect_brute_force(&self, ray: &Ray) -> Option<Intersection<'_>> {
        let mut best: Option<(FloatType, &Primitive)> = None;
        for object in &self.objects {
            for primitive in &object.primitives {
                if let Some(distance) = primitive.intersect(ray) {
                    if best.is_none_or(|(best_distance, _)| distance < best_distance) {
                        best = Some((distance, primitive));
                    }
                }
            }
        }
        best.map(|(distance, primitive)| Intersection {
            position: ray.point_at(distance),
            distance,
            primitive,
        })
    }

    /// All emissive primitives, for direct-light sampling.
    pub fn lights(&self) -> impl Iterator<Item = &Primitive> {
        self.objects
            .iter()
            .flat_map(|object| &object.primitives)
            .filter(|primitive| primitive.is_light())
    }
}
