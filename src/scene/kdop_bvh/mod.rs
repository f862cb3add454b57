mod extents;
mod octree;
mod statistics;
mod traversal;

pub use extents::{Extents, PLANE_COUNT, PLANE_SET_NORMALS, RaySlabs, SlabHit};
pub use octree::Octree;
pub use statistics::BvhStatistics;

use index_vec::IndexVec;

use super::Object;

// Handle of one object's Extents. Extents and objects share indices, which
// doubles as the Extents' back-reference to its owning object.
index_vec::define_index_type! {
    pub struct ExtentsIdx = u32;
}

index_vec::define_index_type! {
    pub struct NodeIdx = u32;
}

/// Acceleration structure over a scene's objects: one k-DOP Extents per
/// object, indexed by an octree. Built once after the scene is populated and
/// read-only afterwards.
#[derive(Clone, Debug)]
pub struct Bvh {
    extents: IndexVec<ExtentsIdx, Extents>,
    octree: Octree,
}

impl Bvh {
    pub fn build(objects: &[Object]) -> Bvh {
        let extents: IndexVec<ExtentsIdx, Extents> = objects
            .iter()
            .map(|object| Extents::from_primitives(&object.primitives))
            .collect();

        let mut scene_extents = Extents::new();
        for object_extents in &extents {
            scene_extents.extend_by(object_extents);
        }

        let mut octree = Octree::new(&scene_extents);
        for (idx, _) in extents.iter_enumerated() {
            octree.insert(idx, &extents);
        }
        octree.build(&extents);

        let bvh = Bvh { extents, octree };
        log::debug!("built acceleration structure: {}", bvh.statistics());
        bvh
    }
}
