use std::cmp::Reverse;
use std::collections::BinaryHeap;

use arrayvec::ArrayVec;
use ordered_float::NotNan;

use crate::geometry::{FloatType, Ray};
use crate::scene::{Intersection, Object, Primitive};

use super::{Bvh, NodeIdx, RaySlabs};

/// Queue entry of the best-first search: a node and the most optimistic
/// distance at which its subtree could produce a hit. Wrapped in `Reverse`
/// on the heap so the smallest bound pops first.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct QueueEntry {
    bound: NotNan<FloatType>,
    node: NodeIdx,
}

impl Bvh {
    /// Nearest hit along the ray, or None.
    ///
    /// Explores spatially closer volumes first and prunes any subtree whose
    /// optimistic bound cannot beat an exact hit already found.
    pub fn intersect<'a>(&self, objects: &'a [Object], ray: &Ray) -> Option<Intersection<'a>> {
        let ray_slabs = RaySlabs::new(ray);

        let root_hit = self.octree.root_node().aggregate.intersect(&ray_slabs)?;
        if root_hit.t_far < 0.0 {
            return None;
        }

        // Nothing inside the scene volume can be hit beyond its exit point,
        // so the root's far distance is a safe initial pruning bound.
        let mut t_hit = root_hit.t_far;
        let mut best: Option<(FloatType, &Primitive)> = None;

        let mut queue = BinaryHeap::new();
        queue.push(Reverse(QueueEntry {
            bound: NotNan::new(0.0).expect("zero is not NaN"),
            node: self.octree.root,
        }));

        while let Some(Reverse(entry)) = queue.pop() {
            if entry.bound.into_inner() > t_hit {
                break;
            }

            let node = &self.octree.nodes[entry.node];
            if node.is_leaf {
                // The bound was only optimistic; test the held objects'
                // primitives exactly.
                for &extents_idx in &node.extents {
                    let object = &objects[usize::from(extents_idx)];
                    for primitive in &object.primitives {
                        if let Some(distance) = primitive.intersect(ray) {
                            if distance <= t_hit {
                                t_hit = distance;
                                best = Some((distance, primitive));
                            }
                        }
                    }
                }
            } else {
                let mut child_hits = ArrayVec::<QueueEntry, 8>::new();
                for &child_idx in node.children.iter().flatten() {
                    let child = &self.octree.nodes[child_idx];
                    let Some(hit) = child.aggregate.intersect(&ray_slabs) else {
                        continue;
                    };
                    if hit.t_far < 0.0 {
                        continue;
                    }
                    // When the near intersection lies behind the origin the
                    // ray starts inside the child's bound and anything in it
                    // may be arbitrarily close; the only valid optimistic
                    // bound is zero. Using the exit distance instead would
                    // let a sibling's exact hit prune this subtree while it
                    // still holds the nearest primitive.
                    let bound = hit.t_near.max(0.0);
                    if let Ok(bound) = NotNan::new(bound) {
                        child_hits.push(QueueEntry {
                            bound,
                            node: child_idx,
                        });
                    }
                }
                queue.extend(child_hits.into_iter().map(Reverse));
            }
        }

        best.map(|(distance, primitive)| Intersection {
            position: ray.point_at(distance),
            distance,
            primitive,
        })
    }
}
