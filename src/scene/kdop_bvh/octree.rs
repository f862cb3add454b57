use index_vec::IndexVec;

use crate::geometry::{WorldBox, WorldPoint};

use super::extents::Extents;
use super::{ExtentsIdx, NodeIdx};

/// A leaf keeps collecting Extents past this count only once the maximum
/// subdivision depth is reached.
const LEAF_CAPACITY: usize = 16;
const MAX_DEPTH: u32 = 16;

#[derive(Clone, Debug)]
pub(super) struct OctreeNode {
    pub(super) children: [Option<NodeIdx>; 8],
    /// Extents handles held by this node; non-empty only at leaves.
    pub(super) extents: Vec<ExtentsIdx>,
    /// Union of everything stored in this node's subtree, filled in by the
    /// bottom-up build pass.
    pub(super) aggregate: Extents,
    pub(super) is_leaf: bool,
}

impl OctreeNode {
    fn new_leaf() -> OctreeNode {
        OctreeNode {
            children: [None; 8],
            extents: Vec::new(),
            aggregate: Extents::new(),
            is_leaf: true,
        }
    }
}

/// Spatial index over Extents, built in two phases: recursive insertion
/// (splitting leaves by centroid octant) followed by a bottom-up aggregation
/// pass. Nodes live in a flat arena and are immutable after the build.
#[derive(Clone, Debug)]
pub struct Octree {
    pub(super) nodes: IndexVec<NodeIdx, OctreeNode>,
    pub(super) root: NodeIdx,
    bbox: WorldBox,
}

impl Octree {
    /// The root bounding box is a cube: the scene extents' axis slabs,
    /// centered on their midpoints and widened to the largest axis span, so
    /// that octant subdivision splits every axis at the same rate.
    pub fn new(scene_extents: &Extents) -> Octree {
        let span = (0..3)
            .map(|i| scene_extents.slabs[i][1] - scene_extents.slabs[i][0])
            .fold(0.0, f32::max);
        let centroid = scene_extents.centroid();
        let half = span / 2.0;
        let bbox = WorldBox::new(
            WorldPoint::new(centroid.x - half, centroid.y - half, centroid.z - half),
            WorldPoint::new(centroid.x + half, centroid.y + half, centroid.z + half),
        );

        let mut nodes = IndexVec::new();
        let root = nodes.push(OctreeNode::new_leaf());

        Octree { nodes, root, bbox }
    }

    pub fn insert(&mut self, idx: ExtentsIdx, all: &IndexVec<ExtentsIdx, Extents>) {
        let bbox = self.bbox.clone();
        self.insert_at(self.root, idx, &bbox, 0, all);
    }

    fn insert_at(
        &mut self,
        node: NodeIdx,
        idx: ExtentsIdx,
        bbox: &WorldBox,
        depth: u32,
        all: &IndexVec<ExtentsIdx, Extents>,
    ) {
        if self.nodes[node].is_leaf {
            if self.nodes[node].extents.len() < LEAF_CAPACITY || depth == MAX_DEPTH {
                self.nodes[node].extents.push(idx);
                return;
            }

            // Convert the leaf to an internal node and push everything it
            // held one level down before handling the new entry.
            self.nodes[node].is_leaf = false;
            let held = std::mem::take(&mut self.nodes[node].extents);
            for held_idx in held {
                self.insert_at(node, held_idx, bbox, depth, all);
            }
        }

        let center = bbox.center();
        let centroid = all[idx].centroid();
        let mut octant = 0;
        if centroid.x > center.x {
            octant |= 0b100;
        }
        if centroid.y > center.y {
            octant |= 0b010;
        }
        if centroid.z > center.z {
            octant |= 0b001;
        }

        let child = match self.nodes[node].children[octant] {
            Some(child) => child,
            None => {
                let child = self.nodes.push(OctreeNode::new_leaf());
                self.nodes[node].children[octant] = Some(child);
                child
            }
        };
        let child_box = octant_box(bbox, octant);
        self.insert_at(child, idx, &child_box, depth + 1, all);
    }

    /// Bottom-up aggregation: a leaf's aggregate is the union of the Extents
    /// it holds, an internal node's the union of its children's aggregates.
    pub fn build(&mut self, all: &IndexVec<ExtentsIdx, Extents>) {
        self.build_at(self.root, all);
    }

    fn build_at(&mut self, node: NodeIdx, all: &IndexVec<ExtentsIdx, Extents>) {
        let mut aggregate = Extents::new();
        if self.nodes[node].is_leaf {
            for &idx in &self.nodes[node].extents {
                aggregate.extend_by(&all[idx]);
            }
        } else {
            let children = self.nodes[node].children;
            for child in children.into_iter().flatten() {
                self.build_at(child, all);
                aggregate.extend_by(&self.nodes[child].aggregate);
            }
        }
        self.nodes[node].aggregate = aggregate;
    }

    pub(super) fn root_node(&self) -> &OctreeNode {
        &self.nodes[self.root]
    }
}

/// Bit 2 selects the x half, bit 1 the y half, bit 0 the z half.
fn octant_box(bbox: &WorldBox, octant: usize) -> WorldBox {
    let center = bbox.center();
    let pick = |bit_set: bool, min: f32, mid: f32, max: f32| {
        if bit_set { (mid, max) } else { (min, mid) }
    };
    let (min_x, max_x) = pick(octant & 0b100 != 0, bbox.min.x, center.x, bbox.max.x);
    let (min_y, max_y) = pick(octant & 0b010 != 0, bbox.min.y, center.y, bbox.max.y);
    let (min_z, max_z) = pick(octant & 0b001 != 0, bbox.min.z, center.z, bbox.max.z);
    WorldBox::new(
        WorldPoint::new(min_x, min_y, min_z),
        WorldPoint::new(max_x, max_y, max_z),
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use assert2::assert;

    fn point_extents(points: &[[f32; 3]]) -> IndexVec<ExtentsIdx, Extents> {
        points
            .iter()
            .map(|p| {
                let mut e = Extents::new();
                e.extend_by_point(&WorldPoint::new(p[0], p[1], p[2]));
                e
            })
            .collect()
    }

    #[test]
    fn single_entry_stays_in_root_leaf() {
        let all = point_extents(&[[0.5, 0.5, 0.5]]);
        let mut scene_extents = Extents::new();
        scene_extents.extend_by(&all[ExtentsIdx::from(0usize)]);

        let mut octree = Octree::new(&scene_extents);
        octree.insert(ExtentsIdx::from(0usize), &all);
        octree.build(&all);

        assert!(octree.root_node().is_leaf);
        assert!(octree.root_node().extents.len() == 1);
    }

    #[test]
    fn overflowing_leaf_splits_into_octants() {
        // 17 entries in one corner and one in the opposite corner: the root
        // splits and the two clusters land in different children.
        let mut points: Vec<[f32; 3]> = (0..17)
            .map(|i| [0.1 + (i as f32) * 0.001, 0.1, 0.1])
            .collect();
        points.push([0.9, 0.9, 0.9]);
        let all = point_extents(&points);

        let mut scene_extents = Extents::new();
        for e in &all {
            scene_extents.extend_by(e);
        }

        let mut octree = Octree::new(&scene_extents);
        for (idx, _) in all.iter_enumerated() {
            octree.insert(idx, &all);
        }
        octree.build(&all);

        let root = octree.root_node();
        assert!(!root.is_leaf);
        assert!(root.extents.is_empty());
        let occupied = root.children.iter().flatten().count();
        assert!(occupied == 2);
    }

    #[test]
    fn aggregate_covers_subtree() {
        let all = point_extents(&[
            [0.1, 0.1, 0.1],
            [0.9, 0.9, 0.9],
            [0.1, 0.9, 0.1],
            [0.9, 0.1, 0.9],
        ]);
        let mut scene_extents = Extents::new();
        for e in &all {
            scene_extents.extend_by(e);
        }

        let mut octree = Octree::new(&scene_extents);
        for (idx, _) in all.iter_enumerated() {
            octree.insert(idx, &all);
        }
        octree.build(&all);

        for e in &all {
            assert!(octree.root_node().aggregate.contains(e));
        }
    }
}
