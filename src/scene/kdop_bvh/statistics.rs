use std::fmt::Display;

use crate::util::Stats;

use super::{Bvh, NodeIdx};

/// Shape report of a built acceleration structure.
pub struct BvhStatistics {
    pub objects: usize,
    pub nodes: usize,
    pub leaf_depth: Stats,
    pub leaf_fill: Stats,
    pub inner_child_count: Stats,
}

impl Bvh {
    pub fn statistics(&self) -> BvhStatistics {
        let mut stats = BvhStatistics {
            objects: self.extents.len(),
            nodes: self.octree.nodes.len(),
            leaf_depth: Stats::default(),
            leaf_fill: Stats::default(),
            inner_child_count: Stats::default(),
        };
        self.collect_statistics(self.octree.root, 0, &mut stats);
        stats
    }

    fn collect_statistics(&self, node: NodeIdx, depth: usize, stats: &mut BvhStatistics) {
        let node_ref = &self.octree.nodes[node];
        if node_ref.is_leaf {
            stats.leaf_depth.add_sample(depth);
            stats.leaf_fill.add_sample(node_ref.extents.len());
        } else {
            stats
                .inner_child_count
                .add_sample(node_ref.children.iter().flatten().count());
            for child in node_ref.children.iter().flatten() {
                self.collect_statistics(*child, depth + 1, stats);
            }
        }
    }
}

impl Display for BvhStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} objects in {} nodes; leaf depth {}; leaf fill {}; inner node children {}",
            self.objects, self.nodes, self.leaf_depth, self.leaf_fill, self.inner_child_count
        )
    }
}
