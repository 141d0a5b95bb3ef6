//! Bounding volume hierarchy over a static triangle buffer
//!
//! The tree is built once per loaded mesh and never mutated afterwards; a
//! mesh reload builds a new [`Bvh`] and replaces the old one wholesale.
//! Nodes live in a flat arena and refer to their children by [`NodeId`], so
//! there are no back-pointers and no ownership cycles.
//!
//! Leaves do not own triangles. The builder keeps one permutation of the
//! triangle indices, sorted in place while partitioning, and every leaf is a
//! contiguous run of that permutation.
//!
//! Once built the tree is read-only and `Send + Sync`, so any number of
//! threads may query it without locking. Swapping in a rebuilt tree while
//! readers are active is the owner's job (e.g. publish it behind an `Arc`).

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::foundation::math::utils::argmax;
use crate::foundation::math::Vec3;
use crate::physics::collision::{Ray, RayHit, Triangle};
use super::aabb::AABB;
use super::mesh::TriangleMesh;

/// Tree construction limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BvhConfig {
    /// A node with this many triangles or fewer becomes a leaf
    pub max_leaf_triangles: usize,
    /// Nodes at this depth become leaves regardless of their size (root is 0)
    pub max_depth: usize,
}

impl BvhConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the leaf size threshold
    pub fn with_max_leaf_triangles(mut self, count: usize) -> Self {
        self.max_leaf_triangles = count;
        self
    }

    /// Set the depth cap
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_leaf_triangles == 0 {
            return Err(ConfigError::Invalid(
                "bvh.max_leaf_triangles must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn leaf_size(&self) -> usize {
        self.max_leaf_triangles.max(1)
    }
}

impl Default for BvhConfig {
    fn default() -> Self {
        Self {
            max_leaf_triangles: 4,
            max_depth: 20,
        }
    }
}

/// Handle of a node in a [`Bvh`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in [`Bvh::nodes`]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Single node in the hierarchy
#[derive(Debug, Clone, PartialEq)]
pub enum BvhNode {
    /// Two children; `bounds` is exactly the union of theirs
    Interior {
        /// Union of both children's bounds
        bounds: AABB,
        /// First child
        left: NodeId,
        /// Second child
        right: NodeId,
    },
    /// A run of the tree's triangle permutation; `bounds` is exactly the
    /// union of those triangles' bounds
    Leaf {
        /// Union of the leaf triangles' bounds
        bounds: AABB,
        /// Start of the run in the triangle permutation
        first: usize,
        /// Number of triangles in the run
        count: usize,
    },
}

impl BvhNode {
    /// Bounds of everything below this node
    pub fn bounds(&self) -> &AABB {
        match self {
            Self::Interior { bounds, .. } | Self::Leaf { bounds, .. } => bounds,
        }
    }

    /// Check if this node is a leaf (has no children)
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf { .. })
    }
}

/// Counters filled in by [`Bvh::intersect_ray_with_stats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes whose bounds were tested against the ray
    pub nodes_visited: usize,
    /// Visited nodes skipped because the ray missed their bounds
    pub nodes_pruned: usize,
    /// Ray-triangle tests performed in leaves
    pub triangle_tests: usize,
}

impl TraversalStats {
    /// Add another query's counters to these
    pub fn accumulate(&mut self, other: &TraversalStats) {
        self.nodes_visited += other.nodes_visited;
        self.nodes_pruned += other.nodes_pruned;
        self.triangle_tests += other.triangle_tests;
    }
}

/// Shape summary of a built tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BvhStats {
    /// Triangles in the buffer
    pub triangle_count: usize,
    /// Nodes in the arena
    pub node_count: usize,
    /// Leaf nodes in the arena
    pub leaf_count: usize,
    /// Depth of the deepest leaf (root is 0)
    pub max_depth: usize,
}

/// Bounding volume hierarchy over an owned triangle buffer
#[derive(Debug, Clone)]
pub struct Bvh {
    triangles: Vec<Triangle>,
    nodes: Vec<BvhNode>,
    triangle_order: Vec<usize>,
    root: Option<NodeId>,
    config: BvhConfig,
}

impl Bvh {
    /// Build a tree with the default limits
    pub fn build(triangles: Vec<Triangle>) -> Self {
        Self::build_with_config(triangles, BvhConfig::default())
    }

    /// Build a tree over `triangles`
    ///
    /// An empty buffer produces a tree without a root, which every query
    /// answers with "no hit".
    pub fn build_with_config(triangles: Vec<Triangle>, config: BvhConfig) -> Self {
        let mut builder = BvhBuilder::new(&triangles, config);
        let root = if triangles.is_empty() {
            None
        } else {
            Some(builder.build_node(0, triangles.len(), 0))
        };
        let BvhBuilder { nodes, order, .. } = builder;

        let bvh = Self {
            triangles,
            nodes,
            triangle_order: order,
            root,
            config,
        };

        if log::log_enabled!(log::Level::Debug) {
            let stats = bvh.stats();
            log::debug!(
                "Built BVH over {} triangles: {} nodes, {} leaves, depth {}",
                stats.triangle_count,
                stats.node_count,
                stats.leaf_count,
                stats.max_depth
            );
        }

        bvh
    }

    /// Build a tree over an ingested mesh
    pub fn from_mesh(mesh: TriangleMesh, config: BvhConfig) -> Self {
        Self::build_with_config(mesh.into_triangles(), config)
    }

    /// Build a fresh tree over the same triangle buffer
    pub fn rebuild(&self, config: BvhConfig) -> Self {
        Self::build_with_config(self.triangles.clone(), config)
    }

    /// Limits this tree was built with
    pub fn config(&self) -> BvhConfig {
        self.config
    }

    /// Root handle, `None` for an empty tree
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// True when the tree has no triangles
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// All nodes, indexed by [`NodeId::index`]
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    /// Node behind a handle produced by this tree
    ///
    /// # Panics
    ///
    /// Panics if `id` came from a different tree with more nodes. Use
    /// [`Bvh::get_node`] for handles of unknown origin.
    pub fn node(&self, id: NodeId) -> &BvhNode {
        &self.nodes[id.0]
    }

    /// Node behind a handle, `None` when it is out of range for this tree
    pub fn get_node(&self, id: NodeId) -> Option<&BvhNode> {
        self.nodes.get(id.0)
    }

    /// The triangle buffer, in the order it was supplied
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Triangle by buffer index
    pub fn triangle(&self, index: usize) -> Option<&Triangle> {
        self.triangles.get(index)
    }

    /// Bounds of the whole tree, the empty box when there is no root
    pub fn bounds(&self) -> AABB {
        self.root
            .map_or_else(AABB::empty, |root| *self.node(root).bounds())
    }

    /// Triangle buffer indices stored in a leaf, empty for interior nodes
    pub fn leaf_triangles(&self, id: NodeId) -> &[usize] {
        match *self.node(id) {
            BvhNode::Leaf { first, count, .. } => &self.triangle_order[first..first + count],
            BvhNode::Interior { .. } => &[],
        }
    }

    /// Triangle indices of every leaf, depth first, first child before second
    ///
    /// Each input triangle appears exactly once.
    pub fn leaf_triangle_indices(&self) -> Vec<usize> {
        let mut indices = Vec::with_capacity(self.triangles.len());
        if let Some(root) = self.root {
            self.collect_leaf_indices(root, &mut indices);
        }
        indices
    }

    fn collect_leaf_indices(&self, id: NodeId, indices: &mut Vec<usize>) {
        match *self.node(id) {
            BvhNode::Leaf { .. } => indices.extend_from_slice(self.leaf_triangles(id)),
            BvhNode::Interior { left, right, .. } => {
                self.collect_leaf_indices(left, indices);
                self.collect_leaf_indices(right, indices);
            }
        }
    }

    /// Shape summary of the tree
    pub fn stats(&self) -> BvhStats {
        let mut stats = BvhStats {
            triangle_count: self.triangles.len(),
            node_count: self.nodes.len(),
            ..BvhStats::default()
        };
        if let Some(root) = self.root {
            self.collect_stats(root, 0, &mut stats);
        }
        stats
    }

    fn collect_stats(&self, id: NodeId, depth: usize, stats: &mut BvhStats) {
        match *self.node(id) {
            BvhNode::Leaf { .. } => {
                stats.leaf_count += 1;
                stats.max_depth = stats.max_depth.max(depth);
            }
            BvhNode::Interior { left, right, .. } => {
                self.collect_stats(left, depth + 1, stats);
                self.collect_stats(right, depth + 1, stats);
            }
        }
    }

    /// Nearest triangle hit along `ray`, if any
    ///
    /// Subtrees whose bounds the ray misses are skipped without touching
    /// their triangles. The bounds test is conservative, so pruning never
    /// drops an edge or vertex hit the triangle test would accept. Equal
    /// distances resolve to the lower triangle index.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<RayHit> {
        let mut stats = TraversalStats::default();
        self.intersect_ray_with_stats(ray, &mut stats)
    }

    /// [`Bvh::intersect_ray`], adding the work done to `stats`
    pub fn intersect_ray_with_stats(&self, ray: &Ray, stats: &mut TraversalStats) -> Option<RayHit> {
        let root = self.root?;
        self.intersect_node(root, ray, stats)
    }

    fn intersect_node(&self, id: NodeId, ray: &Ray, stats: &mut TraversalStats) -> Option<RayHit> {
        let node = self.node(id);
        stats.nodes_visited += 1;

        if !node.bounds().may_intersect_ray(ray) {
            stats.nodes_pruned += 1;
            return None;
        }

        match *node {
            BvhNode::Leaf { .. } => {
                let mut closest = None;
                for &index in self.leaf_triangles(id) {
                    stats.triangle_tests += 1;
                    closest = RayHit::nearest(closest, self.triangles[index].hit(ray, index));
                }
                closest
            }
            BvhNode::Interior { left, right, .. } => {
                let left_hit = self.intersect_node(left, ray, stats);
                let right_hit = self.intersect_node(right, ray, stats);
                RayHit::nearest(left_hit, right_hit)
            }
        }
    }
}

/// Recursive median-split construction
struct BvhBuilder {
    config: BvhConfig,
    centroids: Vec<Vec3>,
    bounds: Vec<AABB>,
    nodes: Vec<BvhNode>,
    order: Vec<usize>,
}

impl BvhBuilder {
    fn new(triangles: &[Triangle], config: BvhConfig) -> Self {
        Self {
            config,
            centroids: triangles.iter().map(Triangle::centroid).collect(),
            bounds: triangles.iter().map(Triangle::bounds).collect(),
            nodes: Vec::with_capacity(2 * triangles.len() / config.leaf_size() + 1),
            order: (0..triangles.len()).collect(),
        }
    }

    /// Build the subtree over `order[start..end]` and return its handle
    fn build_node(&mut self, start: usize, end: usize, depth: usize) -> NodeId {
        let id = NodeId(self.nodes.len());
        let count = end - start;

        if count <= self.config.leaf_size() || depth >= self.config.max_depth {
            let bounds = self.order[start..end]
                .iter()
                .fold(AABB::empty(), |acc, &index| acc.union(&self.bounds[index]));
            self.nodes.push(BvhNode::Leaf { bounds, first: start, count });
            return id;
        }

        // Reserve the slot so the parent precedes its children in the arena
        self.nodes.push(BvhNode::Leaf { bounds: AABB::empty(), first: start, count: 0 });

        let axis = self.split_axis(start, end);
        let centroids = &self.centroids;
        self.order[start..end].sort_by(|&a, &b| centroids[a][axis].total_cmp(&centroids[b][axis]));

        let mid = start + count / 2;
        let left = self.build_node(start, mid, depth + 1);
        let right = self.build_node(mid, end, depth + 1);

        let bounds = self.nodes[left.0].bounds().union(self.nodes[right.0].bounds());
        self.nodes[id.0] = BvhNode::Interior { bounds, left, right };
        id
    }

    /// Axis along which the centroids of `order[start..end]` vary the most
    fn split_axis(&self, start: usize, end: usize) -> usize {
        let slice = &self.order[start..end];
        let n = slice.len() as f32;

        let mean = slice.iter().fold(Vec3::zeros(), |acc, &i| acc + self.centroids[i]) / n;
        let variance = slice.iter().fold(Vec3::zeros(), |acc, &i| {
            let d = self.centroids[i] - mean;
            acc + d.component_mul(&d)
        }) / n;

        argmax([variance.x, variance.y, variance.z])
    }
}
