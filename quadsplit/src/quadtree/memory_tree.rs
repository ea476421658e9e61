//! In-memory loose quadtree.
//!
//! A small storage layer over [`LooseQuadtree`]: it keeps nodes in boxed
//! children, calls `choose` to route insertions, `pick_split` when a leaf
//! overflows, and the consistent functions to answer queries. Matches that
//! need a recheck are refined against the real query shape before they are
//! returned.

use std::sync::Arc;

use crate::bounding_box::BoundingBox;
use crate::config::QuadtreeConfig;
use crate::diagnostics::DiagnosticSink;
use crate::errors::SpatialResult;
use crate::quadrant::{Quadrant, Quadrants};
use crate::quadtree::loose_quadtree::LooseQuadtree;
use crate::quadtree::predicates::refine;
use crate::quadtree::quadtree_types::{InsertionChoice, RectBox, ScanKey};

/// A stored box and its payload.
#[derive(Debug, Clone, PartialEq)]
pub struct LeafEntry<T> {
    pub bbox: BoundingBox,
    pub value: T,
}

#[derive(Debug)]
struct InnerNode<T> {
    centroid: BoundingBox,
    level: u32,
    all_the_same: bool,
    children: Quadrants<Option<Box<Node<T>>>>,
}

#[derive(Debug)]
enum Node<T> {
    Inner(InnerNode<T>),
    Leaf(Vec<LeafEntry<T>>),
}

impl<T> Node<T> {
    fn empty_leaf() -> Self {
        Node::Leaf(Vec::new())
    }

    fn len(&self) -> usize {
        match self {
            Node::Leaf(entries) => entries.len(),
            Node::Inner(inner) => inner.children.values().flatten().map(|c| c.len()).sum(),
        }
    }

    fn height(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::Inner(inner) => {
                1 + inner.children.values().flatten().map(|c| c.height()).max().unwrap_or(0)
            }
        }
    }

    fn collect_stats(&self, stats: &mut QuadtreeStats) {
        match self {
            Node::Leaf(entries) => {
                stats.leaf_nodes += 1;
                stats.entries += entries.len();
            }
            Node::Inner(inner) => {
                stats.inner_nodes += 1;
                if inner.all_the_same {
                    stats.all_the_same_nodes += 1;
                }
                for child in inner.children.values().flatten() {
                    child.collect_stats(stats);
                }
            }
        }
    }
}

/// Shape of a [`MemoryQuadtree`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuadtreeStats {
    pub entries: usize,
    pub inner_nodes: usize,
    pub leaf_nodes: usize,
    pub all_the_same_nodes: usize,
    pub height: usize,
}

/// A loose quadtree holding values of type `T`.
///
/// ```rust
/// use quadsplit::{BoundingBox, MemoryQuadtree, QuadtreeConfig, ScanKey, Strategy};
///
/// let mut tree = MemoryQuadtree::new(QuadtreeConfig::default().leaf_capacity(2)).unwrap();
/// tree.insert(BoundingBox::new(0.0, 0.0, 1.0, 1.0), "a").unwrap();
/// tree.insert(BoundingBox::new(5.0, 5.0, 6.0, 6.0), "b").unwrap();
/// tree.insert(BoundingBox::new(9.0, 0.0, 9.5, 0.5), "c").unwrap();
///
/// let key = ScanKey::with_box(Strategy::Overlap, BoundingBox::new(4.0, 4.0, 10.0, 10.0));
/// assert_eq!(tree.search(&[key]).unwrap(), vec![&"b"]);
/// ```
#[derive(Debug)]
pub struct MemoryQuadtree<T> {
    quadtree: LooseQuadtree,
    root: Node<T>,
    size: usize,
}

impl<T> MemoryQuadtree<T> {
    /// Creates an empty tree.
    ///
    /// # Errors
    ///
    /// Returns `InvalidOperation` if `config` does not validate.
    pub fn new(config: QuadtreeConfig) -> SpatialResult<Self> {
        Ok(Self::with_operator(LooseQuadtree::new(config)?))
    }

    /// Creates an empty tree reporting its decisions to `sink`.
    pub fn with_sink(config: QuadtreeConfig, sink: Arc<dyn DiagnosticSink>) -> SpatialResult<Self> {
        Ok(Self::with_operator(LooseQuadtree::with_sink(config, sink)?))
    }

    fn with_operator(quadtree: LooseQuadtree) -> Self {
        Self {
            quadtree,
            root: Node::empty_leaf(),
            size: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of node levels from the root to the deepest leaf.
    pub fn height(&self) -> usize {
        self.root.height()
    }

    pub fn stats(&self) -> QuadtreeStats {
        let mut stats = QuadtreeStats::default();
        self.root.collect_stats(&mut stats);
        stats.height = self.height();
        stats
    }

    pub fn clear(&mut self) {
        self.root = Node::empty_leaf();
        self.size = 0;
    }

    /// Inserts `value` under `bbox`.
    ///
    /// # Errors
    ///
    /// Returns `MalformedGeometry` if `bbox` is malformed; the tree is left
    /// unchanged.
    pub fn insert(&mut self, bbox: BoundingBox, value: T) -> SpatialResult<()> {
        bbox.validate()?;
        let entry = LeafEntry { bbox, value };
        Self::insert_recursive(&self.quadtree, &mut self.root, 0, entry)?;
        self.size += 1;
        Ok(())
    }

    fn insert_recursive(
        quadtree: &LooseQuadtree,
        node: &mut Node<T>,
        level: u32,
        entry: LeafEntry<T>,
    ) -> SpatialResult<()> {
        match node {
            Node::Leaf(entries) => {
                entries.push(entry);
                if entries.len() > quadtree.config.get_leaf_capacity()
                    && level < quadtree.config.get_max_tree_depth()
                {
                    let entries = std::mem::take(entries);
                    *node = Self::split_leaf(quadtree, entries, level)?;
                }
                Ok(())
            }
            Node::Inner(inner) => {
                if inner.all_the_same {
                    let quadrant = least_loaded(&inner.children);
                    let child = inner.children[quadrant].get_or_insert_with(|| Box::new(Node::empty_leaf()));
                    return Self::insert_recursive(quadtree, child, level + 1, entry);
                }

                let choice = quadtree.choose(&inner.centroid, inner.level, &entry.bbox)?;
                let slot = &mut inner.children[choice.first()];
                match slot {
                    Some(child) => Self::insert_recursive(quadtree, child, level + 1, entry),
                    None => {
                        let depth_left = quadtree.config.get_max_tree_depth().saturating_sub(level + 1);
                        *slot = Some(Box::new(Self::build_chain(&choice, level + 1, depth_left, entry)));
                        Ok(())
                    }
                }
            }
        }
    }

    /// Builds the intermediate levels `choose` asked for, ending in a leaf
    /// that holds `entry`.
    fn build_chain(choice: &InsertionChoice, level: u32, depth_left: u32, entry: LeafEntry<T>) -> Node<T> {
        let levels = (choice.levels_to_descend.min(depth_left)) as usize;
        let mut node = Node::Leaf(vec![entry]);
        for i in (0..levels).rev() {
            let mut children: Quadrants<Option<Box<Node<T>>>> = Quadrants::default();
            children[choice.path[i + 1]] = Some(Box::new(node));
            node = Node::Inner(InnerNode {
                centroid: choice.sub_centroids[i],
                level: level + i as u32,
                all_the_same: false,
                children,
            });
        }
        node
    }

    fn split_leaf(quadtree: &LooseQuadtree, entries: Vec<LeafEntry<T>>, level: u32) -> SpatialResult<Node<T>> {
        let boxes: Vec<BoundingBox> = entries.iter().map(|e| e.bbox).collect();
        let split = quadtree.pick_split(&boxes)?;
        let all_the_same = split.is_all_the_same();

        let mut buckets: Quadrants<Vec<LeafEntry<T>>> = Quadrants::default();
        if all_the_same {
            for (i, entry) in entries.into_iter().enumerate() {
                buckets[Quadrant::ALL[i % 4]].push(entry);
            }
        } else {
            let mut assignment = vec![Quadrant::NorthWest; entries.len()];
            for (quadrant, group) in split.groups.iter() {
                for &i in group {
                    assignment[i] = quadrant;
                }
            }
            for (entry, quadrant) in entries.into_iter().zip(assignment) {
                buckets[quadrant].push(entry);
            }
        }

        let mut children: Quadrants<Option<Box<Node<T>>>> = Quadrants::default();
        for (quadrant, bucket) in buckets {
            if bucket.is_empty() {
                continue;
            }
            let child = if bucket.len() > quadtree.config.get_leaf_capacity()
                && level + 1 < quadtree.config.get_max_tree_depth()
            {
                Self::split_leaf(quadtree, bucket, level + 1)?
            } else {
                Node::Leaf(bucket)
            };
            children[quadrant] = Some(Box::new(child));
        }

        Ok(Node::Inner(InnerNode {
            centroid: split.centroid,
            level,
            all_the_same,
            children,
        }))
    }

    /// Returns the values whose boxes satisfy every scan key.
    ///
    /// # Errors
    ///
    /// Returns `MalformedGeometry` if a query argument is malformed.
    pub fn search(&self, keys: &[ScanKey]) -> SpatialResult<Vec<&T>> {
        let mut results = Vec::new();
        self.search_recursive(&self.root, None, keys, &mut results)?;
        Ok(results)
    }

    fn search_recursive<'a>(
        &'a self,
        node: &'a Node<T>,
        traversal: Option<&RectBox>,
        keys: &[ScanKey],
        results: &mut Vec<&'a T>,
    ) -> SpatialResult<()> {
        match node {
            Node::Leaf(entries) => {
                for entry in entries {
                    let found = self.quadtree.leaf_consistent(&entry.bbox, keys)?;
                    if found.matches
                        && (!found.recheck
                            || keys.iter().all(|k| refine(&entry.bbox, k.strategy, &k.argument)))
                    {
                        results.push(&entry.value);
                    }
                }
            }
            Node::Inner(inner) => {
                let admitted =
                    self.quadtree
                        .inner_consistent(traversal, &inner.centroid, inner.all_the_same, keys)?;
                for child in admitted {
                    if let Some(node) = &inner.children[child.quadrant] {
                        self.search_recursive(node, Some(&child.traversal), keys, results)?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn least_loaded<T>(children: &Quadrants<Option<Box<Node<T>>>>) -> Quadrant {
    children
        .iter()
        .min_by_key(|&(_, child)| match child {
            Some(node) => node.len(),
            None => 0,
        })
        .map(|(quadrant, _)| quadrant)
        .unwrap_or(Quadrant::NorthWest)
}
