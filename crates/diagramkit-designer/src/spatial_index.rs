//! Quadtree spatial index over object bounds.
//!
//! Used to narrow hit-testing and port searches to the objects near a
//! point instead of scanning the whole scene. Items are stored in the
//! deepest node that fully contains their bounds; items that fit no child,
//! or lie outside the root bounds, stay in the parent.

use diagramkit_core::geometry::Rect;
use diagramkit_core::ObjectId;

/// Statistics about the index shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpatialIndexStats {
    pub total_nodes: usize,
    pub total_items: usize,
    pub max_depth: usize,
}

#[derive(Debug, Clone)]
struct QuadtreeNode {
    bounds: Rect,
    depth: usize,
    items: Vec<(ObjectId, Rect)>,
    children: Option<Box<[QuadtreeNode; 4]>>,
}

impl QuadtreeNode {
    fn new(bounds: Rect, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    fn child_for(&mut self, rect: &Rect) -> Option<&mut QuadtreeNode> {
        self.children
            .as_mut()
            .and_then(|children| children.iter_mut().find(|c| c.bounds.contains_rect(rect)))
    }

    fn insert(&mut self, id: ObjectId, rect: Rect, max_depth: usize, max_items: usize) {
        if let Some(child) = self.child_for(&rect) {
            child.insert(id, rect, max_depth, max_items);
            return;
        }

        self.items.push((id, rect));

        if self.children.is_none() && self.items.len() > max_items && self.depth < max_depth {
            self.split(max_depth, max_items);
        }
    }

    fn split(&mut self, max_depth: usize, max_items: usize) {
        let b = self.bounds;
        let hw = b.width / 2.0;
        let hh = b.height / 2.0;
        let depth = self.depth + 1;
        self.children = Some(Box::new([
            QuadtreeNode::new(Rect::new(b.x, b.y, hw, hh), depth),
            QuadtreeNode::new(Rect::new(b.x + hw, b.y, hw, hh), depth),
            QuadtreeNode::new(Rect::new(b.x, b.y + hh, hw, hh), depth),
            QuadtreeNode::new(Rect::new(b.x + hw, b.y + hh, hw, hh), depth),
        ]));

        let items = std::mem::take(&mut self.items);
        for (id, rect) in items {
            self.insert(id, rect, max_depth, max_items);
        }
    }

    fn remove(&mut self, id: ObjectId, rect: &Rect) -> bool {
        if let Some(pos) = self.items.iter().position(|(item, _)| *item == id) {
            self.items.swap_remove(pos);
            return true;
        }
        match self.child_for(rect) {
            Some(child) => child.remove(id, rect),
            None => false,
        }
    }

    fn remove_anywhere(&mut self, id: ObjectId) -> bool {
        if let Some(pos) = self.items.iter().position(|(item, _)| *item == id) {
            self.items.swap_remove(pos);
            return true;
        }
        self.children
            .as_mut()
            .is_some_and(|children| children.iter_mut().any(|c| c.remove_anywhere(id)))
    }

    fn query(&self, rect: &Rect, out: &mut Vec<ObjectId>) {
        out.extend(
            self.items
                .iter()
                .filter(|(_, bounds)| bounds.intersects(rect))
                .map(|(id, _)| *id),
        );
        if let Some(children) = &self.children {
            for child in children.iter().filter(|c| c.bounds.intersects(rect)) {
                child.query(rect, out);
            }
        }
    }

    fn collect_stats(&self, stats: &mut SpatialIndexStats) {
        stats.total_nodes += 1;
        stats.total_items += self.items.len();
        stats.max_depth = stats.max_depth.max(self.depth);
        if let Some(children) = &self.children {
            for child in children.iter() {
                child.collect_stats(stats);
            }
        }
    }
}

/// Quadtree keyed by object id.
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    root: QuadtreeNode,
    max_depth: usize,
    max_items: usize,
}

impl SpatialIndex {
    /// Creates an index covering `bounds`, splitting nodes holding more than
    /// `max_items` items down to `max_depth` levels.
    pub fn new(bounds: Rect, max_depth: usize, max_items: usize) -> Self {
        Self {
            root: QuadtreeNode::new(bounds, 0),
            max_depth,
            max_items: max_items.max(1),
        }
    }

    pub fn insert(&mut self, id: ObjectId, bounds: &Rect) {
        self.root.insert(id, *bounds, self.max_depth, self.max_items);
    }

    /// Removes `id`, which must have been inserted with `bounds`.
    ///
    /// Falls back to a full walk when the bounds are stale.
    pub fn remove(&mut self, id: ObjectId, bounds: &Rect) -> bool {
        self.root.remove(id, bounds) || self.root.remove_anywhere(id)
    }

    pub fn update(&mut self, id: ObjectId, old_bounds: &Rect, new_bounds: &Rect) {
        self.remove(id, old_bounds);
        self.insert(id, new_bounds);
    }

    /// Ids whose bounds intersect `rect`, without duplicates.
    pub fn query(&self, rect: &Rect) -> Vec<ObjectId> {
        let mut out = Vec::new();
        self.root.query(rect, &mut out);
        out.sort_unstable();
        out.dedup();
        out
    }

    pub fn query_point(&self, x: f64, y: f64) -> Vec<ObjectId> {
        self.query(&Rect::new(x, y, 0.0, 0.0))
    }

    pub fn clear(&mut self) {
        self.root = QuadtreeNode::new(self.root.bounds, 0);
    }

    pub fn stats(&self) -> SpatialIndexStats {
        let mut stats = SpatialIndexStats::default();
        self.root.collect_stats(&mut stats);
        stats
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new(Rect::new(-10_000.0, -10_000.0, 20_000.0, 20_000.0), 8, 16)
    }
}
