//! Nearest valid port search around the pointer.

use std::collections::HashMap;

use diagramkit_core::geometry::{Point, Rect};
use diagramkit_core::ObjectId;

use crate::model::Port;
use crate::scene::Scene;

/// Finds the port a link end would snap to.
///
/// Link validity is expensive to decide, so results are cached per
/// candidate port for the duration of one gesture. Call [`PortLocator::clear`]
/// whenever the origin or direction of the search changes.
#[derive(Debug, Clone, Default)]
pub struct PortLocator {
    validity: HashMap<ObjectId, bool>,
    large_port_extent: f64,
}

impl PortLocator {
    pub fn new(large_port_extent: f64) -> Self {
        Self {
            validity: HashMap::new(),
            large_port_extent,
        }
    }

    pub fn clear(&mut self) {
        self.validity.clear();
    }

    /// Validity recorded for `port` during the current gesture.
    pub fn cached_validity(&self, port: ObjectId) -> Option<bool> {
        self.validity.get(&port).copied()
    }

    pub fn cached_count(&self) -> usize {
        self.validity.len()
    }

    /// Closest valid port strictly within `gravity` of `point`.
    ///
    /// With `forward` the candidate would become the link's destination and
    /// `origin` its source; otherwise the roles swap. Ports belonging to
    /// `edited_link` are never candidates. Among equally distant ports the
    /// front-most wins.
    pub fn pick_nearest_port(
        &mut self,
        scene: &Scene,
        point: Point,
        origin: Option<ObjectId>,
        forward: bool,
        gravity: f64,
        edited_link: Option<ObjectId>,
    ) -> Option<ObjectId> {
        let mut best_distance = gravity * gravity;
        let mut best_port = None;

        let mut candidates: Vec<(u64, ObjectId)> = scene
            .ports_in(&Rect::around(point, gravity))
            .into_iter()
            .filter(|id| scene.is_port_interactable(*id))
            .filter(|id| !edited_link.is_some_and(|link| scene.is_part_of_link(*id, link)))
            .filter_map(|id| scene.z_index(id).map(|z| (z, id)))
            .collect();
        candidates.sort_unstable_by(|a, b| b.cmp(a));

        for (_, id) in candidates {
            let Some(port) = scene.port(id) else {
                continue;
            };
            let distance = self.representative_point(scene, port, point).distance_squared_to(&point);
            if distance >= best_distance {
                continue;
            }

            let valid = *self.validity.entry(id).or_insert_with(|| {
                if forward {
                    scene.is_valid_link(origin, Some(id), edited_link)
                } else {
                    scene.is_valid_link(Some(id), origin, edited_link)
                }
            });
            if valid {
                best_distance = distance;
                best_port = Some(id);
            }
        }

        tracing::trace!(
            "Nearest port to ({:.1}, {:.1}): {:?}",
            point.x,
            point.y,
            best_port
        );
        best_port
    }

    /// The point of `port` measured against the pointer.
    ///
    /// Small ports are measured at their center. For large ports the
    /// pointer itself counts while it is inside the owner, otherwise the
    /// closest point on the port outline.
    fn representative_point(&self, scene: &Scene, port: &Port, point: Point) -> Point {
        let bounds = port.bounds();
        if bounds.width <= self.large_port_extent && bounds.height <= self.large_port_extent {
            return port.center();
        }
        let owner_bounds = port
            .owner()
            .and_then(|id| scene.node(id))
            .map(|node| node.bounds())
            .unwrap_or(bounds);
        if owner_bounds.contains(point) {
            point
        } else {
            bounds.nearest_point_on_boundary(point)
        }
    }
}
