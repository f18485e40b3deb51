//! Link routing from port geometry.

use diagramkit_core::geometry::Point;
use diagramkit_core::{LinkEnd, ObjectId, Result, SceneError};

use super::Scene;
use crate::model::Link;

/// Where one end of a link sits and how it leaves its port.
struct EndGeometry {
    point: Point,
    stub: Point,
    leaves_horizontally: bool,
}

impl Scene {
    /// Recomputes the points of a link from its ports.
    pub fn route_link(&mut self, id: ObjectId) -> Result<()> {
        if !self.links.contains_key(&id) {
            return Err(SceneError::UnknownObject { id: id.raw() }.into());
        }
        self.reroute(id);
        Ok(())
    }

    pub(super) fn reroute(&mut self, id: ObjectId) {
        let Some(link) = self.links.get(&id) else {
            return;
        };
        let points = self.compute_route(link);
        if let Some(link) = self.links.get_mut(&id) {
            link.points = points;
        }
    }

    fn end_geometry(&self, link: &Link, end: LinkEnd) -> Option<EndGeometry> {
        let Some(port) = link.port(end).and_then(|id| self.ports.get(&id)) else {
            let point = link.end_point(end)?;
            return Some(EndGeometry {
                point,
                stub: point,
                leaves_horizontally: true,
            });
        };

        let point = port.link_point(self, link, end);
        if !link.is_orthogonal() {
            return Some(EndGeometry {
                point,
                stub: point,
                leaves_horizontally: true,
            });
        }
        let direction = port.link_direction(self, link, end);
        let length = port.end_segment_length(self, link, end);
        Some(EndGeometry {
            point,
            stub: point.offset_toward(direction, length),
            leaves_horizontally: direction.to_radians().cos().abs() >= 0.5,
        })
    }

    /// Straight links get their two end points; orthogonal links get
    /// `[start, stub, elbow, stub, end]`. Ends without a port keep their
    /// previous point; with neither end known the link has no points.
    fn compute_route(&self, link: &Link) -> Vec<Point> {
        let from = self.end_geometry(link, LinkEnd::From);
        let to = self.end_geometry(link, LinkEnd::To);
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            (Some(only), None) | (None, Some(only)) => return vec![only.point],
            (None, None) => return Vec::new(),
        };

        if !link.is_orthogonal() {
            return vec![from.point, to.point];
        }

        let elbow = if from.leaves_horizontally {
            Point::new(to.stub.x, from.stub.y)
        } else {
            Point::new(from.stub.x, to.stub.y)
        };
        vec![from.point, from.stub, elbow, to.stub, to.point]
    }

    /// The drawable path of a link, or `None` when it has fewer than two
    /// points.
    pub fn link_path(&self, id: ObjectId) -> Option<&[Point]> {
        self.links
            .get(&id)
            .map(Link::points)
            .filter(|points| points.len() >= 2)
    }

    /// Point halfway along the path of a link.
    pub fn link_midpoint(&self, id: ObjectId) -> Option<Point> {
        let path = self.link_path(id)?;
        let total: f64 = path.windows(2).map(|w| w[0].distance_to(&w[1])).sum();
        let mut remaining = total / 2.0;
        for w in path.windows(2) {
            let length = w[0].distance_to(&w[1]);
            if length > 0.0 && remaining <= length {
                return Some(w[0].lerp(&w[1], remaining / length));
            }
            remaining -= length;
        }
        path.first().copied()
    }
}
