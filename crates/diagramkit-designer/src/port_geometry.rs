//! Link attachment geometry shared by all port kinds.
//!
//! [`PortGeometry`] defaults to a free-floating point: links meet at the
//! port center and leave it pointing straight at their far end. Box ports
//! override every query; proxy ports forward to whatever port they
//! currently mimic.

use diagramkit_core::geometry::{angle_between, Point};
use diagramkit_core::{LinkEnd, ObjectId};

use crate::model::{Link, Port, PortKind};
use crate::scene::Scene;

/// Geometry queries a port answers for each link end attached to it.
pub trait PortGeometry {
    /// Direction, in degrees, in which `link` leaves `port` at `end`.
    fn link_direction(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> f64 {
        free_direction(port, scene, link, end)
    }

    /// Point where `link` meets `port` at `end`.
    fn link_point(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> Point {
        let _ = (scene, link, end);
        port.center()
    }

    /// Length of the straight segment leaving `port` before an orthogonal
    /// link turns.
    fn end_segment_length(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> f64 {
        let _ = (port, link, end);
        scene.config().end_segment_length
    }
}

fn free_direction(port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> f64 {
    angle_between(port.center(), scene.far_point(link, end))
}

/// A port with no extent of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PointPort;

impl PortGeometry for PointPort {}

/// Temporary port that answers as its target would.
///
/// Without a target (or when the target has gone away) it behaves as a
/// point port at its own bounds, which the linking tool keeps at the
/// pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProxyPort {
    target: Option<ObjectId>,
}

impl ProxyPort {
    pub fn new(target: Option<ObjectId>) -> Self {
        Self { target }
    }

    pub fn target(&self) -> Option<ObjectId> {
        self.target
    }

    pub(crate) fn set_target(&mut self, target: Option<ObjectId>) {
        self.target = target;
    }

    fn resolve<'a>(&self, scene: &'a Scene) -> Option<&'a Port> {
        self.target
            .and_then(|id| scene.port(id))
            .filter(|target| !matches!(target.kind(), PortKind::Proxy(_)))
    }
}

impl PortGeometry for ProxyPort {
    fn link_direction(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> f64 {
        match self.resolve(scene) {
            Some(target) => target.link_direction(scene, link, end),
            None => free_direction(port, scene, link, end),
        }
    }

    fn link_point(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> Point {
        match self.resolve(scene) {
            Some(target) => target.link_point(scene, link, end),
            None => port.center(),
        }
    }

    fn end_segment_length(&self, port: &Port, scene: &Scene, link: &Link, end: LinkEnd) -> f64 {
        match self.resolve(scene) {
            Some(target) => target.end_segment_length(scene, link, end),
            None => PointPort.end_segment_length(port, scene, link, end),
        }
    }
}
