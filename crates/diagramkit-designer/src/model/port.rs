use diagramkit_core::geometry::{Point, Rect};
use diagramkit_core::{LinkEnd, ObjectId};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{Layer, Link};
use crate::box_port::BoxPort;
use crate::port_geometry::{PointPort, PortGeometry, ProxyPort};
use crate::scene::Scene;

/// One end of one link attached to a port.
///
/// A link whose two ends share a port is attached twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkAttachment {
    pub link: ObjectId,
    pub end: LinkEnd,
}

/// What a port allows links to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCapabilities {
    /// Links may start here.
    pub linkable_from: bool,
    /// Links may end here.
    pub linkable_to: bool,
    /// Links may connect two ports of the same node (or a port to itself).
    pub allow_self_links: bool,
    /// More than one link may connect the same pair of ports.
    pub allow_duplicate_links: bool,
}

impl Default for PortCapabilities {
    fn default() -> Self {
        Self {
            linkable_from: true,
            linkable_to: true,
            allow_self_links: false,
            allow_duplicate_links: false,
        }
    }
}

/// How a port computes link attachment geometry.
#[derive(Debug, Clone)]
pub enum PortKind {
    /// Links meet at the port center.
    Point,
    /// Links attach to the sides of the port's box.
    Box(BoxPort),
    /// Temporary port mimicking an optional target port.
    Proxy(ProxyPort),
}

impl PortKind {
    pub(crate) fn geometry(&self) -> &dyn PortGeometry {
        match self {
            PortKind::Point => &PointPort,
            PortKind::Box(port) => port,
            PortKind::Proxy(port) => port,
        }
    }
}

/// Attaches links to a node.
#[derive(Debug, Clone)]
pub struct Port {
    pub(crate) id: ObjectId,
    pub(crate) bounds: Rect,
    pub(crate) owner: Option<ObjectId>,
    pub(crate) label_of: Option<ObjectId>,
    pub(crate) layer: Layer,
    pub(crate) visible: bool,
    pub(crate) kind: PortKind,
    pub(crate) capabilities: PortCapabilities,
    pub(crate) links: SmallVec<[LinkAttachment; 4]>,
}

impl Port {
    pub(crate) fn new(id: ObjectId, bounds: Rect, kind: PortKind) -> Self {
        Self {
            id,
            bounds,
            owner: None,
            label_of: None,
            layer: Layer::Document,
            visible: true,
            kind,
            capabilities: PortCapabilities::default(),
            links: SmallVec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// The node this port surrounds or sits on.
    pub fn owner(&self) -> Option<ObjectId> {
        self.owner
    }

    /// The link this port is a label of, if any.
    pub fn label_of(&self) -> Option<ObjectId> {
        self.label_of
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn kind(&self) -> &PortKind {
        &self.kind
    }

    pub fn box_port(&self) -> Option<&BoxPort> {
        match &self.kind {
            PortKind::Box(port) => Some(port),
            _ => None,
        }
    }

    pub(crate) fn box_port_mut(&mut self) -> Option<&mut BoxPort> {
        match &mut self.kind {
            PortKind::Box(port) => Some(port),
            _ => None,
        }
    }

    /// The port a temporary port currently mimics.
    pub fn proxy_target(&self) -> Option<ObjectId> {
        match &self.kind {
            PortKind::Proxy(proxy) => proxy.target(),
            _ => None,
        }
    }

    pub fn capabilities(&self) -> PortCapabilities {
        self.capabilities
    }

    pub fn links(&self) -> &[LinkAttachment] {
        &self.links
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn can_link_from(&self) -> bool {
        self.capabilities.linkable_from
    }

    pub fn can_link_to(&self) -> bool {
        self.capabilities.linkable_to
    }

    /// Outward direction, in degrees, of `link` where it leaves this port.
    pub fn link_direction(&self, scene: &Scene, link: &Link, end: LinkEnd) -> f64 {
        self.kind.geometry().link_direction(self, scene, link, end)
    }

    /// Where `link` meets this port.
    pub fn link_point(&self, scene: &Scene, link: &Link, end: LinkEnd) -> Point {
        self.kind.geometry().link_point(self, scene, link, end)
    }

    /// Length of the straight segment before an orthogonal link turns.
    pub fn end_segment_length(&self, scene: &Scene, link: &Link, end: LinkEnd) -> f64 {
        self.kind.geometry().end_segment_length(self, scene, link, end)
    }

    /// Pairwise rule for a link from this port to `to`.
    ///
    /// `ignore` names a link (typically the one being edited) that does not
    /// count as an existing duplicate.
    pub fn is_valid_link_to(&self, scene: &Scene, to: &Port, ignore: Option<ObjectId>) -> bool {
        if !self.can_link_from() || !to.can_link_to() {
            return false;
        }

        let same_node = self.id == to.id || (self.owner.is_some() && self.owner == to.owner);
        if same_node
            && !(self.capabilities.allow_self_links && to.capabilities.allow_self_links)
        {
            return false;
        }

        if !self.capabilities.allow_duplicate_links
            && scene.has_link_between(self.id, to.id, ignore)
        {
            return false;
        }
        true
    }
}
