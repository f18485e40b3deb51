use diagramkit_core::geometry::Point;
use diagramkit_core::{LinkEnd, ObjectId};
use serde::{Deserialize, Serialize};

use super::Layer;

/// Behavioural flags of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStyle {
    /// Drawn with axis-aligned segments only.
    pub orthogonal: bool,
    /// The user may grab and reconnect the from end.
    pub relinkable_from: bool,
    /// The user may grab and reconnect the to end.
    pub relinkable_to: bool,
    /// The link may be left with a dangling end.
    pub movable: bool,
    /// The link may be deleted by a relink gesture that ends nowhere.
    pub deletable: bool,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            orthogonal: false,
            relinkable_from: true,
            relinkable_to: true,
            movable: false,
            deletable: true,
        }
    }
}

impl LinkStyle {
    pub fn orthogonal() -> Self {
        Self {
            orthogonal: true,
            ..Self::default()
        }
    }

    pub fn is_relinkable(&self, end: LinkEnd) -> bool {
        match end {
            LinkEnd::From => self.relinkable_from,
            LinkEnd::To => self.relinkable_to,
        }
    }
}

/// A connection between two ports, either of which may be absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub(crate) id: ObjectId,
    pub(crate) from: Option<ObjectId>,
    pub(crate) to: Option<ObjectId>,
    pub(crate) points: Vec<Point>,
    pub(crate) style: LinkStyle,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) layer: Layer,
}

impl Link {
    pub(crate) fn new(id: ObjectId, from: Option<ObjectId>, to: Option<ObjectId>, style: LinkStyle) -> Self {
        Self {
            id,
            from,
            to,
            points: Vec::new(),
            style,
            parent: None,
            layer: Layer::Document,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn from_port(&self) -> Option<ObjectId> {
        self.from
    }

    pub fn to_port(&self) -> Option<ObjectId> {
        self.to
    }

    pub fn port(&self, end: LinkEnd) -> Option<ObjectId> {
        match end {
            LinkEnd::From => self.from,
            LinkEnd::To => self.to,
        }
    }

    pub(crate) fn set_port(&mut self, end: LinkEnd, port: Option<ObjectId>) {
        match end {
            LinkEnd::From => self.from = port,
            LinkEnd::To => self.to = port,
        }
    }

    /// The ends that are attached to a port.
    pub(crate) fn ends(&self) -> impl Iterator<Item = (LinkEnd, ObjectId)> + '_ {
        [(LinkEnd::From, self.from), (LinkEnd::To, self.to)]
            .into_iter()
            .filter_map(|(end, port)| port.map(|p| (end, p)))
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The stored point at `end`, if the link has been routed.
    pub fn end_point(&self, end: LinkEnd) -> Option<Point> {
        match end {
            LinkEnd::From => self.points.first().copied(),
            LinkEnd::To => self.points.last().copied(),
        }
    }

    pub fn style(&self) -> LinkStyle {
        self.style
    }

    pub fn is_orthogonal(&self) -> bool {
        self.style.orthogonal
    }

    /// The group node this link is drawn in.
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }
}
