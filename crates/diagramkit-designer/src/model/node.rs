use diagramkit_core::geometry::Rect;
use diagramkit_core::ObjectId;
use smallvec::SmallVec;

/// A rectangular owner of ports, optionally nested in a group node.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: ObjectId,
    pub(crate) name: String,
    pub(crate) bounds: Rect,
    pub(crate) parent: Option<ObjectId>,
    pub(crate) visible: bool,
    pub(crate) ports: SmallVec<[ObjectId; 4]>,
}

impl Node {
    pub(crate) fn new(id: ObjectId, name: impl Into<String>, bounds: Rect) -> Self {
        Self {
            id,
            name: name.into(),
            bounds,
            parent: None,
            visible: true,
            ports: SmallVec::new(),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// The group node this node belongs to.
    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn ports(&self) -> &[ObjectId] {
        &self.ports
    }
}
