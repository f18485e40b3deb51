use diagramkit_core::ObjectId;
use std::fmt;

/// Whether a linking gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolState {
    #[default]
    Idle,
    Drawing,
}

/// How the current gesture started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkingMode {
    /// Drawing a brand-new link out of a port.
    NewLink,
    /// Dragging one end of an existing link.
    Relink,
}

/// How a gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// A new document link was created.
    Created(ObjectId),
    /// An existing link was reconnected to another port.
    Relinked(ObjectId),
    /// An existing link was left with a dangling end.
    Detached(ObjectId),
    /// An existing link was deleted.
    Deleted(ObjectId),
    /// Nothing changed.
    NoOp,
    /// The gesture was cancelled and every change rolled back.
    Cancelled,
}

impl GestureOutcome {
    /// True when the document was changed.
    pub fn is_committed(&self) -> bool {
        matches!(
            self,
            GestureOutcome::Created(_)
                | GestureOutcome::Relinked(_)
                | GestureOutcome::Detached(_)
                | GestureOutcome::Deleted(_)
        )
    }

    /// The link the outcome refers to, if any.
    pub fn link(&self) -> Option<ObjectId> {
        match self {
            GestureOutcome::Created(id)
            | GestureOutcome::Relinked(id)
            | GestureOutcome::Detached(id)
            | GestureOutcome::Deleted(id) => Some(*id),
            GestureOutcome::NoOp | GestureOutcome::Cancelled => None,
        }
    }
}

impl fmt::Display for GestureOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureOutcome::Created(id) => write!(f, "created link {}", id),
            GestureOutcome::Relinked(id) => write!(f, "relinked link {}", id),
            GestureOutcome::Detached(id) => write!(f, "detached link {}", id),
            GestureOutcome::Deleted(id) => write!(f, "deleted link {}", id),
            GestureOutcome::NoOp => f.write_str("no change"),
            GestureOutcome::Cancelled => f.write_str("cancelled"),
        }
    }
}
