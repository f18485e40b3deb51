//! Event type definitions for the event bus.

use serde::{Deserialize, Serialize};

use crate::ids::{LinkEnd, ObjectId};

/// Root event enum for diagram notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiagramEvent {
    /// A persistent link was created by the user
    LinkCreated {
        /// The new link.
        link: ObjectId,
        /// Its source port.
        from: Option<ObjectId>,
        /// Its destination port.
        to: Option<ObjectId>,
    },
    /// An existing link was reconnected at one end
    LinkRelinked {
        /// The link that changed.
        link: ObjectId,
        /// The end that was reconnected.
        end: LinkEnd,
        /// The port attached before the gesture.
        previous: Option<ObjectId>,
        /// The port attached now; `None` leaves the end dangling.
        current: Option<ObjectId>,
    },
    /// Objects are about to be deleted; veto subscribers may cancel
    SelectionDeleting {
        /// The objects to delete.
        objects: Vec<ObjectId>,
    },
    /// Objects were deleted
    SelectionDeleted {
        /// The deleted objects.
        objects: Vec<ObjectId>,
    },
    /// A transaction was committed to the undo log
    TransactionCommitted {
        /// The label the transaction was committed with.
        label: String,
    },
    /// A transaction was rolled back
    TransactionAborted,
}

impl DiagramEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            DiagramEvent::LinkCreated { .. } | DiagramEvent::LinkRelinked { .. } => {
                EventCategory::Link
            }
            DiagramEvent::SelectionDeleting { .. } | DiagramEvent::SelectionDeleted { .. } => {
                EventCategory::Selection
            }
            DiagramEvent::TransactionCommitted { .. } | DiagramEvent::TransactionAborted => {
                EventCategory::Transaction
            }
        }
    }

    /// Whether subscribers may veto this event
    pub fn is_cancellable(&self) -> bool {
        matches!(self, DiagramEvent::SelectionDeleting { .. })
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            DiagramEvent::LinkCreated { link, from, to } => {
                format!("link {} created ({} -> {})", link, fmt_port(from), fmt_port(to))
            }
            DiagramEvent::LinkRelinked {
                link,
                end,
                previous,
                current,
            } => format!(
                "link {} relinked at {} end ({} -> {})",
                link,
                end,
                fmt_port(previous),
                fmt_port(current)
            ),
            DiagramEvent::SelectionDeleting { objects } => {
                format!("deleting {} object(s)", objects.len())
            }
            DiagramEvent::SelectionDeleted { objects } => {
                format!("deleted {} object(s)", objects.len())
            }
            DiagramEvent::TransactionCommitted { label } => format!("committed '{}'", label),
            DiagramEvent::TransactionAborted => "transaction aborted".to_string(),
        }
    }
}

fn fmt_port(port: &Option<ObjectId>) -> String {
    match port {
        Some(id) => id.to_string(),
        None => "none".to_string(),
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Link creation and reconnection.
    Link,
    /// Deletion of objects.
    Selection,
    /// Undo log transactions.
    Transaction,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Link => write!(f, "Link"),
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Transaction => write!(f, "Transaction"),
        }
    }
}
