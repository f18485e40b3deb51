//! Undo/redo history for document edits.
//!
//! Edits are grouped into transactions. The linking tool opens one per
//! gesture; aborting it hands back the recorded edits so the caller can
//! roll them back. Interaction-layer objects are never recorded.

use diagramkit_core::geometry::Point;
use diagramkit_core::{LinkEnd, ObjectId, Result};

use crate::model::Link;
use crate::scene::Scene;

/// One reversible change to the document layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEdit {
    /// A link was added; holds its state right after insertion.
    AddLink(Link),
    /// A link was removed; holds its state right before removal.
    RemoveLink(Link),
    /// One end of a link moved between ports.
    Reconnect {
        link: ObjectId,
        end: LinkEnd,
        previous: Option<ObjectId>,
        current: Option<ObjectId>,
    },
    /// A link moved between groups.
    Reparent {
        link: ObjectId,
        previous: Option<ObjectId>,
        current: Option<ObjectId>,
    },
    /// The stored path of a link changed, as when a dangling end is dropped.
    Reshape {
        link: ObjectId,
        previous: Vec<Point>,
        current: Vec<Point>,
    },
}

impl SceneEdit {
    /// The edit that undoes this one.
    pub fn inverse(&self) -> SceneEdit {
        match self {
            SceneEdit::AddLink(link) => SceneEdit::RemoveLink(link.clone()),
            SceneEdit::RemoveLink(link) => SceneEdit::AddLink(link.clone()),
            SceneEdit::Reconnect {
                link,
                end,
                previous,
                current,
            } => SceneEdit::Reconnect {
                link: *link,
                end: *end,
                previous: *current,
                current: *previous,
            },
            SceneEdit::Reparent {
                link,
                previous,
                current,
            } => SceneEdit::Reparent {
                link: *link,
                previous: *current,
                current: *previous,
            },
            SceneEdit::Reshape {
                link,
                previous,
                current,
            } => SceneEdit::Reshape {
                link: *link,
                previous: current.clone(),
                current: previous.clone(),
            },
        }
    }

    /// Performs this edit on `scene`.
    pub fn apply(&self, scene: &mut Scene) -> Result<()> {
        match self {
            SceneEdit::AddLink(link) => scene.restore_link(link.clone()),
            SceneEdit::RemoveLink(link) => scene.remove_link(link.id()).map(|_| ()),
            SceneEdit::Reconnect {
                link, end, current, ..
            } => scene.set_link_port(*link, *end, *current).map(|_| ()),
            SceneEdit::Reparent { link, current, .. } => {
                scene.set_link_parent(*link, *current).map(|_| ())
            }
            SceneEdit::Reshape { link, current, .. } => {
                scene.set_link_points(*link, current.clone()).map(|_| ())
            }
        }
    }

    pub fn description(&self) -> String {
        match self {
            SceneEdit::AddLink(link) => format!("Add link {}", link.id()),
            SceneEdit::RemoveLink(link) => format!("Remove link {}", link.id()),
            SceneEdit::Reconnect { link, end, .. } => format!("Reconnect {} end of link {}", end, link),
            SceneEdit::Reparent { link, .. } => format!("Regroup link {}", link),
            SceneEdit::Reshape { link, .. } => format!("Reshape link {}", link),
        }
    }
}

/// A named group of edits undone and redone together.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryTransaction {
    pub label: String,
    pub edits: Vec<SceneEdit>,
}

impl HistoryTransaction {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            edits: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Reverts every edit, last first.
    pub fn undo(&self, scene: &mut Scene) -> Result<()> {
        for edit in self.edits.iter().rev() {
            edit.inverse().apply(scene)?;
        }
        Ok(())
    }

    /// Re-applies every edit in order.
    pub fn redo(&self, scene: &mut Scene) -> Result<()> {
        for edit in &self.edits {
            edit.apply(scene)?;
        }
        Ok(())
    }
}

/// Transaction collaborator driven by interactive tools.
pub trait TransactionLog {
    /// Opens a transaction. Edits recorded until `commit` or `abort`
    /// belong to it.
    fn begin(&mut self);

    fn record(&mut self, edit: SceneEdit);

    /// Closes the open transaction under `label`. Returns false when
    /// nothing was recorded, in which case nothing is kept.
    fn commit(&mut self, label: &str) -> bool;

    /// Discards the open transaction and returns its edits, oldest first,
    /// for the caller to roll back.
    fn abort(&mut self) -> Vec<SceneEdit>;

    fn in_transaction(&self) -> bool;
}

/// Bounded undo/redo stacks of committed transactions.
#[derive(Debug, Clone)]
pub struct UndoRedoManager {
    undo_stack: Vec<HistoryTransaction>,
    redo_stack: Vec<HistoryTransaction>,
    max_depth: usize,
    current: Option<HistoryTransaction>,
}

impl UndoRedoManager {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            current: None,
        }
    }

    fn push_undo(&mut self, transaction: HistoryTransaction) {
        self.redo_stack.clear();
        self.undo_stack.push(transaction);
        if self.undo_stack.len() > self.max_depth {
            self.undo_stack.remove(0);
        }
    }

    /// Pops the latest transaction for the caller to revert.
    pub fn undo(&mut self) -> Option<HistoryTransaction> {
        let transaction = self.undo_stack.pop()?;
        self.redo_stack.push(transaction.clone());
        Some(transaction)
    }

    /// Pops the latest undone transaction for the caller to re-apply.
    pub fn redo(&mut self) -> Option<HistoryTransaction> {
        let transaction = self.redo_stack.pop()?;
        self.undo_stack.push(transaction.clone());
        Some(transaction)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Label of the transaction `undo` would revert.
    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.last().map(|t| t.label.as_str())
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current = None;
    }
}

impl Default for UndoRedoManager {
    fn default() -> Self {
        Self::new(100)
    }
}

impl TransactionLog for UndoRedoManager {
    fn begin(&mut self) {
        if self.current.is_some() {
            tracing::warn!("Transaction already open; continuing it");
            return;
        }
        self.current = Some(HistoryTransaction::new(""));
    }

    /// Outside a transaction an edit is committed on its own.
    fn record(&mut self, edit: SceneEdit) {
        match &mut self.current {
            Some(transaction) => transaction.edits.push(edit),
            None => {
                let mut transaction = HistoryTransaction::new(edit.description());
                transaction.edits.push(edit);
                self.push_undo(transaction);
            }
        }
    }

    fn commit(&mut self, label: &str) -> bool {
        let Some(mut transaction) = self.current.take() else {
            return false;
        };
        if transaction.is_empty() {
            tracing::debug!("Empty transaction '{}' not recorded", label);
            return false;
        }
        transaction.label = label.to_string();
        tracing::debug!("Committed '{}' ({} edits)", label, transaction.edits.len());
        self.push_undo(transaction);
        true
    }

    fn abort(&mut self) -> Vec<SceneEdit> {
        let edits = self.current.take().map(|t| t.edits).unwrap_or_default();
        tracing::debug!("Aborted transaction ({} edits)", edits.len());
        edits
    }

    fn in_transaction(&self) -> bool {
        self.current.is_some()
    }
}
