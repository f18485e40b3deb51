//! The editing surface a tool works on.
//!
//! Bundles the scene with the undo log, the notification bus and the
//! viewport, and routes document edits through the log so they can be
//! rolled back or undone.

use diagramkit_core::{DiagramEvent, EventBus, LinkEnd, LinkingConfig, ObjectId, Result};

use crate::history::{SceneEdit, TransactionLog, UndoRedoManager};
use crate::model::LinkStyle;
use crate::scene::Scene;
use crate::viewport::Viewport;

/// Scene plus the collaborators of interactive editing.
#[derive(Debug)]
pub struct Diagram {
    pub scene: Scene,
    pub history: UndoRedoManager,
    pub events: EventBus,
    pub viewport: Viewport,
}

impl Default for Diagram {
    fn default() -> Self {
        Self::new(LinkingConfig::default())
    }
}

impl Diagram {
    pub fn new(config: LinkingConfig) -> Self {
        let history = UndoRedoManager::new(config.undo_depth);
        Self {
            scene: Scene::new(config),
            history,
            events: EventBus::new(),
            viewport: Viewport::default(),
        }
    }

    pub fn config(&self) -> &LinkingConfig {
        self.scene.config()
    }

    pub fn begin_transaction(&mut self) {
        self.history.begin();
    }

    /// Commits the open transaction; returns false if it recorded nothing.
    pub fn commit_transaction(&mut self, label: &str) -> bool {
        let committed = self.history.commit(label);
        if committed {
            self.events.publish(DiagramEvent::TransactionCommitted {
                label: label.to_string(),
            });
        }
        committed
    }

    /// Rolls back and discards everything recorded since `begin_transaction`.
    pub fn abort_transaction(&mut self) -> Result<()> {
        let edits = self.history.abort();
        for edit in edits.iter().rev() {
            edit.inverse().apply(&mut self.scene)?;
        }
        self.events.publish(DiagramEvent::TransactionAborted);
        Ok(())
    }

    /// Adds a document link and records it.
    pub fn add_link(
        &mut self,
        from: Option<ObjectId>,
        to: Option<ObjectId>,
        style: LinkStyle,
    ) -> Result<ObjectId> {
        let id = self.scene.add_link(from, to, style)?;
        if let Some(link) = self.scene.link(id) {
            self.history.record(SceneEdit::AddLink(link.clone()));
        }
        Ok(id)
    }

    /// Connects one end of a document link to `port` and records it.
    pub fn reconnect(&mut self, link: ObjectId, end: LinkEnd, port: Option<ObjectId>) -> Result<()> {
        let previous = self.scene.set_link_port(link, end, port)?;
        if previous != port {
            self.history.record(SceneEdit::Reconnect {
                link,
                end,
                previous,
                current: port,
            });
        }
        Ok(())
    }

    /// Moves a link into another group and records it.
    pub fn reparent_link(&mut self, link: ObjectId, parent: Option<ObjectId>) -> Result<()> {
        let previous = self.scene.set_link_parent(link, parent)?;
        if previous != parent {
            self.history.record(SceneEdit::Reparent {
                link,
                previous,
                current: parent,
            });
        }
        Ok(())
    }

    /// Deletes a link unless a veto handler objects.
    ///
    /// Returns false, leaving the link in place, when vetoed.
    pub fn delete_link(&mut self, link: ObjectId) -> Result<bool> {
        let objects = vec![link];
        if !self
            .events
            .publish_cancellable(DiagramEvent::SelectionDeleting {
                objects: objects.clone(),
            })
        {
            return Ok(false);
        }
        let removed = self.scene.remove_link(link)?;
        self.history.record(SceneEdit::RemoveLink(removed));
        self.events.publish(DiagramEvent::SelectionDeleted { objects });
        tracing::debug!("Deleted link {}", link);
        Ok(true)
    }

    /// Reverts the latest committed transaction. Returns false when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> Result<bool> {
        match self.history.undo() {
            Some(transaction) => {
                tracing::debug!("Undo '{}'", transaction.label);
                transaction.undo(&mut self.scene)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn redo(&mut self) -> Result<bool> {
        match self.history.redo() {
            Some(transaction) => {
                tracing::debug!("Redo '{}'", transaction.label);
                transaction.redo(&mut self.scene)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
