//! Interactive tool for drawing new links and reconnecting existing ones.
//!
//! A gesture starts either on a port ([`LinkingTool::start_new_link`]) or
//! on an end handle of an existing link ([`LinkingTool::start_relink`]).
//! While it runs, one temporary port follows the pointer and mimics the
//! nearest valid port. The port being mimicked lays the link out among its
//! own links, so the preview is drawn exactly as it would look once
//! attached. The gesture ends on pointer release or cancel.
//!
//! Every gesture runs inside one transaction of the diagram's undo log.
//! Temporary objects live in the interaction layer and are never recorded;
//! the only recorded edits are the final creation, reconnection or
//! deletion.

mod types;

pub use types::{GestureOutcome, LinkingMode, ToolState};

use diagramkit_core::geometry::{Point, Rect};
use diagramkit_core::{DiagramEvent, LinkEnd, ObjectId, Result, SceneError, ToolError};

use crate::diagram::Diagram;
use crate::history::{SceneEdit, TransactionLog};
use crate::locator::PortLocator;
use crate::model::LinkStyle;

#[derive(Debug, Clone)]
struct Gesture {
    mode: LinkingMode,
    /// The candidate becomes the link's destination.
    forward: bool,
    /// The port the link is anchored at while the other end moves.
    origin: Option<ObjectId>,
    /// Temporary port standing in for the origin (new links only).
    start_port: Option<ObjectId>,
    /// Temporary port following the pointer.
    free_port: ObjectId,
    /// The temporary link, or the existing link being relinked.
    link: ObjectId,
    /// The end of `link` attached to `free_port`.
    grabbed_end: LinkEnd,
    original_from: Option<ObjectId>,
    original_to: Option<ObjectId>,
    /// Stored path of the relinked link before the gesture.
    original_points: Vec<Point>,
    candidate: Option<ObjectId>,
}

impl Gesture {
    fn original(&self, end: LinkEnd) -> Option<ObjectId> {
        match end {
            LinkEnd::From => self.original_from,
            LinkEnd::To => self.original_to,
        }
    }
}

/// Link drawing and relinking state machine.
#[derive(Debug, Clone, Default)]
pub struct LinkingTool {
    gesture: Option<Gesture>,
    locator: PortLocator,
    new_link_style: LinkStyle,
    last_outcome: Option<GestureOutcome>,
}

impl LinkingTool {
    pub fn new(new_link_style: LinkStyle) -> Self {
        Self {
            new_link_style,
            ..Self::default()
        }
    }

    pub fn state(&self) -> ToolState {
        if self.gesture.is_some() {
            ToolState::Drawing
        } else {
            ToolState::Idle
        }
    }

    pub fn mode(&self) -> Option<LinkingMode> {
        self.gesture.as_ref().map(|g| g.mode)
    }

    /// The port the link would attach to if released now.
    pub fn candidate(&self) -> Option<ObjectId> {
        self.gesture.as_ref().and_then(|g| g.candidate)
    }

    /// The link being drawn or relinked.
    pub fn temporary_link(&self) -> Option<ObjectId> {
        self.gesture.as_ref().map(|g| g.link)
    }

    /// The temporary port following the pointer.
    pub fn free_port(&self) -> Option<ObjectId> {
        self.gesture.as_ref().map(|g| g.free_port)
    }

    /// True when the candidate port would become the link's destination.
    pub fn is_forward(&self) -> Option<bool> {
        self.gesture.as_ref().map(|g| g.forward)
    }

    pub fn locator(&self) -> &PortLocator {
        &self.locator
    }

    pub fn last_outcome(&self) -> Option<GestureOutcome> {
        self.last_outcome
    }

    pub fn new_link_style(&self) -> LinkStyle {
        self.new_link_style
    }

    pub fn set_new_link_style(&mut self, style: LinkStyle) {
        self.new_link_style = style;
    }

    /// Starts drawing a new link out of `port`.
    ///
    /// A port that cannot start links but can end them is drawn from
    /// backwards: the pointer end becomes the link's source.
    pub fn start_new_link(&mut self, diagram: &mut Diagram, port: ObjectId, pointer: Point) -> Result<()> {
        if self.gesture.is_some() {
            return Err(ToolError::GestureActive.into());
        }
        let origin = diagram
            .scene
            .port(port)
            .ok_or(SceneError::UnknownObject { id: port.raw() })?;
        let forward = origin.can_link_from();
        if !forward && !origin.can_link_to() {
            return Err(ToolError::NotLinkable { port: port.raw() }.into());
        }
        let origin_bounds = origin.bounds();

        let scene = &mut diagram.scene;
        let start_port = scene.add_temporary_port(Some(port), origin_bounds);
        let free_port = scene.add_temporary_port(None, Rect::at_point(pointer));
        let (from, to) = if forward {
            (start_port, free_port)
        } else {
            (free_port, start_port)
        };
        let link = scene.add_temporary_link(Some(from), Some(to), self.new_link_style)?;

        self.locator = PortLocator::new(diagram.config().large_port_extent);
        diagram.begin_transaction();
        tracing::debug!(
            "Started new link from port {} ({})",
            port,
            if forward { "forward" } else { "backward" }
        );

        self.gesture = Some(Gesture {
            mode: LinkingMode::NewLink,
            forward,
            origin: Some(port),
            start_port: Some(start_port),
            free_port,
            link,
            grabbed_end: if forward { LinkEnd::To } else { LinkEnd::From },
            original_from: None,
            original_to: None,
            original_points: Vec::new(),
            candidate: None,
        });
        Ok(())
    }

    /// Starts dragging the `end` of an existing link.
    pub fn start_relink(
        &mut self,
        diagram: &mut Diagram,
        link: ObjectId,
        end: LinkEnd,
        pointer: Point,
    ) -> Result<()> {
        if self.gesture.is_some() {
            return Err(ToolError::GestureActive.into());
        }
        let existing = diagram
            .scene
            .link(link)
            .ok_or(SceneError::UnknownObject { id: link.raw() })?;
        if !existing.style().is_relinkable(end) {
            return Err(ToolError::NotRelinkable {
                link: link.raw(),
                end: end.name(),
            }
            .into());
        }
        let original_from = existing.from_port();
        let original_to = existing.to_port();
        let original_points = existing.points().to_vec();

        self.locator = PortLocator::new(diagram.config().large_port_extent);
        diagram.begin_transaction();

        let free_port = diagram
            .scene
            .add_temporary_port(None, Rect::at_point(pointer));
        diagram.scene.set_link_port(link, end, Some(free_port))?;
        tracing::debug!("Started relink of link {} at its {} end", link, end);

        let origin = match end {
            LinkEnd::From => original_to,
            LinkEnd::To => original_from,
        };
        self.gesture = Some(Gesture {
            mode: LinkingMode::Relink,
            forward: end == LinkEnd::To,
            origin,
            start_port: None,
            free_port,
            link,
            grabbed_end: end,
            original_from,
            original_to,
            original_points,
            candidate: None,
        });
        Ok(())
    }

    fn locate(&mut self, diagram: &Diagram, gesture: &Gesture, pointer: Point) -> Option<ObjectId> {
        self.locator.pick_nearest_port(
            &diagram.scene,
            pointer,
            gesture.origin,
            gesture.forward,
            diagram.config().gravity_radius,
            Some(gesture.link),
        )
    }

    /// Tracks the pointer: snaps the free end to the nearest valid port
    /// and autoscrolls near the view edges. Returns the snapped port.
    pub fn on_pointer_move(&mut self, diagram: &mut Diagram, pointer: Point) -> Result<Option<ObjectId>> {
        let gesture = self.gesture.clone().ok_or(ToolError::NoGesture)?;
        let candidate = self.locate(diagram, &gesture, pointer);
        Self::track(diagram, &gesture, candidate, pointer)?;

        let margin = diagram.config().autoscroll_margin;
        let step = diagram.config().autoscroll_step;
        diagram.viewport.autoscroll_toward(pointer, margin, step);

        if let Some(g) = self.gesture.as_mut() {
            g.candidate = candidate;
        }
        Ok(candidate)
    }

    /// Moves the free port onto `candidate`, or to a point at the pointer.
    fn track(diagram: &mut Diagram, gesture: &Gesture, candidate: Option<ObjectId>, pointer: Point) -> Result<()> {
        let bounds = candidate
            .and_then(|id| diagram.scene.port(id))
            .map(|port| port.bounds())
            .unwrap_or_else(|| Rect::at_point(pointer));
        diagram
            .scene
            .retarget_temporary_port(gesture.free_port, candidate, bounds)
    }

    /// Ends the gesture at `pointer`.
    pub fn on_pointer_up(&mut self, diagram: &mut Diagram, pointer: Point) -> Result<GestureOutcome> {
        let gesture = self.gesture.take().ok_or(ToolError::NoGesture)?;
        let candidate = self.locate(diagram, &gesture, pointer);

        let result = match Self::track(diagram, &gesture, candidate, pointer) {
            Ok(()) => match gesture.mode {
                LinkingMode::NewLink => self.finish_new_link(diagram, &gesture, candidate),
                LinkingMode::Relink => self.finish_relink(diagram, &gesture, candidate),
            },
            Err(err) => Err(err),
        };
        if result.is_err() {
            if let Err(restore_err) = self.restore_originals(diagram, &gesture) {
                tracing::warn!("Could not restore link {}: {}", gesture.link, restore_err);
            }
        }
        self.exit(diagram, &gesture);

        match result {
            Ok(outcome) => {
                tracing::debug!("Linking gesture ended: {}", outcome);
                self.last_outcome = Some(outcome);
                Ok(outcome)
            }
            Err(err) => {
                tracing::warn!("Linking gesture failed: {}", err);
                if diagram.history.in_transaction() {
                    if let Err(abort_err) = diagram.abort_transaction() {
                        tracing::warn!("Rollback failed: {}", abort_err);
                    }
                }
                Err(err)
            }
        }
    }

    /// Abandons the gesture, restoring any link it detached.
    ///
    /// Does nothing when no gesture is active.
    pub fn on_cancel(&mut self, diagram: &mut Diagram) -> Result<GestureOutcome> {
        let Some(gesture) = self.gesture.take() else {
            return Ok(GestureOutcome::NoOp);
        };
        let restored = self.restore_originals(diagram, &gesture);
        self.exit(diagram, &gesture);
        diagram.abort_transaction()?;
        restored?;
        tracing::debug!("Linking gesture cancelled");
        self.last_outcome = Some(GestureOutcome::Cancelled);
        Ok(GestureOutcome::Cancelled)
    }

    fn finish_new_link(
        &mut self,
        diagram: &mut Diagram,
        gesture: &Gesture,
        candidate: Option<ObjectId>,
    ) -> Result<GestureOutcome> {
        let Some(target) = candidate else {
            diagram.commit_transaction("New Link");
            return Ok(GestureOutcome::NoOp);
        };
        let (from, to) = if gesture.forward {
            (gesture.origin, Some(target))
        } else {
            (Some(target), gesture.origin)
        };

        let link = diagram.add_link(from, to, self.new_link_style)?;
        diagram.events.publish(DiagramEvent::LinkCreated { link, from, to });
        diagram.commit_transaction("New Link");
        Ok(GestureOutcome::Created(link))
    }

    fn finish_relink(
        &mut self,
        diagram: &mut Diagram,
        gesture: &Gesture,
        candidate: Option<ObjectId>,
    ) -> Result<GestureOutcome> {
        let link = gesture.link;
        let end = gesture.grabbed_end;
        let original = gesture.original(end);
        let style = diagram
            .scene
            .link(link)
            .map(|l| l.style())
            .ok_or(SceneError::UnknownObject { id: link.raw() })?;

        if let Some(target) = candidate {
            diagram.scene.set_link_port(link, end, original)?;
            if Some(target) == original {
                diagram.commit_transaction("Relink");
                return Ok(GestureOutcome::NoOp);
            }
            diagram.reconnect(link, end, Some(target))?;
            let (from, to) = diagram
                .scene
                .link(link)
                .map(|l| (l.from_port(), l.to_port()))
                .unwrap_or_default();
            let group = diagram.scene.common_group(from, to);
            diagram.reparent_link(link, group)?;
            diagram.events.publish(DiagramEvent::LinkRelinked {
                link,
                end,
                previous: original,
                current: Some(target),
            });
            diagram.commit_transaction("Relink");
            return Ok(GestureOutcome::Relinked(link));
        }

        if style.movable {
            // Detach straight from the free port so the end stays where
            // it was dropped.
            diagram.scene.set_link_port(link, end, None)?;
            if original.is_some() {
                diagram.history.record(SceneEdit::Reconnect {
                    link,
                    end,
                    previous: original,
                    current: None,
                });
            }
            let dropped = diagram
                .scene
                .link(link)
                .map(|l| l.points().to_vec())
                .unwrap_or_default();
            if dropped != gesture.original_points {
                diagram.history.record(SceneEdit::Reshape {
                    link,
                    previous: gesture.original_points.clone(),
                    current: dropped,
                });
            }
            diagram.events.publish(DiagramEvent::LinkRelinked {
                link,
                end,
                previous: original,
                current: None,
            });
            diagram.commit_transaction("Relink");
            return Ok(GestureOutcome::Detached(link));
        }

        self.restore_originals(diagram, gesture)?;
        if style.deletable {
            if diagram.delete_link(link)? {
                diagram.commit_transaction("Delete Link");
                return Ok(GestureOutcome::Deleted(link));
            }
            tracing::debug!("Deletion of link {} vetoed; cancelling", link);
        } else if original.is_none() {
            diagram.commit_transaction("Relink");
            return Ok(GestureOutcome::NoOp);
        }

        diagram.abort_transaction()?;
        Ok(GestureOutcome::Cancelled)
    }

    /// Puts both ends of a relinked link back on their original ports and
    /// restores its path, including any dangling end.
    fn restore_originals(&self, diagram: &mut Diagram, gesture: &Gesture) -> Result<()> {
        if gesture.mode != LinkingMode::Relink || diagram.scene.link(gesture.link).is_none() {
            return Ok(());
        }
        diagram
            .scene
            .set_link_port(gesture.link, LinkEnd::From, gesture.original_from)?;
        diagram
            .scene
            .set_link_port(gesture.link, LinkEnd::To, gesture.original_to)?;
        diagram
            .scene
            .set_link_points(gesture.link, gesture.original_points.clone())?;
        Ok(())
    }

    /// Removes the gesture's temporary objects and resets per-gesture state.
    fn exit(&mut self, diagram: &mut Diagram, gesture: &Gesture) {
        if gesture.mode == LinkingMode::NewLink {
            diagram.scene.remove_temporary(gesture.link);
        }
        diagram.scene.remove_temporary(gesture.free_port);
        if let Some(start) = gesture.start_port {
            diagram.scene.remove_temporary(start);
        }
        self.locator.clear();
        diagram.viewport.stop_autoscroll();
    }
}
