use diagramkit_core::geometry::{Point, Rect};
use diagramkit_core::{
    DiagramEvent, Error, EventBus, EventBusConfig, EventFilter, LinkEnd, ObjectId, ToolError,
};
use diagramkit_designer::{
    BoxPort, Diagram, GestureOutcome, LinkStyle, LinkingMode, LinkingTool, PortCapabilities,
    ToolState, TransactionLog,
};

struct Fixture {
    diagram: Diagram,
    a: ObjectId,
    b: ObjectId,
    c: ObjectId,
}

/// Three boxes: A on the left, B to its right, C below B.
fn fixture() -> Fixture {
    let mut diagram = Diagram::default();
    let scene = &mut diagram.scene;
    let mut boxed = |name: &str, x: f64, y: f64| {
        let node = scene.add_node(name, Rect::new(x, y, 60.0, 40.0));
        scene.add_box_port(node, BoxPort::new(10.0)).unwrap()
    };
    let a = boxed("A", 0.0, 0.0);
    let b = boxed("B", 300.0, 0.0);
    let c = boxed("C", 300.0, 200.0);
    Fixture { diagram, a, b, c }
}

const OVER_B: Point = Point { x: 320.0, y: 25.0 };
const OVER_C: Point = Point { x: 330.0, y: 215.0 };
const NOWHERE: Point = Point { x: 150.0, y: 500.0 };

fn existing_link(f: &mut Fixture, style: LinkStyle) -> ObjectId {
    f.diagram.scene.add_link(Some(f.a), Some(f.b), style).unwrap()
}

fn recording_bus() -> EventBus {
    EventBus::with_config(EventBusConfig {
        enable_history: true,
        max_history_size: 100,
    })
}

#[test]
fn test_new_link_round_trip() {
    let mut f = fixture();
    let mut tool = LinkingTool::default();

    tool.start_new_link(&mut f.diagram, f.a, Point::new(30.0, 20.0))
        .unwrap();
    assert_eq!(tool.state(), ToolState::Drawing);
    assert_eq!(tool.mode(), Some(LinkingMode::NewLink));
    assert_eq!(tool.is_forward(), Some(true));
    assert_eq!(f.diagram.scene.temporary_count(), 3);
    assert!(f.diagram.history.in_transaction());

    let snapped = tool.on_pointer_move(&mut f.diagram, OVER_B).unwrap();
    assert_eq!(snapped, Some(f.b));
    assert_eq!(tool.candidate(), Some(f.b));

    // The temporary link is drawn as the real one will be.
    let temporary = tool.temporary_link().unwrap();
    let preview = f.diagram.scene.link_path(temporary).unwrap().to_vec();
    assert_eq!(preview, vec![Point::new(60.0, 20.0), Point::new(300.0, 20.0)]);

    let outcome = tool.on_pointer_up(&mut f.diagram, OVER_B).unwrap();
    let GestureOutcome::Created(link) = outcome else {
        panic!("expected a new link, got {:?}", outcome);
    };
    assert_eq!(tool.state(), ToolState::Idle);
    assert_eq!(tool.last_outcome(), Some(outcome));
    assert_eq!(f.diagram.scene.temporary_count(), 0);
    assert_eq!(f.diagram.scene.document_link_count(), 1);
    assert!(!f.diagram.history.in_transaction());

    let created = f.diagram.scene.link(link).unwrap();
    assert_eq!(created.from_port(), Some(f.a));
    assert_eq!(created.to_port(), Some(f.b));
    assert_eq!(f.diagram.scene.link_path(link).unwrap(), preview.as_slice());
    assert_eq!(f.diagram.history.undo_label(), Some("New Link"));

    assert!(f.diagram.undo().unwrap());
    assert_eq!(f.diagram.scene.document_link_count(), 0);
    assert_eq!(f.diagram.scene.port(f.a).unwrap().link_count(), 0);
    assert!(f.diagram.redo().unwrap());
    assert_eq!(f.diagram.scene.link(link).unwrap().to_port(), Some(f.b));
}

#[test]
fn test_port_that_only_accepts_links_is_drawn_backwards() {
    let mut f = fixture();
    f.diagram
        .scene
        .set_port_capabilities(
            f.a,
            PortCapabilities {
                linkable_from: false,
                ..PortCapabilities::default()
            },
        )
        .unwrap();
    let mut tool = LinkingTool::default();

    tool.start_new_link(&mut f.diagram, f.a, Point::new(30.0, 20.0))
        .unwrap();
    assert_eq!(tool.is_forward(), Some(false));

    let outcome = tool.on_pointer_up(&mut f.diagram, OVER_B).unwrap();
    let link = outcome.link().unwrap();
    let created = f.diagram.scene.link(link).unwrap();
    assert_eq!(created.from_port(), Some(f.b));
    assert_eq!(created.to_port(), Some(f.a));
}

#[test]
fn test_unlinkable_port_rejected() {
    let mut f = fixture();
    f.diagram
        .scene
        .set_port_capabilities(
            f.a,
            PortCapabilities {
                linkable_from: false,
                linkable_to: false,
                ..PortCapabilities::default()
            },
        )
        .unwrap();
    let mut tool = LinkingTool::default();

    let err = tool
        .start_new_link(&mut f.diagram, f.a, Point::new(30.0, 20.0))
        .unwrap_err();
    assert!(matches!(err, Error::Tool(ToolError::NotLinkable { .. })));
    assert_eq!(tool.state(), ToolState::Idle);
    assert_eq!(f.diagram.scene.temporary_count(), 0);
    assert!(!f.diagram.history.in_transaction());
}

#[test]
fn test_protocol_misuse() {
    let mut f = fixture();
    let mut tool = LinkingTool::default();

    let err = tool.on_pointer_up(&mut f.diagram, OVER_B).unwrap_err();
    assert!(matches!(err, Error::Tool(ToolError::NoGesture)));
    let err = tool.on_pointer_move(&mut f.diagram, OVER_B).unwrap_err();
    assert!(matches!(err, Error::Tool(ToolError::NoGesture)));
    assert_eq!(tool.on_cancel(&mut f.diagram).unwrap(), GestureOutcome::NoOp);

    tool.start_new_link(&mut f.diagram, f.a, Point::new(30.0, 20.0))
        .unwrap();
    let err = tool
        .start_new_link(&mut f.diagram, f.b, Point::new(330.0, 20.0))
        .unwrap_err();
    assert!(matches!(err, Error::Tool(ToolError::GestureActive)));
    assert_eq!(tool.on_cancel(&mut f.diagram).unwrap(), GestureOutcome::Cancelled);
    assert_eq!(f.diagram.scene.temporary_count(), 0);
}

#[test]
fn test_release_over_nothing_creates_nothing() {
    let mut f = fixture();
    let mut tool = LinkingTool::default();

    tool.start_new_link(&mut f.diagram, f.a, Point::new(30.0, 20.0))
        .unwrap();
    assert_eq!(tool.on_pointer_move(&mut f.diagram, NOWHERE).unwrap(), None);
    assert_eq!(
        tool.on_pointer_up(&mut f.diagram, NOWHERE).unwrap(),
        GestureOutcome::NoOp
    );
    assert_eq!(f.diagram.scene.document_link_count(), 0);
    assert_eq!(f.diagram.scene.temporary_count(), 0);
    assert!(!f.diagram.history.can_undo());
    assert!(!f.diagram.history.in_transaction());
}

#[test]
fn test_cancel_new_link_removes_temporaries() {
    let mut f = fixture();
    let mut tool = LinkingTool::default();

    tool.start_new_link(&mut f.diagram, f.a, Point::new(30.0, 20.0))
        .unwrap();
    tool.on_pointer_move(&mut f.diagram, OVER_B).unwrap();
    assert_eq!(tool.on_cancel(&mut f.diagram).unwrap(), GestureOutcome::Cancelled);

    assert_eq!(tool.state(), ToolState::Idle);
    assert_eq!(tool.locator().cached_count(), 0);
    assert_eq!(f.diagram.scene.temporary_count(), 0);
    assert_eq!(f.diagram.scene.document_link_count(), 0);
    assert_eq!(f.diagram.scene.port(f.b).unwrap().link_count(), 0);
}

#[test]
fn test_relink_to_another_port_and_undo() {
    let mut f = fixture();
    let link = existing_link(&mut f, LinkStyle::default());
    let mut tool = LinkingTool::default();

    tool.start_relink(&mut f.diagram, link, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap();
    assert_eq!(tool.mode(), Some(LinkingMode::Relink));
    assert_eq!(f.diagram.scene.temporary_count(), 1);
    assert_eq!(f.diagram.scene.port(f.b).unwrap().link_count(), 0);

    assert_eq!(
        tool.on_pointer_move(&mut f.diagram, OVER_C).unwrap(),
        Some(f.c)
    );
    assert_eq!(
        tool.on_pointer_up(&mut f.diagram, OVER_C).unwrap(),
        GestureOutcome::Relinked(link)
    );

    let relinked = f.diagram.scene.link(link).unwrap();
    assert_eq!(relinked.from_port(), Some(f.a));
    assert_eq!(relinked.to_port(), Some(f.c));
    assert_eq!(f.diagram.scene.temporary_count(), 0);
    assert_eq!(f.diagram.scene.port(f.c).unwrap().link_count(), 1);
    assert_eq!(f.diagram.history.undo_label(), Some("Relink"));

    assert!(f.diagram.undo().unwrap());
    assert_eq!(f.diagram.scene.link(link).unwrap().to_port(), Some(f.b));
    assert_eq!(f.diagram.scene.port(f.c).unwrap().link_count(), 0);
}

#[test]
fn test_relink_onto_original_port_changes_nothing() {
    let mut f = fixture();
    let link = existing_link(&mut f, LinkStyle::default());
    let mut tool = LinkingTool::default();

    tool.start_relink(&mut f.diagram, link, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap();
    assert_eq!(
        tool.on_pointer_up(&mut f.diagram, OVER_B).unwrap(),
        GestureOutcome::NoOp
    );
    assert_eq!(f.diagram.scene.link(link).unwrap().to_port(), Some(f.b));
    assert!(!f.diagram.history.can_undo());
}

#[test]
fn test_relink_regroups_link() {
    let mut f = fixture();
    let group = f
        .diagram
        .scene
        .add_node("group", Rect::new(-100.0, 150.0, 600.0, 200.0));
    let inner = f
        .diagram
        .scene
        .add_node_in(group, "D", Rect::new(0.0, 200.0, 60.0, 40.0))
        .unwrap();
    let d = f
        .diagram
        .scene
        .add_box_port(inner, BoxPort::new(10.0))
        .unwrap();
    let c_node = f.diagram.scene.port(f.c).unwrap().owner().unwrap();
    let e_node = f
        .diagram
        .scene
        .add_node_in(group, "E", Rect::new(300.0, 300.0, 60.0, 40.0))
        .unwrap();
    let e = f
        .diagram
        .scene
        .add_box_port(e_node, BoxPort::new(10.0))
        .unwrap();
    assert!(f.diagram.scene.node(c_node).unwrap().parent().is_none());

    let link = f
        .diagram
        .scene
        .add_link(Some(d), Some(f.b), LinkStyle::default())
        .unwrap();
    assert_eq!(f.diagram.scene.link(link).unwrap().parent(), None);

    let mut tool = LinkingTool::default();
    tool.start_relink(&mut f.diagram, link, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap();
    assert_eq!(
        tool.on_pointer_up(&mut f.diagram, Point::new(330.0, 320.0)).unwrap(),
        GestureOutcome::Relinked(link)
    );
    assert_eq!(f.diagram.scene.link(link).unwrap().to_port(), Some(e));
    assert_eq!(f.diagram.scene.link(link).unwrap().parent(), Some(group));

    f.diagram.undo().unwrap();
    assert_eq!(f.diagram.scene.link(link).unwrap().parent(), None);
    assert_eq!(f.diagram.scene.link(link).unwrap().to_port(), Some(f.b));
}

#[test]
fn test_movable_link_dropped_on_nothing_keeps_dangling_end() {
    let mut f = fixture();
    let link = existing_link(
        &mut f,
        LinkStyle {
            movable: true,
            ..LinkStyle::default()
        },
    );
    let mut tool = LinkingTool::default();

    tool.start_relink(&mut f.diagram, link, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap();
    assert_eq!(
        tool.on_pointer_up(&mut f.diagram, NOWHERE).unwrap(),
        GestureOutcome::Detached(link)
    );

    let detached = f.diagram.scene.link(link).unwrap();
    assert_eq!(detached.to_port(), None);
    assert_eq!(detached.end_point(LinkEnd::To), Some(NOWHERE));
    assert_eq!(f.diagram.scene.temporary_count(), 0);
    let dropped = detached.points().to_vec();

    f.diagram.undo().unwrap();
    assert_eq!(f.diagram.scene.link(link).unwrap().to_port(), Some(f.b));
    assert_eq!(
        f.diagram.scene.link(link).unwrap().end_point(LinkEnd::To),
        Some(Point::new(300.0, 20.0))
    );

    f.diagram.redo().unwrap();
    assert_eq!(f.diagram.scene.link(link).unwrap().to_port(), None);
    assert_eq!(f.diagram.scene.link(link).unwrap().points(), dropped.as_slice());
}

#[test]
fn test_cancel_relink_of_dangling_end_keeps_its_point() {
    let mut f = fixture();
    let link = existing_link(
        &mut f,
        LinkStyle {
            movable: true,
            ..LinkStyle::default()
        },
    );
    let mut tool = LinkingTool::default();
    tool.start_relink(&mut f.diagram, link, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap();
    tool.on_pointer_up(&mut f.diagram, NOWHERE).unwrap();
    let before = f.diagram.scene.link(link).unwrap().points().to_vec();

    tool.start_relink(&mut f.diagram, link, LinkEnd::To, NOWHERE)
        .unwrap();
    tool.on_pointer_move(&mut f.diagram, Point::new(700.0, 700.0))
        .unwrap();
    assert_eq!(tool.on_cancel(&mut f.diagram).unwrap(), GestureOutcome::Cancelled);

    let restored = f.diagram.scene.link(link).unwrap();
    assert_eq!(restored.to_port(), None);
    assert_eq!(restored.points(), before.as_slice());
    assert_eq!(restored.end_point(LinkEnd::To), Some(NOWHERE));
    assert!(!f.diagram.history.in_transaction());
    assert_eq!(f.diagram.history.undo_label(), Some("Relink"));
    f.diagram.undo().unwrap();
    assert!(!f.diagram.history.can_undo());
}

#[test]
fn test_deletable_link_dropped_on_nothing_is_deleted() {
    let mut f = fixture();
    let link = existing_link(&mut f, LinkStyle::default());
    let mut tool = LinkingTool::default();

    tool.start_relink(&mut f.diagram, link, LinkEnd::From, Point::new(30.0, 20.0))
        .unwrap();
    assert_eq!(tool.is_forward(), Some(false));
    assert_eq!(
        tool.on_pointer_up(&mut f.diagram, NOWHERE).unwrap(),
        GestureOutcome::Deleted(link)
    );
    assert!(f.diagram.scene.link(link).is_none());
    assert_eq!(f.diagram.scene.port(f.a).unwrap().link_count(), 0);
    assert_eq!(f.diagram.history.undo_label(), Some("Delete Link"));

    f.diagram.undo().unwrap();
    let restored = f.diagram.scene.link(link).unwrap();
    assert_eq!(restored.from_port(), Some(f.a));
    assert_eq!(restored.to_port(), Some(f.b));
}

#[test]
fn test_vetoed_deletion_cancels_gesture() {
    let mut f = fixture();
    let link = existing_link(&mut f, LinkStyle::default());
    f.diagram.events.subscribe_veto(EventFilter::All, |_| true);
    let mut tool = LinkingTool::default();

    tool.start_relink(&mut f.diagram, link, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap();
    assert_eq!(
        tool.on_pointer_up(&mut f.diagram, NOWHERE).unwrap(),
        GestureOutcome::Cancelled
    );
    assert_eq!(f.diagram.scene.link(link).unwrap().to_port(), Some(f.b));
    assert_eq!(f.diagram.scene.temporary_count(), 0);
    assert!(!f.diagram.history.can_undo());
    assert!(!f.diagram.history.in_transaction());
}

#[test]
fn test_fixed_link_dropped_on_nothing() {
    let fixed = LinkStyle {
        movable: false,
        deletable: false,
        ..LinkStyle::default()
    };

    // An end that was already dangling stays so.
    let mut f = fixture();
    let dangling = f.diagram.scene.add_link(Some(f.a), None, fixed).unwrap();
    let before = f.diagram.scene.link(dangling).unwrap().points().to_vec();
    let mut tool = LinkingTool::default();
    tool.start_relink(&mut f.diagram, dangling, LinkEnd::To, Point::new(200.0, 20.0))
        .unwrap();
    assert_eq!(
        tool.on_pointer_up(&mut f.diagram, NOWHERE).unwrap(),
        GestureOutcome::NoOp
    );
    assert_eq!(f.diagram.scene.link(dangling).unwrap().to_port(), None);
    assert_eq!(
        f.diagram.scene.link(dangling).unwrap().points(),
        before.as_slice()
    );
    assert!(!f.diagram.history.can_undo());

    // An attached end snaps back.
    let attached = existing_link(&mut f, fixed);
    tool.start_relink(&mut f.diagram, attached, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap();
    assert_eq!(
        tool.on_pointer_up(&mut f.diagram, NOWHERE).unwrap(),
        GestureOutcome::Cancelled
    );
    assert_eq!(f.diagram.scene.link(attached).unwrap().to_port(), Some(f.b));
    assert_eq!(f.diagram.scene.temporary_count(), 0);
}

#[test]
fn test_end_that_is_not_relinkable_cannot_be_grabbed() {
    let mut f = fixture();
    let link = existing_link(
        &mut f,
        LinkStyle {
            relinkable_to: false,
            ..LinkStyle::default()
        },
    );
    let mut tool = LinkingTool::default();

    let err = tool
        .start_relink(&mut f.diagram, link, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap_err();
    assert!(matches!(err, Error::Tool(ToolError::NotRelinkable { .. })));
    assert!(!f.diagram.history.in_transaction());
    assert!(tool
        .start_relink(&mut f.diagram, link, LinkEnd::From, Point::new(30.0, 20.0))
        .is_ok());
}

#[test]
fn test_cancel_relink_restores_link() {
    let mut f = fixture();
    let link = existing_link(&mut f, LinkStyle::default());
    let before = f.diagram.scene.link_path(link).unwrap().to_vec();
    let mut tool = LinkingTool::default();

    tool.start_relink(&mut f.diagram, link, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap();
    tool.on_pointer_move(&mut f.diagram, OVER_C).unwrap();
    assert_eq!(tool.on_cancel(&mut f.diagram).unwrap(), GestureOutcome::Cancelled);

    assert_eq!(f.diagram.scene.link(link).unwrap().to_port(), Some(f.b));
    assert_eq!(f.diagram.scene.link_path(link).unwrap(), before.as_slice());
    assert_eq!(f.diagram.scene.temporary_count(), 0);
    assert!(!f.diagram.history.can_undo());
    assert!(!f.diagram.history.in_transaction());
    assert_eq!(tool.on_cancel(&mut f.diagram).unwrap(), GestureOutcome::NoOp);
}

#[test]
fn test_preview_on_spread_port_matches_committed_link() {
    let mut diagram = Diagram::default();
    let scene = &mut diagram.scene;
    let a_node = scene.add_node("A", Rect::new(0.0, 0.0, 60.0, 40.0));
    let x_node = scene.add_node("X", Rect::new(0.0, 200.0, 60.0, 40.0));
    let b_node = scene.add_node("B", Rect::new(300.0, 0.0, 60.0, 100.0));
    let a = scene.add_box_port(a_node, BoxPort::new(10.0)).unwrap();
    let x = scene.add_box_port(x_node, BoxPort::new(10.0)).unwrap();
    let b = scene
        .add_box_port(b_node, BoxPort::new(10.0).with_spread(true))
        .unwrap();
    scene.add_link(Some(x), Some(b), LinkStyle::default()).unwrap();

    let over_b = Point::new(320.0, 50.0);
    let mut tool = LinkingTool::default();
    tool.start_new_link(&mut diagram, a, Point::new(30.0, 20.0))
        .unwrap();
    assert_eq!(tool.on_pointer_move(&mut diagram, over_b).unwrap(), Some(b));
    let preview = tool.temporary_link().unwrap();
    let preview_path = diagram.scene.link_path(preview).unwrap().to_vec();
    // Upper of two links on the west side of B.
    assert!((preview_path[1].y - 100.0 / 3.0).abs() < 1e-9);

    let outcome = tool.on_pointer_up(&mut diagram, over_b).unwrap();
    let GestureOutcome::Created(link) = outcome else {
        panic!("expected a new link, got {}", outcome);
    };
    assert_eq!(
        diagram.scene.link_path(link).unwrap(),
        preview_path.as_slice()
    );
}

#[test]
fn test_pointer_near_view_edge_autoscrolls() {
    let mut f = fixture();
    let mut tool = LinkingTool::default();

    tool.start_new_link(&mut f.diagram, f.a, Point::new(30.0, 20.0))
        .unwrap();
    tool.on_pointer_move(&mut f.diagram, Point::new(5.0, 300.0))
        .unwrap();
    assert!(f.diagram.viewport.is_autoscrolling());
    assert_eq!(f.diagram.viewport.pan_x(), 8.0);

    tool.on_pointer_move(&mut f.diagram, Point::new(400.0, 300.0))
        .unwrap();
    assert!(!f.diagram.viewport.is_autoscrolling());

    tool.on_pointer_move(&mut f.diagram, Point::new(5.0, 300.0))
        .unwrap();
    tool.on_cancel(&mut f.diagram).unwrap();
    assert!(!f.diagram.viewport.is_autoscrolling());
}

#[test]
fn test_gestures_publish_notifications() {
    let mut f = fixture();
    f.diagram.events = recording_bus();
    let mut tool = LinkingTool::default();

    tool.start_new_link(&mut f.diagram, f.a, Point::new(30.0, 20.0))
        .unwrap();
    let link = tool
        .on_pointer_up(&mut f.diagram, OVER_B)
        .unwrap()
        .link()
        .unwrap();

    tool.start_relink(&mut f.diagram, link, LinkEnd::To, Point::new(330.0, 20.0))
        .unwrap();
    tool.on_cancel(&mut f.diagram).unwrap();

    assert_eq!(
        f.diagram.events.history(),
        vec![
            DiagramEvent::LinkCreated {
                link,
                from: Some(f.a),
                to: Some(f.b),
            },
            DiagramEvent::TransactionCommitted {
                label: "New Link".to_string(),
            },
            DiagramEvent::TransactionAborted,
        ]
    );
}

#[test]
fn test_styled_new_links() {
    let mut f = fixture();
    let mut tool = LinkingTool::new(LinkStyle::orthogonal());
    assert!(tool.new_link_style().orthogonal);

    tool.start_new_link(&mut f.diagram, f.a, Point::new(30.0, 20.0))
        .unwrap();
    let link = tool
        .on_pointer_up(&mut f.diagram, OVER_C)
        .unwrap()
        .link()
        .unwrap();
    let created = f.diagram.scene.link(link).unwrap();
    assert!(created.is_orthogonal());
    assert_eq!(f.diagram.scene.link_path(link).unwrap().len(), 5);

    tool.set_new_link_style(LinkStyle::default());
    assert!(!tool.new_link_style().orthogonal);
}
