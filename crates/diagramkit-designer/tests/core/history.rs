use diagramkit_core::geometry::{Point, Rect};
use diagramkit_core::{LinkEnd, ObjectId};
use diagramkit_designer::{
    BoxPort, Diagram, HistoryTransaction, LinkStyle, Scene, SceneEdit, TransactionLog,
    UndoRedoManager,
};

fn two_ports(scene: &mut Scene) -> (ObjectId, ObjectId) {
    let a = scene.add_node("A", Rect::new(0.0, 0.0, 40.0, 40.0));
    let b = scene.add_node("B", Rect::new(200.0, 0.0, 40.0, 40.0));
    (
        scene.add_box_port(a, BoxPort::new(10.0)).unwrap(),
        scene.add_box_port(b, BoxPort::new(10.0)).unwrap(),
    )
}

fn reparent(link: u64) -> SceneEdit {
    SceneEdit::Reparent {
        link: ObjectId(link),
        previous: None,
        current: None,
    }
}

#[test]
fn test_inverse_swaps_states() {
    let edit = SceneEdit::Reconnect {
        link: ObjectId(7),
        end: LinkEnd::To,
        previous: Some(ObjectId(1)),
        current: Some(ObjectId(2)),
    };
    assert_eq!(
        edit.inverse(),
        SceneEdit::Reconnect {
            link: ObjectId(7),
            end: LinkEnd::To,
            previous: Some(ObjectId(2)),
            current: Some(ObjectId(1)),
        }
    );
    assert_eq!(edit.inverse().inverse(), edit);
}

#[test]
fn test_reshape_moves_dangling_end_and_back() {
    let mut scene = Scene::default();
    let (a, _) = two_ports(&mut scene);
    let link = scene.add_link(Some(a), None, LinkStyle::default()).unwrap();
    let before = scene.link(link).unwrap().points().to_vec();
    let dropped = Point::new(120.0, 300.0);
    let edit = SceneEdit::Reshape {
        link,
        previous: before.clone(),
        current: vec![before[0], dropped],
    };

    edit.apply(&mut scene).unwrap();
    assert_eq!(scene.link(link).unwrap().end_point(LinkEnd::To), Some(dropped));
    edit.inverse().apply(&mut scene).unwrap();
    assert_eq!(scene.link(link).unwrap().points(), before.as_slice());
    assert_eq!(edit.description(), format!("Reshape link {}", link));
}

#[test]
fn test_record_outside_transaction_commits_alone() {
    let mut history = UndoRedoManager::default();
    history.record(reparent(3));
    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.undo_label(), Some("Regroup link #3"));
    assert!(!history.in_transaction());
}

#[test]
fn test_transaction_groups_edits() {
    let mut history = UndoRedoManager::default();
    history.begin();
    history.record(reparent(1));
    history.record(reparent(2));
    assert_eq!(history.undo_depth(), 0);
    assert!(history.commit("Regroup"));

    let transaction = history.undo().unwrap();
    assert_eq!(transaction.label, "Regroup");
    assert_eq!(transaction.edits.len(), 2);
    assert!(history.can_redo());
    assert!(!history.can_undo());
}

#[test]
fn test_empty_transaction_is_dropped() {
    let mut history = UndoRedoManager::default();
    history.begin();
    assert!(!history.commit("Nothing"));
    assert!(!history.can_undo());
    assert!(!history.commit("Nothing"));
}

#[test]
fn test_nested_begin_continues_open_transaction() {
    let mut history = UndoRedoManager::default();
    history.begin();
    history.record(reparent(1));
    history.begin();
    history.record(reparent(2));
    assert!(history.commit("Both"));
    assert_eq!(history.undo_depth(), 1);
    assert_eq!(history.undo().unwrap().edits.len(), 2);
}

#[test]
fn test_abort_returns_edits_oldest_first() {
    let mut history = UndoRedoManager::default();
    history.begin();
    history.record(reparent(1));
    history.record(reparent(2));
    assert_eq!(history.abort(), vec![reparent(1), reparent(2)]);
    assert!(!history.in_transaction());
    assert!(!history.can_undo());
    assert!(history.abort().is_empty());
}

#[test]
fn test_depth_is_bounded_and_new_edits_clear_redo() {
    let mut history = UndoRedoManager::new(2);
    for link in 1..=3 {
        history.record(reparent(link));
    }
    assert_eq!(history.undo_depth(), 2);
    assert_eq!(history.undo_label(), Some("Regroup link #3"));

    history.undo();
    assert_eq!(history.redo_depth(), 1);
    history.record(reparent(4));
    assert_eq!(history.redo_depth(), 0);

    history.clear();
    assert_eq!(history.undo_depth(), 0);
}

#[test]
fn test_transaction_replays_on_scene() {
    let mut scene = Scene::default();
    let (a, b) = two_ports(&mut scene);
    let link = scene.add_link(Some(a), Some(b), LinkStyle::default()).unwrap();
    let added = scene.link(link).unwrap().clone();

    let mut transaction = HistoryTransaction::new("Add");
    transaction.edits.push(SceneEdit::AddLink(added));
    transaction.edits.push(SceneEdit::Reconnect {
        link,
        end: LinkEnd::To,
        previous: Some(b),
        current: None,
    });
    scene.set_link_port(link, LinkEnd::To, None).unwrap();

    transaction.undo(&mut scene).unwrap();
    assert!(scene.link(link).is_none());
    assert_eq!(scene.port(b).unwrap().link_count(), 0);

    transaction.redo(&mut scene).unwrap();
    assert_eq!(scene.link(link).unwrap().to_port(), None);
    assert_eq!(scene.port(a).unwrap().link_count(), 1);
    assert_eq!(scene.port(b).unwrap().link_count(), 0);
}

#[test]
fn test_diagram_abort_rolls_back_recorded_edits() {
    let mut diagram = Diagram::default();
    let (a, b) = two_ports(&mut diagram.scene);

    diagram.begin_transaction();
    let link = diagram.add_link(Some(a), Some(b), LinkStyle::default()).unwrap();
    diagram.reconnect(link, LinkEnd::To, None).unwrap();
    diagram.abort_transaction().unwrap();

    assert!(diagram.scene.link(link).is_none());
    assert_eq!(diagram.scene.port(a).unwrap().link_count(), 0);
    assert!(!diagram.history.can_undo());
}

#[test]
fn test_diagram_undo_redo() {
    let mut diagram = Diagram::default();
    let (a, b) = two_ports(&mut diagram.scene);

    assert!(!diagram.undo().unwrap());
    let link = diagram.add_link(Some(a), Some(b), LinkStyle::default()).unwrap();
    assert!(diagram.delete_link(link).unwrap());
    assert_eq!(diagram.history.undo_depth(), 2);

    assert!(diagram.undo().unwrap());
    assert!(diagram.scene.link(link).is_some());
    assert!(diagram.undo().unwrap());
    assert!(diagram.scene.link(link).is_none());
    assert!(diagram.redo().unwrap());
    assert_eq!(diagram.scene.link(link).unwrap().from_port(), Some(a));
    assert!(diagram.history.can_redo());
}
