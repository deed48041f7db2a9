//! Editor service driven through bridge events, observed through the command log

use std::collections::BTreeSet;

use rstest::{fixture, rstest};

use topotree::application::{CommandLog, EventOutcome, RenderCommand, TopologyEditor};
use topotree::config::{MoveSettings, Settings};
use topotree::domain::{
    ActionAvailability, DomainError, HierarchyViolation, MoveDecision, MovePolicy, NodeId,
    NodeKind, ParentRef, Selection,
};

struct Fixture {
    editor: TopologyEditor<CommandLog>,
    c1: NodeId,
    c2: NodeId,
    s1: NodeId,
    s2: NodeId,
    b1: NodeId,
}

fn created(outcome: EventOutcome) -> NodeId {
    outcome.created().expect("node created")
}

fn build(settings: &Settings) -> Fixture {
    let mut editor = TopologyEditor::new(CommandLog::new(), settings);
    let c1 = created(editor.add_cluster());
    let c2 = created(editor.add_cluster());
    editor.on_select(c1);
    let s1 = created(editor.on_request_add());
    let s2 = created(editor.on_request_add());
    editor.on_select(s1);
    let b1 = created(editor.on_request_add());
    editor.on_deselect();
    editor.bridge_mut().drain();
    Fixture {
        editor,
        c1,
        c2,
        s1,
        s2,
        b1,
    }
}

/// c1 { s1 { b1 }, s2 }, c2
#[fixture]
fn topology() -> Fixture {
    build(&Settings::default())
}

fn hierarchy_settings() -> Settings {
    Settings {
        moves: MoveSettings {
            policy: MovePolicy::Hierarchy,
        },
        ..Settings::default()
    }
}

// ============================================================
// Selection and action availability
// ============================================================

#[test]
fn given_new_editor_when_started_then_all_actions_disabled() {
    let editor = TopologyEditor::new(CommandLog::new(), &Settings::default());

    assert_eq!(editor.selection(), Selection::NoSelection);
    assert_eq!(
        editor.bridge().commands(),
        &[RenderCommand::SetActionAvailability(
            ActionAvailability::DISABLED
        )]
    );
}

#[rstest]
fn given_server_and_bucket_when_selecting_then_action_table_follows_kind(mut topology: Fixture) {
    topology.editor.on_select(topology.s1);
    let server = topology.editor.availability();
    assert!(server.rename && server.delete && server.add);
    assert_eq!(server.add_label, Some("Add bucket"));

    topology.editor.on_select(topology.b1);
    let bucket = topology.editor.availability();
    assert!(bucket.rename && bucket.delete);
    assert!(!bucket.add);
    assert_eq!(bucket.add_label, None);

    topology.editor.on_select(topology.c1);
    assert_eq!(topology.editor.availability().add_label, Some("Add server"));

    assert_eq!(
        topology.editor.bridge().last(),
        Some(&RenderCommand::SetActionAvailability(
            topology.editor.availability()
        ))
    );
}

#[rstest]
fn given_unknown_node_when_selecting_then_rejected_and_selection_kept(mut topology: Fixture) {
    topology.editor.on_select(topology.s1);

    let outcome = topology.editor.on_select(NodeId::new(999));

    assert_eq!(
        outcome,
        EventOutcome::Rejected(DomainError::NotFound(NodeId::new(999)))
    );
    assert_eq!(topology.editor.selection().id(), Some(topology.s1));
}

#[rstest]
fn given_bucket_selected_when_requesting_add_then_ignored(mut topology: Fixture) {
    topology.editor.on_select(topology.b1);
    topology.editor.bridge_mut().drain();
    let before = topology.editor.snapshot();

    assert_eq!(topology.editor.on_request_add(), EventOutcome::Ignored);
    assert_eq!(topology.editor.snapshot(), before);
    assert!(topology.editor.bridge().commands().is_empty());
}

#[rstest]
fn given_nothing_selected_when_requesting_rename_or_delete_then_ignored(mut topology: Fixture) {
    assert_eq!(
        topology.editor.on_request_rename("x"),
        EventOutcome::Ignored
    );
    assert_eq!(topology.editor.on_request_delete(), EventOutcome::Ignored);
    assert_eq!(topology.editor.tree().len(), 5);
}

// ============================================================
// Add, rename and delete
// ============================================================

#[rstest]
fn given_server_selected_when_adding_then_bucket_created_with_placeholder(mut topology: Fixture) {
    topology.editor.on_select(topology.s2);
    topology.editor.bridge_mut().drain();

    let id = created(topology.editor.on_request_add());

    assert_eq!(topology.editor.tree().kind_of(id).unwrap(), NodeKind::Bucket);
    assert_eq!(topology.editor.tree().get(id).unwrap().label, "New bucket");
    assert_eq!(topology.editor.selection().id(), Some(topology.s2));
    assert_eq!(
        topology.editor.bridge().commands(),
        &[
            RenderCommand::Create {
                parent: Some(topology.s2),
                node: id,
                kind: NodeKind::Bucket
            },
            RenderCommand::Rename {
                node: id,
                label: "New bucket".into()
            },
        ]
    );
}

#[test]
fn given_custom_placeholders_when_adding_cluster_then_uses_configured_label() {
    let mut settings = Settings::default();
    settings.labels.cluster = "dc".into();
    let mut editor = TopologyEditor::new(CommandLog::new(), &settings);

    let id = created(editor.add_cluster());

    assert_eq!(editor.tree().get(id).unwrap().label, "dc");
}

#[rstest]
fn given_selection_when_renaming_then_label_changes_and_is_rendered(mut topology: Fixture) {
    topology.editor.on_select(topology.b1);

    assert!(topology.editor.on_request_rename("sessions").is_applied());

    assert_eq!(
        topology.editor.tree().get(topology.b1).unwrap().label,
        "sessions"
    );
    assert_eq!(
        topology.editor.bridge().last(),
        Some(&RenderCommand::Rename {
            node: topology.b1,
            label: "sessions".into()
        })
    );
}

#[rstest]
fn given_server_with_bucket_when_deleting_then_subtree_removed_and_parent_selected(
    mut topology: Fixture,
) {
    topology.editor.on_select(topology.s1);
    topology.editor.bridge_mut().drain();

    assert!(topology.editor.on_request_delete().is_applied());

    assert!(!topology.editor.tree().contains(topology.s1));
    assert!(!topology.editor.tree().contains(topology.b1));
    assert_eq!(topology.editor.selection().id(), Some(topology.c1));
    assert_eq!(
        topology.editor.bridge().commands()[0],
        RenderCommand::Remove {
            nodes: BTreeSet::from([topology.s1, topology.b1])
        }
    );
}

#[rstest]
fn given_second_sibling_when_deleting_then_preceding_sibling_selected(mut topology: Fixture) {
    topology.editor.on_select(topology.s2);

    topology.editor.on_request_delete();

    assert_eq!(
        topology.editor.selection(),
        Selection::selected(topology.s1, NodeKind::Server)
    );
}

#[test]
fn given_sole_cluster_when_deleting_then_all_actions_disabled() {
    let mut editor = TopologyEditor::new(CommandLog::new(), &Settings::default());
    let c1 = created(editor.add_cluster());
    editor.on_select(c1);

    editor.on_request_delete();

    assert!(editor.tree().is_empty());
    assert_eq!(editor.selection(), Selection::NoSelection);
    assert!(editor.availability().is_all_disabled());
    assert_eq!(
        editor.bridge().last(),
        Some(&RenderCommand::SetActionAvailability(
            ActionAvailability::DISABLED
        ))
    );
}

#[rstest]
fn given_first_of_two_clusters_when_deleting_then_no_selection_and_all_disabled(
    mut topology: Fixture,
) {
    topology.editor.on_select(topology.c1);

    assert!(topology.editor.on_request_delete().is_applied());

    assert!(topology.editor.tree().contains(topology.c2));
    assert_eq!(topology.editor.tree().top_level(), &[topology.c2]);
    assert_eq!(topology.editor.selection(), Selection::NoSelection);
    assert!(topology.editor.availability().is_all_disabled());
    assert_eq!(
        topology.editor.bridge().last(),
        Some(&RenderCommand::SetActionAvailability(
            ActionAvailability::DISABLED
        ))
    );
}

#[rstest]
fn given_partial_deletion_when_selecting_remaining_node_then_actions_reenabled(
    mut topology: Fixture,
) {
    topology.editor.on_select(topology.c2);
    topology.editor.on_request_delete();
    topology.editor.on_select(topology.s2);

    let availability = topology.editor.availability();
    assert!(availability.rename && availability.delete && availability.add);
    assert_eq!(availability.add_label, Some("Add bucket"));
}

// ============================================================
// Drag and drop
// ============================================================

#[rstest]
fn given_server_when_dropping_on_other_cluster_then_rejected_even_though_kind_fits(
    mut topology: Fixture,
) {
    let before = topology.editor.snapshot();
    let target = Some(ParentRef::Node(topology.c2));

    assert_eq!(
        topology.editor.on_move_attempt(topology.s1, target, 0),
        MoveDecision::Reject
    );
    assert_eq!(
        topology.editor.on_move_dropped(topology.s1, target, 0),
        EventOutcome::Rejected(DomainError::InvalidHierarchy(
            HierarchyViolation::CrossParentMove { node: topology.s1 }
        ))
    );
    assert_eq!(topology.editor.snapshot(), before);
}

#[rstest]
fn given_commit_without_attempt_when_crossing_parents_then_still_rejected(mut topology: Fixture) {
    let outcome = topology
        .editor
        .on_move_committed(topology.b1, ParentRef::Node(topology.s2), 0);

    assert!(matches!(outcome, EventOutcome::Rejected(_)));
    assert_eq!(
        topology.editor.tree().parent_of(topology.b1).unwrap(),
        Some(topology.s1)
    );
}

#[rstest]
fn given_siblings_when_reordering_then_accepted_and_reorder_rendered(mut topology: Fixture) {
    let target = Some(ParentRef::Node(topology.c1));
    assert!(topology
        .editor
        .on_move_attempt(topology.s2, target, 0)
        .is_accept());

    assert!(topology.editor.on_move_dropped(topology.s2, target, 0).is_applied());

    assert_eq!(
        topology
            .editor
            .tree()
            .children_of(ParentRef::Node(topology.c1))
            .unwrap(),
        &[topology.s2, topology.s1]
    );
    assert_eq!(
        topology.editor.bridge().commands(),
        &[RenderCommand::Reorder {
            parent: Some(topology.c1),
            children: vec![topology.s2, topology.s1]
        }]
    );
}

#[rstest]
fn given_clusters_when_reordering_at_top_level_then_accepted(mut topology: Fixture) {
    assert!(topology
        .editor
        .on_move_dropped(topology.c2, Some(ParentRef::Container), 0)
        .is_applied());
    assert_eq!(topology.editor.tree().top_level(), &[topology.c2, topology.c1]);
}

#[rstest]
fn given_drop_outside_any_parent_when_attempting_then_rejected(mut topology: Fixture) {
    assert_eq!(
        topology.editor.on_move_attempt(topology.s1, None, 0),
        MoveDecision::Reject
    );
    assert!(matches!(
        topology.editor.on_move_dropped(topology.s1, None, 0),
        EventOutcome::Rejected(DomainError::InvalidHierarchy(
            HierarchyViolation::MissingTarget
        ))
    ));
}

#[rstest]
fn given_unknown_node_when_attempting_move_then_rejected(topology: Fixture) {
    assert_eq!(
        topology
            .editor
            .on_move_attempt(NodeId::new(77), Some(ParentRef::Container), 0),
        MoveDecision::Reject
    );
}

#[test]
fn given_hierarchy_policy_when_moving_server_between_clusters_then_reparented() {
    let mut topology = build(&hierarchy_settings());
    let target = ParentRef::Node(topology.c2);

    assert!(topology
        .editor
        .on_move_dropped(topology.s1, Some(target), 0)
        .is_applied());

    let tree = topology.editor.tree();
    assert_eq!(tree.parent_of(topology.s1).unwrap(), Some(topology.c2));
    assert_eq!(tree.parent_of(topology.b1).unwrap(), Some(topology.s1));
    tree.check_invariants().unwrap();
    assert_eq!(
        topology.editor.bridge().commands(),
        &[
            RenderCommand::Reorder {
                parent: Some(topology.c1),
                children: vec![topology.s2]
            },
            RenderCommand::Reorder {
                parent: Some(topology.c2),
                children: vec![topology.s1]
            },
        ]
    );
}

#[test]
fn given_hierarchy_policy_when_moving_bucket_under_cluster_then_rejected() {
    let mut topology = build(&hierarchy_settings());

    let outcome =
        topology
            .editor
            .on_move_dropped(topology.b1, Some(ParentRef::Node(topology.c2)), 0);

    assert_eq!(
        outcome,
        EventOutcome::Rejected(DomainError::InvalidHierarchy(
            HierarchyViolation::IncompatibleParent {
                child: NodeKind::Bucket,
                parent: NodeKind::Cluster
            }
        ))
    );
}
