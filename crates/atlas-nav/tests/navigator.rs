//! Navigator behavior against the in-memory catalog

use atlas_cache::{CacheConfig, CatalogCache};
use atlas_client::{CachedCatalog, CatalogError};
use atlas_model::{DiagramId, EnvironmentId, Graph};
use atlas_nav::{
    CanvasEvent, Level, LocationHint, MemoryLocation, NavError, NavOutcome, Navigator,
    NavigatorConfig, Phase, SaveOutcome,
};
use atlas_test_utils::{
    child, container, diagram, diagram_with_nodes, edge, environment, node, workspace, FakeCatalog,
    Op,
};
use atlas_tree::MoveTarget;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

fn catalog() -> Arc<FakeCatalog> {
    Arc::new(
        FakeCatalog::new()
            .with_environment(environment("e1", "Prod", ""))
            .with_environment(environment("e2", "Staging", "non-prod"))
            .with_diagram("e1", diagram("d1", "Core Network", "net"))
            .with_diagram("e1", diagram("d2", "Billing", ""))
            .with_diagram("e2", diagram("d3", "Edge", "")),
    )
}

fn navigator(fake: &Arc<FakeCatalog>) -> (Navigator, Arc<MemoryLocation>) {
    let cached = CachedCatalog::new(fake.clone(), CatalogCache::new(CacheConfig::default()));
    let sink = Arc::new(MemoryLocation::new());
    let nav = Navigator::new(workspace(), cached, sink.clone(), NavigatorConfig::default());
    (nav, sink)
}

fn env(id: &str) -> EnvironmentId {
    EnvironmentId::new(id)
}

fn dia(id: &str) -> DiagramId {
    DiagramId::new(id)
}

#[tokio::test]
async fn initial_load_selects_first_environment_and_diagram() {
    let fake = catalog();
    let (nav, sink) = navigator(&fake);

    assert_eq!(nav.load(None).await.unwrap(), NavOutcome::Committed);

    let state = nav.snapshot();
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.selected_environment_id, Some(env("e1")));
    assert_eq!(state.diagrams.len(), 2);
    assert_eq!(state.selected_diagram_id, Some(dia("d1")));
    assert_eq!(state.current_diagram.map(|d| d.id), Some(dia("d1")));
    assert_eq!(state.environment_tree.count_items(), 2);
    assert!(!state.in_flight);
    assert_eq!(
        sink.current().as_deref(),
        Some("/workspaces/ws-test/diagrams/d1?environmentId=e1&env=prod&diagram=core-network")
    );
}

#[tokio::test]
async fn load_follows_location_hints() {
    let fake = catalog();

    let (nav, _) = navigator(&fake);
    let by_id = LocationHint::parse("/workspaces/ws-test/diagrams/d3?environmentId=e2");
    nav.load(Some(&by_id)).await.unwrap();
    assert_eq!(nav.snapshot().location_pair(), (Some(env("e2")), Some(dia("d3"))));

    let (nav, _) = navigator(&fake);
    let by_slug = LocationHint::parse("/workspaces/ws-test/diagrams?env=prod&diagram=billing");
    nav.load(Some(&by_slug)).await.unwrap();
    assert_eq!(nav.snapshot().location_pair(), (Some(env("e1")), Some(dia("d2"))));
}

#[tokio::test]
async fn empty_workspace_settles_ready_without_selection() {
    let fake = Arc::new(FakeCatalog::new());
    let (nav, sink) = navigator(&fake);

    nav.load(None).await.unwrap();

    let state = nav.snapshot();
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.location_pair(), (None, None));
    assert!(sink.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_navigation_is_dropped_while_first_is_in_flight() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();
    fake.delay_environment("e2", Duration::from_millis(200));

    let e2 = env("e2");
    let (first, second) = tokio::join!(nav.select_environment(&e2), async {
        sleep(Duration::from_millis(10)).await;
        let during = nav.snapshot();
        assert!(during.in_flight);
        assert_eq!(during.selected_environment_id, Some(env("e1")));
        assert_eq!(during.diagrams.len(), 2);
        nav.select_environment(&env("e1")).await
    });

    assert_eq!(first.unwrap(), NavOutcome::Committed);
    assert_eq!(second.unwrap(), NavOutcome::Dropped);

    let state = nav.snapshot();
    assert_eq!(state.selected_environment_id, Some(env("e2")));
    let ids: Vec<_> = state.diagrams.iter().map(|d| d.id.clone()).collect();
    assert_eq!(ids, vec![dia("d3")]);
    assert_eq!(state.current_diagram.map(|d| d.id), Some(dia("d3")));
    assert!(!nav.is_busy());
}

#[tokio::test]
async fn diagram_list_failure_keeps_environment_selected() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();
    let mut notes = nav.notifications();
    fake.fail(Op::ListDiagrams, CatalogError::Network("connection reset".into()));

    let result = nav.select_environment(&env("e2")).await;
    assert!(matches!(result, Err(NavError::Catalog(CatalogError::Network(_)))));

    let state = nav.snapshot();
    assert_eq!(state.selected_environment_id, Some(env("e2")));
    assert!(state.diagrams.is_empty());
    assert!(state.current_diagram.is_none());
    assert_eq!(state.phase, Phase::Error);
    assert!(state.last_error.is_some());
    assert!(!state.in_flight);

    let note = notes.try_recv().unwrap();
    assert_eq!(note.level, Level::Error);

    fake.clear_failure(Op::ListDiagrams);
    nav.select_environment(&env("e2")).await.unwrap();
    assert_eq!(nav.snapshot().phase, Phase::Ready);
    assert!(nav.snapshot().last_error.is_none());
}

#[tokio::test(start_paused = true)]
async fn loading_indicator_has_a_minimum_duration() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);

    nav.load(None).await.unwrap();
    assert!(nav.snapshot().loading);

    sleep(Duration::from_millis(299)).await;
    assert!(nav.snapshot().loading);

    sleep(Duration::from_millis(2)).await;
    assert!(!nav.snapshot().loading);
}

#[tokio::test(start_paused = true)]
async fn slow_loads_clear_the_indicator_immediately() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    fake.delay_environment("e1", Duration::from_millis(400));

    nav.load(None).await.unwrap();
    assert!(!nav.snapshot().loading);
}

#[tokio::test(start_paused = true)]
async fn teardown_discards_late_results_and_cancels_the_timer() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();
    fake.delay_environment("e2", Duration::from_millis(200));

    let e2 = env("e2");
    let (outcome, ()) = tokio::join!(nav.select_environment(&e2), async {
        sleep(Duration::from_millis(50)).await;
        nav.teardown();
    });
    assert_eq!(outcome.unwrap(), NavOutcome::Discarded);

    let frozen = nav.snapshot();
    assert_eq!(frozen.selected_environment_id, Some(env("e1")));

    sleep(Duration::from_secs(1)).await;
    assert_eq!(nav.snapshot(), frozen);
    assert!(!nav.is_alive());
}

#[tokio::test]
async fn location_is_not_rewritten_for_the_displayed_pair() {
    let fake = catalog();
    let (nav, sink) = navigator(&fake);
    nav.load(None).await.unwrap();
    assert_eq!(sink.writes().len(), 1);

    nav.select_diagram(&dia("d1")).await.unwrap();
    assert_eq!(sink.writes().len(), 1);

    sink.display((Some(env("e1")), Some(dia("d2"))));
    nav.select_diagram(&dia("d2")).await.unwrap();
    assert_eq!(sink.writes().len(), 1);

    nav.select_diagram(&dia("d1")).await.unwrap();
    assert_eq!(sink.writes().len(), 2);
}

#[tokio::test]
async fn selecting_a_diagram_remembers_the_previous_one() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();

    nav.select_diagram(&dia("d2")).await.unwrap();
    let state = nav.snapshot();
    assert_eq!(state.selected_diagram_id, Some(dia("d2")));
    assert_eq!(state.previous_diagram_id, Some(dia("d1")));

    nav.select_diagram(&dia("d2")).await.unwrap();
    assert_eq!(nav.snapshot().previous_diagram_id, Some(dia("d1")));
}

#[tokio::test]
async fn switching_environment_forgets_the_previous_diagram() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();
    nav.select_diagram(&dia("d2")).await.unwrap();
    assert_eq!(nav.snapshot().previous_diagram_id, Some(dia("d1")));

    nav.select_environment(&env("e2")).await.unwrap();
    let state = nav.snapshot();
    assert_eq!(state.selected_environment_id, Some(env("e2")));
    assert!(state.previous_diagram_id.is_none());
}

#[tokio::test]
async fn reload_bypasses_cache_and_keeps_selection() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();
    nav.select_diagram(&dia("d2")).await.unwrap();

    nav.reload().await.unwrap();

    assert_eq!(fake.count(Op::ListEnvironments), 2);
    assert_eq!(nav.snapshot().location_pair(), (Some(env("e1")), Some(dia("d2"))));
}

#[tokio::test(start_paused = true)]
async fn group_resizes_are_debounced_through_the_listener() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    let nav = Arc::new(nav);
    nav.load(None).await.unwrap();
    let listener = nav.spawn_event_listener();

    let resized = |x: f64| CanvasEvent::GroupResized {
        diagram_id: dia("d1"),
        nodes: vec![node("n1", x, 0.0)],
    };

    assert!(nav.events().publish(resized(1.0)));
    assert!(!nav.events().publish(resized(2.0)));
    sleep(Duration::from_millis(10)).await;
    let current = nav.snapshot().current_diagram.unwrap();
    assert_eq!(current.nodes.len(), 1);
    assert_eq!(current.nodes[0].position.x, 1.0);

    sleep(Duration::from_millis(1000)).await;
    assert!(nav.events().publish(resized(3.0)));
    sleep(Duration::from_millis(10)).await;
    assert_eq!(nav.snapshot().current_diagram.unwrap().nodes[0].position.x, 3.0);

    nav.teardown();
    listener.abort();
}

#[tokio::test]
async fn moving_to_the_current_folder_sends_nothing() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();
    fake.clear_calls();

    let moved = nav.move_diagram(&dia("d1"), &MoveTarget::folder("net")).await.unwrap();
    assert!(!moved);
    assert_eq!(fake.count(Op::UpdateDiagram), 0);

    let moved = nav.move_diagram(&dia("d1"), &MoveTarget::Root).await.unwrap();
    assert!(moved);
    assert_eq!(fake.count(Op::UpdateDiagram), 1);

    let state = nav.snapshot();
    assert!(state.selected_diagram().unwrap().path.is_root());
    assert!(state.current_diagram.unwrap().path.is_root());
    assert!(state.diagram_tree.folder_paths().is_empty());
}

#[tokio::test]
async fn environments_move_between_folders() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();

    assert!(nav
        .move_environment(&env("e1"), &MoveTarget::folder("prod/eu"))
        .await
        .unwrap());

    let state = nav.snapshot();
    let moved = state.environments.iter().find(|e| e.id == env("e1")).unwrap();
    assert_eq!(moved.path.to_string(), "prod/eu");
}

#[tokio::test]
async fn failed_move_leaves_the_tree_alone() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();
    let before = nav.snapshot();
    fake.fail(Op::UpdateDiagram, CatalogError::Network("timeout".into()));

    let result = nav.move_diagram(&dia("d2"), &MoveTarget::folder("net")).await;
    assert!(matches!(result, Err(NavError::Move(_))));
    assert_eq!(nav.snapshot().diagram_tree, before.diagram_tree);
}

#[tokio::test]
async fn diagrams_with_nodes_cannot_be_deleted() {
    let fake = Arc::new(
        FakeCatalog::new()
            .with_environment(environment("e1", "Prod", ""))
            .with_diagram("e1", diagram_with_nodes("d9", "Full", vec![node("n1", 0.0, 0.0)]))
            .with_diagram("e1", diagram("d2", "Empty", "")),
    );
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();

    let refused = nav.delete_diagram(&dia("d9")).await;
    assert!(matches!(refused, Err(NavError::Validation(_))));
    assert_eq!(fake.count(Op::DeleteDiagram), 0);

    nav.delete_diagram(&dia("d2")).await.unwrap();
    let state = nav.snapshot();
    assert_eq!(state.diagrams.len(), 1);
    assert_eq!(state.selected_diagram_id, Some(dia("d9")));
}

#[tokio::test]
async fn deleting_the_open_diagram_opens_the_next() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();

    nav.delete_diagram(&dia("d1")).await.unwrap();

    let state = nav.snapshot();
    assert_eq!(state.selected_diagram_id, Some(dia("d2")));
    assert_eq!(state.current_diagram.map(|d| d.id), Some(dia("d2")));
    assert!(state.previous_diagram_id.is_none());
}

#[tokio::test]
async fn deleting_the_selected_environment_selects_the_next() {
    let fake = catalog();
    let (nav, sink) = navigator(&fake);
    nav.load(None).await.unwrap();

    nav.delete_environment(&env("e1")).await.unwrap();

    let state = nav.snapshot();
    assert_eq!(state.phase, Phase::Ready);
    assert_eq!(state.location_pair(), (Some(env("e2")), Some(dia("d3"))));
    assert_eq!(state.environments.len(), 1);
    assert!(sink.current().unwrap().contains("environmentId=e2"));
}

#[tokio::test]
async fn created_diagram_becomes_the_open_one() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();

    let created = nav.create_diagram("Edge Router", "ops", None).await.unwrap();

    let state = nav.snapshot();
    assert_eq!(state.diagrams.len(), 3);
    assert_eq!(state.selected_diagram_id, Some(created.id.clone()));
    assert_eq!(state.previous_diagram_id, Some(dia("d1")));
    assert_eq!(created.path.to_string(), "ops");

    let blank = nav.create_diagram("   ", "", None).await;
    assert!(matches!(blank, Err(NavError::Catalog(CatalogError::Validation(_)))));
    assert_eq!(fake.count(Op::CreateDiagram), 1);
}

#[tokio::test]
async fn created_environment_appears_in_the_list() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();

    let created = nav
        .create_environment("Dev", "non-prod", Some("scratch space"))
        .await
        .unwrap();

    let state = nav.snapshot();
    assert_eq!(state.environments.len(), 3);
    assert!(state.environments.iter().any(|e| e.id == created.id));
    assert_eq!(state.selected_environment_id, Some(env("e1")));
}

#[tokio::test]
async fn save_persists_group_layout() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();

    let graph = Graph {
        nodes: vec![container("g1", 0.0, 0.0), child("c1", "g1", 10.0, 20.0)],
        edges: vec![edge("g1", "c1")],
        ..Graph::default()
    };
    let SaveOutcome::Saved(layout) = nav.save_graph(graph).await.unwrap() else {
        panic!("expected a save");
    };
    assert_eq!(layout.groups["g1"].child_ids, vec!["c1".to_string()]);

    let stored = fake.stored_diagrams("e1");
    let saved = stored.iter().find(|d| d.id == dia("d1")).unwrap();
    assert!(saved.node_groups.as_ref().unwrap().contains_key("g1"));
    assert_eq!(saved.edges, vec![edge("g1", "c1")]);
    assert_eq!(nav.snapshot().current_diagram.unwrap().nodes.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn save_and_changes_wait_for_navigation() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);
    nav.load(None).await.unwrap();
    fake.delay_environment("e2", Duration::from_millis(200));

    let e2 = env("e2");
    let (_, (save, create)) = tokio::join!(nav.select_environment(&e2), async {
        sleep(Duration::from_millis(10)).await;
        (
            nav.save_graph(Graph::default()).await,
            nav.create_environment("Dev", "", None).await,
        )
    });

    assert_eq!(save.unwrap(), SaveOutcome::Skipped);
    assert!(matches!(create, Err(NavError::Busy)));
    assert_eq!(fake.count(Op::UpdateDiagram), 0);
    assert_eq!(fake.count(Op::CreateEnvironment), 0);
}

#[tokio::test]
async fn diagram_operations_need_an_environment() {
    let fake = catalog();
    let (nav, _) = navigator(&fake);

    assert!(matches!(
        nav.select_diagram(&dia("d1")).await,
        Err(NavError::NoEnvironmentSelected)
    ));
    assert!(matches!(
        nav.save_graph(Graph::default()).await,
        Err(NavError::NoEnvironmentSelected)
    ));
    assert!(matches!(
        nav.create_diagram("X", "", None).await,
        Err(NavError::NoEnvironmentSelected)
    ));
}
