//! Cache-first reads and invalidate-on-write through `CachedCatalog`

use atlas_cache::{CacheConfig, CatalogCache};
use atlas_client::{
    CachedCatalog, Catalog, CatalogError, DiagramPatch, EnvironmentPatch, NewDiagram,
    NewEnvironment,
};
use atlas_model::{DiagramId, EnvironmentId, ItemPath};
use atlas_test_utils::{diagram, environment, workspace, FakeCatalog, Op};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn setup() -> (Arc<FakeCatalog>, CachedCatalog) {
    let fake = Arc::new(
        FakeCatalog::new()
            .with_environment(environment("e1", "Prod", ""))
            .with_environment(environment("e2", "Staging", "non-prod"))
            .with_diagram("e1", diagram("d1", "Network", "ops/net"))
            .with_diagram("e1", diagram("d2", "Billing", "")),
    );
    let cached = CachedCatalog::new(fake.clone(), CatalogCache::new(CacheConfig::default()));
    (fake, cached)
}

#[tokio::test]
async fn repeated_reads_hit_the_cache() {
    let (fake, cached) = setup();
    let ws = workspace();
    let env = EnvironmentId::new("e1");

    for _ in 0..3 {
        assert_eq!(cached.list_environments(&ws).await.unwrap().len(), 2);
        assert_eq!(cached.list_diagrams(&ws, &env).await.unwrap().len(), 2);
        cached
            .get_diagram(&ws, &env, &DiagramId::new("d1"))
            .await
            .unwrap();
    }

    assert_eq!(fake.count(Op::ListEnvironments), 1);
    assert_eq!(fake.count(Op::ListDiagrams), 1);
    assert_eq!(fake.count(Op::GetDiagram), 1);
}

#[tokio::test]
async fn force_refresh_bypasses_the_cache() {
    let (fake, cached) = setup();
    let ws = workspace();

    cached.environments(&ws, false).await.unwrap();
    cached.environments(&ws, true).await.unwrap();

    assert_eq!(fake.count(Op::ListEnvironments), 2);
}

#[tokio::test(start_paused = true)]
async fn expired_entries_are_refetched() {
    let (fake, cached) = setup();
    let ws = workspace();
    let env = EnvironmentId::new("e1");

    cached.list_diagrams(&ws, &env).await.unwrap();
    tokio::time::advance(Duration::from_secs(5 * 60)).await;
    cached.list_diagrams(&ws, &env).await.unwrap();

    assert_eq!(fake.count(Op::ListDiagrams), 2);
}

#[tokio::test]
async fn create_invalidates_before_next_read() {
    let (fake, cached) = setup();
    let ws = workspace();
    let env = EnvironmentId::new("e1");

    cached.list_diagrams(&ws, &env).await.unwrap();
    cached
        .create_diagram(&ws, &NewDiagram::new(env.clone(), "Edge", "ops"))
        .await
        .unwrap();
    let after = cached.list_diagrams(&ws, &env).await.unwrap();

    assert_eq!(after.len(), 3);
    assert_eq!(fake.count(Op::ListDiagrams), 2);

    cached.list_environments(&ws).await.unwrap();
    cached
        .create_environment(&ws, &NewEnvironment::new("Dev", ""))
        .await
        .unwrap();
    assert_eq!(cached.list_environments(&ws).await.unwrap().len(), 3);
}

#[tokio::test]
async fn update_invalidates_list_and_detail() {
    let (fake, cached) = setup();
    let ws = workspace();
    let env = EnvironmentId::new("e1");
    let id = DiagramId::new("d1");

    cached.list_diagrams(&ws, &env).await.unwrap();
    cached.get_diagram(&ws, &env, &id).await.unwrap();

    cached
        .update_diagram(&ws, &env, &id, &DiagramPatch::move_to(&ItemPath::root()))
        .await
        .unwrap();

    let detail = cached.get_diagram(&ws, &env, &id).await.unwrap();
    assert!(detail.path.is_root());
    assert_eq!(fake.count(Op::GetDiagram), 2);
    assert_eq!(fake.count(Op::ListDiagrams), 1);
    cached.list_diagrams(&ws, &env).await.unwrap();
    assert_eq!(fake.count(Op::ListDiagrams), 2);
}

#[tokio::test]
async fn failed_write_leaves_cache_alone() {
    let (fake, cached) = setup();
    let ws = workspace();
    let env = EnvironmentId::new("e1");

    cached.list_diagrams(&ws, &env).await.unwrap();
    fake.fail(Op::UpdateDiagram, CatalogError::Network("reset".into()));

    let result = cached
        .update_diagram(&ws, &env, &DiagramId::new("d1"), &DiagramPatch::default())
        .await;
    assert!(result.unwrap_err().is_transient());

    cached.list_diagrams(&ws, &env).await.unwrap();
    assert_eq!(fake.count(Op::ListDiagrams), 1);
}

#[tokio::test]
async fn delete_environment_drops_its_entries() {
    let (fake, cached) = setup();
    let ws = workspace();
    let env = EnvironmentId::new("e1");

    cached.list_environments(&ws).await.unwrap();
    cached
        .get_diagram(&ws, &env, &DiagramId::new("d1"))
        .await
        .unwrap();

    cached.delete_environment(&ws, &env).await.unwrap();

    assert_eq!(cached.list_environments(&ws).await.unwrap().len(), 1);
    let missing = cached.get_diagram(&ws, &env, &DiagramId::new("d1")).await;
    assert!(matches!(missing, Err(CatalogError::NotFound { .. })));
    assert_eq!(fake.count(Op::ListEnvironments), 2);
}

#[tokio::test]
async fn environment_moves_reach_the_backend_as_null_path() {
    let (fake, cached) = setup();
    let ws = workspace();

    let moved = cached
        .update_environment(
            &ws,
            &EnvironmentId::new("e2"),
            &EnvironmentPatch::move_to(&ItemPath::root()),
        )
        .await
        .unwrap();

    assert!(moved.path.is_root());
    let calls = fake.calls();
    let Some(atlas_test_utils::Call::UpdateEnvironment(_, patch)) = calls.last() else {
        panic!("expected an update call");
    };
    assert_eq!(patch.path, Some(None));
}
