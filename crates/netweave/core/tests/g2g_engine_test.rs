// Integration tests for the G2G compilation pipeline

use netweave_core::config::EngineConfig;
use netweave_core::g2g::{G2gEngine, G2gError};
use netweave_core::model::{AcrossIntent, AssignmentKind, BrandRef, GroupContext, InterfaceRef, LayerGroupDefaults, Netclass, ProcessState, RelationBrand, RelationIntent, RuleArea};
use netweave_core::store::{BrandStore, GroupContextStore, MemoryStore, PendingProcessIndicator, SlotRowStore};
use std::sync::Arc;

fn netclass(id: &str, interface_id: &str, name: &str, channel: &str, segment: &str) -> Netclass {
    let mut nc = Netclass::new("p1", interface_id, name);
    nc.id = id.to_string();
    nc.channel = channel.to_string();
    nc.segment = segment.to_string();
    nc
}

async fn seed_project(store: &MemoryStore, netclasses: Vec<Netclass>) {
    store
        .upsert_interface(
            "p1",
            InterfaceRef {
                id: "if_pcie".to_string(),
                name: "PCIE".to_string(),
            },
        )
        .await;
    store.add_rule_area("p1", RuleArea::new("p1", "Default area")).await;
    store
        .set_layer_group_defaults(
            "p1",
            LayerGroupDefaults {
                clearance_default_set_id: "lgs_default".to_string(),
                golden_set_id: "lgs_golden".to_string(),
            },
        )
        .await;
    store.add_netclasses("p1", netclasses).await;
}

async fn engine_over(store: &Arc<MemoryStore>) -> G2gEngine {
    let engine = G2gEngine::with_store(store.clone(), EngineConfig::default());
    engine.ensure_grid("p1").await.unwrap();
    engine
}

#[tokio::test]
async fn test_to_all_pairs_every_member_with_all_column() {
    let store = Arc::new(MemoryStore::new());
    seed_project(&store, vec![netclass("A", "if_pcie", "A", "", ""), netclass("B", "if_pcie", "B", "", "")]).await;
    let engine = engine_over(&store).await;

    let mut group = GroupContext::skeleton("p1", "if_pcie", "", "");
    group.to_all = RelationIntent::enabled();

    let report = engine.compile_and_apply("p1", vec![group]).await.unwrap();
    assert_eq!(report.groups_processed, 1);
    assert_eq!(report.pairings_claimed, 2);
    assert_eq!(report.slots_applied, 2);
    assert_eq!(report.brands_created, 1);
    assert_eq!(report.pairings_unmatched, 0);

    let brands = store.brands("p1").await.unwrap();
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].name, "PCIE_TOALL");
    assert_eq!(brands[0].layer_group_set_id, "lgs_default");

    let rows = store.rows_by_project("p1").await.unwrap();
    assert_eq!(rows.len(), 2);
    for row in &rows {
        let all = row.all_slot().unwrap();
        assert_eq!(all.brand_id, brands[0].id);
        assert_eq!(all.kind, AssignmentKind::Auto);
    }

    // The persisted group carries the final brand id
    let groups = store.groups_by_project("p1").await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].to_all.brand, BrandRef::Id(brands[0].id.clone()));

    let pending = store.current("p1").await.unwrap().unwrap();
    assert_eq!(pending.state, ProcessState::Completed);
}

#[tokio::test]
async fn test_recompilation_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    seed_project(
        &store,
        vec![
            netclass("X", "if_pcie", "X", "", ""),
            netclass("Y", "if_pcie", "Y", "", ""),
            netclass("Z", "if_pcie", "Z", "", ""),
        ],
    )
    .await;
    let engine = engine_over(&store).await;

    let mut group = GroupContext::skeleton("p1", "if_pcie", "", "");
    group.within = RelationIntent::enabled();
    group.intraclass = RelationIntent::enabled();

    let first = engine.compile_and_apply("p1", vec![group]).await.unwrap();
    assert!(first.rows_changed > 0);
    assert_eq!(first.brands_created, 2);

    let rows_after_first = store.rows_by_project("p1").await.unwrap();
    let groups_after_first = store.groups_by_project("p1").await.unwrap();

    // Re-submit the persisted groups untouched
    let second = engine.compile_and_apply("p1", groups_after_first.clone()).await.unwrap();
    assert_eq!(second.slots_applied, 0);
    assert_eq!(second.slots_reset, 0);
    assert_eq!(second.rows_changed, 0);
    assert_eq!(second.brands_created, 0);
    assert!(second.brands_reused >= 2);

    assert_eq!(store.rows_by_project("p1").await.unwrap(), rows_after_first);
    assert_eq!(store.groups_by_project("p1").await.unwrap(), groups_after_first);
}

#[tokio::test]
async fn test_within_self_pairs_subordinate_to_intraclass() {
    let store = Arc::new(MemoryStore::new());
    seed_project(
        &store,
        vec![
            netclass("X", "if_pcie", "X", "", ""),
            netclass("Y", "if_pcie", "Y", "", ""),
            netclass("Z", "if_pcie", "Z", "", ""),
        ],
    )
    .await;
    let engine = engine_over(&store).await;

    let mut group = GroupContext::skeleton("p1", "if_pcie", "", "");
    group.within = RelationIntent::enabled();
    group.intraclass = RelationIntent::enabled();

    let report = engine.compile_and_apply("p1", vec![group]).await.unwrap();
    // X__X, X__Y, X__Z, Y__Y, Y__Z, Z__Z; self-pairs claimed by intraclass first
    assert_eq!(report.pairings_claimed, 6);
    assert_eq!(report.duplicate_pairs_skipped, 3);

    let brands = store.brands("p1").await.unwrap();
    let toself = brands.iter().find(|b| b.name == "PCIE_TOSELF").unwrap();
    let within = brands.iter().find(|b| b.name == "PCIE_WITHIN").unwrap();

    let rows = store.rows_by_project("p1").await.unwrap();
    for row in &rows {
        for slot in row.slots.iter().filter(|s| s.is_assigned()) {
            if slot.target_netclass_id == row.netclass_id {
                assert_eq!(slot.brand_id, toself.id, "self-pair on row {}", row.netclass_id);
            } else {
                assert_eq!(slot.brand_id, within.id, "cross-pair on row {}", row.netclass_id);
            }
        }
    }

    // Each unordered pair is written exactly once across the whole grid
    let assigned: usize = rows.iter().map(|r| r.slots.iter().filter(|s| s.is_assigned()).count()).sum();
    assert_eq!(assigned, 6);
}

#[tokio::test]
async fn test_segment_group_outranks_root_for_shared_pairs() {
    let store = Arc::new(MemoryStore::new());
    seed_project(
        &store,
        vec![
            netclass("S1", "if_pcie", "S1", "", "CTRL"),
            netclass("S2", "if_pcie", "S2", "", "CTRL"),
            netclass("N", "if_pcie", "N", "", ""),
        ],
    )
    .await;
    let engine = engine_over(&store).await;

    let mut root = GroupContext::skeleton("p1", "if_pcie", "", "");
    root.within = RelationIntent::enabled();
    let mut segment = GroupContext::skeleton("p1", "if_pcie", "", "ctrl");
    segment.within = RelationIntent::enabled();

    // Root submitted first; the segment bucket still wins
    engine.compile_and_apply("p1", vec![root, segment]).await.unwrap();

    let brands = store.brands("p1").await.unwrap();
    let segment_brand = brands.iter().find(|b| b.name == "PCIE_ctrl_WITHIN").unwrap();
    let root_brand = brands.iter().find(|b| b.name == "PCIE_WITHIN").unwrap();

    let rows = store.rows_by_project("p1").await.unwrap();
    let s1_row = rows.iter().find(|r| r.netclass_id == "S1").unwrap();
    assert_eq!(s1_row.slot_for_target("S2").unwrap().brand_id, segment_brand.id);
    assert_eq!(s1_row.slot_for_target("S1").unwrap().brand_id, segment_brand.id);

    // Pairs only the root group covers still belong to the root brand
    let n_row = rows.iter().find(|r| r.netclass_id == "N").unwrap();
    assert_eq!(n_row.slot_for_target("S1").unwrap().brand_id, root_brand.id);
    assert_eq!(n_row.slot_for_target("N").unwrap().brand_id, root_brand.id);
}

#[tokio::test]
async fn test_across_pairs_use_persisted_target_group() {
    let store = Arc::new(MemoryStore::new());
    seed_project(
        &store,
        vec![
            netclass("A1", "if_pcie", "A1", "1", ""),
            netclass("A2", "if_pcie", "A2", "1", ""),
            netclass("B1", "if_pcie", "B1", "2", ""),
            netclass("B2", "if_pcie", "B2", "2", ""),
        ],
    )
    .await;
    let engine = engine_over(&store).await;

    let target = GroupContext::skeleton("p1", "if_pcie", "2", "");
    store.upsert_groups("p1", vec![target.clone()]).await.unwrap();

    let mut source = GroupContext::skeleton("p1", "if_pcie", "1", "");
    source.across.push(AcrossIntent::targeting(vec![target.id.clone()]));

    let report = engine.compile_and_apply("p1", vec![source]).await.unwrap();
    assert_eq!(report.pairings_claimed, 4);

    let brands = store.brands("p1").await.unwrap();
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].name, "PCIE1_ACROSS");

    let rows = store.rows_by_project("p1").await.unwrap();
    let a1_row = rows.iter().find(|r| r.netclass_id == "A1").unwrap();
    assert_eq!(a1_row.slot_for_target("B1").unwrap().brand_id, brands[0].id);
    assert_eq!(a1_row.slot_for_target("B2").unwrap().brand_id, brands[0].id);

    // Pairs apply in the claimed direction only
    let b1_row = rows.iter().find(|r| r.netclass_id == "B1").unwrap();
    assert!(!b1_row.slot_for_target("A1").unwrap().is_assigned());
}

#[tokio::test]
async fn test_manual_slots_survive_rule_withdrawal() {
    let store = Arc::new(MemoryStore::new());
    seed_project(&store, vec![netclass("A", "if_pcie", "A", "", ""), netclass("B", "if_pcie", "B", "", "")]).await;
    let engine = engine_over(&store).await;

    // A hand-entered assignment predating any compilation
    let manual_brand = RelationBrand::new("p1", "USER_RULE", "lgs_default");
    store.replace_brands("p1", vec![manual_brand.clone()]).await.unwrap();
    let mut rows = store.rows_by_project("p1").await.unwrap();
    for row in &mut rows {
        if row.netclass_id == "A" {
            let slot = row.slot_for_target_mut("B").unwrap();
            slot.brand_id = manual_brand.id.clone();
            slot.kind = AssignmentKind::Manual;
        }
    }
    store.upsert_rows("p1", rows).await.unwrap();

    let mut group = GroupContext::skeleton("p1", "if_pcie", "", "");
    group.to_all = RelationIntent::enabled();
    engine.compile_and_apply("p1", vec![group]).await.unwrap();

    // Withdraw the rule and recompile
    let mut groups = store.groups_by_project("p1").await.unwrap();
    groups[0].to_all.enabled = false;
    let report = engine.compile_and_apply("p1", groups).await.unwrap();
    assert_eq!(report.slots_reset, 2);
    assert_eq!(report.brands_dropped, 1);

    let rows = store.rows_by_project("p1").await.unwrap();
    for row in &rows {
        assert!(!row.all_slot().unwrap().is_assigned(), "stale auto assignment on {}", row.netclass_id);
        if row.netclass_id == "A" {
            let slot = row.slot_for_target("B").unwrap();
            assert_eq!(slot.brand_id, manual_brand.id);
            assert_eq!(slot.kind, AssignmentKind::Manual);
        }
    }

    // The auto brand lost every reference; the manual one survives
    let brands = store.brands("p1").await.unwrap();
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].id, manual_brand.id);

    // The withdrawn intent's dangling pointer was cleaned
    let groups = store.groups_by_project("p1").await.unwrap();
    assert!(groups[0].to_all.brand.is_unset());
    assert!(!groups[0].to_all.enabled);
}

#[tokio::test]
async fn test_unreferenced_preexisting_brand_is_collected() {
    let store = Arc::new(MemoryStore::new());
    seed_project(&store, vec![netclass("A", "if_pcie", "A", "", ""), netclass("B", "if_pcie", "B", "", "")]).await;
    let engine = engine_over(&store).await;

    let orphan = RelationBrand::new("p1", "ORPHAN", "lgs_default");
    store.replace_brands("p1", vec![orphan]).await.unwrap();

    let mut group = GroupContext::skeleton("p1", "if_pcie", "", "");
    group.to_all = RelationIntent::enabled();
    let report = engine.compile_and_apply("p1", vec![group]).await.unwrap();
    assert_eq!(report.brands_dropped, 1);

    let names: Vec<String> = store.brands("p1").await.unwrap().into_iter().map(|b| b.name).collect();
    assert_eq!(names, vec!["PCIE_TOALL".to_string()]);
}

#[tokio::test]
async fn test_corrupted_all_slot_aborts_before_any_write() {
    let store = Arc::new(MemoryStore::new());
    seed_project(&store, vec![netclass("A", "if_pcie", "A", "", ""), netclass("B", "if_pcie", "B", "", "")]).await;
    let engine = engine_over(&store).await;

    let mut rows = store.rows_by_project("p1").await.unwrap();
    rows[0].slots[0].target_netclass_id = "A".to_string();
    store.upsert_rows("p1", rows.clone()).await.unwrap();

    let mut group = GroupContext::skeleton("p1", "if_pcie", "", "");
    group.to_all = RelationIntent::enabled();
    let err = engine.compile_and_apply("p1", vec![group]).await.unwrap_err();
    assert!(matches!(err, G2gError::DataCorrectness { .. }));

    // No rows, groups or brands were persisted by the aborted run
    assert_eq!(store.rows_by_project("p1").await.unwrap(), rows);
    assert!(store.groups_by_project("p1").await.unwrap().is_empty());
    assert!(store.brands("p1").await.unwrap().is_empty());

    let pending = store.current("p1").await.unwrap().unwrap();
    assert_eq!(pending.state, ProcessState::Failed);
    assert!(pending.message.contains("ALL slot"));
}

#[tokio::test]
async fn test_custom_brand_names_and_reuse_across_groups() {
    let store = Arc::new(MemoryStore::new());
    seed_project(
        &store,
        vec![
            netclass("A1", "if_pcie", "A1", "1", ""),
            netclass("A2", "if_pcie", "A2", "1", ""),
            netclass("B1", "if_pcie", "B1", "2", ""),
            netclass("B2", "if_pcie", "B2", "2", ""),
        ],
    )
    .await;
    let engine = engine_over(&store).await;

    // Both channel groups name the same aspirational brand
    let mut g1 = GroupContext::skeleton("p1", "if_pcie", "1", "");
    g1.within = RelationIntent::with_brand(BrandRef::Name("SHARED_LANES".to_string()));
    let mut g2 = GroupContext::skeleton("p1", "if_pcie", "2", "");
    g2.within = RelationIntent::with_brand(BrandRef::Name("shared_lanes".to_string()));

    let report = engine.compile_and_apply("p1", vec![g1, g2]).await.unwrap();
    assert_eq!(report.brands_created, 1);

    let brands = store.brands("p1").await.unwrap();
    assert_eq!(brands.len(), 1);
    assert_eq!(brands[0].name, "SHARED_LANES");

    // Both groups now reference the same brand by id
    let groups = store.groups_by_project("p1").await.unwrap();
    for group in &groups {
        assert_eq!(group.within.brand, BrandRef::Id(brands[0].id.clone()));
    }
}
