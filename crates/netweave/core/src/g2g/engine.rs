// Netweave
// Copyright (C) 2025 Netweave EDA

// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.

// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! Engine driver
//!
//! Coordinates one full compilation run: validate inputs, compile pairings,
//! materialize slots, finalize brands, persist. Runs are full recomputes and
//! idempotent given unchanged inputs; callers serialize runs per project via
//! the advisory pending-process indicator. Partial writes before an aborting
//! error are not rolled back, a clean re-run converges to the same result.
//!
//! The driver also owns the layout synchronization and deletion cascade
//! commands that keep netclasses, group contexts and the slot grid in
//! lockstep when surrounding entities change.

use crate::audit::diff_rows;
use crate::config::EngineConfig;
use crate::g2g::error::{G2gError, G2gResult};
use crate::g2g::expansion::{InterfaceLayout, expand_interface_layout};
use crate::g2g::finalize::{clean_group_references, commit_brands, normalize_groups};
use crate::g2g::materialize::materialize;
use crate::g2g::pairing::{PairingCompiler, PairingSet};
use crate::g2g::registry::BrandAllocator;
use crate::g2g::resolve::{filter_members, relevant_netclasses};
use crate::model::{GroupContext, Netclass, RelationBrand, Slot, SlotRow};
use crate::store::{BrandStore, ChangeTrackingSink, GroupContextStore, InterfaceStore, MemoryStore, NetclassStore, PendingProcessIndicator, RuleAreaRegistry, SlotRowStore};
use metrics::counter;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Operation label carried by the pending-process indicator during a run
pub const OP_G2G_COMPILE: &str = "g2g_compile";

/// Outcome summary of one compilation run
#[derive(Debug, Clone, Serialize)]
pub struct CompileReport {
    /// Project the run operated on
    pub project_id: String,

    /// Groups that contributed at least one enabled intent
    pub groups_processed: usize,

    /// Pairings claimed across all groups
    pub pairings_claimed: usize,

    /// Pairs skipped because their key was already claimed
    pub duplicate_pairs_skipped: usize,

    /// Pairings that matched no slot in either direction
    pub pairings_unmatched: usize,

    /// Slots written by the apply phase
    pub slots_applied: usize,

    /// Stale Auto slots cleared by the reset phase
    pub slots_reset: usize,

    /// Matrix rows that differ from the pre-run baseline
    pub rows_changed: usize,

    /// Brands newly created by this run
    pub brands_created: usize,

    /// Existing brands reused by this run
    pub brands_reused: usize,

    /// Brands dropped for having zero slot references
    pub brands_dropped: usize,
}

/// Outcome of a grid synchronization pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct GridSyncReport {
    /// Rows created for new (rule area, netclass) combinations
    pub rows_created: usize,

    /// Rows whose slot population was rebuilt
    pub rows_updated: usize,

    /// Rows deleted because their rule area or netclass vanished
    pub rows_deleted: usize,
}

/// Outcome of an interface layout synchronization
#[derive(Debug, Clone, Serialize)]
pub struct LayoutSyncReport {
    /// Netclasses in the interface after expansion
    pub netclasses: usize,

    /// Group contexts newly created for the layout
    pub groups_created: usize,

    /// Persisted group contexts kept, with their intents intact
    pub groups_kept: usize,

    /// Persisted group contexts deleted because their layout key vanished
    pub groups_deleted: usize,

    /// Grid changes performed after the layout was written
    pub grid: GridSyncReport,
}

/// Outcome of a deletion cascade command
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleanupReport {
    /// Group contexts rewritten by the cleanup
    pub groups_updated: usize,

    /// Group contexts deleted by the cleanup
    pub groups_deleted: usize,

    /// Matrix rows rewritten by the cleanup
    pub rows_updated: usize,

    /// Matrix rows deleted by the cleanup
    pub rows_deleted: usize,
}

/// The group-to-group constraint propagation engine
pub struct G2gEngine {
    netclasses: Arc<dyn NetclassStore>,
    interfaces: Arc<dyn InterfaceStore>,
    rule_areas: Arc<dyn RuleAreaRegistry>,
    brands: Arc<dyn BrandStore>,
    rows: Arc<dyn SlotRowStore>,
    groups: Arc<dyn GroupContextStore>,
    changes: Arc<dyn ChangeTrackingSink>,
    indicator: Arc<dyn PendingProcessIndicator>,
    config: EngineConfig,
}

impl G2gEngine {
    /// Create an engine over explicit collaborator contracts
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        netclasses: Arc<dyn NetclassStore>,
        interfaces: Arc<dyn InterfaceStore>,
        rule_areas: Arc<dyn RuleAreaRegistry>,
        brands: Arc<dyn BrandStore>,
        rows: Arc<dyn SlotRowStore>,
        groups: Arc<dyn GroupContextStore>,
        changes: Arc<dyn ChangeTrackingSink>,
        indicator: Arc<dyn PendingProcessIndicator>,
        config: EngineConfig,
    ) -> Self {
        Self {
            netclasses,
            interfaces,
            rule_areas,
            brands,
            rows,
            groups,
            changes,
            indicator,
            config,
        }
    }

    /// Create an engine with every contract backed by one in-memory store
    pub fn with_store(store: Arc<MemoryStore>, config: EngineConfig) -> Self {
        Self {
            netclasses: store.clone(),
            interfaces: store.clone(),
            rule_areas: store.clone(),
            brands: store.clone(),
            rows: store.clone(),
            groups: store.clone(),
            changes: store.clone(),
            indicator: store,
            config,
        }
    }

    /// Compile and apply the incoming group contexts for a project.
    ///
    /// Sets the pending-process indicator for the duration of the run and
    /// records the failure message on it when the run aborts. Indicator
    /// failures are logged and never fail the run themselves.
    pub async fn compile_and_apply(&self, project_id: &str, incoming: Vec<GroupContext>) -> G2gResult<CompileReport> {
        info!("Starting G2G compile for project {} with {} incoming groups", project_id, incoming.len());
        counter!("g2g_runs_started", 1);

        if let Err(e) = self.indicator.mark_running(project_id, OP_G2G_COMPILE).await {
            warn!("Failed to set pending indicator for project {}: {}", project_id, e);
        }

        match self.run_compilation(project_id, incoming).await {
            Ok(report) => {
                if let Err(e) = self.indicator.mark_completed(project_id, OP_G2G_COMPILE).await {
                    warn!("Failed to clear pending indicator for project {}: {}", project_id, e);
                }
                counter!("g2g_runs_completed", 1);
                info!(
                    "G2G compile for project {} complete: {} groups, {} pairings ({} deduped, {} unmatched), {} slots applied, {} reset, brands {} created / {} reused / {} dropped",
                    project_id,
                    report.groups_processed,
                    report.pairings_claimed,
                    report.duplicate_pairs_skipped,
                    report.pairings_unmatched,
                    report.slots_applied,
                    report.slots_reset,
                    report.brands_created,
                    report.brands_reused,
                    report.brands_dropped
                );
                Ok(report)
            }
            Err(e) => {
                error!("G2G compile for project {} failed ({}): {}", project_id, e.error_type(), e);
                counter!("g2g_runs_failed", 1);
                if let Err(ind) = self.indicator.mark_failed(project_id, OP_G2G_COMPILE, &e.to_string()).await {
                    warn!("Failed to record failure on pending indicator for project {}: {}", project_id, ind);
                }
                Err(e)
            }
        }
    }

    async fn run_compilation(&self, project_id: &str, mut incoming: Vec<GroupContext>) -> G2gResult<CompileReport> {
        if project_id.is_empty() {
            return Err(G2gError::validation("Project id is empty"));
        }

        // Batched reads up front; compilation itself is a pure in-memory transform
        let (netclasses, interfaces, existing_brands, defaults, baseline_rows, persisted_groups) = tokio::try_join!(
            self.netclasses.netclasses_by_project(project_id),
            self.interfaces.interfaces_by_project(project_id),
            self.brands.brands(project_id),
            self.rule_areas.layer_group_defaults(project_id),
            self.rows.rows_by_project(project_id),
            self.groups.groups_by_project(project_id),
        )?;

        let interface_names: HashMap<String, String> = interfaces.iter().map(|i| (i.id.clone(), i.name.clone())).collect();
        validate_incoming(project_id, &incoming, &interface_names, &persisted_groups)?;

        let persisted_by_id: HashMap<String, GroupContext> = persisted_groups.iter().map(|g| (g.id.clone(), g.clone())).collect();

        let mut allocator = BrandAllocator::new(existing_brands, defaults);
        let mut pairings = PairingSet::new();
        let compiler = PairingCompiler::new(&netclasses, &interface_names, &persisted_by_id);
        let groups_processed = compiler.compile(&mut incoming, &mut allocator, &mut pairings)?;

        let grid = materialize(&baseline_rows, &pairings)?;

        let brands_created = allocator.created();
        let brands_reused = allocator.reused();
        let (existing, staged) = allocator.into_parts();
        let commit = commit_brands(&grid.rows, existing, staged);
        validate_brand_names(&commit.brands)?;

        // Persisted groups not re-submitted keep their stored state; every
        // group is then normalized against the committed brand set
        let incoming_ids: HashSet<String> = incoming.iter().map(|g| g.id.clone()).collect();
        let mut final_groups: Vec<GroupContext> = persisted_groups.into_iter().filter(|g| !incoming_ids.contains(&g.id)).collect();
        final_groups.extend(incoming);
        normalize_groups(&mut final_groups, &commit.brands);

        self.brands.replace_brands(project_id, commit.brands.clone()).await?;
        self.persist_rows_chunked(project_id, grid.changed_rows.clone()).await?;
        self.groups.upsert_groups(project_id, final_groups).await?;

        if self.config.change_tracking_enabled && !grid.changed_rows.is_empty() {
            let row_changes = diff_rows(&baseline_rows, &grid.changed_rows);
            if let Err(e) = self.changes.record_row_changes(project_id, row_changes).await {
                warn!("Change tracking for project {} failed: {}", project_id, e);
            }
        }

        counter!("g2g_pairings_claimed", pairings.len() as u64);
        counter!("g2g_pairings_deduped", pairings.skipped() as u64);
        counter!("g2g_slots_applied", grid.slots_applied as u64);
        counter!("g2g_slots_reset", grid.slots_reset as u64);
        counter!("g2g_brands_created", brands_created as u64);
        counter!("g2g_brands_dropped", commit.dropped as u64);

        Ok(CompileReport {
            project_id: project_id.to_string(),
            groups_processed,
            pairings_claimed: pairings.len(),
            duplicate_pairs_skipped: pairings.skipped(),
            pairings_unmatched: grid.pairings_dropped,
            slots_applied: grid.slots_applied,
            slots_reset: grid.slots_reset,
            rows_changed: grid.changed_rows.len(),
            brands_created,
            brands_reused,
            brands_dropped: commit.dropped,
        })
    }

    /// Resolve the netclasses a group context governs. Used by other
    /// constraint subsystems to scope channel switches and deletions.
    pub async fn resolve_group_netclasses(&self, project_id: &str, group_id: &str) -> G2gResult<Vec<Netclass>> {
        let groups = self.groups.groups_by_project(project_id).await?;
        let group = groups.into_iter().find(|g| g.id == group_id).ok_or_else(|| G2gError::unknown("group context", group_id))?;
        let netclasses = self.netclasses.netclasses_by_project(project_id).await?;
        relevant_netclasses(&group, &netclasses)
    }

    /// Bring the slot grid into lockstep with the current rule areas and
    /// netclasses: one row per (rule area, netclass), each carrying the ALL
    /// slot first and one slot per project netclass sorted by name. Existing
    /// assignments are carried over by target id; slots for vanished
    /// netclasses are dropped and rows for vanished combinations deleted.
    pub async fn ensure_grid(&self, project_id: &str) -> G2gResult<GridSyncReport> {
        let (rule_areas, netclasses, rows) = tokio::try_join!(
            self.rule_areas.rule_areas(project_id),
            self.netclasses.netclasses_by_project(project_id),
            self.rows.rows_by_project(project_id),
        )?;

        let mut targets: Vec<&Netclass> = netclasses.iter().collect();
        targets.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

        let mut existing: HashMap<(String, String), SlotRow> = rows.into_iter().map(|r| ((r.rule_area_id.clone(), r.netclass_id.clone()), r)).collect();

        let mut upserts = Vec::new();
        let mut rows_created = 0usize;
        let mut rows_updated = 0usize;

        for area in &rule_areas {
            for netclass in &netclasses {
                match existing.remove(&(area.id.clone(), netclass.id.clone())) {
                    Some(row) => {
                        let rebuilt = rebuild_row(&row, &targets);
                        if rebuilt != row {
                            rows_updated += 1;
                            upserts.push(rebuilt);
                        }
                    }
                    None => {
                        let mut row = SlotRow::new(project_id, area.id.clone(), netclass.id.clone());
                        for target in &targets {
                            row.slots.push(Slot::for_target(target.id.clone(), target.name.clone()));
                        }
                        rows_created += 1;
                        upserts.push(row);
                    }
                }
            }
        }

        // Leftovers reference a vanished rule area or netclass
        let deleted_ids: Vec<String> = existing.into_values().map(|r| r.id).collect();
        let rows_deleted = deleted_ids.len();

        self.persist_rows_chunked(project_id, upserts).await?;
        if !deleted_ids.is_empty() {
            self.rows.delete_rows(project_id, &deleted_ids).await?;
        }

        info!(
            "Grid sync for project {}: {} rows created, {} updated, {} deleted",
            project_id, rows_created, rows_updated, rows_deleted
        );
        Ok(GridSyncReport {
            rows_created,
            rows_updated,
            rows_deleted,
        })
    }

    /// Establish or update an interface's channel/segment layout.
    ///
    /// Expands the base templates across the channel set, keeps persisted
    /// group contexts whose (channel, segment) combination survives so their
    /// relation intents are preserved, creates skeletons for new
    /// combinations, deletes the rest, and resynchronizes the grid.
    /// Netclasses whose derived name survives keep their identity, which
    /// keeps their matrix rows and any Manual slots intact.
    pub async fn sync_interface_layout(
        &self,
        project_id: &str,
        interface_id: &str,
        channel_spec: &str,
        base_netclasses: Vec<Netclass>,
        fresh_identities: bool,
    ) -> G2gResult<LayoutSyncReport> {
        let interface = self
            .interfaces
            .interface_by_id(project_id, interface_id)
            .await?
            .ok_or_else(|| G2gError::unknown("interface", interface_id))?;

        let InterfaceLayout { mut netclasses, groups: skeletons } = expand_interface_layout(&interface, project_id, channel_spec, &base_netclasses, fresh_identities)?;

        let persisted_netclasses = self.netclasses.netclasses_by_interface(project_id, interface_id).await?;
        let ids_by_name: HashMap<&str, &str> = persisted_netclasses.iter().map(|n| (n.name.as_str(), n.id.as_str())).collect();
        for netclass in &mut netclasses {
            if let Some(id) = ids_by_name.get(netclass.name.as_str()) {
                netclass.id = id.to_string();
            }
        }

        let persisted_groups = self.groups.groups_by_interface(project_id, interface_id).await?;
        let mut persisted_by_key: HashMap<(String, String), GroupContext> = persisted_groups.into_iter().map(|g| (g.layout_key(), g)).collect();

        let mut created_groups = Vec::new();
        let mut groups_kept = 0usize;
        for skeleton in skeletons {
            if persisted_by_key.remove(&skeleton.layout_key()).is_some() {
                groups_kept += 1;
            } else {
                created_groups.push(skeleton);
            }
        }
        let deleted_group_ids: Vec<String> = persisted_by_key.into_values().map(|g| g.id).collect();

        self.netclasses.replace_interface_netclasses(project_id, interface_id, netclasses.clone()).await?;
        let groups_created = created_groups.len();
        if !created_groups.is_empty() {
            self.groups.upsert_groups(project_id, created_groups).await?;
        }
        let groups_deleted = deleted_group_ids.len();
        if !deleted_group_ids.is_empty() {
            self.groups.delete_groups(project_id, &deleted_group_ids).await?;
            let removed: HashSet<String> = deleted_group_ids.into_iter().collect();
            self.strip_across_targets(project_id, &removed).await?;
        }

        let grid = self.ensure_grid(project_id).await?;

        info!(
            "Layout sync for interface '{}' ({}): {} netclasses, {} groups created, {} kept, {} deleted",
            interface.name,
            interface_id,
            netclasses.len(),
            groups_created,
            groups_kept,
            groups_deleted
        );
        Ok(LayoutSyncReport {
            netclasses: netclasses.len(),
            groups_created,
            groups_kept,
            groups_deleted,
            grid,
        })
    }

    /// Cascade for brand deletion: removes the brands from the project
    /// list, cleans every group context against the remaining set, and
    /// clears every slot still referencing a removed brand. A deleted
    /// brand governs nothing, so Manual slots are cleared here too.
    pub async fn handle_brands_removed(&self, project_id: &str, brand_ids: &[String]) -> G2gResult<CleanupReport> {
        if brand_ids.is_empty() {
            return Ok(CleanupReport::default());
        }
        let removed: HashSet<&str> = brand_ids.iter().map(|s| s.as_str()).collect();

        let brands = self.brands.brands(project_id).await?;
        let remaining: Vec<RelationBrand> = brands.into_iter().filter(|b| !removed.contains(b.id.as_str())).collect();
        self.brands.replace_brands(project_id, remaining.clone()).await?;

        let by_id: HashSet<String> = remaining.iter().map(|b| b.id.clone()).collect();
        let by_name: HashMap<String, String> = remaining.iter().map(|b| (b.name.to_lowercase(), b.id.clone())).collect();
        let mut groups = self.groups.groups_by_project(project_id).await?;
        let mut changed_groups = Vec::new();
        for group in &mut groups {
            if clean_group_references(group, &by_id, &by_name) {
                changed_groups.push(group.clone());
            }
        }
        let groups_updated = changed_groups.len();
        if !changed_groups.is_empty() {
            self.groups.upsert_groups(project_id, changed_groups).await?;
        }

        let mut rows = self.rows.rows_by_project(project_id).await?;
        let mut changed_rows = Vec::new();
        for row in &mut rows {
            let mut modified = false;
            for slot in &mut row.slots {
                if slot.is_assigned() && removed.contains(slot.brand_id.as_str()) {
                    slot.clear();
                    modified = true;
                }
            }
            if modified {
                changed_rows.push(row.clone());
            }
        }
        let rows_updated = changed_rows.len();
        self.persist_rows_chunked(project_id, changed_rows).await?;

        info!("Brand removal cleanup for project {}: {} groups updated, {} rows updated", project_id, groups_updated, rows_updated);
        Ok(CleanupReport {
            groups_updated,
            rows_updated,
            ..Default::default()
        })
    }

    /// Cascade for netclass deletion: rewrites the populations of affected
    /// interfaces, deletes channel/segment groups that lost every member
    /// (the root group stays as the interface anchor), strips the deleted
    /// groups from across target lists, and resynchronizes the grid.
    pub async fn handle_netclass_removed(&self, project_id: &str, netclass_ids: &[String]) -> G2gResult<CleanupReport> {
        if netclass_ids.is_empty() {
            return Ok(CleanupReport::default());
        }
        let removed: HashSet<&str> = netclass_ids.iter().map(|s| s.as_str()).collect();

        let netclasses = self.netclasses.netclasses_by_project(project_id).await?;
        let remaining: Vec<Netclass> = netclasses.iter().filter(|n| !removed.contains(n.id.as_str())).cloned().collect();
        let affected_interfaces: HashSet<&str> = netclasses.iter().filter(|n| removed.contains(n.id.as_str())).map(|n| n.interface_id.as_str()).collect();
        for interface_id in &affected_interfaces {
            let population: Vec<Netclass> = remaining.iter().filter(|n| n.interface_id == *interface_id).cloned().collect();
            self.netclasses.replace_interface_netclasses(project_id, interface_id, population).await?;
        }

        let groups = self.groups.groups_by_project(project_id).await?;
        let mut deleted_group_ids = Vec::new();
        for group in &groups {
            let is_root = group.channel.is_empty() && group.segment.is_empty();
            if !is_root && filter_members(group, &remaining).is_empty() {
                deleted_group_ids.push(group.id.clone());
            }
        }
        let groups_deleted = deleted_group_ids.len();
        if !deleted_group_ids.is_empty() {
            self.groups.delete_groups(project_id, &deleted_group_ids).await?;
        }

        let removed_groups: HashSet<String> = deleted_group_ids.into_iter().collect();
        let groups_updated = self.strip_across_targets(project_id, &removed_groups).await?;

        let grid = self.ensure_grid(project_id).await?;

        info!(
            "Netclass removal cleanup for project {}: {} groups deleted, {} groups updated, {} rows deleted",
            project_id, groups_deleted, groups_updated, grid.rows_deleted
        );
        Ok(CleanupReport {
            groups_updated,
            groups_deleted,
            rows_updated: grid.rows_updated,
            rows_deleted: grid.rows_deleted,
        })
    }

    /// Cascade for interface deletion: clears the interface's netclasses
    /// and group contexts, strips its groups from across target lists, and
    /// resynchronizes the grid.
    pub async fn handle_interface_removed(&self, project_id: &str, interface_id: &str) -> G2gResult<CleanupReport> {
        self.netclasses.replace_interface_netclasses(project_id, interface_id, Vec::new()).await?;

        let interface_groups = self.groups.groups_by_interface(project_id, interface_id).await?;
        let deleted_ids: Vec<String> = interface_groups.into_iter().map(|g| g.id).collect();
        let groups_deleted = deleted_ids.len();
        if !deleted_ids.is_empty() {
            self.groups.delete_groups(project_id, &deleted_ids).await?;
        }

        let removed: HashSet<String> = deleted_ids.into_iter().collect();
        let groups_updated = self.strip_across_targets(project_id, &removed).await?;

        let grid = self.ensure_grid(project_id).await?;

        info!(
            "Interface removal cleanup for project {} ({}): {} groups deleted, {} rows deleted",
            project_id, interface_id, groups_deleted, grid.rows_deleted
        );
        Ok(CleanupReport {
            groups_updated,
            groups_deleted,
            rows_updated: grid.rows_updated,
            rows_deleted: grid.rows_deleted,
        })
    }

    /// Current pending-process state for a project, if any
    pub async fn pending_process(&self, project_id: &str) -> G2gResult<Option<crate::model::PendingProcess>> {
        Ok(self.indicator.current(project_id).await?)
    }

    /// Remove deleted group ids from every across target list
    async fn strip_across_targets(&self, project_id: &str, removed_group_ids: &HashSet<String>) -> G2gResult<usize> {
        if removed_group_ids.is_empty() {
            return Ok(0);
        }
        let mut groups = self.groups.groups_by_project(project_id).await?;
        let mut changed = Vec::new();
        for group in &mut groups {
            let mut modified = false;
            for entry in &mut group.across {
                let before = entry.target_group_ids.len();
                entry.target_group_ids.retain(|id| !removed_group_ids.contains(id));
                if entry.target_group_ids.len() != before {
                    modified = true;
                }
            }
            if modified {
                changed.push(group.clone());
            }
        }
        let count = changed.len();
        if !changed.is_empty() {
            self.groups.upsert_groups(project_id, changed).await?;
        }
        Ok(count)
    }

    async fn persist_rows_chunked(&self, project_id: &str, rows: Vec<SlotRow>) -> G2gResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let chunk_size = self.config.persist_chunk_size.max(1);
        for chunk in rows.chunks(chunk_size) {
            self.rows.upsert_rows(project_id, chunk.to_vec()).await?;
        }
        Ok(())
    }
}

/// Rebuild an existing row against the canonical target order, carrying
/// assignments over by target id and refreshing target display names
fn rebuild_row(row: &SlotRow, targets: &[&Netclass]) -> SlotRow {
    let mut rebuilt = row.clone();
    let mut slots = Vec::with_capacity(targets.len() + 1);
    slots.push(row.all_slot().cloned().unwrap_or_else(Slot::all));
    for target in targets {
        let mut slot = row.slot_for_target(&target.id).cloned().unwrap_or_else(|| Slot::for_target(target.id.clone(), target.name.clone()));
        slot.target_name = target.name.clone();
        slots.push(slot);
    }
    rebuilt.slots = slots;
    rebuilt
}

/// Reject malformed batches before any compilation work happens
fn validate_incoming(project_id: &str, incoming: &[GroupContext], interface_names: &HashMap<String, String>, persisted: &[GroupContext]) -> G2gResult<()> {
    let mut seen_ids: HashSet<&str> = HashSet::new();
    let mut seen_keys: HashSet<(String, String, String)> = HashSet::new();

    for group in incoming {
        if group.id.is_empty() {
            return Err(G2gError::validation("Incoming group context has no id"));
        }
        if !seen_ids.insert(group.id.as_str()) {
            return Err(G2gError::validation(format!("Incoming group context id '{}' appears twice", group.id)));
        }
        if group.project_id != project_id {
            return Err(G2gError::validation(format!(
                "Group context {} belongs to project '{}', not '{}'",
                group.id, group.project_id, project_id
            )));
        }
        if !interface_names.contains_key(&group.interface_id) {
            return Err(G2gError::unknown("interface", &group.interface_id));
        }
        let (channel, segment) = group.layout_key();
        if !seen_keys.insert((group.interface_id.clone(), channel, segment)) {
            return Err(G2gError::validation(format!(
                "Two incoming group contexts cover interface {} channel '{}' segment '{}'",
                group.interface_id, group.channel, group.segment
            )));
        }
        if let Some(conflict) = persisted.iter().find(|p| p.id != group.id && p.interface_id == group.interface_id && p.layout_key() == group.layout_key()) {
            return Err(G2gError::validation(format!(
                "Incoming group context {} covers the same layout as persisted group {}",
                group.id, conflict.id
            )));
        }
    }
    Ok(())
}

/// The committed brand list must not carry duplicate names; checked before
/// the wholesale replace
fn validate_brand_names(brands: &[RelationBrand]) -> G2gResult<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for brand in brands {
        if brand.name.is_empty() {
            return Err(G2gError::validation(format!("Brand {} has an empty name", brand.id)));
        }
        if let Some(other) = seen.insert(brand.name.to_lowercase(), brand.id.as_str()) {
            return Err(G2gError::validation(format!("Brands {} and {} share the name '{}'", other, brand.id, brand.name)));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AssignmentKind;

    fn names() -> HashMap<String, String> {
        let mut names = HashMap::new();
        names.insert("if1".to_string(), "DDR".to_string());
        names
    }

    #[test]
    fn test_validate_incoming_accepts_clean_batch() {
        let groups = vec![GroupContext::skeleton("p1", "if1", "", ""), GroupContext::skeleton("p1", "if1", "2", "")];
        assert!(validate_incoming("p1", &groups, &names(), &[]).is_ok());
    }

    #[test]
    fn test_validate_incoming_rejects_duplicate_layout() {
        let a = GroupContext::skeleton("p1", "if1", "2", "RX");
        let b = GroupContext::skeleton("p1", "if1", "2", "rx");
        let err = validate_incoming("p1", &[a, b], &names(), &[]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_incoming_rejects_unknown_interface() {
        let group = GroupContext::skeleton("p1", "if_unknown", "", "");
        let err = validate_incoming("p1", &[group], &names(), &[]).unwrap_err();
        assert!(matches!(err, G2gError::UnknownReference { .. }));
    }

    #[test]
    fn test_validate_incoming_rejects_layout_conflict_with_persisted() {
        let persisted = GroupContext::skeleton("p1", "if1", "2", "");
        let mut incoming = GroupContext::skeleton("p1", "if1", "2", "");
        assert_ne!(incoming.id, persisted.id);

        let err = validate_incoming("p1", &[incoming.clone()], &names(), &[persisted.clone()]).unwrap_err();
        assert!(err.is_validation());

        // Re-submitting the persisted group itself is fine
        incoming.id = persisted.id.clone();
        assert!(validate_incoming("p1", &[incoming], &names(), &[persisted]).is_ok());
    }

    #[test]
    fn test_validate_incoming_rejects_foreign_project() {
        let group = GroupContext::skeleton("p2", "if1", "", "");
        let err = validate_incoming("p1", &[group], &names(), &[]).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_validate_brand_names_case_insensitive() {
        let brands = vec![RelationBrand::new("p1", "DDR_TOALL", "lgs"), RelationBrand::new("p1", "ddr_toall", "lgs")];
        let err = validate_brand_names(&brands).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_rebuild_row_carries_assignments_and_refreshes_names() {
        let mut old_name = Netclass::new("p1", "if1", "B_RENAMED");
        old_name.id = "B".to_string();
        let mut other = Netclass::new("p1", "if1", "A");
        other.id = "A".to_string();

        let mut row = SlotRow::new("p1", "area1", "A");
        let mut slot = Slot::for_target("B", "B_OLD");
        slot.assign_auto("brand1");
        row.slots.push(slot);

        let targets = vec![&other, &old_name];
        let rebuilt = rebuild_row(&row, &targets);

        assert_eq!(rebuilt.slots.len(), 3);
        assert!(rebuilt.slots[0].is_all());
        // New slot for A, carried slot for B with refreshed name
        assert_eq!(rebuilt.slots[1].target_netclass_id, "A");
        assert_eq!(rebuilt.slots[1].kind, AssignmentKind::Unmapped);
        assert_eq!(rebuilt.slots[2].target_netclass_id, "B");
        assert_eq!(rebuilt.slots[2].target_name, "B_RENAMED");
        assert_eq!(rebuilt.slots[2].brand_id, "brand1");
    }
}
