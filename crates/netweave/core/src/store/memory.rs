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

//! In-memory storage backend
//!
//! Backs the CLI and the test suite. Project data lives in a single map
//! guarded by an async lock; the pending-process indicator sits in a
//! lock-free map because it is written from failure paths where the main
//! lock may already be contended.

use crate::audit::RowChange;
use crate::model::{GroupContext, InterfaceRef, LayerGroupDefaults, Netclass, PendingProcess, ProcessState, RelationBrand, RuleArea, SlotRow};
use crate::store::{
    BrandStore, ChangeTrackingSink, GroupContextStore, InterfaceStore, NetclassStore, PendingProcessIndicator, RuleAreaRegistry, SlotRowStore, StoreResult,
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Complete persisted state of one project
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectState {
    /// Interfaces of the project
    pub interfaces: Vec<InterfaceRef>,

    /// Netclasses across all interfaces
    pub netclasses: Vec<Netclass>,

    /// Relation brands
    pub brands: Vec<RelationBrand>,

    /// Rule areas
    pub rule_areas: Vec<RuleArea>,

    /// Project defaults for brand creation
    pub defaults: LayerGroupDefaults,

    /// Slot-matrix rows
    pub rows: Vec<SlotRow>,

    /// Group contexts
    pub groups: Vec<GroupContext>,
}

/// In-memory store implementing every persistence contract
pub struct MemoryStore {
    projects: RwLock<HashMap<String, ProjectState>>,
    pending: DashMap<String, PendingProcess>,
    recorded_changes: RwLock<Vec<RowChange>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            projects: RwLock::new(HashMap::new()),
            pending: DashMap::new(),
            recorded_changes: RwLock::new(Vec::new()),
        }
    }

    /// Insert or replace an interface record
    pub async fn upsert_interface(&self, project_id: &str, interface: InterfaceRef) {
        let mut projects = self.projects.write().await;
        let state = projects.entry(project_id.to_string()).or_default();
        if let Some(existing) = state.interfaces.iter_mut().find(|i| i.id == interface.id) {
            *existing = interface;
        } else {
            state.interfaces.push(interface);
        }
    }

    /// Register a rule area
    pub async fn add_rule_area(&self, project_id: &str, rule_area: RuleArea) {
        let mut projects = self.projects.write().await;
        let state = projects.entry(project_id.to_string()).or_default();
        if !state.rule_areas.iter().any(|a| a.id == rule_area.id) {
            state.rule_areas.push(rule_area);
        }
    }

    /// Set the project defaults used when brands are created
    pub async fn set_layer_group_defaults(&self, project_id: &str, defaults: LayerGroupDefaults) {
        let mut projects = self.projects.write().await;
        projects.entry(project_id.to_string()).or_default().defaults = defaults;
    }

    /// Append netclasses without touching existing ones
    pub async fn add_netclasses(&self, project_id: &str, netclasses: Vec<Netclass>) {
        let mut projects = self.projects.write().await;
        projects.entry(project_id.to_string()).or_default().netclasses.extend(netclasses);
    }

    /// Replace the whole state of a project, creating it if absent
    pub async fn import_project(&self, project_id: &str, state: ProjectState) {
        let mut projects = self.projects.write().await;
        projects.insert(project_id.to_string(), state);
    }

    /// Snapshot the whole state of a project
    pub async fn export_project(&self, project_id: &str) -> ProjectState {
        let projects = self.projects.read().await;
        projects.get(project_id).cloned().unwrap_or_default()
    }

    /// Restore a previously recorded pending-process snapshot
    pub fn restore_pending(&self, project_id: &str, pending: PendingProcess) {
        self.pending.insert(project_id.to_string(), pending);
    }

    /// Change records accepted so far, oldest first
    pub async fn recorded_changes(&self) -> Vec<RowChange> {
        self.recorded_changes.read().await.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetclassStore for MemoryStore {
    async fn netclasses_by_project(&self, project_id: &str) -> StoreResult<Vec<Netclass>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).map(|s| s.netclasses.clone()).unwrap_or_default())
    }

    async fn netclasses_by_interface(&self, project_id: &str, interface_id: &str) -> StoreResult<Vec<Netclass>> {
        let projects = self.projects.read().await;
        Ok(projects
            .get(project_id)
            .map(|s| s.netclasses.iter().filter(|n| n.interface_id == interface_id).cloned().collect())
            .unwrap_or_default())
    }

    async fn replace_interface_netclasses(&self, project_id: &str, interface_id: &str, netclasses: Vec<Netclass>) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        let state = projects.entry(project_id.to_string()).or_default();
        state.netclasses.retain(|n| n.interface_id != interface_id);
        state.netclasses.extend(netclasses);
        Ok(())
    }
}

#[async_trait]
impl InterfaceStore for MemoryStore {
    async fn interface_by_id(&self, project_id: &str, interface_id: &str) -> StoreResult<Option<InterfaceRef>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).and_then(|s| s.interfaces.iter().find(|i| i.id == interface_id).cloned()))
    }

    async fn interfaces_by_project(&self, project_id: &str) -> StoreResult<Vec<InterfaceRef>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).map(|s| s.interfaces.clone()).unwrap_or_default())
    }
}

#[async_trait]
impl RuleAreaRegistry for MemoryStore {
    async fn rule_areas(&self, project_id: &str) -> StoreResult<Vec<RuleArea>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).map(|s| s.rule_areas.clone()).unwrap_or_default())
    }

    async fn layer_group_defaults(&self, project_id: &str) -> StoreResult<LayerGroupDefaults> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).map(|s| s.defaults.clone()).unwrap_or_default())
    }
}

#[async_trait]
impl BrandStore for MemoryStore {
    async fn brands(&self, project_id: &str) -> StoreResult<Vec<RelationBrand>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).map(|s| s.brands.clone()).unwrap_or_default())
    }

    async fn replace_brands(&self, project_id: &str, brands: Vec<RelationBrand>) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        projects.entry(project_id.to_string()).or_default().brands = brands;
        Ok(())
    }
}

#[async_trait]
impl SlotRowStore for MemoryStore {
    async fn rows_by_project(&self, project_id: &str) -> StoreResult<Vec<SlotRow>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).map(|s| s.rows.clone()).unwrap_or_default())
    }

    async fn upsert_rows(&self, project_id: &str, rows: Vec<SlotRow>) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        let state = projects.entry(project_id.to_string()).or_default();
        for row in rows {
            if let Some(existing) = state.rows.iter_mut().find(|r| r.id == row.id) {
                *existing = row;
            } else {
                state.rows.push(row);
            }
        }
        Ok(())
    }

    async fn delete_rows(&self, project_id: &str, row_ids: &[String]) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        if let Some(state) = projects.get_mut(project_id) {
            state.rows.retain(|r| !row_ids.contains(&r.id));
        }
        Ok(())
    }
}

#[async_trait]
impl GroupContextStore for MemoryStore {
    async fn groups_by_project(&self, project_id: &str) -> StoreResult<Vec<GroupContext>> {
        let projects = self.projects.read().await;
        Ok(projects.get(project_id).map(|s| s.groups.clone()).unwrap_or_default())
    }

    async fn groups_by_interface(&self, project_id: &str, interface_id: &str) -> StoreResult<Vec<GroupContext>> {
        let projects = self.projects.read().await;
        Ok(projects
            .get(project_id)
            .map(|s| s.groups.iter().filter(|g| g.interface_id == interface_id).cloned().collect())
            .unwrap_or_default())
    }

    async fn upsert_groups(&self, project_id: &str, groups: Vec<GroupContext>) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        let state = projects.entry(project_id.to_string()).or_default();
        for group in groups {
            if let Some(existing) = state.groups.iter_mut().find(|g| g.id == group.id) {
                *existing = group;
            } else {
                state.groups.push(group);
            }
        }
        Ok(())
    }

    async fn delete_groups(&self, project_id: &str, group_ids: &[String]) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        if let Some(state) = projects.get_mut(project_id) {
            state.groups.retain(|g| !group_ids.contains(&g.id));
        }
        Ok(())
    }
}

#[async_trait]
impl ChangeTrackingSink for MemoryStore {
    async fn record_row_changes(&self, _project_id: &str, changes: Vec<RowChange>) -> StoreResult<()> {
        let mut recorded = self.recorded_changes.write().await;
        recorded.extend(changes);
        Ok(())
    }
}

#[async_trait]
impl PendingProcessIndicator for MemoryStore {
    async fn mark_running(&self, project_id: &str, operation: &str) -> StoreResult<()> {
        self.pending.insert(project_id.to_string(), PendingProcess::running(project_id, operation));
        Ok(())
    }

    async fn mark_completed(&self, project_id: &str, operation: &str) -> StoreResult<()> {
        self.pending
            .insert(project_id.to_string(), PendingProcess::finished(project_id, operation, ProcessState::Completed, ""));
        Ok(())
    }

    async fn mark_failed(&self, project_id: &str, operation: &str, message: &str) -> StoreResult<()> {
        self.pending
            .insert(project_id.to_string(), PendingProcess::finished(project_id, operation, ProcessState::Failed, message));
        Ok(())
    }

    async fn current(&self, project_id: &str) -> StoreResult<Option<PendingProcess>> {
        Ok(self.pending.get(project_id).map(|entry| entry.value().clone()))
    }
}
