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

//! Persistence contracts for the constraint engine
//!
//! The engine reads and writes project data exclusively through these
//! traits, so it stays independent of any concrete backend. The in-memory
//! implementation in [`memory`] backs tests and the CLI.

pub mod memory;

pub use memory::{MemoryStore, ProjectState};

use crate::audit::RowChange;
use crate::model::{GroupContext, InterfaceRef, LayerGroupDefaults, Netclass, PendingProcess, RelationBrand, RuleArea, SlotRow};
use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by storage backends
#[derive(Error, Debug)]
pub enum StoreError {
    /// Requested entity does not exist
    #[error("Not found: {message}")]
    NotFound {
        /// What was looked up
        message: String,
    },

    /// Write rejected because it conflicts with existing data
    #[error("Conflict: {message}")]
    Conflict {
        /// Conflict description
        message: String,
    },

    /// Backend failure unrelated to the request itself
    #[error("Backend failure: {message}")]
    Backend {
        /// Failure description
        message: String,
    },

    /// Payload could not be serialized or deserialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result alias used by all storage traits
pub type StoreResult<T> = Result<T, StoreError>;

/// Read and write access to netclass records
#[async_trait]
pub trait NetclassStore: Send + Sync {
    /// All netclasses of a project
    async fn netclasses_by_project(&self, project_id: &str) -> StoreResult<Vec<Netclass>>;

    /// All netclasses belonging to one interface
    async fn netclasses_by_interface(&self, project_id: &str, interface_id: &str) -> StoreResult<Vec<Netclass>>;

    /// Replace the full netclass population of an interface
    async fn replace_interface_netclasses(&self, project_id: &str, interface_id: &str, netclasses: Vec<Netclass>) -> StoreResult<()>;
}

/// Read access to interface records
#[async_trait]
pub trait InterfaceStore: Send + Sync {
    /// Look up one interface
    async fn interface_by_id(&self, project_id: &str, interface_id: &str) -> StoreResult<Option<InterfaceRef>>;

    /// All interfaces of a project
    async fn interfaces_by_project(&self, project_id: &str) -> StoreResult<Vec<InterfaceRef>>;
}

/// Read access to rule areas and project-level defaults
#[async_trait]
pub trait RuleAreaRegistry: Send + Sync {
    /// All rule areas of a project
    async fn rule_areas(&self, project_id: &str) -> StoreResult<Vec<RuleArea>>;

    /// Default layer-group-sets used when creating brands
    async fn layer_group_defaults(&self, project_id: &str) -> StoreResult<LayerGroupDefaults>;
}

/// Read and write access to relation brands
#[async_trait]
pub trait BrandStore: Send + Sync {
    /// All brands of a project
    async fn brands(&self, project_id: &str) -> StoreResult<Vec<RelationBrand>>;

    /// Replace the full brand population of a project
    async fn replace_brands(&self, project_id: &str, brands: Vec<RelationBrand>) -> StoreResult<()>;
}

/// Read and write access to slot-matrix rows
#[async_trait]
pub trait SlotRowStore: Send + Sync {
    /// All rows of a project, across every rule area
    async fn rows_by_project(&self, project_id: &str) -> StoreResult<Vec<SlotRow>>;

    /// Insert or update rows, keyed by row id
    async fn upsert_rows(&self, project_id: &str, rows: Vec<SlotRow>) -> StoreResult<()>;

    /// Delete rows by id
    async fn delete_rows(&self, project_id: &str, row_ids: &[String]) -> StoreResult<()>;
}

/// Read and write access to group contexts
#[async_trait]
pub trait GroupContextStore: Send + Sync {
    /// All group contexts of a project
    async fn groups_by_project(&self, project_id: &str) -> StoreResult<Vec<GroupContext>>;

    /// All group contexts belonging to one interface
    async fn groups_by_interface(&self, project_id: &str, interface_id: &str) -> StoreResult<Vec<GroupContext>>;

    /// Insert or update group contexts, keyed by group id
    async fn upsert_groups(&self, project_id: &str, groups: Vec<GroupContext>) -> StoreResult<()>;

    /// Delete group contexts by id
    async fn delete_groups(&self, project_id: &str, group_ids: &[String]) -> StoreResult<()>;
}

/// Best-effort sink for row-level change records
#[async_trait]
pub trait ChangeTrackingSink: Send + Sync {
    /// Record the slot-level changes of one compilation run
    async fn record_row_changes(&self, project_id: &str, changes: Vec<RowChange>) -> StoreResult<()>;
}

/// Advisory run indicator that tells readers a recompute is in flight
#[async_trait]
pub trait PendingProcessIndicator: Send + Sync {
    /// Mark an operation as running for a project
    async fn mark_running(&self, project_id: &str, operation: &str) -> StoreResult<()>;

    /// Mark the current operation as completed
    async fn mark_completed(&self, project_id: &str, operation: &str) -> StoreResult<()>;

    /// Mark the current operation as failed with a message
    async fn mark_failed(&self, project_id: &str, operation: &str, message: &str) -> StoreResult<()>;

    /// Current indicator state for a project, if any
    async fn current(&self, project_id: &str) -> StoreResult<Option<PendingProcess>>;
}
