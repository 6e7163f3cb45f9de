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

//! Domain records for the constraint engine
//!
//! Netclasses, group contexts, relation brands and the slot matrix, plus the
//! small shared projections consumed from collaborating stores.

pub mod brand;
pub mod group;
pub mod matrix;
pub mod netclass;

pub use brand::RelationBrand;
pub use group::{AcrossIntent, BrandRef, GroupContext, RelationIntent};
pub use matrix::{ALL_TARGET_NAME, AssignmentKind, Slot, SlotRow};
pub use netclass::Netclass;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh record identifier
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Interface projection (id + name is sufficient for group naming)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceRef {
    /// Unique interface identifier
    pub id: String,

    /// Interface display name, e.g. "DDR" or "PCIE"
    pub name: String,
}

impl InterfaceRef {
    /// Create a new interface projection
    pub fn new(name: impl Into<String>) -> Self {
        Self { id: new_id(), name: name.into() }
    }
}

/// Rule area owning one slot-matrix row per source netclass
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleArea {
    /// Unique rule area identifier
    pub id: String,

    /// Owning project
    pub project_id: String,

    /// Rule area display name
    pub name: String,
}

impl RuleArea {
    /// Create a new rule area
    pub fn new(project_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            project_id: project_id.into(),
            name: name.into(),
        }
    }
}

/// Project-level layer-group-set designations used to seed rule values
/// for newly created relation brands
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LayerGroupDefaults {
    /// Designated clearance-default layer-group-set (empty = none designated)
    pub clearance_default_set_id: String,

    /// Golden layer-group-set fallback (empty = none)
    pub golden_set_id: String,
}

/// State of the advisory pending-process indicator
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProcessState {
    /// An engine run is in flight for the project
    Running,

    /// The last run finished successfully
    Completed,

    /// The last run aborted; the message carries the failure
    Failed,
}

/// Advisory busy indicator consulted by other subsystems and the UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingProcess {
    /// Project the indicator belongs to
    pub project_id: String,

    /// Operation label, e.g. "g2g_compile"
    pub operation: String,

    /// Current indicator state
    pub state: ProcessState,

    /// Failure message when state is `Failed`, empty otherwise
    pub message: String,

    /// Last transition timestamp
    pub updated_at: DateTime<Utc>,
}

impl PendingProcess {
    /// Create a running indicator for an operation
    pub fn running(project_id: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            operation: operation.into(),
            state: ProcessState::Running,
            message: String::new(),
            updated_at: Utc::now(),
        }
    }

    /// Create a terminal indicator in the given state
    pub fn finished(project_id: impl Into<String>, operation: impl Into<String>, state: ProcessState, message: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            operation: operation.into(),
            state,
            message: message.into(),
            updated_at: Utc::now(),
        }
    }
}
