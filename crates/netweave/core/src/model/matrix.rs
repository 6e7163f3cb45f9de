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

//! Slot-matrix rows and slots
//!
//! The slot matrix is the per-rule-area assignment surface. Every netclass
//! of a project owns one row per rule area, and every row carries one slot
//! per potential pairing target: the sentinel ALL column first, then one
//! concrete column per netclass in the project.

use crate::model::new_id;
use serde::{Deserialize, Serialize};

/// Name of the sentinel column representing "this source against everything"
pub const ALL_TARGET_NAME: &str = "ALL";

/// How a slot received its brand assignment
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    /// No brand assigned
    #[default]
    Unmapped,
    /// Assigned by a compilation run, reclaimable by later runs
    Auto,
    /// Assigned by hand, never overwritten or reset by compilation
    Manual,
}

/// A single cell of the slot matrix
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    /// Display name of the pairing target (netclass name, or the ALL sentinel)
    pub target_name: String,

    /// Identifier of the target netclass, empty for the ALL column
    pub target_netclass_id: String,

    /// Assigned brand identifier, empty when unassigned
    pub brand_id: String,

    /// Provenance of the current assignment
    pub kind: AssignmentKind,
}

impl Slot {
    /// The sentinel ALL slot, present on every row
    pub fn all() -> Self {
        Self {
            target_name: ALL_TARGET_NAME.to_string(),
            target_netclass_id: String::new(),
            brand_id: String::new(),
            kind: AssignmentKind::Unmapped,
        }
    }

    /// An unassigned slot for a concrete netclass target
    pub fn for_target(target_netclass_id: impl Into<String>, target_name: impl Into<String>) -> Self {
        Self {
            target_name: target_name.into(),
            target_netclass_id: target_netclass_id.into(),
            brand_id: String::new(),
            kind: AssignmentKind::Unmapped,
        }
    }

    /// Whether this is the sentinel ALL column
    pub fn is_all(&self) -> bool {
        self.target_netclass_id.is_empty() && self.target_name == ALL_TARGET_NAME
    }

    /// Stable key for duplicate detection: the netclass id for concrete
    /// targets, the ALL sentinel name otherwise
    pub fn target_key(&self) -> &str {
        if self.target_netclass_id.is_empty() { &self.target_name } else { &self.target_netclass_id }
    }

    /// Whether a brand is currently assigned
    pub fn is_assigned(&self) -> bool {
        !self.brand_id.is_empty()
    }

    /// Drop the assignment, returning the slot to the unmapped state
    pub fn clear(&mut self) {
        self.brand_id.clear();
        self.kind = AssignmentKind::Unmapped;
    }

    /// Assign a brand on behalf of a compilation run
    pub fn assign_auto(&mut self, brand_id: impl Into<String>) {
        self.brand_id = brand_id.into();
        self.kind = AssignmentKind::Auto;
    }
}

/// One row of the slot matrix: a source netclass within one rule area
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotRow {
    /// Unique row identifier
    pub id: String,

    /// Owning project
    pub project_id: String,

    /// Rule area this row belongs to
    pub rule_area_id: String,

    /// Source netclass of every pairing in this row
    pub netclass_id: String,

    /// Assignment slots, the ALL sentinel first
    pub slots: Vec<Slot>,
}

impl SlotRow {
    /// Create an empty row seeded with the sentinel ALL slot
    pub fn new(project_id: impl Into<String>, rule_area_id: impl Into<String>, netclass_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            project_id: project_id.into(),
            rule_area_id: rule_area_id.into(),
            netclass_id: netclass_id.into(),
            slots: vec![Slot::all()],
        }
    }

    /// The sentinel ALL slot of this row, if present
    pub fn all_slot(&self) -> Option<&Slot> {
        self.slots.iter().find(|s| s.is_all())
    }

    /// Mutable access to the slot for a concrete target netclass
    pub fn slot_for_target_mut(&mut self, target_netclass_id: &str) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| !s.is_all() && s.target_netclass_id == target_netclass_id)
    }

    /// The slot for a concrete target netclass
    pub fn slot_for_target(&self, target_netclass_id: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| !s.is_all() && s.target_netclass_id == target_netclass_id)
    }
}
