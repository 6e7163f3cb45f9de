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

//! Relation brand records

use crate::model::new_id;
use serde::{Deserialize, Serialize};

/// A reusable, named identity for a clearance relation rule, shared across
/// many netclass pairs and all rule areas of a project
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationBrand {
    /// Unique brand identifier
    pub id: String,

    /// Owning project
    pub project_id: String,

    /// Display name, unique per project (case-insensitive)
    pub name: String,

    /// Layer-group-set used to seed rule values for pairings newly assigned to this brand
    pub layer_group_set_id: String,
}

impl RelationBrand {
    /// Create a new brand anchored to a default layer-group-set
    pub fn new(project_id: impl Into<String>, name: impl Into<String>, layer_group_set_id: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            project_id: project_id.into(),
            name: name.into(),
            layer_group_set_id: layer_group_set_id.into(),
        }
    }

    /// Case-insensitive name comparison
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }
}
