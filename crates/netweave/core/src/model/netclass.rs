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

//! Netclass records

use crate::model::new_id;
use serde::{Deserialize, Serialize};

/// A named group of electrical nets sharing constraint treatment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Netclass {
    /// Unique netclass identifier
    pub id: String,

    /// Owning project
    pub project_id: String,

    /// Owning interface
    pub interface_id: String,

    /// Display name, unique within the interface
    pub name: String,

    /// Channel tag as a decimal string, empty = unchanneled
    pub channel: String,

    /// Segment tag, empty = none
    pub segment: String,

    /// Layer-group-set carrying the rule values for this netclass
    pub layer_group_set_id: String,

    /// Auto-mapping pattern matched against net names
    pub pattern: String,
}

impl Netclass {
    /// Create an unchanneled netclass without a segment
    pub fn new(project_id: impl Into<String>, interface_id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: new_id(),
            project_id: project_id.into(),
            interface_id: interface_id.into(),
            pattern: format!("*{name}*"),
            name,
            channel: String::new(),
            segment: String::new(),
            layer_group_set_id: String::new(),
        }
    }

    /// Set the segment tag
    pub fn with_segment(mut self, segment: impl Into<String>) -> Self {
        self.segment = segment.into();
        self
    }

    /// Set the auto-mapping pattern
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Set the layer-group-set reference
    pub fn with_layer_group_set(mut self, layer_group_set_id: impl Into<String>) -> Self {
        self.layer_group_set_id = layer_group_set_id.into();
        self
    }

    /// Whether the netclass carries a channel tag
    pub fn is_channeled(&self) -> bool {
        !self.channel.is_empty()
    }

    /// Case-insensitive segment comparison
    pub fn segment_matches(&self, segment: &str) -> bool {
        self.segment.eq_ignore_ascii_case(segment)
    }
}
