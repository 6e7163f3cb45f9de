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

//! Group contexts and relation intents
//!
//! A group context is the unit of group-to-group declaration, scoped to one
//! (interface, channel, segment) combination. Its relation intents declare
//! which pairings the compiler derives for the group's member netclasses.

use crate::model::new_id;
use serde::{Deserialize, Serialize};

/// Reference to a relation brand carried by a group context field
///
/// Replaces the historically ambiguous single string that could mean an id,
/// an existing name or a desired new name with an explicit tagged value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BrandRef {
    /// No brand assigned yet; the compiler allocates one under the derived default name
    #[default]
    Unset,

    /// Reference to a brand by identity
    Id(String),

    /// Reference to a brand by display name, creating it when absent
    Name(String),
}

impl BrandRef {
    /// Whether no brand reference is carried
    pub fn is_unset(&self) -> bool {
        matches!(self, BrandRef::Unset)
    }

    /// The referenced brand id, when referenced by identity
    pub fn as_id(&self) -> Option<&str> {
        match self {
            BrandRef::Id(id) => Some(id),
            _ => None,
        }
    }
}

/// One relation intent: an enable flag plus the brand governing the derived pairings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelationIntent {
    /// Whether the relation is declared for this group
    pub enabled: bool,

    /// Brand reference used when the relation is compiled
    pub brand: BrandRef,
}

impl RelationIntent {
    /// An enabled intent without a brand reference
    pub fn enabled() -> Self {
        Self { enabled: true, brand: BrandRef::Unset }
    }

    /// An enabled intent carrying a brand reference
    pub fn with_brand(brand: BrandRef) -> Self {
        Self { enabled: true, brand }
    }
}

/// One "across" relation entry targeting other group contexts
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AcrossIntent {
    /// Whether the entry is declared for this group
    pub enabled: bool,

    /// Brand reference used when the entry is compiled
    pub brand: BrandRef,

    /// Target group context ids, resolved against the persisted registry
    pub target_group_ids: Vec<String>,
}

impl AcrossIntent {
    /// An enabled entry targeting the given groups
    pub fn targeting(target_group_ids: Vec<String>) -> Self {
        Self {
            enabled: true,
            brand: BrandRef::Unset,
            target_group_ids,
        }
    }
}

/// Group-to-group declaration for one (interface, channel, segment) combination
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupContext {
    /// Unique group context identifier, stable across edits
    pub id: String,

    /// Owning project
    pub project_id: String,

    /// Owning interface
    pub interface_id: String,

    /// Channel tag as a decimal string, empty = none
    pub channel: String,

    /// Segment tag, empty = none
    pub segment: String,

    /// Pair every member with the reserved ALL column
    pub to_all: RelationIntent,

    /// Pair every member with itself
    pub intraclass: RelationIntent,

    /// Pair every member with every other member, including self-pairs
    pub within: RelationIntent,

    /// Ordered entries pairing members against other groups' members
    pub across: Vec<AcrossIntent>,
}

impl GroupContext {
    /// Create an empty skeleton for an (interface, channel, segment) combination
    pub fn skeleton(project_id: impl Into<String>, interface_id: impl Into<String>, channel: impl Into<String>, segment: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            project_id: project_id.into(),
            interface_id: interface_id.into(),
            channel: channel.into(),
            segment: segment.into(),
            to_all: RelationIntent::default(),
            intraclass: RelationIntent::default(),
            within: RelationIntent::default(),
            across: Vec::new(),
        }
    }

    /// Derived group name seeding default brand names:
    /// `{interfaceName}{channel}` plus `_{segment}` when present
    pub fn group_name(&self, interface_name: &str) -> String {
        let mut name = String::with_capacity(interface_name.len() + self.channel.len() + self.segment.len() + 1);
        name.push_str(interface_name);
        name.push_str(&self.channel);
        if !self.segment.is_empty() {
            name.push('_');
            name.push_str(&self.segment);
        }
        name
    }

    /// Layout key identifying the combination within its interface.
    /// Segments compare case-insensitively, matching the resolver.
    pub fn layout_key(&self) -> (String, String) {
        (self.channel.clone(), self.segment.to_lowercase())
    }

    /// Whether any relation intent is enabled
    pub fn has_enabled_intent(&self) -> bool {
        self.to_all.enabled || self.intraclass.enabled || self.within.enabled || self.across.iter().any(|entry| entry.enabled)
    }
}
