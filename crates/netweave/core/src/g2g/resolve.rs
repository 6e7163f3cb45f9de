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

//! Relevant-netclass resolver
//!
//! Classifies a group context into exactly one of four shapes and filters
//! the project netclass list down to the members the group governs. The
//! shapes are disjoint, so no netclass is governed twice within one group.

use crate::g2g::error::{G2gError, G2gResult};
use crate::model::{GroupContext, Netclass};

/// The four disjoint membership shapes of a group context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupShape {
    /// No channel, no segment: every unchanneled netclass of the interface,
    /// regardless of the netclass segment
    Root,
    /// Channel and segment both restrict membership
    ChannelSegment,
    /// Segment restriction on unchanneled netclasses
    SegmentOnly,
    /// Channel restriction only
    ChannelOnly,
}

/// Classify a group context by its channel and segment tags
pub fn classify(group: &GroupContext) -> GroupShape {
    match (group.channel.is_empty(), group.segment.is_empty()) {
        (true, true) => GroupShape::Root,
        (false, false) => GroupShape::ChannelSegment,
        (true, false) => GroupShape::SegmentOnly,
        (false, true) => GroupShape::ChannelOnly,
    }
}

/// Member netclasses of a group, sorted by name (case-insensitive).
/// Deletion cascades use this directly since an emptied group is a valid
/// observation there, not a data error.
pub fn filter_members(group: &GroupContext, netclasses: &[Netclass]) -> Vec<Netclass> {
    let shape = classify(group);
    let mut members: Vec<Netclass> = netclasses
        .iter()
        .filter(|nc| nc.interface_id == group.interface_id)
        .filter(|nc| match shape {
            GroupShape::Root => !nc.is_channeled(),
            GroupShape::ChannelSegment => nc.channel == group.channel && nc.segment_matches(&group.segment),
            GroupShape::SegmentOnly => !nc.is_channeled() && nc.segment_matches(&group.segment),
            GroupShape::ChannelOnly => nc.channel == group.channel,
        })
        .cloned()
        .collect();
    members.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    members
}

/// Member netclasses of a group carrying relation rules. An empty result
/// means the group has lost all members and is raised as a data error.
pub fn relevant_netclasses(group: &GroupContext, netclasses: &[Netclass]) -> G2gResult<Vec<Netclass>> {
    let members = filter_members(group, netclasses);
    if members.is_empty() {
        return Err(G2gError::data(format!(
            "Group context {} (interface {}, channel '{}', segment '{}') resolves to zero netclasses",
            group.id, group.interface_id, group.channel, group.segment
        )));
    }
    Ok(members)
}
