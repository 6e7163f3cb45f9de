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

//! Interface layout expansion
//!
//! Turns base netclass templates plus a channel spec into the concrete
//! per-channel netclass population of an interface, together with the group
//! context skeletons covering every (channel, segment) combination in use.

use crate::g2g::channel::parse_channel_range;
use crate::g2g::error::G2gResult;
use crate::model::{GroupContext, InterfaceRef, Netclass, new_id};
use tracing::debug;

/// Expanded netclasses and group context skeletons of one interface
#[derive(Debug, Clone)]
pub struct InterfaceLayout {
    /// Final netclass list: channel-expanded when channeling was requested,
    /// the base list unchanged otherwise
    pub netclasses: Vec<Netclass>,

    /// Group context skeletons covering root, channel and segment groups,
    /// sorted by channel (numeric) then segment (case-insensitive)
    pub groups: Vec<GroupContext>,
}

/// Expand an interface's base netclass templates across a channel spec.
///
/// An empty channel spec leaves the base list unchanneled. With channels,
/// every base template is cloned once per channel, named
/// `{interfaceName}{channel}_{baseName}`, carrying the channel tag and,
/// when `fresh_identities` is set, a fresh id.
pub fn expand_interface_layout(interface: &InterfaceRef, project_id: &str, channel_spec: &str, base_netclasses: &[Netclass], fresh_identities: bool) -> G2gResult<InterfaceLayout> {
    let channels = expand_channels(channel_spec)?;

    let netclasses = if channels.is_empty() {
        base_netclasses.to_vec()
    } else {
        let mut clones = Vec::with_capacity(channels.len() * base_netclasses.len());
        for channel in &channels {
            let channel_name = format!("{}{}", interface.name, channel);
            for base in base_netclasses {
                let mut clone = base.clone();
                clone.name = format!("{}_{}", channel_name, base.name);
                clone.channel = channel.clone();
                clone.project_id = project_id.to_string();
                clone.interface_id = interface.id.clone();
                if fresh_identities {
                    clone.id = new_id();
                }
                clones.push(clone);
            }
        }
        clones
    };

    let mut groups = Vec::new();
    groups.push(GroupContext::skeleton(project_id, &interface.id, "", ""));
    for channel in &channels {
        groups.push(GroupContext::skeleton(project_id, &interface.id, channel.as_str(), ""));
    }
    for segment in distinct_segments(base_netclasses) {
        if channels.is_empty() {
            groups.push(GroupContext::skeleton(project_id, &interface.id, "", segment.as_str()));
        } else {
            for channel in &channels {
                groups.push(GroupContext::skeleton(project_id, &interface.id, channel.as_str(), segment.as_str()));
            }
        }
    }

    groups.sort_by_key(|g| (g.channel.parse::<u32>().ok(), g.segment.to_lowercase()));

    debug!(
        "Expanded interface {} '{}': {} channels, {} netclasses, {} groups",
        interface.id,
        interface.name,
        channels.len(),
        netclasses.len(),
        groups.len()
    );

    Ok(InterfaceLayout { netclasses, groups })
}

/// Parse and stringify the channel spec, dropping repeated channels while
/// keeping first-occurrence order. A duplicated list entry would otherwise
/// clone identically named netclasses.
fn expand_channels(channel_spec: &str) -> G2gResult<Vec<String>> {
    if channel_spec.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut channels: Vec<String> = Vec::new();
    for number in parse_channel_range(channel_spec)? {
        let channel = number.to_string();
        if !channels.contains(&channel) {
            channels.push(channel);
        }
    }
    Ok(channels)
}

/// Distinct non-empty segment values across the base templates,
/// case-insensitive, keeping the first-seen casing
fn distinct_segments(base_netclasses: &[Netclass]) -> Vec<String> {
    let mut segments: Vec<String> = Vec::new();
    for base in base_netclasses {
        if base.segment.is_empty() {
            continue;
        }
        if !segments.iter().any(|s| s.eq_ignore_ascii_case(&base.segment)) {
            segments.push(base.segment.clone());
        }
    }
    segments
}
