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

//! Pairing compiler
//!
//! Turns the enabled relation intents of every group context into a globally
//! deduplicated set of (source, target) brand assignments. Groups are
//! processed segment bucket first, then channel, then root, and a pair key,
//! once claimed, is never reassigned within a run. That first-writer-wins
//! rule is the documented precedence whenever overlapping groups could
//! target the same pair.

use crate::g2g::error::{G2gError, G2gResult};
use crate::g2g::registry::BrandAllocator;
use crate::g2g::resolve::relevant_netclasses;
use crate::model::{ALL_TARGET_NAME, BrandRef, GroupContext, Netclass};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Canonical key of a directed pair
pub fn pair_key(source_id: &str, target_id: &str) -> String {
    format!("{}__{}", source_id, target_id)
}

/// One compiled (source, target) brand assignment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPairing {
    /// Source netclass id
    pub source_id: String,

    /// Target netclass id, or the ALL sentinel name
    pub target_id: String,

    /// Brand governing the pair
    pub brand_id: String,
}

/// Accumulator of claimed pairs across the ordered passes of one run
#[derive(Debug, Default)]
pub struct PairingSet {
    entries: Vec<CompiledPairing>,
    claimed: HashSet<String>,
    skipped: usize,
}

impl PairingSet {
    /// Start an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a pair for a brand. Checks the forward key and, for concrete
    /// non-self targets, the reverse key too; if either is already claimed
    /// the pair is silently skipped. The ALL sentinel is never reversed
    /// because it is not a real netclass.
    pub fn claim(&mut self, source_id: &str, target_id: &str, brand_id: &str) -> bool {
        let forward = pair_key(source_id, target_id);
        if self.claimed.contains(&forward) {
            self.skipped += 1;
            return false;
        }
        if target_id != ALL_TARGET_NAME && source_id != target_id && self.claimed.contains(&pair_key(target_id, source_id)) {
            self.skipped += 1;
            return false;
        }

        self.claimed.insert(forward);
        self.entries.push(CompiledPairing {
            source_id: source_id.to_string(),
            target_id: target_id.to_string(),
            brand_id: brand_id.to_string(),
        });
        true
    }

    /// Claimed pairings in claim order
    pub fn entries(&self) -> &[CompiledPairing] {
        &self.entries
    }

    /// Number of claimed pairings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was claimed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs skipped because their key was already claimed
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

/// Bucket precedence: segment groups, then channel groups, then root groups
fn bucket(group: &GroupContext) -> u8 {
    if !group.segment.is_empty() {
        0
    } else if !group.channel.is_empty() {
        1
    } else {
        2
    }
}

/// Indices of `groups` in processing order. The sort is stable, so groups
/// within one bucket keep their incoming order.
pub fn processing_order(groups: &[GroupContext]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..groups.len()).collect();
    order.sort_by_key(|&i| bucket(&groups[i]));
    order
}

/// Compiles group contexts against a fixed project snapshot
pub struct PairingCompiler<'a> {
    netclasses: &'a [Netclass],
    interface_names: &'a HashMap<String, String>,
    persisted_groups: &'a HashMap<String, GroupContext>,
}

impl<'a> PairingCompiler<'a> {
    /// Compiler over the project's netclasses, interface names and the
    /// persisted group registry used to resolve across targets
    pub fn new(netclasses: &'a [Netclass], interface_names: &'a HashMap<String, String>, persisted_groups: &'a HashMap<String, GroupContext>) -> Self {
        Self {
            netclasses,
            interface_names,
            persisted_groups,
        }
    }

    /// Compile every group carrying enabled intents, claiming pairings and
    /// rewriting each compiled intent's brand reference to the resolved id.
    /// Returns the number of groups that contributed rules.
    pub fn compile(&self, groups: &mut [GroupContext], allocator: &mut BrandAllocator, pairings: &mut PairingSet) -> G2gResult<usize> {
        let mut compiled = 0;

        for index in processing_order(groups) {
            let group = &mut groups[index];
            if !group.has_enabled_intent() {
                continue;
            }

            let interface_name = self
                .interface_names
                .get(&group.interface_id)
                .ok_or_else(|| G2gError::unknown("interface", &group.interface_id))?;
            let group_name = group.group_name(interface_name);
            let members = relevant_netclasses(group, self.netclasses)?;

            // Fixed sub-order: toAll, intraclass, across entries, within
            if group.to_all.enabled {
                let brand_id = allocator.resolve(&group.project_id, &group.to_all.brand, &format!("{}_TOALL", group_name))?;
                for member in &members {
                    pairings.claim(&member.id, ALL_TARGET_NAME, &brand_id);
                }
                group.to_all.brand = BrandRef::Id(brand_id);
            }

            if group.intraclass.enabled {
                let brand_id = allocator.resolve(&group.project_id, &group.intraclass.brand, &format!("{}_TOSELF", group_name))?;
                for member in &members {
                    pairings.claim(&member.id, &member.id, &brand_id);
                }
                group.intraclass.brand = BrandRef::Id(brand_id);
            }

            let across_len = group.across.len();
            for entry_index in 0..across_len {
                if !group.across[entry_index].enabled {
                    continue;
                }
                let default_name = if across_len > 1 {
                    format!("{}_ACROSS_{}", group_name, entry_index + 1)
                } else {
                    format!("{}_ACROSS", group_name)
                };
                let brand_id = allocator.resolve(&group.project_id, &group.across[entry_index].brand, &default_name)?;
                for target_group_id in &group.across[entry_index].target_group_ids {
                    let target_group = self
                        .persisted_groups
                        .get(target_group_id)
                        .ok_or_else(|| G2gError::data(format!("Across target group '{}' does not exist", target_group_id)))?;
                    let target_members = relevant_netclasses(target_group, self.netclasses)?;
                    for member in &members {
                        for target in &target_members {
                            if member.id != target.id {
                                pairings.claim(&member.id, &target.id, &brand_id);
                            }
                        }
                    }
                }
                group.across[entry_index].brand = BrandRef::Id(brand_id);
            }

            if group.within.enabled {
                let brand_id = allocator.resolve(&group.project_id, &group.within.brand, &format!("{}_WITHIN", group_name))?;
                for i in 0..members.len() {
                    for j in i..members.len() {
                        pairings.claim(&members[i].id, &members[j].id, &brand_id);
                    }
                }
                group.within.brand = BrandRef::Id(brand_id);
            }

            debug!("Compiled group '{}' ({} members): {} pairings claimed so far", group_name, members.len(), pairings.len());
            compiled += 1;
        }

        Ok(compiled)
    }
}
