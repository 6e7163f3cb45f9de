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

//! Brand finalizer and garbage collector
//!
//! After materialization, the committed brand list is the union of existing
//! and staged brands filtered down to those referenced by at least one slot.
//! The project brand list is this engine's sole record of brand existence,
//! so dropping a brand here is destructive and intentional, never a silent
//! side effect: every drop is logged. The dangling-reference cleaner keeps
//! group contexts self-consistent and is shared with the deletion cascades.

use crate::model::{BrandRef, GroupContext, RelationBrand, SlotRow};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Brand ids referenced by at least one slot, regardless of assignment kind
pub fn used_brand_ids(rows: &[SlotRow]) -> HashSet<String> {
    let mut used = HashSet::new();
    for row in rows {
        for slot in &row.slots {
            if slot.is_assigned() {
                used.insert(slot.brand_id.clone());
            }
        }
    }
    used
}

/// Committed brand list plus the number of brands dropped
#[derive(Debug)]
pub struct BrandCommit {
    /// Brands still referenced after the run, existing before staged
    pub brands: Vec<RelationBrand>,

    /// Brands dropped for having zero slot references
    pub dropped: usize,
}

/// Filter existing and staged brands down to those the grid references
pub fn commit_brands(rows: &[SlotRow], existing: Vec<RelationBrand>, staged: Vec<RelationBrand>) -> BrandCommit {
    let used = used_brand_ids(rows);
    let mut seen: HashSet<String> = HashSet::new();
    let mut brands = Vec::new();
    let mut dropped = 0usize;

    for brand in existing.into_iter().chain(staged) {
        if !seen.insert(brand.id.clone()) {
            continue;
        }
        if used.contains(&brand.id) {
            brands.push(brand);
        } else {
            info!("Dropping brand '{}' ({}): no slot references it", brand.name, brand.id);
            dropped += 1;
        }
    }

    BrandCommit { brands, dropped }
}

enum PointerOutcome {
    Keep,
    Rewrite(String),
    Dangling,
}

fn resolve_pointer(pointer: &BrandRef, by_id: &HashSet<String>, by_name: &HashMap<String, String>) -> PointerOutcome {
    match pointer {
        BrandRef::Unset => PointerOutcome::Keep,
        BrandRef::Id(id) => {
            if by_id.contains(id) {
                PointerOutcome::Keep
            } else {
                PointerOutcome::Dangling
            }
        }
        BrandRef::Name(name) => match by_name.get(&name.to_lowercase()) {
            Some(id) => PointerOutcome::Rewrite(id.clone()),
            None => PointerOutcome::Dangling,
        },
    }
}

/// Normalize one group context against the committed brand set: name
/// pointers are rewritten to ids, dangling pointers are cleared and their
/// owning flag disabled, and a dangling across entry loses its targets too.
/// Returns whether the group was modified.
pub fn clean_group_references(group: &mut GroupContext, by_id: &HashSet<String>, by_name: &HashMap<String, String>) -> bool {
    let mut changed = false;

    for intent in [&mut group.to_all, &mut group.intraclass, &mut group.within] {
        match resolve_pointer(&intent.brand, by_id, by_name) {
            PointerOutcome::Keep => {}
            PointerOutcome::Rewrite(id) => {
                intent.brand = BrandRef::Id(id);
                changed = true;
            }
            PointerOutcome::Dangling => {
                intent.brand = BrandRef::Unset;
                intent.enabled = false;
                changed = true;
            }
        }
    }

    for entry in &mut group.across {
        match resolve_pointer(&entry.brand, by_id, by_name) {
            PointerOutcome::Keep => {}
            PointerOutcome::Rewrite(id) => {
                entry.brand = BrandRef::Id(id);
                changed = true;
            }
            PointerOutcome::Dangling => {
                entry.brand = BrandRef::Unset;
                entry.enabled = false;
                entry.target_group_ids.clear();
                changed = true;
            }
        }
    }

    changed
}

/// Clean every group context against the committed brand list.
/// Returns the number of groups modified.
pub fn normalize_groups(groups: &mut [GroupContext], committed: &[RelationBrand]) -> usize {
    let by_id: HashSet<String> = committed.iter().map(|b| b.id.clone()).collect();
    let by_name: HashMap<String, String> = committed.iter().map(|b| (b.name.to_lowercase(), b.id.clone())).collect();

    let mut changed = 0;
    for group in groups.iter_mut() {
        if clean_group_references(group, &by_id, &by_name) {
            changed += 1;
        }
    }
    changed
}
