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

//! Slot-matrix materializer
//!
//! Applies a compiled pairing set onto the project grid in two passes over
//! separate snapshots: apply writes brands into a working copy while the
//! baseline stays read-only, then reset clears every Auto slot the current
//! run did not touch. Keeping the passes on separate snapshots means a
//! freshly applied slot can never be reverted by its own run. Manual slots
//! are never altered by either pass.

use crate::g2g::error::{G2gError, G2gResult};
use crate::g2g::pairing::PairingSet;
use crate::model::{ALL_TARGET_NAME, AssignmentKind, SlotRow};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Result of materializing one pairing set onto the grid
#[derive(Debug)]
pub struct MaterializedGrid {
    /// The full grid after apply and reset
    pub rows: Vec<SlotRow>,

    /// Rows that differ from the baseline, for persistence and change tracking
    pub changed_rows: Vec<SlotRow>,

    /// Slots whose value or kind was actually written
    pub slots_applied: usize,

    /// Stale Auto slots cleared back to unmapped
    pub slots_reset: usize,

    /// Pairings that matched no slot in either direction
    pub pairings_dropped: usize,
}

/// Materialize compiled pairings onto the grid.
///
/// A pairing applies to every row of its source netclass, one per rule
/// area. When the source has no matching row or slot and the target is a
/// concrete netclass, the opposite direction is tried; a pairing matching
/// nothing either way is dropped without error.
pub fn materialize(baseline: &[SlotRow], pairings: &PairingSet) -> G2gResult<MaterializedGrid> {
    verify_all_slots(baseline)?;

    let mut rows = baseline.to_vec();
    let index = rows_by_netclass(&rows);
    let mut touched: HashSet<String> = HashSet::new();
    let mut slots_applied = 0usize;
    let mut pairings_dropped = 0usize;

    for pairing in pairings.entries() {
        if apply_direction(&mut rows, &index, &mut touched, &pairing.source_id, &pairing.target_id, &pairing.brand_id, &mut slots_applied) {
            continue;
        }
        if pairing.target_id != ALL_TARGET_NAME
            && apply_direction(&mut rows, &index, &mut touched, &pairing.target_id, &pairing.source_id, &pairing.brand_id, &mut slots_applied)
        {
            continue;
        }
        pairings_dropped += 1;
        debug!("Pairing {} -> {} matched no slot in either direction, dropped", pairing.source_id, pairing.target_id);
    }

    let mut slots_reset = 0usize;
    for row in &mut rows {
        let row_id = row.id.clone();
        for slot in &mut row.slots {
            if slot.kind == AssignmentKind::Auto && !touched.contains(&touch_key(&row_id, slot.target_key())) {
                slot.clear();
                slots_reset += 1;
            }
        }
    }

    let baseline_by_id: HashMap<&str, &SlotRow> = baseline.iter().map(|r| (r.id.as_str(), r)).collect();
    let changed_rows: Vec<SlotRow> = rows
        .iter()
        .filter(|row| match baseline_by_id.get(row.id.as_str()) {
            Some(before) => *before != *row,
            None => true,
        })
        .cloned()
        .collect();

    Ok(MaterializedGrid {
        rows,
        changed_rows,
        slots_applied,
        slots_reset,
        pairings_dropped,
    })
}

/// The ALL column must never carry a netclass id. A row violating this is
/// corrupted prior state and aborts the run before any slot is written.
fn verify_all_slots(rows: &[SlotRow]) -> G2gResult<()> {
    for row in rows {
        for slot in &row.slots {
            if slot.target_name == ALL_TARGET_NAME && !slot.target_netclass_id.is_empty() {
                return Err(G2gError::data(format!(
                    "Row {} has an ALL slot carrying netclass id '{}'",
                    row.id, slot.target_netclass_id
                )));
            }
        }
    }
    Ok(())
}

fn rows_by_netclass(rows: &[SlotRow]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, row) in rows.iter().enumerate() {
        index.entry(row.netclass_id.clone()).or_default().push(i);
    }
    index
}

fn touch_key(row_id: &str, target_key: &str) -> String {
    format!("{}:{}", row_id, target_key)
}

/// Apply one direction of a pairing. Returns whether any slot matched;
/// a matched Manual slot counts as a hit but is left untouched, so the
/// pairing is neither written nor retried against the opposite direction.
fn apply_direction(
    rows: &mut [SlotRow],
    index: &HashMap<String, Vec<usize>>,
    touched: &mut HashSet<String>,
    source_id: &str,
    target_id: &str,
    brand_id: &str,
    slots_applied: &mut usize,
) -> bool {
    let Some(row_indices) = index.get(source_id) else {
        return false;
    };

    let mut hit = false;
    for &row_index in row_indices {
        let row = &mut rows[row_index];
        let row_id = row.id.clone();
        let slot = if target_id == ALL_TARGET_NAME {
            row.slots.iter_mut().find(|s| s.is_all())
        } else {
            row.slot_for_target_mut(target_id)
        };
        let Some(slot) = slot else {
            continue;
        };

        hit = true;
        if slot.kind == AssignmentKind::Manual {
            continue;
        }
        if slot.brand_id != brand_id || slot.kind != AssignmentKind::Auto {
            slot.assign_auto(brand_id);
            *slots_applied += 1;
        }
        touched.insert(touch_key(&row_id, slot.target_key()));
    }
    hit
}
