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

//! Row-level change tracking
//!
//! Compilation runs report which matrix rows they touched so operators can
//! review what a recompute did. Recording is strictly best-effort: a sink
//! failure is logged and never fails the run that produced the changes.

use crate::model::{Slot, SlotRow};
use crate::store::{ChangeTrackingSink, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;

/// Before/after record of one slot-matrix row touched by a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowChange {
    /// Identifier of the changed row
    pub row_id: String,

    /// Rule area the row belongs to
    pub rule_area_id: String,

    /// Source netclass of the row
    pub netclass_id: String,

    /// Slots before the run
    pub before: Vec<Slot>,

    /// Slots after the run
    pub after: Vec<Slot>,

    /// When the change was recorded
    pub recorded_at: DateTime<Utc>,
}

/// Compare rows after a run against their pre-run baseline and produce one
/// change record per row whose slots differ. Rows created by the run have an
/// empty `before`.
pub fn diff_rows(baseline: &[SlotRow], current: &[SlotRow]) -> Vec<RowChange> {
    let before_by_id: HashMap<&str, &SlotRow> = baseline.iter().map(|r| (r.id.as_str(), r)).collect();

    current
        .iter()
        .filter_map(|row| {
            let before = before_by_id.get(row.id.as_str());
            let before_slots = before.map(|r| r.slots.clone()).unwrap_or_default();
            if before_slots == row.slots {
                return None;
            }
            Some(RowChange {
                row_id: row.id.clone(),
                rule_area_id: row.rule_area_id.clone(),
                netclass_id: row.netclass_id.clone(),
                before: before_slots,
                after: row.slots.clone(),
                recorded_at: Utc::now(),
            })
        })
        .collect()
}

/// Change sink that emits each record to the log instead of persisting it
pub struct TracingChangeSink;

#[async_trait]
impl ChangeTrackingSink for TracingChangeSink {
    async fn record_row_changes(&self, project_id: &str, changes: Vec<RowChange>) -> StoreResult<()> {
        for change in &changes {
            info!(
                "Row {} (netclass {}, area {}) changed in project {}: {} -> {} assigned slots",
                change.row_id,
                change.netclass_id,
                change.rule_area_id,
                project_id,
                change.before.iter().filter(|s| s.is_assigned()).count(),
                change.after.iter().filter(|s| s.is_assigned()).count()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SlotRow;

    #[test]
    fn test_diff_skips_untouched_rows() {
        let row = SlotRow::new("p1", "area1", "nc1");
        let changes = diff_rows(&[row.clone()], &[row]);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_diff_reports_assignment() {
        let row = SlotRow::new("p1", "area1", "nc1");
        let mut after = row.clone();
        after.slots[0].assign_auto("brand1");

        let changes = diff_rows(&[row], &[after.clone()]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].row_id, after.id);
        assert!(changes[0].before[0].brand_id.is_empty());
        assert_eq!(changes[0].after[0].brand_id, "brand1");
    }

    #[test]
    fn test_diff_marks_new_rows_with_empty_before() {
        let row = SlotRow::new("p1", "area1", "nc1");
        let changes = diff_rows(&[], &[row]);
        assert_eq!(changes.len(), 1);
        assert!(changes[0].before.is_empty());
    }
}
