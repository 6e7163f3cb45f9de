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

//! Engine configuration

use std::env;

/// Tunables for the constraint engine
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How many matrix rows to persist per storage call
    pub persist_chunk_size: usize,

    /// Whether compilation runs emit row-level change records
    pub change_tracking_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            persist_chunk_size: 200,
            change_tracking_enabled: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let persist_chunk_size = env::var("NETWEAVE_PERSIST_CHUNK_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(defaults.persist_chunk_size);

        let change_tracking_enabled = env::var("NETWEAVE_CHANGE_TRACKING_ENABLED")
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(defaults.change_tracking_enabled);

        Self {
            persist_chunk_size,
            change_tracking_enabled,
        }
    }
}
