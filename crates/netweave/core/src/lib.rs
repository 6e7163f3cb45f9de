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

//! Netweave core: the group-to-group constraint propagation engine
//!
//! Manages electrical-design constraint data for chip-package and board
//! projects. Declarative group-level relation intents are compiled into a
//! deduplicated pairwise matrix of reusable relation brands and materialized
//! onto a sparse per-rule-area assignment grid, converging idempotently
//! against previously hand-edited state.
//!
//! Surrounding systems (net-list parsing, rule value editing, document
//! storage) collaborate through the contracts in [`store`].

pub mod audit;
pub mod config;
pub mod g2g;
pub mod model;
pub mod store;

pub use config::EngineConfig;
pub use g2g::{CompileReport, G2gEngine, G2gError, G2gResult};
pub use store::{MemoryStore, ProjectState, StoreError, StoreResult};
