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

//! Group-to-group constraint propagation
//!
//! Turns declarative group-level relation intents into a deduplicated
//! pairwise brand assignment matrix. The pipeline runs leaf-first: channel
//! parsing, layout expansion, member resolution, brand allocation, pairing
//! compilation, slot materialization and brand finalization, driven end to
//! end by [`engine::G2gEngine`].

pub mod channel;
pub mod engine;
pub mod error;
pub mod expansion;
pub mod finalize;
pub mod materialize;
pub mod pairing;
pub mod registry;
pub mod resolve;

pub use channel::{MAX_CHANNELS, parse_channel_range};
pub use engine::{CleanupReport, CompileReport, G2gEngine, GridSyncReport, LayoutSyncReport, OP_G2G_COMPILE};
pub use error::{G2gError, G2gResult};
pub use expansion::{InterfaceLayout, expand_interface_layout};
pub use finalize::{BrandCommit, clean_group_references, commit_brands, normalize_groups, used_brand_ids};
pub use materialize::{MaterializedGrid, materialize};
pub use pairing::{CompiledPairing, PairingCompiler, PairingSet, pair_key, processing_order};
pub use registry::BrandAllocator;
pub use resolve::{GroupShape, classify, filter_members, relevant_netclasses};
