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

//! Relation-brand registry
//!
//! Resolves the brand references carried by group contexts into concrete
//! brand ids, reusing existing project brands where possible and staging
//! new ones otherwise. Staged brands are not persisted here; the finalizer
//! commits the subset that ends up referenced by at least one slot.

use crate::g2g::error::{G2gError, G2gResult};
use crate::model::{BrandRef, LayerGroupDefaults, RelationBrand};
use tracing::debug;

/// Reuse-or-create allocator threading brand state through one compilation run
pub struct BrandAllocator {
    existing: Vec<RelationBrand>,
    staged: Vec<RelationBrand>,
    defaults: LayerGroupDefaults,
    created: usize,
    reused: usize,
}

impl BrandAllocator {
    /// Start a run against the project's existing brands and defaults
    pub fn new(existing: Vec<RelationBrand>, defaults: LayerGroupDefaults) -> Self {
        Self {
            existing,
            staged: Vec::new(),
            defaults,
            created: 0,
            reused: 0,
        }
    }

    /// Resolve a brand reference to a brand id, creating a staged brand
    /// under `default_name` when the reference names nothing yet.
    ///
    /// Existing brands are matched by id or case-insensitive name and are
    /// never renamed. An id that resolves to no brand at all is an unknown
    /// reference, since ids cannot be aspirational the way names can.
    pub fn resolve(&mut self, project_id: &str, pointer: &BrandRef, default_name: &str) -> G2gResult<String> {
        match pointer {
            BrandRef::Id(id) => {
                if let Some(brand) = self.existing.iter().find(|b| &b.id == id) {
                    self.reused += 1;
                    return Ok(brand.id.clone());
                }
                if let Some(brand) = self.staged.iter().find(|b| &b.id == id) {
                    return Ok(brand.id.clone());
                }
                Err(G2gError::unknown("brand", id))
            }
            BrandRef::Name(name) => self.resolve_by_name(project_id, name),
            BrandRef::Unset => self.resolve_by_name(project_id, default_name),
        }
    }

    fn resolve_by_name(&mut self, project_id: &str, name: &str) -> G2gResult<String> {
        if name.is_empty() {
            return Err(G2gError::validation("Brand name is empty"));
        }
        if let Some(brand) = self.existing.iter().find(|b| b.name_matches(name)) {
            self.reused += 1;
            return Ok(brand.id.clone());
        }
        if let Some(brand) = self.staged.iter().find(|b| b.name_matches(name)) {
            return Ok(brand.id.clone());
        }
        self.create(project_id, name)
    }

    fn create(&mut self, project_id: &str, name: &str) -> G2gResult<String> {
        let layer_group_set_id = if !self.defaults.clearance_default_set_id.is_empty() {
            self.defaults.clearance_default_set_id.clone()
        } else if !self.defaults.golden_set_id.is_empty() {
            self.defaults.golden_set_id.clone()
        } else {
            return Err(G2gError::configuration(format!(
                "Cannot create brand '{}': project has neither a clearance-default nor a golden layer-group-set",
                name
            )));
        };

        let brand = RelationBrand::new(project_id, name, layer_group_set_id);
        let id = brand.id.clone();
        debug!("Staged new brand '{}' ({})", brand.name, id);
        self.staged.push(brand);
        self.created += 1;
        Ok(id)
    }

    /// Brands newly staged during this run
    pub fn created(&self) -> usize {
        self.created
    }

    /// Existing brands reused during this run
    pub fn reused(&self) -> usize {
        self.reused
    }

    /// Consume the allocator, yielding the existing and staged brand lists
    pub fn into_parts(self) -> (Vec<RelationBrand>, Vec<RelationBrand>) {
        (self.existing, self.staged)
    }
}
