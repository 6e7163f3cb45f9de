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

//! Errors raised by the constraint engine

use crate::store::StoreError;
use thiserror::Error;

/// Engine-level error type
#[derive(Error, Debug)]
pub enum G2gError {
    /// Input rejected before any data was touched
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Persisted data is in a state the engine cannot work with
    #[error("Data correctness error: {message}")]
    DataCorrectness {
        /// What is inconsistent
        message: String,
    },

    /// Project is not set up for the requested operation
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is missing
        message: String,
    },

    /// A referenced entity does not exist
    #[error("Unknown {entity}: {id}")]
    UnknownReference {
        /// Entity kind, e.g. "interface"
        entity: String,
        /// Identifier that failed to resolve
        id: String,
    },

    /// Storage backend failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl G2gError {
    /// Validation error with a formatted message
    pub fn validation(message: impl Into<String>) -> Self {
        G2gError::Validation { message: message.into() }
    }

    /// Data-correctness error with a formatted message
    pub fn data(message: impl Into<String>) -> Self {
        G2gError::DataCorrectness { message: message.into() }
    }

    /// Configuration error with a formatted message
    pub fn configuration(message: impl Into<String>) -> Self {
        G2gError::Configuration { message: message.into() }
    }

    /// Unknown-reference error for an entity kind and id
    pub fn unknown(entity: impl Into<String>, id: impl Into<String>) -> Self {
        G2gError::UnknownReference {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Error type string for logging and metrics
    pub fn error_type(&self) -> &'static str {
        match self {
            G2gError::Validation { .. } => "validation",
            G2gError::DataCorrectness { .. } => "data_correctness",
            G2gError::Configuration { .. } => "configuration",
            G2gError::UnknownReference { .. } => "unknown_reference",
            G2gError::Store(_) => "store",
        }
    }

    /// Whether the error was raised by input validation
    pub fn is_validation(&self) -> bool {
        matches!(self, G2gError::Validation { .. })
    }
}

/// Result alias used throughout the engine
pub type G2gResult<T> = Result<T, G2gError>;
