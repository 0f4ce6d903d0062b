//! Shared storage helper functions.
//!
//! Versioned-write checks used by every backend so that insert, replace and
//! conflict semantics are identical across implementations.

use crate::models::{Lead, Student};

use super::{Result, StorageError};

/// An entity stored with an optimistic-concurrency version.
pub trait Versioned: Clone {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    fn id(&self) -> &str;
    fn version(&self) -> u64;
    fn set_version(&mut self, version: u64);
}

impl Versioned for Student {
    const ENTITY: &'static str = "student";

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

impl Versioned for Lead {
    const ENTITY: &'static str = "lead";

    fn id(&self) -> &str {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Validate a versioned write against the currently stored version.
///
/// Returns the version the entity will carry once written.
pub fn next_version<T: Versioned>(
    id: &str,
    stored: Option<u64>,
    expected: Option<u64>,
) -> Result<u64> {
    match (stored, expected) {
        (None, None) => Ok(1),
        (Some(_), None) => Err(StorageError::AlreadyExists {
            entity: T::ENTITY,
            id: id.to_string(),
        }),
        (None, Some(_)) => Err(StorageError::NotFound {
            entity: T::ENTITY,
            id: id.to_string(),
        }),
        (Some(actual), Some(expected)) if actual == expected => Ok(actual + 1),
        (Some(actual), Some(expected)) => Err(StorageError::VersionConflict { expected, actual }),
    }
}

/// Build the `NotFound` error for an entity type.
pub fn not_found<T: Versioned>(id: &str) -> StorageError {
    StorageError::NotFound {
        entity: T::ENTITY,
        id: id.to_string(),
    }
}
