//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.
//! All entities must have a unique ID and be thread-safe.
//! Driver errors are converted into `DomainError` in the repository layer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Copy + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
///
/// Every variant is a per-request condition; callers map them to their own
/// response format (not found, bad request, conflict).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Creation referenced a parent category that does not exist
    #[error("Parent category with ID {0} does not exist")]
    InvalidParent(u32),

    /// Update would make the category its own parent or ancestor
    #[error("Invalid parent category assignment: {parent_id} cannot be the parent of {category_id}")]
    InvalidParentAssignment { category_id: u32, parent_id: u32 },

    /// Deletion blocked by subcategories or linked books
    #[error("Cannot delete category {0}: it has subcategories or associated books")]
    CategoryHasDependents(u32),

    #[error("Internal error: {0}")]
    Internal(String),
}
