//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations can use SQLite, in-memory, etc.

use async_trait::async_trait;
use crate::domain::{Category, Entity, DomainResult};

/// Core repository trait for CRUD operations
///
/// Generic over any Entity type.
/// All operations are async to support various backends.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Create a new entity, returning it with its assigned ID
    async fn create(&self, entity: &T) -> DomainResult<T>;

    /// Find entity by ID
    async fn find_by_id(&self, id: T::Id) -> DomainResult<Option<T>>;

    /// List all entities
    async fn list(&self) -> DomainResult<Vec<T>>;

    /// Update an existing entity
    async fn update(&self, entity: &T) -> DomainResult<T>;

    /// Delete entity by ID
    async fn delete(&self, id: T::Id) -> DomainResult<()>;
}

/// Extension for repositories that support text search
#[async_trait]
pub trait SearchableRepository<T: Entity>: Repository<T> {
    /// Search entities by text query
    async fn search(&self, query: &str) -> DomainResult<Vec<T>>;
}

/// Parent-child lookups over the category forest
#[async_trait]
pub trait CategoryHierarchyOperations: SearchableRepository<Category> {
    /// Get categories without a parent
    async fn get_root_categories(&self) -> DomainResult<Vec<Category>>;

    /// Get direct children of a category
    async fn get_child_categories(&self, parent_id: u32) -> DomainResult<Vec<Category>>;

    /// Check whether a category with this ID is stored
    async fn exists(&self, id: u32) -> DomainResult<bool> {
        Ok(self.find_by_id(id).await?.is_some())
    }
}

/// Book-category join relation
///
/// Books are owned elsewhere; only their IDs are recorded here.
#[async_trait]
pub trait BookAssociationOperations: Send + Sync {
    /// File a book under a category. Linking twice is a no-op.
    async fn link_book(&self, book_id: u32, category_id: u32) -> DomainResult<()>;

    /// Remove a book from a category
    async fn unlink_book(&self, book_id: u32, category_id: u32) -> DomainResult<()>;

    /// Get IDs of all books filed under a category
    async fn get_book_ids(&self, category_id: u32) -> DomainResult<Vec<u32>>;

    /// Check whether any book is filed under a category
    async fn has_books(&self, category_id: u32) -> DomainResult<bool> {
        Ok(!self.get_book_ids(category_id).await?.is_empty())
    }
}
