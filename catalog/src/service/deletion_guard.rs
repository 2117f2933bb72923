//! Deletion Guard
//!
//! Only leaf categories without filed books may be removed.

use crate::domain::DomainResult;
use crate::repository::{BookAssociationOperations, CategoryHierarchyOperations};

pub struct DeletionGuard<'a, R, B> {
    store: &'a R,
    books: &'a B,
}

impl<'a, R, B> DeletionGuard<'a, R, B>
where
    R: CategoryHierarchyOperations,
    B: BookAssociationOperations,
{
    pub fn new(store: &'a R, books: &'a B) -> Self {
        Self { store, books }
    }

    /// False for missing categories and for categories with dependents
    pub async fn can_delete(&self, id: u32) -> DomainResult<bool> {
        if !self.store.exists(id).await? {
            return Ok(false);
        }

        if !self.store.get_child_categories(id).await?.is_empty() {
            return Ok(false);
        }

        if self.books.has_books(id).await? {
            return Ok(false);
        }

        Ok(true)
    }
}
