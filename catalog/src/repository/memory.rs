//! In-Memory Repository
//!
//! Category arena keyed by ID, for tests and embedding without SQLite.
//! Children are found by scanning `parent_id`, never stored as links.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

use crate::domain::{now, Category, DomainError, DomainResult};
use super::traits::{
    BookAssociationOperations, CategoryHierarchyOperations, Repository, SearchableRepository,
};

/// In-memory implementation of Category repository
pub struct InMemoryCategoryRepository {
    categories: RwLock<BTreeMap<u32, Category>>,
    /// (category_id, book_id) pairs
    book_links: RwLock<BTreeSet<(u32, u32)>>,
    next_id: AtomicU32,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self {
            categories: RwLock::new(BTreeMap::new()),
            book_links: RwLock::new(BTreeSet::new()),
            next_id: AtomicU32::new(1),
        }
    }
}

impl Default for InMemoryCategoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Repository<Category> for InMemoryCategoryRepository {
    async fn create(&self, entity: &Category) -> DomainResult<Category> {
        let mut categories = self.categories.write().await;
        let id = self
            .next_id
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map_err(|_| DomainError::Internal("Category ids exhausted".to_string()))?;
        let now = now();

        let category = Category {
            id,
            created_at: now,
            updated_at: now,
            ..entity.clone()
        };
        categories.insert(category.id, category.clone());

        Ok(category)
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn list(&self) -> DomainResult<Vec<Category>> {
        Ok(self.categories.read().await.values().cloned().collect())
    }

    async fn update(&self, entity: &Category) -> DomainResult<Category> {
        let mut categories = self.categories.write().await;

        let slot = categories
            .get_mut(&entity.id)
            .ok_or_else(|| DomainError::NotFound(format!("Category {} not found", entity.id)))?;
        *slot = entity.clone();

        Ok(entity.clone())
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        self.categories
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::NotFound(format!("Category {} not found", id)))
    }
}

#[async_trait]
impl SearchableRepository<Category> for InMemoryCategoryRepository {
    async fn search(&self, query: &str) -> DomainResult<Vec<Category>> {
        let term = query.to_lowercase();
        Ok(self
            .categories
            .read()
            .await
            .values()
            .filter(|c| c.matches(&term))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CategoryHierarchyOperations for InMemoryCategoryRepository {
    async fn get_root_categories(&self) -> DomainResult<Vec<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .filter(|c| c.is_root())
            .cloned()
            .collect())
    }

    async fn get_child_categories(&self, parent_id: u32) -> DomainResult<Vec<Category>> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .filter(|c| c.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn exists(&self, id: u32) -> DomainResult<bool> {
        Ok(self.categories.read().await.contains_key(&id))
    }
}

#[async_trait]
impl BookAssociationOperations for InMemoryCategoryRepository {
    async fn link_book(&self, book_id: u32, category_id: u32) -> DomainResult<()> {
        self.book_links.write().await.insert((category_id, book_id));
        Ok(())
    }

    async fn unlink_book(&self, book_id: u32, category_id: u32) -> DomainResult<()> {
        self.book_links.write().await.remove(&(category_id, book_id));
        Ok(())
    }

    async fn get_book_ids(&self, category_id: u32) -> DomainResult<Vec<u32>> {
        Ok(self
            .book_links
            .read()
            .await
            .range((category_id, u32::MIN)..=(category_id, u32::MAX))
            .map(|&(_, book_id)| book_id)
            .collect())
    }
}
