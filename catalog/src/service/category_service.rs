//! Category Service
//!
//! Public operations over the category forest. Every mutation runs its
//! validator or guard check first and writes once.

use std::sync::Arc;

use crate::domain::{now, Category, CategoryTree, CategoryWithBooks, DomainError, DomainResult};
use crate::repository::{BookAssociationOperations, CategoryHierarchyOperations};
use super::deletion_guard::DeletionGuard;
use super::hierarchy_validator::HierarchyValidator;

pub struct CategoryService<R, B> {
    store: Arc<R>,
    books: Arc<B>,
}

impl<R, B> Clone for CategoryService<R, B> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            books: self.books.clone(),
        }
    }
}

impl<R, B> CategoryService<R, B>
where
    R: CategoryHierarchyOperations,
    B: BookAssociationOperations,
{
    pub fn new(store: Arc<R>, books: Arc<B>) -> Self {
        Self { store, books }
    }

    fn validator(&self) -> HierarchyValidator<'_, R> {
        HierarchyValidator::new(self.store.as_ref())
    }

    fn guard(&self) -> DeletionGuard<'_, R, B> {
        DeletionGuard::new(self.store.as_ref(), self.books.as_ref())
    }

    pub async fn get_category(&self, id: u32) -> DomainResult<Option<Category>> {
        self.store.find_by_id(id).await
    }

    pub async fn list_categories(&self) -> DomainResult<Vec<Category>> {
        self.store.list().await
    }

    /// Create a category, optionally under an existing parent
    pub async fn create_category(
        &self,
        name: String,
        description: Option<String>,
        parent_id: Option<u32>,
    ) -> DomainResult<Category> {
        let name = validate_name(name)?;

        if !self.validator().validate_parent_assignment(None, parent_id).await? {
            let parent_id = parent_id.unwrap_or_default();
            log::warn!("Rejected category '{}': parent {} does not exist", name, parent_id);
            return Err(DomainError::InvalidParent(parent_id));
        }

        let mut category = Category::new(0, name);
        category.description = description;
        category.parent_id = parent_id;

        let created = self.store.create(&category).await?;
        log::info!("Created category {} '{}'", created.id, created.name);
        Ok(created)
    }

    /// Replace name, description and parent of a category.
    ///
    /// Returns `None` when the category does not exist. A `None` parent
    /// turns the category into a root.
    pub async fn update_category(
        &self,
        id: u32,
        name: String,
        description: Option<String>,
        parent_id: Option<u32>,
    ) -> DomainResult<Option<Category>> {
        let Some(mut category) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };

        let name = validate_name(name)?;

        if let Some(pid) = parent_id {
            if !self.validator().validate_parent_assignment(Some(id), Some(pid)).await? {
                log::warn!("Rejected parent {} for category {}", pid, id);
                return Err(DomainError::InvalidParentAssignment {
                    category_id: id,
                    parent_id: pid,
                });
            }
        }

        category.name = name;
        category.description = description;
        category.parent_id = parent_id;
        category.updated_at = now();

        let updated = self.store.update(&category).await?;
        log::info!("Updated category {}", updated.id);
        Ok(Some(updated))
    }

    /// Delete a leaf category. Returns `false` when it does not exist.
    pub async fn delete_category(&self, id: u32) -> DomainResult<bool> {
        if !self.store.exists(id).await? {
            return Ok(false);
        }

        if !self.guard().can_delete(id).await? {
            log::warn!("Refused to delete category {}: it has dependents", id);
            return Err(DomainError::CategoryHasDependents(id));
        }

        self.store.delete(id).await?;
        log::info!("Deleted category {}", id);
        Ok(true)
    }

    pub async fn can_delete_category(&self, id: u32) -> DomainResult<bool> {
        self.guard().can_delete(id).await
    }

    pub async fn get_root_categories(&self) -> DomainResult<Vec<Category>> {
        self.store.get_root_categories().await
    }

    pub async fn get_sub_categories(&self, parent_id: u32) -> DomainResult<Vec<Category>> {
        self.store.get_child_categories(parent_id).await
    }

    /// All root categories with their subtrees nested inside
    pub async fn get_category_hierarchy(&self) -> DomainResult<Vec<CategoryTree>> {
        let categories = self.store.list().await?;
        Ok(CategoryTree::build_forest(categories))
    }

    /// One category with its full subtree
    pub async fn get_category_with_subcategories(
        &self,
        id: u32,
    ) -> DomainResult<Option<CategoryTree>> {
        if !self.store.exists(id).await? {
            return Ok(None);
        }
        let categories = self.store.list().await?;
        Ok(CategoryTree::build_subtree(id, categories))
    }

    pub async fn get_category_with_books(&self, id: u32) -> DomainResult<Option<CategoryWithBooks>> {
        let Some(category) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };
        let book_ids = self.books.get_book_ids(id).await?;
        Ok(Some(CategoryWithBooks { category, book_ids }))
    }

    /// Case-insensitive substring search over names and descriptions
    pub async fn search_categories_by_name(&self, term: &str) -> DomainResult<Vec<Category>> {
        self.store.search(term).await
    }

    pub async fn category_exists(&self, id: u32) -> DomainResult<bool> {
        self.store.exists(id).await
    }

    /// File a book under an existing category
    pub async fn link_book(&self, book_id: u32, category_id: u32) -> DomainResult<()> {
        if !self.store.exists(category_id).await? {
            return Err(DomainError::NotFound(format!("Category {} not found", category_id)));
        }
        self.books.link_book(book_id, category_id).await?;
        log::debug!("Linked book {} to category {}", book_id, category_id);
        Ok(())
    }

    pub async fn unlink_book(&self, book_id: u32, category_id: u32) -> DomainResult<()> {
        self.books.unlink_book(book_id, category_id).await
    }
}

fn validate_name(name: String) -> DomainResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::InvalidInput("Category name must not be empty".to_string()));
    }
    Ok(trimmed.to_string())
}
