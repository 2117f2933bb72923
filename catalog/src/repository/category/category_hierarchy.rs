//! Category Hierarchy Operations
//!
//! Parent-child lookups over the categories table.

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{Category, DomainResult};
use crate::repository::traits::CategoryHierarchyOperations;
use super::category_repo::{query_categories, CategoryRepository, CATEGORY_COLUMNS};

#[async_trait]
impl CategoryHierarchyOperations for CategoryRepository {
    async fn get_root_categories(&self) -> DomainResult<Vec<Category>> {
        let conn = self.conn.lock().await;
        query_categories(
            &conn,
            &format!(
                "SELECT {} FROM categories WHERE parent_id IS NULL ORDER BY id",
                CATEGORY_COLUMNS
            ),
            [],
        )
    }

    async fn get_child_categories(&self, parent_id: u32) -> DomainResult<Vec<Category>> {
        let conn = self.conn.lock().await;
        query_categories(
            &conn,
            &format!(
                "SELECT {} FROM categories WHERE parent_id = ?1 ORDER BY id",
                CATEGORY_COLUMNS
            ),
            params![parent_id],
        )
    }

    async fn exists(&self, id: u32) -> DomainResult<bool> {
        let conn = self.conn.lock().await;
        let exists = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1)",
            params![id],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(exists)
    }
}
