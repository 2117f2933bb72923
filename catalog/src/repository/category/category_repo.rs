//! Category Repository - Core CRUD Operations
//!
//! SQLite-backed implementation for Category CRUD operations.
//! Specialized operations are in separate modules:
//! - category_hierarchy: Parent-child lookups
//! - book_category: Book-Category relationships

use async_trait::async_trait;
use chrono::DateTime;
use rusqlite::{params, Connection, OptionalExtension, Params};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{now, Category, DomainError, DomainResult};
use super::super::traits::{Repository, SearchableRepository};

pub(super) const CATEGORY_COLUMNS: &str =
    "id, name, description, parent_id, created_at, updated_at";

/// SQLite implementation of Category repository
pub struct CategoryRepository {
    pub(super) conn: Arc<Mutex<Connection>>,
}

impl CategoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl Repository<Category> for CategoryRepository {
    async fn create(&self, entity: &Category) -> DomainResult<Category> {
        let conn = self.conn.lock().await;
        let now = now();

        conn.execute(
            "INSERT INTO categories (name, description, parent_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
            params![entity.name, entity.description, entity.parent_id, now.timestamp_millis()],
        )?;

        let id = conn.last_insert_rowid() as u32;

        Ok(Category {
            id,
            created_at: now,
            updated_at: now,
            ..entity.clone()
        })
    }

    async fn find_by_id(&self, id: u32) -> DomainResult<Option<Category>> {
        let conn = self.conn.lock().await;

        let category = conn
            .query_row(
                &format!("SELECT {} FROM categories WHERE id = ?1", CATEGORY_COLUMNS),
                params![id],
                row_to_category,
            )
            .optional()?;

        Ok(category)
    }

    async fn list(&self) -> DomainResult<Vec<Category>> {
        let conn = self.conn.lock().await;
        query_categories(
            &conn,
            &format!("SELECT {} FROM categories ORDER BY id", CATEGORY_COLUMNS),
            [],
        )
    }

    async fn update(&self, entity: &Category) -> DomainResult<Category> {
        let conn = self.conn.lock().await;

        let changed = conn.execute(
            "UPDATE categories SET name = ?1, description = ?2, parent_id = ?3, updated_at = ?4 WHERE id = ?5",
            params![
                entity.name,
                entity.description,
                entity.parent_id,
                entity.updated_at.timestamp_millis(),
                entity.id
            ],
        )?;

        if changed == 0 {
            return Err(DomainError::NotFound(format!("Category {} not found", entity.id)));
        }

        Ok(entity.clone())
    }

    async fn delete(&self, id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        let changed = conn.execute("DELETE FROM categories WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(DomainError::NotFound(format!("Category {} not found", id)));
        }

        Ok(())
    }
}

#[async_trait]
impl SearchableRepository<Category> for CategoryRepository {
    async fn search(&self, query: &str) -> DomainResult<Vec<Category>> {
        let categories = self.list().await?;

        // SQLite's lower() only folds ASCII, so matching happens here
        let term = query.to_lowercase();
        Ok(categories.into_iter().filter(|c| c.matches(&term)).collect())
    }
}

/// Run a SELECT over `CATEGORY_COLUMNS` and collect the rows
pub(super) fn query_categories<P: Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> DomainResult<Vec<Category>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, row_to_category)?;
    let categories = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(categories)
}

/// Convert a database row to Category
pub(super) fn row_to_category(row: &rusqlite::Row) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get::<_, Option<String>>(2)?,
        parent_id: row.get::<_, Option<u32>>(3)?,
        created_at: DateTime::from_timestamp_millis(row.get(4)?).unwrap_or_default(),
        updated_at: DateTime::from_timestamp_millis(row.get(5)?).unwrap_or_default(),
    })
}
