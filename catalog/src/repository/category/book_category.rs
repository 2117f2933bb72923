//! Book-Category Relationship Operations
//!
//! Operations for the many-to-many relationship between books and categories
//! (book_categories table).

use async_trait::async_trait;
use rusqlite::params;

use crate::domain::{now, DomainResult};
use crate::repository::traits::BookAssociationOperations;
use super::category_repo::CategoryRepository;

#[async_trait]
impl BookAssociationOperations for CategoryRepository {
    async fn link_book(&self, book_id: u32, category_id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "INSERT OR IGNORE INTO book_categories (book_id, category_id, created_at) VALUES (?1, ?2, ?3)",
            params![book_id, category_id, now().timestamp_millis()],
        )?;

        Ok(())
    }

    async fn unlink_book(&self, book_id: u32, category_id: u32) -> DomainResult<()> {
        let conn = self.conn.lock().await;

        conn.execute(
            "DELETE FROM book_categories WHERE book_id = ?1 AND category_id = ?2",
            params![book_id, category_id],
        )?;

        Ok(())
    }

    async fn get_book_ids(&self, category_id: u32) -> DomainResult<Vec<u32>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT book_id FROM book_categories WHERE category_id = ?1 ORDER BY book_id",
        )?;
        let rows = stmt.query_map(params![category_id], |row| row.get::<_, u32>(0))?;
        let ids = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    async fn has_books(&self, category_id: u32) -> DomainResult<bool> {
        let conn = self.conn.lock().await;
        let linked = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM book_categories WHERE category_id = ?1)",
            params![category_id],
            |row| row.get::<_, bool>(0),
        )?;
        Ok(linked)
    }
}
