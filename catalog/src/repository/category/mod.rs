//! Category Repository Module
//!
//! This module provides category repository functionality split into specialized sub-modules:
//! - category_repo: Core CRUD operations and search
//! - category_hierarchy: Parent-child lookups
//! - book_category: Book-Category relationship operations

mod category_repo;
mod category_hierarchy;
mod book_category;

pub use category_repo::CategoryRepository;
