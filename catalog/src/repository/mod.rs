//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod db;
mod memory;
mod category;


pub use traits::{
    BookAssociationOperations, CategoryHierarchyOperations, Repository, SearchableRepository,
};
pub use db::{init_db, DbState};
pub use memory::InMemoryCategoryRepository;
pub use category::CategoryRepository;
