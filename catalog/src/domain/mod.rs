//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has no storage dependencies (serde and chrono only).

mod entity;
mod category;

pub use entity::{Entity, DomainError, DomainResult};
pub use category::{now, Category, CategoryTree, CategoryWithBooks};
