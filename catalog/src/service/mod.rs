//! Service Layer
//!
//! Category operations composed from the repository, the hierarchy
//! validator and the deletion guard.

mod category_service;
mod deletion_guard;
mod hierarchy_validator;

pub use category_service::CategoryService;
pub use deletion_guard::DeletionGuard;
pub use hierarchy_validator::HierarchyValidator;
