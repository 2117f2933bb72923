//! Hierarchy Validator
//!
//! Decides whether a parent assignment keeps the category forest acyclic.

use std::collections::HashSet;

use crate::domain::DomainResult;
use crate::repository::CategoryHierarchyOperations;

/// Read-only checks over the current parent links
pub struct HierarchyValidator<'a, R> {
    store: &'a R,
}

impl<'a, R: CategoryHierarchyOperations> HierarchyValidator<'a, R> {
    pub fn new(store: &'a R) -> Self {
        Self { store }
    }

    /// Whether `candidate_parent_id` may become the parent of `child_id`.
    ///
    /// Invalid when the parent is the child itself, does not exist, or already
    /// sits below the child. `child_id` is `None` for a category that has not
    /// been stored yet; it has no descendants, so only existence is checked.
    /// A `None` parent (root) is always valid.
    pub async fn validate_parent_assignment(
        &self,
        child_id: Option<u32>,
        candidate_parent_id: Option<u32>,
    ) -> DomainResult<bool> {
        let Some(parent_id) = candidate_parent_id else {
            return Ok(true);
        };

        if child_id == Some(parent_id) {
            return Ok(false);
        }

        if !self.store.exists(parent_id).await? {
            return Ok(false);
        }

        match child_id {
            Some(child_id) => Ok(!self.is_descendant(parent_id, child_id).await?),
            None => Ok(true),
        }
    }

    /// Whether `candidate_id` lies somewhere below `ancestor_id`.
    ///
    /// Depth-first walk over child lookups. Each category is expanded once,
    /// so the walk ends even if stored parent links form a loop.
    pub async fn is_descendant(&self, candidate_id: u32, ancestor_id: u32) -> DomainResult<bool> {
        let mut visited = HashSet::new();
        let mut to_visit = vec![ancestor_id];

        while let Some(current_id) = to_visit.pop() {
            if !visited.insert(current_id) {
                continue;
            }

            for child in self.store.get_child_categories(current_id).await? {
                if child.id == candidate_id {
                    return Ok(true);
                }
                if !visited.contains(&child.id) {
                    to_visit.push(child.id);
                }
            }
        }

        Ok(false)
    }
}
