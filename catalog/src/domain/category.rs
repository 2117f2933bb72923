//! Category Entity
//!
//! Categories form a forest: each category points at most at one parent by id,
//! children are derived by looking up who points back.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity::Entity;

/// Current time truncated to the millisecond precision the store persists.
pub fn now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// A node of the category hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier, assigned by the store
    pub id: u32,
    /// Display label, never empty
    pub name: String,
    pub description: Option<String>,
    /// `None` for root categories
    pub parent_id: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(id: u32, name: String) -> Self {
        let now = now();
        Self {
            id,
            name,
            description: None,
            parent_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_parent(id: u32, name: String, parent_id: u32) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::new(id, name)
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Case-insensitive substring match over name and description.
    ///
    /// `term_lower` must already be lowercased.
    pub fn matches(&self, term_lower: &str) -> bool {
        self.name.to_lowercase().contains(term_lower)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(term_lower))
    }
}

impl Entity for Category {
    type Id = u32;

    fn id(&self) -> Self::Id {
        self.id
    }
}

/// A category with its nested subcategories, for presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTree {
    #[serde(flatten)]
    pub category: Category,
    pub parent_name: Option<String>,
    pub sub_categories: Vec<CategoryTree>,
}

impl CategoryTree {
    /// Build one tree per root category from a flat snapshot.
    pub fn build_forest(categories: Vec<Category>) -> Vec<CategoryTree> {
        let index = TreeIndex::new(categories);
        let mut visited = HashSet::new();

        index
            .roots()
            .into_iter()
            .filter_map(|root| index.assemble(root, &mut visited))
            .collect()
    }

    /// Build the subtree rooted at `root_id`, if that category is in the snapshot.
    pub fn build_subtree(root_id: u32, categories: Vec<Category>) -> Option<CategoryTree> {
        let index = TreeIndex::new(categories);
        let root = index.by_id.get(&root_id)?.clone();
        let mut visited = HashSet::new();
        index.assemble(root, &mut visited)
    }

    /// Number of categories in this tree, including the root.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut to_visit = vec![self];
        while let Some(node) = to_visit.pop() {
            count += 1;
            to_visit.extend(node.sub_categories.iter());
        }
        count
    }
}

// Drops nested levels iteratively so deep trees cannot overflow the stack.
impl Drop for CategoryTree {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.sub_categories);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.sub_categories);
        }
    }
}

struct TreeIndex {
    by_id: HashMap<u32, Category>,
    children: HashMap<u32, Vec<u32>>,
}

impl TreeIndex {
    fn new(categories: Vec<Category>) -> Self {
        let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
        for category in &categories {
            if let Some(parent_id) = category.parent_id {
                children.entry(parent_id).or_default().push(category.id);
            }
        }
        for ids in children.values_mut() {
            ids.sort_unstable();
        }

        Self {
            by_id: categories.into_iter().map(|c| (c.id, c)).collect(),
            children,
        }
    }

    fn roots(&self) -> Vec<Category> {
        let mut roots: Vec<Category> = self
            .by_id
            .values()
            .filter(|c| c.is_root())
            .cloned()
            .collect();
        roots.sort_by_key(|c| c.id);
        roots
    }

    // Each category is expanded at most once, even if stored parents loop.
    fn assemble(&self, root: Category, visited: &mut HashSet<u32>) -> Option<CategoryTree> {
        // Pre-order walk; each entry remembers the slot of its parent.
        let mut order: Vec<(Category, Option<usize>)> = Vec::new();
        let mut to_visit = vec![(root, None)];

        while let Some((category, parent_slot)) = to_visit.pop() {
            if !visited.insert(category.id) {
                continue;
            }
            let slot = order.len();
            if let Some(child_ids) = self.children.get(&category.id) {
                for child_id in child_ids.iter().rev() {
                    if visited.contains(child_id) {
                        continue;
                    }
                    if let Some(child) = self.by_id.get(child_id) {
                        to_visit.push((child.clone(), Some(slot)));
                    }
                }
            }
            order.push((category, parent_slot));
        }

        // Children always follow their parent in pre-order, so walking
        // backwards finishes every subtree before its parent needs it.
        let mut finished: Vec<Vec<CategoryTree>> = Vec::new();
        finished.resize_with(order.len(), Vec::new);
        let mut tree = None;

        while let Some((category, parent_slot)) = order.pop() {
            let slot = order.len();
            let mut sub_categories = std::mem::take(&mut finished[slot]);
            sub_categories.reverse();

            let parent_name = category
                .parent_id
                .and_then(|pid| self.by_id.get(&pid))
                .map(|p| p.name.clone());
            let node = CategoryTree {
                category,
                parent_name,
                sub_categories,
            };

            match parent_slot {
                Some(parent) => finished[parent].push(node),
                None => tree = Some(node),
            }
        }

        tree
    }
}

/// A category together with the ids of the books filed under it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryWithBooks {
    #[serde(flatten)]
    pub category: Category,
    pub book_ids: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Category> {
        vec![
            Category::new(1, "Fiction".to_string()),
            Category::with_parent(2, "Fantasy".to_string(), 1),
            Category::with_parent(3, "High Fantasy".to_string(), 2),
            Category::new(4, "Science".to_string()),
            Category::with_parent(5, "Mystery".to_string(), 1),
        ]
    }

    #[test]
    fn test_category_creation() {
        let category = Category::new(1, "Fiction".to_string());
        assert_eq!(category.id(), 1);
        assert!(category.is_root());
        assert_eq!(category.created_at, category.updated_at);
    }

    #[test]
    fn test_matches_name_and_description() {
        let mut category = Category::new(1, "Science Fiction".to_string());
        category.description = Some("Space OPERA and more".to_string());

        assert!(category.matches("fiction"));
        assert!(category.matches("opera"));
        assert!(!category.matches("poetry"));
    }

    #[test]
    fn test_build_forest_nests_grandchildren() {
        let forest = CategoryTree::build_forest(sample());

        assert_eq!(forest.len(), 2);
        let fiction = &forest[0];
        assert_eq!(fiction.category.name, "Fiction");
        assert_eq!(fiction.node_count(), 4);
        assert_eq!(fiction.sub_categories[0].category.name, "Fantasy");
        assert_eq!(
            fiction.sub_categories[0].sub_categories[0].parent_name.as_deref(),
            Some("Fantasy")
        );
        assert_eq!(forest[1].category.name, "Science");
        assert!(forest[1].sub_categories.is_empty());
    }

    #[test]
    fn test_build_subtree() {
        let subtree = CategoryTree::build_subtree(2, sample()).unwrap();
        assert_eq!(subtree.parent_name.as_deref(), Some("Fiction"));
        assert_eq!(subtree.node_count(), 2);

        assert!(CategoryTree::build_subtree(42, sample()).is_none());
    }

    #[test]
    fn test_build_subtree_terminates_on_cycle() {
        let categories = vec![
            Category::with_parent(1, "A".to_string(), 2),
            Category::with_parent(2, "B".to_string(), 1),
        ];

        let subtree = CategoryTree::build_subtree(1, categories).unwrap();
        assert_eq!(subtree.node_count(), 2);
    }

    #[test]
    fn test_build_forest_handles_deep_chain() {
        const DEPTH: u32 = 20_000;
        let mut categories = vec![Category::new(1, "n1".to_string())];
        for id in 2..=DEPTH {
            categories.push(Category::with_parent(id, format!("n{}", id), id - 1));
        }

        let forest = CategoryTree::build_forest(categories);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].node_count(), DEPTH as usize);

        let mut node = &forest[0];
        let mut depth = 1;
        while let Some(child) = node.sub_categories.first() {
            assert_eq!(child.category.parent_id, Some(node.category.id));
            node = child;
            depth += 1;
        }
        assert_eq!(depth, DEPTH);
        assert_eq!(node.parent_name.as_deref(), Some("n19999"));
    }

    #[test]
    fn test_children_keep_id_order() {
        let categories = vec![
            Category::new(1, "Root".to_string()),
            Category::with_parent(9, "Late".to_string(), 1),
            Category::with_parent(3, "Early".to_string(), 1),
            Category::with_parent(4, "Nested".to_string(), 3),
        ];

        let tree = CategoryTree::build_subtree(1, categories).unwrap();
        let names: Vec<&str> = tree
            .sub_categories
            .iter()
            .map(|t| t.category.name.as_str())
            .collect();
        assert_eq!(names, vec!["Early", "Late"]);
        assert_eq!(tree.sub_categories[0].sub_categories[0].category.name, "Nested");
    }
}
