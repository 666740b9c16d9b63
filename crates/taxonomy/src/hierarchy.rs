//! Category tree maintenance.
//!
//! All operations work against the caller's category map so that a
//! reparenting and the level propagation over its descendants are one unit
//! of work: on error the caller rolls the map back.

use std::collections::HashMap;

use libris_core::{CategoryId, DomainError, DomainResult, Entity};

use crate::category::{Category, CategoryUpdate, NewCategory};

/// Hard cap on tree depth.
///
/// Bounds the ancestor walk (so a malformed parent chain cannot loop
/// forever) and the level propagation work stack.
pub const MAX_DEPTH: u32 = 64;

/// A category with its children nested, ordered by `sort_order` at every
/// depth.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CategoryNode {
    #[serde(flatten)]
    pub category: Category,
    pub children: Vec<CategoryNode>,
}

/// Create a category; `level` is `parent.level + 1`, or 1 for roots.
pub fn create(
    categories: &mut HashMap<CategoryId, Category>,
    id: CategoryId,
    new: NewCategory,
) -> DomainResult<Category> {
    let level = match new.parent_id {
        Some(parent_id) => {
            let parent = categories
                .get(&parent_id)
                .ok_or_else(|| DomainError::not_found("Category", parent_id))?;
            if parent.level() >= MAX_DEPTH {
                return Err(DomainError::conflict("category tree is too deep"));
            }
            parent.level() + 1
        }
        None => 1,
    };

    let category = Category::new(id, new, level)?;
    categories.insert(id, category.clone());
    Ok(category)
}

/// Update a category's attributes and, when `parent_id` changes, recompute
/// its level and propagate the change to every descendant.
///
/// Reparenting is guarded against cycles: the proposed parent's ancestor
/// chain is walked first, and the move is rejected if the node itself
/// appears in it (self-parenting included).
pub fn update(
    categories: &mut HashMap<CategoryId, Category>,
    id: CategoryId,
    update: CategoryUpdate,
) -> DomainResult<Category> {
    let current = categories
        .get(&id)
        .ok_or_else(|| DomainError::not_found("Category", id))?;

    let reparent = match update.parent_id {
        Some(new_parent) if new_parent != current.parent_id() => Some(new_parent),
        _ => None,
    };

    if let Some(new_parent) = reparent {
        let new_level = match new_parent {
            Some(parent_id) => {
                ensure_not_ancestor_of(categories, id, parent_id)?;
                let parent = categories
                    .get(&parent_id)
                    .ok_or_else(|| DomainError::not_found("Category", parent_id))?;
                if parent.level() >= MAX_DEPTH {
                    return Err(DomainError::conflict("category tree is too deep"));
                }
                parent.level() + 1
            }
            None => 1,
        };

        let node = categories
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Category", id))?;
        node.apply_attributes(&update)?;
        node.set_parent(new_parent, new_level);
        propagate_levels(categories, id)?;
    } else {
        let node = categories
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("Category", id))?;
        node.apply_attributes(&update)?;
    }

    categories
        .get(&id)
        .cloned()
        .ok_or_else(|| DomainError::not_found("Category", id))
}

/// Delete a category. Blocked while any child category or linked book
/// exists.
pub fn delete(
    categories: &mut HashMap<CategoryId, Category>,
    id: CategoryId,
    linked_books: usize,
) -> DomainResult<Category> {
    if !categories.contains_key(&id) {
        return Err(DomainError::not_found("Category", id));
    }
    if categories.values().any(|c| c.parent_id() == Some(id)) {
        return Err(DomainError::conflict(
            "cannot delete a category that has child categories",
        ));
    }
    if linked_books > 0 {
        return Err(DomainError::conflict(
            "cannot delete a category that has linked books",
        ));
    }

    categories
        .remove(&id)
        .ok_or_else(|| DomainError::not_found("Category", id))
}

/// Build the nested tree: roots first, children under their parent, ordered
/// by `sort_order` (ties by id) at every depth.
pub fn tree(categories: &HashMap<CategoryId, Category>) -> Vec<CategoryNode> {
    let mut children_of: HashMap<Option<CategoryId>, Vec<&Category>> = HashMap::new();
    for category in categories.values() {
        children_of
            .entry(category.parent_id())
            .or_default()
            .push(category);
    }
    for siblings in children_of.values_mut() {
        siblings.sort_by_key(|c| (c.sort_order(), *c.id()));
    }

    build_nodes(&children_of, None, 0)
}

fn build_nodes(
    children_of: &HashMap<Option<CategoryId>, Vec<&Category>>,
    parent: Option<CategoryId>,
    depth: u32,
) -> Vec<CategoryNode> {
    if depth >= MAX_DEPTH {
        return Vec::new();
    }
    children_of
        .get(&parent)
        .map(|siblings| {
            siblings
                .iter()
                .map(|category| CategoryNode {
                    category: (*category).clone(),
                    children: build_nodes(children_of, Some(*category.id()), depth + 1),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Walk the ancestor chain of `candidate_parent`; fail if `node` appears in
/// it. The walk is bounded so a corrupted parent chain surfaces as an error
/// instead of an infinite loop.
fn ensure_not_ancestor_of(
    categories: &HashMap<CategoryId, Category>,
    node: CategoryId,
    candidate_parent: CategoryId,
) -> DomainResult<()> {
    if candidate_parent == node {
        return Err(DomainError::conflict(
            "a category cannot be its own parent",
        ));
    }

    let mut cursor = Some(candidate_parent);
    let mut hops = 0u32;
    while let Some(current) = cursor {
        if current == node {
            return Err(DomainError::conflict(
                "reparenting would create a cycle in the category tree",
            ));
        }
        hops += 1;
        if hops > MAX_DEPTH {
            return Err(DomainError::conflict(
                "category parent chain exceeds maximum depth",
            ));
        }
        cursor = categories.get(&current).and_then(|c| c.parent_id());
    }
    Ok(())
}

/// Recompute `level` for every descendant of `root` with an explicit work
/// stack (depth-first, children in `sort_order`). Bounded by [`MAX_DEPTH`].
fn propagate_levels(
    categories: &mut HashMap<CategoryId, Category>,
    root: CategoryId,
) -> DomainResult<()> {
    let mut stack: Vec<CategoryId> = vec![root];

    while let Some(parent_id) = stack.pop() {
        let parent_level = match categories.get(&parent_id) {
            Some(parent) => parent.level(),
            None => continue,
        };
        if parent_level >= MAX_DEPTH {
            return Err(DomainError::conflict("category tree is too deep"));
        }

        let mut children: Vec<(i32, CategoryId)> = categories
            .values()
            .filter(|c| c.parent_id() == Some(parent_id))
            .map(|c| (c.sort_order(), *c.id()))
            .collect();
        children.sort();

        // Reverse so the lowest sort_order is visited first.
        for (_, child_id) in children.iter().rev() {
            stack.push(*child_id);
        }
        for (_, child_id) in children {
            if let Some(child) = categories.get_mut(&child_id) {
                child.set_level(parent_level + 1);
            }
        }
    }

    Ok(())
}
