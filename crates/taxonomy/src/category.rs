use serde::{Deserialize, Serialize};

use libris_core::{CategoryId, DomainError, DomainResult, Entity};

/// Attributes supplied when creating a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<CategoryId>,
    pub sort_order: i32,
}

/// Partial update of a category.
///
/// `parent_id` uses a double `Option`: `None` leaves the parent untouched,
/// `Some(None)` moves the node to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
    pub parent_id: Option<Option<CategoryId>>,
    pub sort_order: Option<i32>,
}

/// One node in the category tree.
///
/// `level` is derived: 1 for roots, `parent.level + 1` otherwise. Only the
/// hierarchy operations in [`crate::hierarchy`] may set it, so it stays
/// transitively consistent across the whole subtree after any mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    code: Option<String>,
    description: Option<String>,
    parent_id: Option<CategoryId>,
    level: u32,
    sort_order: i32,
    version: u64,
}

impl Category {
    pub(crate) fn new(id: CategoryId, new: NewCategory, level: u32) -> DomainResult<Self> {
        if new.name.trim().is_empty() {
            return Err(DomainError::validation("name", "name cannot be empty"));
        }

        Ok(Self {
            id,
            name: new.name,
            code: new.code,
            description: new.description,
            parent_id: new.parent_id,
            level,
            sort_order: new.sort_order,
            version: 1,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn parent_id(&self) -> Option<CategoryId> {
        self.parent_id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn sort_order(&self) -> i32 {
        self.sort_order
    }

    pub(crate) fn apply_attributes(&mut self, update: &CategoryUpdate) -> DomainResult<()> {
        if let Some(name) = &update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name", "name cannot be empty"));
            }
        }

        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(code) = &update.code {
            self.code = Some(code.clone());
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(sort_order) = update.sort_order {
            self.sort_order = sort_order;
        }
        self.version += 1;
        Ok(())
    }

    /// Does not bump the version: a reparent is always paired with
    /// [`Self::apply_attributes`], which carries the single bump for the
    /// whole update.
    pub(crate) fn set_parent(&mut self, parent_id: Option<CategoryId>, level: u32) {
        self.parent_id = parent_id;
        self.level = level;
    }

    pub(crate) fn set_level(&mut self, level: u32) {
        if self.level != level {
            self.level = level;
            self.version += 1;
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}
