//! Hierarchical cascade replacer for per-category customization trees.
//!
//! The editor saves the whole tree (group -> sections -> items) on every
//! submit; there is no incremental path. Persisting is therefore a wholesale
//! replace inside one transaction: upsert the group, delete the old sections
//! (items cascade), re-insert the submitted tree with positions taken from
//! array order. A reader either sees the previous tree or the new one,
//! never a group stripped of its sections.

pub mod pg;
pub mod store;

use std::collections::HashMap;

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::customization::{
    CustomizationGroup, CustomizationItem, CustomizationSection,
};
use self::store::{surviving_sections, CustomizationStore, SectionInput};

#[derive(Debug, Error)]
pub enum CustomizationError {
    #[error("customization allows at most {max} sections, got {got}")]
    TooManySections { max: usize, got: usize },

    #[error("category {0} does not exist")]
    CategoryNotFound(Uuid),

    #[error(transparent)]
    Store(#[from] DatabaseError),
}

/// A customization tree as persisted, returned so caller-side caches match
/// the store exactly (including which blank rows were dropped).
#[derive(Debug, Clone, Serialize)]
pub struct Tree {
    pub enabled: bool,
    pub sections: Vec<TreeSection>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeSection {
    pub id: Uuid,
    pub title: String,
    pub position: i32,
    pub items: Vec<TreeItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TreeItem {
    pub id: Uuid,
    pub name: String,
    pub price: Option<String>,
    pub position: i32,
}

/// Replace the whole customization tree of a category.
///
/// Sections beyond `max_sections` are rejected before any write; blank
/// sections and items are silently dropped and surviving rows get contiguous
/// positions in input order. On `Err` the caller must roll back.
pub async fn replace_tree<S: CustomizationStore + ?Sized>(
    store: &mut S,
    category_id: Uuid,
    enabled: bool,
    sections: &[SectionInput],
    max_sections: usize,
) -> Result<Tree, CustomizationError> {
    if sections.len() > max_sections {
        return Err(CustomizationError::TooManySections {
            max: max_sections,
            got: sections.len(),
        });
    }

    if !store.category_exists(category_id).await? {
        return Err(CustomizationError::CategoryNotFound(category_id));
    }

    let clean = surviving_sections(sections);
    debug!(%category_id, sections = clean.len(), "replacing customization tree");

    let group_id = store.upsert_group(category_id, enabled).await?;
    store.clear_sections(group_id).await?;

    let mut tree = Tree {
        enabled,
        sections: Vec::with_capacity(clean.len()),
    };

    for (section_position, section) in clean.iter().enumerate() {
        let section_position = section_position as i32;
        let section_id = store
            .insert_section(group_id, &section.title, section_position)
            .await?;

        let mut items = Vec::with_capacity(section.items.len());
        for (item_position, item) in section.items.iter().enumerate() {
            let item_position = item_position as i32;
            let item_id = store
                .insert_item(section_id, &item.name, item.price.as_deref(), item_position)
                .await?;
            items.push(TreeItem {
                id: item_id,
                name: item.name.clone(),
                price: item.price.clone(),
                position: item_position,
            });
        }

        tree.sections.push(TreeSection {
            id: section_id,
            title: section.title.clone(),
            position: section_position,
            items,
        });
    }

    Ok(tree)
}

/// Remove a category's customization tree. Idempotent: deleting a category
/// that never had one is a no-op.
pub async fn delete_tree<S: CustomizationStore + ?Sized>(
    store: &mut S,
    category_id: Uuid,
) -> Result<(), CustomizationError> {
    let existed = store.delete_group(category_id).await?;
    debug!(%category_id, existed, "deleted customization tree");
    Ok(())
}

/// Load every category's customization tree.
///
/// All three reads run inside one REPEATABLE READ transaction: at READ
/// COMMITTED each statement gets its own snapshot, and a replace committing
/// between the sections read and the items read would pair stale section
/// rows with items that reference the freshly inserted section ids, handing
/// the reader sections stripped of their items.
pub async fn fetch_all(pool: &PgPool) -> Result<HashMap<Uuid, Tree>, DatabaseError> {
    let mut tx = pool.begin().await?;
    sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ")
        .execute(&mut *tx)
        .await?;

    let trees = {
        let mut store = pg::PgCustomizationStore::new(&mut tx);
        load_trees(&mut store).await?
    };

    tx.commit().await?;
    Ok(trees)
}

/// Assemble the category -> tree map from one store snapshot.
pub async fn load_trees<S: CustomizationStore + ?Sized>(
    store: &mut S,
) -> Result<HashMap<Uuid, Tree>, DatabaseError> {
    let groups = store.load_groups().await?;
    let sections = store.load_sections().await?;
    let items = store.load_items().await?;
    Ok(assemble_trees(groups, sections, items))
}

fn assemble_trees(
    groups: Vec<CustomizationGroup>,
    sections: Vec<CustomizationSection>,
    items: Vec<CustomizationItem>,
) -> HashMap<Uuid, Tree> {
    let mut items_by_section: HashMap<Uuid, Vec<TreeItem>> = HashMap::new();
    for item in items {
        items_by_section
            .entry(item.section_id)
            .or_default()
            .push(TreeItem {
                id: item.id,
                name: item.name,
                price: item.price,
                position: item.position,
            });
    }

    let mut sections_by_group: HashMap<Uuid, Vec<TreeSection>> = HashMap::new();
    for section in sections {
        let items = items_by_section.remove(&section.id).unwrap_or_default();
        sections_by_group
            .entry(section.group_id)
            .or_default()
            .push(TreeSection {
                id: section.id,
                title: section.title,
                position: section.position,
                items,
            });
    }

    groups
        .into_iter()
        .map(|group| {
            let sections = sections_by_group.remove(&group.id).unwrap_or_default();
            (
                group.category_id,
                Tree {
                    enabled: group.enabled,
                    sections,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn group(category_id: Uuid) -> CustomizationGroup {
        CustomizationGroup {
            id: Uuid::new_v4(),
            category_id,
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn assembles_nested_trees_in_position_order() {
        let category_id = Uuid::new_v4();
        let g = group(category_id);
        let s0 = CustomizationSection {
            id: Uuid::new_v4(),
            group_id: g.id,
            title: "Broth".to_string(),
            position: 0,
        };
        let s1 = CustomizationSection {
            id: Uuid::new_v4(),
            group_id: g.id,
            title: "Spice".to_string(),
            position: 1,
        };
        let i0 = CustomizationItem {
            id: Uuid::new_v4(),
            section_id: s0.id,
            name: "Extra Beef".to_string(),
            price: Some("$2".to_string()),
            position: 0,
        };

        // rows arrive pre-sorted by position, as fetch_all queries them
        let trees = assemble_trees(vec![g], vec![s0.clone(), s1.clone()], vec![i0]);
        assert_eq!(trees.len(), 1);
        let tree = &trees[&category_id];
        assert!(tree.enabled);
        assert_eq!(tree.sections.len(), 2);
        assert_eq!(tree.sections[0].title, "Broth");
        assert_eq!(tree.sections[0].items.len(), 1);
        assert_eq!(tree.sections[1].title, "Spice");
        assert!(tree.sections[1].items.is_empty());
    }

    #[test]
    fn group_with_no_sections_yields_empty_tree() {
        let category_id = Uuid::new_v4();
        let trees = assemble_trees(vec![group(category_id)], vec![], vec![]);
        assert!(trees[&category_id].sections.is_empty());
    }
}
