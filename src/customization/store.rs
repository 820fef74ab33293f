use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::customization::{
    CustomizationGroup, CustomizationItem, CustomizationSection,
};

/// One section of a customization form as submitted by the editor.
#[derive(Debug, Clone, Deserialize)]
pub struct SectionInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<ItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<String>,
}

/// A section that survived blank-row filtering, positions already contiguous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanSection {
    pub title: String,
    pub items: Vec<CleanItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanItem {
    pub name: String,
    pub price: Option<String>,
}

/// Drop sections with blank titles and items with blank names, trimming the
/// text that survives. The editor submits half-filled form rows freely;
/// skipping them here (instead of erroring) mirrors that tolerance. Survivor
/// order is input order, so re-insert positions stay contiguous.
pub fn surviving_sections(sections: &[SectionInput]) -> Vec<CleanSection> {
    sections
        .iter()
        .filter_map(|section| {
            let title = section.title.trim();
            if title.is_empty() {
                return None;
            }
            let items = section
                .items
                .iter()
                .filter_map(|item| {
                    let name = item.name.trim();
                    if name.is_empty() {
                        return None;
                    }
                    let price = item
                        .price
                        .as_deref()
                        .map(str::trim)
                        .filter(|p| !p.is_empty())
                        .map(str::to_string);
                    Some(CleanItem {
                        name: name.to_string(),
                        price,
                    })
                })
                .collect();
            Some(CleanSection {
                title: title.to_string(),
                items,
            })
        })
        .collect()
}

/// Transactional access for the cascade replacer. Like the ordering store,
/// commit/rollback belongs to the caller.
#[async_trait]
pub trait CustomizationStore: Send {
    async fn category_exists(&mut self, category_id: Uuid) -> Result<bool, DatabaseError>;

    /// Create or update the group row for a category, returning its id.
    async fn upsert_group(
        &mut self,
        category_id: Uuid,
        enabled: bool,
    ) -> Result<Uuid, DatabaseError>;

    /// Delete every section owned by the group; items cascade with them.
    async fn clear_sections(&mut self, group_id: Uuid) -> Result<(), DatabaseError>;

    async fn insert_section(
        &mut self,
        group_id: Uuid,
        title: &str,
        position: i32,
    ) -> Result<Uuid, DatabaseError>;

    async fn insert_item(
        &mut self,
        section_id: Uuid,
        name: &str,
        price: Option<&str>,
        position: i32,
    ) -> Result<Uuid, DatabaseError>;

    /// Remove the group (and, by cascade, its whole tree). Returns whether
    /// a group existed.
    async fn delete_group(&mut self, category_id: Uuid) -> Result<bool, DatabaseError>;

    // Aggregate reads. All three must observe the same snapshot, so they
    // live on the store alongside the writes instead of running as
    // independent pool statements.

    async fn load_groups(&mut self) -> Result<Vec<CustomizationGroup>, DatabaseError>;

    /// Every section, ordered by position.
    async fn load_sections(&mut self) -> Result<Vec<CustomizationSection>, DatabaseError>;

    /// Every item, ordered by position.
    async fn load_items(&mut self) -> Result<Vec<CustomizationItem>, DatabaseError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(title: &str, items: Vec<ItemInput>) -> SectionInput {
        SectionInput {
            title: title.to_string(),
            items,
        }
    }

    fn item(name: &str, price: Option<&str>) -> ItemInput {
        ItemInput {
            name: name.to_string(),
            price: price.map(str::to_string),
        }
    }

    #[test]
    fn blank_sections_and_items_are_dropped() {
        let clean = surviving_sections(&[
            section("", vec![]),
            section(
                "Broth",
                vec![item("", None), item("Extra Beef", Some("$2"))],
            ),
        ]);
        assert_eq!(clean.len(), 1);
        assert_eq!(clean[0].title, "Broth");
        assert_eq!(clean[0].items.len(), 1);
        assert_eq!(clean[0].items[0].name, "Extra Beef");
        assert_eq!(clean[0].items[0].price.as_deref(), Some("$2"));
    }

    #[test]
    fn whitespace_only_counts_as_blank() {
        let clean = surviving_sections(&[section("   ", vec![item("Tofu", None)])]);
        assert!(clean.is_empty());
    }

    #[test]
    fn text_is_trimmed_and_empty_price_becomes_none() {
        let clean = surviving_sections(&[section(
            "  Spice Level ",
            vec![item(" Mild ", Some("  "))],
        )]);
        assert_eq!(clean[0].title, "Spice Level");
        assert_eq!(clean[0].items[0].name, "Mild");
        assert_eq!(clean[0].items[0].price, None);
    }

    #[test]
    fn survivor_order_is_input_order() {
        let clean = surviving_sections(&[
            section("A", vec![]),
            section("", vec![]),
            section("B", vec![]),
        ]);
        let titles: Vec<&str> = clean.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B"]);
    }
}
