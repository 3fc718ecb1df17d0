//! Derives history entries from equipment mutations.
//!
//! Everything here is pure: the repository calls these builders inside its
//! transaction with the rows it just read or wrote.

use crate::domain::HistoryAction;
use crate::entities::{equipment, equipment_history};
use sea_orm::{NotSet, Set};

/// One tracked field whose value differs between two versions of a row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub label: &'static str,
    pub old: String,
    pub new: String,
}

/// Compares the five tracked fields of `before` and `after`, in display order.
///
/// Values are compared as stored strings, so `date_added` is compared in its
/// canonical `YYYY-MM-DD` form.
#[must_use]
pub fn diff(before: &equipment::Model, after: &equipment::Model) -> Vec<FieldChange> {
    [
        ("name", &before.name, &after.name),
        (
            "inventory number",
            &before.inventory_number,
            &after.inventory_number,
        ),
        ("category", &before.category, &after.category),
        ("cabinet", &before.location, &after.location),
        ("date added", &before.date_added, &after.date_added),
    ]
    .into_iter()
    .filter(|(_, old, new)| old != new)
    .map(|(label, old, new)| FieldChange {
        label,
        old: old.clone(),
        new: new.clone(),
    })
    .collect()
}

#[must_use]
pub fn created_details(row: &equipment::Model) -> String {
    format!(
        "Created new equipment unit: '{}' (Inventory no.: {})",
        row.name, row.inventory_number
    )
}

/// `None` when nothing changed.
#[must_use]
pub fn updated_details(changes: &[FieldChange]) -> Option<String> {
    if changes.is_empty() {
        return None;
    }

    let parts: Vec<String> = changes
        .iter()
        .map(|c| format!("{} from \"{}\" to \"{}\"", c.label, c.old, c.new))
        .collect();

    Some(format!("Updated: {}.", parts.join(", ")))
}

#[must_use]
pub fn deleted_details(row: &equipment::Model) -> String {
    format!(
        "Deleted equipment unit: '{}' (Inventory no.: {}).",
        row.name, row.inventory_number
    )
}

fn entry(
    action: HistoryAction,
    row: &equipment::Model,
    details: String,
    changed_by: &str,
    changed_at: &str,
) -> equipment_history::ActiveModel {
    equipment_history::ActiveModel {
        id: NotSet,
        action: Set(action.label().to_string()),
        equipment_id: Set(row.id.clone()),
        equipment_name: Set(row.name.clone()),
        equipment_inventory_number: Set(row.inventory_number.clone()),
        details: Set(details),
        changed_by: Set(changed_by.to_string()),
        changed_at: Set(changed_at.to_string()),
    }
}

#[must_use]
pub fn created_entry(
    row: &equipment::Model,
    changed_by: &str,
    changed_at: &str,
) -> equipment_history::ActiveModel {
    entry(
        HistoryAction::Created,
        row,
        created_details(row),
        changed_by,
        changed_at,
    )
}

/// Builds the `Updated` entry, snapshotting the post-update name and
/// inventory number. `None` for a no-op edit.
#[must_use]
pub fn updated_entry(
    before: &equipment::Model,
    after: &equipment::Model,
    changed_by: &str,
    changed_at: &str,
) -> Option<equipment_history::ActiveModel> {
    let details = updated_details(&diff(before, after))?;
    Some(entry(
        HistoryAction::Updated,
        after,
        details,
        changed_by,
        changed_at,
    ))
}

#[must_use]
pub fn deleted_entry(
    row: &equipment::Model,
    changed_by: &str,
    changed_at: &str,
) -> equipment_history::ActiveModel {
    entry(
        HistoryAction::Deleted,
        row,
        deleted_details(row),
        changed_by,
        changed_at,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    fn row() -> equipment::Model {
        equipment::Model {
            id: "e1".to_string(),
            name: "HP EliteBook".to_string(),
            inventory_number: "INV001".to_string(),
            category: "Laptops".to_string(),
            location: "Office 101".to_string(),
            date_added: "2024-03-15".to_string(),
            created_at: "2024-03-15T09:00:00+00:00".to_string(),
            updated_at: "2024-03-15T09:00:00+00:00".to_string(),
            created_by: Some("olena".to_string()),
            last_modified_by: Some("olena".to_string()),
        }
    }

    #[test]
    fn test_diff_ignores_untracked_fields() {
        let before = row();
        let mut after = row();
        after.updated_at = "2024-04-01T00:00:00+00:00".to_string();
        after.last_modified_by = Some("taras".to_string());

        assert!(diff(&before, &after).is_empty());
        assert!(updated_entry(&before, &after, "taras", "now").is_none());
    }

    #[test]
    fn test_single_location_change() {
        let before = row();
        let mut after = row();
        after.location = "Office 102".to_string();

        let details = updated_details(&diff(&before, &after)).unwrap();
        assert_eq!(
            details,
            "Updated: cabinet from \"Office 101\" to \"Office 102\"."
        );
    }

    #[test]
    fn test_multiple_changes_keep_field_order() {
        let before = row();
        let mut after = row();
        after.date_added = "2024-03-16".to_string();
        after.name = "HP EliteBook 840".to_string();

        let details = updated_details(&diff(&before, &after)).unwrap();
        assert_eq!(
            details,
            "Updated: name from \"HP EliteBook\" to \"HP EliteBook 840\", \
             date added from \"2024-03-15\" to \"2024-03-16\"."
        );
        assert!(!details.contains("category"));
        assert!(!details.contains("cabinet"));
    }

    #[test]
    fn test_created_and_deleted_details() {
        assert_eq!(
            created_details(&row()),
            "Created new equipment unit: 'HP EliteBook' (Inventory no.: INV001)"
        );
        assert_eq!(
            deleted_details(&row()),
            "Deleted equipment unit: 'HP EliteBook' (Inventory no.: INV001)."
        );
    }

    #[test]
    fn test_entry_snapshots_row() {
        let entry = deleted_entry(&row(), "olena", "2024-05-01T00:00:00+00:00");
        assert_eq!(entry.action, ActiveValue::Set("Deleted".to_string()));
        assert_eq!(entry.equipment_id, ActiveValue::Set("e1".to_string()));
        assert_eq!(
            entry.equipment_inventory_number,
            ActiveValue::Set("INV001".to_string())
        );
        assert_eq!(entry.changed_by, ActiveValue::Set("olena".to_string()));
        assert!(entry.id.is_not_set());
    }
}
