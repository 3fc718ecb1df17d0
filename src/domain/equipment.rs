//! Equipment input contract: required fields, date checks and label normalization.

use chrono::NaiveDate;
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

static DATE_ADDED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"));

/// Raw equipment payload as submitted by a client. Every field is optional so
/// that missing fields surface as a validation error instead of a JSON
/// rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentInput {
    pub name: Option<String>,
    pub inventory_number: Option<String>,
    pub category: Option<String>,
    pub location: Option<String>,
    pub date_added: Option<String>,
}

/// Validated and normalized equipment fields, ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipmentDraft {
    pub name: String,
    pub inventory_number: String,
    pub category: String,
    pub location: String,
    /// Canonical `YYYY-MM-DD`. Kept as the submitted string, never re-derived
    /// through a timestamp.
    pub date_added: String,
}

impl EquipmentDraft {
    pub fn from_input(input: &EquipmentInput) -> Result<Self, String> {
        let field = |value: &Option<String>| {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(ToString::to_string)
        };

        let name = field(&input.name);
        let inventory_number = field(&input.inventory_number);
        let category = field(&input.category);
        let location = field(&input.location);
        let date_added = field(&input.date_added);

        let missing: Vec<&str> = [
            ("name", name.is_none()),
            ("inventoryNumber", inventory_number.is_none()),
            ("category", category.is_none()),
            ("location", location.is_none()),
            ("dateAdded", date_added.is_none()),
        ]
        .into_iter()
        .filter_map(|(label, absent)| absent.then_some(label))
        .collect();

        let (
            Some(name),
            Some(inventory_number),
            Some(category),
            Some(location),
            Some(date_added),
        ) = (name, inventory_number, category, location, date_added)
        else {
            return Err(format!("Missing required fields: {}", missing.join(", ")));
        };

        validate_date_added(&date_added)?;

        Ok(Self {
            name,
            inventory_number,
            category: normalize_label(&category),
            location: normalize_label(&location),
            date_added,
        })
    }
}

/// Checks that `value` is a `YYYY-MM-DD` string naming a real calendar day.
pub fn validate_date_added(value: &str) -> Result<NaiveDate, String> {
    if !DATE_ADDED_RE.is_match(value) {
        return Err(format!(
            "Invalid date format for dateAdded: '{value}'. Expected YYYY-MM-DD"
        ));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        format!("Invalid date value for dateAdded: '{value}' (month or day out of range)")
    })
}

/// Trims, upper-cases the first character and lower-cases the rest.
#[must_use]
pub fn normalize_label(value: &str) -> String {
    let trimmed = value.trim();
    let mut chars = trimmed.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = chars.as_str().to_lowercase();
    first.to_uppercase().chain(rest.chars()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> EquipmentInput {
        EquipmentInput {
            name: Some("HP EliteBook".to_string()),
            inventory_number: Some("INV001".to_string()),
            category: Some("laptops".to_string()),
            location: Some("office 101".to_string()),
            date_added: Some("2024-03-15".to_string()),
        }
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  lAPTOP  "), "Laptop");
        assert_eq!(normalize_label("office 101"), "Office 101");
        assert_eq!(normalize_label("SERVER ROOM A"), "Server room a");
        assert_eq!(normalize_label("   "), "");
        assert_eq!(normalize_label("кабінет"), "Кабінет");
    }

    #[test]
    fn test_validate_date_added() {
        assert!(validate_date_added("2024-03-15").is_ok());
        assert!(validate_date_added("2024-02-29").is_ok());
        assert!(validate_date_added("2023-02-29").is_err());
        assert!(validate_date_added("2024-04-31").is_err());
        assert!(validate_date_added("2024-13-01").is_err());
        assert!(validate_date_added("2024-00-10").is_err());
        assert!(validate_date_added("2024-3-15").is_err());
        assert!(validate_date_added("15.03.2024").is_err());
        assert!(validate_date_added("2024-03-15T00:00:00Z").is_err());
    }

    #[test]
    fn test_draft_normalizes_category_and_location() {
        let draft = EquipmentDraft::from_input(&input()).unwrap();
        assert_eq!(draft.category, "Laptops");
        assert_eq!(draft.location, "Office 101");
        assert_eq!(draft.date_added, "2024-03-15");
        assert_eq!(draft.name, "HP EliteBook");
    }

    #[test]
    fn test_draft_reports_missing_fields() {
        let mut raw = input();
        raw.name = None;
        raw.location = Some("   ".to_string());

        let err = EquipmentDraft::from_input(&raw).unwrap_err();
        assert_eq!(err, "Missing required fields: name, location");
    }

    #[test]
    fn test_draft_rejects_bad_date() {
        let mut raw = input();
        raw.date_added = Some("2024-06-31".to_string());
        assert!(EquipmentDraft::from_input(&raw).is_err());
    }
}
