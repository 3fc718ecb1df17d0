use crate::db::{Account, EquipmentRow, HistoryRow};
use crate::domain::Actor;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDto {
    pub id: String,
    pub name: String,
    pub inventory_number: String,
    pub category: String,
    pub location: String,
    pub date_added: String,
    pub created_at: String,
    pub updated_at: String,
    pub created_by: Option<String>,
    pub last_modified_by: Option<String>,
}

impl From<EquipmentRow> for EquipmentDto {
    fn from(row: EquipmentRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            inventory_number: row.inventory_number,
            category: row.category,
            location: row.location,
            date_added: row.date_added,
            created_at: row.created_at,
            updated_at: row.updated_at,
            created_by: row.created_by,
            last_modified_by: row.last_modified_by,
        }
    }
}

/// History rows keep the snake_case wire names existing clients read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntryDto {
    pub id: i32,
    pub action: String,
    pub equipment_id: String,
    pub equipment_name: String,
    pub equipment_inventory_number: String,
    pub details: String,
    pub changed_by: String,
    pub changed_at: String,
}

impl From<HistoryRow> for HistoryEntryDto {
    fn from(row: HistoryRow) -> Self {
        Self {
            id: row.id,
            action: row.action,
            equipment_id: row.equipment_id,
            equipment_name: row.equipment_name,
            equipment_inventory_number: row.equipment_inventory_number,
            details: row.details,
            changed_by: row.changed_by,
            changed_at: row.changed_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccountDto {
    pub id: String,
    pub username: String,
    pub role: String,
    pub department: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Account> for AccountDto {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            username: account.username,
            role: account.role,
            department: account.department,
            created_at: account.created_at,
            updated_at: account.updated_at,
        }
    }
}

/// Body of `POST /users`. Fields are optional so missing ones become a
/// validation message rather than a JSON rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateAccountRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUserDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub is_logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl From<&Actor> for CurrentUserDto {
    fn from(actor: &Actor) -> Self {
        if actor.is_anonymous() {
            return Self {
                id: None,
                username: None,
                is_logged_in: false,
                role: None,
                department: None,
            };
        }

        Self {
            id: actor.id.clone(),
            username: actor.username.clone(),
            is_logged_in: true,
            role: actor.role.map(|r| r.as_str().to_string()),
            department: actor.department.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn test_anonymous_current_user_is_minimal() {
        let json = serde_json::to_value(CurrentUserDto::from(&Actor::anonymous())).unwrap();
        assert_eq!(json, serde_json::json!({ "isLoggedIn": false }));
    }

    #[test]
    fn test_logged_in_current_user() {
        let actor = Actor::authenticated("u1", "olena", Role::User, Some("IT".to_string()));
        let json = serde_json::to_value(CurrentUserDto::from(&actor)).unwrap();
        assert_eq!(json["isLoggedIn"], true);
        assert_eq!(json["role"], "user");
        assert_eq!(json["department"], "IT");
    }

    #[test]
    fn test_error_envelope_omits_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({ "success": false, "error": "nope" }));
    }
}
