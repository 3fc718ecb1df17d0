//! Domain primitives shared by the authorization gate and the mutation engine.
//!
//! Nothing in here touches storage. The types are small, cheap to clone, and
//! carry the invariants the rest of the crate relies on (a role is one of
//! exactly two values, an anonymous actor has no role).

pub mod equipment;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Privilege level attached to an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            other => Err(format!(
                "Invalid role '{other}'. Expected 'admin' or 'user'"
            )),
        }
    }
}

/// The principal acting on one request.
///
/// Rebuilt from the session on every request and never persisted on its own.
/// `role` is `None` exactly when the actor is anonymous.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: Option<String>,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub department: Option<String>,
}

impl Actor {
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            id: None,
            username: None,
            role: None,
            department: None,
        }
    }

    #[must_use]
    pub fn authenticated(
        id: impl Into<String>,
        username: impl Into<String>,
        role: Role,
        department: Option<String>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            username: Some(username.into()),
            role: Some(role),
            department,
        }
    }

    #[must_use]
    pub const fn is_anonymous(&self) -> bool {
        self.role.is_none() || self.username.is_none()
    }

    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        !self.is_anonymous() && self.role == Some(role)
    }

    /// Identity recorded in audit columns (`created_by`, `changed_by`, ...).
    #[must_use]
    pub fn audit_name(&self) -> String {
        self.username
            .clone()
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// Kind of change recorded in the equipment history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryAction {
    Created,
    Updated,
    Deleted,
}

impl HistoryAction {
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Updated => "Updated",
            Self::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(Self::Created),
            "Updated" => Ok(Self::Updated),
            "Deleted" => Ok(Self::Deleted),
            other => Err(format!("Unknown history action '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_str() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
        assert_eq!(Role::User.to_string(), "user");
    }

    #[test]
    fn test_anonymous_actor_has_no_role() {
        let actor = Actor::anonymous();
        assert!(actor.is_anonymous());
        assert!(!actor.has_role(Role::User));
        assert!(!actor.has_role(Role::Admin));
    }

    #[test]
    fn test_authenticated_actor() {
        let actor = Actor::authenticated("1", "olena", Role::User, None);
        assert!(!actor.is_anonymous());
        assert!(actor.has_role(Role::User));
        assert!(!actor.has_role(Role::Admin));
        assert_eq!(actor.audit_name(), "olena");
    }

    #[test]
    fn test_history_action_labels() {
        assert_eq!(HistoryAction::Created.label(), "Created");
        assert_eq!("Deleted".parse::<HistoryAction>(), Ok(HistoryAction::Deleted));
        assert!("Removed".parse::<HistoryAction>().is_err());
    }
}
