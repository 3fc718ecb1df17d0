//! Central authorization policy.
//!
//! Every request handler asks [`authorize`] before touching storage; nothing
//! else in the crate makes role decisions.
//!
//! | Action                                   | Required role |
//! |------------------------------------------|---------------|
//! | read equipment / catalog / history       | none          |
//! | create / update / delete equipment       | `user`        |
//! | list / create / update / delete accounts | `admin`       |
//! | update / delete an `admin` account       | never         |

use crate::domain::{Actor, Role};
use std::fmt;

/// Something an actor attempts to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ReadEquipment,
    ReadCatalog,
    ReadHistory,
    CreateEquipment,
    UpdateEquipment,
    DeleteEquipment,
    ListAccounts,
    CreateAccount,
    /// `target` is the role currently stored on the account being changed.
    UpdateAccount { target: Role },
    DeleteAccount { target: Role },
}

impl Action {
    const fn required_role(self) -> Option<Role> {
        match self {
            Self::ReadEquipment | Self::ReadCatalog | Self::ReadHistory => None,
            Self::CreateEquipment | Self::UpdateEquipment | Self::DeleteEquipment => {
                Some(Role::User)
            }
            Self::ListAccounts
            | Self::CreateAccount
            | Self::UpdateAccount { .. }
            | Self::DeleteAccount { .. } => Some(Role::Admin),
        }
    }

    const fn targets_protected_row(self) -> bool {
        matches!(
            self,
            Self::UpdateAccount {
                target: Role::Admin
            } | Self::DeleteAccount {
                target: Role::Admin
            }
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ReadEquipment => "read equipment",
            Self::ReadCatalog => "read catalog",
            Self::ReadHistory => "read history",
            Self::CreateEquipment => "create equipment",
            Self::UpdateEquipment => "update equipment",
            Self::DeleteEquipment => "delete equipment",
            Self::ListAccounts => "list accounts",
            Self::CreateAccount => "create account",
            Self::UpdateAccount { .. } => "update account",
            Self::DeleteAccount { .. } => "delete account",
        };
        f.write_str(name)
    }
}

/// Why a request was refused. `Unauthenticated` maps to 401, the other two
/// to 403.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    WrongRole { required: Role },
    ProtectedTarget,
}

impl DenyReason {
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "Not authenticated: you must be logged in to perform this action",
            Self::WrongRole {
                required: Role::User,
            } => "Forbidden: this action requires the 'user' role",
            Self::WrongRole {
                required: Role::Admin,
            } => "Forbidden: this action requires the 'admin' role",
            Self::ProtectedTarget => "Forbidden: administrator accounts cannot be modified or deleted",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthenticated => f.write_str("unauthenticated"),
            Self::WrongRole { required } => write!(f, "wrong role (requires {required})"),
            Self::ProtectedTarget => f.write_str("protected target"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// Converts into a `Result` so callers can use `?`.
    pub const fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Self::Allow => Ok(()),
            Self::Deny(reason) => Err(reason),
        }
    }
}

/// Decides whether `actor` may perform `action`.
///
/// Checks run in order: authentication, role, protected target. Roles are
/// exact, so an `admin` cannot mutate equipment and a `user` cannot manage
/// accounts.
#[must_use]
pub fn authorize(actor: &Actor, action: Action) -> Decision {
    let Some(required) = action.required_role() else {
        return Decision::Allow;
    };

    if actor.is_anonymous() {
        return Decision::Deny(DenyReason::Unauthenticated);
    }

    if !actor.has_role(required) {
        return Decision::Deny(DenyReason::WrongRole { required });
    }

    if action.targets_protected_row() {
        return Decision::Deny(DenyReason::ProtectedTarget);
    }

    Decision::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Actor {
        Actor::authenticated("a1", "root", Role::Admin, None)
    }

    fn user() -> Actor {
        Actor::authenticated("u1", "olena", Role::User, Some("IT".to_string()))
    }

    #[test]
    fn test_public_reads_allow_everyone() {
        for action in [Action::ReadEquipment, Action::ReadCatalog, Action::ReadHistory] {
            assert_eq!(authorize(&Actor::anonymous(), action), Decision::Allow);
            assert_eq!(authorize(&user(), action), Decision::Allow);
            assert_eq!(authorize(&admin(), action), Decision::Allow);
        }
    }

    #[test]
    fn test_equipment_mutations_require_user_role() {
        for action in [
            Action::CreateEquipment,
            Action::UpdateEquipment,
            Action::DeleteEquipment,
        ] {
            assert_eq!(
                authorize(&Actor::anonymous(), action),
                Decision::Deny(DenyReason::Unauthenticated)
            );
            assert_eq!(authorize(&user(), action), Decision::Allow);
            assert_eq!(
                authorize(&admin(), action),
                Decision::Deny(DenyReason::WrongRole {
                    required: Role::User
                })
            );
        }
    }

    #[test]
    fn test_account_management_requires_admin_role() {
        for action in [
            Action::ListAccounts,
            Action::CreateAccount,
            Action::UpdateAccount { target: Role::User },
            Action::DeleteAccount { target: Role::User },
        ] {
            assert_eq!(
                authorize(&Actor::anonymous(), action),
                Decision::Deny(DenyReason::Unauthenticated)
            );
            assert_eq!(
                authorize(&user(), action),
                Decision::Deny(DenyReason::WrongRole {
                    required: Role::Admin
                })
            );
            assert_eq!(authorize(&admin(), action), Decision::Allow);
        }
    }

    #[test]
    fn test_admin_accounts_are_protected() {
        for action in [
            Action::UpdateAccount {
                target: Role::Admin,
            },
            Action::DeleteAccount {
                target: Role::Admin,
            },
        ] {
            assert_eq!(
                authorize(&admin(), action),
                Decision::Deny(DenyReason::ProtectedTarget)
            );
            assert!(!authorize(&user(), action).is_allowed());
        }
    }

    #[test]
    fn test_actor_without_username_is_anonymous() {
        let actor = Actor {
            id: None,
            username: None,
            role: Some(Role::User),
            department: None,
        };
        assert_eq!(
            authorize(&actor, Action::CreateEquipment),
            Decision::Deny(DenyReason::Unauthenticated)
        );
    }

    #[test]
    fn test_into_result() {
        assert!(Decision::Allow.into_result().is_ok());
        assert_eq!(
            Decision::Deny(DenyReason::ProtectedTarget).into_result(),
            Err(DenyReason::ProtectedTarget)
        );
    }
}
