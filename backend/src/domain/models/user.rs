use serde::{Deserialize, Serialize};

use super::student::PasswordInput;
use super::RecordStatus;

/// Access profile of a system user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    SuperAdmin,
    Admin,
    /// GERENTE
    Manager,
    /// INSTRUTOR
    Instructor,
    /// USUARIO
    #[default]
    User,
}

impl Role {
    pub fn as_wire(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Manager => "GERENTE",
            Role::Instructor => "INSTRUTOR",
            Role::User => "USUARIO",
        }
    }

    pub fn from_wire(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "SUPER_ADMIN" => Some(Role::SuperAdmin),
            "ADMIN" => Some(Role::Admin),
            "GERENTE" => Some(Role::Manager),
            "INSTRUTOR" => Some(Role::Instructor),
            "USUARIO" => Some(Role::User),
            _ => None,
        }
    }

    /// Admins are granted every module permission
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemUser {
    pub id: String,
    pub company_id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// Grants in `module:action` form
    pub permissions: Vec<String>,
    pub phone: String,
    pub status: RecordStatus,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserDraft {
    pub username: String,
    pub name: String,
    pub email: String,
    pub password: PasswordInput,
    pub password_confirmation: String,
    pub role: Role,
    pub permissions: Vec<String>,
    pub phone: String,
    pub status: RecordStatus,
    pub company_id: String,
}

impl UserDraft {
    pub fn from_user(user: &SystemUser) -> Self {
        Self {
            username: user.username.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            password: PasswordInput::Unchanged,
            password_confirmation: String::new(),
            role: user.role,
            permissions: user.permissions.clone(),
            phone: user.phone.clone(),
            status: user.status,
            company_id: user.company_id.clone(),
        }
    }
}

/// Normalised user data; `password` is `None` when the stored one is kept
#[derive(Debug, Clone, PartialEq)]
pub struct UserPayload {
    pub company_id: String,
    pub username: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub permissions: Vec<String>,
    pub phone: String,
    pub status: RecordStatus,
    pub password: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_round_trip() {
        for role in [Role::SuperAdmin, Role::Admin, Role::Manager, Role::Instructor, Role::User] {
            assert_eq!(Role::from_wire(role.as_wire()), Some(role));
        }
        assert_eq!(Role::from_wire("ROOT"), None);
    }

    #[test]
    fn test_admin_roles() {
        assert!(Role::SuperAdmin.is_admin());
        assert!(Role::Admin.is_admin());
        assert!(!Role::Manager.is_admin());
    }
}
