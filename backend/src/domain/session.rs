//! # Session
//!
//! The logged-in user, their permissions and the company license, held in a
//! read-only [`SessionContext`] built once at login and passed explicitly to
//! whatever needs it.

use std::sync::Arc;

use chrono::NaiveDate;
use log::{info, warn};

use crate::domain::error::{DomainError, DomainResult, FieldErrorKind, ValidationErrors};
use crate::domain::models::user::Role;
use crate::storage::AuthGateway;

#[derive(Debug, Clone, PartialEq)]
pub struct Company {
    pub id: String,
    pub trade_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct License {
    pub kind: String,
    pub expires_on: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
}

impl License {
    /// Valid through its expiry date. Without a date, the remaining-days
    /// counter reported at login decides.
    pub fn is_valid(&self, today: NaiveDate) -> bool {
        match (self.expires_on, self.days_remaining) {
            (Some(expires_on), _) => expires_on >= today,
            (None, Some(days)) => days > 0,
            (None, None) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub permissions: Vec<String>,
    pub company: Option<Company>,
    pub license: Option<License>,
}

/// Read-only view of the current session. Cloning shares the same user.
#[derive(Debug, Clone)]
pub struct SessionContext {
    user: Arc<SessionUser>,
}

impl SessionContext {
    pub fn new(user: SessionUser) -> Self {
        Self { user: Arc::new(user) }
    }

    pub fn current_user(&self) -> &SessionUser {
        &self.user
    }

    pub fn company_id(&self) -> Option<&str> {
        self.user.company.as_ref().map(|c| c.id.as_str())
    }

    /// Admins hold every permission; everyone else needs `module:action`
    /// or `module:*` among their grants.
    pub fn has_permission(&self, module: &str, action: &str) -> bool {
        if self.user.role.is_admin() {
            return true;
        }
        let exact = format!("{}:{}", module, action);
        let wildcard = format!("{}:*", module);
        self.user
            .permissions
            .iter()
            .any(|grant| *grant == exact || *grant == wildcard)
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.user.role == role
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.contains(&self.user.role)
    }

    /// A session without a license is never valid
    pub fn is_license_valid(&self, today: NaiveDate) -> bool {
        self.user
            .license
            .as_ref()
            .map(|license| license.is_valid(today))
            .unwrap_or(false)
    }
}

/// Login, token validation and logout over an [`AuthGateway`]
#[derive(Clone)]
pub struct AuthService {
    gateway: Arc<dyn AuthGateway>,
}

impl AuthService {
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        Self { gateway }
    }

    pub async fn login(&self, username: &str, password: &str) -> DomainResult<SessionContext> {
        let username = username.trim();
        let mut errors = ValidationErrors::new();
        if username.is_empty() {
            errors.push("username", FieldErrorKind::Required);
        }
        if password.is_empty() {
            errors.push("password", FieldErrorKind::Required);
        }
        errors.into_result()?;

        match self.gateway.login(username, password).await? {
            Some(user) => {
                info!("🔐 User {} logged in as {}", user.username, user.role.as_wire());
                Ok(SessionContext::new(user))
            }
            None => {
                warn!("Rejected login for {}", username);
                Err(DomainError::Auth("invalid username or password".to_string()))
            }
        }
    }

    /// Ask the backend whether the session is still accepted
    pub async fn validate(&self, session: &SessionContext) -> DomainResult<bool> {
        let valid = self.gateway.validate(session.current_user()).await?;
        if !valid {
            warn!("Session for {} is no longer valid", session.current_user().username);
        }
        Ok(valid)
    }

    pub async fn logout(&self) -> DomainResult<()> {
        self.gateway.logout().await?;
        info!("🔐 Logged out");
        Ok(())
    }
}
