//! System user administration.

use std::sync::Arc;

use log::{debug, info};

use crate::domain::commands::user::UserFilter;
use crate::domain::error::{DomainError, DomainResult, FieldErrorKind, ValidationErrors};
use crate::domain::models::student::{FormMode, PasswordInput};
use crate::domain::models::user::{SystemUser, UserDraft, UserPayload};
use crate::storage::UserStorage;

pub const MIN_PASSWORD_CHARS: usize = 6;

#[derive(Clone)]
pub struct UserAdminService {
    storage: Arc<dyn UserStorage>,
}

impl UserAdminService {
    pub fn new(storage: Arc<dyn UserStorage>) -> Self {
        Self { storage }
    }

    pub fn validate(draft: &UserDraft, mode: FormMode) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if draft.username.trim().is_empty() {
            errors.push("username", FieldErrorKind::Required);
        }
        if draft.name.trim().is_empty() {
            errors.push("name", FieldErrorKind::Required);
        }
        let email = draft.email.trim();
        if !email.is_empty() && !email.contains('@') {
            errors.push("email", FieldErrorKind::InvalidFormat("e-mail"));
        }

        match (&draft.password, mode) {
            (PasswordInput::SetTo(password), _) if !password.is_empty() => {
                if password.chars().count() < MIN_PASSWORD_CHARS {
                    errors.push("password", FieldErrorKind::TooShort(MIN_PASSWORD_CHARS));
                }
                if *password != draft.password_confirmation {
                    errors.push("password_confirmation", FieldErrorKind::Mismatch);
                }
            }
            (_, FormMode::Create) => errors.push("password", FieldErrorKind::PasswordRequired),
            (_, FormMode::Edit) => {}
        }
        errors
    }

    pub fn build_payload(draft: &UserDraft, mode: FormMode) -> DomainResult<UserPayload> {
        Self::validate(draft, mode).into_result()?;
        let password = match &draft.password {
            PasswordInput::SetTo(password) if !password.is_empty() => Some(password.clone()),
            _ => None,
        };
        Ok(UserPayload {
            company_id: draft.company_id.clone(),
            username: draft.username.trim().to_string(),
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            role: draft.role,
            permissions: draft.permissions.clone(),
            phone: draft.phone.trim().to_string(),
            status: draft.status,
            password,
        })
    }

    pub async fn create(&self, draft: &UserDraft) -> DomainResult<SystemUser> {
        let payload = Self::build_payload(draft, FormMode::Create)?;
        let user = self.storage.create_user(&payload).await?;
        info!("👤 Created user {} ({})", user.username, user.role.as_wire());
        Ok(user)
    }

    pub async fn update(&self, user_id: &str, draft: &UserDraft) -> DomainResult<SystemUser> {
        let payload = Self::build_payload(draft, FormMode::Edit)?;
        let user = self.storage.update_user(user_id, &payload).await?;
        info!("👤 Updated user {}", user.username);
        Ok(user)
    }

    pub async fn delete(&self, user_id: &str) -> DomainResult<()> {
        if !self.storage.delete_user(user_id).await? {
            return Err(DomainError::NotFound(format!("user {} not found", user_id)));
        }
        info!("👤 Deleted user {}", user_id);
        Ok(())
    }

    pub async fn get(&self, user_id: &str) -> DomainResult<SystemUser> {
        self.storage
            .get_user(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user {} not found", user_id)))
    }

    /// Users matching every filter set; `search` looks at name, username and e-mail
    pub async fn list(&self, filter: &UserFilter) -> DomainResult<Vec<SystemUser>> {
        let needle = filter
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let users: Vec<SystemUser> = self
            .storage
            .list_users()
            .await?
            .into_iter()
            .filter(|u| filter.role.map_or(true, |role| u.role == role))
            .filter(|u| filter.status.map_or(true, |status| u.status == status))
            .filter(|u| {
                needle.as_ref().map_or(true, |needle| {
                    [&u.name, &u.username, &u.email]
                        .iter()
                        .any(|field| field.to_lowercase().contains(needle.as_str()))
                })
            })
            .collect();

        debug!("Found {} users", users.len());
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::user::Role;
    use crate::domain::models::RecordStatus;
    use crate::storage::memory::{MemoryConnection, MemoryUserRepository};

    fn create_test_service() -> UserAdminService {
        let conn = Arc::new(MemoryConnection::new());
        UserAdminService::new(Arc::new(MemoryUserRepository::new(conn)))
    }

    fn draft(username: &str, name: &str, role: Role) -> UserDraft {
        UserDraft {
            username: username.to_string(),
            name: name.to_string(),
            email: format!("{}@academia.test", username),
            password: PasswordInput::SetTo("segredo1".to_string()),
            password_confirmation: "segredo1".to_string(),
            role,
            company_id: "empresa::1".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_password_rules() {
        let mut user = draft("joana", "Joana", Role::Manager);
        user.password = PasswordInput::SetTo("123".to_string());
        user.password_confirmation = "124".to_string();
        let errors = UserAdminService::validate(&user, FormMode::Create);
        assert_eq!(errors.kind_of("password"), Some(&FieldErrorKind::TooShort(6)));
        assert_eq!(errors.kind_of("password_confirmation"), Some(&FieldErrorKind::Mismatch));

        user.password = PasswordInput::Unchanged;
        assert!(UserAdminService::validate(&user, FormMode::Edit).is_valid());
        assert_eq!(
            UserAdminService::validate(&user, FormMode::Create).kind_of("password"),
            Some(&FieldErrorKind::PasswordRequired)
        );
    }

    #[test]
    fn test_required_fields() {
        let mut user = draft("", "", Role::User);
        user.email = "sem-arroba".to_string();
        let errors = UserAdminService::validate(&user, FormMode::Create);
        assert!(errors.has("username"));
        assert!(errors.has("name"));
        assert!(errors.has("email"));
    }

    #[tokio::test]
    async fn test_crud_and_filter() {
        let service = create_test_service();
        let joana = service.create(&draft("joana", "Joana Prado", Role::Manager)).await.unwrap();
        service.create(&draft("pedro", "Pedro Reis", Role::Instructor)).await.unwrap();

        let mut edit = UserDraft::from_user(&joana);
        edit.status = RecordStatus::Inactive;
        let updated = service.update(&joana.id, &edit).await.unwrap();
        assert_eq!(updated.status, RecordStatus::Inactive);

        let instructors = service
            .list(&UserFilter {
                role: Some(Role::Instructor),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(instructors.len(), 1);
        assert_eq!(instructors[0].username, "pedro");

        let search = service
            .list(&UserFilter {
                search: Some("PRADO".to_string()),
                status: Some(RecordStatus::Inactive),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(search.len(), 1);

        service.delete(&joana.id).await.unwrap();
        assert!(matches!(service.get(&joana.id).await, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let service = create_test_service();
        service.create(&draft("joana", "Joana", Role::User)).await.unwrap();
        let err = service.create(&draft("joana", "Outra", Role::User)).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
