use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::connection::{hash_secret, MemoryConnection, StoredUser};
use crate::domain::models::generate_id;
use crate::domain::models::user::{SystemUser, UserPayload};
use crate::storage::{StorageError, UserStorage};

#[derive(Clone)]
pub struct MemoryUserRepository {
    conn: Arc<MemoryConnection>,
}

impl MemoryUserRepository {
    pub fn new(conn: Arc<MemoryConnection>) -> Self {
        Self { conn }
    }
}

fn to_user(id: String, payload: &UserPayload) -> SystemUser {
    SystemUser {
        id,
        company_id: payload.company_id.clone(),
        username: payload.username.clone(),
        name: payload.name.clone(),
        email: payload.email.clone(),
        role: payload.role,
        permissions: payload.permissions.clone(),
        phone: payload.phone.clone(),
        status: payload.status,
    }
}

#[async_trait]
impl UserStorage for MemoryUserRepository {
    async fn create_user(&self, user: &UserPayload) -> Result<SystemUser> {
        let mut tables = self.conn.write().await;
        if tables.users.values().any(|u| u.user.username == user.username) {
            return Err(StorageError::Conflict(format!("username {} is already taken", user.username)).into());
        }
        let created = to_user(generate_id("usuario"), user);
        tables.users.insert(
            created.id.clone(),
            StoredUser {
                user: created.clone(),
                password_hash: user.password.as_deref().map(hash_secret),
            },
        );
        Ok(created)
    }

    async fn update_user(&self, user_id: &str, user: &UserPayload) -> Result<SystemUser> {
        let mut tables = self.conn.write().await;
        if tables
            .users
            .values()
            .any(|u| u.user.username == user.username && u.user.id != user_id)
        {
            return Err(StorageError::Conflict(format!("username {} is already taken", user.username)).into());
        }
        let stored = tables
            .users
            .get_mut(user_id)
            .ok_or_else(|| StorageError::NotFound(format!("user {} not found", user_id)))?;
        stored.user = to_user(user_id.to_string(), user);
        if let Some(password) = &user.password {
            stored.password_hash = Some(hash_secret(password));
        }
        Ok(stored.user.clone())
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        let mut tables = self.conn.write().await;
        tables.sessions.remove(user_id);
        Ok(tables.users.remove(user_id).is_some())
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<SystemUser>> {
        Ok(self.conn.read().await.users.get(user_id).map(|u| u.user.clone()))
    }

    async fn list_users(&self) -> Result<Vec<SystemUser>> {
        let tables = self.conn.read().await;
        let mut users: Vec<SystemUser> = tables.users.values().map(|u| u.user.clone()).collect();
        users.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(users)
    }
}
