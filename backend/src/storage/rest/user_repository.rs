use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use shared::UserDto;

use super::{deleted, found};
use crate::domain::mappers::UserMapper;
use crate::domain::models::user::{SystemUser, UserPayload};
use crate::io::ApiClient;
use crate::storage::UserStorage;

#[derive(Clone)]
pub struct RestUserRepository {
    client: Arc<ApiClient>,
}

impl RestUserRepository {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl UserStorage for RestUserRepository {
    async fn create_user(&self, user: &UserPayload) -> Result<SystemUser> {
        let dto: UserDto = self.client.post_json("/usuarios", &UserMapper::to_dto(user)).await?;
        Ok(UserMapper::from_dto(dto)?)
    }

    async fn update_user(&self, user_id: &str, user: &UserPayload) -> Result<SystemUser> {
        let path = format!("/usuarios/{}", user_id);
        let mut dto: UserDto = self.client.put_json(&path, &UserMapper::to_dto(user)).await?;
        dto.id.get_or_insert_with(|| user_id.to_string());
        Ok(UserMapper::from_dto(dto)?)
    }

    async fn delete_user(&self, user_id: &str) -> Result<bool> {
        let path = format!("/usuarios/{}", user_id);
        Ok(deleted(self.client.delete(&path).await)?)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<SystemUser>> {
        let path = format!("/usuarios/{}", user_id);
        let dto = found(self.client.get_json::<UserDto>(&path, &[]).await)?;
        Ok(dto.map(UserMapper::from_dto).transpose()?)
    }

    async fn list_users(&self) -> Result<Vec<SystemUser>> {
        let page = self.client.get_list::<UserDto>("/usuarios", &[], "usuarios").await?;
        let users = page
            .items
            .into_iter()
            .map(UserMapper::from_dto)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}
