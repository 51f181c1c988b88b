use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use log::debug;

use super::connection::{hash_secret, MemoryConnection};
use crate::domain::models::RecordStatus;
use crate::domain::session::{Company, SessionUser};
use crate::storage::AuthGateway;

/// Authenticates against the users table of a [`MemoryConnection`]
#[derive(Clone)]
pub struct MemoryAuthGateway {
    conn: Arc<MemoryConnection>,
}

impl MemoryAuthGateway {
    pub fn new(conn: Arc<MemoryConnection>) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl AuthGateway for MemoryAuthGateway {
    async fn login(&self, username: &str, password: &str) -> Result<Option<SessionUser>> {
        let mut tables = self.conn.write().await;
        let hash = hash_secret(password);
        let found = tables.users.values().find(|stored| {
            stored.user.username == username
                && stored.user.status == RecordStatus::Active
                && stored.password_hash.as_deref() == Some(hash.as_str())
        });
        let Some(stored) = found else {
            return Ok(None);
        };

        let user = &stored.user;
        let company = tables.company.clone().or_else(|| {
            (!user.company_id.is_empty()).then(|| Company {
                id: user.company_id.clone(),
                trade_name: String::new(),
            })
        });
        let session_user = SessionUser {
            id: user.id.clone(),
            name: user.name.clone(),
            username: user.username.clone(),
            email: (!user.email.is_empty()).then(|| user.email.clone()),
            role: user.role,
            permissions: user.permissions.clone(),
            company,
            license: tables.license.clone(),
        };
        tables.sessions.insert(session_user.id.clone());
        debug!("Opened memory session for {}", session_user.username);
        Ok(Some(session_user))
    }

    async fn validate(&self, user: &SessionUser) -> Result<bool> {
        Ok(self.conn.read().await.sessions.contains(&user.id))
    }

    async fn logout(&self) -> Result<()> {
        self.conn.write().await.sessions.clear();
        Ok(())
    }
}
