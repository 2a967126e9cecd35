use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{error::ApiError, models::user::User};

/// In-process account directory. Authentication is an external collaborator;
/// this only resolves already-established identities and holds the profile
/// fields the roster and verification flows display.
pub struct UserDirectory {
    users: RwLock<HashMap<Uuid, User>>,
}

impl UserDirectory {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        is_admin: bool,
    ) -> Result<User, ApiError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == email) {
            return Err(ApiError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            is_admin,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn require(&self, id: Uuid) -> Result<User, ApiError> {
        self.get(id).await.ok_or(ApiError::UnknownUser)
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
