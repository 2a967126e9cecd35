use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cafeteria account. Authentication itself lives outside this service;
/// callers arrive with an already-established identity.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
}

/// Body for POST /api/users (admin-only registration).
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
}
