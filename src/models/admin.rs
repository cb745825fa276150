use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserRole;

/// The signed-in operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(default = "default_admin_role")]
    pub role: UserRole,
}

fn default_admin_role() -> UserRole {
    UserRole::Admin
}

/// Compact creator reference embedded in tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRef {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl From<&Admin> for AdminRef {
    fn from(admin: &Admin) -> Self {
        AdminRef {
            id: admin.id,
            username: admin.username.clone(),
            email: admin.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub admin: Admin,
}

/// Body of `PATCH /admin/auth/profile`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

/// Body of `POST /admin/auth/register` and `POST /admin/auth/setup`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminRegistration {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}
