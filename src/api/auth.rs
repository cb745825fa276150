use super::{Ack, ApiClient, LOGIN_PATH};
use crate::error::AppError;
use crate::models::admin::{AdminRegistration, LoginRequest, LoginResponse, ProfileUpdate};
use crate::models::Admin;

impl ApiClient {
    /// `POST /auth/login`. Does not touch the session; the sign-in page does.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AppError> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.post(LOGIN_PATH, &req).await
    }

    pub async fn get_profile(&self) -> Result<Admin, AppError> {
        self.get("/auth/profile", &[]).await
    }

    pub async fn update_profile(&self, profile: &ProfileUpdate) -> Result<Ack, AppError> {
        self.patch("/auth/profile", profile).await
    }

    pub async fn create_admin(&self, admin: &AdminRegistration) -> Result<Ack, AppError> {
        self.post("/auth/register", admin).await
    }

    /// First-run bootstrap of the super admin account.
    pub async fn setup_super_admin(&self, admin: &AdminRegistration) -> Result<Ack, AppError> {
        self.post("/auth/setup", admin).await
    }
}
