// Authentication endpoints
//
// Login and register return the bearer token alongside the user profile;
// the session layer persists both. These calls go out unauthenticated --
// whatever token the TokenSource currently holds is irrelevant to them.

use crate::client::DirectoryClient;
use crate::error::Error;
use crate::model::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest, User};

impl DirectoryClient {
    /// `POST /auth/login`
    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthResponse, Error> {
        self.post("auth/login", credentials).await
    }

    /// `POST /auth/register`
    pub async fn register(&self, profile: &RegisterRequest) -> Result<AuthResponse, Error> {
        self.post("auth/register", profile).await
    }

    /// `GET /auth/me` -- the profile behind the current bearer token.
    pub async fn me(&self) -> Result<User, Error> {
        self.get("auth/me").await
    }

    /// `PUT /auth/change-password`
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<(), Error> {
        self.put_no_data("auth/change-password", request).await
    }
}
