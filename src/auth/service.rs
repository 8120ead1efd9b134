use super::password::{hash_password, verify_password};
use super::store::UserStore;
use super::types::{SigninRequest, SignupRequest, UserProfile, UserRecord};

use anyhow::{anyhow, Context};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("User not found!")]
    UserNotFound,

    #[error("Invalid credentials!")]
    InvalidCredentials,

    #[error("Failed to sign up user!")]
    SignupFailed(#[source] anyhow::Error),

    #[error("Failed to sign in!")]
    SigninFailed(#[source] anyhow::Error),
}

/// Signup/signin over a [`UserStore`].
///
/// No session is issued: every signin is an independent password check.
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hash_cost: u32,
    redact_password_hash: bool,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, hash_cost: u32, redact_password_hash: bool) -> Self {
        Self {
            store,
            hash_cost,
            redact_password_hash,
        }
    }

    /// Hashes the password and writes the user document, replacing any
    /// existing user with the same email.
    pub async fn signup(&self, request: SignupRequest) -> Result<(), AuthError> {
        let (Some(username), Some(email), Some(password)) =
            (request.username, request.email, request.password)
        else {
            return Err(AuthError::SignupFailed(anyhow!(
                "signup body is missing username, email or password"
            )));
        };
        if email.is_empty() {
            return Err(AuthError::SignupFailed(anyhow!("signup email is empty")));
        }

        let cost = self.hash_cost;
        let password = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .context("password hashing task panicked")
            .and_then(|hashed| hashed)
            .map_err(AuthError::SignupFailed)?;

        let user = UserRecord {
            username,
            email,
            password,
        };

        self.store
            .put_user(&user)
            .await
            .map_err(AuthError::SignupFailed)?;

        tracing::info!("User {} signed up", user.email);
        Ok(())
    }

    /// Looks the user up by email and checks the password against the stored
    /// hash.
    pub async fn signin(&self, request: SigninRequest) -> Result<UserProfile, AuthError> {
        let (Some(email), Some(password)) = (request.email, request.password) else {
            return Err(AuthError::SigninFailed(anyhow!(
                "signin body is missing email or password"
            )));
        };
        if email.is_empty() {
            return Err(AuthError::SigninFailed(anyhow!("signin email is empty")));
        }

        let user = self
            .store
            .get_user(&email)
            .await
            .map_err(AuthError::SigninFailed)?
            .ok_or(AuthError::UserNotFound)?;

        let stored_hash = user.password.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .context("password verification task panicked")
            .and_then(|verified| verified)
            .map_err(AuthError::SigninFailed)?;

        if !matches {
            tracing::warn!("Invalid credentials for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!("User {} signed in", email);
        Ok(UserProfile::from_record(user, self.redact_password_hash))
    }
}
