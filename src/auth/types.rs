//! Credential Data Types
//!
//! Request/response bodies of the signup and signin endpoints, and the user
//! document kept in the credential store.

use serde::{Deserialize, Serialize};

/// A user as stored in the credential store, keyed by `email`.
///
/// `password` always holds the salted hash, never the plaintext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Body of `POST /signup`.
///
/// Fields are optional so that a missing field is reported the same way as a
/// store failure rather than as an extractor rejection.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /signin`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SigninRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// The user echoed back by a successful signin.
///
/// `password` carries the stored hash unless redaction is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl UserProfile {
    pub fn from_record(record: UserRecord, redact_password_hash: bool) -> Self {
        Self {
            username: record.username,
            email: record.email,
            password: (!redact_password_hash).then_some(record.password),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct SigninResponse {
    pub message: String,
    pub user: UserProfile,
}
