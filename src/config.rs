use anyhow::{anyhow, bail, Context, Result};
use std::{env, fmt, fs::read_to_string, path::PathBuf, str::FromStr};
use tracing::{info, warn};

use crate::auth::password::{DEFAULT_COST, MAX_COST, MIN_COST};

pub const DEFAULT_PORT: &str = "3001";
pub const DEFAULT_DATASET_PATH: &str = "Test Try 2.csv";
pub const DEFAULT_CORS_ORIGINS: &str = "https://nissan-frontend.onrender.com";
pub const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub dataset_path: PathBuf,
    pub dataset_delimiter: u8,
    pub cors_allowed_origins: Vec<String>,
    pub user_store: UserStoreBackend,
    pub password_hash_cost: u32,
    pub redact_password_hash: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserStoreBackend {
    Firestore(FirestoreSettings),
    /// Process-local store, lost on exit.
    Memory,
}

#[derive(Clone, PartialEq, Eq)]
pub struct FirestoreSettings {
    pub base_url: String,
    pub project_id: String,
    pub database: String,
    pub collection: String,
    pub access_token: Option<String>,
}

impl fmt::Debug for FirestoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirestoreSettings")
            .field("base_url", &self.base_url)
            .field("project_id", &self.project_id)
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Config {
    /// Reads the process environment, falling back to `/run/secrets` for the
    /// store access token.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| {
            env::var(key).ok().or_else(|| {
                if key == "FIRESTORE_ACCESS_TOKEN" {
                    read_secret(key)
                } else {
                    None
                }
            })
        })
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let password_hash_cost: u32 =
            try_load(&lookup, "PASSWORD_HASH_COST", &DEFAULT_COST.to_string())?;
        if !(MIN_COST..=MAX_COST).contains(&password_hash_cost) {
            bail!("PASSWORD_HASH_COST must be within {MIN_COST}..={MAX_COST}");
        }

        Ok(Self {
            port: try_load(&lookup, "PORT", DEFAULT_PORT)?,
            dataset_path: try_load(&lookup, "DATASET_PATH", DEFAULT_DATASET_PATH)?,
            dataset_delimiter: parse_delimiter(&load_or(&lookup, "DATASET_DELIMITER", ","))?,
            cors_allowed_origins: parse_list(&load_or(
                &lookup,
                "CORS_ALLOWED_ORIGINS",
                DEFAULT_CORS_ORIGINS,
            )),
            user_store: load_user_store(&lookup)?,
            password_hash_cost,
            redact_password_hash: try_load(&lookup, "REDACT_PASSWORD_HASH", "false")?,
        })
    }
}

fn load_user_store<F>(lookup: &F) -> Result<UserStoreBackend>
where
    F: Fn(&str) -> Option<String>,
{
    match load_or(lookup, "USER_STORE", "firestore").as_str() {
        "memory" => {
            warn!("Using in-memory user store, accounts are lost on restart");
            Ok(UserStoreBackend::Memory)
        }
        "firestore" => {
            let project_id = lookup("FIRESTORE_PROJECT_ID")
                .filter(|v| !v.is_empty())
                .ok_or_else(|| anyhow!("FIRESTORE_PROJECT_ID is required for USER_STORE=firestore"))?;

            Ok(UserStoreBackend::Firestore(FirestoreSettings {
                base_url: load_or(lookup, "FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_BASE_URL),
                project_id,
                database: load_or(lookup, "FIRESTORE_DATABASE", "(default)"),
                collection: load_or(lookup, "FIRESTORE_COLLECTION", "users"),
                access_token: lookup("FIRESTORE_ACCESS_TOKEN").filter(|v| !v.is_empty()),
            }))
        }
        other => bail!("Unknown USER_STORE {other:?}, expected \"firestore\" or \"memory\""),
    }
}

fn load_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn try_load<F, T>(lookup: &F, key: &str, default: &str) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    load_or(lookup, key, default).parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Invalid {key} value: {e}")
    })
}

fn parse_delimiter(value: &str) -> Result<u8> {
    match value.as_bytes() {
        [byte] => Ok(*byte),
        _ => bail!("DATASET_DELIMITER must be a single byte, got {value:?}"),
    }
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_secret(secret_name: &str) -> Option<String> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .with_context(|| format!("Failed to read {secret_name} from file"))
        .map_err(|e| info!("{e:#}"))
        .ok()
}
