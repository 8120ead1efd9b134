//! Credential store backends.
//!
//! One document per user, keyed by email. Writes overwrite whatever lives at
//! the key; there is no update or delete.
//!
//! - [`FirestoreUserStore`] talks to the Firestore REST API (v1).
//! - [`MemoryUserStore`] keeps users in a `DashMap` for the lifetime of the
//!   process.

use super::types::UserRecord;
use crate::config::{FirestoreSettings, UserStoreBackend};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

const FIELD_USERNAME: &str = "username";
const FIELD_EMAIL: &str = "email";
const FIELD_PASSWORD: &str = "password";

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Creates or replaces the document at `user.email`.
    async fn put_user(&self, user: &UserRecord) -> Result<()>;

    /// `Ok(None)` when no document exists for `email`.
    async fn get_user(&self, email: &str) -> Result<Option<UserRecord>>;
}

pub fn connect_user_store(backend: &UserStoreBackend) -> Result<Arc<dyn UserStore>> {
    match backend {
        UserStoreBackend::Firestore(settings) => {
            let store = FirestoreUserStore::new(settings)?;
            tracing::info!("User store: firestore collection {}", store.documents_url);
            Ok(Arc::new(store))
        }
        UserStoreBackend::Memory => {
            tracing::info!("User store: in-memory");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: DashMap<String, UserRecord>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn put_user(&self, user: &UserRecord) -> Result<()> {
        self.users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn get_user(&self, email: &str) -> Result<Option<UserRecord>> {
        Ok(self.users.get(email).map(|entry| entry.value().clone()))
    }
}

pub struct FirestoreUserStore {
    http_client: reqwest::Client,
    documents_url: Url,
    access_token: Option<String>,
}

impl FirestoreUserStore {
    pub fn new(settings: &FirestoreSettings) -> Result<Self> {
        let mut documents_url = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid Firestore base URL {}", settings.base_url))?;

        documents_url
            .path_segments_mut()
            .map_err(|_| anyhow!("Firestore base URL cannot hold a path"))?
            .pop_if_empty()
            .extend([
                "projects",
                settings.project_id.as_str(),
                "databases",
                settings.database.as_str(),
                "documents",
                settings.collection.as_str(),
            ]);

        Ok(Self {
            http_client: reqwest::Client::new(),
            documents_url,
            access_token: settings.access_token.clone(),
        })
    }

    /// URL of the document keyed by `email`, percent-encoded as one segment.
    fn document_url(&self, email: &str) -> Url {
        let mut url = self.documents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(email);
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl UserStore for FirestoreUserStore {
    async fn put_user(&self, user: &UserRecord) -> Result<()> {
        let url = self.document_url(&user.email);
        let document = FirestoreDocument::from(user);

        self.authorize(self.http_client.patch(url))
            .json(&document)
            .send()
            .await
            .context("Firestore write request failed")?
            .error_for_status()
            .context("Firestore rejected the write")?;

        tracing::debug!("Stored user document for {}", user.email);
        Ok(())
    }

    async fn get_user(&self, email: &str) -> Result<Option<UserRecord>> {
        let url = self.document_url(email);

        let response = self
            .authorize(self.http_client.get(url))
            .send()
            .await
            .context("Firestore read request failed")?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let document: FirestoreDocument = response
            .error_for_status()
            .context("Firestore rejected the read")?
            .json()
            .await
            .context("Firestore returned an unreadable document")?;

        document.into_user().map(Some)
    }
}

/// The subset of a Firestore document this store reads and writes.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FirestoreDocument {
    #[serde(default)]
    pub fields: HashMap<String, FirestoreValue>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FirestoreValue {
    #[serde(
        rename = "stringValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub string_value: Option<String>,
}

impl FirestoreValue {
    fn string(value: &str) -> Self {
        Self {
            string_value: Some(value.to_string()),
        }
    }
}

impl From<&UserRecord> for FirestoreDocument {
    fn from(user: &UserRecord) -> Self {
        let fields = [
            (FIELD_USERNAME, &user.username),
            (FIELD_EMAIL, &user.email),
            (FIELD_PASSWORD, &user.password),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_string(), FirestoreValue::string(value)))
        .collect();

        Self { fields }
    }
}

impl FirestoreDocument {
    fn string_field(&self, name: &str) -> Result<String> {
        self.fields
            .get(name)
            .and_then(|value| value.string_value.clone())
            .ok_or_else(|| anyhow!("user document has no string field {name:?}"))
    }

    pub fn into_user(self) -> Result<UserRecord> {
        Ok(UserRecord {
            username: self.string_field(FIELD_USERNAME)?,
            email: self.string_field(FIELD_EMAIL)?,
            password: self.string_field(FIELD_PASSWORD)?,
        })
    }
}
