//! Firestore backend over the REST API.
//!
//! Queries go to `documents:runQuery` as structured queries; single
//! documents are read with a plain `GET`. Authentication is either an API
//! key (`?key=`) or a bearer token.

pub mod codec;
pub mod query;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::backend::storage::document::{Document, DocumentQuery};
use crate::backend::storage::traits::DocumentStore;

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com/v1";

#[derive(Debug, Clone)]
pub enum FirestoreAuth {
    None,
    ApiKey(String),
    Bearer(String),
}

#[derive(Clone)]
pub struct FirestoreRestStore {
    http: reqwest::Client,
    base_url: String,
    documents_root: String,
    auth: FirestoreAuth,
}

impl FirestoreRestStore {
    pub fn new(http: reqwest::Client, base_url: &str, project_id: &str, auth: FirestoreAuth) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            documents_root: format!("projects/{}/databases/(default)/documents", project_id),
            auth,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            FirestoreAuth::None => request,
            FirestoreAuth::ApiKey(key) => request.query(&[("key", key)]),
            FirestoreAuth::Bearer(token) => request.bearer_auth(token),
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreRestStore {
    async fn run_query(&self, query: &DocumentQuery) -> Result<Vec<Document>> {
        let url = format!("{}/{}:runQuery", self.base_url, self.documents_root);
        let body = query::structured_query(query, &self.documents_root);
        debug!("Firestore runQuery on {}", query.collection);

        let response = self
            .authorize(self.http.post(&url))
            .json(&body)
            .send()
            .await
            .with_context(|| format!("runQuery on {} failed", query.collection))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("runQuery on {} returned {}: {}", query.collection, status, text);
        }

        let rows: Vec<Value> = response.json().await?;
        rows.iter()
            .filter_map(|row| row.get("document"))
            .map(|document| codec::decode_document(document, &self.documents_root))
            .collect()
    }

    async fn get_document(&self, path: &str) -> Result<Option<Document>> {
        let url = format!("{}/{}/{}", self.base_url, self.documents_root, path);
        let response = self
            .authorize(self.http.get(&url))
            .send()
            .await
            .with_context(|| format!("GET {} failed", path))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let document: Value = response.json().await?;
                Ok(Some(codec::decode_document(&document, &self.documents_root)?))
            }
            status => {
                let text = response.text().await.unwrap_or_default();
                bail!("GET {} returned {}: {}", path, status, text)
            }
        }
    }
}
