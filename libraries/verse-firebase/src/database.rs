//! Realtime Database REST operations.

use crate::client::FirebaseClient;
use crate::error::Result;
use crate::types::PushResponse;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;
use verse_core::{DocPath, DocumentStore};

impl FirebaseClient {
    /// Database URL for `path`, authenticated when a user is signed in
    async fn document_url(&self, path: &DocPath) -> Result<Url> {
        let token = self.id_token().await?;
        self.database_url(path, token.as_deref())
    }

    async fn send_document(
        &self,
        method: Method,
        path: &DocPath,
        body: Option<&Value>,
    ) -> Result<reqwest::Response> {
        let url = self.document_url(path).await?;
        debug!(method = %method, path = %path, "Database request");

        let mut request = self.http.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        Self::check(request.send().await?).await
    }
}

#[async_trait]
impl DocumentStore for FirebaseClient {
    async fn get(&self, path: &DocPath) -> verse_core::Result<Option<Value>> {
        let response = self.send_document(Method::GET, path, None).await?;
        let value: Value = Self::parse(response).await?;
        Ok(match value {
            Value::Null => None,
            value => Some(value),
        })
    }

    async fn set(&self, path: &DocPath, value: Value) -> verse_core::Result<()> {
        self.send_document(Method::PUT, path, Some(&value)).await?;
        Ok(())
    }

    async fn update(&self, path: &DocPath, fields: Map<String, Value>) -> verse_core::Result<()> {
        let body = Value::Object(fields);
        self.send_document(Method::PATCH, path, Some(&body)).await?;
        Ok(())
    }

    async fn push(&self, path: &DocPath, value: Value) -> verse_core::Result<String> {
        let response = self.send_document(Method::POST, path, Some(&value)).await?;
        let pushed: PushResponse = Self::parse(response).await?;
        debug!(path = %path, key = %pushed.name, "Pushed child");
        Ok(pushed.name)
    }
}
