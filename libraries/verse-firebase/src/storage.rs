//! Storage REST operations.

use crate::client::FirebaseClient;
use crate::error::FirebaseError;
use crate::types::StorageObject;
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::RequestBuilder;
use tracing::{debug, info};
use verse_core::{BlobStore, DocPath};

impl FirebaseClient {
    async fn authorize(&self, request: RequestBuilder) -> crate::error::Result<RequestBuilder> {
        Ok(match self.id_token().await? {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        })
    }
}

#[async_trait]
impl BlobStore for FirebaseClient {
    async fn upload(
        &self,
        path: &DocPath,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> verse_core::Result<()> {
        let mut url = self.storage_url(None)?;
        url.query_pairs_mut()
            .append_pair("uploadType", "media")
            .append_pair("name", path.as_str());

        let size = bytes.len();
        debug!(path = %path, size, content_type, "Uploading blob");

        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        let response = self.authorize(request).await?.send().await.map_err(FirebaseError::from)?;
        Self::check(response).await?;

        info!(path = %path, size, "Blob uploaded");
        Ok(())
    }

    async fn download_url(&self, path: &DocPath) -> verse_core::Result<String> {
        let url = self.storage_url(Some(path))?;
        let request = self.http.get(url.clone());
        let response = self.authorize(request).await?.send().await.map_err(FirebaseError::from)?;
        let object: StorageObject = Self::parse(Self::check(response).await?).await?;

        let token = object.download_token().ok_or_else(|| FirebaseError::Api {
            status: 404,
            message: format!("No download token for {path}"),
        })?;

        let mut download = url;
        download
            .query_pairs_mut()
            .append_pair("alt", "media")
            .append_pair("token", token);
        Ok(download.into())
    }
}
