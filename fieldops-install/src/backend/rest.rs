//! Back-office REST client
//!
//! Plain JSON over HTTP, plus one multipart call for media. Requests carry
//! an optional bearer token; timeouts come from configuration.

use super::{BackendError, JobOrderBackend};
use crate::models::{
    ApplicationUpdate, CapturedImage, CredentialRequest, IssuedCredential, JobRecord, JobUpdate,
    LedgerItemPatch, MediaKind, NewLedgerItem, PersistedLedgerItem,
};
use fieldops_common::config::ApiSettings;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, HashMap};

const USER_AGENT: &str = concat!("fieldops-install/", env!("CARGO_PKG_VERSION"));

/// reqwest implementation of [`JobOrderBackend`]
pub struct RestBackend {
    http_client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RestBackend {
    pub fn new(settings: &ApiSettings) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            token: settings.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path);
        tracing::debug!(method = %method, url = %url, "Back-office request");

        let builder = self.http_client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, BackendError> {
        let response = builder
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(BackendError::Api(status.as_u16(), error_text));
        }
        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T, BackendError> {
        self.send(builder, what)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[async_trait::async_trait]
impl JobOrderBackend for RestBackend {
    async fn get_job(&self, job_id: &str) -> Result<JobRecord, BackendError> {
        let what = format!("job {}", job_id);
        self.send_json(self.request(Method::GET, &format!("job/{}", job_id)), &what)
            .await
    }

    async fn issue_credentials(
        &self,
        job_id: &str,
        request: &CredentialRequest,
    ) -> Result<IssuedCredential, BackendError> {
        let what = format!("job {}", job_id);
        let builder = self
            .request(Method::POST, &format!("job/{}/credentials", job_id))
            .json(request);
        self.send_json(builder, &what).await
    }

    async fn upload_media(
        &self,
        job_id: &str,
        folder_name: &str,
        uploads: &[(MediaKind, &CapturedImage)],
    ) -> Result<BTreeMap<MediaKind, String>, BackendError> {
        let mut form = Form::new().text("folder_name", folder_name.to_string());
        for (kind, image) in uploads {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)
                .map_err(|e| BackendError::Parse(format!("{}: {}", kind.key(), e)))?;
            form = form.part(kind.key(), part);
        }

        let what = format!("job {}", job_id);
        let builder = self
            .request(Method::POST, &format!("job/{}/media", job_id))
            .multipart(form);
        let raw: HashMap<String, Option<String>> = self.send_json(builder, &what).await?;

        let mut urls = BTreeMap::new();
        for (key, url) in raw {
            match (MediaKind::from_key(&key), url) {
                (Some(kind), Some(url)) if !url.is_empty() => {
                    urls.insert(kind, url);
                }
                (None, _) => tracing::debug!(key = %key, "Ignoring unknown media key in upload response"),
                _ => {}
            }
        }
        Ok(urls)
    }

    async fn update_job(&self, job_id: &str, update: &JobUpdate) -> Result<(), BackendError> {
        let what = format!("job {}", job_id);
        let builder = self.request(Method::PUT, &format!("job/{}", job_id)).json(update);
        self.send(builder, &what).await?;
        Ok(())
    }

    async fn update_application(
        &self,
        application_id: &str,
        update: &ApplicationUpdate,
    ) -> Result<(), BackendError> {
        let what = format!("application {}", application_id);
        let builder = self
            .request(Method::PUT, &format!("application/{}", application_id))
            .json(update);
        self.send(builder, &what).await?;
        Ok(())
    }

    async fn list_ledger_items(
        &self,
        job_id: &str,
    ) -> Result<Vec<PersistedLedgerItem>, BackendError> {
        let builder = self
            .request(Method::GET, "item-ledger")
            .query(&[("job", job_id)]);
        self.send_json(builder, "item ledger").await
    }

    async fn create_ledger_items(&self, items: &[NewLedgerItem]) -> Result<(), BackendError> {
        let builder = self.request(Method::POST, "item-ledger").json(items);
        self.send(builder, "item ledger").await?;
        Ok(())
    }

    async fn update_ledger_item(
        &self,
        row_id: i64,
        patch: &LedgerItemPatch,
    ) -> Result<(), BackendError> {
        let what = format!("item ledger row {}", row_id);
        let builder = self
            .request(Method::PUT, &format!("item-ledger/{}", row_id))
            .json(patch);
        self.send(builder, &what).await?;
        Ok(())
    }

    async fn delete_ledger_item(&self, row_id: i64) -> Result<(), BackendError> {
        let what = format!("item ledger row {}", row_id);
        let builder = self.request(Method::DELETE, &format!("item-ledger/{}", row_id));
        self.send(builder, &what).await?;
        Ok(())
    }
}
