use crate::domain::model::ExperimentData;
use crate::domain::ports::ExperimentStore;
use crate::utils::error::{Result, StudyError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Remote JSON document store.
///
/// The roster is a single document at `endpoint`: `GET` reads it (404 means
/// nothing saved yet), `PUT` replaces it, `DELETE` removes it. No retries; a
/// failing request surfaces as an error and the caller falls back.
#[derive(Debug, Clone)]
pub struct HttpStore {
    client: Client,
    endpoint: String,
}

impl HttpStore {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn unexpected_status(&self, action: &str, status: StatusCode) -> StudyError {
        StudyError::PersistenceError {
            backend: format!("remote {}", self.endpoint),
            message: format!("{} returned HTTP {}", action, status),
        }
    }
}

#[async_trait]
impl ExperimentStore for HttpStore {
    fn name(&self) -> &str {
        "remote"
    }

    async fn load(&self) -> Result<Option<ExperimentData>> {
        tracing::debug!("Making API request to: {}", self.endpoint);
        let response = self.client.get(&self.endpoint).send().await?;
        tracing::debug!("API response status: {}", response.status());

        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => Ok(Some(response.json().await?)),
            status => Err(self.unexpected_status("load", status)),
        }
    }

    async fn save(&self, data: &ExperimentData) -> Result<()> {
        let response = self.client.put(&self.endpoint).json(data).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(self.unexpected_status("save", status));
        }
        tracing::debug!("Saved {} participants to {}", data.len(), self.endpoint);
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let response = self.client.delete(&self.endpoint).send().await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(()),
            status if status.is_success() => Ok(()),
            status => Err(self.unexpected_status("clear", status)),
        }
    }
}
