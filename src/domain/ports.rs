use crate::domain::model::ExperimentData;
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Where a roster lives between invocations.
#[async_trait]
pub trait ExperimentStore: Send + Sync {
    /// Human-readable backend name used in logs and errors.
    fn name(&self) -> &str;
    async fn load(&self) -> Result<Option<ExperimentData>>;
    async fn save(&self, data: &ExperimentData) -> Result<()>;
    async fn clear(&self) -> Result<()>;
}

/// A rendered export ready to be handed to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub filename: String,
    pub mime_type: &'static str,
    pub content: Vec<u8>,
}

pub trait ExportSink: Send + Sync {
    /// Delivers the artifact and returns where it ended up.
    fn deliver(
        &self,
        artifact: &ExportArtifact,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Settings the CLI needs to wire adapters together.
pub trait ConfigProvider: Send + Sync {
    fn data_file(&self) -> &str;
    fn remote_endpoint(&self) -> Option<&str>;
    fn request_timeout_seconds(&self) -> u64;
    fn export_dir(&self) -> &str;
    fn export_formats(&self) -> Vec<crate::core::export::ExportFormat>;
}
