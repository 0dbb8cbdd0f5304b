use crate::adapters::http::HttpStore;
use crate::core::export::{from_json, to_json};
use crate::domain::model::ExperimentData;
use crate::domain::ports::{ConfigProvider, ExperimentStore};
use crate::utils::error::{Result, StudyError};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

/// Keeps the roster in a single JSON file on disk.
#[derive(Debug, Clone)]
pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ExperimentStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn load(&self) -> Result<Option<ExperimentData>> {
        if !tokio::fs::try_exists(&self.path).await? {
            tracing::debug!("No local data at {}", self.path.display());
            return Ok(None);
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        Ok(Some(from_json(&content)?))
    }

    async fn save(&self, data: &ExperimentData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // 先寫暫存檔再改名，避免中途失敗留下半份 JSON
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, to_json(data)?).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        tracing::debug!("Saved {} participants to {}", data.len(), self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Tries each store in order.
///
/// `load` returns the first valid roster found; a failing store or one holding
/// an invalid roster is logged and skipped. `None` means every store answered
/// and none had data; if any store failed and none had data, `load` errors.
/// `save` and `clear` go to every store and succeed as long as one of them did.
pub struct FallbackStore {
    stores: Vec<Box<dyn ExperimentStore>>,
}

impl FallbackStore {
    pub fn new(stores: Vec<Box<dyn ExperimentStore>>) -> Self {
        Self { stores }
    }

    /// Remote store first (when configured), then the local file.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let mut stores: Vec<Box<dyn ExperimentStore>> = Vec::new();

        if let Some(endpoint) = config.remote_endpoint() {
            let timeout = Duration::from_secs(config.request_timeout_seconds());
            stores.push(Box::new(HttpStore::new(endpoint, timeout)?));
        }
        stores.push(Box::new(LocalStore::new(config.data_file())));

        Ok(Self::new(stores))
    }

    pub fn store_names(&self) -> Vec<&str> {
        self.stores.iter().map(|store| store.name()).collect()
    }

    fn all_failed(&self, action: &str, failures: Vec<String>) -> StudyError {
        StudyError::PersistenceError {
            backend: self.name().to_string(),
            message: format!("{} failed: {}", action, failures.join("; ")),
        }
    }
}

#[async_trait]
impl ExperimentStore for FallbackStore {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn load(&self) -> Result<Option<ExperimentData>> {
        let mut failures = Vec::new();
        for store in &self.stores {
            match store.load().await.and_then(|data| match data {
                Some(data) => data.validate().map(|()| Some(data)),
                None => Ok(None),
            }) {
                Ok(Some(data)) => {
                    tracing::debug!("Loaded roster from {} store", store.name());
                    return Ok(Some(data));
                }
                Ok(None) => tracing::debug!("{} store is empty", store.name()),
                Err(e) => {
                    tracing::warn!("🔶 Loading from {} store failed: {}", store.name(), e);
                    failures.push(format!("{}: {}", store.name(), e));
                }
            }
        }

        // 有儲存端失敗時不能當作「沒有資料」，否則後續寫入會覆蓋遠端名單
        if !failures.is_empty() {
            return Err(self.all_failed("load", failures));
        }
        Ok(None)
    }

    async fn save(&self, data: &ExperimentData) -> Result<()> {
        let mut failures = Vec::new();
        for store in &self.stores {
            if let Err(e) = store.save(data).await {
                tracing::warn!("🔶 Saving to {} store failed: {}", store.name(), e);
                failures.push(format!("{}: {}", store.name(), e));
            }
        }

        if !self.stores.is_empty() && failures.len() == self.stores.len() {
            return Err(self.all_failed("save", failures));
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        let mut failures = Vec::new();
        for store in &self.stores {
            if let Err(e) = store.clear().await {
                tracing::warn!("🔶 Clearing {} store failed: {}", store.name(), e);
                failures.push(format!("{}: {}", store.name(), e));
            }
        }

        if !self.stores.is_empty() && failures.len() == self.stores.len() {
            return Err(self.all_failed("clear", failures));
        }
        Ok(())
    }
}
