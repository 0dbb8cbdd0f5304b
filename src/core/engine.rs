use crate::core::export::ExportFormat;
use crate::core::roster;
use crate::domain::model::ExperimentData;
use crate::domain::ports::{Clock, ExperimentStore, ExportSink};
use crate::utils::error::{Result, StudyError};
use crate::utils::validation::Validate;

/// Drives the roster through load → mutate → save against a store.
///
/// The roster operations themselves are pure; this type only adds the I/O
/// around them so every mutation is persisted before it is returned.
pub struct StudyEngine<S: ExperimentStore, C: Clock> {
    store: S,
    clock: C,
}

impl<S: ExperimentStore, C: Clock> StudyEngine<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub async fn load(&self) -> Result<Option<ExperimentData>> {
        let data = self.store.load().await?;
        if let Some(data) = &data {
            data.validate()?;
            tracing::debug!(
                "Loaded roster with {} participants from {}",
                data.len(),
                self.store.name()
            );
        }
        Ok(data)
    }

    async fn require(&self) -> Result<ExperimentData> {
        self.load().await?.ok_or_else(|| StudyError::ValidationError {
            message: "No experiment data found; run `generate` first".to_string(),
        })
    }

    async fn persist(&self, data: ExperimentData) -> Result<ExperimentData> {
        self.store.save(&data).await?;
        Ok(data)
    }

    pub async fn generate(&self, participant_count: usize) -> Result<ExperimentData> {
        let data = roster::generate(participant_count, self.clock.now())?;
        tracing::info!("🎲 Generated randomization for {} participants", data.len());
        self.persist(data).await
    }

    /// Appends to the saved roster; without one there is nothing to add to.
    pub async fn add_participant(&self) -> Result<ExperimentData> {
        let current = self.require().await?;
        let data = roster::add_participant(&current)?;
        if let Some(added) = data.participants().last() {
            tracing::info!("➕ Added participant #{} (seed {})", added.record_id, added.random_seed);
        }
        self.persist(data).await
    }

    pub async fn remove_participant(&self, record_id: u32) -> Result<ExperimentData> {
        let current = self.require().await?;
        let data = roster::remove_participant(&current, record_id);
        if data == current {
            tracing::warn!("🔶 Participant #{} not found, roster unchanged", record_id);
            return Ok(data);
        }
        tracing::info!("➖ Removed participant #{}", record_id);
        self.persist(data).await
    }

    pub async fn regenerate_participant(&self, record_id: u32) -> Result<ExperimentData> {
        let current = self.require().await?;
        let data = roster::regenerate_participant(&current, record_id);
        if data == current {
            tracing::warn!("🔶 Participant #{} not found, roster unchanged", record_id);
            return Ok(data);
        }
        tracing::info!("🔄 Regenerated participant #{}", record_id);
        self.persist(data).await
    }

    pub async fn clear(&self) -> Result<()> {
        self.store.clear().await?;
        tracing::info!("🗑️ Cleared saved experiment data");
        Ok(())
    }

    /// Renders each format and hands it to the sink; returns delivered paths.
    pub async fn export<K: ExportSink>(
        &self,
        sink: &K,
        formats: &[ExportFormat],
    ) -> Result<Vec<String>> {
        let data = self.require().await?;
        let today = self.clock.now().date_naive();

        let mut delivered = Vec::with_capacity(formats.len());
        for format in formats {
            let artifact = format.render(&data, today)?;
            tracing::debug!(
                "Rendered {} ({} bytes, {})",
                artifact.filename,
                artifact.content.len(),
                artifact.mime_type
            );
            let location = sink.deliver(&artifact).await?;
            tracing::info!("💾 Exported {} to {}", format.as_str(), location);
            delivered.push(location);
        }

        Ok(delivered)
    }
}
