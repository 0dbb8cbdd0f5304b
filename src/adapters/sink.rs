use crate::domain::ports::{ExportArtifact, ExportSink};
use crate::utils::error::Result;
use std::path::PathBuf;

/// Writes export artifacts into a directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    base_path: PathBuf,
}

impl DirectorySink {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl ExportSink for DirectorySink {
    async fn deliver(&self, artifact: &ExportArtifact) -> Result<String> {
        tokio::fs::create_dir_all(&self.base_path).await?;

        let full_path = self.base_path.join(&artifact.filename);
        tokio::fs::write(&full_path, &artifact.content).await?;

        tracing::debug!(
            "Wrote {} ({} bytes) to {}",
            artifact.mime_type,
            artifact.content.len(),
            full_path.display()
        );
        Ok(full_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_deliver_writes_file() {
        let temp_dir = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp_dir.path().join("exports"));
        let artifact = ExportArtifact {
            filename: "experiment_summary_2025-01-01.md".to_string(),
            mime_type: "text/markdown",
            content: b"# Experiment Randomization Summary".to_vec(),
        };

        let location = sink.deliver(&artifact).await.unwrap();
        assert!(location.ends_with("experiment_summary_2025-01-01.md"));
        assert_eq!(std::fs::read(&location).unwrap(), artifact.content);
    }
}
