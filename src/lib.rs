pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::StudyConfig;

pub use adapters::{DirectorySink, FallbackStore, FixedClock, HttpStore, LocalStore, SystemClock};
pub use crate::core::engine::StudyEngine;
pub use crate::core::export::ExportFormat;
pub use domain::model::{ExperimentData, MeasurementRow, Participant, SessionDesign, Summary};
pub use utils::error::{Result, StudyError};
