pub mod design;
pub mod engine;
pub mod export;
pub mod rng;
pub mod roster;
pub mod schedule;

pub use crate::domain::model::{ExperimentData, MeasurementRow, Participant, SessionDesign};
pub use crate::domain::ports::{Clock, ExperimentStore, ExportArtifact, ExportSink};
pub use crate::utils::error::Result;
