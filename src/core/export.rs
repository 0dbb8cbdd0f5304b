//! Renderers that turn a roster into files a researcher can open.

use crate::core::schedule::flatten;
use crate::domain::model::ExperimentData;
use crate::domain::ports::ExportArtifact;
use crate::utils::error::{Result, StudyError};
use chrono::{Datelike, NaiveDate};
use std::io::Write;
use std::str::FromStr;
use zip::write::{SimpleFileOptions, ZipWriter};

pub const CSV_HEADERS: [&str; 12] = [
    "Participant ID",
    "Random Seed",
    "Session",
    "Modality",
    "Modality Order",
    "Model Type",
    "Model Type Order",
    "Repetition",
    "Model Position",
    "Model ID",
    "Model Name",
    "Measurement Number",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    Json,
    Csv,
    Summary,
    Bundle,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Json,
        ExportFormat::Csv,
        ExportFormat::Summary,
        ExportFormat::Bundle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Summary => "summary",
            ExportFormat::Bundle => "bundle",
        }
    }

    /// 檔名帶上匯出日期，例如 experiment_data_2025-03-14.csv
    pub fn filename(&self, date: NaiveDate) -> String {
        let date = date.format("%Y-%m-%d");
        match self {
            ExportFormat::Json => format!("experiment_data_{}.json", date),
            ExportFormat::Csv => format!("experiment_data_{}.csv", date),
            ExportFormat::Summary => format!("experiment_summary_{}.md", date),
            ExportFormat::Bundle => format!("experiment_export_{}.zip", date),
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Summary => "text/markdown",
            ExportFormat::Bundle => "application/zip",
        }
    }

    pub fn render(&self, data: &ExperimentData, date: NaiveDate) -> Result<ExportArtifact> {
        let content = match self {
            ExportFormat::Json => to_json(data)?.into_bytes(),
            ExportFormat::Csv => to_csv(data)?.into_bytes(),
            ExportFormat::Summary => to_summary(data).into_bytes(),
            ExportFormat::Bundle => to_bundle(data, date)?,
        };

        Ok(ExportArtifact {
            filename: self.filename(date),
            mime_type: self.mime_type(),
            content,
        })
    }
}

impl FromStr for ExportFormat {
    type Err = StudyError;

    fn from_str(s: &str) -> Result<Self> {
        ExportFormat::ALL
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StudyError::InvalidConfigValueError {
                field: "export.formats".to_string(),
                value: s.to_string(),
                reason: format!(
                    "Unsupported format. Valid formats: {}",
                    ExportFormat::ALL.map(|f| f.as_str()).join(", ")
                ),
            })
    }
}

/// Lossless JSON of the whole roster; [`from_json`] reads it back.
pub fn to_json(data: &ExperimentData) -> Result<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn from_json(content: &str) -> Result<ExperimentData> {
    Ok(serde_json::from_str(content)?)
}

/// One CSV line per scheduled measurement, header first.
pub fn to_csv(data: &ExperimentData) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADERS)?;
    for row in flatten(data) {
        writer.serialize(row)?;
    }

    let bytes = writer.into_inner().map_err(|e| StudyError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| StudyError::ValidationError {
        message: format!("CSV output is not valid UTF-8: {}", e),
    })
}

fn joined<T: std::fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Markdown overview: counts plus each participant's orderings.
pub fn to_summary(data: &ExperimentData) -> String {
    let summary = data.summary();
    let mut lines = vec![
        "# Experiment Randomization Summary".to_string(),
        String::new(),
        format!("Generated: {}", data.generated_at().format("%Y-%m-%d %H:%M:%S UTC")),
        String::new(),
        "## Participant Counts".to_string(),
        format!("- Total: {}", summary.total_participants),
        String::new(),
        "## Measurement Counts".to_string(),
        format!("- Per Session: {}", summary.measurements_per_session),
        format!("- Per Participant: {}", summary.measurements_per_participant),
        format!("- Total: {}", summary.total_measurements),
        String::new(),
        "## Participant Randomization Details".to_string(),
        String::new(),
    ];

    for participant in data.participants() {
        lines.push(format!("### Participant #{}", participant.record_id));
        lines.push(format!("- Random Seed: {}", participant.random_seed));
        if let Some(design) = participant.design() {
            lines.push(format!("- Modality Order: {}", joined(&design.modality_order)));
            lines.push(format!("- Model Type Order: {}", joined(&design.model_type_order)));
            lines.push(format!("- Ball Sphere Order: {}", joined(&design.ball_sphere_order)));
            lines.push(format!("- Balloon Point Order: {}", joined(&design.balloon_point_order)));
        }
        lines.push(String::new());
    }

    lines.join("\n")
}

/// ZIP 內含 JSON、CSV 與摘要三個檔案
pub fn to_bundle(data: &ExperimentData, date: NaiveDate) -> Result<Vec<u8>> {
    // 固定檔案時間戳，相同輸入產生相同位元組
    let modified = zip::DateTime::from_date_and_time(
        date.year() as u16,
        date.month() as u8,
        date.day() as u8,
        0,
        0,
        0,
    )
    .map_err(|e| StudyError::ValidationError {
        message: format!("export date {} cannot be stored in a zip entry: {}", date, e),
    })?;
    let options = SimpleFileOptions::default().last_modified_time(modified);

    let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

    zip.start_file::<_, ()>(ExportFormat::Json.filename(date), options)?;
    zip.write_all(to_json(data)?.as_bytes())?;

    zip.start_file::<_, ()>(ExportFormat::Csv.filename(date), options)?;
    zip.write_all(to_csv(data)?.as_bytes())?;

    zip.start_file::<_, ()>(ExportFormat::Summary.filename(date), options)?;
    zip.write_all(to_summary(data).as_bytes())?;

    // 完成並取回底層 Vec<u8>
    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
