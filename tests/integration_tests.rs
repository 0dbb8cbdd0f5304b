use anyhow::Result;
use chrono::{TimeZone, Utc};
use study_randomizer::core::export::{from_json, CSV_HEADERS};
use study_randomizer::core::roster;
use study_randomizer::core::schedule::flatten;
use study_randomizer::{
    DirectorySink, ExportFormat, FallbackStore, FixedClock, LocalStore, StudyEngine, StudyError,
};
use tempfile::TempDir;

fn engine_in(temp_dir: &TempDir) -> StudyEngine<FallbackStore, FixedClock> {
    let local = LocalStore::new(temp_dir.path().join("experiment_data.json"));
    let store = FallbackStore::new(vec![Box::new(local)]);
    let clock = FixedClock(Utc.with_ymd_and_hms(2025, 4, 2, 8, 15, 0).unwrap());
    StudyEngine::new(store, clock)
}

#[tokio::test]
async fn test_end_to_end_generate_and_export() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let engine = engine_in(&temp_dir);

    let data = engine.generate(3).await?;
    let summary = data.summary();
    assert_eq!(summary.total_participants, 3);
    assert_eq!(summary.measurements_per_session, 80);
    assert_eq!(summary.measurements_per_participant, 240);
    assert_eq!(summary.total_measurements, 720);

    let export_dir = temp_dir.path().join("exports");
    let sink = DirectorySink::new(&export_dir);
    let paths = engine
        .export(&sink, &[ExportFormat::Json, ExportFormat::Csv, ExportFormat::Summary])
        .await?;
    assert_eq!(paths.len(), 3);

    // JSON 匯出可還原為相同資料
    let json = std::fs::read_to_string(export_dir.join("experiment_data_2025-04-02.json"))?;
    assert_eq!(from_json(&json)?, data);

    let csv = std::fs::read_to_string(export_dir.join("experiment_data_2025-04-02.csv"))?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], CSV_HEADERS.join(","));
    assert_eq!(lines.len() - 1, flatten(&data).len());
    assert_eq!(lines.len() - 1, 720);

    let summary_md = std::fs::read_to_string(export_dir.join("experiment_summary_2025-04-02.md"))?;
    for participant in data.participants() {
        assert!(summary_md.contains(&format!("### Participant #{}", participant.record_id)));
    }

    Ok(())
}

#[tokio::test]
async fn test_roster_lifecycle_persists_between_engines() -> Result<()> {
    let temp_dir = TempDir::new()?;

    {
        let engine = engine_in(&temp_dir);
        engine.generate(2).await?;
        engine.add_participant().await?;
        engine.remove_participant(2).await?;
    }

    // 新的 engine 從磁碟讀回狀態
    let engine = engine_in(&temp_dir);
    let data = engine.load().await?.expect("roster should be saved");
    let ids: Vec<u32> = data.participants().iter().map(|p| p.record_id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(data.summary().total_participants, 2);

    let data = engine.add_participant().await?;
    assert_eq!(data.participants().last().map(|p| p.record_id), Some(4));

    let before = data.participant(3).cloned().expect("participant 3");
    let data = engine.regenerate_participant(3).await?;
    let after = data.participant(3).expect("participant 3");
    assert_ne!(after.random_seed, before.random_seed);
    assert_eq!(data.participants()[1].record_id, 3);

    engine.clear().await?;
    assert!(engine.load().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_roster_cap_is_enforced() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let engine = engine_in(&temp_dir);

    let full = engine.generate(50).await?;
    match engine.add_participant().await {
        Err(StudyError::RosterFull { capacity }) => assert_eq!(capacity, 50),
        other => panic!("expected RosterFull, got {:?}", other.map(|d| d.len())),
    }
    assert_eq!(engine.load().await?, Some(full));

    assert!(matches!(
        engine.generate(51).await,
        Err(StudyError::InvalidCount { .. })
    ));
    Ok(())
}

#[test]
fn test_snapshots_are_not_mutated() {
    let original = roster::generate(4, Utc::now()).unwrap();
    let snapshot = original.clone();

    let _ = roster::add_participant(&original).unwrap();
    let _ = roster::remove_participant(&original, 1);
    let _ = roster::regenerate_participant(&original, 2);

    assert_eq!(original, snapshot);
}

#[tokio::test]
async fn test_bundle_export() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let engine = engine_in(&temp_dir);
    engine.generate(1).await?;

    let sink = DirectorySink::new(temp_dir.path());
    let paths = engine.export(&sink, &[ExportFormat::Bundle]).await?;
    assert!(paths[0].ends_with("experiment_export_2025-04-02.zip"));

    let archive = zip::ZipArchive::new(std::fs::File::open(&paths[0])?)?;
    assert_eq!(archive.len(), 3);
    Ok(())
}
