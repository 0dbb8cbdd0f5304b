use clap::Parser;
use study_randomizer::config::Command;
use study_randomizer::core::engine::StudyEngine;
use study_randomizer::domain::model::MAX_PARTICIPANTS;
use study_randomizer::domain::ports::ConfigProvider;
use study_randomizer::utils::error::{ErrorSeverity, Result, StudyError};
use study_randomizer::utils::{logger, validation::Validate};
use study_randomizer::{CliConfig, DirectorySink, ExperimentData, FallbackStore, SystemClock};

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::debug!("CLI config: {:?}", cli);

    if let Err(e) = run(cli).await {
        tracing::error!("❌ Command failed: {} (Severity: {:?})", e, e.severity());
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());

        // 根據錯誤嚴重程度決定退出碼
        let exit_code = match e.severity() {
            ErrorSeverity::Low => 2,      // 使用者輸入錯誤
            ErrorSeverity::Medium => 4,   // 儲存端無法連線
            ErrorSeverity::High => 1,     // 資料或設定錯誤
            ErrorSeverity::Critical => 3, // 系統錯誤
        };
        std::process::exit(exit_code);
    }
}

async fn run(cli: CliConfig) -> Result<()> {
    let config = cli.resolve()?;
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        return Err(e);
    }

    let store = FallbackStore::from_config(&config)?;
    tracing::debug!("Using stores: {}", store.store_names().join(" → "));
    let engine = StudyEngine::new(store, SystemClock);

    match cli.command {
        Command::Generate { participants, force } => {
            if !force && engine.load().await?.is_some() {
                return Err(StudyError::ValidationError {
                    message: "A roster already exists; pass --force to replace it".to_string(),
                });
            }
            let data = engine.generate(participants).await?;
            print_roster(&data);
        }
        Command::Add => {
            let data = engine.add_participant().await?;
            if let Some(added) = data.participants().last() {
                println!(
                    "✅ Added participant #{} ({}/{})",
                    added.record_id,
                    data.len(),
                    MAX_PARTICIPANTS
                );
            }
        }
        Command::Remove { record_id } => {
            let data = engine.remove_participant(record_id).await?;
            println!("✅ Roster now holds {} participants", data.len());
        }
        Command::Regenerate { record_id } => {
            let data = engine.regenerate_participant(record_id).await?;
            match data.participant(record_id) {
                Some(participant) => {
                    println!(
                        "✅ Participant #{} now uses seed {}",
                        record_id, participant.random_seed
                    );
                }
                None => println!("🔶 Participant #{} not found", record_id),
            }
        }
        Command::Show => match engine.load().await? {
            Some(data) => print_roster(&data),
            None => println!("No experiment data yet. Run `generate <participants>` to start."),
        },
        Command::Export { formats } => {
            let formats = if formats.is_empty() {
                config.export_formats()
            } else {
                formats
            };
            let sink = DirectorySink::new(config.export_dir());
            for path in engine.export(&sink, &formats).await? {
                println!("📁 {}", path);
            }
        }
        Command::Clear => {
            engine.clear().await?;
            println!("✅ Saved experiment data cleared");
        }
    }

    Ok(())
}

fn print_roster(data: &ExperimentData) {
    let summary = data.summary();
    println!("📊 Generated: {}", data.generated_at().format("%Y-%m-%d %H:%M:%S UTC"));
    println!(
        "📊 Participants: {} | Per session: {} | Per participant: {} | Total: {}",
        summary.total_participants,
        summary.measurements_per_session,
        summary.measurements_per_participant,
        summary.total_measurements
    );

    for participant in data.participants() {
        let Some(design) = participant.design() else {
            continue;
        };
        println!(
            "  #{:<3} seed {:<10} modality {:?} | model {:?} | spheres {:?} | points {:?}",
            participant.record_id,
            participant.random_seed,
            design.modality_order,
            design.model_type_order,
            design.ball_sphere_order,
            design.balloon_point_order
        );
    }
}
