//! Main entry point for the processor binary
//!
//! Wires the configuration, the file-backed record store and the activity
//! log into a [`DataProcessor`] and runs one command against it.

use anyhow::bail;
use clap::Parser;

use processor::cli::{self, Args, Command};
use processor::{services::RealFileStore, DataProcessor, DuplicateMode};
use shared::{logging, ActivityLog};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let config = cli::build_config(&args, |key| std::env::var(key).ok()).await?;

    let activity = ActivityLog::new(config.activity_log_capacity);
    logging::init_tracing(&config.log_level, Some(activity.clone()))?;

    let mut data_processor = DataProcessor::with_activity_log(config, RealFileStore::new(), activity);

    match &args.command {
        Command::Duplicates { file, field, pairs } => {
            match file {
                Some(path) => data_processor.load_data(path).await?,
                None => data_processor.load_default().await?,
            };
            let mode = if *pairs { DuplicateMode::Pairs } else { DuplicateMode::Distinct };
            let duplicates = data_processor.find_duplicates(field, mode);
            println!("{}", serde_json::to_string_pretty(&duplicates)?);
        }
        Command::Lookup { file, id, text_id } => {
            data_processor.load_data(file).await?;
            let record = data_processor.get_record_by_id(&cli::record_id(id, *text_id));
            println!("{}", cli::render_lookup(record)?);
        }
        Command::Score { file, id, text_id } => {
            data_processor.load_data(file).await?;
            match id {
                Some(id) => {
                    let id = cli::record_id(id, *text_id);
                    match data_processor.score_by_id(&id) {
                        Some(score) => println!("{}", score?),
                        None => bail!("no record with id {id}"),
                    }
                }
                None => {
                    for record in data_processor.records() {
                        let label = record
                            .id()
                            .map(|id| id.to_string())
                            .unwrap_or_else(|| "-".to_string());
                        match data_processor.score_record(record) {
                            Ok(score) => println!("{label}\t{score}"),
                            Err(e) => println!("{label}\terror: {e}"),
                        }
                    }
                }
            }
        }
        Command::Eval { expression } => {
            let value = data_processor.calculate_expression(expression)?;
            println!("{value}");
        }
        Command::Pipeline { input, output, no_score } => {
            let input = input.clone().unwrap_or_else(|| data_processor.config().data_file.clone());
            let output = output.clone().unwrap_or_else(|| data_processor.config().output_file.clone());
            let report = data_processor.run_pipeline(&input, &output, !no_score).await?;

            tracing::info!(
                loaded = report.loaded,
                saved = report.saved,
                duplicate_ids = report.duplicate_ids.len(),
                "Pipeline finished"
            );
            println!(
                "{} records loaded, {} saved with '{}' transform",
                report.loaded, report.saved, report.transform
            );
            for id in &report.duplicate_ids {
                println!("duplicate id: {id}");
            }
        }
    }

    if args.show_activity {
        for entry in data_processor.activity().entries() {
            println!("{} {:>5} {}", entry.timestamp.to_rfc3339(), entry.level, entry.message);
        }
    }

    Ok(())
}
