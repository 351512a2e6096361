use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use fintrack_ledger::ledger::{
	FileChainRepository, LedgerConfig, TransactionLedger, parse_exported_chain, validate_chain,
};
use fintrack_ledger::messages::{FileMessageSource, MessageSource, NoopMessageSource};
use fintrack_ledger::sms::{categorize_merchant, parse_bank_sms};
use fintrack_ledger::sync::{
	DomainTransaction, FileSyncStateRepository, SmsSyncService, SyncConfig,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// Command-line interface for the FinTrack transaction ledger
#[derive(Parser)]
#[command(name = "fintrack-ledger")]
#[command(about = "Tamper-evident transaction ledger with bank SMS ingestion")]
#[command(version)]
struct Cli {
	/// Directory holding the chain and sync marker
	#[arg(short, long, value_name = "DIR", default_value = "data")]
	data_dir: PathBuf,

	/// Leading zero hex digits required in block hashes
	#[arg(long, default_value_t = LedgerConfig::default().difficulty)]
	difficulty: usize,

	/// Nonce attempts before mining a block gives up
	#[arg(long, default_value_t = LedgerConfig::default().max_mining_attempts)]
	max_mining_attempts: u64,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand)]
enum Command {
	/// Print chain validity, size and last sync time
	Status,

	/// Write the full chain as pretty-printed JSON
	Export {
		/// Output file, stdout when omitted
		#[arg(short, long)]
		output: Option<PathBuf>,
	},

	/// Validate a previously exported chain file
	Verify {
		/// Exported chain file
		file: PathBuf,
	},

	/// Parse a single message and print the result
	Parse {
		/// Message text
		text: String,
	},

	/// Run one sync pass over a JSON message file
	Sync {
		/// JSON array of { "body", "timestamp" } records
		#[arg(short, long)]
		messages: PathBuf,
	},

	/// Sync a JSON message file on a schedule until interrupted
	Watch {
		/// JSON array of { "body", "timestamp" } records
		#[arg(short, long)]
		messages: PathBuf,

		/// Seconds between passes
		#[arg(short, long, default_value_t = SyncConfig::default().interval.as_secs())]
		interval_secs: u64,
	},
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			tracing_subscriber::EnvFilter::from_default_env()
				.add_directive(tracing::Level::INFO.into()),
		)
		.with_target(false)
		.with_thread_ids(false)
		.with_thread_names(false)
		.with_file(false)
		.with_line_number(false)
		.with_timer(tracing_subscriber::fmt::time::time())
		.with_writer(std::io::stderr)
		.init();

	let cli = Cli::parse();
	let ledger_config = LedgerConfig {
		difficulty: cli.difficulty,
		max_mining_attempts: cli.max_mining_attempts,
	};

	match cli.command {
		Command::Status => {
			let service = open_service(
				&cli.data_dir,
				ledger_config,
				Box::new(NoopMessageSource),
				SyncConfig::default(),
			)
			.await?;
			let status = service.status().await;
			println!("{}", serde_json::to_string_pretty(&status)?);
		}
		Command::Export { output } => {
			let ledger = open_ledger(&cli.data_dir, ledger_config).await?;
			let exported = ledger.export_chain()?;
			match output {
				Some(path) => {
					tokio::fs::write(&path, exported)
						.await
						.with_context(|| format!("Failed to write export to {:?}", path))?;
					info!("Exported {} blocks to {:?}", ledger.len(), path);
				}
				None => println!("{}", exported),
			}
		}
		Command::Verify { file } => {
			let content = tokio::fs::read_to_string(&file)
				.await
				.with_context(|| format!("Failed to read {:?}", file))?;
			let chain = parse_exported_chain(&content)?;
			if validate_chain(&chain) {
				println!("valid: {} blocks", chain.len());
			} else {
				println!("INVALID: {} blocks", chain.len());
				std::process::exit(1);
			}
		}
		Command::Parse { text } => match parse_bank_sms(&text, Utc::now()) {
			Some(parsed) => {
				let mut json = serde_json::to_value(&parsed)?;
				json["category"] = serde_json::json!(categorize_merchant(&parsed.merchant));
				println!("{}", serde_json::to_string_pretty(&json)?);
			}
			None => println!("not a recognized bank transaction message"),
		},
		Command::Sync { messages } => {
			let service = open_service(
				&cli.data_dir,
				ledger_config,
				Box::new(FileMessageSource::new(messages)),
				SyncConfig::default(),
			)
			.await?;

			let stats = service.sync_once(&print_transactions).await?;
			info!("Sync finished: {}", stats.summary());
		}
		Command::Watch {
			messages,
			interval_secs,
		} => {
			let sync_config = SyncConfig {
				interval: Duration::from_secs(interval_secs),
				..SyncConfig::default()
			};
			let mut service = open_service(
				&cli.data_dir,
				ledger_config,
				Box::new(FileMessageSource::new(messages)),
				sync_config,
			)
			.await?;

			service.start_auto_sync(Arc::new(print_transactions));
			tokio::signal::ctrl_c()
				.await
				.context("Failed to listen for Ctrl-C")?;

			info!("Interrupted, waiting for the current pass to finish");
			service.shutdown().await;

			let status = service.status().await;
			if !status.is_valid {
				error!("Ledger failed integrity validation");
			}
		}
	}

	Ok(())
}

async fn open_ledger(data_dir: &std::path::Path, config: LedgerConfig) -> Result<TransactionLedger> {
	TransactionLedger::open(
		Box::new(FileChainRepository::new(data_dir.to_path_buf())),
		config,
	)
	.await
	.with_context(|| format!("Failed to open ledger in {:?}", data_dir))
}

async fn open_service(
	data_dir: &std::path::Path,
	ledger_config: LedgerConfig,
	source: Box<dyn MessageSource>,
	sync_config: SyncConfig,
) -> Result<SmsSyncService> {
	let ledger = open_ledger(data_dir, ledger_config).await?;
	Ok(SmsSyncService::new(
		ledger,
		source,
		Box::new(FileSyncStateRepository::new(data_dir.to_path_buf())),
		sync_config,
	)
	.await)
}

fn print_transactions(transactions: Vec<DomainTransaction>) {
	for tx in transactions {
		match serde_json::to_string(&tx) {
			Ok(line) => println!("{}", line),
			Err(e) => error!("Failed to serialize transaction {}: {}", tx.id, e),
		}
	}
}
