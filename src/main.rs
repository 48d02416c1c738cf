//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `rowmap` library that handles:
//! - Command-line argument parsing and validation
//! - Logger initialization
//! - User-facing output formatting
//!
//! Exit codes: 0 on success, 2 when the query returned no rows, 1 otherwise.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use rowmap::initialization::init_logger_with;
use rowmap::{init_db_pool_with_path, Config, LogEventReceiver, Select, SqliteRunner, Value};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments into Config
    let config = Config::parse();
    config.validate().context("Invalid configuration")?;

    let log_level = config.log_level.clone();
    let log_format = config.log_format.clone();
    init_logger_with(log_level.into(), log_format).context("Failed to initialize logger")?;

    let pool = init_db_pool_with_path(&config.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", config.db_path.display()))?;
    let runner = SqliteRunner::new(pool);
    let receiver = Arc::new(LogEventReceiver::from_config(&config));

    let mut value = Value::Null;
    let result = Select::new(&runner, config.query.as_str())
        .with_receiver(receiver.clone())
        .load_value(&mut value)
        .await;

    receiver.stats().log_summary();

    match result {
        Ok(()) => {
            let rendered =
                serde_json::to_string(&value).context("Failed to render result as JSON")?;
            println!("{rendered}");
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            eprintln!("no rows");
            process::exit(2);
        }
        Err(e) => {
            eprintln!("rowmap error: {:#}", anyhow::Error::new(e));
            process::exit(1);
        }
    }
}
