//! Logging for flowerstore.
use anyhow::Context;
use flowerstore_core::get_data_dir;
use std::io::LineWriter;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::time::OffsetTime;

const LOG_FILE_NAME: &str = "flowerstore.log";
const MAX_LOG_SIZE: u64 = 100 * 1024;

/// Initializes file based logging at `<data_dir>/flowerstore.log`.
///
/// A log file larger than 100KB is moved to `flowerstore.log.old` first. Our crates log
/// at DEBUG, `sqlx` at WARN and `rustyline` at INFO.
pub fn setup_logging() -> anyhow::Result<()> {
    let data_dir = get_data_dir().context("Failed to get data directory")?;
    let log_path = data_dir.join(LOG_FILE_NAME);
    rotate_log(&log_path, &data_dir.join(format!("{LOG_FILE_NAME}.old")))?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    // Ensure the logs are flushed after every line
    let writer = Mutex::new(LineWriter::new(log_file));

    tracing_subscriber::fmt()
        .with_env_filter(
            "flowerstore=debug,flowerstore_core=debug,flowerstore_store_sql=debug,sqlx=warn,rustyline=info",
        )
        .with_writer(writer)
        .with_ansi(false)
        .with_timer(OffsetTime::local_rfc_3339()?)
        .init();
    Ok(())
}

fn rotate_log(log_path: &Path, backup_path: &Path) -> std::io::Result<bool> {
    if !log_path.exists() || std::fs::metadata(log_path)?.len() <= MAX_LOG_SIZE {
        return Ok(false);
    }
    if backup_path.exists() {
        std::fs::remove_file(backup_path)?;
    }
    std::fs::rename(log_path, backup_path)?;
    Ok(true)
}
