//! Logging Infrastructure
//!
//! - Console: pretty (development) or JSON (production)
//! - `<log_dir>/app`: daily rotating application logs, removed after 14 days
//! - `<log_dir>/security`: daily rotating `security` target, never removed

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Days an application log file is kept
const APP_LOG_RETENTION_DAYS: i64 = 14;

/// Keeps the non-blocking file writers flushing; hold it for the process lifetime
#[must_use]
pub struct LoggerGuard {
    _guards: Vec<WorkerGuard>,
}

/// Initialize the logging system (console only)
pub fn init_logger(level: &str, json_format: bool) -> anyhow::Result<LoggerGuard> {
    init_logger_with_file(level, json_format, None)
}

/// Initialize the logging system with daily rotating logs
///
/// `RUST_LOG` overrides `level` when set.
///
/// ```no_run
/// // Development setup (console only)
/// let _guard = civic_server::init_logger_with_file("debug", false, None)?;
///
/// // Production setup (console + file)
/// let _guard = civic_server::init_logger_with_file("info", true, Some(std::path::Path::new("./data/logs")))?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn init_logger_with_file(
    level: &str,
    json_format: bool,
    log_dir: Option<&Path>,
) -> anyhow::Result<LoggerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let console_layer = if json_format {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_thread_ids(true)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    let mut guards = Vec::new();
    let mut file_layers = Vec::new();

    if let Some(dir) = log_dir {
        let app_log_dir = dir.join("app");
        let security_log_dir = dir.join("security");
        fs::create_dir_all(&app_log_dir)?;
        fs::create_dir_all(&security_log_dir)?;

        let (app_writer, app_guard) =
            tracing_appender::non_blocking(rolling::daily(&app_log_dir, "app.log"));
        let (security_writer, security_guard) =
            tracing_appender::non_blocking(rolling::daily(&security_log_dir, "security.log"));
        guards.push(app_guard);
        guards.push(security_guard);

        // app 文件不收 security target
        file_layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(app_writer)
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() != "security"
                }))
                .boxed(),
        );
        file_layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_writer(security_writer)
                .with_filter(tracing_subscriber::filter::filter_fn(|meta| {
                    meta.target() == "security"
                }))
                .boxed(),
        );

        tokio::spawn(periodic_cleanup(dir.to_path_buf()));
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layers)
        .try_init()?;

    Ok(LoggerGuard { _guards: guards })
}

/// Delete application log files older than the retention window
///
/// Security logs are left untouched.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = chrono::Local::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let mut removed = 0;

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        // rolling::daily 命名: app.log.YYYY-MM-DD
        let Some(date_part) = name.strip_prefix("app.log.") else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            removed += 1;
        }
    }

    Ok(removed)
}

/// Runs every hour
async fn periodic_cleanup(log_dir: PathBuf) {
    use tokio::time::{Duration, sleep};

    loop {
        sleep(Duration::from_secs(3600)).await;

        if let Err(e) = cleanup_old_logs(&log_dir) {
            tracing::error!(error = %e, "Failed to cleanup old logs");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_removes_only_expired_app_logs() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        let security = dir.path().join("security");
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&security).unwrap();

        let today = chrono::Local::now().date_naive();
        let old = today - chrono::Duration::days(30);
        let old_name = format!("app.log.{}", old.format("%Y-%m-%d"));
        let fresh_name = format!("app.log.{}", today.format("%Y-%m-%d"));
        let security_name = format!("security.log.{}", old.format("%Y-%m-%d"));

        fs::write(app.join(&old_name), "old").unwrap();
        fs::write(app.join(&fresh_name), "fresh").unwrap();
        fs::write(app.join("notes.txt"), "keep").unwrap();
        fs::write(security.join(&security_name), "keep").unwrap();

        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 1);
        assert!(!app.join(&old_name).exists());
        assert!(app.join(&fresh_name).exists());
        assert!(app.join("notes.txt").exists());
        assert!(security.join(&security_name).exists());
    }

    #[test]
    fn test_cleanup_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(cleanup_old_logs(dir.path()).unwrap(), 0);
    }
}
