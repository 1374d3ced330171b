use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local};
use env_logger::{Builder, Env, Target};

use crate::settings::LoggingSettings;
use crate::Result;

const LOG_PREFIX: &str = "ezmc-launcher-";

pub fn log_file_name(now: DateTime<Local>) -> String {
    format!("{}{}.log", LOG_PREFIX, now.format("%Y-%m-%d_%H-%M-%S"))
}

/// Routes `log` output to a file, since the terminal belongs to the UI.
///
/// `RUST_LOG` overrides the configured level. With file logging disabled the
/// logger is not installed at all.
pub fn init(settings: &LoggingSettings) -> Result<Option<PathBuf>> {
    if !settings.save_to_file {
        return Ok(None);
    }

    fs::create_dir_all(&settings.directory)?;
    let removed = cleanup_old_logs(&settings.directory, settings.retention_hours, Local::now());

    let path = settings.directory.join(log_file_name(Local::now()));
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    Builder::from_env(Env::default().default_filter_or(settings.level.as_str()))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(|e| crate::Error::Other(e.to_string()))?;

    log::info!("Logging to {:?} ({} old log files removed)", path, removed);
    Ok(Some(path))
}

/// Deletes launcher log files last modified before the retention window.
pub fn cleanup_old_logs(log_dir: &Path, retention_hours: u32, now: DateTime<Local>) -> usize {
    let cutoff_time = now - Duration::hours(i64::from(retention_hours));
    let mut removed = 0;

    let entries = match fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(_) => return 0,
    };

    for entry in entries.flatten() {
        let path = entry.path();
        let is_launcher_log = path.is_file()
            && path.extension().and_then(|s| s.to_str()) == Some("log")
            && path
                .file_stem()
                .and_then(|s| s.to_str())
                .map_or(false, |s| s.starts_with(LOG_PREFIX));
        if !is_launcher_log {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => DateTime::<Local>::from(modified),
            Err(_) => continue,
        };
        if modified < cutoff_time && fs::remove_file(&path).is_ok() {
            removed += 1;
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_name_has_timestamp() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(log_file_name(now), "ezmc-launcher-2024-01-02_03-04-05.log");
    }

    #[test]
    fn cleanup_only_touches_expired_launcher_logs() {
        let dir = tempfile::tempdir().unwrap();
        let ours = dir.path().join("ezmc-launcher-old.log");
        let foreign = dir.path().join("other.log");
        fs::write(&ours, "x").unwrap();
        fs::write(&foreign, "x").unwrap();

        assert_eq!(cleanup_old_logs(dir.path(), 24, Local::now()), 0);
        assert!(ours.exists());

        let later = Local::now() + Duration::hours(25);
        assert_eq!(cleanup_old_logs(dir.path(), 24, later), 1);
        assert!(!ours.exists());
        assert!(foreign.exists());
    }

    #[test]
    fn disabled_file_logging_installs_nothing() {
        let settings = LoggingSettings {
            save_to_file: false,
            ..LoggingSettings::default()
        };
        assert_eq!(init(&settings).unwrap(), None);
    }
}
