//! File logging for the scheduler process.
//!
//! Log lines are `key=value` records (`event=... module=... status=...`).
//! Task titles and comments are never written; ids, dates and rules are.
//!
//! Logging is set up once per process. Asking again with the same settings
//! is a no-op; asking with different settings is an error.

use flexi_logger::{
    Age, Cleanup, Criterion, DeferredNow, Duplicate, FileSpec, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{error, info, LevelFilter, Record};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "scheduler";
const ROTATE_AT_BYTES: u64 = 8 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 7;
const PANIC_MESSAGE_LIMIT: usize = 120;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Validated logging settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub dir: PathBuf,
}

impl LogSettings {
    /// Parses a level name (`trace` .. `error`, case-insensitive) and an
    /// absolute log directory.
    pub fn parse(level: &str, dir: &str) -> Result<Self, LoggingError> {
        let level = LevelFilter::from_str(level.trim())
            .map_err(|_| LoggingError::UnknownLevel(level.to_string()))?;
        let dir = Path::new(dir.trim());
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeDir(dir.to_path_buf()));
        }
        Ok(Self {
            level,
            dir: dir.to_path_buf(),
        })
    }
}

/// Logging setup failure.
#[derive(Debug)]
pub enum LoggingError {
    UnknownLevel(String),
    /// Empty paths land here too.
    RelativeDir(PathBuf),
    CreateDir { dir: PathBuf, source: std::io::Error },
    Backend(flexi_logger::FlexiLoggerError),
    /// Already running with other settings.
    Conflict { active: LogSettings },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(level) => write!(
                f,
                "unknown log level `{level}`; expected trace, debug, info, warn or error"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => {
                write!(f, "cannot create log directory `{}`: {source}", dir.display())
            }
            Self::Backend(err) => write!(f, "logger backend failed: {err}"),
            Self::Conflict { active } => write!(
                f,
                "logging already running at level {} in `{}`",
                active.level,
                active.dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// Starts rolling file logging under `log_dir`, mirroring warnings to stderr.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), LoggingError> {
    let settings = LogSettings::parse(level, log_dir)?;
    let active = ACTIVE.get_or_try_init(|| start(settings.clone()))?;
    if active.settings != settings {
        return Err(LoggingError::Conflict {
            active: active.settings.clone(),
        });
    }
    Ok(())
}

/// Settings of the running logger, if any.
pub fn active_log_settings() -> Option<LogSettings> {
    ACTIVE.get().map(|active| active.settings.clone())
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start(settings: LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.dir).map_err(|source| LoggingError::CreateDir {
        dir: settings.dir.clone(),
        source,
    })?;

    let handle = Logger::try_with_str(settings.level.to_string().to_ascii_lowercase())
        .map_err(LoggingError::Backend)?
        .log_to_file(
            FileSpec::default()
                .directory(settings.dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::AgeOrSize(Age::Day, ROTATE_AT_BYTES),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .duplicate_to_stderr(Duplicate::Warn)
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(scheduler_format)
        .start()
        .map_err(LoggingError::Backend)?;

    install_panic_hook();
    info!(
        "event=logging_ready module=logging status=ok level={} dir={} version={}",
        settings.level,
        settings.dir.display(),
        env!("CARGO_PKG_VERSION")
    );

    Ok(ActiveLogger {
        settings,
        _handle: handle,
    })
}

// 2024-03-10 08:15:02.417 INFO  scheduler_core::service::task_service: event=...
fn scheduler_format(
    w: &mut dyn Write,
    now: &mut DeferredNow,
    record: &Record<'_>,
) -> std::io::Result<()> {
    write!(
        w,
        "{} {:<5} {}: {}",
        now.now().format("%Y-%m-%d %H:%M:%S%.3f"),
        record.level(),
        record.target(),
        record.args()
    )
}

// Called only from inside the `ACTIVE` initializer, so at most once.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let message = info
            .payload()
            .downcast_ref::<&str>()
            .map(|text| (*text).to_string())
            .or_else(|| info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_default();
        error!(
            "event=panic module=logging status=error location={location} message={}",
            one_line(&message, PANIC_MESSAGE_LIMIT)
        );
        previous(info);
    }));
}

fn one_line(text: &str, limit: usize) -> String {
    let mut line: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .take(limit)
        .collect();
    if text.chars().count() > limit {
        line.push_str("...");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::{active_log_settings, init_logging, one_line, LogSettings, LoggingError};
    use log::LevelFilter;

    #[test]
    fn settings_parse_level_and_require_absolute_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();

        let settings = LogSettings::parse(" WARN ", dir_str).unwrap();
        assert_eq!(settings.level, LevelFilter::Warn);
        assert_eq!(settings.dir, dir.path());

        assert!(matches!(
            LogSettings::parse("loud", dir_str),
            Err(LoggingError::UnknownLevel(_))
        ));
        for relative in ["", "logs/dev"] {
            assert!(matches!(
                LogSettings::parse("info", relative),
                Err(LoggingError::RelativeDir(_))
            ));
        }
    }

    #[test]
    fn one_line_flattens_and_caps_text() {
        assert_eq!(one_line("due\n20240310", 40), "due 20240310");
        assert_eq!(one_line("abcdef", 3), "abc...");
    }

    #[test]
    fn second_init_must_match_first() {
        let dir = tempfile::tempdir().unwrap();
        let dir_str = dir.path().to_str().unwrap();

        init_logging("info", dir_str).unwrap();
        init_logging("INFO", dir_str).unwrap();
        assert!(matches!(
            init_logging("debug", dir_str),
            Err(LoggingError::Conflict { .. })
        ));

        let active = active_log_settings().unwrap();
        assert_eq!(active.level, LevelFilter::Info);
        assert_eq!(active.dir, dir.path());
    }
}
