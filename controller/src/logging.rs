//! Log sinks: errors to stderr, everything from debug up to a rotating file.
//!
//! The file is rolled once at start so every run begins with a fresh log.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::{LevelFilter, Record};
use log4rs::Handle;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::rolling_file::RollingFileAppender;
use log4rs::append::rolling_file::policy::compound::CompoundPolicy;
use log4rs::append::rolling_file::policy::compound::roll::Roll;
use log4rs::append::rolling_file::policy::compound::roll::fixed_window::FixedWindowRoller;
use log4rs::append::rolling_file::policy::compound::trigger::size::SizeTrigger;
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use log4rs::encode::{self, Encode};
use log4rs::filter::threshold::ThresholdFilter;

/// `19/10/2026 14:03:07.123|DEBUG   |controller     |212|message`
///
/// `{M}` receives the last module path segment, see [`LineEncoder`].
pub const LOG_PATTERN: &str =
    "{d(%d/%m/%Y %H:%M:%S%.3f)}|{l:<8.8}|{M:<15.15}|{L:<3}|{m}{n}";

const CONSOLE: &str = "console";
const LOGFILE: &str = "logfile";
const CONSOLE_LEVEL: LevelFilter = LevelFilter::Error;
const LOGFILE_LEVEL: LevelFilter = LevelFilter::Debug;

/// [`LOG_PATTERN`] with the crate prefix dropped from the module column,
/// so `mctrl300_control::controller` is logged as `controller`.
#[derive(Debug)]
pub struct LineEncoder(PatternEncoder);

impl Default for LineEncoder {
    fn default() -> Self {
        Self(PatternEncoder::new(LOG_PATTERN))
    }
}

impl Encode for LineEncoder {
    fn encode(&self, w: &mut dyn encode::Write, record: &Record) -> Result<()> {
        let module = record
            .module_path()
            .map(|path| path.rsplit("::").next().unwrap_or(path));
        let trimmed = Record::builder()
            .metadata(record.metadata().clone())
            .args(*record.args())
            .module_path(module)
            .file(record.file())
            .line(record.line())
            .build();
        self.0.encode(w, &trimmed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub file: PathBuf,
    pub max_bytes: u64,
    pub backups: u32,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from("./logfile.log"),
            max_bytes: 500_000,
            backups: 3,
        }
    }
}

/// Installs the sinks described by `config`.
///
/// The returned handle must be kept alive by the caller for as long as
/// logging should continue.
pub fn init(config: &LogConfig) -> Result<Handle> {
    let built = build_config(config)?;
    Ok(log4rs::init_config(built)?)
}

pub fn build_config(config: &LogConfig) -> Result<Config> {
    roll_existing(config)?;

    let console = ConsoleAppender::builder()
        .encoder(Box::new(LineEncoder::default()))
        .target(Target::Stderr)
        .build();

    let policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(config.max_bytes)),
        Box::new(roller(config)?),
    );
    let logfile = RollingFileAppender::builder()
        .encoder(Box::new(LineEncoder::default()))
        .build(&config.file, Box::new(policy))?;

    let built = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(CONSOLE_LEVEL)))
                .build(CONSOLE, Box::new(console)),
        )
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(LOGFILE_LEVEL)))
                .build(LOGFILE, Box::new(logfile)),
        )
        .build(
            Root::builder()
                .appender(CONSOLE)
                .appender(LOGFILE)
                .build(LOGFILE_LEVEL),
        )?;

    Ok(built)
}

/// Shifts `logfile.log` to `logfile.log.1` (and older backups up by one).
pub fn roll_existing(config: &LogConfig) -> Result<()> {
    if !config.file.exists() {
        return Ok(());
    }
    roller(config)?
        .roll(&config.file)
        .map_err(|e| anyhow!("rolling {}: {e}", config.file.display()))
}

fn roller(config: &LogConfig) -> Result<FixedWindowRoller> {
    FixedWindowRoller::builder()
        .base(1)
        .build(&backup_pattern(&config.file), config.backups)
        .map_err(|e| anyhow!("log backup pattern: {e}"))
}

fn backup_pattern(file: &Path) -> String {
    format!("{}.{{}}", file.display())
}
