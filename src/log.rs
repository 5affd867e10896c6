// src/log.rs
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use crate::config::consts::STORE_DIR;

const LOG_FILE: &str = "debug.log";

/// Terminal logger on stderr plus a debug log under `.store/`.
/// The file sink is skipped (with a warning) if `.store/` cannot be created.
pub fn init(verbose: bool) -> Result<(), ::log::SetLoggerError> {
    let term_level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("threes_check")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::with_capacity(2);
    loggers.push(TermLogger::new(
        term_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));

    let dir = Path::new(STORE_DIR);
    let file = fs::create_dir_all(dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE)));
    let file_err = match file {
        Ok(f) => {
            loggers.push(WriteLogger::new(LevelFilter::Debug, config, f));
            None
        }
        Err(e) => Some(e),
    };

    CombinedLogger::init(loggers)?;
    if let Some(e) = file_err {
        ::log::warn!("debug log disabled: {e}");
    }
    Ok(())
}

/// Per-run logger handle that prints selected lines only once.
///
/// Shared by `Arc` between the roster client and the runner so that
/// concurrently scheduled players do not repeat setup chatter.
#[derive(Debug, Default)]
pub struct RunLog {
    seen: Mutex<HashSet<String>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// True the first time `msg` is offered, false afterwards.
    pub fn first_time(&self, msg: &str) -> bool {
        match self.seen.lock() {
            Ok(mut seen) => seen.insert(msg.to_string()),
            // A poisoned set only means a panic elsewhere; keep logging.
            Err(poisoned) => poisoned.into_inner().insert(msg.to_string()),
        }
    }

    pub fn info_once(&self, msg: &str) {
        if self.first_time(msg) {
            ::log::info!("{msg}");
        }
    }
}

/// Info-level logging
#[macro_export]
macro_rules! logf {
    ($($arg:tt)*) => {
        ::log::info!($($arg)*)
    };
}

/// Debug-level logging
#[macro_export]
macro_rules! logd {
    ($($arg:tt)*) => {
        ::log::debug!($($arg)*)
    };
}

/// Error-level logging
#[macro_export]
macro_rules! loge {
    ($($arg:tt)*) => {
        ::log::error!($($arg)*)
    };
}
