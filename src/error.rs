// src/error.rs
use std::{io, path::PathBuf, time::Duration};

use thiserror::Error;

/// Failures that abort the whole run before any player is evaluated.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("API_KEY is not set; put it in .env or pass --api-key")]
    Configuration,

    #[error("roster request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("roster response is not a player list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no active players found for team {0}")]
    NoActivePlayers(String),

    #[error("browser launch failed: {0}")]
    Browser(String),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Per-player failures. The runner turns these into a failed outcome and moves on.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("{url} did not finish loading within {}s", .after.as_secs())]
    NavigationTimeout { url: String, after: Duration },

    #[error("no table with \"{marker}\" or a {column} header")]
    TableNotFound { marker: String, column: String },

    #[error("table has no {0} column")]
    ColumnNotFound(String),

    #[error("no valid {0} values in the last games")]
    NoValidSamples(String),

    #[error("player has no site id")]
    MissingSiteId,

    #[error("browser: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("ledger io on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("ledger encode: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("ledger stayed locked after {attempts} attempts")]
    Contention { attempts: u32 },
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LedgerError::Io { path: path.into(), source }
    }
}
