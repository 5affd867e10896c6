// src/config/options.rs
use std::{fmt, path::PathBuf, str::FromStr, time::Duration};

use super::consts::*;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct AppOptions {
    pub roster: RosterOptions,
    pub scrape: ScrapeOptions,
    pub ledger: LedgerOptions,
    pub summary: SummaryOptions,
}

#[derive(Clone, PartialEq, Eq)]
pub struct RosterOptions {
    pub api_key: Option<String>,
    pub api_base: String,
    pub team: String,
}

impl Default for RosterOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: API_BASE.to_string(),
            team: DEFAULT_TEAM.to_string(),
        }
    }
}

// Keep the credential out of debug logs.
impl fmt::Debug for RosterOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RosterOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("api_base", &self.api_base)
            .field("team", &self.team)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScrapeOptions {
    pub site_base: String,
    pub headless: bool,
    pub workers: usize,
    pub shard: Option<Shard>,
    pub timing: PageTiming,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            site_base: SITE_BASE.to_string(),
            headless: true,
            workers: WORKERS,
            shard: None,
            timing: PageTiming::default(),
        }
    }
}

/// Bounds for every wait in the profile-page flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageTiming {
    pub navigation: Duration,
    pub load: Duration,
    pub tab_reload: Duration,
    pub optional: Duration,
    pub settle: Duration,
    pub poll: Duration,
}

impl Default for PageTiming {
    fn default() -> Self {
        Self {
            navigation: Duration::from_millis(NAVIGATION_TIMEOUT_MS),
            load: Duration::from_millis(LOAD_TIMEOUT_MS),
            tab_reload: Duration::from_millis(TAB_RELOAD_TIMEOUT_MS),
            optional: Duration::from_millis(OPTIONAL_WAIT_MS),
            settle: Duration::from_millis(SETTLE_MS),
            poll: Duration::from_millis(PAGE_POLL_MS),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerOptions {
    pub path: PathBuf,
    /// Keep an existing ledger instead of starting fresh.
    pub reuse: bool,
    pub attempts: u32,
    pub backoff: Duration,
    pub stale_lock: Duration,
}

impl Default for LedgerOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LEDGER),
            reuse: false,
            attempts: RECORD_ATTEMPTS,
            backoff: Duration::from_millis(RECORD_BACKOFF_MS),
            stale_lock: Duration::from_millis(STALE_LOCK_MS),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SummaryOptions {
    pub interval: Duration,
    pub max_wait: Duration,
    /// Share of expected outcomes that must be recorded for the run to count.
    pub min_ratio: f64,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(POLL_INTERVAL_SECS),
            max_wait: Duration::from_secs(MAX_WAIT_SECS),
            min_ratio: MIN_RECORDED_RATIO,
        }
    }
}

/// `K/N`: this process handles roster indices `i` with `i % N == K`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Shard {
    pub index: usize,
    pub count: usize,
}

impl Shard {
    pub fn owns(&self, roster_index: usize) -> bool {
        roster_index % self.count == self.index
    }
}

impl FromStr for Shard {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (k, n) = s.split_once('/').ok_or_else(|| format!("expected K/N, got {s:?}"))?;
        let index: usize = k.trim().parse().map_err(|e| format!("shard index {k:?}: {e}"))?;
        let count: usize = n.trim().parse().map_err(|e| format!("shard count {n:?}: {e}"))?;
        if count == 0 {
            return Err("shard count must be at least 1".into());
        }
        if index >= count {
            return Err(format!("shard index {index} out of range (0..{count})"));
        }
        Ok(Shard { index, count })
    }
}

impl fmt::Display for Shard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shard_parses_and_partitions() {
        let s: Shard = "1/3".parse().unwrap();
        assert_eq!(s, Shard { index: 1, count: 3 });
        let owned: Vec<usize> = (0..7).filter(|i| s.owns(*i)).collect();
        assert_eq!(owned, [1, 4]);
        assert_eq!(s.to_string(), "1/3");
    }

    #[test]
    fn shard_rejects_bad_input() {
        assert!("3/3".parse::<Shard>().is_err());
        assert!("0/0".parse::<Shard>().is_err());
        assert!("2".parse::<Shard>().is_err());
        assert!("a/2".parse::<Shard>().is_err());
    }

    #[test]
    fn api_key_is_redacted() {
        let opts = RosterOptions { api_key: Some("secret".into()), ..Default::default() };
        let dbg = format!("{opts:?}");
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("***"));
    }
}
