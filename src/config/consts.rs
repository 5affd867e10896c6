// src/config/consts.rs

// Roster API
pub const API_BASE: &str = "https://api.sportsdata.io";
pub const ROSTER_PATH: &str = "/v3/nba/scores/json/Players/";
pub const DEFAULT_TEAM: &str = "DAL";
pub const ACTIVE_STATUS: &str = "Active";
pub const API_TIMEOUT_SECS: u64 = 30;
pub const USER_AGENT: &str = concat!("threes_check/", env!("CARGO_PKG_VERSION"));

// Target site
pub const SITE_BASE: &str = "https://www.nba.com";
pub const CONSENT_SELECTOR: &str = r#"button[id="onetrust-accept-btn-handler"]"#;
pub const PROFILE_TAB_TEXT: &str = "Profile";
pub const VIEWPORT: (u32, u32) = (1920, 1080);

// Page waits
pub const NAVIGATION_TIMEOUT_MS: u64 = 30_000;
pub const LOAD_TIMEOUT_MS: u64 = 20_000;
pub const TAB_RELOAD_TIMEOUT_MS: u64 = 15_000;
pub const OPTIONAL_WAIT_MS: u64 = 3_000;
pub const SETTLE_MS: u64 = 1_000;
pub const PAGE_POLL_MS: u64 = 250;

// Table heuristic
pub const MARKER_PHRASE: &str = "Last 5 Games";
pub const STAT_COLUMN: &str = "3PM";
pub const ROW_WINDOW: usize = 5;
pub const PASS_THRESHOLD: f64 = 1.0;

// Ledger
pub const STORE_DIR: &str = ".store";
pub const DEFAULT_LEDGER: &str = "results.json";
pub const RECORD_ATTEMPTS: u32 = 5;
pub const RECORD_BACKOFF_MS: u64 = 100;
pub const STALE_LOCK_MS: u64 = 10_000;

// Summary
pub const POLL_INTERVAL_SECS: u64 = 2;
pub const MAX_WAIT_SECS: u64 = 120;
pub const MIN_RECORDED_RATIO: f64 = 0.5;

// Concurrency
pub const WORKERS: usize = 1;
