// src/cli.rs
use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::{builder::BoolishValueParser, Args, FromArgMatches, Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};

use crate::{
    config::{consts::*, options::{AppOptions, Shard}},
    log::RunLog,
    progress::ConsoleProgress,
    roster::RosterClient,
    runner,
    scrape::{extract_average, TableTarget},
    store::LedgerStore,
    summary::{Report, SummaryReporter},
};

/// Check each active player's 3PM average over their last five games.
#[derive(Debug, Parser)]
#[command(name = "threes_check", version, about)]
pub struct Cli {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Defaults to `run`
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Roster API key
    #[arg(long, env = "API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Team key on the roster API
    #[arg(long, env = "TEAM", default_value = DEFAULT_TEAM, global = true)]
    pub team: String,

    #[arg(long, env = "ROSTER_API_BASE", default_value = API_BASE, global = true, hide = true)]
    pub api_base: String,

    /// Shared results ledger
    #[arg(long, env = "RESULTS_FILE", default_value = DEFAULT_LEDGER, global = true)]
    pub ledger: PathBuf,

    /// Debug output on the terminal
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate the roster, record outcomes, print the summary
    Run(RunArgs),
    /// Start a fresh, empty ledger
    Init,
    /// List the active roster
    Roster,
    /// Wait for the ledger to fill, then print the summary
    Summary(SummaryArgs),
    /// Run table extraction on a saved profile page
    Extract {
        /// HTML file
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[arg(long, env = "SITE_BASE", default_value = SITE_BASE, hide = true)]
    pub site_base: String,

    /// Players evaluated at once, one browser tab each
    #[arg(short, long, env = "WORKERS", default_value_t = WORKERS)]
    pub workers: usize,

    /// Show the browser window
    #[arg(long, env = "HEADED", value_parser = BoolishValueParser::new())]
    pub headed: bool,

    /// Keep an existing ledger instead of starting fresh
    #[arg(long, env = "REUSE_RESULTS", value_parser = BoolishValueParser::new())]
    pub reuse: bool,

    /// Only evaluate roster indices i with i % N == K (format K/N)
    #[arg(long)]
    pub shard: Option<Shard>,

    /// Skip waiting for and printing the summary
    #[arg(long)]
    pub no_summary: bool,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Debug, Args)]
pub struct SummaryArgs {
    /// Outcomes to wait for; defaults to the active roster size
    #[arg(long)]
    pub expected: Option<usize>,

    #[command(flatten)]
    pub wait: WaitArgs,
}

#[derive(Debug, Args)]
pub struct WaitArgs {
    /// Longest wait for outstanding results, in seconds
    #[arg(long, env = "SUMMARY_MAX_WAIT", default_value_t = MAX_WAIT_SECS)]
    pub max_wait: u64,

    /// Share of expected results that must be recorded
    #[arg(long, env = "SUMMARY_MIN_RATIO", default_value_t = MIN_RECORDED_RATIO)]
    pub min_ratio: f64,

    /// Require every expected result (same as --min-ratio 1)
    #[arg(long)]
    pub strict: bool,
}

impl WaitArgs {
    fn ratio(&self) -> f64 {
        if self.strict { 1.0 } else { self.min_ratio.clamp(0.0, 1.0) }
    }
}

/// Assemble options from parsed arguments.
pub fn app_options(common: &CommonArgs, run: Option<&RunArgs>, wait: Option<&WaitArgs>) -> AppOptions {
    let mut opts = AppOptions::default();
    opts.roster.api_key = common.api_key.clone();
    opts.roster.api_base = common.api_base.clone();
    opts.roster.team = common.team.clone();
    opts.ledger.path = common.ledger.clone();

    if let Some(run) = run {
        opts.scrape.site_base = run.site_base.clone();
        opts.scrape.workers = run.workers.max(1);
        opts.scrape.headless = !run.headed;
        opts.scrape.shard = run.shard;
        opts.ledger.reuse = run.reuse;
    }
    if let Some(wait) = wait {
        opts.summary.max_wait = Duration::from_secs(wait.max_wait);
        opts.summary.min_ratio = wait.ratio();
    }
    opts
}

pub async fn run(cli: Cli) -> Result<()> {
    let Cli { common, command } = cli;
    let command = match command {
        Some(c) => c,
        None => Command::Run(default_run_args()?),
    };
    let log = Arc::new(RunLog::new());

    match command {
        Command::Run(args) => {
            let opts = app_options(&common, Some(&args), Some(&args.wait));
            logd!("options: {opts:?}");
            let target = TableTarget::default();
            let mut progress = ConsoleProgress::stdout(&target.column);

            let outcome = runner::run(&opts, &target, log, &mut progress).await?;
            logf!(
                "{} evaluated, {} recorded, {} already present, {} lost",
                outcome.results.len(), outcome.stats.recorded, outcome.stats.duplicates, outcome.stats.lost
            );
            if args.no_summary {
                return Ok(());
            }
            let store = LedgerStore::new(&opts.ledger);
            let report = SummaryReporter::new(&opts.summary).wait_for(&store, outcome.expected).await;
            print!("{report}");
            check_health(&report, opts.summary.min_ratio)
        }
        Command::Init => {
            let opts = app_options(&common, None, None);
            let store = LedgerStore::new(&opts.ledger);
            let ledger = store.initialize()?;
            println!("Initialized {} at {}", store.path().display(), ledger.timestamp.to_rfc3339());
            Ok(())
        }
        Command::Roster => {
            let opts = app_options(&common, None, None);
            let roster = RosterClient::new(&opts.roster, log)?;
            for (i, p) in roster.active_players().await?.iter().enumerate() {
                let id = p.site_id.map_or_else(|| "-".to_string(), |id| id.to_string());
                println!("{}. {} ({id})", i + 1, p.display_name());
            }
            Ok(())
        }
        Command::Summary(args) => {
            let opts = app_options(&common, None, Some(&args.wait));
            let expected = match args.expected {
                Some(n) => n,
                None => RosterClient::new(&opts.roster, log)?.active_players().await?.len(),
            };
            let store = LedgerStore::new(&opts.ledger);
            let report = SummaryReporter::new(&opts.summary).wait_for(&store, expected).await;
            print!("{report}");
            check_health(&report, opts.summary.min_ratio)
        }
        Command::Extract { file } => {
            let html = std::fs::read_to_string(&file)
                .wrap_err_with(|| format!("reading {}", file.display()))?;
            let target = TableTarget::default();
            let x = extract_average(&html, &target)?;
            println!("Table: {}", x.strategy);
            for (i, s) in x.samples.iter().enumerate() {
                match s {
                    Some(v) => println!("Game {}: {v} {}", i + 1, target.column),
                    None => println!("Game {}: -", i + 1),
                }
            }
            let verdict = if target.passes(x.average) { "PASS" } else { "FAIL" };
            println!("Average {}: {:.2} ({} games) {verdict}", target.column, x.average, x.games);
            Ok(())
        }
    }
}

/// `run` arguments as if `run` had been typed alone: env fallbacks and defaults.
fn default_run_args() -> Result<RunArgs> {
    let cmd = RunArgs::augment_args(clap::Command::new("run"));
    let matches = cmd.try_get_matches_from(["run"])?;
    Ok(RunArgs::from_arg_matches(&matches)?)
}

fn check_health(report: &Report, min_ratio: f64) -> Result<()> {
    if report.is_healthy(min_ratio) {
        return Ok(());
    }
    Err(eyre!(
        "only {} of {} results recorded (need {:.0}%)",
        report.recorded(),
        report.expected,
        min_ratio * 100.0
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_args_map_to_options() {
        let cli = Cli::try_parse_from([
            "threes_check", "--api-key", "k", "--ledger", "out/r.json",
            "run", "--workers", "4", "--shard", "1/2", "--strict", "--max-wait", "90",
        ])
        .unwrap();
        let Some(Command::Run(args)) = &cli.command else { panic!("expected run") };
        let opts = app_options(&cli.common, Some(args), Some(&args.wait));
        assert_eq!(opts.roster.api_key.as_deref(), Some("k"));
        assert_eq!(opts.ledger.path, PathBuf::from("out/r.json"));
        assert_eq!(opts.scrape.workers, 4);
        assert_eq!(opts.scrape.shard, Some(Shard { index: 1, count: 2 }));
        assert!(opts.scrape.headless);
        assert_eq!(opts.summary.max_wait, Duration::from_secs(90));
        assert_eq!(opts.summary.min_ratio, 1.0);
    }

    #[test]
    fn bad_shard_is_rejected() {
        assert!(Cli::try_parse_from(["threes_check", "run", "--shard", "2/2"]).is_err());
    }

    #[test]
    fn subcommand_is_optional() {
        let cli = Cli::try_parse_from(["threes_check", "--team", "BOS"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.common.team, "BOS");
        assert!(default_run_args().is_ok());
    }

    #[test]
    fn clap_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
