// src/runner.rs
use std::sync::Arc;

use futures::{stream, StreamExt};

use crate::{
    config::options::{AppOptions, ScrapeOptions},
    error::{RunError, ScrapeError},
    log::RunLog,
    progress::Progress,
    roster::{Player, RosterClient},
    scrape::{browser::Chrome, fetch_average, Extraction, PageSession, PageSource, TableTarget},
    store::{LedgerStore, RecordStats, Recorder},
};

/// One player's outcome as shown on the console and written to the ledger.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerResult {
    pub name: String,
    pub passed: bool,
    /// Present only when at least one valid sample was extracted.
    pub average: Option<f64>,
    pub error: Option<String>,
}

impl PlayerResult {
    pub fn from_outcome(name: String, outcome: Result<Extraction, ScrapeError>, target: &TableTarget) -> Self {
        match outcome {
            Ok(x) => Self { name, passed: target.passes(x.average), average: Some(x.average), error: None },
            Err(e) => Self { name, passed: false, average: None, error: Some(e.to_string()) },
        }
    }
}

/// Summary of what this process evaluated.
#[derive(Debug)]
pub struct RunOutcome {
    /// Full roster size, i.e. outcomes the ledger should end up holding.
    pub expected: usize,
    pub results: Vec<PlayerResult>,
    pub stats: RecordStats,
}

/// Open a page, run the profile flow, close the page. Never fails the run.
pub async fn evaluate_player<S>(
    source: &S,
    player: &Player,
    scrape: &ScrapeOptions,
    target: &TableTarget,
) -> PlayerResult
where
    S: PageSource + ?Sized,
{
    let name = player.display_name();
    let outcome = match player.site_id {
        None => Err(ScrapeError::MissingSiteId),
        Some(id) => match source.open().await {
            Ok(page) => {
                let res = fetch_average(&page, &scrape.site_base, id, target, &scrape.timing).await;
                if let Err(e) = page.close().await {
                    logd!("{name}: closing page: {e}");
                }
                res
            }
            Err(e) => Err(e),
        },
    };

    match &outcome {
        Ok(x) => logd!("{name}: {} average {:.2} over {} games via {}", target.column, x.average, x.games, x.strategy),
        Err(e) => loge!("Error processing {name}: {e}"),
    }
    PlayerResult::from_outcome(name, outcome, target)
}

/// Evaluate this process's share of the roster with up to `workers` pages open,
/// sending each outcome to the recorder as it completes.
pub async fn evaluate_all<S>(
    source: &S,
    players: &[Player],
    scrape: &ScrapeOptions,
    target: &TableTarget,
    recorder: &Recorder,
    progress: &mut dyn Progress,
) -> Vec<PlayerResult>
where
    S: PageSource + ?Sized,
{
    let selected: Vec<(usize, &Player)> = players
        .iter()
        .enumerate()
        .filter(|(i, _)| scrape.shard.is_none_or(|s| s.owns(*i)))
        .collect();

    progress.begin(selected.len());
    let workers = scrape.workers.clamp(1, selected.len().max(1));
    logd!("evaluating {} players with {workers} workers", selected.len());

    let mut pending = stream::iter(selected)
        .map(|(i, player)| async move {
            (i, player, evaluate_player(source, player, scrape, target).await)
        })
        .buffer_unordered(workers);

    let mut results = Vec::new();
    while let Some((i, player, result)) = pending.next().await {
        recorder.send(result.name.clone(), result.passed);
        progress.player_done(i + 1, player, &result);
        results.push(result);
    }
    progress.finish();
    results
}

/// Prepare the ledger, evaluate, and drain the recorder. Browser-agnostic.
pub async fn run_players<S>(
    source: &S,
    players: &[Player],
    opts: &AppOptions,
    target: &TableTarget,
    progress: &mut dyn Progress,
) -> Result<RunOutcome, RunError>
where
    S: PageSource + ?Sized,
{
    let store = LedgerStore::new(&opts.ledger);
    // Shard workers share a ledger started by `init` or the first writer.
    let reuse = opts.ledger.reuse || opts.scrape.shard.is_some();
    if !reuse || !store.exists() {
        store.initialize()?;
    } else {
        logf!("reusing ledger {}", store.path().display());
    }

    let recorder = Recorder::spawn(store);
    let results = evaluate_all(source, players, &opts.scrape, target, &recorder, progress).await;

    let stats = tokio::task::spawn_blocking(move || recorder.finish())
        .await
        .unwrap_or_else(|e| {
            loge!("ledger recorder: {e}");
            RecordStats::default()
        });
    if stats.lost > 0 {
        loge!("{} results could not be written to the ledger", stats.lost);
    }

    Ok(RunOutcome { expected: players.len(), results, stats })
}

/// Full run: roster, browser, evaluation. Run-level failures abort before any player.
pub async fn run(
    opts: &AppOptions,
    target: &TableTarget,
    log: Arc<RunLog>,
    progress: &mut dyn Progress,
) -> Result<RunOutcome, RunError> {
    let roster = RosterClient::new(&opts.roster, Arc::clone(&log))?;
    let players = roster.active_players().await?;
    log.info_once(&format!("Setting up tests for {} players", players.len()));

    let chrome = Chrome::launch(opts.scrape.headless).await?;
    let outcome = run_players(&chrome, players, opts, target, progress).await;
    chrome.shutdown().await;
    outcome
}
