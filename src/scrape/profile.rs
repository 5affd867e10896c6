// src/scrape/profile.rs
// Profile page flow: navigate, clear optional overlays, snapshot, extract.

use std::{future::Future, time::Duration};

use tokio::time::{sleep, timeout};

use crate::config::consts::{CONSENT_SELECTOR, PROFILE_TAB_TEXT};
use crate::config::options::PageTiming;
use crate::core::net::join_url;
use crate::error::ScrapeError;
use super::extract::{extract_average, Extraction, TableTarget};
use super::page::PageSession;

pub fn profile_url(site_base: &str, site_id: u64) -> String {
    join_url(site_base, &format!("/player/{site_id}"))
}

/// Load one player's profile and average the target column.
///
/// Consent banner and Profile tab are optional: their absence, or a failed
/// click, is logged and the flow goes on. Navigation and initial load are
/// bounded and fail the player with `NavigationTimeout`.
pub async fn fetch_average<P>(
    page: &P,
    site_base: &str,
    site_id: u64,
    target: &TableTarget,
    timing: &PageTiming,
) -> Result<Extraction, ScrapeError>
where
    P: PageSession + ?Sized,
{
    let url = profile_url(site_base, site_id);
    logd!("opening {url}");

    match timeout(timing.navigation, page.goto(&url)).await {
        Ok(res) => res?,
        Err(_) => return Err(ScrapeError::NavigationTimeout { url, after: timing.navigation }),
    }
    if !wait_until_loaded(page, timing.load, timing.poll).await {
        return Err(ScrapeError::NavigationTimeout { url, after: timing.load });
    }

    if click_within(timing.optional, timing.poll, || page.click_selector(CONSENT_SELECTOR)).await {
        logd!("cookie consent dismissed");
    }

    if click_within(timing.optional, timing.poll, || page.click_link_text(PROFILE_TAB_TEXT)).await {
        logd!("profile tab opened");
        if !wait_until_loaded(page, timing.tab_reload, timing.poll).await {
            logd!("profile tab still loading after {:?}", timing.tab_reload);
        }
    }

    sleep(timing.settle).await;
    let html = page.content().await?;
    extract_average(&html, target)
}

/// Poll `document.readyState` until the DOM is usable. False on timeout.
async fn wait_until_loaded<P>(page: &P, limit: Duration, poll: Duration) -> bool
where
    P: PageSession + ?Sized,
{
    let ready = async {
        loop {
            match page.ready_state().await {
                Ok(state) if state == "interactive" || state == "complete" => return,
                Ok(_) => {}
                // Mid-navigation the execution context can vanish; retry.
                Err(e) => logd!("readyState: {e}"),
            }
            sleep(poll).await;
        }
    };
    timeout(limit, ready).await.is_ok()
}

/// Retry a single-shot click until it lands or `limit` passes.
async fn click_within<F, Fut>(limit: Duration, poll: Duration, mut attempt: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<bool, ScrapeError>>,
{
    let clicked = async {
        loop {
            match attempt().await {
                Ok(true) => return true,
                Ok(false) => {}
                Err(e) => {
                    logd!("optional click failed: {e}");
                    return false;
                }
            }
            sleep(poll).await;
        }
    };
    timeout(limit, clicked).await.unwrap_or(false)
}
