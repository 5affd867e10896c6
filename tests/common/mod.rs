// tests/common/mod.rs
// Browser-free page fakes and temp helpers shared by the integration tests.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use threes_check::{
    error::ScrapeError,
    roster::Player,
    scrape::{PageSession, PageSource},
};

pub const HOT: &str = include_str!("../fixtures/profile_hot.html");
pub const COLD: &str = include_str!("../fixtures/profile_cold.html");
pub const SITE: &str = "https://stats.test";

pub fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("threes_{}_{}", std::process::id(), name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

pub fn player(first: &str, last: &str, site_id: Option<u64>) -> Player {
    Player {
        first_name: first.into(),
        last_name: last.into(),
        site_id,
        status: "Active".into(),
    }
}

/// How every page opened from a `FakeSite` behaves.
#[derive(Clone, Debug, Default)]
pub struct Behavior {
    pub consent_banner: bool,
    pub profile_tab: bool,
    /// `goto` never resolves.
    pub hang_navigation: bool,
    /// `document.readyState` stays "loading".
    pub never_ready: bool,
}

/// Serves canned HTML by URL and records what the flow did.
#[derive(Clone, Default)]
pub struct FakeSite {
    pages: Arc<HashMap<String, String>>,
    pub behavior: Behavior,
    pub events: Arc<Mutex<Vec<String>>>,
}

impl FakeSite {
    pub fn new(pages: &[(u64, &str)], behavior: Behavior) -> Self {
        let pages = pages
            .iter()
            .map(|(id, html)| (format!("{SITE}/player/{id}"), html.to_string()))
            .collect();
        Self { pages: Arc::new(pages), behavior, events: Arc::default() }
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events().iter().filter(|e| e.starts_with(event)).count()
    }
}

pub struct FakePage {
    site: FakeSite,
    url: Mutex<Option<String>>,
}

impl FakePage {
    fn note(&self, event: String) {
        self.site.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl PageSource for FakeSite {
    type Page = FakePage;

    async fn open(&self) -> Result<FakePage, ScrapeError> {
        self.events.lock().unwrap().push("open".into());
        Ok(FakePage { site: self.clone(), url: Mutex::new(None) })
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn goto(&self, url: &str) -> Result<(), ScrapeError> {
        self.note(format!("goto {url}"));
        if self.site.behavior.hang_navigation {
            std::future::pending::<()>().await;
        }
        *self.url.lock().unwrap() = Some(url.to_string());
        Ok(())
    }

    async fn ready_state(&self) -> Result<String, ScrapeError> {
        let state = if self.site.behavior.never_ready { "loading" } else { "complete" };
        Ok(state.to_string())
    }

    async fn click_selector(&self, selector: &str) -> Result<bool, ScrapeError> {
        if self.site.behavior.consent_banner {
            self.note(format!("click {selector}"));
            return Ok(true);
        }
        Ok(false)
    }

    async fn click_link_text(&self, text: &str) -> Result<bool, ScrapeError> {
        if self.site.behavior.profile_tab {
            self.note(format!("link {text}"));
            return Ok(true);
        }
        Ok(false)
    }

    async fn content(&self) -> Result<String, ScrapeError> {
        let url = self.url.lock().unwrap().clone().unwrap_or_default();
        Ok(self
            .site
            .pages
            .get(&url)
            .cloned()
            .unwrap_or_else(|| "<html><body><p>Player not found</p></body></html>".into()))
    }

    async fn close(self) -> Result<(), ScrapeError> {
        self.note("close".into());
        Ok(())
    }
}
