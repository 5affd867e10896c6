// src/scrape/page.rs
use async_trait::async_trait;

use crate::error::ScrapeError;

/// The browser operations the profile flow needs from one tab.
///
/// Each call is a single attempt; bounded waiting and polling live in
/// `profile`, so fixtures can implement this without a browser.
#[async_trait]
pub trait PageSession: Send + Sync {
    async fn goto(&self, url: &str) -> Result<(), ScrapeError>;

    /// `document.readyState`: "loading", "interactive" or "complete".
    async fn ready_state(&self) -> Result<String, ScrapeError>;

    /// Click the first element matching `selector`. Ok(false) if none is present.
    async fn click_selector(&self, selector: &str) -> Result<bool, ScrapeError>;

    /// Click the first link whose text contains `text`. Ok(false) if none is present.
    async fn click_link_text(&self, text: &str) -> Result<bool, ScrapeError>;

    /// Serialized HTML of the rendered document.
    async fn content(&self) -> Result<String, ScrapeError>;

    async fn close(self) -> Result<(), ScrapeError>
    where
        Self: Sized;
}

/// Opens a fresh page per player; no state is shared between players.
#[async_trait]
pub trait PageSource: Send + Sync {
    type Page: PageSession;

    async fn open(&self) -> Result<Self::Page, ScrapeError>;
}
