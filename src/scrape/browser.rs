// src/scrape/browser.rs
// chromiumoxide-backed page sessions.

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::config::consts::VIEWPORT;
use crate::error::{RunError, ScrapeError};
use super::page::{PageSession, PageSource};

/// A launched Chrome process and the task that drives its CDP connection.
pub struct Chrome {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl Chrome {
    pub async fn launch(headless: bool) -> Result<Self, RunError> {
        let mut builder = BrowserConfig::builder().window_size(VIEWPORT.0, VIEWPORT.1);
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(RunError::Browser)?;

        let (browser, mut events) = Browser::launch(config)
            .await
            .map_err(|e| RunError::Browser(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(e) = event {
                    logd!("browser event error: {e}");
                }
            }
        });

        logd!("browser launched (headless: {headless})");
        Ok(Self { browser, handler })
    }

    pub async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            logd!("browser close: {e}");
        }
        if let Err(e) = self.browser.wait().await {
            logd!("browser wait: {e}");
        }
        self.handler.abort();
    }
}

#[async_trait]
impl PageSource for Chrome {
    type Page = ChromePage;

    async fn open(&self) -> Result<ChromePage, ScrapeError> {
        Ok(ChromePage(self.browser.new_page("about:blank").await?))
    }
}

pub struct ChromePage(Page);

#[async_trait]
impl PageSession for ChromePage {
    async fn goto(&self, url: &str) -> Result<(), ScrapeError> {
        self.0.goto(url).await?;
        Ok(())
    }

    async fn ready_state(&self) -> Result<String, ScrapeError> {
        let result = self.0.evaluate("document.readyState").await?;
        Ok(result
            .value()
            .and_then(|v| v.as_str())
            .unwrap_or("loading")
            .to_string())
    }

    async fn click_selector(&self, selector: &str) -> Result<bool, ScrapeError> {
        match self.0.find_element(selector).await {
            Ok(el) => {
                el.click().await?;
                Ok(true)
            }
            Err(_) => Ok(false),
        }
    }

    async fn click_link_text(&self, text: &str) -> Result<bool, ScrapeError> {
        let result = self.0.evaluate_expression(click_link_script(text)).await?;
        Ok(result.value().and_then(|v| v.as_bool()).unwrap_or(false))
    }

    async fn content(&self) -> Result<String, ScrapeError> {
        Ok(self.0.content().await?)
    }

    async fn close(self) -> Result<(), ScrapeError> {
        self.0.close().await?;
        Ok(())
    }
}

/// One round trip: find the first `<a>` whose text contains `text` and click it.
/// Evaluates to true when a link was clicked.
fn click_link_script(text: &str) -> String {
    let needle = serde_json::Value::from(text);
    format!(
        "(() => {{ \
           const link = Array.from(document.querySelectorAll('a')) \
             .find(a => (a.innerText || a.textContent || '').includes({needle})); \
           if (!link) return false; \
           link.click(); \
           return true; \
         }})()"
    )
}
