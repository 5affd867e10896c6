// src/roster.rs
// Active roster from the sportsdata.io players endpoint.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

use crate::config::consts::{ACTIVE_STATUS, ROSTER_PATH};
use crate::config::options::RosterOptions;
use crate::core::net;
use crate::error::RunError;
use crate::log::RunLog;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Player {
    #[serde(rename = "FirstName")]
    pub first_name: String,
    #[serde(rename = "LastName")]
    pub last_name: String,
    /// Profile id on the stats site; the API leaves it null for some players.
    #[serde(rename = "NbaDotComPlayerID", default)]
    pub site_id: Option<u64>,
    #[serde(rename = "Status")]
    pub status: String,
}

impl Player {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }
}

/// Parse the API body and keep active players in API order.
pub fn parse_active(body: &str) -> Result<Vec<Player>, serde_json::Error> {
    let all: Vec<Player> = serde_json::from_str(body)?;
    Ok(all.into_iter().filter(Player::is_active).collect())
}

/// Roster client; the roster is fetched at most once per instance.
pub struct RosterClient {
    http: reqwest::Client,
    url: String,
    team: String,
    api_key: String,
    cache: OnceCell<Vec<Player>>,
    log: Arc<RunLog>,
}

impl RosterClient {
    /// Fails with `Configuration` when no credential is set; nothing is sent.
    pub fn new(opts: &RosterOptions, log: Arc<RunLog>) -> Result<Self, RunError> {
        let api_key = opts
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or(RunError::Configuration)?
            .to_string();

        Ok(Self {
            http: net::http_client()?,
            url: net::join_url(&opts.api_base, &format!("{ROSTER_PATH}{}", opts.team)),
            team: opts.team.clone(),
            api_key,
            cache: OnceCell::new(),
            log,
        })
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub async fn active_players(&self) -> Result<&[Player], RunError> {
        self.cache
            .get_or_try_init(|| self.fetch())
            .await
            .map(Vec::as_slice)
    }

    async fn fetch(&self) -> Result<Vec<Player>, RunError> {
        self.log.info_once(&format!("Fetching {} players from the roster API...", self.team));

        let body = self
            .http
            .get(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let players = parse_active(&body)?;
        if players.is_empty() {
            return Err(RunError::NoActivePlayers(self.team.clone()));
        }
        self.log.info_once(&format!("Found {} active {} players.", players.len(), self.team));
        Ok(players)
    }
}
