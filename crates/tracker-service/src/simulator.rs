//! Synthetic traffic generator for the `tracker-simulator` binary.
//!
//! Each tick picks one weighted-random API call against a running server
//! and logs the outcome:
//!
//! | action | weight |
//! |---|---|
//! | query all | 0.2 |
//! | query user | 0.3 |
//! | query episode | 0.2 |
//! | update episode | 0.3 |

use crate::models::{AllEntriesResponse, EpisodeResponse, UserShowsResponse};
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::StatusCode;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_INTERVAL_SECONDS: u64 = 10;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

pub const USERS: &[&str] = &["alice", "bob", "charlie", "diana", "eve"];

pub const TV_SHOWS: &[&str] = &[
    "Breaking Bad",
    "The Office",
    "Stranger Things",
    "Game of Thrones",
    "Friends",
    "The Crown",
    "Ozark",
    "House of Cards",
    "Narcos",
    "Black Mirror",
    "Sherlock",
    "Lost",
    "Prison Break",
    "Dexter",
];

#[derive(Debug, Error)]
pub enum SimulatorError {
    #[error("Invalid simulator configuration: {0}")]
    InvalidConfig(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected status {0}")]
    UnexpectedStatus(StatusCode),
}

/// Simulator settings, read from `TRACKER_API_URL` and
/// `SIMULATOR_INTERVAL_SECONDS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatorConfig {
    pub api_url: String,
    pub interval: Duration,
}

impl SimulatorConfig {
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, SimulatorError> {
        let api_url = vars
            .get("TRACKER_API_URL")
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let interval_seconds = match vars.get("SIMULATOR_INTERVAL_SECONDS") {
            Some(value) => value.parse::<u64>().map_err(|e| {
                SimulatorError::InvalidConfig(format!(
                    "SIMULATOR_INTERVAL_SECONDS must be a positive integer, got '{}': {}",
                    value, e
                ))
            })?,
            None => DEFAULT_INTERVAL_SECONDS,
        };
        if interval_seconds == 0 {
            return Err(SimulatorError::InvalidConfig(
                "SIMULATOR_INTERVAL_SECONDS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            api_url,
            interval: Duration::from_secs(interval_seconds),
        })
    }
}

/// One simulated API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    QueryAll,
    QueryUser,
    QueryEpisode,
    UpdateEpisode,
}

impl Action {
    const WEIGHTED: [(Action, f64); 4] = [
        (Action::QueryAll, 0.2),
        (Action::QueryUser, 0.3),
        (Action::QueryEpisode, 0.2),
        (Action::UpdateEpisode, 0.3),
    ];

    /// Map a roll in `[0, 1)` onto an action by cumulative weight.
    pub fn from_roll(roll: f64) -> Action {
        let mut cumulative = 0.0;
        for (action, weight) in Self::WEIGHTED {
            cumulative += weight;
            if roll < cumulative {
                return action;
            }
        }
        Action::UpdateEpisode
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::QueryAll => "Query All Data",
            Action::QueryUser => "Query User Data",
            Action::QueryEpisode => "Query Episode",
            Action::UpdateEpisode => "Update Episode",
        }
    }
}

/// HTTP client issuing simulated calls.
pub struct Simulator {
    client: reqwest::Client,
    api_url: String,
}

impl Simulator {
    pub fn new(api_url: impl Into<String>) -> Result<Self, SimulatorError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("tracker-simulator/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    /// Pick a random action and run it.
    pub async fn tick(&self) -> (Action, Result<(), SimulatorError>) {
        let action = Action::from_roll(rand::thread_rng().gen::<f64>());
        info!(target: "tracker.simulator", action = action.name(), "ACTION");
        let result = self.run(action).await;

        match &result {
            Ok(()) => info!(target: "tracker.simulator", action = action.name(), "SUCCESS"),
            Err(e) => warn!(target: "tracker.simulator", action = action.name(), error = %e, "FAILED"),
        }

        (action, result)
    }

    pub async fn run(&self, action: Action) -> Result<(), SimulatorError> {
        let (user, show) = random_pair();
        match action {
            Action::QueryAll => self.query_all().await.map(|_| ()),
            Action::QueryUser => self.query_user(user).await.map(|_| ()),
            Action::QueryEpisode => self.query_episode(user, show).await.map(|_| ()),
            Action::UpdateEpisode => {
                let (season, episode) = {
                    let mut rng = rand::thread_rng();
                    (rng.gen_range(1..=10), rng.gen_range(1..=24))
                };
                self.update_episode(user, show, season, episode).await
            }
        }
    }

    /// Returns the total number of entries.
    pub async fn query_all(&self) -> Result<usize, SimulatorError> {
        let response = self
            .client
            .get(format!("{}/show_all", self.api_url))
            .send()
            .await?;
        let body: AllEntriesResponse = expect_ok(response)?.json().await?;

        info!(target: "tracker.simulator", total_entries = body.total_entries, "QUERY_ALL");
        Ok(body.total_entries)
    }

    /// Returns how many shows the user tracks.
    pub async fn query_user(&self, user: &str) -> Result<usize, SimulatorError> {
        let response = self
            .client
            .get(format!("{}/show_user", self.api_url))
            .query(&[("username", user)])
            .send()
            .await?;
        let body: UserShowsResponse = expect_ok(response)?.json().await?;

        info!(target: "tracker.simulator", user, total_shows = body.total_shows, "QUERY_USER");
        Ok(body.total_shows)
    }

    /// A 404 is a normal outcome and returns `None`.
    pub async fn query_episode(
        &self,
        user: &str,
        show: &str,
    ) -> Result<Option<EpisodeResponse>, SimulatorError> {
        let response = self
            .client
            .get(format!("{}/show_episode", self.api_url))
            .query(&[("username", user), ("tv_show", show)])
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            info!(target: "tracker.simulator", user, show, "QUERY_EPISODE: no data");
            return Ok(None);
        }

        let body: EpisodeResponse = expect_ok(response)?.json().await?;
        info!(
            target: "tracker.simulator",
            user,
            show,
            season = body.season,
            episode = body.episode,
            "QUERY_EPISODE"
        );
        Ok(Some(body))
    }

    pub async fn update_episode(
        &self,
        user: &str,
        show: &str,
        season: u32,
        episode: u32,
    ) -> Result<(), SimulatorError> {
        let response = self
            .client
            .post(format!("{}/update_episode", self.api_url))
            .json(&json!({
                "username": user,
                "tv_show": show,
                "season": season,
                "episode": episode,
            }))
            .send()
            .await?;
        expect_ok(response)?;

        info!(target: "tracker.simulator", user, show, season, episode, "UPDATE");
        Ok(())
    }
}

fn random_pair() -> (&'static str, &'static str) {
    let mut rng = rand::thread_rng();
    (
        USERS.choose(&mut rng).copied().unwrap_or("alice"),
        TV_SHOWS.choose(&mut rng).copied().unwrap_or("Lost"),
    )
}

fn expect_ok(response: reqwest::Response) -> Result<reqwest::Response, SimulatorError> {
    if response.status() == StatusCode::OK {
        Ok(response)
    } else {
        Err(SimulatorError::UnexpectedStatus(response.status()))
    }
}
