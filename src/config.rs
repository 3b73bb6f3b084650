use std::sync::Arc;

use anyhow::anyhow;
use chrono_tz::Tz;
use serde::Deserialize;
use tokio::fs::read_to_string;

use crate::leaderboard::{ActiveAuthors, AssumeActive, PriorActivity};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    chats: Vec<i64>,
    telegram: Telegram,
    twitter: Twitter,
    #[serde(default)]
    leaderboard: Leaderboard,
    #[serde(default)]
    database: Database,
}

impl Config {
    pub fn telegram(&self) -> &Telegram {
        &self.telegram
    }

    pub fn twitter(&self) -> &Twitter {
        &self.twitter
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn chats(&self) -> &[i64] {
        &self.chats
    }

    pub async fn read(file: &str) -> anyhow::Result<Self> {
        let content = read_to_string(file)
            .await
            .map_err(|e| anyhow!("Read {file} error: {e:?}"))?;
        Ok(toml::from_str(&content)?)
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Telegram {
    #[serde(alias = "server", alias = "api-server")]
    api_server: Option<String>,
    #[serde(alias = "key", alias = "api-key", alias = "api")]
    api_key: String,
}

impl Telegram {
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn api_server(&self) -> Option<&String> {
        self.api_server.as_ref()
    }
}

fn default_query() -> String {
    "OpenServ".into()
}

fn default_max_pages() -> usize {
    5
}

fn default_max_results() -> u32 {
    100
}

fn default_concurrency() -> usize {
    8
}

#[derive(Clone, Debug, Deserialize)]
pub struct Twitter {
    #[serde(alias = "server", alias = "api-server")]
    api_server: Option<String>,
    #[serde(alias = "token", alias = "bearer-token")]
    bearer_token: String,
    #[serde(default = "default_query")]
    query: String,
    #[serde(default = "default_max_pages", alias = "max-pages")]
    max_pages: usize,
    #[serde(default = "default_max_results", alias = "max-results")]
    max_results: u32,
    #[serde(default = "default_concurrency")]
    concurrency: usize,
}

impl Twitter {
    pub fn api_server(&self) -> Option<&str> {
        self.api_server.as_deref()
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn max_pages(&self) -> usize {
        self.max_pages.max(1)
    }

    /// Recent search only accepts 10..=100.
    pub fn max_results(&self) -> u32 {
        self.max_results.clamp(10, 100)
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency.max(1)
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Leaderboard {
    #[serde(alias = "exclude", alias = "exclude-username")]
    exclude_username: String,
    #[serde(alias = "assume-active-last-week")]
    assume_active_last_week: bool,
    #[serde(alias = "active-authors")]
    active_authors: Vec<String>,
    timezone: String,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self {
            exclude_username: "openservai".into(),
            assume_active_last_week: true,
            active_authors: Vec::new(),
            timezone: "UTC".into(),
        }
    }
}

impl Leaderboard {
    pub fn exclude_username(&self) -> &str {
        &self.exclude_username
    }

    pub fn timezone(&self) -> anyhow::Result<Tz> {
        self.timezone
            .parse()
            .map_err(|e| anyhow!("Invalid timezone {:?}: {e}", self.timezone))
    }

    /// An explicit author list wins over the constant assumption.
    pub fn prior_activity(&self) -> Arc<dyn PriorActivity> {
        if self.active_authors.is_empty() {
            Arc::new(AssumeActive(self.assume_active_last_week))
        } else {
            Arc::new(ActiveAuthors::new(self.active_authors.iter().cloned()))
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Database {
    file: String,
    persist: bool,
}

impl Default for Database {
    fn default() -> Self {
        Self {
            file: "leaderboard.db".into(),
            persist: true,
        }
    }
}

impl Database {
    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn persist(&self) -> bool {
        self.persist
    }
}
