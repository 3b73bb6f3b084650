use std::collections::HashSet;

use anyhow::anyhow;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    config::Twitter,
    leaderboard::{AuthorProfile, PostSource, ProfileSource, SourcePost},
};

use super::types::{SearchResponse, Tweet, User, UserResponse};

pub const DEFAULT_API_SERVER: &str = "https://api.twitter.com";
const TWEET_FIELDS: &str = "author_id,public_metrics,created_at";
const USER_FIELDS: &str = "username,public_metrics";

/// Append tweets not seen on an earlier page, keeping first occurrence.
pub(super) fn extend_unique(seen: &mut HashSet<String>, tweets: &mut Vec<Tweet>, page: Vec<Tweet>) {
    tweets.extend(page.into_iter().filter(|tweet| seen.insert(tweet.id.clone())));
}

#[derive(Clone, Debug)]
pub struct TwitterClient {
    client: Client,
    api_server: String,
    bearer_token: String,
    query: String,
    max_pages: usize,
    max_results: u32,
}

impl TwitterClient {
    pub fn new(client: Client, config: &Twitter) -> Self {
        Self {
            client,
            api_server: config
                .api_server()
                .unwrap_or(DEFAULT_API_SERVER)
                .trim_end_matches('/')
                .to_string(),
            bearer_token: config.bearer_token().to_string(),
            query: config.query().to_string(),
            max_pages: config.max_pages(),
            max_results: config.max_results(),
        }
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> anyhow::Result<T> {
        let resp = self
            .client
            .get(format!("{}{path}", self.api_server))
            .bearer_auth(&self.bearer_token)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Request {path} failure: {status} {body}"));
        }
        Ok(resp.json().await?)
    }

    pub async fn search_page(&self, next_token: Option<&str>) -> anyhow::Result<SearchResponse> {
        let mut query = vec![
            ("query", self.query.clone()),
            ("tweet.fields", TWEET_FIELDS.to_string()),
            ("max_results", self.max_results.to_string()),
        ];
        if let Some(token) = next_token {
            query.push(("next_token", token.to_string()));
        }
        self.get("/2/tweets/search/recent", &query).await
    }

    /// Follow `next_token` for at most `max_pages` pages. A failure after the
    /// first page keeps what was already collected.
    pub async fn search_recent(&self) -> anyhow::Result<Vec<Tweet>> {
        let mut seen = HashSet::new();
        let mut tweets = Vec::new();
        let mut next_token: Option<String> = None;

        for page in 0..self.max_pages {
            let response = match self.search_page(next_token.as_deref()).await {
                Ok(response) => response,
                Err(e) if page > 0 => {
                    log::warn!("Fetch page {page} failure, stop paging: {e:?}");
                    break;
                }
                Err(e) => return Err(e),
            };
            log::debug!(
                "Page {page}: {} tweets (reported {})",
                response.data.len(),
                response.meta.result_count
            );
            extend_unique(&mut seen, &mut tweets, response.data);

            match response.meta.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        Ok(tweets)
    }

    pub async fn user(&self, id: &str) -> anyhow::Result<User> {
        let response: UserResponse = self
            .get(
                &format!("/2/users/{id}"),
                &[("user.fields", USER_FIELDS.to_string())],
            )
            .await?;
        response
            .data
            .ok_or_else(|| anyhow!("User {id} not found: {:?}", response.errors))
    }
}

#[async_trait::async_trait]
impl PostSource for TwitterClient {
    async fn fetch(&self) -> anyhow::Result<Vec<SourcePost>> {
        Ok(self
            .search_recent()
            .await?
            .into_iter()
            .filter_map(Tweet::into_source)
            .collect())
    }
}

#[async_trait::async_trait]
impl ProfileSource for TwitterClient {
    async fn profile(&self, author_id: &str) -> anyhow::Result<AuthorProfile> {
        Ok(self.user(author_id).await?.into())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn tweet(id: &str) -> Tweet {
        serde_json::from_value(serde_json::json!({"id": id, "author_id": "1"})).unwrap()
    }

    #[test]
    fn test_extend_unique() {
        let mut seen = HashSet::new();
        let mut tweets = Vec::new();
        extend_unique(&mut seen, &mut tweets, vec![tweet("1"), tweet("2")]);
        extend_unique(&mut seen, &mut tweets, vec![tweet("2"), tweet("3"), tweet("1")]);

        let ids = tweets.iter().map(|t| t.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }
}
