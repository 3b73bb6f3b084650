use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tap::TapOptional as _;

use crate::leaderboard::{AuthorProfile, Metrics, SourcePost};

/// Accepts integers, floats (truncated) and numeric strings. Anything else,
/// including negatives and `null`, counts as zero.
pub(super) fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .map(coerce_count)
        .unwrap_or(0))
}

fn coerce_float(value: f64) -> Option<u64> {
    (value.is_finite() && value >= 0.0).then_some(value as u64)
}

fn coerce_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(coerce_float)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(coerce_float))
        }
        _ => None,
    }
    .unwrap_or(0)
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct TweetPublicMetrics {
    #[serde(default, deserialize_with = "lenient_count")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub retweet_count: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reply_count: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Tweet {
    pub id: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub public_metrics: Option<TweetPublicMetrics>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub text: String,
}

impl Tweet {
    pub fn into_source(self) -> Option<SourcePost> {
        let Some(author_id) = self.author_id else {
            log::warn!("Tweet {} has no author id, skip", self.id);
            return None;
        };
        let metrics = self.public_metrics.unwrap_or_default();
        Some(SourcePost {
            id: self.id,
            author_id,
            metrics: Metrics::new(
                metrics.like_count,
                metrics.retweet_count,
                metrics.reply_count,
            ),
            published_at: self.created_at.unwrap_or_default(),
            text: self.text,
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchMeta {
    #[serde(default)]
    pub next_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub result_count: u64,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<Tweet>,
    #[serde(default)]
    pub meta: SearchMeta,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct UserPublicMetrics {
    #[serde(default, deserialize_with = "lenient_count")]
    pub followers_count: u64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub public_metrics: Option<UserPublicMetrics>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct UserResponse {
    #[serde(default)]
    pub data: Option<User>,
    #[serde(default)]
    pub errors: Vec<Value>,
}

impl From<User> for AuthorProfile {
    fn from(user: User) -> Self {
        let followers_count = user
            .public_metrics
            .as_ref()
            .map(|metrics| metrics.followers_count)
            .tap_none(|| log::debug!("User {} ({}) has no public metrics", user.username, user.id))
            .unwrap_or(0);
        AuthorProfile::new(user.username, followers_count)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lenient_metrics() {
        let tweet: Tweet = serde_json::from_str(
            r#"{"id": "1", "author_id": "9", "text": "hi",
                "public_metrics": {"like_count": "12", "retweet_count": -3, "reply_count": null}}"#,
        )
        .unwrap();
        let post = tweet.into_source().unwrap();
        assert_eq!(post.metrics, Metrics::new(12, 0, 0));
        assert_eq!(post.published_at, "");

        let tweet: Tweet = serde_json::from_str(
            r#"{"id": "2", "author_id": "9", "created_at": "2025-01-01T00:00:00.000Z",
                "public_metrics": {"like_count": 4.7, "retweet_count": "abc"}}"#,
        )
        .unwrap();
        let post = tweet.into_source().unwrap();
        assert_eq!(post.metrics, Metrics::new(4, 0, 0));
        assert_eq!(post.published_at, "2025-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_missing_fields() {
        let tweet: Tweet = serde_json::from_str(r#"{"id": "3", "author_id": "7"}"#).unwrap();
        assert_eq!(tweet.into_source().unwrap().metrics, Metrics::default());

        let tweet: Tweet = serde_json::from_str(r#"{"id": "4", "text": "orphan"}"#).unwrap();
        assert!(tweet.into_source().is_none());
    }

    #[test]
    fn test_search_response() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"data": [{"id": "1", "author_id": "2", "text": "a"}],
                "meta": {"result_count": 1, "next_token": "abc"}}"#,
        )
        .unwrap();
        assert_eq!(response.data.len(), 1);
        assert_eq!(response.meta.next_token.as_deref(), Some("abc"));

        let empty: SearchResponse =
            serde_json::from_str(r#"{"meta": {"result_count": 0}}"#).unwrap();
        assert!(empty.data.is_empty());
        assert!(empty.meta.next_token.is_none());
    }

    #[test]
    fn test_user_profile() {
        let response: UserResponse = serde_json::from_str(
            r#"{"data": {"id": "2", "username": "bob", "public_metrics": {"followers_count": 321}}}"#,
        )
        .unwrap();
        let profile = AuthorProfile::from(response.data.unwrap());
        assert_eq!(profile, AuthorProfile::new("bob", 321));

        let response: UserResponse =
            serde_json::from_str(r#"{"data": {"id": "3", "username": "quiet"}}"#).unwrap();
        assert_eq!(
            AuthorProfile::from(response.data.unwrap()).followers_count,
            0
        );
    }
}
