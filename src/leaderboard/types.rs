use std::fmt::Display;

use super::scorer::{ScoreBreakdown, score};

pub const PROFILE_BASE: &str = "https://x.com";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Metrics {
    pub like_count: u64,
    pub retweet_count: u64,
    pub reply_count: u64,
}

impl Metrics {
    pub fn new(like_count: u64, retweet_count: u64, reply_count: u64) -> Self {
        Self {
            like_count,
            retweet_count,
            reply_count,
        }
    }
}

/// A post as received from the upstream search, before author enrichment.
#[derive(Clone, Debug, Default)]
pub struct SourcePost {
    pub id: String,
    pub author_id: String,
    pub metrics: Metrics,
    pub published_at: String,
    pub text: String,
}

impl SourcePost {
    pub fn new(id: impl Into<String>, author_id: impl Into<String>, metrics: Metrics) -> Self {
        Self {
            id: id.into(),
            author_id: author_id.into(),
            metrics,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthorProfile {
    pub username: String,
    pub followers_count: u64,
}

impl AuthorProfile {
    pub fn new(username: impl Into<String>, followers_count: u64) -> Self {
        Self {
            username: username.into(),
            followers_count,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Post {
    id: String,
    author_id: String,
    author_username: String,
    author_follower_count: u64,
    metrics: Metrics,
    published_at: String,
    text: String,
    batch_index: usize,
}

impl Post {
    pub fn new(source: SourcePost, profile: AuthorProfile, batch_index: usize) -> Self {
        Self {
            id: source.id,
            author_id: source.author_id,
            author_username: profile.username,
            author_follower_count: profile.followers_count,
            metrics: source.metrics,
            published_at: source.published_at,
            text: source.text,
            batch_index,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn author_username(&self) -> &str {
        &self.author_username
    }

    pub fn author_follower_count(&self) -> u64 {
        self.author_follower_count
    }

    pub fn metrics(&self) -> Metrics {
        self.metrics
    }

    pub fn published_at(&self) -> &str {
        &self.published_at
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn batch_index(&self) -> usize {
        self.batch_index
    }

    pub fn profile_link(&self) -> String {
        format!("{PROFILE_BASE}/{}", self.author_username)
    }
}

impl Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "📝 Tweet ID: {id}\n👤 Author: @{username}\n🆔 User ID: {author} (Followers: {followers})\n\
            📅 Published: {published}\n📊 Metrics: Retweets: {retweets}, Likes: {likes}, Replies: {replies}\n\
            💬 Text: {text}",
            id = self.id,
            username = self.author_username,
            author = self.author_id,
            followers = self.author_follower_count,
            published = self.published_at,
            retweets = self.metrics.retweet_count,
            likes = self.metrics.like_count,
            replies = self.metrics.reply_count,
            text = self.text,
        )
    }
}

/// A post together with the score it received in this batch.
#[derive(Clone, Debug)]
pub struct ScoredPost {
    post: Post,
    breakdown: ScoreBreakdown,
    active_last_week: bool,
}

impl ScoredPost {
    pub fn score(post: Post, active_last_week: bool) -> Self {
        let breakdown = score(&post, active_last_week);
        Self {
            post,
            breakdown,
            active_last_week,
        }
    }

    pub fn post(&self) -> &Post {
        &self.post
    }

    pub fn breakdown(&self) -> &ScoreBreakdown {
        &self.breakdown
    }

    pub fn active_last_week(&self) -> bool {
        self.active_last_week
    }

    pub fn is_first_of_batch(&self) -> bool {
        self.post.batch_index == 0
    }

    pub fn is_second_of_batch(&self) -> bool {
        self.post.batch_index == 1
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuthorAggregate {
    author_id: String,
    username: String,
    profile_link: String,
    total_score: f64,
}

impl AuthorAggregate {
    pub(super) fn new(post: &Post) -> Self {
        Self {
            author_id: post.author_id.clone(),
            username: post.author_username.clone(),
            profile_link: post.profile_link(),
            total_score: 0.0,
        }
    }

    pub(super) fn add(&mut self, score: f64) {
        self.total_score += score;
    }

    #[allow(unused)]
    pub fn author_id(&self) -> &str {
        &self.author_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn profile_link(&self) -> &str {
        &self.profile_link
    }

    pub fn total_score(&self) -> f64 {
        self.total_score
    }
}
