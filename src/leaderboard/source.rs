use std::collections::HashSet;

use super::types::{AuthorProfile, ScoredPost, SourcePost};

/// Supplies one batch of posts, in the order the upstream returned them.
#[async_trait::async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<Vec<SourcePost>>;
}

#[async_trait::async_trait]
pub trait ProfileSource: Send + Sync {
    async fn profile(&self, author_id: &str) -> anyhow::Result<AuthorProfile>;
}

/// Whether an author was active in the previous scoring period.
pub trait PriorActivity: Send + Sync {
    fn was_active(&self, author_id: &str) -> bool;
}

#[async_trait::async_trait]
pub trait ScoredPostSink: Send + Sync {
    async fn save(&self, post: &ScoredPost) -> anyhow::Result<()>;
}

/// Same answer for every author.
#[derive(Clone, Copy, Debug)]
pub struct AssumeActive(pub bool);

impl PriorActivity for AssumeActive {
    fn was_active(&self, _author_id: &str) -> bool {
        self.0
    }
}

#[derive(Clone, Debug, Default)]
pub struct ActiveAuthors(HashSet<String>);

impl ActiveAuthors {
    pub fn new<I: IntoIterator<Item = String>>(authors: I) -> Self {
        Self(authors.into_iter().collect())
    }
}

impl PriorActivity for ActiveAuthors {
    fn was_active(&self, author_id: &str) -> bool {
        self.0.contains(author_id)
    }
}
