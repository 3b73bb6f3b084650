use std::collections::HashMap;

use itertools::Itertools as _;

use super::{
    source::PriorActivity,
    types::{AuthorAggregate, Post, ScoredPost},
};

/// Per-author running totals, kept in first-seen order.
#[derive(Clone, Debug, Default)]
pub struct Aggregates {
    entries: Vec<AuthorAggregate>,
    index: HashMap<String, usize>,
}

impl Aggregates {
    pub fn add(&mut self, post: &Post, final_score: f64) {
        let position = match self.index.get(post.author_id()).copied() {
            Some(position) => position,
            None => {
                self.index
                    .insert(post.author_id().to_string(), self.entries.len());
                self.entries.push(AuthorAggregate::new(post));
                self.entries.len() - 1
            }
        };
        self.entries[position].add(final_score);
    }

    pub fn from_scored(scored: &[ScoredPost]) -> Self {
        let mut aggregates = Self::default();
        for post in scored {
            aggregates.add(post.post(), post.breakdown().final_score());
        }
        aggregates
    }

    #[cfg(test)]
    pub fn get(&self, author_id: &str) -> Option<&AuthorAggregate> {
        self.index.get(author_id).map(|position| &self.entries[*position])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<AuthorAggregate> {
        self.entries
    }
}

/// Score every post with its author's prior activity and fold the scores per
/// author. The scored posts come back in input order so callers can persist them.
pub fn aggregate<I>(posts: I, prior: &dyn PriorActivity) -> (Vec<ScoredPost>, Aggregates)
where
    I: IntoIterator<Item = Post>,
{
    let scored = posts
        .into_iter()
        .map(|post| {
            let active = prior.was_active(post.author_id());
            ScoredPost::score(post, active)
        })
        .collect_vec();
    let aggregates = Aggregates::from_scored(&scored);
    (scored, aggregates)
}
