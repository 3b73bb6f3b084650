use std::sync::Arc;

use futures_util::{StreamExt as _, future, stream};

use super::{
    aggregator::aggregate,
    ranker::{Standing, rank},
    source::{PriorActivity, ProfileSource, ScoredPostSink},
    types::{Post, ScoredPost, SourcePost},
};

#[derive(Clone, Debug)]
pub struct PipelineOptions {
    exclude_username: String,
    concurrency: usize,
}

impl PipelineOptions {
    pub fn new(exclude_username: impl Into<String>, concurrency: usize) -> Self {
        Self {
            exclude_username: exclude_username.into(),
            concurrency: concurrency.max(1),
        }
    }
}

/// Turns one fetched batch into a ranked standing.
#[derive(Clone)]
pub struct Pipeline {
    profiles: Arc<dyn ProfileSource>,
    prior: Arc<dyn PriorActivity>,
    sink: Option<Arc<dyn ScoredPostSink>>,
    options: PipelineOptions,
}

impl Pipeline {
    pub fn new(
        profiles: Arc<dyn ProfileSource>,
        prior: Arc<dyn PriorActivity>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            profiles,
            prior,
            sink: None,
            options,
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ScoredPostSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Resolve every author concurrently. Batch indexes come from the
    /// as-received order, not from completion order; posts whose author
    /// cannot be resolved are skipped. Returns the posts and the skip count.
    pub async fn enrich(&self, batch: Vec<SourcePost>) -> (Vec<Post>, usize) {
        let total = batch.len();
        let profiles = &self.profiles;

        let mut posts = stream::iter(batch.into_iter().enumerate())
            .map(|(batch_index, source)| async move {
                match profiles.profile(&source.author_id).await {
                    Ok(profile) => Some(Post::new(source, profile, batch_index)),
                    Err(e) => {
                        log::warn!(
                            "Resolve author {} of post {} failure, skip: {e:?}",
                            source.author_id,
                            source.id
                        );
                        None
                    }
                }
            })
            .buffer_unordered(self.options.concurrency)
            .filter_map(future::ready)
            .collect::<Vec<_>>()
            .await;

        posts.sort_by_key(Post::batch_index);
        let skipped = total - posts.len();
        (posts, skipped)
    }

    async fn persist(&self, scored: &[ScoredPost]) {
        let Some(sink) = &self.sink else {
            return;
        };
        for post in scored {
            sink.save(post)
                .await
                .inspect_err(|e| {
                    log::error!("Persist scored post {} failure: {e:?}", post.post().id())
                })
                .ok();
        }
    }

    pub async fn run(&self, batch: Vec<SourcePost>) -> Standing {
        let (posts, skipped) = self.enrich(batch).await;
        let (scored, aggregates) = aggregate(posts, self.prior.as_ref());
        self.persist(&scored).await;

        if aggregates.is_empty() {
            log::warn!("Nothing scored in this batch");
        }
        log::debug!(
            "Scored {} posts from {} authors, {skipped} skipped",
            scored.len(),
            aggregates.len()
        );
        Standing::new(
            rank(aggregates, &self.options.exclude_username),
            scored.len(),
            skipped,
        )
    }
}
