use anyhow::anyhow;

use crate::leaderboard::{ScoredPost, ScoredPostSink};

kstool_helper_generator::oneshot_helper! {
#[derive(Debug)]
pub enum DatabaseEvent {
    #[ret(bool)]
    ScoredPostUpsert(ScoredPost),

    #[ret(i64)]
    ScoredPostCount,

    Terminate,
}
}

#[async_trait::async_trait]
impl ScoredPostSink for DatabaseHelper {
    async fn save(&self, post: &ScoredPost) -> anyhow::Result<()> {
        self.scored_post_upsert(post.clone())
            .await
            .ok_or_else(|| anyhow!("Database not response, post {}", post.post().id()))?;
        log::trace!(
            "Post {} saved with score {} (base {})",
            post.post().id(),
            post.breakdown().final_score(),
            post.breakdown().base_score()
        );
        Ok(())
    }
}
