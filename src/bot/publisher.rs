use std::{sync::Arc, time::Duration};

use chrono_tz::Tz;
use kstool_helper_generator::Helper;
use teloxide::types::ChatId;
use tokio::{task::JoinHandle, time::interval};

use super::{BotType, replace_all, send_text};
use crate::{
    functions::timestamp_to_string,
    leaderboard::{Pipeline, PostSource, Standing},
};

#[derive(Clone, Debug, Helper)]
pub enum PublisherEvent {
    Exit,
}

/// Where a rendered leaderboard goes.
#[derive(Clone)]
pub struct PublishTarget {
    bot: BotType,
    chats: Vec<ChatId>,
    timezone: Tz,
}

impl PublishTarget {
    pub fn new(bot: BotType, chats: &[i64], timezone: Tz) -> Self {
        Self {
            bot,
            chats: chats.iter().map(|chat| ChatId(*chat)).collect(),
            timezone,
        }
    }

    pub fn render(&self, standing: &Standing) -> String {
        standing.markdown(
            replace_all,
            &timestamp_to_string(kstool::time::get_current_second() as i64, self.timezone),
        )
    }

    pub async fn deliver(&self, standing: &Standing) {
        let text = self.render(standing);
        for chat in &self.chats {
            send_text(&self.bot, *chat, &text)
                .await
                .inspect_err(|e| log::error!("Send leaderboard to {} failure: {e:?}", chat.0))
                .ok();
        }
    }
}

pub struct Publisher {
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Publisher {
    pub fn create(
        pipeline: Pipeline,
        source: Arc<dyn PostSource>,
        target: PublishTarget,
        period: u64,
    ) -> (Self, PublisherHelper) {
        let (s, r) = PublisherHelper::new(4);
        (
            Self {
                handle: tokio::spawn(Self::run(pipeline, source, target, period, r)),
            },
            s,
        )
    }

    pub async fn publish(
        pipeline: &Pipeline,
        source: &dyn PostSource,
        target: &PublishTarget,
    ) -> anyhow::Result<Standing> {
        let batch = source.fetch().await?;
        log::info!("Fetched {} posts", batch.len());
        let standing = pipeline.run(batch).await;
        target.deliver(&standing).await;
        Ok(standing)
    }

    async fn run(
        pipeline: Pipeline,
        source: Arc<dyn PostSource>,
        target: PublishTarget,
        period: u64,
        mut helper: PublisherEventReceiver,
    ) -> anyhow::Result<()> {
        let mut publish_timer = interval(Duration::from_secs(period.max(1)));
        let mut clear_timer = interval(Duration::from_secs(43200));
        clear_timer.reset();

        let mut works = Vec::new();

        loop {
            tokio::select! {
                Some(event) = helper.recv() => {
                    match event {
                        PublisherEvent::Exit => break,
                    }
                }

                _ = publish_timer.tick() => {
                    let pipeline = pipeline.clone();
                    let source = source.clone();
                    let target = target.clone();
                    works.push(tokio::spawn(async move {
                        Self::publish(&pipeline, source.as_ref(), &target).await
                            .inspect(|standing| log::info!(
                                "Leaderboard published: {} entries, {} scored, {} skipped",
                                standing.entries().len(),
                                standing.scored(),
                                standing.skipped()
                            ))
                            .inspect_err(|e| log::error!("Publish leaderboard error: {e:?}"))
                            .ok();
                    }));
                }

                _ = clear_timer.tick() => {
                    let before = works.len();
                    let alt = std::mem::take(&mut works);
                    works.extend(alt.into_iter().filter(|s| !s.is_finished()));
                    log::trace!("[GC] Clear {} of {} works", before - works.len(), before);
                }
            }
        }

        match tokio::time::timeout(Duration::from_secs(5), async {
            for handle in works {
                handle.await?;
            }
            Ok::<_, tokio::task::JoinError>(())
        })
        .await
        {
            Ok(ret) => ret?,
            Err(_) => {
                log::error!("Wait publisher timeout");
            }
        }

        Ok(())
    }

    pub async fn join(self) -> anyhow::Result<()> {
        self.handle.await?
    }
}
