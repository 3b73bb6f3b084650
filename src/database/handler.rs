use log::error;

use super::{
    DBResult,
    context::Database,
    event::{DatabaseEvent, DatabaseEventReceiver, DatabaseHelper},
};

pub struct DatabaseHandle {
    handle: tokio::task::JoinHandle<DBResult<()>>,
}

impl DatabaseHandle {
    pub async fn connect(file: &str) -> anyhow::Result<(Self, DatabaseHelper)> {
        let mut database = Database::connect(file).await?;
        database.init().await?;
        let (sender, receiver) = DatabaseHelper::new(16);
        Ok((
            Self {
                handle: tokio::spawn(Self::run(database, receiver)),
            },
            sender,
        ))
    }

    async fn handle_event(database: &mut Database, event: DatabaseEvent) -> DBResult<()> {
        match event {
            DatabaseEvent::ScoredPostUpsert(post, sender) => {
                database
                    .upsert_scored_post(&post, &chrono::Utc::now().to_rfc3339())
                    .await?;
                sender.send(true).ok();
            }
            DatabaseEvent::ScoredPostCount(sender) => {
                sender.send(database.count_scored_posts().await?).ok();
            }
            DatabaseEvent::Terminate => {
                unreachable!()
            }
        }
        Ok(())
    }

    async fn run(mut database: Database, mut receiver: DatabaseEventReceiver) -> DBResult<()> {
        while let Some(event) = receiver.recv().await {
            if let DatabaseEvent::Terminate = event {
                break;
            }
            Self::handle_event(&mut database, event)
                .await
                .inspect_err(|e| error!("Sqlite error: {e:?}"))
                .ok();
        }
        database.close().await?;
        Ok(())
    }

    pub async fn wait(self) -> anyhow::Result<()> {
        Ok(self.handle.await??)
    }
}
