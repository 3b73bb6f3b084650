use super::{DBResult, versions::prelude::*};
use crate::leaderboard::ScoredPost;
use futures_util::StreamExt as _;
use sqlx::{Connection, SqliteConnection, sqlite::SqliteConnectOptions};

#[derive(Debug)]
pub struct Database {
    conn: sqlx::SqliteConnection,
}

#[async_trait::async_trait]
pub trait DatabaseCheckExt {
    fn conn_(&mut self) -> &mut sqlx::SqliteConnection;

    async fn check_database_table(&mut self) -> sqlx::Result<bool> {
        Ok(
            sqlx::query(r#"SELECT 1 FROM sqlite_master WHERE type='table' AND "name" = 'meta'"#)
                .fetch_optional(self.conn_())
                .await?
                .is_some(),
        )
    }

    async fn check_database_version(&mut self) -> sqlx::Result<Option<String>> {
        Ok(
            sqlx::query_as::<_, (String,)>(r#"SELECT "value" FROM "meta" WHERE "key" = 'version'"#)
                .fetch_optional(self.conn_())
                .await?
                .map(|(x,)| x),
        )
    }

    async fn insert_database_version(&mut self) -> sqlx::Result<()> {
        sqlx::query(r#"INSERT INTO "meta" VALUES ('version', ?)"#)
            .bind(current::VERSION)
            .execute(self.conn_())
            .await?;
        Ok(())
    }

    async fn create_db(&mut self) -> sqlx::Result<()> {
        let mut executer = sqlx::raw_sql(current::CREATE_STATEMENT).execute_many(self.conn_());
        while let Some(ret) = executer.next().await {
            ret?;
        }
        Ok(())
    }
}

impl DatabaseCheckExt for Database {
    fn conn_(&mut self) -> &mut sqlx::SqliteConnection {
        &mut self.conn
    }
}

/// SQLite integers are signed; oversized counts saturate instead of wrapping.
fn sql_integer(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl Database {
    pub async fn connect(database: &str) -> DBResult<Self> {
        let conn = SqliteConnection::connect_with(
            &SqliteConnectOptions::new()
                .create_if_missing(true)
                .filename(database),
        )
        .await?;
        Ok(Self { conn })
    }

    pub async fn init(&mut self) -> sqlx::Result<()> {
        if !self.check_database_table().await? {
            self.create_db().await?;
            self.insert_database_version().await?;
        }
        match self.check_database_version().await? {
            Some(version) if version == current::VERSION => Ok(()),
            version => Err(sqlx::Error::Protocol(format!(
                "Unknown database version: {version:?}"
            ))),
        }
    }

    pub async fn upsert_scored_post(
        &mut self,
        scored: &ScoredPost,
        processed_at: &str,
    ) -> DBResult<()> {
        let post = scored.post();
        let metrics = post.metrics();
        let breakdown = scored.breakdown();
        sqlx::query(
            r#"INSERT OR REPLACE INTO "tweets_scored" VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(post.id())
        .bind(post.author_id())
        .bind(post.author_username())
        .bind(post.text())
        .bind(post.published_at())
        .bind(sql_integer(metrics.like_count))
        .bind(sql_integer(metrics.retweet_count))
        .bind(sql_integer(metrics.reply_count))
        .bind(sql_integer(post.author_follower_count()))
        .bind(breakdown.final_score())
        .bind(breakdown.impact_score())
        .bind(breakdown.freshness_multiplier())
        .bind(breakdown.consistency_multiplier())
        .bind(breakdown.decay_factor())
        .bind(sql_integer(post.batch_index() as u64))
        .bind(scored.is_first_of_batch())
        .bind(scored.is_second_of_batch())
        .bind(scored.active_last_week())
        .bind(processed_at)
        .execute(&mut self.conn)
        .await?;
        Ok(())
    }

    pub async fn count_scored_posts(&mut self) -> DBResult<i64> {
        sqlx::query_as::<_, (i64,)>(r#"SELECT COUNT(*) FROM "tweets_scored""#)
            .fetch_one(&mut self.conn)
            .await
            .map(|(count,)| count)
    }

    pub async fn close(self) -> DBResult<()> {
        self.conn.close().await
    }
}
