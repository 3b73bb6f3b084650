mod bot;
mod config;
mod database;
mod functions;
mod leaderboard;
mod twitter;

use std::sync::{Arc, OnceLock};

use bot::{PublishTarget, Publisher, bot, send_text};
use clap::{ArgMatches, arg};
use config::Config;
use database::{DatabaseHandle, DatabaseHelper};
use functions::build_reqwest_client;
use itertools::Itertools as _;
use leaderboard::{Pipeline, PipelineOptions, PostSource as _};
use teloxide::types::ChatId;
use twitter::TwitterClient;

static PUBLISH_PERIOD: OnceLock<u64> = OnceLock::new();
const DEFAULT_PUBLISH_PERIOD: u64 = 3600;

/// Everything one leaderboard request needs, plus the database actor when
/// persistence is enabled.
struct Context {
    client: Arc<TwitterClient>,
    pipeline: Pipeline,
    database: Option<(DatabaseHandle, DatabaseHelper)>,
}

impl Context {
    async fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Arc::new(TwitterClient::new(
            build_reqwest_client()?,
            config.twitter(),
        ));
        let pipeline = Pipeline::new(
            client.clone(),
            config.leaderboard().prior_activity(),
            PipelineOptions::new(
                config.leaderboard().exclude_username(),
                config.twitter().concurrency(),
            ),
        );

        let (pipeline, database) = if config.database().persist() {
            let (handle, helper) = DatabaseHandle::connect(config.database().file()).await?;
            (
                pipeline.with_sink(Arc::new(helper.clone())),
                Some((handle, helper)),
            )
        } else {
            (pipeline, None)
        };

        Ok(Self {
            client,
            pipeline,
            database,
        })
    }

    async fn close(self) -> anyhow::Result<()> {
        if let Some((handle, helper)) = self.database {
            if let Some(count) = helper.scored_post_count().await {
                log::info!("Database holds {count} scored posts");
            }
            helper.terminate().await;
            handle.wait().await?;
        }
        Ok(())
    }
}

async fn async_main(config_file: &str) -> anyhow::Result<()> {
    let config = Config::read(config_file).await?;
    let context = Context::new(&config).await?;
    let target = PublishTarget::new(bot(&config)?, config.chats(), config.leaderboard().timezone()?);

    if config.chats().is_empty() {
        log::warn!("No chat configured, leaderboard will be computed but not delivered");
    }

    let (publisher, publisher_helper) = Publisher::create(
        context.pipeline.clone(),
        context.client.clone(),
        target,
        PUBLISH_PERIOD
            .get()
            .copied()
            .unwrap_or(DEFAULT_PUBLISH_PERIOD),
    );

    tokio::signal::ctrl_c().await?;
    log::info!("Shutting down");

    publisher_helper.exit().await;
    publisher.join().await?;
    context.close().await?;

    Ok(())
}

async fn run_once(config_file: &str, send: bool) -> anyhow::Result<()> {
    let config = Config::read(config_file).await?;
    let context = Context::new(&config).await?;

    let batch = context.client.fetch().await?;
    log::info!("Fetched {} posts", batch.len());
    let standing = context.pipeline.run(batch).await;
    println!("{standing}");

    if send {
        let target = PublishTarget::new(bot(&config)?, config.chats(), config.leaderboard().timezone()?);
        target.deliver(&standing).await;
    }

    context.close().await
}

async fn list_tweets(config_file: &str, chat: Option<i64>) -> anyhow::Result<()> {
    let config = Config::read(config_file).await?;
    let context = Context::new(&config).await?;

    let batch = context.client.fetch().await?;
    if batch.is_empty() {
        println!("No tweets found");
        return context.close().await;
    }

    let (posts, skipped) = context.pipeline.enrich(batch).await;
    let digest = posts.iter().map(ToString::to_string).join("\n---\n");
    println!("{digest}\n\n{} tweets, {skipped} skipped", posts.len());

    if let Some(chat) = chat {
        send_text(&bot(&config)?, ChatId(chat), &bot::replace_all(&digest)).await?;
    }

    context.close().await
}

fn enable_log(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    if verbose < 3 {
        builder
            .filter_module("tracing", log::LevelFilter::Warn)
            .filter_module("hyper", log::LevelFilter::Warn)
            .filter_module("reqwest", log::LevelFilter::Warn);
    }

    if verbose < 2 {
        builder.filter_module("teloxide", log::LevelFilter::Info);
    }
    if verbose < 1 {
        builder.filter_module("sqlx", log::LevelFilter::Warn);
    }
    builder.init();
}

async fn async_router(matches: ArgMatches) -> anyhow::Result<()> {
    let config = matches
        .get_one::<String>("CONFIG")
        .map(String::as_str)
        .unwrap_or("config.toml");
    match matches.subcommand() {
        Some(("once", matches)) => run_once(config, matches.get_flag("send")).await,
        Some(("tweets", matches)) => {
            list_tweets(config, matches.get_one::<i64>("chat").copied()).await
        }
        _ => async_main(config).await,
    }
}

fn main() -> anyhow::Result<()> {
    let matches = clap::command!()
        .args(&[
            arg!([CONFIG] "Configure file to read").default_value("config.toml"),
            arg!(--period <second> "Override leaderboard publish period")
                .default_value("3600")
                .value_parser(clap::value_parser!(u64)),
            arg!(-v --verbose ... "More verbose log output"),
        ])
        .subcommand(
            clap::Command::new("once")
                .about("Compute the leaderboard once and print it")
                .args(&[arg!(--send "Also deliver to configured chats")]),
        )
        .subcommand(
            clap::Command::new("tweets")
                .about("Print the fetched tweets with their authors")
                .args(&[arg!(--chat <id> "Also send the digest to this chat")
                    .value_parser(clap::value_parser!(i64))]),
        )
        .get_matches();

    enable_log(matches.get_count("verbose"));

    PUBLISH_PERIOD
        .set(
            matches
                .get_one::<u64>("period")
                .copied()
                .unwrap_or(DEFAULT_PUBLISH_PERIOD),
        )
        .ok();

    log::info!(
        "Version: {}, publish period: {}s",
        env!("CARGO_PKG_VERSION"),
        PUBLISH_PERIOD.get().copied().unwrap_or(DEFAULT_PUBLISH_PERIOD)
    );
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_router(matches))
}
