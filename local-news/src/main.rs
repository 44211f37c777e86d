use anyhow::Context;
use clap::{Parser, Subcommand};
use local_news::utils::phone::mask_phone_number;
use local_news::{
    AppConfig, NewsFilters, NewsItem, NewsStore, RuleModerator, SqliteSlotStorage,
    SubmissionDraft, SubmissionOutcome, SubmissionPipeline, KNOWN_TOPICS,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "local-news", about = "Submit and browse local community news")]
struct Cli {
    /// SQLite database holding the news and bookmark slots
    #[arg(long)]
    database_url: Option<String>,

    /// Simulated moderation latency in milliseconds
    #[arg(long)]
    moderation_delay_ms: Option<u64>,

    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Send a news draft through moderation and publish it if approved
    Submit {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        topic: String,
        #[arg(long)]
        publisher: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        image: Option<String>,
    },
    /// List published news
    Feed {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        topic: Option<String>,
        /// Only show bookmarked items
        #[arg(long)]
        bookmarks: bool,
    },
    /// Toggle the bookmark on a news item
    Bookmark { id: String },
    /// Show running submission stats
    Stats {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show collection-wide analytics
    Dashboard,
    /// Force a rebuild of stats from the stored collection
    ReinitStats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database_url = url;
    }
    if let Some(delay) = cli.moderation_delay_ms {
        config.moderation_delay_ms = delay;
    }

    info!("Starting local news desk ({})", config.database_url);

    let storage = SqliteSlotStorage::new(&config.database_url)
        .await
        .with_context(|| format!("failed to open storage at {}", config.database_url))?;
    let store = NewsStore::load(Arc::new(storage))
        .await
        .context("failed to load news")?;
    let moderator = RuleModerator::default().with_delay(config.moderation_delay_ms);
    let mut pipeline = SubmissionPipeline::open(store, Box::new(moderator));

    match cli.command {
        Command::Submit {
            title,
            description,
            city,
            topic,
            publisher,
            phone,
            image,
        } => {
            if !KNOWN_TOPICS.iter().any(|known| known.eq_ignore_ascii_case(&topic)) {
                info!("Topic \"{}\" is not one of {:?}", topic, KNOWN_TOPICS);
            }

            let draft = SubmissionDraft {
                title,
                description,
                city,
                topic,
                publisher_name: publisher,
                publisher_phone: phone,
                image,
            };

            match pipeline.submit(draft).await? {
                SubmissionOutcome::Published(item) => {
                    println!("Your news has been approved and published!\n");
                    print_item(&item, false);
                }
                SubmissionOutcome::Rejected { reason, .. } => {
                    println!("News rejected: {}", reason);
                }
            }
        }
        Command::Feed {
            search,
            city,
            topic,
            bookmarks,
        } => {
            let store = pipeline.store_mut();
            store.set_filters(NewsFilters {
                city: city.unwrap_or_default(),
                topic: topic.unwrap_or_default(),
            });

            let items = if bookmarks {
                store.bookmarked_news()
            } else {
                store.filtered_news(&search)
            };

            if items.is_empty() {
                println!("No news found.");
            }
            for item in items {
                print_item(item, store.is_bookmarked(&item.id));
            }
            println!("Cities: {}", store.cities().join(", "));
            println!("Topics: {}", store.topics().join(", "));
        }
        Command::Bookmark { id } => {
            let bookmarked = pipeline.store_mut().toggle_bookmark(&id).await?;
            let state = if bookmarked { "bookmarked" } else { "removed from bookmarks" };
            println!("{} {}", id, state);
        }
        Command::Stats { limit } => {
            let summary = pipeline.stats_summary(limit.unwrap_or(config.top_limit));
            println!("Total posts: {}", summary.total_posts);
            for (title, rows) in [
                ("Top topics", &summary.top_topics),
                ("Top cities", &summary.top_cities),
                ("Top publishers", &summary.top_publishers),
            ] {
                println!("\n{}:", title);
                for (label, count) in rows {
                    println!("  {}: {}", label, count);
                }
            }
        }
        Command::Dashboard => {
            let analytics = pipeline.analytics();
            println!("{}", serde_json::to_string_pretty(&analytics)?);
        }
        Command::ReinitStats => {
            // Forced replay; opening the pipeline already rebuilt once
            pipeline.reinitialize_stats();
            println!(
                "Stats rebuilt from {} stored items",
                pipeline.stats().total_posts()
            );
        }
    }

    Ok(())
}

fn print_item(item: &NewsItem, bookmarked: bool) {
    let marker = if bookmarked { "*" } else { " " };
    println!("{} [{}] {}", marker, item.id, item.edited_title);
    println!("    {}", item.edited_summary);
    println!(
        "    {} | {} | By {} ({}) | {}\n",
        item.city,
        item.topic,
        item.publisher_first_name,
        mask_phone_number(&item.publisher_phone),
        item.timestamp.format("%Y-%m-%d %H:%M")
    );
}
