use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nd_core::{Result, SourceFeed};
use nd_inference::{Annotator, LazyModel, ModelConfig};
use nd_ingest::{NewsSource, Pipeline, RssSource, Scheduler};
use nd_web::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_FEEDS: &[(&str, &str)] = &[
    ("bbc", "http://feeds.bbci.co.uk/news/rss.xml"),
    ("reuters", "http://feeds.reuters.com/reuters/topNews"),
    ("techcrunch", "http://feeds.feedburner.com/TechCrunch/"),
];

#[derive(Debug, Clone)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds += num;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Scheduled news scraping and ML enrichment service", long_about = None)]
struct Cli {
    #[arg(long, default_value = "memory", help = "Storage backend: memory or sqlite")]
    storage: String,
    #[arg(long, help = "Database path for the sqlite backend")]
    db_path: Option<PathBuf>,
    #[arg(
        long,
        default_value = "heuristic",
        help = "Inference model: heuristic (default) or remote"
    )]
    model: String,
    #[arg(long, help = "Base URL of the remote model endpoint")]
    model_url: Option<String>,
    #[arg(long, env = "NEWSDESK_API_KEY", help = "API key for the remote model")]
    api_key: Option<String>,
    #[arg(
        long = "feed",
        help = "Feed to ingest as name=url (repeatable, replaces the default list)"
    )]
    feeds: Vec<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API with the background refresh scheduler
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        bind: String,
        /// Time between refresh cycles (e.g. 4h, 30m, 1h15m)
        #[arg(long, default_value = "4h")]
        interval: HumanDuration,
    },
    /// Run a single ingestion-and-enrichment cycle and exit
    Run,
    /// List the configured feeds
    Sources,
}

fn parse_feeds(specs: &[String]) -> Result<Vec<SourceFeed>> {
    if specs.is_empty() {
        return Ok(DEFAULT_FEEDS
            .iter()
            .map(|(name, url)| SourceFeed::new(*name, *url))
            .collect());
    }

    specs
        .iter()
        .map(|spec| match spec.split_once('=') {
            Some((name, url)) => Ok(SourceFeed::new(name, url)),
            None => {
                // Bare URL: name it after the host.
                let parsed = url::Url::parse(spec)
                    .map_err(|e| nd_core::Error::InvalidUrl(format!("{}: {}", spec, e)))?;
                let name = parsed
                    .host_str()
                    .ok_or_else(|| nd_core::Error::InvalidUrl(spec.clone()))?
                    .to_string();
                Ok(SourceFeed::new(name, spec.clone()))
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();

    let feeds = parse_feeds(&cli.feeds)?;

    if let Commands::Sources = cli.command {
        for feed in &feeds {
            println!("{}: {}", feed.name, feed.url);
        }
        return Ok(());
    }

    let store = nd_storage::create_store(cli.storage.as_str(), cli.db_path.as_deref()).await?;
    info!("storage initialized (using {})", cli.storage);

    let model = Arc::new(LazyModel::new(ModelConfig {
        model: cli.model.clone(),
        model_url: cli.model_url.clone(),
        api_key: cli.api_key.clone(),
    }));
    let annotator = Annotator::new(model);

    let sources: Vec<Arc<dyn NewsSource>> = feeds
        .iter()
        .map(|feed| Arc::new(RssSource::new(feed.clone())) as Arc<dyn NewsSource>)
        .collect();
    info!(
        "sources initialized: {}",
        feeds.iter().map(|f| f.name.as_str()).collect::<Vec<_>>().join(", ")
    );

    let pipeline = Arc::new(Pipeline::new(store, annotator, sources));

    match cli.command {
        Commands::Serve { bind, interval } => {
            let scheduler = Scheduler::spawn(pipeline.clone(), interval.0);

            let app = nd_web::create_app(AppState::new(pipeline));
            let listener = tokio::net::TcpListener::bind(&bind).await?;
            info!("listening on {}", bind);
            axum::serve(listener, app).await?;

            scheduler.abort();
        }
        Commands::Run => {
            let report = pipeline.run_cycle().await?;
            println!(
                "cycle complete: {} ingested, {} enriched",
                report.ingested, report.enriched
            );
        }
        Commands::Sources => unreachable!("handled before startup"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compound_durations() {
        assert_eq!(HumanDuration::from_str("4h").unwrap().0.as_secs(), 14400);
        assert_eq!(
            HumanDuration::from_str("1h15m30s").unwrap().0.as_secs(),
            4530
        );
        assert_eq!(HumanDuration::from_str("90").unwrap().0.as_secs(), 90);
        assert!(HumanDuration::from_str("h").is_err());
        assert!(HumanDuration::from_str("5x").is_err());
    }

    #[test]
    fn feed_specs_parse_names_and_bare_urls() {
        let feeds = parse_feeds(&["bbc=http://feeds.bbci.co.uk/news/rss.xml".to_string()]).unwrap();
        assert_eq!(feeds[0].name, "bbc");

        let feeds = parse_feeds(&["https://example.com/feed.xml".to_string()]).unwrap();
        assert_eq!(feeds[0].name, "example.com");

        assert!(parse_feeds(&["not a url".to_string()]).is_err());
    }

    #[test]
    fn empty_feed_list_falls_back_to_defaults() {
        let feeds = parse_feeds(&[]).unwrap();
        assert_eq!(feeds.len(), DEFAULT_FEEDS.len());
    }
}
