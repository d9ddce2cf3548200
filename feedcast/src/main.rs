//! feedcast - Announce new RSS/Atom feed entries on Mastodon

use std::path::PathBuf;

use clap::Parser;
use libfeedcast::config::{FileConfig, Overrides, RunConfig, Settings};
use libfeedcast::credentials::{resolve_optional, SecretSource, SecretType};
use libfeedcast::feed::HttpFeed;
use libfeedcast::formatter::{Formatter, Sanitizer};
use libfeedcast::logging::{LogFormat, LogLevel, LoggingConfig};
use libfeedcast::platforms::mastodon::MastodonClient;
use libfeedcast::runner::{send_test_post, Runner};
use libfeedcast::{Result, RunOutcome};
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "feedcast")]
#[command(version)]
#[command(about = "Announce new RSS/Atom feed entries on Mastodon")]
#[command(long_about = "\
feedcast - Announce new RSS/Atom feed entries on Mastodon

DESCRIPTION:
    feedcast reads a feed, keeps the entries published within the last
    --days days, skips the ones the account already linked to, and posts a
    short summary of each remaining entry. It is meant to be run from a
    timer; every run starts from scratch.

    Dry-run is the default. Pass --no-dry-run to actually post.

USAGE:
    # See what would be posted
    feedcast --url https://sakerhetspodcasten.se/index.xml \\
        --access-token MASTODON_TOKEN --secret-type env

    # Post at most two entries from the last three days
    feedcast --url https://sakerhetspodcasten.se/index.xml \\
        --access-token ~/.config/feedcast/token --secret-type file \\
        --days 3 --posts 2 --no-dry-run

CONFIGURATION:
    Optional file: ~/.config/feedcast/config.toml (or --config / FEEDCAST_CONFIG)

    api_base_url = \"https://mastodon.social\"
    days = 1
    posts = 1

    [[sanitize]]
    pattern = \"Listen to the episode: \"
    replacement = \"\"

EXIT CODES:
    0 - Run finished (including nothing to post)
    1 - Feed or platform error
    2 - Configuration or usage error
")]
struct Cli {
    /// URL of the RSS/Atom feed
    #[arg(long, value_name = "URL")]
    url: String,

    /// Access token, or the path / environment variable holding it ("-" for none)
    #[arg(long, value_name = "TOKEN|PATH|VAR", allow_hyphen_values = true)]
    access_token: String,

    /// How to read --access-token: arg, env or file
    #[arg(long, value_name = "TYPE")]
    secret_type: SecretType,

    /// Mastodon instance base URL [default: https://mastodon.social]
    #[arg(long, value_name = "URL", env = "FEEDCAST_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Only log what would be posted (default)
    #[arg(long, overrides_with = "no_dry_run")]
    dry_run: bool,

    /// Actually post
    #[arg(long, overrides_with = "dry_run")]
    no_dry_run: bool,

    /// Log level: DEBUG, INFO, WARNING, ERROR or CRITICAL
    #[arg(long, value_name = "LEVEL", default_value = "INFO")]
    loglevel: LogLevel,

    /// Log output format: text, json or pretty
    #[arg(long, value_name = "FORMAT", default_value = "text", env = "FEEDCAST_LOG_FORMAT")]
    log_format: LogFormat,

    /// Maximum days back in feed history to announce [default: 1]
    #[arg(long, value_name = "DAYS")]
    days: Option<u32>,

    /// Maximum posts to emit in one run [default: 1]
    #[arg(long, value_name = "COUNT")]
    posts: Option<usize>,

    /// Post this text and exit, e.g. "hello world testing API"
    #[arg(long, value_name = "TEXT")]
    test_toot: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH", env = "FEEDCAST_CONFIG")]
    config: Option<PathBuf>,

    /// Extra pattern (regex) to remove from descriptions; repeatable
    #[arg(long = "strip", value_name = "PATTERN")]
    strip: Vec<String>,

    /// Print the run outcome to stdout: text or json
    #[arg(long, value_name = "FORMAT", value_parser = ["text", "json"])]
    output: Option<String>,
}

impl Cli {
    fn dry_run(&self) -> bool {
        !self.no_dry_run
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    LoggingConfig::new(cli.log_format, cli.loglevel).init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> Result<()> {
    let secret = SecretSource::from_argument(&cli.access_token, cli.secret_type);
    let file = FileConfig::load(cli.config.as_deref())?;

    let settings = Settings::new(cli.url.clone(), secret)
        .with_dry_run(cli.dry_run())
        .with_file(&file)
        .with_overrides(Overrides {
            api_base_url: cli.api_base_url.clone(),
            days: cli.days,
            posts: cli.posts,
            strip: cli.strip.clone(),
        });
    debug!("Settings: {:?}", settings);

    let formatter = Formatter::new(Sanitizer::with_rules(&settings.sanitize)?);
    let config = RunConfig::new(&settings, chrono::Utc::now());
    let token = resolve_optional(config.secret())?;
    let client = MastodonClient::new(settings.normalized_api_base_url(), token)?;
    debug!("Mastodon instance: {}", client.instance_url());

    if let Some(text) = &cli.test_toot {
        send_test_post(&client, text).await?;
        return Ok(());
    }

    info!(
        "Announcing entries newer than {} (dry-run: {})",
        config.threshold(),
        config.dry_run()
    );

    let feed = HttpFeed::new()?;
    let mut runner = Runner::new(config, formatter);
    let outcome = runner.run(&feed, &client).await?;

    print_outcome(&outcome, cli.output.as_deref());
    Ok(())
}

fn print_outcome(outcome: &RunOutcome, output: Option<&str>) {
    match output {
        Some("json") => match serde_json::to_string(outcome) {
            Ok(json) => println!("{}", json),
            Err(e) => tracing::error!("Failed to serialize outcome: {}", e),
        },
        Some(_) => println!("{}", outcome),
        None => {}
    }
}
