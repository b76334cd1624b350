//! Allsect site functions CLI
//!
//! Local execution entry point. For AWS Lambda, use `allsect-lambda`.

use std::path::PathBuf;

use allsect_functions::{
    config::load_config,
    error::{AppError, Result},
    models::{CmsDocument, Config, PostCommentData, PubSubMessage, PushEnvelope},
    pipeline::{self, DocumentIndexer, WebhookOutcome, WebhookPayload},
    services::{AlgoliaClient, ContentApiClient, HttpPublisher, NewsApiClient, SendGridClient},
    storage::{DocumentStore, LocalStore},
    utils::http,
};
use chrono::Utc;
use clap::{Parser, Subcommand};

/// Allsect - site backend functions
#[derive(Parser, Debug)]
#[command(
    name = "allsect",
    version,
    about = "Backend handlers of the Allsect site"
)]
struct Cli {
    /// Path to storage directory holding config.toml, documents and backups
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the search record of a CMS document stored as JSON
    Index {
        /// Document as returned by the content API
        file: PathBuf,
    },

    /// Index the latest document at a content ref
    Webhook {
        /// Master ref announced by the CMS
        #[arg(long = "ref")]
        master_ref: String,

        /// Secret to send (default: the configured one)
        #[arg(long)]
        secret: Option<String>,
    },

    /// Search, store and announce the latest news
    News,

    /// Email a news digest
    Email {
        /// JSON file holding a push envelope or a bare message
        file: PathBuf,
    },

    /// Store a comment
    Comment {
        #[arg(long)]
        username: String,

        #[arg(long)]
        text: String,

        /// `blogPost` or `recipe`
        #[arg(long)]
        post_type: String,

        #[arg(long)]
        post_id: String,
    },

    /// Export all collections to the backups directory
    Backup,

    /// Validate configuration
    Validate,

    /// Print the effective configuration (secrets masked)
    Config,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Replace non-empty secrets for display.
fn masked(mut config: Config) -> Config {
    for secret in [
        &mut config.content.access_token,
        &mut config.content.webhook_secret,
        &mut config.search.api_key,
        &mut config.news.api_key,
        &mut config.email.api_key,
        &mut config.pubsub.token,
    ] {
        if !secret.is_empty() {
            *secret = "********".to_string();
        }
    }
    config
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.storage_dir.join("config.toml");
    let config = load_config(&config_path)?;
    log::debug!("Loaded configuration from {}", config_path.display());

    let db = DocumentStore::new(
        LocalStore::new(&cli.storage_dir),
        config.storage.prefix.as_str(),
    );

    match cli.command {
        Command::Index { file } => {
            let doc: CmsDocument = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            let indexer = DocumentIndexer::new(config.content.webhook_secret.clone());
            let record = indexer.index_document(doc)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }

        Command::Webhook { master_ref, secret } => {
            let client = http::create_async_client(&config.http)?;
            let indexer = DocumentIndexer::from_config(&config.content)?;
            let content = ContentApiClient::new(client.clone(), &config.content);
            let search = AlgoliaClient::new(client, &config.search)?;
            let payload = WebhookPayload {
                master_ref: Some(master_ref),
                secret: secret.unwrap_or_else(|| config.content.webhook_secret.clone()),
            };

            let outcome =
                pipeline::handle_webhook(&indexer, &content, &search, &config.search, payload)
                    .await?;
            match outcome {
                WebhookOutcome::Rejected => {
                    return Err(AppError::validation("webhook secret rejected"));
                }
                WebhookOutcome::Indexed {
                    object_id,
                    index,
                    title,
                } => log::info!("Indexed '{}' ({}) into {}", title, object_id, index),
            }
        }

        Command::News => {
            let client = http::create_async_client(&config.http)?;
            let source = NewsApiClient::new(client.clone(), &config.news)?;
            let publisher = HttpPublisher::new(client, &config.pubsub)?;

            let summary =
                pipeline::run_latest_news(&config.news, &source, &db, &publisher, "cli", Utc::now())
                    .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Email { file } => {
            let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;
            let envelope = if value.get("message").is_some() {
                serde_json::from_value(value)?
            } else {
                PushEnvelope {
                    message: serde_json::from_value::<PubSubMessage>(value)?,
                    subscription: None,
                }
            };

            let client = http::create_async_client(&config.http)?;
            let mailer = SendGridClient::new(client, &config.email)?;
            let mail = pipeline::send_latest_news_email(&config.email, &mailer, &envelope).await?;
            log::info!("Mail sent to {}", mail.to);
        }

        Command::Comment {
            username,
            text,
            post_type,
            post_id,
        } => {
            let data = PostCommentData {
                username,
                text,
                post_type,
                post_id,
            };
            let collection = &config.storage.comments_collection;
            let id = pipeline::post_comment(&db, collection, data, Utc::now()).await?;
            println!("{id}");
        }

        Command::Backup => {
            let sink = LocalStore::new(&cli.storage_dir);
            let summary = pipeline::backup_database(&db, &sink, &config.backup, Utc::now()).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Validate => {
            log::info!("Validating configuration...");
            config.validate()?;
            log::info!("✓ Config OK");
        }

        Command::Config => {
            println!("{}", toml::to_string_pretty(&masked(config))?);
        }
    }

    Ok(())
}
