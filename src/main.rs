use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use gatepost::config::Config;
use gatepost::db::sqlite::SqliteDatabase;
use gatepost::db::Database;
use gatepost::moderation::ModerationPipeline;

/// Gatepost: content posting with automatic moderation.
///
/// Every submitted post runs through the moderation pipeline before it is
/// stored; flagged content is rejected with a structured verdict.
#[derive(Parser)]
#[command(name = "gatepost", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Run the HTTP API server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (overrides GATEPOST_BIND)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Moderate a single text and print the verdict
    Moderate {
        /// The text to evaluate
        text: String,
    },

    /// Download the ONNX toxicity model (~126 MB)
    DownloadModel,

    /// Show daily moderation statistics
    Stats {
        /// Window size in days (default: 7)
        #[arg(long, default_value = "7")]
        days: u32,
    },

    /// Show system status (DB counts, classifier backend, model presence)
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gatepost=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init => {
            info!("Initializing Gatepost database...");
            let config = Config::load()?;
            let db = open_database(&config)?;
            let table_count = db.table_count().await?;
            println!("Database initialized at: {}", config.db_path);
            println!("Tables created: {table_count}");
            println!("\nGatepost is ready. Next step: run `gatepost serve`");
            println!("  (see .env.example for optional configuration)");
        }

        Commands::Serve { port, bind } => {
            let config = Config::load()?;
            // Warn up front if the configured backend can't work; the
            // pipeline still serves fallback verdicts either way.
            if let Err(e) = config.require_classifier() {
                eprintln!("{} {e}", "warning:".yellow());
                eprintln!("{}", "Serving with the keyword fallback only.".yellow());
            }

            let db = open_database(&config)?;
            let pipeline = Arc::new(ModerationPipeline::from_config(&config));

            let bind = bind.unwrap_or_else(|| config.bind.clone());
            let port = port.unwrap_or(config.port);
            gatepost::web::run_server(db, pipeline, &bind, port).await?;
        }

        Commands::Moderate { text } => {
            let config = Config::load()?;
            let pipeline = ModerationPipeline::from_config(&config);
            let verdict = pipeline.evaluate(&text).await;

            if verdict.flagged {
                println!("{}", "FLAGGED".red().bold());
            } else {
                println!("{}", "APPROVED".green().bold());
            }
            println!("  severity:   {}", verdict.severity);
            println!("  confidence: {:.3}", verdict.confidence);
            if let Some(reason) = &verdict.reason {
                println!("  reason:     {reason}");
            }
            println!("  scores:");
            for (category, score) in &verdict.category_scores {
                let line = format!("    {category}: {score:.3}");
                if verdict.categories.get(category).copied().unwrap_or(false) {
                    println!("{}", line.red());
                } else {
                    println!("{}", line.dimmed());
                }
            }
        }

        Commands::DownloadModel => {
            let config = Config::load()?;
            println!(
                "Downloading model files to {}",
                config.model_dir.display()
            );
            gatepost::moderation::download::download_model(&config.model_dir).await?;
            println!("\n{}", "Model ready.".green());
        }

        Commands::Stats { days } => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let stats = db.moderation_stats(days).await?;

            if stats.is_empty() {
                println!("No posts in the last {days} days.");
            } else {
                println!("Moderation activity, last {days} days:\n");
                for day in stats {
                    println!(
                        "  {}  posts: {:>4}  flagged: {:>4}  avg confidence: {:.2}",
                        day.date.bold(),
                        day.total_posts,
                        day.flagged_posts,
                        day.average_confidence
                    );
                    for (category, count) in &day.categories {
                        println!("      {category}: {count}");
                    }
                }
            }
        }

        Commands::Status => {
            let config = Config::load()?;
            let db = open_database(&config)?;
            let (total, flagged) = db.post_counts().await?;

            println!("Database:   {}", config.db_path);
            println!("Posts:      {total} total, {flagged} flagged");
            println!("Classifier: {}", config.classifier_backend.as_str());
            match config.require_classifier() {
                Ok(()) => println!("Backend:    {}", "ready".green()),
                Err(_) => println!(
                    "Backend:    {} (keyword fallback only)",
                    "not configured".yellow()
                ),
            }
        }
    }

    Ok(())
}

fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    let conn = gatepost::db::initialize(&config.db_path)?;
    Ok(Arc::new(SqliteDatabase::new(conn)))
}
