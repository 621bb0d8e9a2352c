//! mdresolver CLI
//!
//! Resolves posts and pages from the command line against a configured
//! content origin.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mdresolver::{Document, Resolver, error::Result, models::Config};

/// mdresolver - Markdown content resolver
#[derive(Parser, Debug)]
#[command(
    name = "mdresolver",
    version,
    about = "Resolves post and page slugs into parsed markdown documents"
)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, default_value = "mdresolver.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print documents as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the full post collection, newest first
    Posts,

    /// Resolve a single post by slug
    Post { slug: String },

    /// Resolve a single page by slug
    Page { slug: String },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn print_document(document: &Document, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(document)?);
        return Ok(());
    }

    println!("# {}", document.metadata.title);
    if let Some(date) = &document.metadata.date {
        println!("{date}");
    }
    println!();
    println!("{}", document.body.trim_end());
    Ok(())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Posts => {
            let resolver = Resolver::new(config)?;
            let posts = resolver.load_all_posts().await;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(posts.as_ref())?);
            } else {
                for post in posts.iter() {
                    println!(
                        "{}  {}  {}",
                        post.metadata.date.as_deref().unwrap_or("-"),
                        post.metadata.slug,
                        post.metadata.title
                    );
                }
            }

            if posts.is_empty() {
                log::warn!("No posts found");
            }
        }

        Command::Post { slug } => {
            let resolver = Resolver::new(config)?;
            match resolver.load_post(&slug).await {
                Some(document) => print_document(&document, cli.json)?,
                None => {
                    log::error!("Post not found: {slug}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Command::Page { slug } => {
            let resolver = Resolver::new(config)?;
            match resolver.load_page(&slug).await {
                Some(document) => print_document(&document, cli.json)?,
                None => {
                    log::error!("Page not found: {slug}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }

        Command::Validate => {
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("Configuration OK");
        }
    }

    Ok(ExitCode::SUCCESS)
}
