//! CLI entry point for headless-blog

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use headless_blog::content::Selection;
use headless_blog::Blog;

#[derive(Parser)]
#[command(name = "headless-blog")]
#[command(version)]
#[command(about = "A server-rendered blog front-end for headless CMS content", long_about = None)]
struct Cli {
    /// Path to the site config (defaults to ./_config.yml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Base URL of the content API
    #[arg(long, global = true, env = "STRAPI_URL")]
    api_url: Option<String>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the presentation server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List content from the API
    List {
        /// Type of content to list (posts, categories, authors)
        #[arg(default_value = "posts")]
        r#type: String,

        /// Only posts in this category id
        #[arg(long)]
        category: Option<u64>,

        /// Only posts by this author id
        #[arg(long)]
        author: Option<u64>,
    },

    /// Print a single post
    Show {
        /// Slug of the post
        slug: String,

        /// Print the rendered HTML body instead of plain text
        #[arg(long)]
        html: bool,
    },

    /// Write the site as static files
    #[command(alias = "g")]
    Generate {
        /// Output directory (defaults to `public_dir` from the config)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "headless_blog=debug,tower_http=debug,info"
    } else {
        "headless_blog=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Commands::Version = cli.command {
        println!("headless-blog version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let base_dir = std::env::current_dir()?;
    let blog = Blog::load(&base_dir, cli.config.as_deref(), cli.api_url)?;

    match cli.command {
        Commands::Serve { port, ip } => {
            tracing::info!("Starting server at http://{}:{}", ip, port);
            headless_blog::server::start(&blog, &ip, port).await?;
        }

        Commands::List {
            r#type,
            category,
            author,
        } => {
            headless_blog::commands::list::run(
                &blog,
                &r#type,
                Selection::from(category),
                Selection::from(author),
            )
            .await?;
        }

        Commands::Show { slug, html } => {
            headless_blog::commands::show::run(&blog, &slug, html).await?;
        }

        Commands::Generate { output } => {
            let public_dir = output.unwrap_or_else(|| base_dir.join(&blog.config.public_dir));
            tracing::info!("Generating static files...");
            let written = blog.generate(&public_dir).await?;
            println!("Generated {} posts in {:?}", written, public_dir);
        }

        Commands::Version => {}
    }

    Ok(())
}
