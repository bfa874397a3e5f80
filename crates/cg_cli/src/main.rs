use std::net::SocketAddr;
use std::path::PathBuf;

use cg_core::presets::{default_audience, default_length};
use cg_core::{DocumentStore, Engine, Error, GenerationOptions, Provider, Result, Settings};
use cg_inference::prompt::{style_constraint, styles, DEFAULT_STYLE};
use cg_search::ContextFetcher;
use cg_web::AppState;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

mod duration;

use duration::HumanDuration;

#[derive(Parser, Debug)]
#[command(author, version, about = "Search-grounded article generation", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Directory that receives saved markdown
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Upper bound for one publish run (e.g. 90, 2m, 1h15m30s)
        #[arg(long)]
        publish_timeout: Option<HumanDuration>,
    },
    /// Generate one article and print it
    Generate {
        #[arg(long)]
        keyword: String,
        #[arg(long, default_value = "tavily")]
        engine: String,
        #[arg(long)]
        style: Option<String>,
        #[arg(long)]
        audience: Option<String>,
        #[arg(long)]
        length: Option<String>,
        /// openai (default) or gemini
        #[arg(long)]
        provider: Option<String>,
        /// Ground the article on this file instead of a web search
        #[arg(long)]
        text_file: Option<PathBuf>,
        /// Also write the article to the output directory
        #[arg(long)]
        save: bool,
    },
    /// Run a search and print the context blocks
    Search {
        #[arg(long)]
        keyword: String,
        #[arg(long, default_value = "tavily")]
        engine: String,
    },
    /// List the writing styles and their constraints
    Styles,
}

fn report_dotenv(result: std::result::Result<PathBuf, dotenvy::Error>) {
    match result {
        Ok(path) => info!("📄 Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => {}
        Err(e) => warn!("⚠️ Failed to read .env: {}", e),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let dotenv = dotenvy::dotenv();
    cg_web::init_logging();
    report_dotenv(dotenv);
    let cli = Cli::parse();
    let mut settings = Settings::from_env();

    match cli.command {
        Commands::Serve { host, port, output_dir, publish_timeout } => {
            if let Some(host) = host {
                settings.host = host;
            }
            if let Some(port) = port {
                settings.port = port;
            }
            if let Some(dir) = output_dir {
                settings.output_dir = dir;
            }
            if let Some(timeout) = publish_timeout {
                settings.publish.timeout = timeout.0;
            }

            let addr: SocketAddr = format!("{}:{}", settings.host, settings.port)
                .parse()
                .map_err(|e| Error::InvalidInput(format!("Invalid listen address: {}", e)))?;
            cg_web::serve(AppState::from_settings(settings), addr).await?;
        }
        Commands::Generate {
            keyword,
            engine,
            style,
            audience,
            length,
            provider,
            text_file,
            save,
        } => {
            let options = GenerationOptions {
                audience: audience.unwrap_or_else(|| default_audience().to_string()),
                length: length.unwrap_or_else(|| default_length().to_string()),
                style: style.unwrap_or_else(|| DEFAULT_STYLE.to_string()),
                engine: engine.parse::<Engine>()?,
                provider: provider.as_deref().map(str::parse::<Provider>).transpose()?,
            };

            let state = AppState::from_settings(settings);
            let article = match text_file {
                Some(path) => {
                    let text = tokio::fs::read_to_string(&path).await?;
                    state.pipeline.run_with_text(&keyword, &text, &options).await?
                }
                None => state.pipeline.run(&keyword, &options).await?,
            };
            println!("{}", article.content);

            if save {
                let saved = state.store.save_markdown(&article.content).await?;
                info!("💾 Saved {} to {}", saved.filename, saved.path.display());
            }
        }
        Commands::Search { keyword, engine } => {
            let fetcher = ContextFetcher::from_settings(&settings.search);
            let context = fetcher.fetch_context(&keyword, engine.parse()?).await?;
            info!("🔍 {} sources from {}", context.sources.len(), context.engine);
            println!("{}", context.text);
        }
        Commands::Styles => {
            for style in styles() {
                println!("## {}\n{}\n", style, style_constraint(style));
            }
        }
    }

    Ok(())
}
