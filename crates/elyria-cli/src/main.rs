//! Elyria CLI: entry point.
//!
//! # Commands
//!
//! - `elyria chat`: interactive session with Nya Elyria
//! - `elyria send -m MESSAGE`: one exchange
//! - `elyria script NAME`: run a scripted session
//! - `elyria render --formula F`: run the fractal renderer once
//! - `elyria summary`: conversation summary as JSON
//! - `elyria status`: show configuration

mod helpers;
mod repl;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use elyria_agent::{
    run_script, Conversation, ExternalRenderer, RenderOutcome, RenderParams, Renderer, Script,
};
use elyria_core::config::{load_config, Config};
use elyria_core::store::ConversationStore;
use elyria_core::utils::expand_home;
use elyria_providers::{CompletionParams, HttpCompletionClient};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Elyria: a persistent fractal-exploration conversation
#[derive(Parser)]
#[command(name = "elyria", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.elyria/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Conversation history file (overrides config)
    #[arg(long, global = true)]
    history: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive session (type "quit" to exit)
    Chat,

    /// Send a single message and print the reply
    Send {
        #[arg(short, long)]
        message: String,
    },

    /// Run a scripted session: greeting, follow-ups, or deeper
    Script {
        #[arg(value_parser = parse_script)]
        name: Script,
    },

    /// Render a fractal with the external renderer
    Render {
        #[arg(long)]
        formula: String,

        /// x_min,x_max,y_min,y_max
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        bounds: Option<Vec<f64>>,

        /// width,height
        #[arg(long, value_delimiter = ',')]
        dimensions: Option<Vec<u32>>,

        #[arg(long)]
        max_iterations: Option<u32>,

        /// Image file name within the output directory
        #[arg(long)]
        output: Option<String>,
    },

    /// Print the conversation summary
    Summary,

    /// Show configuration status
    Status,
}

fn parse_script(s: &str) -> Result<Script, String> {
    s.parse()
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let config = load_config(cli.config.as_deref());
    let history = cli.history.clone();

    match cli.command {
        Commands::Chat => {
            let mut conversation = build_conversation(&config, history)?;
            let renderer = build_renderer(&config)?;
            repl::run(&mut conversation, &renderer).await
        }
        Commands::Send { message } => {
            let mut conversation = build_conversation(&config, history)?;
            let reply = conversation
                .exchange(&message)
                .await
                .context("exchange failed")?;
            helpers::print_reply(&reply);
            Ok(())
        }
        Commands::Script { name } => {
            let mut conversation = build_conversation(&config, history)?;
            info!(script = name.name(), "running scripted session");
            run_script(&mut conversation, name, |_, reply| {
                helpers::print_reply(reply);
                println!("---\n");
            })
            .await
            .context("scripted session failed")?;
            helpers::print_summary(&conversation.summary())
        }
        Commands::Render {
            formula,
            bounds,
            dimensions,
            max_iterations,
            output,
        } => {
            let params = build_render_params(formula, bounds, dimensions, max_iterations, output)?;
            let renderer = build_renderer(&config)?;
            let outcome = RenderOutcome::from(renderer.render(&params).await);
            helpers::print_render_outcome(&outcome);
            if outcome.file_name.is_none() {
                bail!("no image produced");
            }
            Ok(())
        }
        Commands::Summary => {
            let store = ConversationStore::load(history_path(&config, history))
                .context("failed to load conversation")?;
            helpers::print_summary(&store.summary())
        }
        Commands::Status => status::run(&config, cli.config.as_deref(), history),
    }
}

// ─────────────────────────────────────────────
// Builders
// ─────────────────────────────────────────────

fn history_path(config: &Config, history: Option<PathBuf>) -> PathBuf {
    history.unwrap_or_else(|| expand_home(&config.conversation.history_file))
}

/// Load the history and bind it to the configured completion endpoint.
pub fn build_conversation(config: &Config, history: Option<PathBuf>) -> Result<Conversation> {
    let path = history_path(config, history);
    let store = ConversationStore::load(&path)
        .with_context(|| format!("failed to load conversation from {}", path.display()))?;

    if !config.provider.is_configured() {
        warn!("No API key configured; set ELYRIA_PROVIDER__API_KEY or Z_AI_API_KEY");
    }
    let client = HttpCompletionClient::new(&config.provider)
        .context("failed to create completion client")?;

    Ok(Conversation::new(
        store,
        Arc::new(client),
        CompletionParams::from(&config.provider),
    ))
}

fn build_renderer(config: &Config) -> Result<ExternalRenderer> {
    ExternalRenderer::from_config(&config.renderer).context("invalid renderer configuration")
}

fn build_render_params(
    formula: String,
    bounds: Option<Vec<f64>>,
    dimensions: Option<Vec<u32>>,
    max_iterations: Option<u32>,
    output: Option<String>,
) -> Result<RenderParams> {
    let mut params = RenderParams::new(formula);
    if let Some(b) = bounds {
        let Ok(b) = <[f64; 4]>::try_from(b) else {
            bail!("--bounds takes exactly 4 values: x_min,x_max,y_min,y_max");
        };
        params.bounds = b;
    }
    if let Some(d) = dimensions {
        let Ok(d) = <[u32; 2]>::try_from(d) else {
            bail!("--dimensions takes exactly 2 values: width,height");
        };
        params.dimensions = d;
    }
    if let Some(n) = max_iterations {
        params.max_iterations = n;
    }
    params.output_filename = output;
    Ok(params)
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("elyria=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
