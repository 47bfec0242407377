//! `elyria status`: show configuration, history and renderer settings.

use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;

use elyria_agent::ExternalRenderer;
use elyria_core::config::{get_config_path, Config};
use elyria_core::utils::expand_home;

fn mark(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}

/// Run the status command.
pub fn run(config: &Config, config_path: Option<&Path>, history: Option<PathBuf>) -> Result<()> {
    let config_path = config_path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let history_path =
        history.unwrap_or_else(|| expand_home(&config.conversation.history_file));

    println!();
    println!("{}", "Elyria Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        mark(config_path.exists())
    );
    println!(
        "  {:<18} {} {}",
        "History:".bold(),
        history_path.display(),
        mark(history_path.exists())
    );

    // Provider
    let provider = &config.provider;
    println!();
    println!("  {:<18} {}", "Endpoint:".bold(), provider.api_base);
    println!("  {:<18} {}", "Model:".bold(), provider.model);
    println!(
        "  {:<18} {} | {}",
        "Parameters:".bold(),
        format!("temp: {}", provider.temperature).dimmed(),
        format!("max_tokens: {}", provider.max_tokens).dimmed(),
    );
    let key_status = if provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);

    // Renderer
    let renderer = &config.renderer;
    let working_dir = expand_home(&renderer.working_dir);
    println!();
    println!("  {:<18} {}", "Renderer:".bold(), renderer.command.join(" "));
    println!(
        "  {:<18} {} {}",
        "Working dir:".bold(),
        working_dir.display(),
        mark(working_dir.exists())
    );
    match ExternalRenderer::from_config(renderer) {
        Ok(resolved) => println!(
            "  {:<18} {}",
            "Output dir:".bold(),
            resolved.output_dir().display()
        ),
        Err(e) => println!("  {:<18} {}", "Output dir:".bold(), e.to_string().red()),
    }
    println!("  {:<18} {}s", "Timeout:".bold(), renderer.timeout_secs);

    println!();

    Ok(())
}
