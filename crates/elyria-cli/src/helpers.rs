//! Shared CLI helpers: reply printing, banner, summary.

use anyhow::Result;
use colored::Colorize;

use elyria_agent::{RenderOutcome, Reply};
use elyria_core::store::ConversationSummary;

const PARTNER: &str = "Nya Elyria";

/// Print a reply to stdout. Diagnostics from rejected requests are highlighted.
pub fn print_reply(reply: &Reply) {
    println!();
    let label = format!("{}:", PARTNER);
    if reply.is_error() {
        println!("{} {}", label.cyan().bold(), reply.text.red());
    } else if reply.text.is_empty() {
        println!("{} {}", label.cyan().bold(), "(no response)".dimmed());
    } else {
        println!("{} {}", label.cyan().bold(), reply.text);
    }
    println!();
}

/// Print the result of a render attempt.
pub fn print_render_outcome(outcome: &RenderOutcome) {
    match &outcome.file_name {
        Some(name) => {
            println!("{}", outcome.message.green());
            println!("Fractal saved as: {}", name);
        }
        None => println!("{}", outcome.message.red()),
    }
}

pub fn print_summary(summary: &ConversationSummary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Print the banner shown at session start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Elyria".cyan().bold(), version.dimmed());
    println!("{}", "Starting interactive session. Type 'quit' to exit.".dimmed());
    println!();
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}
