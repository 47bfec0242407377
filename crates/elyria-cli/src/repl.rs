//! Interactive session.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Mentioning a fractal (see [`intent::wants_fractal`]) offers a render
//! whose result is reported back into the conversation.

use anyhow::{Context, Result};
use rustyline::config::Configurer;
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use elyria_agent::intent;
use elyria_agent::script::{render_followup, GREETING};
use elyria_agent::{Conversation, RenderOutcome, RenderParams, Renderer};

use crate::helpers;

/// Where the session reads its lines from.
pub trait LineSource {
    /// Next line, or `None` once input is interrupted or exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Record a line the user sent.
    fn remember(&mut self, _line: &str) {}
}

impl LineSource for Editor<(), DefaultHistory> {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                println!("\nInput interrupted.");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn remember(&mut self, line: &str) {
        let _ = self.add_history_entry(line);
    }
}

/// Run the interactive loop on the terminal until `quit`, Ctrl-C or Ctrl-D.
pub async fn run(conversation: &mut Conversation, renderer: &dyn Renderer) -> Result<()> {
    helpers::print_banner();

    let mut editor = create_editor()?;
    let result = session(&mut editor, conversation, renderer).await;
    save_history(&mut editor);
    result
}

/// Drive one session over `lines`.
pub async fn session(
    lines: &mut dyn LineSource,
    conversation: &mut Conversation,
    renderer: &dyn Renderer,
) -> Result<()> {
    if conversation.store().is_empty() {
        send(conversation, GREETING).await?;
    }

    while let Some(input) = lines.read_line("You: ")? {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            continue;
        }

        if intent::is_quit(trimmed) {
            break;
        }

        lines.remember(&input);
        send(conversation, trimmed).await?;

        if intent::wants_fractal(trimmed) {
            offer_render(lines, conversation, renderer).await?;
        }
    }

    println!("Ending conversation...");
    Ok(())
}

async fn send(conversation: &mut Conversation, text: &str) -> Result<()> {
    debug!(chars = text.len(), "sending message");
    helpers::print_thinking();
    let result = conversation.exchange(text).await;
    helpers::clear_thinking();

    let reply = result.context("exchange failed")?;
    helpers::print_reply(&reply);
    Ok(())
}

/// Ask whether to render, ask for a formula, render, and tell the model.
///
/// EOF on either prompt returns to the main loop.
async fn offer_render(
    lines: &mut dyn LineSource,
    conversation: &mut Conversation,
    renderer: &dyn Renderer,
) -> Result<()> {
    println!("Would you like me to generate a fractal based on our discussion? (yes/no)");
    let Some(answer) = lines.read_line("> ")? else {
        return Ok(());
    };
    if !intent::is_affirmative(&answer) {
        return Ok(());
    }

    println!("Enter a formula to generate (e.g., 'z^2 + c', 'z^(2.7+0.3i) + c', etc.):");
    let Some(formula) = lines.read_line("> ")? else {
        return Ok(());
    };
    let formula = formula.trim();
    if formula.is_empty() {
        return Ok(());
    }

    println!("Generating fractal...");
    let outcome = RenderOutcome::from(renderer.render(&RenderParams::new(formula)).await);
    helpers::print_render_outcome(&outcome);

    if let Some(file_name) = outcome.file_name {
        send(conversation, &render_followup(formula, &file_name)).await?;
    }
    Ok(())
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the line-editor history file.
fn history_path() -> std::path::PathBuf {
    elyria_core::utils::get_data_path()
        .join("history")
        .join("repl_history")
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
