//! Fractal rendering through an external executable (`ftk-mandel`).
//!
//! The renderer is spawned directly with one argv element per flag; no
//! shell is involved, so formulas are passed through untouched.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{info, warn};

use elyria_core::config::RendererConfig;
use elyria_core::utils;

// ─────────────────────────────────────────────
// Parameters
// ─────────────────────────────────────────────

/// One color stop of the renderer palette.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteStop {
    /// Hex color, e.g. `#00FF00`.
    pub color: String,
    /// Position in `[0, 1]`.
    pub position: f64,
}

impl PaletteStop {
    pub fn new(color: impl Into<String>, position: f64) -> Self {
        Self {
            color: color.into(),
            position,
        }
    }
}

/// What to render.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderParams {
    pub formula: String,
    /// `[x_min, x_max, y_min, y_max]`
    pub bounds: [f64; 4],
    /// `[width, height]` in pixels.
    pub dimensions: [u32; 2],
    pub max_iterations: u32,
    /// Defaults to `fractal_<local time>.png`.
    pub output_filename: Option<String>,
    pub spawn: [f64; 2],
    pub palette: Vec<PaletteStop>,
    pub bailout: f64,
}

impl RenderParams {
    /// Parameters for `formula` with the preview defaults (16×16, 32 iterations).
    pub fn new(formula: impl Into<String>) -> Self {
        Self {
            formula: formula.into(),
            bounds: [-2.0, 2.0, -2.0, 2.0],
            dimensions: [16, 16],
            max_iterations: 32,
            output_filename: None,
            spawn: [0.0, 0.0],
            palette: vec![
                PaletteStop::new("#000000", 0.0),
                PaletteStop::new("#00FF00", 0.5),
                PaletteStop::new("#FFFFFF", 1.0),
            ],
            bailout: 16.0,
        }
    }

    /// Palette in the renderer's `[(#RRGGBB,pos),...]` notation.
    fn palette_arg(&self) -> String {
        let stops: Vec<String> = self
            .palette
            .iter()
            .map(|s| format!("({},{:?})", s.color, s.position))
            .collect();
        format!("[{}]", stops.join(","))
    }

    /// Renderer flags, one argv element each.
    fn to_args(&self, output: &std::path::Path) -> Vec<String> {
        vec![
            format!("--bounds={}", join(&self.bounds)),
            format!("--dimensions={}", join(&self.dimensions)),
            format!("--max-iterations={}", self.max_iterations),
            format!("--formula={}", self.formula),
            format!("--output={}", output.display()),
            format!("--spawn={}", join(&self.spawn)),
            // Flag spelling is the renderer's.
            format!("--color-pallette={}", self.palette_arg()),
            format!("--bailout={}", self.bailout),
        ]
    }
}

fn join<T: std::fmt::Display>(values: &[T]) -> String {
    values
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

// ─────────────────────────────────────────────
// Results
// ─────────────────────────────────────────────

/// An image the renderer reported as written.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedImage {
    pub file_name: String,
    pub path: PathBuf,
}

impl RenderedImage {
    pub fn describe(&self) -> String {
        format!("Fractal generated successfully: {}", self.file_name)
    }
}

/// Why a render produced no image. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Error generating fractal: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Timeout generating fractal")]
    TimedOut { secs: u64 },

    #[error("Exception generating fractal: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Invalid renderer configuration: {0}")]
    InvalidConfig(String),
}

/// Display form of a render attempt: a message plus the file name on success.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOutcome {
    pub message: String,
    pub file_name: Option<String>,
}

impl From<Result<RenderedImage, RenderError>> for RenderOutcome {
    fn from(result: Result<RenderedImage, RenderError>) -> Self {
        match result {
            Ok(image) => RenderOutcome {
                message: image.describe(),
                file_name: Some(image.file_name),
            },
            Err(e) => RenderOutcome {
                message: e.to_string(),
                file_name: None,
            },
        }
    }
}

// ─────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────

/// Turns [`RenderParams`] into an image file.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, params: &RenderParams) -> Result<RenderedImage, RenderError>;
}

/// Runs the configured renderer command as a child process.
#[derive(Clone, Debug)]
pub struct ExternalRenderer {
    program: String,
    base_args: Vec<String>,
    working_dir: PathBuf,
    output_dir: PathBuf,
    timeout: Duration,
}

impl ExternalRenderer {
    /// Build from config. A relative `working_dir` is resolved against the
    /// current directory, a relative `output_dir` against `working_dir`.
    pub fn from_config(config: &RendererConfig) -> Result<Self, RenderError> {
        let (program, base_args) = config
            .command
            .split_first()
            .ok_or_else(|| RenderError::InvalidConfig("renderer command is empty".into()))?;

        let mut working_dir = utils::expand_home(&config.working_dir);
        if working_dir.is_relative() {
            let cwd = std::env::current_dir().map_err(|e| {
                RenderError::InvalidConfig(format!("cannot resolve working directory: {e}"))
            })?;
            working_dir = cwd.join(working_dir);
        }
        let output_dir = working_dir.join(utils::expand_home(&config.output_dir));

        Ok(Self {
            program: program.clone(),
            base_args: base_args.to_vec(),
            working_dir,
            output_dir,
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Override the kill timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }
}

#[async_trait]
impl Renderer for ExternalRenderer {
    async fn render(&self, params: &RenderParams) -> Result<RenderedImage, RenderError> {
        let file_name = params
            .output_filename
            .clone()
            .unwrap_or_else(utils::fractal_filename);
        let path = self.output_dir.join(&file_name);

        std::fs::create_dir_all(&self.output_dir)?;

        info!(
            program = %self.program,
            formula = %params.formula,
            output = %path.display(),
            "Rendering fractal"
        );

        let child = Command::new(&self.program)
            .args(&self.base_args)
            .args(params.to_args(&path))
            .current_dir(&self.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        // Dropping the wait future on timeout kills the child.
        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) if output.status.success() => Ok(RenderedImage { file_name, path }),
            Ok(Ok(output)) => {
                let stderr = String::from_utf8_lossy(&output.stderr).to_string();
                warn!(code = ?output.status.code(), "Renderer failed");
                Err(RenderError::Failed {
                    code: output.status.code(),
                    stderr,
                })
            }
            Ok(Err(e)) => Err(RenderError::Spawn(e)),
            Err(_) => {
                warn!(secs = self.timeout.as_secs(), "Renderer timed out");
                Err(RenderError::TimedOut {
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
