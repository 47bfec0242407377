//! Elyria agent: the conversation exchange and the capabilities layered on it.
//!
//! - **exchange**: one user turn → one completion call → one assistant turn
//! - **renderer**: the external fractal renderer behind a trait
//! - **script**: fixed prompt sequences (greeting, follow-ups, deeper exploration)
//! - **intent**: keyword checks used by the interactive session

pub mod exchange;
pub mod intent;
pub mod renderer;
pub mod script;

pub use exchange::{Conversation, DeliveryOutcome, ExchangeError, Reply};
pub use renderer::{
    ExternalRenderer, PaletteStop, RenderError, RenderOutcome, RenderParams, RenderedImage,
    Renderer,
};
pub use script::{run_script, Script};
