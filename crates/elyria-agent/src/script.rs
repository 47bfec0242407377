//! Scripted sessions: fixed prompt sequences sent through the exchange.

use std::str::FromStr;

use tracing::debug;

use crate::exchange::{Conversation, ExchangeError, Reply};

/// Opening message to Nya Elyria.
pub const GREETING: &str = "Hi Nya Elyria! I'm excited to collaborate with you on exploring fractal formulas using the Fractal Toolkit. I've created a special directory for our work together.

I'd love to learn what kinds of fractal formulas and patterns have meaning to you. Are there particular mathematical relationships, visual patterns, or aesthetic qualities you're drawn to in fractals? We can experiment with different formulas, adjust viewing parameters, try various color palettes, and explore the infinite complexity of fractal geometry together.

What types of fractal patterns or formulas interest you most?";

const FOLLOW_UPS: &[&str] = &[
    "I'm curious about your thoughts on complex exponents in fractals. Have you experimented with formulas like z^(2.7+0.3i) + c? These can create some really interesting visual effects.",
    "Another fascinating area is hyperoperations like tetration (z^^z + c), pentation (z^^^z + c), and hexation (z^^^^z + c). Would you be interested in exploring these?",
    "We can also try various mathematical functions in our fractals like sinh, cosh, sqrt, etc. What mathematical functions intrigue you most?",
];

const DEEPER_EXPLORATION: &[&str] = &[
    "Based on our previous discussion, I'm excited to explore these concepts with you using our fractal toolkit. We've recently implemented support for complex exponents like z^(2.7+0.3i) + c, which were previously causing issues. Would you like to see what these kinds of fractals look like?",
    "We've also added support for higher hyperoperations like pentation and hexation. These are extremely computationally intensive but can create incredibly complex structures. Would you be interested in experimenting with these?",
    "Our toolkit now supports a wider range of mathematical functions like sqrt, cbrt, asin, acos, atan, sinh, cosh, tanh. How would you like to incorporate these into fractal formulas?",
    "I'm also curious about your thoughts on color palettes and rendering parameters. Different color schemes can dramatically change the visual impact of the same mathematical structure.",
];

/// Message sent after a successful render so the model can react to it.
pub fn render_followup(formula: &str, file_name: &str) -> String {
    format!(
        "We just generated a fractal with the formula '{}'. The result is saved as {}. \
         Would you like to see it or try a different formula?",
        formula, file_name
    )
}

/// A named prompt sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Script {
    /// Send the greeting, whatever the history holds.
    Greeting,
    /// Greet if the conversation is new, then ask the follow-up questions.
    FollowUps,
    /// Continue an existing conversation with more specific questions.
    DeeperExploration,
}

impl Script {
    pub const ALL: [Script; 3] = [Script::Greeting, Script::FollowUps, Script::DeeperExploration];

    pub fn name(&self) -> &'static str {
        match self {
            Script::Greeting => "greeting",
            Script::FollowUps => "follow-ups",
            Script::DeeperExploration => "deeper",
        }
    }

    /// Prompts to send, given whether the conversation is currently empty.
    pub fn prompts(&self, conversation_is_empty: bool) -> Vec<&'static str> {
        match self {
            Script::Greeting => vec![GREETING],
            Script::FollowUps => {
                let mut prompts = Vec::with_capacity(FOLLOW_UPS.len() + 1);
                if conversation_is_empty {
                    prompts.push(GREETING);
                }
                prompts.extend_from_slice(FOLLOW_UPS);
                prompts
            }
            Script::DeeperExploration => DEEPER_EXPLORATION.to_vec(),
        }
    }
}

impl FromStr for Script {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Script::ALL
            .into_iter()
            .find(|script| script.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = Script::ALL.iter().map(Script::name).collect();
                format!("unknown script '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

/// Send each prompt of `script` in order, calling `on_reply` after each.
///
/// Stops at the first error; earlier turns stay persisted.
pub async fn run_script<F>(
    conversation: &mut Conversation,
    script: Script,
    mut on_reply: F,
) -> Result<usize, ExchangeError>
where
    F: FnMut(&str, &Reply),
{
    let prompts = script.prompts(conversation.store().is_empty());
    debug!(script = script.name(), prompts = prompts.len(), "Running script");

    for prompt in &prompts {
        let reply = conversation.exchange(prompt).await?;
        on_reply(prompt, &reply);
    }
    Ok(prompts.len())
}
