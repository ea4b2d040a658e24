use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::{image_model::ImageModel, llm::LLM};

pub mod image_model;
pub mod llm;
pub mod pipeline;
pub mod renderer;
pub mod resolver;
pub mod session;

mod gemini_api;

#[cfg(test)]
mod testing;

pub type LLMBox = Box<dyn LLM + Send + Sync>;
pub type ImgModBox = Box<dyn ImageModel + Send + Sync>;

/// A vendor whose API key unlocks one or more text or image models.
#[derive(
    Debug,
    Clone,
    Copy,
    Display,
    clap::ValueEnum,
    Serialize,
    Deserialize,
    Hash,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    EnumIter,
)]
pub enum Provider {
    #[strum(to_string = "Google AI Studio")]
    Google,
    OpenRouter,
}

impl Provider {
    /// Environment variables that may carry this provider's key, checked in order.
    pub fn env_vars(&self) -> &'static [&'static str] {
        match self {
            Provider::Google => &["GEMINI_API_KEY", "API_KEY"],
            Provider::OpenRouter => &["OPENROUTER_API_KEY"],
        }
    }
}
