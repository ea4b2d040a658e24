use std::pin::Pin;

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};
use thiserror::Error;

pub mod gemini;
pub use gemini::GeminiImage;

pub mod open_router;
pub use open_router::OpenRouterImage;

use crate::{ImgModBox, Provider};

pub const DEFAULT_MIME_TYPE: &str = "image/png";

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
    EnumIter,
    Default,
)]
pub enum Model {
    #[default]
    #[strum(to_string = "Gemini 2.5 Flash Image")]
    GeminiFlashImage,
    #[strum(to_string = "Gemini 2.5 Flash Image (OpenRouter)")]
    OpenRouterGeminiFlashImage,
}

impl Model {
    pub fn make(&self, key: String) -> ImgModBox {
        match self {
            Model::GeminiFlashImage => Box::new(GeminiImage::new(*self, key)),
            Model::OpenRouterGeminiFlashImage => Box::new(OpenRouterImage::new(*self, key)),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Model::GeminiFlashImage => "gemini-2.5-flash-image",
            Model::OpenRouterGeminiFlashImage => "google/gemini-2.5-flash-image-preview",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Model::GeminiFlashImage => Provider::Google,
            Model::OpenRouterGeminiFlashImage => Provider::OpenRouter,
        }
    }
}

/// A base64 encoded image, exactly as the backend delivered it.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    pub base64: String,
    pub mime_type: String,
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("base64", &format_args!("<{} chars>", self.base64.len()))
            .field("mime_type", &self.mime_type)
            .finish()
    }
}

/// The backend answered successfully, but no image payload was where it should be.
#[derive(Debug, Error)]
#[error("No image data found in the response")]
pub struct NoImageData;

pub trait ImageModel {
    fn get_image<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Image>> + Send + 'a>>;

    fn clone(&self) -> ImgModBox;
    fn model(&self) -> Model;
}
