use std::pin::Pin;

use color_eyre::Result;
use log::debug;

use super::{DEFAULT_MIME_TYPE, Image, ImageModel, Model, NoImageData};
use crate::{
    ImgModBox,
    gemini_api::{self, Content, GenerateContentRequest, GenerationConfig, Modality},
};

/// Gemini's native image output: one `generateContent` call, the picture comes back as
/// inline data in the first candidate.
#[derive(Clone)]
pub struct GeminiImage {
    model: Model,
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiImage {
    pub fn new(model: Model, api_key: String) -> Self {
        Self {
            model,
            api_key,
            base_url: gemini_api::DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl ImageModel for GeminiImage {
    fn get_image<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Image>> + Send + 'a>> {
        Box::pin(async move {
            let request = GenerateContentRequest {
                contents: vec![Content::text(prompt)],
                generation_config: GenerationConfig {
                    response_modalities: vec![Modality::Image],
                    ..Default::default()
                },
            };

            let response = gemini_api::generate_content(
                &self.client,
                &self.base_url,
                self.model.id(),
                &self.api_key,
                &request,
            )
            .await?;

            let inline = response.inline_data().ok_or(NoImageData)?;
            debug!(
                "Gemini image: mime type {:?}, {} base64 chars",
                inline.mime_type,
                inline.data.len()
            );

            Ok(Image {
                base64: inline.data.clone(),
                mime_type: inline
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MIME_TYPE.into()),
            })
        })
    }

    fn clone(&self) -> ImgModBox {
        Box::new(Clone::clone(self))
    }

    fn model(&self) -> Model {
        self.model
    }
}
