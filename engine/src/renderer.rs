use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use log::{debug, error};
use thiserror::Error;

use crate::{
    ImgModBox,
    image_model::{Image, NoImageData},
    resolver::ConceptResolution,
};

/// Which of the two prompt templates a resolution is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPrompt {
    /// A fictional stand-in, never a real identifiable individual.
    Person,
    /// A realistic depiction of the named thing.
    Object,
}

impl RenderPrompt {
    pub fn for_resolution(resolution: &ConceptResolution) -> Self {
        if resolution.is_person {
            RenderPrompt::Person
        } else {
            RenderPrompt::Object
        }
    }

    pub fn text(&self, substitute: &str) -> String {
        match self {
            RenderPrompt::Person => format!(
                "A 3d rendered version of {substitute}. Do not show a real person, make it a fictional character."
            ),
            RenderPrompt::Object => {
                format!("A high-quality, photorealistic image of: {substitute}")
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct RenderedImage {
    pub base64: String,
    pub mime_type: String,
    /// The substitute the image was requested for.
    pub caption: String,
}

impl RenderedImage {
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(self.base64.trim())
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.base64)
    }

    pub fn file_extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "png",
        }
    }
}

impl std::fmt::Debug for RenderedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderedImage")
            .field("base64", &format_args!("<{} chars>", self.base64.len()))
            .field("mime_type", &self.mime_type)
            .field("caption", &self.caption)
            .finish()
    }
}

#[derive(Debug, Error)]
#[error("Failed to generate an image from the AI.")]
pub struct RenderFailure {
    #[source]
    pub cause: RenderCause,
}

#[derive(Debug, Error)]
pub enum RenderCause {
    #[error("image service request failed: {0:#}")]
    Service(color_eyre::Report),

    #[error("no image data found in the AI response")]
    MissingImage,
}

impl From<color_eyre::Report> for RenderCause {
    fn from(report: color_eyre::Report) -> Self {
        if report.downcast_ref::<NoImageData>().is_some() {
            RenderCause::MissingImage
        } else {
            RenderCause::Service(report)
        }
    }
}

pub struct ImageRenderer {
    imgmod: ImgModBox,
}

impl ImageRenderer {
    pub fn new(imgmod: ImgModBox) -> Self {
        Self { imgmod }
    }

    pub async fn render(
        &self,
        resolution: &ConceptResolution,
    ) -> Result<RenderedImage, RenderFailure> {
        let template = RenderPrompt::for_resolution(resolution);
        let prompt = template.text(&resolution.substitute);
        debug!("Rendering {template:?} prompt with {}: {prompt}", self.imgmod.model());

        match self.imgmod.get_image(&prompt).await {
            Ok(Image { base64, mime_type }) => Ok(RenderedImage {
                base64,
                mime_type,
                caption: resolution.substitute.clone(),
            }),
            Err(report) => {
                let cause = RenderCause::from(report);
                error!("Error generating image of {:?}: {cause}", resolution.substitute);
                Err(RenderFailure { cause })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeImageModel;

    fn resolution(substitute: &str, is_person: bool) -> ConceptResolution {
        ConceptResolution {
            substitute: substitute.into(),
            is_person,
        }
    }

    #[test]
    fn template_follows_person_flag() {
        assert_eq!(
            RenderPrompt::for_resolution(&resolution("JD Vance", true)),
            RenderPrompt::Person
        );
        assert_eq!(
            RenderPrompt::for_resolution(&resolution("Casio", false)),
            RenderPrompt::Object
        );
    }

    #[test]
    fn person_template_disclaims_real_people() {
        let text = RenderPrompt::Person.text("JD Vance");
        assert_eq!(
            text,
            "A 3d rendered version of JD Vance. Do not show a real person, make it a fictional character."
        );
    }

    #[test]
    fn object_template_is_photorealistic() {
        assert_eq!(
            RenderPrompt::Object.text("Casio"),
            "A high-quality, photorealistic image of: Casio"
        );
    }

    #[test]
    fn rendered_image_helpers() {
        let image = RenderedImage {
            base64: "aGVsbG8=".into(),
            mime_type: "image/jpeg".into(),
            caption: "Casio".into(),
        };
        assert_eq!(image.decode().unwrap(), b"hello");
        assert_eq!(image.data_url(), "data:image/jpeg;base64,aGVsbG8=");
        assert_eq!(image.file_extension(), "jpg");
    }

    #[tokio::test]
    async fn renders_with_object_prompt() {
        let imgmod = FakeImageModel::returning("aGVsbG8=");
        let renderer = ImageRenderer::new(Box::new(imgmod.clone()));

        let image = renderer.render(&resolution("Casio", false)).await.unwrap();

        assert_eq!(image.base64, "aGVsbG8=");
        assert_eq!(image.caption, "Casio");
        assert_eq!(
            imgmod.prompts(),
            vec!["A high-quality, photorealistic image of: Casio".to_string()]
        );
    }

    #[tokio::test]
    async fn missing_image_is_a_render_failure() {
        let renderer = ImageRenderer::new(Box::new(FakeImageModel::without_image()));
        let err = renderer.render(&resolution("Casio", false)).await.unwrap_err();

        assert!(matches!(err.cause, RenderCause::MissingImage));
        assert_eq!(err.to_string(), "Failed to generate an image from the AI.");
    }

    #[tokio::test]
    async fn service_error_is_a_render_failure() {
        let renderer = ImageRenderer::new(Box::new(FakeImageModel::failing("503")));
        let err = renderer.render(&resolution("Casio", false)).await.unwrap_err();

        assert!(matches!(err.cause, RenderCause::Service(_)));
        assert_eq!(err.to_string(), "Failed to generate an image from the AI.");
    }
}
