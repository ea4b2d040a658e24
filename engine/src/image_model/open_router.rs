use std::pin::Pin;

use color_eyre::{
    Result,
    eyre::{Context, ensure},
};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{Image, ImageModel, Model, NoImageData};
use crate::{ImgModBox, llm::open_ai_chat::OPEN_ROUTER_BASE_URL};

/// Image generation through OpenRouter's chat completions. The picture comes back as a
/// `data:` URL attached to the assistant message.
#[derive(Clone)]
pub struct OpenRouterImage {
    model: Model,
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterImage {
    pub fn new(model: Model, api_key: String) -> Self {
        Self {
            model,
            client: Client::new(),
            api_key,
            base_url: OPEN_ROUTER_BASE_URL.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    modalities: [&'static str; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    images: Vec<ResponseImage>,
}

#[derive(Debug, Deserialize)]
struct ResponseImage {
    #[serde(default, alias = "imageUrl")]
    image_url: Option<ImageUrl>,
}

#[derive(Deserialize)]
struct ImageUrl {
    url: String,
}

impl std::fmt::Debug for ImageUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ImageUrl(<{} chars>)", self.url.len())
    }
}

/// Splits `data:<mime>;base64,<payload>` into mime type and payload.
pub fn split_data_url(url: &str) -> Option<(&str, &str)> {
    let (scheme, rest) = url.split_once(':')?;
    if !scheme.eq_ignore_ascii_case("data") {
        return None;
    }
    let (meta, payload) = rest.split_once(',')?;
    let mime = meta.strip_suffix(";base64")?;
    if payload.is_empty() {
        return None;
    }
    Some((mime, payload))
}

impl ImageModel for OpenRouterImage {
    fn get_image<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Image>> + Send + 'a>> {
        Box::pin(async move {
            let request = ChatRequest {
                model: self.model.id(),
                messages: [ChatMessage {
                    role: "user",
                    content: prompt,
                }],
                modalities: ["image", "text"],
            };

            let resp = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&request)
                .send()
                .await
                .context("sending image request")?;

            let status = resp.status();
            let body = resp.text().await?;
            ensure!(
                status.is_success(),
                "OpenRouter image request error: {status} - {body}"
            );

            let response: ChatResponse =
                serde_json::from_str(&body).context("parsing image response")?;
            debug!("OpenRouter image response:\n{response:#?}");

            let url = response
                .choices
                .first()
                .and_then(|c| c.message.images.first())
                .and_then(|i| i.image_url.as_ref())
                .ok_or(NoImageData)?;
            let (mime_type, payload) = split_data_url(&url.url).ok_or(NoImageData)?;

            Ok(Image {
                base64: payload.to_string(),
                mime_type: mime_type.to_string(),
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

#[cfg(test)]
mod tests {
    use expect_test::expect;
    use mockito::Matcher;

    use super::*;

    #[test]
    fn data_url_parts() {
        assert_eq!(
            split_data_url("data:image/png;base64,iVBORw0K"),
            Some(("image/png", "iVBORw0K"))
        );
        assert_eq!(
            split_data_url("DATA:image/webp;base64,UklG"),
            Some(("image/webp", "UklG"))
        );
        assert_eq!(split_data_url("https://example.com/cat.png"), None);
        assert_eq!(split_data_url("data:image/png,rawbytes"), None);
        assert_eq!(split_data_url("data:image/png;base64,"), None);
    }

    #[test]
    fn request_serialization() {
        let req = ChatRequest {
            model: Model::OpenRouterGeminiFlashImage.id(),
            messages: [ChatMessage {
                role: "user",
                content: "a casio",
            }],
            modalities: ["image", "text"],
        };

        let expect = expect![[
            r#"{"model":"google/gemini-2.5-flash-image-preview","messages":[{"role":"user","content":"a casio"}],"modalities":["image","text"]}"#
        ]];
        expect.assert_eq(&serde_json::to_string(&req).unwrap());
    }

    #[tokio::test]
    async fn extracts_first_image_attachment() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::PartialJsonString(
                r#"{"modalities":["image","text"]}"#.into(),
            ))
            .with_status(200)
            .with_body(
                r#"{"choices":[{"message":{"role":"assistant","content":"","images":[
                    {"type":"image_url","image_url":{"url":"data:image/png;base64,FIRST"}},
                    {"type":"image_url","image_url":{"url":"data:image/png;base64,SECOND"}}
                ]}}]}"#,
            )
            .create_async()
            .await;

        let model = OpenRouterImage::new(Model::OpenRouterGeminiFlashImage, "secret".into())
            .with_base_url(server.url());
        let image = model.get_image("a casio").await.unwrap();

        assert_eq!(image.base64, "FIRST");
        assert_eq!(image.mime_type, "image/png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn no_attachment_is_no_image_data() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"no"}}]}"#)
            .create_async()
            .await;

        let model = OpenRouterImage::new(Model::OpenRouterGeminiFlashImage, "secret".into())
            .with_base_url(server.url());
        let err = model.get_image("a casio").await.unwrap_err();
        assert!(err.downcast_ref::<NoImageData>().is_some(), "{err:?}");
    }
}
