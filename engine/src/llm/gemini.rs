use std::pin::Pin;

use color_eyre::{Result, eyre::eyre};

use super::{LLM, Request};
use crate::{
    LLMBox,
    gemini_api::{self, Content, GenerateContentRequest, GenerationConfig},
};

#[derive(Clone)]
pub struct Gemini {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub client: reqwest::Client,
}

impl Gemini {
    pub fn new(api_key: String, model: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            base_url: gemini_api::DEFAULT_BASE_URL.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

fn structured_request(req: &Request) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content::text(&req.prompt)],
        generation_config: GenerationConfig {
            response_mime_type: Some("application/json".into()),
            response_schema: Some(req.schema.to_gemini()),
            ..Default::default()
        },
    }
}

impl LLM for Gemini {
    fn generate<'a>(
        &'a self,
        req: &'a Request,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let response = gemini_api::generate_content(
                &self.client,
                &self.base_url,
                &self.model,
                &self.api_key,
                &structured_request(req),
            )
            .await?;

            response
                .text()
                .ok_or_else(|| eyre!("Gemini returned no text:\n{response:#?}"))
        })
    }

    fn clone(&self) -> LLMBox {
        Box::new(Clone::clone(self))
    }
}
