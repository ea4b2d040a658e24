use std::pin::Pin;

use color_eyre::{
    Result,
    eyre::{Context, bail, eyre},
};
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{LLM, Request, ResponseSchema};
use crate::LLMBox;

pub const OPEN_ROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Clone)]
pub struct OpenAIChat {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIChat {
    pub fn new(api_key: String, base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        }
    }
}

impl LLM for OpenAIChat {
    fn generate<'a>(
        &'a self,
        req: &'a Request,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            let body = OpenAIChatRequest {
                model: &self.model,
                messages: vec![OpenAIMessage {
                    role: "user",
                    content: &req.prompt,
                }],
                response_format: ResponseFormat::for_schema(&req.schema),
            };

            let res = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await
                .context("initial response")?;

            if !res.status().is_success() {
                let status = res.status();
                let body = res.text().await.unwrap_or_default();
                bail!("OpenAI error {}: {}", status, body);
            }

            let response: OpenAIChatResponse = res.json().await.context("parsing chat response")?;
            debug!("Chat response:\n{response:#?}");

            response
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|c| !c.is_empty())
                .ok_or_else(|| eyre!("Chat response carried no message content"))
        })
    }

    fn clone(&self) -> LLMBox {
        Box::new(Clone::clone(self))
    }
}

//
// ===== OpenAI wire types =====
//

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ResponseFormat {
    JsonSchema { json_schema: JsonSchemaFormat },
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: Value,
}

impl ResponseFormat {
    fn for_schema(schema: &ResponseSchema) -> Self {
        ResponseFormat::JsonSchema {
            json_schema: JsonSchemaFormat {
                name: schema.name,
                strict: true,
                schema: schema.to_json_schema(),
            },
        }
    }
}

#[derive(Deserialize, Debug)]
struct OpenAIChatResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize, Debug)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
