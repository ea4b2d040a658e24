use std::pin::Pin;

use color_eyre::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use strum::{Display, EnumIter};

use crate::{LLMBox, Provider};

pub mod gemini;
pub use gemini::Gemini;

pub mod open_ai_chat;
pub use open_ai_chat::OpenAIChat;

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
    #[strum(to_string = "Gemini 2.5 Flash")]
    GeminiFlash,
    #[strum(to_string = "Gemini 2.5 Flash (OpenRouter)")]
    OpenRouterGeminiFlash,
}

impl Model {
    pub fn make(&self, key: String) -> LLMBox {
        match self {
            Model::GeminiFlash => Box::new(Gemini::new(key, self.id())),
            Model::OpenRouterGeminiFlash => Box::new(OpenAIChat::new(
                key,
                open_ai_chat::OPEN_ROUTER_BASE_URL,
                self.id(),
            )),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Model::GeminiFlash => "gemini-2.5-flash",
            Model::OpenRouterGeminiFlash => "google/gemini-2.5-flash",
        }
    }

    pub fn provider(&self) -> Provider {
        match self {
            Model::GeminiFlash => Provider::Google,
            Model::OpenRouterGeminiFlash => Provider::OpenRouter,
        }
    }
}

/// A text-generation backend that answers a prompt with JSON matching a fixed shape.
pub trait LLM {
    /// Returns the raw JSON text produced by the model. Checking it against
    /// `req.schema` is the caller's job.
    fn generate<'a>(
        &'a self,
        req: &'a Request,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    fn clone(&self) -> LLMBox;
}

#[derive(Debug, Clone)]
pub struct Request {
    pub prompt: String,
    pub schema: ResponseSchema,
}

/// A flat object with required, typed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseSchema {
    pub name: &'static str,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Boolean,
}

impl FieldKind {
    fn json_type(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Boolean => "boolean",
        }
    }
}

impl ResponseSchema {
    /// The OpenAPI subset Gemini accepts as `responseSchema`.
    pub fn to_gemini(&self) -> Value {
        self.render(|kind| kind.json_type().to_uppercase(), "OBJECT", false)
    }

    /// Standard JSON Schema, as used by OpenAI style `response_format`.
    pub fn to_json_schema(&self) -> Value {
        self.render(|kind| kind.json_type().to_string(), "object", true)
    }

    fn render(
        &self,
        type_name: impl Fn(FieldKind) -> String,
        object_type: &str,
        closed: bool,
    ) -> Value {
        let mut fields: Vec<&Field> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.name);
        let properties: Map<String, Value> = fields
            .into_iter()
            .map(|f| {
                (
                    f.name.to_string(),
                    json!({
                        "type": type_name(f.kind),
                        "description": f.description,
                    }),
                )
            })
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        // keys go in sorted order so the output is stable with or without preserve_order
        let mut schema = Map::new();
        if closed {
            schema.insert("additionalProperties".into(), Value::Bool(false));
        }
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema.insert("type".into(), json!(object_type));
        Value::Object(schema)
    }
}
