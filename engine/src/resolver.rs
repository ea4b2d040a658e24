use std::fmt;

use log::{debug, error};
use serde::Deserialize;
use thiserror::Error;

use crate::{
    LLMBox,
    llm::{Field, FieldKind, Request, ResponseSchema},
};

/// Free text to find the poor man's version of. Never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptQuery(String);

impl ConceptQuery {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, ResolutionFailure> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ResolutionFailure {
                cause: ResolutionCause::EmptyQuery,
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConceptQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConceptResolution {
    /// The cheaper or lesser counterpart, never empty.
    pub substitute: String,
    /// Whether the query named a well-known individual.
    pub is_person: bool,
}

#[derive(Debug, Error)]
#[error("Failed to get a creative alternative from the AI.")]
pub struct ResolutionFailure {
    #[source]
    pub cause: ResolutionCause,
}

#[derive(Debug, Error)]
pub enum ResolutionCause {
    #[error("the query is empty")]
    EmptyQuery,

    #[error("text service request failed: {0:#}")]
    Service(color_eyre::Report),

    #[error("response does not match the resolution shape: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("the AI returned an empty response for the concept")]
    EmptySubstitute,
}

const SUBSTITUTE_FIELD: &str = "substitute";
const IS_PERSON_FIELD: &str = "isPerson";

/// The exact shape the text service must answer with.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResolutionPayload {
    substitute: String,
    #[serde(rename = "isPerson")]
    is_person: bool,
}

pub fn resolution_schema() -> ResponseSchema {
    ResponseSchema {
        name: "poor_mans_version",
        fields: vec![
            Field {
                name: SUBSTITUTE_FIELD,
                kind: FieldKind::String,
                description: "The name of the poor man's version item or person.",
            },
            Field {
                name: IS_PERSON_FIELD,
                kind: FieldKind::Boolean,
                description: "True if the original input was a person.",
            },
        ],
    }
}

fn build_request(query: &ConceptQuery) -> Request {
    let prompt = indoc::formatdoc! {r#"
        Analyze the input: "{query}".
        First, determine if the input is a famous person.
        Then, determine the "poor man's version" of the input based on the following rules:
        - If the input is an object, brand, organization or concept, provide a direct, well-known,
          cheaper alternative in the same category (e.g., Rolex -> Casio, Gold -> Silver,
          Champagne -> Prosecco).
        - If the input is a famous person, provide the name of another well-known person who is
          widely considered to be an imitator, a follower, or aspires to be like the original
          person (e.g., Donald Trump -> JD Vance or Viktor Orbán).

        Return the result as a JSON object with the fields "{SUBSTITUTE_FIELD}" and "{IS_PERSON_FIELD}".
    "#};

    Request {
        prompt,
        schema: resolution_schema(),
    }
}

/// Checks the raw service answer against the resolution shape.
pub fn parse_resolution(text: &str) -> Result<ConceptResolution, ResolutionCause> {
    let payload: ResolutionPayload = serde_json::from_str(text.trim())?;
    let substitute = payload.substitute.trim();
    if substitute.is_empty() {
        return Err(ResolutionCause::EmptySubstitute);
    }

    Ok(ConceptResolution {
        substitute: substitute.to_string(),
        is_person: payload.is_person,
    })
}

pub struct ConceptResolver {
    llm: LLMBox,
}

impl ConceptResolver {
    pub fn new(llm: LLMBox) -> Self {
        Self { llm }
    }

    pub async fn resolve(
        &self,
        query: &ConceptQuery,
    ) -> Result<ConceptResolution, ResolutionFailure> {
        let req = build_request(query);
        let result = match self.llm.generate(&req).await {
            Ok(text) => {
                debug!("Resolution payload for {query:?}: {text}");
                parse_resolution(&text)
            }
            Err(e) => Err(ResolutionCause::Service(e)),
        };

        result.map_err(|cause| {
            error!("Error getting poor man's version of {query:?}: {cause}");
            ResolutionFailure { cause }
        })
    }
}
