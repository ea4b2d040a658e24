use log::info;
use thiserror::Error;

use crate::{
    ImgModBox, LLMBox,
    renderer::{ImageRenderer, RenderFailure, RenderedImage},
    resolver::{ConceptQuery, ConceptResolution, ConceptResolver, ResolutionFailure},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Resolution(#[from] ResolutionFailure),
    #[error(transparent)]
    Render(#[from] RenderFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Resolving,
    Rendering,
}

/// Everything one successful run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub query: ConceptQuery,
    pub resolution: ConceptResolution,
    pub image: RenderedImage,
}

pub struct Pipeline {
    resolver: ConceptResolver,
    renderer: ImageRenderer,
}

impl Pipeline {
    pub fn new(resolver: ConceptResolver, renderer: ImageRenderer) -> Self {
        Self { resolver, renderer }
    }

    pub fn from_models(llm: LLMBox, imgmod: ImgModBox) -> Self {
        Self::new(ConceptResolver::new(llm), ImageRenderer::new(imgmod))
    }

    pub async fn run(&self, query: ConceptQuery) -> Result<Outcome, PipelineError> {
        self.run_observed(query, |_| {}).await
    }

    /// Like [`Pipeline::run`], calling `observe` as each stage starts.
    /// Rendering only starts once resolution succeeded.
    pub async fn run_observed(
        &self,
        query: ConceptQuery,
        mut observe: impl FnMut(Stage) + Send,
    ) -> Result<Outcome, PipelineError> {
        observe(Stage::Resolving);
        let resolution = self.resolver.resolve(&query).await?;
        info!(
            "Resolved {query:?} to {:?} (person: {})",
            resolution.substitute, resolution.is_person
        );

        observe(Stage::Rendering);
        let image = self.renderer.render(&resolution).await?;
        info!("Rendered {} for {query:?}", image.mime_type);

        Ok(Outcome {
            query,
            resolution,
            image,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        renderer::RenderCause,
        resolver::ResolutionCause,
        testing::{FakeImageModel, FakeLLM},
    };

    fn query(s: &str) -> ConceptQuery {
        ConceptQuery::new(s).unwrap()
    }

    #[tokio::test]
    async fn rolex_becomes_a_casio() {
        let llm = FakeLLM::answering(r#"{"substitute": "Casio", "isPerson": false}"#);
        let imgmod = FakeImageModel::returning("aGVsbG8=");
        let pipeline = Pipeline::from_models(Box::new(llm), Box::new(imgmod.clone()));

        let mut stages = vec![];
        let outcome = pipeline
            .run_observed(query("Rolex"), |s| stages.push(s))
            .await
            .unwrap();

        assert_eq!(stages, [Stage::Resolving, Stage::Rendering]);
        assert_eq!(outcome.query.as_str(), "Rolex");
        assert_eq!(outcome.resolution.substitute, "Casio");
        assert_eq!(outcome.image.base64, "aGVsbG8=");
        let prompts = imgmod.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("photorealistic"));
        assert!(prompts[0].contains("Casio"));
    }

    #[tokio::test]
    async fn people_get_the_fictional_prompt() {
        let llm = FakeLLM::answering(r#"{"substitute": "JD Vance", "isPerson": true}"#);
        let imgmod = FakeImageModel::returning("aGVsbG8=");
        let pipeline = Pipeline::from_models(Box::new(llm), Box::new(imgmod.clone()));

        let outcome = pipeline.run(query("Donald Trump")).await.unwrap();

        assert!(outcome.resolution.is_person);
        assert_eq!(
            imgmod.prompts(),
            vec![
                "A 3d rendered version of JD Vance. Do not show a real person, make it a fictional character."
                    .to_string()
            ]
        );
    }

    #[tokio::test]
    async fn resolution_failure_never_renders() {
        let imgmod = FakeImageModel::returning("aGVsbG8=");
        let pipeline = Pipeline::from_models(
            Box::new(FakeLLM::failing("500 Internal Server Error")),
            Box::new(imgmod.clone()),
        );

        let mut stages = vec![];
        let err = pipeline
            .run_observed(query("Rolex"), |s| stages.push(s))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Resolution(ResolutionFailure {
                cause: ResolutionCause::Service(_)
            })
        ));
        assert_eq!(stages, [Stage::Resolving]);
        assert!(imgmod.prompts().is_empty());
    }

    #[tokio::test]
    async fn missing_image_fails_the_whole_run() {
        let pipeline = Pipeline::from_models(
            Box::new(FakeLLM::answering(
                r#"{"substitute": "Casio", "isPerson": false}"#,
            )),
            Box::new(FakeImageModel::without_image()),
        );

        let err = pipeline.run(query("Rolex")).await.unwrap_err();

        assert!(matches!(
            err,
            PipelineError::Render(RenderFailure {
                cause: RenderCause::MissingImage
            })
        ));
        assert_eq!(err.to_string(), "Failed to generate an image from the AI.");
    }
}
