//! In-memory backends for exercising the resolver, renderer and session without a network.

use std::{
    pin::Pin,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};

use color_eyre::{Result, eyre::eyre};
use tokio::sync::Notify;

use crate::{
    ImgModBox, LLMBox,
    image_model::{Image, ImageModel, Model, NoImageData},
    llm::{LLM, Request},
};

#[derive(Clone)]
pub struct FakeLLM {
    answer: std::result::Result<String, String>,
    calls: Arc<AtomicUsize>,
    last_prompt: Arc<Mutex<Option<String>>>,
    gate: Option<Arc<Notify>>,
}

impl FakeLLM {
    pub fn answering(text: &str) -> Self {
        Self {
            answer: Ok(text.into()),
            calls: Default::default(),
            last_prompt: Default::default(),
            gate: None,
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.into()),
            ..Self::answering("")
        }
    }

    /// Blocks every request until `gate` is notified.
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

impl LLM for FakeLLM {
    fn generate<'a>(
        &'a self,
        req: &'a Request,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(req.prompt.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.answer.clone().map_err(|e| eyre!(e))
        })
    }

    fn clone(&self) -> LLMBox {
        Box::new(Clone::clone(self))
    }
}

#[derive(Clone)]
enum ImageAnswer {
    Image(Image),
    NoImage,
    Error(String),
}

#[derive(Clone)]
pub struct FakeImageModel {
    answer: ImageAnswer,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl FakeImageModel {
    pub fn returning(base64: &str) -> Self {
        Self::with_answer(ImageAnswer::Image(Image {
            base64: base64.into(),
            mime_type: "image/png".into(),
        }))
    }

    pub fn without_image() -> Self {
        Self::with_answer(ImageAnswer::NoImage)
    }

    pub fn failing(message: &str) -> Self {
        Self::with_answer(ImageAnswer::Error(message.into()))
    }

    fn with_answer(answer: ImageAnswer) -> Self {
        Self {
            answer,
            prompts: Default::default(),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl ImageModel for FakeImageModel {
    fn get_image<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Image>> + Send + 'a>> {
        Box::pin(async move {
            self.prompts.lock().unwrap().push(prompt.to_string());
            match &self.answer {
                ImageAnswer::Image(image) => Ok(image.clone()),
                ImageAnswer::NoImage => Err(NoImageData.into()),
                ImageAnswer::Error(e) => Err(eyre!("{e}")),
            }
        })
    }

    fn clone(&self) -> ImgModBox {
        Box::new(Clone::clone(self))
    }

    fn model(&self) -> Model {
        Model::default()
    }
}
