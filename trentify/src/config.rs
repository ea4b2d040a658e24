use std::collections::BTreeMap;

use color_eyre::{Result, eyre::eyre};
use engine::{Provider, image_model, llm};
use serde::{Deserialize, Serialize};

use crate::cli::ApiKeys;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub text_model: llm::Model,
    pub image_model: image_model::Model,
    pub api_keys: BTreeMap<Provider, String>,
}

impl ApiKeys {
    pub fn get(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::Google => self.google_key.as_deref(),
            Provider::OpenRouter => self.openrouter_key.as_deref(),
        }
    }
}

fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

impl Config {
    /// Copies every key given on the command line into the config.
    pub fn store_keys(&mut self, keys: &ApiKeys) {
        for provider in [Provider::Google, Provider::OpenRouter] {
            if let Some(key) = keys.get(provider).and_then(non_blank) {
                self.api_keys.insert(provider, key.to_string());
            }
        }
    }

    pub fn api_key(&self, provider: Provider, overrides: &ApiKeys) -> Result<String> {
        self.api_key_with(provider, overrides, |var| std::env::var(var).ok())
    }

    /// Command line beats environment, environment beats the config file.
    pub fn api_key_with(
        &self,
        provider: Provider,
        overrides: &ApiKeys,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<String> {
        if let Some(key) = overrides.get(provider).and_then(non_blank) {
            return Ok(key.to_string());
        }

        for &var in provider.env_vars() {
            if let Some(key) = env(var).as_deref().and_then(non_blank) {
                return Ok(key.to_string());
            }
        }

        self.api_keys
            .get(&provider)
            .and_then(|k| non_blank(k))
            .map(str::to_string)
            .ok_or_else(|| {
                eyre!(
                    "No API key for {provider}. Set {} or run `trentify configure` with the key",
                    provider.env_vars().join(" or ")
                )
            })
    }
}
