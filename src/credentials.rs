//! Provider API key resolution.
//!
//! Keys are looked up on every call: the environment first, then the key
//! injected at runtime (from the config file or [`CredentialResolver::inject`]).
//! Only DeepSeek treats a missing key as a local error; a missing Gemini key
//! is passed through as an empty string and rejected by the backend.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::config::Config;
use crate::error::{Result, StudyError};
use crate::models::Provider;

/// Environment-style key lookup.
pub trait KeySource: Send + Sync {
    fn lookup(&self, name: &str) -> Option<String>;
}

/// Reads the process environment.
pub struct ProcessEnv;

impl KeySource for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl KeySource for HashMap<String, String> {
    fn lookup(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

fn env_names(provider: Provider) -> &'static [&'static str] {
    match provider {
        Provider::Gemini => &["GEMINI_API_KEY", "API_KEY"],
        Provider::DeepSeek => &["DEEPSEEK_API_KEY"],
    }
}

pub struct CredentialResolver {
    env: Arc<dyn KeySource>,
    injected: RwLock<HashMap<Provider, String>>,
}

impl CredentialResolver {
    pub fn new(env: Arc<dyn KeySource>) -> Self {
        Self {
            env,
            injected: RwLock::new(HashMap::new()),
        }
    }

    /// Resolver over the process environment, seeded with any keys from the config file.
    pub fn from_config(cfg: &Config) -> Self {
        let resolver = Self::new(Arc::new(ProcessEnv));
        if let Some(key) = &cfg.gemini.api_key {
            resolver.inject(Provider::Gemini, key.clone());
        }
        if let Some(key) = &cfg.deepseek.api_key {
            resolver.inject(Provider::DeepSeek, key.clone());
        }
        resolver
    }

    /// Set the runtime key for a provider. The environment still takes precedence.
    pub fn inject(&self, provider: Provider, key: impl Into<String>) {
        let mut injected = self
            .injected
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        injected.insert(provider, key.into());
    }

    fn lookup(&self, provider: Provider) -> Option<String> {
        let from_env = env_names(provider)
            .iter()
            .filter_map(|name| self.env.lookup(name))
            .find(|v| !v.trim().is_empty());
        if from_env.is_some() {
            return from_env;
        }

        let injected = self
            .injected
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        injected
            .get(&provider)
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }

    pub fn resolve(&self, provider: Provider) -> Result<String> {
        match (provider, self.lookup(provider)) {
            (_, Some(key)) => Ok(key),
            (Provider::DeepSeek, None) => Err(StudyError::MissingCredential { provider }),
            (Provider::Gemini, None) => {
                tracing::warn!("No Gemini API key configured - the request will be unauthenticated");
                Ok(String::new())
            }
        }
    }
}
