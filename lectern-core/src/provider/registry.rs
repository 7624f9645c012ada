//! Provider registry.
//!
//! Maps provider names to [`LlmProvider`] implementations. The process-wide
//! instance is built once from configuration and is read-only afterwards.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::config::Config;
use crate::provider::{AnthropicProvider, LlmProvider, OpenAiProvider, ProviderDescriptor};

static GLOBAL: OnceLock<Arc<ProviderRegistry>> = OnceLock::new();

/// Ordered set of providers, looked up by name.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use lectern_core::provider::{MockProvider, ProviderRegistry};
///
/// let registry = ProviderRegistry::new(vec![Arc::new(MockProvider::new())]);
/// assert!(registry.get("mock").is_some());
/// assert!(registry.get("missing").is_none());
/// ```
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn LlmProvider>>,
}

impl ProviderRegistry {
    /// Build a registry from providers, keeping their order.
    ///
    /// A later provider with an already-registered name is ignored.
    pub fn new(providers: Vec<Arc<dyn LlmProvider>>) -> Self {
        let mut unique: Vec<Arc<dyn LlmProvider>> = Vec::with_capacity(providers.len());
        for provider in providers {
            let name = &provider.descriptor().name;
            if unique.iter().any(|p| &p.descriptor().name == name) {
                tracing::warn!(provider = %name, "registry: duplicate provider ignored");
                continue;
            }
            unique.push(provider);
        }
        Self { providers: unique }
    }

    /// Build the built-in providers (`openai`, `anthropic`) from configuration.
    ///
    /// Applies the request timeout and any endpoint overrides.
    pub fn builtin(config: &Config) -> Self {
        let timeout = Duration::from_secs(config.chat.request_timeout_secs);

        let mut openai = OpenAiProvider::new(timeout);
        if let Some(ref endpoint) = config.endpoints.openai {
            openai = openai.with_endpoint(endpoint);
        }

        let mut anthropic = AnthropicProvider::new(timeout);
        if let Some(ref endpoint) = config.endpoints.anthropic {
            anthropic = anthropic.with_endpoint(endpoint);
        }

        Self::new(vec![Arc::new(openai), Arc::new(anthropic)])
    }

    /// Initialise the process-wide registry from configuration.
    ///
    /// Only the first call builds anything; later calls (and any earlier
    /// [`global`](Self::global) call) keep the existing registry.
    pub fn init_global(config: &Config) -> Arc<Self> {
        Arc::clone(GLOBAL.get_or_init(|| {
            tracing::debug!("registry: initialising built-in providers");
            Arc::new(Self::builtin(config))
        }))
    }

    /// The process-wide registry, built from default configuration if
    /// [`init_global`](Self::init_global) was never called.
    pub fn global() -> Arc<Self> {
        Self::init_global(&Config::default())
    }

    /// Descriptors of every provider, in registration order.
    pub fn list_providers(&self) -> Vec<ProviderDescriptor> {
        self.providers
            .iter()
            .map(|p| p.descriptor().clone())
            .collect()
    }

    /// Look up a provider by name. Absence is a normal result.
    pub fn get(&self, name: &str) -> Option<Arc<dyn LlmProvider>> {
        self.providers
            .iter()
            .find(|p| p.descriptor().name == name)
            .cloned()
    }

    /// The first registered provider, if any.
    pub fn first(&self) -> Option<Arc<dyn LlmProvider>> {
        self.providers.first().cloned()
    }
}
