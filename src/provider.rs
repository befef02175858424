//! LLM provider resolution.
//!
//! Every model call goes through an `edgequake_llm::LLMProvider`. This module
//! decides which one, from what the caller configured and what the
//! environment offers, and maps provider errors onto [`SummaryError`].

use crate::config::SummaryConfig;
use crate::error::SummaryError;
use edgequake_llm::{LLMProvider, LlmError, OpenAIProvider, ProviderFactory};
use std::sync::Arc;
use tracing::info;

/// Resolve the LLM provider, from most-specific to least-specific.
///
/// 1. **Pre-built provider** (`config.provider`): used as-is. Tests and
///    embedders that need middleware (caching, rate limiting) go here.
/// 2. **Explicit API key** (`config.api_key`): an OpenAI-compatible
///    provider against `config.api_base_url`. This is the path the CLI takes
///    when a key comes from `--api-key` or a secrets file.
/// 3. **Named provider** (`config.provider_name`): the factory reads that
///    provider's own API key variable.
/// 4. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`).
/// 5. **`OPENAI_API_KEY`** present: OpenAI with the configured model, even
///    when other providers' keys are also set.
/// 6. **Full auto-detection** (`ProviderFactory::from_env`).
pub fn resolve_provider(config: &SummaryConfig) -> Result<Arc<dyn LLMProvider>, SummaryError> {
    if let Some(ref provider) = config.provider {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref key) = config.api_key {
        info!("Using OpenAI-compatible endpoint {}", config.api_base_url);
        let provider = OpenAIProvider::compatible(key.clone(), config.api_base_url.clone())
            .with_model(config.model.clone());
        return Ok(Arc::new(provider));
    }

    if let Some(ref name) = config.provider_name {
        return create_provider(name, &config.model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            return create_provider("openai", &config.model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| SummaryError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No API key was given and no LLM provider could be detected.\n\
                Pass --api-key, use a secrets file, or set OPENAI_API_KEY.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}

/// Instantiate a named provider with the given model.
fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, SummaryError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        SummaryError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Map a provider failure onto the crate's error type.
pub(crate) fn map_llm_error(provider: &str, err: LlmError) -> SummaryError {
    match err {
        LlmError::AuthError(detail) => SummaryError::AuthError {
            provider: provider.to_string(),
            detail,
        },
        other => SummaryError::LlmApiError {
            message: format!("{provider}: {other}"),
        },
    }
}
