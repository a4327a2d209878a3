#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Narrative generation with LLM provider abstraction.
//!
//! Supports Anthropic Claude, `OpenAI`, and any `OpenAI`-compatible
//! local/self-hosted server (Ollama, vLLM, llama.cpp, LM Studio) via the
//! `AI_BASE_URL` environment variable.
//!
//! Generated text is never load-bearing: every prompt in [`describe`] and
//! [`proposal`] has a deterministic templated fallback, and
//! [`generate_or_fallback`] uses it whenever no provider is configured or
//! the provider fails.

pub mod describe;
pub mod proposal;
pub mod providers;

use providers::NarrativeProvider;
use thiserror::Error;

/// Errors that can occur during AI operations.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to LLM provider failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}

/// Generates text with `provider`, falling back to `fallback()` when no
/// provider is configured, the call fails, or the reply is blank.
pub async fn generate_or_fallback(
    provider: Option<&dyn NarrativeProvider>,
    system_prompt: &str,
    prompt: &str,
    fallback: impl FnOnce() -> String + Send,
) -> String {
    let Some(provider) = provider else {
        log::debug!("No narrative provider configured; using template");
        return fallback();
    };

    match provider.complete(system_prompt, prompt).await {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        Ok(_) => {
            log::warn!("Narrative provider returned an empty reply; using template");
            fallback()
        }
        Err(e) => {
            log::error!("Narrative generation failed: {e}");
            fallback()
        }
    }
}
