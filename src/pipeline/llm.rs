//! Model interaction: build the chat request and make the one call.
//!
//! Prompt text lives in [`crate::prompts`] and provider selection in
//! [`crate::provider`]. This module owns the request shape (one user message,
//! configured temperature) and the time bound. There is no retry: a failed or
//! timed-out call is returned to the orchestrator, which aborts the request.

use crate::config::SummaryConfig;
use crate::error::SummaryError;
use crate::prompts::{build_prompt, build_prompt_with};
use crate::provider::map_llm_error;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, LLMResponse};
use std::time::Instant;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

/// Embed the extracted minutes into the configured (or default) template.
pub fn prompt_for(minutes: &str, config: &SummaryConfig) -> String {
    match config.prompt_template.as_deref() {
        Some(template) => build_prompt_with(template, minutes),
        None => build_prompt(minutes),
    }
}

/// The conversation sent to the model: the prompt as a single user message.
pub fn build_messages(prompt: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(prompt)]
}

/// Build `CompletionOptions` from the summary config.
pub fn build_options(config: &SummaryConfig) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(config.temperature),
        max_tokens: config.max_tokens,
        ..Default::default()
    }
}

/// Send the prompt and wait at most `config.api_timeout_secs` for the answer.
///
/// An answer that is empty after trimming is an error: there is nothing to
/// show and nothing to parse.
pub async fn summarize(
    provider: &dyn LLMProvider,
    prompt: &str,
    config: &SummaryConfig,
) -> Result<LLMResponse, SummaryError> {
    let messages = build_messages(prompt);
    let options = build_options(config);
    let secs = config.api_timeout_secs;
    let start = Instant::now();

    debug!(
        "Sending {} prompt chars to {} (model {})",
        prompt.len(),
        provider.name(),
        provider.model()
    );

    let response = match timeout(
        Duration::from_secs(secs),
        provider.chat(&messages, Some(&options)),
    )
    .await
    {
        Ok(result) => result.map_err(|e| map_llm_error(provider.name(), e))?,
        Err(_) => {
            warn!("{}: no answer after {}s", provider.name(), secs);
            return Err(SummaryError::ApiTimeout { secs });
        }
    };

    debug!(
        "{}: {} input tokens, {} output tokens, {:?}",
        provider.name(),
        response.prompt_tokens,
        response.completion_tokens,
        start.elapsed()
    );

    if response.content.trim().is_empty() {
        return Err(SummaryError::EmptyResponse);
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use edgequake_llm::{ChatRole, LlmError, MockProvider};

    /// Answers after a fixed delay, so the timeout can be exercised.
    struct Slow(Duration);

    #[async_trait]
    impl LLMProvider for Slow {
        fn name(&self) -> &str {
            "slow"
        }
        fn model(&self) -> &str {
            "slow-model"
        }
        fn max_context_length(&self) -> usize {
            4096
        }
        async fn complete(&self, _prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            tokio::time::sleep(self.0).await;
            Ok(LLMResponse::new("late", "slow-model"))
        }
        async fn complete_with_options(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete(prompt).await
        }
        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete("").await
        }
    }

    /// Always fails with the given error.
    struct Failing(fn() -> LlmError);

    #[async_trait]
    impl LLMProvider for Failing {
        fn name(&self) -> &str {
            "failing"
        }
        fn model(&self) -> &str {
            "failing-model"
        }
        fn max_context_length(&self) -> usize {
            4096
        }
        async fn complete(&self, _prompt: &str) -> edgequake_llm::Result<LLMResponse> {
            Err((self.0)())
        }
        async fn complete_with_options(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete(prompt).await
        }
        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> edgequake_llm::Result<LLMResponse> {
            self.complete("").await
        }
    }

    #[test]
    fn build_options_defaults() {
        let opts = build_options(&SummaryConfig::default());
        assert_eq!(opts.temperature, Some(0.3));
        assert_eq!(opts.max_tokens, None);
    }

    #[test]
    fn single_user_message() {
        let messages = build_messages("Summarise this");
        assert_eq!(messages.len(), 1);
        assert!(matches!(messages[0].role, ChatRole::User));
        assert_eq!(messages[0].content, "Summarise this");
    }

    #[test]
    fn custom_template_is_used() {
        let config = SummaryConfig::builder()
            .prompt_template("Minutes >>> {minutes} <<<")
            .build()
            .unwrap();
        assert_eq!(prompt_for("x", &config), "Minutes >>> x <<<");
    }

    #[tokio::test]
    async fn returns_answer() {
        let provider = MockProvider::new();
        provider.add_response("| A |\n| 1 |").await;
        let response = summarize(&provider, "prompt", &SummaryConfig::default())
            .await
            .unwrap();
        assert_eq!(response.content, "| A |\n| 1 |");
    }

    #[tokio::test]
    async fn blank_answer_is_error() {
        let provider = MockProvider::new();
        provider.add_response("  \n ").await;
        let err = summarize(&provider, "p", &SummaryConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::EmptyResponse));
    }

    #[tokio::test]
    async fn provider_errors_are_mapped() {
        let auth = Failing(|| LlmError::AuthError("bad key".into()));
        let err = summarize(&auth, "p", &SummaryConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::AuthError { .. }));

        let network = Failing(|| LlmError::NetworkError("connection reset".into()));
        let err = summarize(&network, "p", &SummaryConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SummaryError::LlmApiError { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_answer_times_out() {
        let provider = Slow(Duration::from_secs(30));
        let config = SummaryConfig::builder().api_timeout_secs(5).build().unwrap();
        let err = summarize(&provider, "p", &config).await.unwrap_err();
        assert!(matches!(err, SummaryError::ApiTimeout { secs: 5 }));
    }
}
