//! Provider construction from configuration.

use std::sync::Arc;
use mcplink_config::LlmConfig;
use mcplink_core::error::ProviderError;
use mcplink_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the configured provider.
///
/// Hosted backends need an API key; local servers (Ollama, vLLM, llama.cpp)
/// accept any. Unknown provider names need an explicit `api_url`.
pub fn build_provider(config: &LlmConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.provider.as_str();
    let base_url = config
        .api_url
        .clone()
        .or_else(|| default_base_url(name).map(String::from))
        .ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "unknown provider '{name}': set llm.api_url to its OpenAI-compatible endpoint"
            ))
        })?;

    let api_key = match (&config.api_key, is_local(name)) {
        (Some(key), _) => key.clone(),
        (None, true) => name.to_string(),
        (None, false) if config.api_url.is_some() => String::new(),
        (None, false) => {
            return Err(ProviderError::NotConfigured(format!(
                "no API key for provider '{name}': set llm.api_key or MCPLINK_API_KEY"
            )));
        }
    };

    tracing::debug!(provider = name, base_url = %base_url, model = %config.model, "Building provider");
    Ok(Arc::new(OpenAiCompatProvider::new(name, base_url, api_key)?))
}

fn is_local(provider_name: &str) -> bool {
    matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
pub fn default_base_url(provider_name: &str) -> Option<&'static str> {
    let url = match provider_name {
        "openai" => "https://api.openai.com/v1",
        "openrouter" => "https://openrouter.ai/api/v1",
        "anthropic" => "https://api.anthropic.com/v1",
        "ollama" => "http://localhost:11434/v1",
        "deepseek" => "https://api.deepseek.com/v1",
        "groq" => "https://api.groq.com/openai/v1",
        "together" => "https://api.together.xyz/v1",
        "fireworks" => "https://api.fireworks.ai/inference/v1",
        "vllm" => "http://localhost:8000/v1",
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1",
        _ => return None,
    };
    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openrouter").unwrap().contains("openrouter.ai"));
        assert!(default_base_url("openai").unwrap().contains("api.openai.com"));
        assert!(default_base_url("ollama").unwrap().contains("localhost:11434"));
        assert!(default_base_url("mystery").is_none());
    }

    #[test]
    fn hosted_provider_needs_key() {
        let config = LlmConfig::default();
        let err = build_provider(&config).err().unwrap();
        assert!(err.to_string().contains("no API key"));
    }

    #[test]
    fn hosted_provider_with_key() {
        let config = LlmConfig {
            api_key: Some("sk-test".into()),
            ..LlmConfig::default()
        };
        let provider = build_provider(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn local_provider_without_key() {
        let config = LlmConfig {
            provider: "ollama".into(),
            ..LlmConfig::default()
        };
        assert!(build_provider(&config).is_ok());
    }

    #[test]
    fn unknown_provider_needs_url() {
        let mut config = LlmConfig {
            provider: "inhouse".into(),
            ..LlmConfig::default()
        };
        assert!(build_provider(&config).is_err());

        config.api_url = Some("http://10.0.0.5:9000/v1".into());
        assert_eq!(build_provider(&config).unwrap().name(), "inhouse");
    }
}
