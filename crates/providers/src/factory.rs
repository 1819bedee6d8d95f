//! Builds the configured text generator.

use std::sync::Arc;
use std::time::Duration;
use ironlog_config::AppConfig;
use ironlog_core::error::ProviderError;
use ironlog_core::provider::Provider;
use crate::openai_compat::OpenAiCompatProvider;

/// Build the provider named in `[provider]`.
///
/// Local endpoints (ollama, vllm, llamacpp) run without an API key; everything
/// else requires one.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let name = config.provider.name.as_str();
    let api_key = match (&config.api_key, requires_key(name)) {
        (Some(key), _) => key.clone(),
        (None, false) => String::new(),
        (None, true) => {
            return Err(ProviderError::NotConfigured(format!(
                "provider '{name}' needs an API key (set OPENAI_API_KEY)"
            )));
        }
    };

    let base_url = if config.provider.api_url == ironlog_config::ProviderConfig::default().api_url {
        default_base_url(name)
    } else {
        config.provider.api_url.clone()
    };

    let provider = OpenAiCompatProvider::with_timeout(
        name,
        base_url,
        api_key,
        Duration::from_secs(config.provider.request_timeout_secs),
    )?;
    Ok(Arc::new(provider))
}

fn requires_key(provider_name: &str) -> bool {
    !matches!(provider_name, "ollama" | "vllm" | "llamacpp" | "llama.cpp")
}

/// Get the default base URL for well-known providers.
fn default_base_url(provider_name: &str) -> String {
    match provider_name {
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        "groq" => "https://api.groq.com/openai/v1".into(),
        "vllm" => "http://localhost:8000/v1".into(),
        "llamacpp" | "llama.cpp" => "http://localhost:8080/v1".into(),
        _ => "https://api.openai.com/v1".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_base_urls() {
        assert!(default_base_url("openrouter").contains("openrouter.ai"));
        assert!(default_base_url("openai").contains("api.openai.com"));
        assert!(default_base_url("ollama").contains("localhost:11434"));
    }

    #[test]
    fn missing_key_is_reported() {
        let config = AppConfig::default();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn build_with_key() {
        let config = AppConfig {
            api_key: Some("sk-test".into()),
            ..AppConfig::default()
        };
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn local_provider_needs_no_key() {
        let mut config = AppConfig::default();
        config.provider.name = "ollama".into();
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "ollama");
    }
}
