use crate::config::Config;
use crate::error::GenerationError;
use crate::models::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::recommendation::GenerationService;
use anyhow::anyhow;
use serde_json::Value;
use tracing::debug;
use ureq::Agent;
use urlencoding::encode;

/// A minimal Gemini `generateContent` client with JSON-mode output
pub struct GeminiClient {
    agent: Agent,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Create a new client with configuration from environment
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(config.request_timeout)
            .build();

        GeminiClient {
            agent,
            base_url: config.gemini_base_url.clone(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            encode(&self.model),
            encode(api_key)
        )
    }

    /// Request body for one structured generation
    pub fn build_request(prompt: &str, schema: &Value, system_instruction: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: Some(system_instruction.to_string()),
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema.clone(),
            },
        }
    }
}

impl GenerationService for GeminiClient {
    fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
        system_instruction: &str,
    ) -> Result<String, GenerationError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let body = Self::build_request(prompt, schema, system_instruction);
        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "calling generateContent");

        let response = match self.agent.post(&self.endpoint(api_key)).send_json(&body) {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let detail = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(GenerationError::Service(anyhow!(
                    "API error {}: {}",
                    code,
                    detail
                )));
            }
            Err(e) => {
                return Err(GenerationError::Service(anyhow!("HTTP request failed: {}", e)));
            }
        };

        let response_text = response
            .into_string()
            .map_err(|e| GenerationError::Service(anyhow!("Failed to read response: {}", e)))?;
        let parsed: GenerateContentResponse = serde_json::from_str(&response_text)
            .map_err(|e| GenerationError::Service(anyhow!("Failed to parse API response: {}", e)))?;

        if let Some(reason) = parsed.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
            debug!(finish_reason = reason, "generation finished");
        }

        parsed.text().ok_or(GenerationError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommendation::{SYSTEM_INSTRUCTION, response_schema};

    #[test]
    fn test_request_body_uses_json_mode_and_schema() {
        let body = GeminiClient::build_request("prompt", &response_schema(), SYSTEM_INSTRUCTION);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], SYSTEM_INSTRUCTION);
        assert!(json["systemInstruction"].get("role").is_none());
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(json["generationConfig"]["responseSchema"], response_schema());
    }

    #[test]
    fn test_missing_api_key_fails_before_any_request() {
        let client = GeminiClient::new(&Config::default());
        let result = client.generate_structured("prompt", &response_schema(), SYSTEM_INSTRUCTION);
        assert!(matches!(result, Err(GenerationError::MissingApiKey)));
    }

    #[test]
    fn test_endpoint_includes_model_and_key() {
        let config = Config {
            gemini_base_url: "https://example.test/v1beta/".to_string(),
            ..Config::default()
        };
        let client = GeminiClient::new(&config);
        assert_eq!(
            client.endpoint("k y"),
            "https://example.test/v1beta/models/gemini-2.5-flash:generateContent?key=k%20y"
        );
    }
}
