use super::{LLMError, LLMProvider, Message, OutputFormat};
use crate::config::GeminiConfig;
use crate::secrets::ApiKey;
use async_trait::async_trait;
use serde_json::json;

pub struct GeminiProvider {
    config: GeminiConfig,
    api_key: ApiKey,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig, api_key: ApiKey) -> Self {
        Self {
            config,
            api_key,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

/// Build the `generateContent` request body.
pub(crate) fn build_payload(messages: &[Message], output: &OutputFormat) -> serde_json::Value {
    let contents: Vec<serde_json::Value> = messages
        .iter()
        .map(|msg| {
            json!({
                "role": msg.role.to_string(),
                "parts": [{"text": msg.content}]
            })
        })
        .collect();

    let mut generation_config = serde_json::Map::new();
    generation_config.insert("responseMimeType".to_string(), json!(output.mime_type));
    if let Some(schema) = &output.schema {
        generation_config.insert("responseSchema".to_string(), schema.clone());
    }

    json!({
        "contents": contents,
        "generationConfig": generation_config,
    })
}

/// Concatenate the text parts of the first candidate.
pub(crate) fn extract_text(data: &serde_json::Value) -> super::Result<String> {
    let candidate = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .ok_or_else(|| LLMError::ParseError("No candidates in response".to_string()))?;

    let content_item = candidate
        .get("content")
        .ok_or_else(|| LLMError::ParseError("No content in candidate".to_string()))?;

    let parts = content_item
        .get("parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| LLMError::ParseError("No parts in candidate content".to_string()))?;

    let mut full_text = String::new();
    for part in parts {
        if let Some(text) = part.get("text").and_then(|t| t.as_str()) {
            full_text.push_str(text);
        }
    }

    if full_text.is_empty() {
        return Err(LLMError::ParseError("Candidate has no text".to_string()));
    }

    Ok(full_text)
}

#[async_trait]
impl LLMProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, messages: &[Message], output: &OutputFormat) -> super::Result<String> {
        let payload = build_payload(messages, output);

        tracing::debug!(
            model = %self.config.model,
            messages = messages.len(),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.expose())
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| LLMError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            if status.as_u16() == 400 || status.as_u16() == 404 {
                return Err(LLMError::InvalidRequest(text));
            } else if status.as_u16() == 429 {
                return Err(LLMError::RateLimitExceeded);
            } else if status.as_u16() == 401 || status.as_u16() == 403 {
                return Err(LLMError::AuthenticationFailed(text));
            } else {
                return Err(LLMError::ProviderUnavailable(format!(
                    "Gemini API error ({}): {}",
                    status, text
                )));
            }
        }

        let data: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LLMError::ParseError(e.to_string()))?;

        extract_text(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmReply;

    #[test]
    fn test_payload_maps_roles_and_output() {
        let messages = vec![Message::user("Hi"), Message::model("{}"), Message::user("Q")];
        let payload = build_payload(&messages, &LlmReply::output_format());

        let contents = payload["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[2]["parts"][0]["text"], "Q");

        let gen = &payload["generationConfig"];
        assert_eq!(gen["responseMimeType"], "application/json");
        assert_eq!(gen["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_payload_without_schema() {
        let payload = build_payload(&[Message::user("Hi")], &OutputFormat::text());
        assert!(payload["generationConfig"].get("responseSchema").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let data = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "{\"status\":"}, {"text": "\"x\"}"}]}
            }]
        });
        assert_eq!(extract_text(&data).unwrap(), "{\"status\":\"x\"}");
    }

    #[test]
    fn test_extract_text_errors() {
        assert!(matches!(
            extract_text(&json!({"candidates": []})),
            Err(LLMError::ParseError(_))
        ));
        assert!(matches!(
            extract_text(&json!({"candidates": [{"content": {"parts": []}}]})),
            Err(LLMError::ParseError(_))
        ));
    }
}
