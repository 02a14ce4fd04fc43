//! LLM Client
//!
//! Schema-constrained structured generation against an OpenAI-compatible
//! chat-completions endpoint: prompt in, JSON object out.

use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::config::LlmConfig;

/// Errors from LLM invocation
#[derive(Debug, Clone, PartialEq)]
pub enum AiError {
    NotConfigured,
    Http(String),
    BadResponse(String),
    SchemaMismatch(String),
}

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiError::NotConfigured => write!(f, "AI is not configured: set an API key first"),
            AiError::Http(msg) => write!(f, "AI request failed: {}", msg),
            AiError::BadResponse(msg) => write!(f, "AI returned an unusable response: {}", msg),
            AiError::SchemaMismatch(msg) => write!(f, "AI response does not match schema: {}", msg),
        }
    }
}

impl std::error::Error for AiError {}

/// Request body for one structured completion
pub fn request_body(model: &str, prompt: &str, schema: &Value) -> Value {
    json!({
        "model": model,
        "messages": [{ "role": "user", "content": prompt }],
        "response_format": {
            "type": "json_schema",
            "json_schema": { "name": "response", "schema": schema },
        },
    })
}

/// Pull the JSON object out of a chat-completions response and check the
/// schema's top-level `required` keys
pub fn extract_object(response: &Value, schema: &Value) -> Result<Map<String, Value>, AiError> {
    let content = response
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| AiError::BadResponse("no message content".to_string()))?;

    let parsed: Value = serde_json::from_str(content.trim())
        .map_err(|e| AiError::BadResponse(format!("content is not JSON: {}", e)))?;
    let Value::Object(object) = parsed else {
        return Err(AiError::BadResponse("content is not a JSON object".to_string()));
    };

    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        let missing: Vec<&str> = required
            .iter()
            .filter_map(Value::as_str)
            .filter(|key| !object.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(AiError::SchemaMismatch(format!("missing {}", missing.join(", "))));
        }
    }
    Ok(object)
}

/// HTTP client bound to one endpoint configuration
pub struct LlmClient {
    http: reqwest::Client,
    config: LlmConfig,
}

impl LlmClient {
    pub fn new(config: LlmConfig) -> Result<Self, AiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| AiError::Http(e.to_string()))?;
        Ok(Self { http, config })
    }

    pub async fn invoke(&self, prompt: &str, schema: &Value) -> Result<Map<String, Value>, AiError> {
        let api_key = match self.config.api_key.as_deref() {
            Some(key) if self.config.is_configured() => key,
            _ => return Err(AiError::NotConfigured),
        };

        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));
        log::info!("LLM request to {} ({} prompt chars)", url, prompt.len());

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(&request_body(&self.config.model, prompt, schema))
            .send()
            .await
            .map_err(|e| AiError::Http(e.to_string()))?
            .error_for_status()
            .map_err(|e| AiError::Http(e.to_string()))?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| AiError::BadResponse(e.to_string()))?;
        extract_object(&body, schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completion(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    fn schema() -> Value {
        json!({"type": "object", "properties": {"milestones": {"type": "array"}}, "required": ["milestones"]})
    }

    #[test]
    fn test_request_body_shape() {
        let body = request_body("gpt-test", "hello", &schema());
        assert_eq!(body["model"], "gpt-test");
        assert_eq!(body["messages"][0]["content"], "hello");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["schema"], schema());
    }

    #[test]
    fn test_extract_object() {
        let object = extract_object(&completion(r#"{"milestones": ["a", "b"]}"#), &schema()).unwrap();
        assert_eq!(object["milestones"], json!(["a", "b"]));
    }

    #[test]
    fn test_extract_rejects_bad_content() {
        assert!(matches!(
            extract_object(&json!({"choices": []}), &schema()),
            Err(AiError::BadResponse(_))
        ));
        assert!(matches!(
            extract_object(&completion("not json"), &schema()),
            Err(AiError::BadResponse(_))
        ));
        assert!(matches!(
            extract_object(&completion("[1, 2]"), &schema()),
            Err(AiError::BadResponse(_))
        ));
        assert_eq!(
            extract_object(&completion(r#"{"steps": []}"#), &schema()),
            Err(AiError::SchemaMismatch("missing milestones".to_string()))
        );
    }

    #[tokio::test]
    async fn test_unconfigured_client_does_not_call_out() {
        let client = LlmClient::new(LlmConfig::default()).unwrap();
        assert_eq!(client.invoke("hi", &schema()).await, Err(AiError::NotConfigured));
    }
}
