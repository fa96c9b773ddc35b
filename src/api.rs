use anyhow::{anyhow, Result};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use tracing::error;

/// Deployed chatbot backend; override with `--api-url` or the config file.
pub const DEFAULT_BASE_URL: &str = "http://20.197.44.114";

/// Shown when a reply carries none of the known answer fields.
pub const NO_REPLY_FALLBACK: &str = "I received your message but couldn't generate a response.";

#[derive(Serialize)]
struct ChatRequest<'a> {
    query: &'a str,
}

#[derive(Clone)]
pub struct ChatApi {
    client: Client,
    base_url: String,
}

impl ChatApi {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Send one user message and return the reply body verbatim.
    ///
    /// The backend's response shape is not validated here; callers probe it
    /// with [`extract_reply`]. The caller is also responsible for trimming
    /// and rejecting empty input before calling.
    pub async fn send_message(&self, query: &str) -> Result<Value> {
        self.post_chat(query)
            .await
            .inspect_err(|err| error!("error sending message to API: {err:#}"))
    }

    async fn post_chat(&self, query: &str) -> Result<Value> {
        let url = format!("{}/chat/post", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&ChatRequest { query })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("API responded with status: {}", response.status()));
        }

        let body: Value = response.json().await?;
        Ok(body)
    }

    /// Upload a document for the backend to index.
    ///
    /// Standalone capability, not wired into the chat flow; the `upload`
    /// subcommand is its caller. Same contract as [`Self::send_message`]:
    /// parsed JSON on success, an error value on any failure.
    pub async fn upload_document(&self, path: &Path) -> Result<Value> {
        self.post_document(path)
            .await
            .inspect_err(|err| error!("error uploading document: {err:#}"))
    }

    async fn post_document(&self, path: &Path) -> Result<Value> {
        let url = format!("{}/documents/upload_and_process_document", self.base_url);

        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document")
            .to_string();

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name));

        let response = self.client.post(&url).multipart(form).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Upload failed with status: {}", response.status()));
        }

        let body: Value = response.json().await?;
        Ok(body)
    }
}

/// Pull a displayable reply out of an arbitrary response body.
///
/// The backend has been seen to answer under several field names; probe
/// them in order, then the nested `data.response` shape. Only non-empty
/// strings count.
pub fn extract_reply(body: &Value) -> Option<String> {
    ["response", "content", "message"]
        .iter()
        .find_map(|field| non_empty_str(body.get(field)))
        .or_else(|| non_empty_str(body.get("data").and_then(|data| data.get("response"))))
}

/// A non-empty string under `error` marks the reply as a failure report.
pub fn extract_error(body: &Value) -> Option<String> {
    non_empty_str(body.get("error"))
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_reply_response_field() {
        assert_eq!(extract_reply(&json!({"response": "hi"})), Some("hi".to_string()));
    }

    #[test]
    fn test_extract_reply_field_priority() {
        let body = json!({"content": "from content", "message": "from message"});
        assert_eq!(extract_reply(&body), Some("from content".to_string()));
    }

    #[test]
    fn test_extract_reply_message_field() {
        assert_eq!(
            extract_reply(&json!({"message": "hello"})),
            Some("hello".to_string())
        );
    }

    #[test]
    fn test_extract_reply_nested_data_response() {
        let body = json!({"data": {"response": "hi2"}});
        assert_eq!(extract_reply(&body), Some("hi2".to_string()));
    }

    #[test]
    fn test_extract_reply_skips_empty_strings() {
        let body = json!({"response": "", "data": {"response": "nested"}});
        assert_eq!(extract_reply(&body), Some("nested".to_string()));
    }

    #[test]
    fn test_extract_reply_none_for_unrecognized_shape() {
        assert_eq!(extract_reply(&json!({})), None);
        assert_eq!(extract_reply(&json!({"response": 42})), None);
    }

    #[test]
    fn test_extract_error_string() {
        assert_eq!(
            extract_error(&json!({"error": "backend down"})),
            Some("backend down".to_string())
        );
    }

    #[test]
    fn test_extract_error_ignores_non_string_and_empty() {
        assert_eq!(extract_error(&json!({"error": {"code": 500}})), None);
        assert_eq!(extract_error(&json!({"error": ""})), None);
        assert_eq!(extract_error(&json!({"response": "fine"})), None);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let api = ChatApi::new("http://localhost:8000/");
        assert_eq!(api.base_url, "http://localhost:8000");
    }
}
