use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outgoing chat-completion body as forwarded to the downstream provider.
///
/// Only the fields the relay touches are typed; everything else the client
/// sent (messages, sampling parameters, vendor extensions) rides along in
/// `rest` untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatPayload {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Provider credential. Clients may set this themselves via the request
    /// body; otherwise the relay fills it in at pre-dispatch time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl ChatPayload {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            stream: None,
            api_key: None,
            rest: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_client_fields_round_trip() {
        let body = json!({
            "model": "gpt-4o",
            "messages": [{"role": "user", "content": "hi"}],
            "temperature": 0.7,
        });
        let payload: ChatPayload = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(payload.model, "gpt-4o");
        assert!(payload.rest.contains_key("messages"));

        let out = serde_json::to_value(&payload).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn absent_api_key_is_not_serialized() {
        let payload = ChatPayload::new("gpt-4o");
        let out = serde_json::to_value(&payload).unwrap();
        assert!(out.get("api_key").is_none());
        assert!(out.get("stream").is_none());
    }
}
