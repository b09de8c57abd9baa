use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const FIELD_CONTENT: &str = "content";
pub const FIELD_PLATFORM: &str = "platform";
pub const FIELD_SENTIMENT_SCORE: &str = "sentiment_score";
pub const FIELD_ALERT: &str = "alert";
pub const FIELD_ALERT_TYPE: &str = "alert_type";
pub const FIELD_ERROR: &str = "error";

/// One social media post event flowing through the pipeline.
///
/// Carries the producer's JSON object opaquely; enrichment adds fields
/// in place and never removes the original ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Post {
    fields: Map<String, Value>,
}

impl Post {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Parse a post from a JSON datagram. Rejects anything that is not
    /// a JSON object.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Post text, empty if the producer omitted it.
    pub fn content(&self) -> &str {
        self.fields
            .get(FIELD_CONTENT)
            .and_then(Value::as_str)
            .unwrap_or("")
    }

    /// Originating platform identifier, `"unknown"` if absent.
    pub fn platform(&self) -> &str {
        self.fields
            .get(FIELD_PLATFORM)
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn sentiment_score(&self) -> Option<f64> {
        self.fields.get(FIELD_SENTIMENT_SCORE).and_then(Value::as_f64)
    }

    pub fn alert(&self) -> Option<bool> {
        self.fields.get(FIELD_ALERT).and_then(Value::as_bool)
    }

    pub fn alert_type(&self) -> Option<&str> {
        self.fields.get(FIELD_ALERT_TYPE).and_then(Value::as_str)
    }

    pub fn error(&self) -> Option<&str> {
        self.fields.get(FIELD_ERROR).and_then(Value::as_str)
    }

    pub fn set_sentiment_score(&mut self, score: f64) {
        self.fields
            .insert(FIELD_SENTIMENT_SCORE.to_string(), score.into());
    }

    pub fn set_alert(&mut self, alert: bool) {
        self.fields.insert(FIELD_ALERT.to_string(), alert.into());
    }

    pub fn set_alert_type(&mut self, kind: &str) {
        self.fields.insert(FIELD_ALERT_TYPE.to_string(), kind.into());
    }

    pub fn set_error(&mut self, description: &str) {
        self.fields.insert(FIELD_ERROR.to_string(), description.into());
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post_from_json(value: Value) -> Post {
        match value {
            Value::Object(map) => Post::new(map),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_content_and_platform_defaults() {
        let post = Post::default();
        assert_eq!(post.content(), "");
        assert_eq!(post.platform(), "unknown");
    }

    #[test]
    fn test_enrichment_preserves_original_fields() {
        let mut post = post_from_json(json!({
            "content": "hello",
            "platform": "mastodon",
            "author": "someone",
        }));

        post.set_sentiment_score(0.5);
        post.set_alert(true);
        post.set_alert_type("rapid_sentiment_change");

        assert_eq!(post.content(), "hello");
        assert_eq!(post.get("author"), Some(&json!("someone")));
        assert_eq!(post.sentiment_score(), Some(0.5));
        assert_eq!(post.alert(), Some(true));
        assert_eq!(post.alert_type(), Some("rapid_sentiment_change"));
    }

    #[test]
    fn test_from_bytes_rejects_non_object() {
        assert!(Post::from_bytes(b"[1, 2, 3]").is_err());
        assert!(Post::from_bytes(b"not json").is_err());
        assert!(Post::from_bytes(b"{\"content\": \"ok\"}").is_ok());
    }

    #[test]
    fn test_roundtrip() {
        let post = post_from_json(json!({"content": "x", "id": 7}));
        let bytes = post.to_bytes().unwrap();
        let parsed = Post::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, post);
    }
}
