use std::future::Future;
use std::pin::Pin;

use serde::Serialize;
use snafu::{ResultExt as _, Snafu};

use crate::message::SessionId;

/// JSON body posted to `{apiUrl}/chat/message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

impl ChatRequest {
    pub fn new(session: &SessionId, message: impl Into<String>) -> Self {
        Self {
            user_id: session.as_str().to_string(),
            message: message.into(),
        }
    }
}

/// Reply extracted from the chat endpoint's JSON response.
///
/// `reply` is `None` for any well-formed JSON body without a non-empty
/// `reply` string field; that is a soft failure the controller maps to a
/// fixed fallback string, not a transport error. Only a body that is not
/// JSON at all becomes a [`TransportError`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplyPayload {
    pub reply: Option<String>,
}

impl ReplyPayload {
    /// Parses a raw response body. Fails only on invalid JSON.
    pub fn from_json_str(body: &str) -> TransportResult<Self> {
        let value: serde_json::Value = serde_json::from_str(body).context(ParseBodySnafu {
            stage: "parse-reply-body",
        })?;
        Ok(Self::from_value(&value))
    }

    /// Lenient extraction: any shape is accepted, only a non-empty string
    /// under the `reply` key counts as a reply.
    pub fn from_value(value: &serde_json::Value) -> Self {
        let reply = value
            .get("reply")
            .and_then(serde_json::Value::as_str)
            .filter(|reply| !reply.is_empty())
            .map(str::to_string);
        Self { reply }
    }
}

/// Future type for transport implementations.
///
/// Not `Send`: browser futures are bound to the single-threaded event loop.
pub type LocalBoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

pub type TransportResult<T> = Result<T, TransportError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum TransportError {
    #[snafu(display("failed to serialize request body: {source}"))]
    SerializeRequest {
        stage: &'static str,
        source: serde_json::Error,
    },
    #[snafu(display("failed to build HTTP request: {details}"))]
    BuildRequest {
        stage: &'static str,
        details: String,
    },
    #[snafu(display("network request failed: {details}"))]
    RequestFailed {
        stage: &'static str,
        details: String,
    },
    #[snafu(display("failed to read response body: {details}"))]
    ReadBody {
        stage: &'static str,
        details: String,
    },
    #[snafu(display("failed to parse response body as JSON: {source}"))]
    ParseBody {
        stage: &'static str,
        source: serde_json::Error,
    },
}

/// Seam between the controller and the HTTP layer.
///
/// One call per user send; no retries, no timeout beyond whatever the
/// underlying transport imposes, no cancellation once started.
pub trait ChatTransport {
    fn send<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> LocalBoxFuture<'a, TransportResult<ReplyPayload>>;
}

/// Transports are shared between the controller and in-flight sends.
impl<T: ChatTransport + ?Sized> ChatTransport for std::rc::Rc<T> {
    fn send<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> LocalBoxFuture<'a, TransportResult<ReplyPayload>> {
        (**self).send(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_shape_matches_wire_contract() {
        let session = SessionId::new("web_abc123").unwrap();
        let request = ChatRequest::new(&session, "hello");
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"user_id": "web_abc123", "message": "hello"})
        );
    }

    #[test]
    fn reply_payload_tolerates_missing_field() {
        let payload = ReplyPayload::from_json_str("{}").unwrap();
        assert_eq!(payload.reply, None);

        let payload = ReplyPayload::from_json_str(r#"{"reply": "Hello!"}"#).unwrap();
        assert_eq!(payload.reply.as_deref(), Some("Hello!"));
    }

    #[test]
    fn reply_payload_ignores_extra_fields() {
        let payload = ReplyPayload::from_json_str(r#"{"reply": "ok", "handoff": true}"#).unwrap();
        assert_eq!(payload.reply.as_deref(), Some("ok"));
    }

    #[test]
    fn reply_payload_treats_unexpected_shapes_as_missing() {
        // Arrays, scalars, and non-string reply values are soft failures.
        assert_eq!(ReplyPayload::from_json_str("[1, 2]").unwrap().reply, None);
        assert_eq!(ReplyPayload::from_json_str("42").unwrap().reply, None);
        assert_eq!(
            ReplyPayload::from_json_str(r#"{"reply": 7}"#).unwrap().reply,
            None
        );
    }

    #[test]
    fn reply_payload_treats_empty_reply_as_missing() {
        assert_eq!(
            ReplyPayload::from_json_str(r#"{"reply": ""}"#).unwrap().reply,
            None
        );
    }

    #[test]
    fn invalid_json_is_a_transport_error() {
        assert!(matches!(
            ReplyPayload::from_json_str("not json"),
            Err(TransportError::ParseBody { .. })
        ));
    }
}
