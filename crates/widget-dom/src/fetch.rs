use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use widget_core::{
    ChatRequest, ChatTransport, LocalBoxFuture, ReplyPayload, TransportError, TransportResult,
};

/// Human-readable rendering of a thrown JS value for error context.
fn js_details(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// [`ChatTransport`] over the browser Fetch API.
///
/// One `POST` per send, JSON in and out. No timeout, no retry, no
/// cancellation; whatever the browser's fetch defaults impose is what
/// applies. The HTTP status is deliberately not inspected: an error page
/// that still parses as JSON without a `reply` field falls back to the
/// apology string, anything unparsable becomes a transport error.
pub struct FetchTransport {
    endpoint: String,
}

impl FetchTransport {
    /// `endpoint` is the full message URL, base normalization already done
    /// by [`widget_core::WidgetConfig`].
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn post(&self, request: &ChatRequest) -> TransportResult<ReplyPayload> {
        let body = serde_json::to_string(request).map_err(|source| {
            TransportError::SerializeRequest {
                stage: "serialize-chat-request",
                source,
            }
        })?;

        let headers = Headers::new().map_err(|error| TransportError::BuildRequest {
            stage: "build-headers",
            details: js_details(&error),
        })?;
        headers
            .set("Content-Type", "application/json")
            .map_err(|error| TransportError::BuildRequest {
                stage: "set-content-type",
                details: js_details(&error),
            })?;

        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(headers.as_ref());
        init.set_body(&JsValue::from_str(&body));

        let fetch_request = Request::new_with_str_and_init(&self.endpoint, &init).map_err(
            |error| TransportError::BuildRequest {
                stage: "build-fetch-request",
                details: js_details(&error),
            },
        )?;

        let window = web_sys::window().ok_or_else(|| TransportError::RequestFailed {
            stage: "fetch",
            details: "no window object available".to_string(),
        })?;

        let response_value = JsFuture::from(window.fetch_with_request(&fetch_request))
            .await
            .map_err(|error| TransportError::RequestFailed {
                stage: "fetch",
                details: js_details(&error),
            })?;
        let response: Response =
            response_value
                .dyn_into()
                .map_err(|error| TransportError::RequestFailed {
                    stage: "fetch-response-cast",
                    details: js_details(&error),
                })?;

        let text_promise = response.text().map_err(|error| TransportError::ReadBody {
            stage: "response-text",
            details: js_details(&error),
        })?;
        let text_value = JsFuture::from(text_promise)
            .await
            .map_err(|error| TransportError::ReadBody {
                stage: "response-text-await",
                details: js_details(&error),
            })?;
        let body_text = text_value
            .as_string()
            .ok_or_else(|| TransportError::ReadBody {
                stage: "response-text-cast",
                details: "response body was not a string".to_string(),
            })?;

        ReplyPayload::from_json_str(&body_text)
    }
}

impl ChatTransport for FetchTransport {
    fn send<'a>(
        &'a self,
        request: &'a ChatRequest,
    ) -> LocalBoxFuture<'a, TransportResult<ReplyPayload>> {
        Box::pin(self.post(request))
    }
}
