//! Platform-independent core of the embeddable chat widget.
//!
//! Owns the conversation state and the send/receive contract; rendering
//! and HTTP are behind the [`MessageSink`] and [`ChatTransport`] seams so
//! the controller is testable without a browser.

mod config;
mod controller;
mod message;
mod transport;

pub use config::{
    API_URL_ATTR, ConfigError, ConfigResult, MESSAGE_PATH, SCRIPT_SUFFIX, STYLESHEET_SUFFIX,
    WidgetConfig, stylesheet_href,
};
pub use controller::{
    FALLBACK_REPLY, MessageSink, NETWORK_ERROR_REPLY, SubmitOutcome, WidgetController,
};
pub use message::{ConversationEntry, ConversationLog, Role, SessionId};
pub use transport::{
    ChatRequest, ChatTransport, LocalBoxFuture, ReplyPayload, TransportError, TransportResult,
};
