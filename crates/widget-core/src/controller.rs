use crate::message::{ConversationLog, Role, SessionId};
use crate::transport::{ChatRequest, ChatTransport, ReplyPayload, TransportResult};

/// Shown when the backend answers with well-formed JSON that has no
/// `reply` field.
pub const FALLBACK_REPLY: &str = "Sorry, I could not process that right now.";

/// Shown when the request or response-body parsing fails.
pub const NETWORK_ERROR_REPLY: &str = "Network error. Please try again.";

/// Rendering seam between the controller and a concrete UI.
///
/// Implementations mutate their own surface (DOM or test buffer), so all
/// methods take `&self`; interior mutability is the implementor's concern.
pub trait MessageSink {
    /// Renders one chat bubble and scrolls the transcript to the bottom.
    fn render(&self, role: Role, text: &str);
    /// Shows the transient typing indicator.
    fn show_pending(&self);
    /// Removes the typing indicator. Must be a no-op when none is shown.
    fn clear_pending(&self);
    /// Clears the text input field.
    fn clear_input(&self);
    /// Applies the panel's open/closed visibility.
    fn set_open(&self, open: bool);
}

/// Sinks are often shared between the controller and event closures.
impl<S: MessageSink + ?Sized> MessageSink for std::rc::Rc<S> {
    fn render(&self, role: Role, text: &str) {
        (**self).render(role, text);
    }

    fn show_pending(&self) {
        (**self).show_pending();
    }

    fn clear_pending(&self) {
        (**self).clear_pending();
    }

    fn clear_input(&self) {
        (**self).clear_input();
    }

    fn set_open(&self, open: bool) {
        (**self).set_open(open);
    }
}

/// Result of one submit operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Input was empty after trimming; nothing happened.
    Ignored,
    /// The exchange completed and this bot text was rendered.
    Replied(String),
}

/// Mediates between input events and the remote chat endpoint.
///
/// Owns the conversation log, the per-page-load session id, and the panel
/// visibility flag. One instance per embedded widget; no ambient global
/// state, so several independent widgets can coexist on a page.
pub struct WidgetController<T, S> {
    session: SessionId,
    log: ConversationLog,
    open: bool,
    transport: T,
    sink: S,
}

impl<T, S> WidgetController<T, S>
where
    T: ChatTransport,
    S: MessageSink,
{
    pub fn new(session: SessionId, transport: T, sink: S) -> Self {
        Self {
            session,
            log: ConversationLog::new(),
            open: false,
            transport,
            sink,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Flips panel visibility and pushes the new state to the sink.
    pub fn toggle_panel(&mut self) -> bool {
        self.open = !self.open;
        self.sink.set_open(self.open);
        self.open
    }

    /// First half of a send: records and renders the user entry, clears
    /// the input, shows the typing indicator, and returns the request to
    /// post. Returns `None` for empty-after-trim input, in which case
    /// nothing was changed and no request must be made.
    ///
    /// Split from [`finish_send`](Self::finish_send) so the event layer
    /// can release its borrow of the controller across the network await;
    /// overlapping sends are permitted and may finish out of order.
    pub fn begin_send(&mut self, raw_input: &str) -> Option<ChatRequest> {
        let text = raw_input.trim();
        if text.is_empty() {
            return None;
        }

        self.log.push(Role::User, text);
        self.sink.render(Role::User, text);
        self.sink.clear_input();
        self.sink.show_pending();

        Some(ChatRequest::new(&self.session, text))
    }

    /// Second half of a send: maps the transport result to the bot text,
    /// removes the typing indicator, and records and renders exactly one
    /// bot entry. Failures never escape; the widget stays usable.
    pub fn finish_send(&mut self, result: TransportResult<ReplyPayload>) -> String {
        let reply = match result {
            Ok(payload) => payload.reply.unwrap_or_else(|| FALLBACK_REPLY.to_string()),
            Err(error) => {
                log::warn!("chat request failed: {error}");
                NETWORK_ERROR_REPLY.to_string()
            }
        };

        self.sink.clear_pending();
        self.log.push(Role::Bot, &reply);
        self.sink.render(Role::Bot, &reply);
        reply
    }

    /// Convenience path running one complete exchange. Holds the
    /// controller for the whole exchange, so sends made through it are
    /// serialized; the event layer uses the begin/finish halves instead.
    pub async fn submit(&mut self, raw_input: &str) -> SubmitOutcome {
        let Some(request) = self.begin_send(raw_input) else {
            return SubmitOutcome::Ignored;
        };

        let result = self.transport.send(&request).await;
        SubmitOutcome::Replied(self.finish_send(result))
    }
}
