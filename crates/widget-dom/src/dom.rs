use std::cell::RefCell;

use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use web_sys::{Document, HtmlElement, HtmlInputElement};

use widget_core::{MessageSink, Role};

/// Creates an element with the given class; empty class is skipped.
fn create(document: &Document, tag: &str, class_name: &str) -> Result<HtmlElement, JsValue> {
    let node = document.create_element(tag)?.dyn_into::<HtmlElement>()?;
    if !class_name.is_empty() {
        node.set_class_name(class_name);
    }
    Ok(node)
}

/// Creates an element with class and text content.
fn create_with_text(
    document: &Document,
    tag: &str,
    class_name: &str,
    text: &str,
) -> Result<HtmlElement, JsValue> {
    let node = create(document, tag, class_name)?;
    node.set_text_content(Some(text));
    Ok(node)
}

/// The widget's injected element tree.
///
/// A floating toggle button plus a panel holding the header, the scrolling
/// transcript body, and the input row. The panel starts hidden; the
/// stylesheet keeps it `display: none` until the first toggle.
pub struct WidgetDom {
    pub button: HtmlElement,
    pub panel: HtmlElement,
    pub body: HtmlElement,
    pub input: HtmlInputElement,
    pub send: HtmlElement,
}

impl WidgetDom {
    /// Builds the element tree and appends it to the page body.
    pub fn build(document: &Document) -> Result<Self, JsValue> {
        let button = create_with_text(document, "button", "wa-widget-button", "Chat")?;
        let panel = create(document, "div", "wa-widget-panel")?;
        let header = create_with_text(document, "div", "wa-widget-header", "Customer Support")?;
        let body = create(document, "div", "wa-widget-body")?;
        let input_wrap = create(document, "div", "wa-widget-input-wrap")?;
        let input = create(document, "input", "wa-widget-input")?
            .dyn_into::<HtmlInputElement>()?;
        let send = create_with_text(document, "button", "wa-widget-send", "Send")?;

        input.set_type("text");
        input.set_placeholder("Type your message...");

        panel.append_child(&header)?;
        panel.append_child(&body)?;
        input_wrap.append_child(&input)?;
        input_wrap.append_child(&send)?;
        panel.append_child(&input_wrap)?;

        let page_body = document
            .body()
            .ok_or_else(|| JsValue::from_str("document has no body"))?;
        page_body.append_child(&button)?;
        page_body.append_child(&panel)?;

        Ok(Self {
            button,
            panel,
            body,
            input,
            send,
        })
    }
}

/// Concrete [`MessageSink`] that renders chat bubbles into the panel body.
///
/// Sink methods cannot surface DOM failures through the controller seam,
/// so they log and continue; a failed append leaves the widget usable.
pub struct DomSink {
    document: Document,
    panel: HtmlElement,
    body: HtmlElement,
    input: HtmlInputElement,
    /// Typing indicators currently on screen, in insertion order. With
    /// overlapping sends each completion removes one indicator; which one
    /// is immaterial, they are visually identical.
    pending: RefCell<Vec<HtmlElement>>,
}

impl DomSink {
    pub fn new(document: Document, dom: &WidgetDom) -> Self {
        Self {
            document,
            panel: dom.panel.clone(),
            body: dom.body.clone(),
            input: dom.input.clone(),
            pending: RefCell::new(Vec::new()),
        }
    }

    fn scroll_to_bottom(&self) {
        self.body.set_scroll_top(self.body.scroll_height());
    }

    /// Builds one bubble row: outer wrap carries the role class, inner
    /// node carries the bubble styling.
    fn bubble(&self, role_class: &str, text: Option<&str>) -> Result<HtmlElement, JsValue> {
        let wrap = create(
            &self.document,
            "div",
            &format!("wa-widget-msg-wrap {role_class}"),
        )?;
        let bubble = match text {
            Some(text) => create_with_text(&self.document, "div", "wa-widget-msg", text)?,
            None => {
                let node = create(&self.document, "div", "wa-widget-msg wa-widget-typing")?;
                node.set_inner_html("<span></span><span></span><span></span>");
                node
            }
        };
        wrap.append_child(&bubble)?;
        Ok(wrap)
    }

    fn append_bubble(&self, role_class: &str, text: Option<&str>) -> Option<HtmlElement> {
        let appended = self
            .bubble(role_class, text)
            .and_then(|wrap| self.body.append_child(&wrap).map(|_| wrap));
        match appended {
            Ok(wrap) => {
                self.scroll_to_bottom();
                Some(wrap)
            }
            Err(error) => {
                log::warn!("failed to render chat bubble: {error:?}");
                None
            }
        }
    }
}

impl MessageSink for DomSink {
    fn render(&self, role: Role, text: &str) {
        self.append_bubble(role.as_str(), Some(text));
    }

    fn show_pending(&self) {
        if let Some(wrap) = self.append_bubble(Role::Bot.as_str(), None) {
            self.pending.borrow_mut().push(wrap);
        }
    }

    fn clear_pending(&self) {
        if let Some(wrap) = self.pending.borrow_mut().pop() {
            wrap.remove();
        }
    }

    fn clear_input(&self) {
        self.input.set_value("");
    }

    fn set_open(&self, open: bool) {
        let display = if open { "flex" } else { "none" };
        if let Err(error) = self.panel.style().set_property("display", display) {
            log::warn!("failed to toggle chat panel: {error:?}");
        }
    }
}
