//! Embeddable chat widget, compiled to WebAssembly.
//!
//! Host pages load the built script with a `data-api-url` attribute:
//!
//! ```html
//! <script type="module" src="widget.js" data-api-url="https://api.example.com"></script>
//! ```
//!
//! Boot injects the companion stylesheet, builds the floating button and
//! chat panel, and wires input events to the backend chat endpoint. All
//! state lives on one controller instance per widget; nothing global.

mod dom;
mod fetch;

use std::cell::RefCell;
use std::rc::Rc;

use snafu::{OptionExt as _, Snafu};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, HtmlInputElement, HtmlScriptElement, KeyboardEvent};

use widget_core::{
    API_URL_ATTR, ChatTransport as _, ConfigError, SCRIPT_SUFFIX, SessionId, WidgetConfig,
    WidgetController, stylesheet_href,
};

use crate::dom::{DomSink, WidgetDom};
use crate::fetch::FetchTransport;

type Controller = WidgetController<Rc<FetchTransport>, Rc<DomSink>>;

#[derive(Debug, Snafu)]
enum BootError {
    #[snafu(context(false), display("{source}"))]
    Config { source: ConfigError },
    #[snafu(display("DOM operation failed at {stage}: {details}"))]
    Dom { stage: &'static str, details: String },
    #[snafu(display("no {what} available"))]
    MissingGlobal { what: &'static str },
}

type BootResult<T> = Result<T, BootError>;

fn dom_error(stage: &'static str) -> impl FnOnce(JsValue) -> BootError {
    move |value| BootError::Dom {
        stage,
        details: value.as_string().unwrap_or_else(|| format!("{value:?}")),
    }
}

/// Module entry point, run once when the script loads.
///
/// A missing or blank `data-api-url` is a fatal initialization error:
/// it is logged and the widget renders nothing.
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());

    if let Err(error) = boot() {
        log::error!("chat widget failed to initialize: {error}");
    }
}

fn boot() -> BootResult<()> {
    let window = web_sys::window().context(MissingGlobalSnafu { what: "window" })?;
    let document = window
        .document()
        .context(MissingGlobalSnafu { what: "document" })?;

    let script = current_script(&document).context(MissingGlobalSnafu {
        what: "widget script element",
    })?;
    let api_url = script.get_attribute(API_URL_ATTR);
    let config = WidgetConfig::from_attribute(api_url.as_deref())?;

    inject_stylesheet(&document, &script.src());

    let session = SessionId::from_entropy(js_sys::Math::random(), js_sys::Date::now());
    log::debug!("chat widget session {session}");

    let dom = WidgetDom::build(&document).map_err(dom_error("build-widget-dom"))?;
    let sink = Rc::new(DomSink::new(document, &dom));
    let transport = Rc::new(FetchTransport::new(config.message_endpoint()));
    let controller = Rc::new(RefCell::new(Controller::new(session, transport, sink)));

    wire_events(&controller, &dom)
}

/// Finds the `<script>` element loading this widget. Falls back to a src
/// query when `document.currentScript` is unavailable (module scripts).
fn current_script(document: &Document) -> Option<HtmlScriptElement> {
    if let Some(script) = document
        .current_script()
        .and_then(|element| element.dyn_into::<HtmlScriptElement>().ok())
    {
        return Some(script);
    }

    document
        .query_selector(&format!("script[src*=\"{SCRIPT_SUFFIX}\"]"))
        .ok()
        .flatten()
        .and_then(|element| element.dyn_into::<HtmlScriptElement>().ok())
}

/// Loads the companion stylesheet from a sibling path of the script's own
/// `src`. An unexpected script filename means no stylesheet; the widget
/// still works, unstyled.
fn inject_stylesheet(document: &Document, script_src: &str) {
    let Some(href) = stylesheet_href(script_src) else {
        log::warn!("cannot derive stylesheet path from script src '{script_src}'");
        return;
    };

    let appended = document.create_element("link").and_then(|link| {
        link.set_attribute("rel", "stylesheet")?;
        link.set_attribute("href", &href)?;
        match document.head() {
            Some(head) => head.append_child(&link).map(|_| ()),
            None => Ok(()),
        }
    });
    if let Err(error) = appended {
        log::warn!("failed to inject stylesheet: {error:?}");
    }
}

/// Builds the shared submit action: reads the input, starts the exchange,
/// and spawns the network half onto the event loop. The controller borrow
/// is released before the await, so overlapping sends are possible and
/// may resolve out of order.
fn make_submit(controller: &Rc<RefCell<Controller>>, input: HtmlInputElement) -> Rc<dyn Fn()> {
    let controller = controller.clone();
    Rc::new(move || {
        let raw = input.value();
        let Some(request) = controller.borrow_mut().begin_send(&raw) else {
            return;
        };
        let transport = controller.borrow().transport().clone();

        let controller = controller.clone();
        spawn_local(async move {
            let result = transport.send(&request).await;
            controller.borrow_mut().finish_send(result);
        });
    })
}

fn wire_events(controller: &Rc<RefCell<Controller>>, dom: &WidgetDom) -> BootResult<()> {
    {
        let controller = controller.clone();
        let on_toggle = Closure::<dyn FnMut()>::new(move || {
            controller.borrow_mut().toggle_panel();
        });
        dom.button
            .add_event_listener_with_callback("click", on_toggle.as_ref().unchecked_ref())
            .map_err(dom_error("wire-toggle-click"))?;
        on_toggle.forget();
    }

    let submit = make_submit(controller, dom.input.clone());

    {
        let submit = submit.clone();
        let on_send = Closure::<dyn FnMut()>::new(move || submit());
        dom.send
            .add_event_listener_with_callback("click", on_send.as_ref().unchecked_ref())
            .map_err(dom_error("wire-send-click"))?;
        on_send.forget();
    }

    {
        let on_keydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if event.key() == "Enter" {
                submit();
            }
        });
        dom.input
            .add_event_listener_with_callback("keydown", on_keydown.as_ref().unchecked_ref())
            .map_err(dom_error("wire-input-keydown"))?;
        on_keydown.forget();
    }

    Ok(())
}
