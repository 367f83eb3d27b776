//! Browser implementations (WASM only)

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, EventTarget, HtmlElement, Response};

use super::{ResourceFetcher, Surface};
use crate::chatter::{Bubble, BubbleClick, ChatterLine};
use crate::consts::{ANSWER_HIDE_MS, CHATTER_HIDE_MS};
use crate::error::FetchError;
use crate::events::Subscription;
use crate::message::HostMessage;
use crate::section::SectionId;
use crate::settings::Theme;
use crate::ui_state::WidgetPosition;

const BIRD_IMAGE_URL: &str = "./images/illust_桜小鳥.png";

/// Navigation icons: (section, title, Font Awesome icon)
const NAV_ICONS: [(&str, &str, &str); 7] = [
    ("home", "ホーム", "fa-home"),
    ("rateMatch", "レート戦", "fa-fist-raised"),
    ("battleRecord", "戦いの記録", "fa-trophy"),
    ("memo", "メモ", "fa-clipboard"),
    ("search", "検索", "fa-search"),
    ("minigames", "ミニゲーム", "fa-gamepad"),
    ("options", "設定", "fa-cog"),
];

fn overlay_html() -> String {
    let icons: String = NAV_ICONS
        .iter()
        .map(|(section, title, icon)| {
            format!(
                "<button class=\"tcg-menu-icon\" data-section=\"{section}\" title=\"{title}\"><i class=\"fas {icon}\"></i></button>"
            )
        })
        .collect();
    format!(
        r#"<div id="tcg-content-area">
    <div id="tcg-sidebar-header">{icons}</div>
    <div id="tcg-sections-wrapper"></div>
</div>
<div id="tcg-bird-container">
    <div id="tcg-menu-toggle-bird" style="background-image: url('{BIRD_IMAGE_URL}')" title="アシスタントメニュー"></div>
    <div id="tcg-bird-speech-bubble" class="hidden"></div>
</div>
<div id="tcg-custom-dialog-overlay">
    <div class="tcg-modal-content">
        <h3 id="tcg-dialog-title"></h3>
        <p id="tcg-dialog-message"></p>
        <div class="dialog-buttons" id="tcg-dialog-buttons"></div>
    </div>
</div>"#
    )
}

pub fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn element(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing #{id}")))
}

fn html_element(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    element(document, id)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not an HTML element")))
}

/// Attach a DOM listener; dropping the handle removes it
pub fn listen(
    target: &EventTarget,
    kind: &'static str,
    handler: impl FnMut(web_sys::Event) + 'static,
) -> Subscription {
    let closure = Closure::<dyn FnMut(web_sys::Event)>::new(handler);
    if let Err(e) = target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref()) {
        log::error!("Failed to add {} listener: {:?}", kind, e);
    }
    let target = target.clone();
    Subscription::new(move || {
        let _ = target.remove_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
        drop(closure);
    })
}

/// Run `f` once after `delay_ms`
pub fn set_timeout(delay_ms: i32, f: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once_into_js(f);
    if let Err(e) = window
        .set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), delay_ms)
    {
        log::error!("set_timeout failed: {:?}", e);
    }
}

/// Post a host message to this window, as the popup and options pages do
pub fn post_host_message(message: &HostMessage) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let value = js_sys::JSON::parse(&message.to_json())?;
    window.post_message(&value, "*")
}

fn apply_position(element: &HtmlElement, position: &WidgetPosition) {
    let style = element.style();
    let _ = style.set_property("top", &position.top_css());
    let _ = style.set_property("left", &position.left_css());
    // Position by top/left only once the user has moved the bird
    let _ = style.set_property("right", "auto");
    let _ = style.set_property("bottom", "auto");
}

/// The injected overlay DOM
#[derive(Debug, Clone)]
pub struct DomSurface {
    document: Document,
    body: HtmlElement,
    content_area: Element,
    wrapper: Element,
    bird_container: HtmlElement,
    bird_toggle: HtmlElement,
    bubble: HtmlElement,
    bubble_state: Rc<RefCell<Bubble>>,
    dialog: Element,
}

impl DomSurface {
    /// Insert the overlay into `#tcg-extension-root` (or `<body>`) and bind to it
    pub fn inject() -> Result<Self, JsValue> {
        let document = document()?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?;
        if document.get_element_by_id("tcg-content-area").is_none() {
            let root: Element = match document.get_element_by_id("tcg-extension-root") {
                Some(root) => root,
                None => body.clone().into(),
            };
            root.insert_adjacent_html("beforeend", &overlay_html())?;
        }
        let surface = Self {
            content_area: element(&document, "tcg-content-area")?,
            wrapper: element(&document, "tcg-sections-wrapper")?,
            bird_container: html_element(&document, "tcg-bird-container")?,
            bird_toggle: html_element(&document, "tcg-menu-toggle-bird")?,
            bubble: html_element(&document, "tcg-bird-speech-bubble")?,
            bubble_state: Rc::new(RefCell::new(Bubble::default())),
            dialog: element(&document, "tcg-custom-dialog-overlay")?,
            document,
            body,
        };
        surface.setup_bubble_click();
        surface.setup_dialog_buttons()?;
        Ok(surface)
    }

    /// One listener for the bubble's whole life; clicks reveal or close
    fn setup_bubble_click(&self) {
        let bubble = self.bubble.clone();
        let state = self.bubble_state.clone();
        listen(&self.bubble, "click", move |_| {
            let click = state.borrow_mut().click();
            match click {
                BubbleClick::Reveal { html, token } => {
                    bubble.set_inner_html(&html);
                    hide_bubble_later(&bubble, &state, token, ANSWER_HIDE_MS);
                }
                BubbleClick::Hide => hide_bubble(&bubble),
            }
        })
        .forget();
    }

    /// Any dialog button closes the dialog
    fn setup_dialog_buttons(&self) -> Result<(), JsValue> {
        let buttons = element(&self.document, "tcg-dialog-buttons")?;
        let dialog = self.dialog.clone();
        listen(&buttons, "click", move |event| {
            let on_button = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .is_some_and(|el| el.tag_name().eq_ignore_ascii_case("button"));
            if on_button {
                let _ = dialog.class_list().remove_1("show");
            }
        })
        .forget();
        Ok(())
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn bird_container(&self) -> &HtmlElement {
        &self.bird_container
    }

    pub fn bird_toggle(&self) -> &HtmlElement {
        &self.bird_toggle
    }

    /// Navigation icons and their section ids
    pub fn nav_icons(&self) -> Vec<(Element, String)> {
        let Ok(nodes) = self.document.query_selector_all(".tcg-menu-icon") else {
            return Vec::new();
        };
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .filter_map(|el| {
                let section = el.get_attribute("data-section")?;
                Some((el, section))
            })
            .collect()
    }
}

fn hide_bubble(bubble: &HtmlElement) {
    let _ = bubble.class_list().add_1("hidden");
}

fn hide_bubble_later(bubble: &HtmlElement, state: &Rc<RefCell<Bubble>>, token: u32, delay_ms: i32) {
    let bubble = bubble.clone();
    let state = state.clone();
    set_timeout(delay_ms, move || {
        if state.borrow_mut().expire(token) {
            hide_bubble(&bubble);
        }
    });
}

impl Surface for DomSurface {
    type Container = Element;

    fn create_container(&self, id: &SectionId) -> Element {
        if let Some(existing) = self.document.get_element_by_id(&id.container_id()) {
            return existing;
        }
        let container = self
            .document
            .create_element("div")
            .expect("div is a valid tag name");
        container.set_id(&id.container_id());
        container.set_class_name("tcg-section");
        if let Err(e) = self.wrapper.append_child(&container) {
            log::error!("Failed to attach container for {}: {:?}", id, e);
        }
        container
    }

    fn set_markup(&self, container: &Element, html: &str) {
        container.set_inner_html(html);
    }

    fn set_active(&self, container: &Element, active: bool) {
        let _ = container.class_list().toggle_with_force("active", active);
    }

    fn mark_nav(&self, id: &SectionId) {
        for (icon, section) in self.nav_icons() {
            let _ = icon
                .class_list()
                .toggle_with_force("active", section == id.as_str());
        }
    }

    fn set_panel_open(&self, open: bool) {
        let _ = self.content_area.class_list().toggle_with_force("active", open);
        let _ = self.bird_toggle.class_list().toggle_with_force("open", open);
    }

    fn apply_theme(&self, theme: Theme) {
        let classes = self.body.class_list();
        for t in Theme::ALL {
            let _ = classes.remove_1(&t.class_name());
        }
        let _ = classes.add_1(&theme.class_name());
    }

    fn place_widget(&self, position: &WidgetPosition) {
        apply_position(&self.bird_container, position);
    }

    fn show_notice(&self, title: &str, message: &str) {
        let Some(title_el) = self.document.get_element_by_id("tcg-dialog-title") else {
            log::warn!("{}: {}", title, message);
            return;
        };
        title_el.set_text_content(Some(title));
        if let Some(message_el) = self.document.get_element_by_id("tcg-dialog-message") {
            message_el.set_text_content(Some(message));
        }
        if let Some(buttons) = self.document.get_element_by_id("tcg-dialog-buttons") {
            buttons.set_inner_html("<button>OK</button>");
        }
        let _ = self.dialog.class_list().add_1("show");
    }

    fn show_chatter(&self, line: &ChatterLine) {
        let rect = self.bird_container.get_bounding_client_rect();
        let viewport_width = web_sys::window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|w| w.as_f64())
            .unwrap_or(0.0);
        let on_left = rect.left() + rect.width() / 2.0 < viewport_width / 2.0;
        let classes = self.bubble.class_list();
        let _ = classes.toggle_with_force("align-left", on_left);
        let _ = classes.toggle_with_force("align-right", !on_left);

        self.bubble.set_inner_html(&line.html);
        let _ = classes.remove_1("hidden");

        let token = self.bubble_state.borrow_mut().show(line);
        // Quiz bubbles wait for a click; plain lines close on their own
        if line.answer.is_none() {
            hide_bubble_later(&self.bubble, &self.bubble_state, token, CHATTER_HIDE_MS);
        }
    }
}

fn js_error_text(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    match value.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => format!("{:?}", value),
    }
}

/// `window.fetch` for text resources
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpFetcher;

impl ResourceFetcher for HttpFetcher {
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String, FetchError>> {
        let path = path.to_string();
        async move {
            let window =
                web_sys::window().ok_or_else(|| FetchError::Network("no window".to_string()))?;
            let response = JsFuture::from(window.fetch_with_str(&path))
                .await
                .map_err(|e| FetchError::Network(js_error_text(&e)))?;
            let response: Response = response
                .dyn_into()
                .map_err(|_| FetchError::Body(path.clone()))?;
            if !response.ok() {
                return Err(FetchError::Status {
                    path,
                    status: response.status(),
                    status_text: response.status_text(),
                });
            }
            let body = response.text().map_err(|_| FetchError::Body(path.clone()))?;
            let text = JsFuture::from(body)
                .await
                .map_err(|_| FetchError::Body(path.clone()))?;
            text.as_string().ok_or(FetchError::Body(path))
        }
    }
}
