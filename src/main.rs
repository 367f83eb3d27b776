//! TCG Assistant entry point
//!
//! Injects the overlay, wires DOM events to the section host and restores
//! the last session's state.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlElement, HtmlInputElement, HtmlSelectElement, MessageEvent, MouseEvent};

    use tcg_assistant::consts::{CHATTER_INTERVAL_MS, DBLCLICK_DELAY_MS};
    use tcg_assistant::persistence::{KeyValueStore, LocalStore};
    use tcg_assistant::platform::Surface;
    use tcg_assistant::platform::web::{
        DomSurface, HttpFetcher, document, listen, post_host_message, set_timeout,
    };
    use tcg_assistant::sections::{home, options};
    use tcg_assistant::widget::{ClickDecision, ClickResolver, DragController, Size};
    use tcg_assistant::{
        BehaviorRegistry, HostConfig, HostMessage, Options, SectionHost, SectionId,
    };

    type WebHost = SectionHost<DomSurface, HttpFetcher, LocalStore>;

    const OPTIONS_SAVED: &str = "設定を保存しました！";
    const OPTIONS_STATUS_MS: i32 = 1500;

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        // Scripts can be included twice on some pages
        let Ok(document) = document() else {
            log::error!("No document to attach to");
            return;
        };
        if document.get_element_by_id("tcg-content-area").is_some() {
            log::info!("TCG Assistant already running");
            return;
        }

        log::info!("TCG Assistant starting...");

        let surface = match DomSurface::inject() {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to inject overlay: {:?}", e);
                return;
            }
        };

        let host: Rc<WebHost> = Rc::new(
            SectionHost::new(
                surface,
                HttpFetcher,
                LocalStore::new(),
                HostConfig::default(),
                register_behaviors(),
            )
            .with_chatter_seed(js_sys::Date::now() as u64),
        );

        setup_nav_icons(host.clone());
        setup_bird(host.clone());
        setup_messages(host.clone());
        setup_chatter_interval(host.clone());

        let _ = host.load_catalog().await;
        host.restore().await;

        log::info!("TCG Assistant running!");
    }

    fn register_behaviors() -> BehaviorRegistry {
        let mut behaviors = BehaviorRegistry::new();

        let render_home = home::initializer(render_login_status);
        behaviors.register(section("home"), move |cx| {
            render_home(cx)?;
            let document = document().map_err(|_| cx.fail("no document"))?;
            if let Some(button) = document.get_element_by_id("home-login-button") {
                cx.hold(listen(&button, "click", |_| {
                    let message = HostMessage::ShowSection {
                        section: section("rateMatch"),
                        force_open: true,
                    };
                    if let Err(e) = post_host_message(&message) {
                        log::error!("Failed to post message: {:?}", e);
                    }
                }));
            }
            Ok(())
        });

        let render_options = options::initializer(render_options_form);
        behaviors.register(section("options"), move |cx| {
            render_options(cx)?;
            let document = document().map_err(|_| cx.fail("no document"))?;
            if let Some(button) = document.get_element_by_id("save-button") {
                let store = cx.store.clone();
                cx.hold(listen(&button, "click", move |_| {
                    save_options_form(store.as_ref())
                }));
            }
            if let Some(select) = document.get_element_by_id("theme-select") {
                let store = cx.store.clone();
                cx.hold(listen(&select, "change", move |_| {
                    save_options_form(store.as_ref())
                }));
            }
            Ok(())
        });

        behaviors
    }

    fn section(id: &str) -> SectionId {
        SectionId::new(id).expect("built-in section ids are non-empty")
    }

    fn render_login_status(status: &home::LoginStatus) -> Result<(), String> {
        let document = document().map_err(|_| "no document".to_string())?;
        let line = document
            .get_element_by_id("home-login-status")
            .ok_or("missing #home-login-status")?;
        line.set_inner_html(&status.message);
        set_display(&document, "home-login-button", status.show_login);
        set_display(&document, "home-logout-button", status.show_logout);
        Ok(())
    }

    fn set_display(document: &web_sys::Document, id: &str, visible: bool) {
        if let Some(el) = document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        {
            let _ = el
                .style()
                .set_property("display", if visible { "inline-block" } else { "none" });
        }
    }

    fn render_options_form(options: &Options) -> Result<(), String> {
        let document = document().map_err(|_| "no document".to_string())?;
        if let Some(toggle) = input(&document, "notification-toggle") {
            toggle.set_checked(options.notifications);
        }
        if let Some(toggle) = input(&document, "queue-notification-toggle") {
            toggle.set_checked(options.queue_notifications);
        }
        if let Some(select) = select(&document, "theme-select") {
            select.set_value(options.theme.as_str());
        }
        Ok(())
    }

    fn input(document: &web_sys::Document, id: &str) -> Option<HtmlInputElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    fn select(document: &web_sys::Document, id: &str) -> Option<HtmlSelectElement> {
        document.get_element_by_id(id)?.dyn_into().ok()
    }

    /// Read the option form, persist it, and ask the overlay to apply the theme
    fn save_options_form(store: &dyn KeyValueStore) {
        let Ok(document) = document() else {
            return;
        };
        let form = options::FormInput {
            notifications: input(&document, "notification-toggle").map(|t| t.checked()),
            queue_notifications: input(&document, "queue-notification-toggle")
                .map(|t| t.checked()),
            theme: select(&document, "theme-select").map(|s| s.value()),
        };
        let options = match options::save_form(store, &form) {
            Ok(options) => options,
            Err(e) => {
                log::error!("Failed to save options: {}", e);
                return;
            }
        };

        if let Some(status) = document.get_element_by_id("save-status") {
            status.set_text_content(Some(OPTIONS_SAVED));
            set_timeout(OPTIONS_STATUS_MS, move || status.set_text_content(Some("")));
        }
        if let Err(e) = post_host_message(&HostMessage::ApplyTheme(options.theme)) {
            log::error!("Failed to post theme change: {:?}", e);
        }
    }

    fn setup_nav_icons(host: Rc<WebHost>) {
        for (icon, id) in host.surface().nav_icons() {
            let host = host.clone();
            listen(&icon, "click", move |_| {
                let host = host.clone();
                let id = id.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    host.nav_clicked(&id).await;
                });
            })
            .forget();
        }
    }

    fn setup_bird(host: Rc<WebHost>) {
        let drag = Rc::new(RefCell::new(DragController::new()));
        let clicks = Rc::new(RefCell::new(ClickResolver::new()));
        let surface = host.surface();
        let bird_toggle = surface.bird_toggle().clone();
        let bird_container = surface.bird_container().clone();
        let document = surface.document().clone();

        // Press
        {
            let drag = drag.clone();
            let bird_toggle_clone = bird_toggle.clone();
            let bird_container = bird_container.clone();
            listen(&bird_toggle, "mousedown", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                let _ = bird_toggle_clone.class_list().add_1("is-dragging");
                let rect = bird_container.get_bounding_client_rect();
                drag.borrow_mut().press(
                    event.client_x() as f64,
                    event.client_y() as f64,
                    rect.left(),
                    rect.top(),
                );
                event.prevent_default();
            })
            .forget();
        }

        // Move
        {
            let drag = drag.clone();
            let host = host.clone();
            let bird_container = bird_container.clone();
            listen(&document, "mousemove", move |event| {
                let Some(event) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                if !drag.borrow().is_dragging() {
                    return;
                }
                let Some(window) = web_sys::window() else {
                    return;
                };
                let viewport = Size::new(
                    window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
                    window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0),
                );
                let widget = Size::new(
                    bird_container.offset_width() as f64,
                    bird_container.offset_height() as f64,
                );
                let position = drag.borrow_mut().drag_to(
                    event.client_x() as f64,
                    event.client_y() as f64,
                    viewport,
                    widget,
                );
                if let Some(position) = position {
                    host.surface().place_widget(&position);
                }
            })
            .forget();
        }

        // Release
        {
            let drag = drag.clone();
            let host = host.clone();
            let bird_toggle_clone = bird_toggle.clone();
            listen(&document, "mouseup", move |_| {
                let released = drag.borrow_mut().release();
                if let Some(position) = released {
                    let _ = bird_toggle_clone.class_list().remove_1("is-dragging");
                    let _ = host.save_widget_position(&position);
                }
            })
            .forget();
        }

        // Click: single toggles, double chatters, post-drag ignored
        {
            listen(&bird_toggle, "click", move |event| {
                let after_drag = drag.borrow_mut().take_moved();
                let decision = clicks.borrow_mut().click(after_drag);
                match decision {
                    ClickDecision::Suppressed => event.stop_propagation(),
                    ClickDecision::StartTimer(token) => {
                        let clicks = clicks.clone();
                        let host = host.clone();
                        set_timeout(DBLCLICK_DELAY_MS, move || {
                            if clicks.borrow_mut().timer_elapsed(token) {
                                wasm_bindgen_futures::spawn_local(async move {
                                    host.toggle_sidebar(None, false).await;
                                });
                            }
                        });
                    }
                    ClickDecision::DoubleClick => {
                        host.chatter();
                    }
                }
            })
            .forget();
        }
    }

    fn setup_messages(host: Rc<WebHost>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        listen(&window, "message", move |event| {
            let Some(event) = event.dyn_ref::<MessageEvent>() else {
                return;
            };
            let data = event.data();
            let json = match data.as_string() {
                Some(text) => text,
                None => match js_sys::JSON::stringify(&data) {
                    Ok(text) => String::from(text),
                    Err(_) => return,
                },
            };
            let host = host.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let _ = host.handle_raw_message(&json).await;
            });
        })
        .forget();
    }

    fn setup_chatter_interval(host: Rc<WebHost>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut()>::new(move || {
            host.chatter();
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            CHATTER_INTERVAL_MS,
        );
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_app::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("TCG Assistant (native) starting...");
    log::info!("The overlay runs in the browser; build for wasm32 to run it");

    let config = tcg_assistant::HostConfig::default();
    let store = tcg_assistant::persistence::MemoryStore::new();
    let state = tcg_assistant::UiState::load(&store, &config);
    let markup = tcg_assistant::SectionId::new(&state.active_section)
        .map(|id| config.markup_path(&id))
        .unwrap_or_default();
    println!(
        "Default state: open={}, section={}, markup={}",
        state.is_open, state.active_section, markup
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
