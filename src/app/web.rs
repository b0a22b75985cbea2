//! Browser binding: mounts a [`Dashboard`] onto the page.
//!
//! The dashboard lives in an `Rc<RefCell<_>>` shared by the socket callback,
//! the flash timers, and the DOM listeners. Every callback holds a weak
//! reference, so dropping the [`WebDashboard`] handle tears everything down.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::str::FromStr;

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, Event, EventTarget, HtmlInputElement, HtmlSelectElement, KeyboardEvent,
    Window,
};

use super::{Dashboard, DashboardConfig, Variant};
use crate::error::DashboardError;
use crate::network::{resolve_ws_url, PageLocation};
use crate::view::{KeyAction, KeyInput, SortKey};
use crate::ws::wasm::WsClient;

/// Element ids the dashboard binds to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementIds {
    pub status: String,
    pub count: String,
    pub grid: String,
    pub search: String,
    pub sort: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            status: "status".into(),
            count: "count".into(),
            grid: "cryptoGrid".into(),
            search: "searchInput".into(),
            sort: "sortSelect".into(),
        }
    }
}

struct Elements {
    status: Element,
    count: Element,
    grid: Element,
    search: Option<HtmlInputElement>,
    sort: Option<HtmlSelectElement>,
}

struct Mounted {
    dashboard: Dashboard,
    elements: Elements,
}

impl Mounted {
    fn render(&self) {
        let status = self.dashboard.status();
        self.elements.status.set_text_content(Some(status.text()));
        self.elements.status.set_class_name(&status.class_name());
        self.elements
            .count
            .set_text_content(Some(&self.dashboard.count().to_string()));
        match self.dashboard.render_html() {
            Ok(html) => self.elements.grid.set_inner_html(&html),
            Err(e) => tracing::error!("Failed to render grid: {}", e),
        }
    }
}

type Listener = (EventTarget, &'static str, Closure<dyn FnMut(Event)>);

/// A dashboard mounted on the page. Dropping it closes the socket and
/// detaches every listener.
pub struct WebDashboard {
    state: Rc<RefCell<Mounted>>,
    client: WsClient,
    listeners: Vec<Listener>,
}

impl WebDashboard {
    pub fn client(&self) -> &WsClient {
        &self.client
    }

    /// Run `f` against the current dashboard state.
    pub fn with_dashboard<R>(&self, f: impl FnOnce(&Dashboard) -> R) -> Option<R> {
        self.state.try_borrow().ok().map(|m| f(&m.dashboard))
    }
}

impl Drop for WebDashboard {
    fn drop(&mut self) {
        self.client.cleanup();
        for (target, kind, listener) in self.listeners.drain(..) {
            let _ = target
                .remove_event_listener_with_callback(kind, listener.as_ref().unchecked_ref());
        }
    }
}

/// Mount the given variant with default element ids.
///
/// The live variant derives its endpoint from the page location; the explorer
/// variant uses the fixed local endpoint.
pub fn mount(variant: Variant) -> Result<WebDashboard, DashboardError> {
    let window = window()?;
    let mut config = DashboardConfig::for_variant(variant);
    if variant == Variant::Live {
        config.ws.url = resolve_ws_url(&page_location(&window)?);
    }
    mount_with(config, &ElementIds::default())
}

pub fn mount_with(config: DashboardConfig, ids: &ElementIds) -> Result<WebDashboard, DashboardError> {
    let window = window()?;
    let document = window
        .document()
        .ok_or_else(|| DashboardError::Dom("no document".into()))?;

    let interactive = config.variant.interactive();
    let elements = Elements {
        status: element(&document, &ids.status)?,
        count: element(&document, &ids.count)?,
        grid: element(&document, &ids.grid)?,
        search: if interactive {
            Some(typed_element::<HtmlInputElement>(&document, &ids.search)?)
        } else {
            None
        },
        sort: if interactive {
            Some(typed_element::<HtmlSelectElement>(&document, &ids.sort)?)
        } else {
            None
        },
    };

    let flash_ms = u32::try_from(config.flash_duration.as_millis()).unwrap_or(u32::MAX);
    let ws_config = config.ws.clone();
    tracing::info!(variant = %config.variant, url = %ws_config.url, "Mounting dashboard");

    let state = Rc::new(RefCell::new(Mounted {
        dashboard: Dashboard::new(config),
        elements,
    }));

    let client = WsClient::new(ws_config, {
        let weak = Rc::downgrade(&state);
        move |event| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let ticket = {
                let Ok(mut mounted) = state.try_borrow_mut() else {
                    tracing::error!("Dashboard busy, dropping {:?}", event);
                    return;
                };
                let ticket = mounted.dashboard.handle_event(event);
                mounted.render();
                ticket
            };
            if let Some(ticket) = ticket {
                let weak = Rc::downgrade(&state);
                Timeout::new(flash_ms, move || {
                    let Some(state) = weak.upgrade() else {
                        return;
                    };
                    let Ok(mut mounted) = state.try_borrow_mut() else {
                        return;
                    };
                    if mounted.dashboard.expire_flash(&ticket) > 0 {
                        mounted.render();
                    }
                })
                .forget();
            }
        }
    });

    let mut listeners = Vec::new();
    if interactive {
        listeners = bind_controls(&state, &document)?;
    }

    if let Ok(mounted) = state.try_borrow() {
        mounted.render();
    }
    client.connect();

    Ok(WebDashboard {
        state,
        client,
        listeners,
    })
}

/// Mount a dashboard for the page's lifetime. `variant` is `"live"` or
/// `"explorer"`.
#[wasm_bindgen]
pub fn start(variant: &str) -> Result<(), JsValue> {
    let variant = Variant::from_str(variant).map_err(|e| JsValue::from_str(&e.to_string()))?;
    let handle = mount(variant).map_err(|e| JsValue::from_str(&e.to_string()))?;
    std::mem::forget(handle);
    Ok(())
}

// ─── Controls ────────────────────────────────────────────────────────────────

fn bind_controls(
    state: &Rc<RefCell<Mounted>>,
    document: &Document,
) -> Result<Vec<Listener>, DashboardError> {
    let (search, sort) = match state.try_borrow() {
        Ok(m) => (m.elements.search.clone(), m.elements.sort.clone()),
        Err(_) => return Err(DashboardError::Dom("dashboard busy".into())),
    };
    let (Some(search), Some(sort)) = (search, sort) else {
        return Ok(Vec::new());
    };

    let mut listeners = Vec::new();

    let on_input = Closure::<dyn FnMut(Event)>::new({
        let weak = Rc::downgrade(state);
        let search = search.clone();
        move |_: Event| {
            update(&weak, |m| {
                m.dashboard.set_search(search.value());
            });
        }
    });
    listen(&mut listeners, search.clone().into(), "input", on_input)?;

    let on_change = Closure::<dyn FnMut(Event)>::new({
        let weak = Rc::downgrade(state);
        let sort = sort.clone();
        move |_: Event| match SortKey::from_str(&sort.value()) {
            Ok(key) => update(&weak, |m| {
                m.dashboard.set_sort(key);
            }),
            Err(e) => tracing::warn!("Ignoring sort selection: {}", e),
        }
    });
    listen(&mut listeners, sort.into(), "change", on_change)?;

    let on_keydown = Closure::<dyn FnMut(Event)>::new({
        let weak = Rc::downgrade(state);
        let document = document.clone();
        move |e: Event| {
            let Ok(key_event) = e.dyn_into::<KeyboardEvent>() else {
                return;
            };
            let focused = document
                .active_element()
                .is_some_and(|el| el.id() == search.id());
            let input = KeyInput {
                key: key_event.key(),
                ctrl: key_event.ctrl_key(),
                meta: key_event.meta_key(),
                search_focused: focused,
            };

            let mut action = KeyAction::None;
            update(&weak, |m| action = m.dashboard.handle_key(&input));

            if action.prevents_default() {
                key_event.prevent_default();
            }
            match action {
                KeyAction::FocusSearch => {
                    let _ = search.focus();
                }
                KeyAction::ClearSearch => {
                    search.set_value("");
                    let _ = search.blur();
                }
                KeyAction::None => {}
            }
        }
    });
    listen(&mut listeners, document.clone().into(), "keydown", on_keydown)?;

    Ok(listeners)
}

/// Mutate the mounted dashboard and re-render.
fn update(weak: &Weak<RefCell<Mounted>>, f: impl FnOnce(&mut Mounted)) {
    let Some(state) = weak.upgrade() else {
        return;
    };
    let Ok(mut mounted) = state.try_borrow_mut() else {
        return;
    };
    f(&mut mounted);
    mounted.render();
}

fn listen(
    listeners: &mut Vec<Listener>,
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(Event)>,
) -> Result<(), DashboardError> {
    target
        .add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
        .map_err(|e| DashboardError::Dom(format!("add {kind} listener: {e:?}")))?;
    listeners.push((target, kind, closure));
    Ok(())
}

// ─── DOM helpers ─────────────────────────────────────────────────────────────

fn window() -> Result<Window, DashboardError> {
    web_sys::window().ok_or_else(|| DashboardError::Dom("no window".into()))
}

fn page_location(window: &Window) -> Result<PageLocation, DashboardError> {
    let location = window.location();
    let read = |r: Result<String, JsValue>| {
        r.map_err(|e| DashboardError::Dom(format!("location: {e:?}")))
    };
    Ok(PageLocation::new(
        read(location.protocol())?,
        read(location.hostname())?,
        read(location.host())?,
    ))
}

fn element(document: &Document, id: &str) -> Result<Element, DashboardError> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| DashboardError::Dom(format!("missing element #{id}")))
}

fn typed_element<T: JsCast>(document: &Document, id: &str) -> Result<T, DashboardError> {
    element(document, id)?
        .dyn_into::<T>()
        .map_err(|_| DashboardError::Dom(format!("element #{id} has the wrong type")))
}
