//! WASM WebSocket client using `web-sys::WebSocket`.
//!
//! - `web-sys::WebSocket` + `wasm-bindgen` closures
//! - Fixed-delay reconnection after every close or failed construction
//! - Callback-based event system (`on_event: impl Fn(WsEvent)`)
//!
//! State lives behind an `Rc<RefCell<_>>` handle owned by whoever created the
//! client. Socket callbacks hold only a weak reference, so dropping every
//! handle (or calling [`WsClient::cleanup`]) stops reconnection.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::{CloseEvent, ErrorEvent, MessageEvent, WebSocket};

use crate::ws::{decode_frame, ReadyState, WsConfig, WsEvent};

struct Handlers {
    _onopen: Closure<dyn FnMut()>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(ErrorEvent)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
}

struct Inner {
    config: WsConfig,
    on_event: Rc<dyn Fn(WsEvent)>,
    ws: Option<WebSocket>,
    // Detached from the socket on close, dropped on the next connect.
    handlers: Option<Handlers>,
    reconnect_timeout: Option<Timeout>,
    reconnect_scheduled: bool,
    reconnect_attempts: u32,
    stopped: bool,
}

/// Browser WebSocket client.
///
/// Cheap to clone; all clones drive the same socket.
#[derive(Clone)]
pub struct WsClient {
    inner: Rc<RefCell<Inner>>,
}

impl WsClient {
    /// Create a client. `on_event` receives every connection event and
    /// every parsed batch. Does not connect yet.
    pub fn new(config: WsConfig, on_event: impl Fn(WsEvent) + 'static) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                config,
                on_event: Rc::new(on_event),
                ws: None,
                handlers: None,
                reconnect_timeout: None,
                reconnect_scheduled: false,
                reconnect_attempts: 0,
                stopped: false,
            })),
        }
    }

    /// Open the socket. A no-op while already connecting or open.
    pub fn connect(&self) {
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.stopped = false;
        }
        self.do_connect();
    }

    pub fn is_connected(&self) -> bool {
        self.ready_state() == ReadyState::Open
    }

    pub fn ready_state(&self) -> ReadyState {
        self.inner
            .try_borrow()
            .ok()
            .and_then(|inner| inner.ws.as_ref().map(|w| ReadyState::from(w.ready_state())))
            .unwrap_or(ReadyState::Closed)
    }

    /// Close the socket and stop reconnecting.
    pub fn cleanup(&self) {
        self.cleanup_connection();
        if let Ok(mut inner) = self.inner.try_borrow_mut() {
            inner.stopped = true;
            inner.reconnect_timeout.take();
            inner.reconnect_scheduled = false;
            inner.handlers.take();
        }
    }

    // ── Internal ──────────────────────────────────────────────────────────

    fn upgrade(weak: &Weak<RefCell<Inner>>) -> Option<Self> {
        weak.upgrade().map(|inner| Self { inner })
    }

    fn emit(&self, event: WsEvent) {
        let callback = match self.inner.try_borrow() {
            Ok(inner) => Rc::clone(&inner.on_event),
            Err(e) => {
                tracing::error!("Dropping {:?}: client state already borrowed ({})", event, e);
                return;
            }
        };
        callback(event);
    }

    fn do_connect(&self) {
        match self.ready_state() {
            ReadyState::Connecting | ReadyState::Open => {
                tracing::info!("Already connected or connecting, skipping");
                return;
            }
            _ => {}
        }

        let url = match self.inner.try_borrow() {
            Ok(inner) if !inner.stopped => inner.config.url.clone(),
            _ => return,
        };

        tracing::info!(url = %url, "Creating WebSocket connection");

        match WebSocket::new(&url) {
            Err(err) => {
                let msg = extract_js_error(&err);
                tracing::error!("Failed to create WebSocket: {}", msg);
                self.emit(WsEvent::ConnectFailed(msg));
                self.schedule_reconnect();
            }
            Ok(ws) => self.setup_connection(ws),
        }
    }

    fn setup_connection(&self, ws: WebSocket) {
        let weak = Rc::downgrade(&self.inner);

        let onopen = Closure::<dyn FnMut()>::new({
            let weak = weak.clone();
            move || {
                let Some(client) = Self::upgrade(&weak) else {
                    return;
                };
                tracing::info!("WebSocket opened");
                if let Ok(mut inner) = client.inner.try_borrow_mut() {
                    inner.reconnect_attempts = 0;
                }
                client.emit(WsEvent::Connected);
            }
        });
        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));

        let onmessage = Closure::<dyn FnMut(_)>::new({
            let weak = weak.clone();
            move |e: MessageEvent| {
                let Some(client) = Self::upgrade(&weak) else {
                    return;
                };
                if let Ok(txt) = e.data().dyn_into::<js_sys::JsString>() {
                    let txt: String = txt.into();
                    client.emit(decode_frame(&txt));
                }
            }
        });
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));

        let onerror = Closure::<dyn FnMut(_)>::new({
            let weak = weak.clone();
            move |e: ErrorEvent| {
                let Some(client) = Self::upgrade(&weak) else {
                    return;
                };
                let msg = extract_js_error(&e.error());
                tracing::error!("WebSocket error: {}", msg);
                client.emit(WsEvent::TransportError(msg));
            }
        });
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));

        let onclose = Closure::<dyn FnMut(_)>::new(move |e: CloseEvent| {
            let Some(client) = Self::upgrade(&weak) else {
                return;
            };
            let code = e.code();
            let reason = e.reason();
            tracing::info!("WebSocket closed: code={}, reason={}", code, reason);

            client.cleanup_connection();
            client.emit(WsEvent::Disconnected {
                code: Some(code),
                reason,
            });
            client.schedule_reconnect();
        });
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        match self.inner.try_borrow_mut() {
            Ok(mut inner) => {
                inner.ws = Some(ws);
                inner.handlers = Some(Handlers {
                    _onopen: onopen,
                    _onmessage: onmessage,
                    _onerror: onerror,
                    _onclose: onclose,
                });
            }
            Err(_) => {
                tracing::error!("Could not store WebSocket - state already borrowed");
            }
        }
    }

    // ── Reconnection ──────────────────────────────────────────────────────

    fn schedule_reconnect(&self) {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return;
        };
        if inner.stopped || !inner.config.reconnect {
            return;
        }
        if inner.reconnect_scheduled {
            tracing::info!("Reconnect already scheduled, skipping");
            return;
        }

        inner.reconnect_scheduled = true;
        inner.reconnect_attempts += 1;
        let delay = inner
            .config
            .reconnect_policy()
            .delay_for_attempt(inner.reconnect_attempts);
        let delay_ms = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);

        tracing::info!(
            "Scheduling reconnect attempt {} in {}ms",
            inner.reconnect_attempts,
            delay_ms
        );

        let weak = Rc::downgrade(&self.inner);
        inner.reconnect_timeout = Some(Timeout::new(delay_ms, move || {
            let Some(client) = Self::upgrade(&weak) else {
                return;
            };
            if let Ok(mut inner) = client.inner.try_borrow_mut() {
                inner.reconnect_scheduled = false;
            }
            client.do_connect();
        }));
    }

    // ── Connection cleanup ────────────────────────────────────────────────

    fn cleanup_connection(&self) {
        let Ok(mut inner) = self.inner.try_borrow_mut() else {
            return;
        };
        if let Some(w) = inner.ws.take() {
            w.set_onopen(None);
            w.set_onmessage(None);
            w.set_onerror(None);
            w.set_onclose(None);

            if ReadyState::from(w.ready_state()) == ReadyState::Open {
                let _ = w.close();
            }
        }
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn extract_js_error(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        let name = error.name().as_string().unwrap_or_else(|| "Error".to_string());
        let message = error.message().as_string().unwrap_or_default();

        return if message.is_empty() {
            name
        } else {
            format!("{}: {}", name, message)
        };
    }

    if let Some(s) = err.as_string() {
        if !s.is_empty() {
            return s;
        }
    }

    if err.is_undefined() || err.is_null() {
        return "WebSocket error".to_string();
    }

    "Unknown WebSocket error".to_string()
}
