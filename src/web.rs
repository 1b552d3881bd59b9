//! Browser glue: DOM listeners feeding scroll and pointer input into the event loop, and
//! canvas visibility.

use wasm_bindgen::{JsCast, closure::Closure};
use winit::{event_loop::EventLoopProxy, platform::web::WindowExtWebSys, window::Window};

use crate::{background::Section, flow::BackdropEvent};

pub const HERO_CANVAS: &str = "hero-bg";
pub const GLOBE_CANVAS: &str = "globe-bg";

/// Bounds of every `<section>` of the page, in document order.
pub fn document_sections() -> Vec<Section> {
    let Some(document) = web_sys::window().and_then(|window| window.document()) else {
        return Vec::new();
    };
    let Ok(nodes) = document.query_selector_all("section") else {
        return Vec::new();
    };
    (0..nodes.length())
        .filter_map(|i| nodes.item(i))
        .filter_map(|node| node.dyn_into::<web_sys::HtmlElement>().ok())
        .map(|element| Section::new(element.offset_top() as f32, element.offset_height() as f32))
        .collect()
}

fn scroll_event() -> Option<BackdropEvent> {
    let window = web_sys::window()?;
    let offset = window.scroll_y().ok()? as f32;
    let viewport_height = window.inner_height().ok()?.as_f64()? as f32;
    let document_height = window
        .document()?
        .document_element()?
        .scroll_height() as f32;
    Some(BackdropEvent::Scroll {
        offset,
        viewport_height,
        document_height,
        sections: document_sections(),
    })
}

fn pointer_event(event: &web_sys::MouseEvent) -> Option<BackdropEvent> {
    let window = web_sys::window()?;
    Some(BackdropEvent::Pointer {
        x: event.client_x() as f64,
        y: event.client_y() as f64,
        width: window.inner_width().ok()?.as_f64()? as u32,
        height: window.inner_height().ok()?.as_f64()? as u32,
    })
}

fn send(proxy: &EventLoopProxy<BackdropEvent>, event: Option<BackdropEvent>) {
    if let Some(event) = event {
        if proxy.send_event(event).is_err() {
            log::warn!("Event loop closed, dropping page input");
        }
    }
}

/// Forwards window scroll and mouse moves to the event loop and reports the current scroll
/// state once right away. The listeners live as long as the page.
pub fn install_listeners(proxy: EventLoopProxy<BackdropEvent>) {
    let Some(window) = web_sys::window() else {
        log::warn!("No browser window, page input is disabled");
        return;
    };

    let scroll_proxy = proxy.clone();
    let on_scroll = Closure::<dyn FnMut()>::new(move || send(&scroll_proxy, scroll_event()));
    if window
        .add_event_listener_with_callback("scroll", on_scroll.as_ref().unchecked_ref())
        .is_err()
    {
        log::warn!("Could not listen to scroll events");
    }
    on_scroll.forget();

    let pointer_proxy = proxy.clone();
    let on_move = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |event: web_sys::MouseEvent| {
        send(&pointer_proxy, pointer_event(&event))
    });
    if window
        .add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())
        .is_err()
    {
        log::warn!("Could not listen to mouse moves");
    }
    on_move.forget();

    send(&proxy, scroll_event());
}

pub fn set_canvas_visible(window: &Window, visible: bool) {
    let Some(canvas) = window.canvas() else {
        return;
    };
    let display = if visible { "block" } else { "none" };
    if canvas.style().set_property("display", display).is_err() {
        log::warn!("Could not set the display of the backdrop canvas");
    }
}
