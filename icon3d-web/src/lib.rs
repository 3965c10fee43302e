/// Icon3D Web - WASM bindings for the interactive 3D link icons
///
/// `mount()` finds every icon container on the page, injects a canvas into
/// each one and wires the gallery to the browser: one intersection observer
/// on the common ancestor, mouse/touch listeners and `requestAnimationFrame`.

use std::cell::RefCell;
use std::rc::Rc;

use icon3d_core::{attach_all, IconDescriptor, IconGallery};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, MouseEvent, Node, TouchEvent};

pub mod config;
pub mod fetch;
pub mod host;
pub mod listeners;
pub mod surface;

pub use config::WebConfig;
pub use host::{SharedGallery, WebHost};
use surface::{CanvasSurface, StagingCanvas};

/// An icon container found on the page
struct Container {
    element: HtmlElement,
    model_path: String,
    link: String,
}

fn collect_containers(document: &Document, config: &WebConfig) -> Result<Vec<Container>, JsValue> {
    let nodes = document.query_selector_all(&config.container_selector)?;
    let mut containers = Vec::with_capacity(nodes.length() as usize);

    for i in 0..nodes.length() {
        let Some(element) = nodes.item(i).and_then(|node| node.dyn_into::<HtmlElement>().ok()) else {
            continue;
        };
        let model_path = element.get_attribute(&config.model_attribute);
        let link = element.get_attribute(&config.link_attribute);
        match (model_path, link) {
            (Some(model_path), Some(link)) => containers.push(Container {
                element,
                model_path,
                link,
            }),
            _ => log::warn!(
                "skipping icon container without {} and {} attributes",
                config.model_attribute,
                config.link_attribute
            ),
        }
    }

    Ok(containers)
}

/// Closest ancestor matching the gate selector that contains every container
fn find_gate(containers: &[Container], selector: &str) -> Result<Option<Element>, JsValue> {
    let Some(first) = containers.first() else {
        return Ok(None);
    };
    let Some(gate) = first.element.closest(selector)? else {
        return Ok(None);
    };
    let contains_all = containers.iter().all(|c| {
        let node: &Node = c.element.as_ref();
        gate.contains(Some(node))
    });
    if contains_all {
        Ok(Some(gate))
    } else {
        Ok(None)
    }
}

fn pointer_x(event: &Event) -> Option<f64> {
    if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
        return Some(mouse.client_x() as f64);
    }
    event
        .dyn_ref::<TouchEvent>()
        .and_then(|touch| touch.touches().get(0))
        .map(|touch| touch.client_x() as f64)
}

/// Install element-level press/click listeners and page-level move/release
/// listeners.
fn install_listeners(gallery: &SharedGallery, window: &EventTarget, elements: &[HtmlElement]) -> Result<(), JsValue> {
    let mut listeners = listeners::ListenerSet::new();

    for (index, element) in elements.iter().enumerate() {
        for kind in ["mousedown", "touchstart"] {
            let weak = Rc::downgrade(gallery);
            listeners.add(element, kind, move |event| {
                if let (Some(x), Some(gallery)) = (pointer_x(&event), weak.upgrade()) {
                    gallery.borrow_mut().pointer_down(index, x);
                }
            })?;
        }

        let weak = Rc::downgrade(gallery);
        listeners.add(element, "click", move |_event| {
            if let Some(gallery) = weak.upgrade() {
                gallery.borrow_mut().click(index);
            }
        })?;
    }

    for kind in ["mousemove", "touchmove"] {
        let weak = Rc::downgrade(gallery);
        listeners.add(window, kind, move |event| {
            if let (Some(x), Some(gallery)) = (pointer_x(&event), weak.upgrade()) {
                gallery.borrow_mut().pointer_move(x);
            }
        })?;
    }

    for kind in ["mouseup", "touchend"] {
        let weak = Rc::downgrade(gallery);
        listeners.add(window, kind, move |_event| {
            if let Some(gallery) = weak.upgrade() {
                gallery.borrow_mut().pointer_up();
            }
        })?;
    }

    *gallery.borrow_mut().host_mut().listeners_mut() = listeners;
    Ok(())
}

/// Handle returned to JavaScript by `mount`
#[wasm_bindgen]
pub struct IconGalleryHandle {
    gallery: SharedGallery,
}

#[wasm_bindgen]
impl IconGalleryHandle {
    /// Stop animating, remove every listener and observer, release graphics
    /// resources and remove the injected canvases.
    pub fn dispose(&self) {
        self.gallery.borrow_mut().dispose();
    }

    #[wasm_bindgen(getter, js_name = iconCount)]
    pub fn icon_count(&self) -> usize {
        self.gallery.borrow().icons().len()
    }

    #[wasm_bindgen(getter, js_name = isAnimating)]
    pub fn is_animating(&self) -> bool {
        self.gallery.borrow().is_animating()
    }

    /// Listeners currently installed on `window`
    #[wasm_bindgen(getter, js_name = pageListenerCount)]
    pub fn page_listener_count(&self) -> usize {
        let gallery = self.gallery.borrow();
        let host = gallery.host();
        host.listeners().count_on(host.window())
    }
}

/// Mount the icon gallery on the current page.
///
/// `options` is an optional JSON object overriding `WebConfig` fields.
/// Returns `undefined` without touching the DOM when no icon container or
/// no common gate ancestor exists.
#[wasm_bindgen]
pub fn mount(options: Option<String>) -> Result<Option<IconGalleryHandle>, JsValue> {
    let config = match options {
        Some(json) => WebConfig::from_json(&json).map_err(|err| JsValue::from_str(&err.to_string()))?,
        None => WebConfig::default(),
    };

    let window = web_sys::window().ok_or("No window found")?;
    let document = window.document().ok_or("No document found")?;

    let containers = collect_containers(&document, &config)?;
    if containers.is_empty() {
        log::debug!("no icon containers match {}", config.container_selector);
        return Ok(None);
    }
    let Some(gate) = find_gate(&containers, &config.gate_selector)? else {
        log::debug!("no common {} ancestor for icon containers", config.gate_selector);
        return Ok(None);
    };

    let device_pixel_ratio = window.device_pixel_ratio();
    let staging = Rc::new(StagingCanvas::new(&document)?);

    let surfaces = attach_all(&containers, |container| {
        CanvasSurface::attach(
            &document,
            &container.element,
            staging.clone(),
            config.gallery.render_size,
            device_pixel_ratio,
        )
    })?;

    let mut elements = Vec::with_capacity(containers.len());
    let icons: Vec<_> = containers
        .into_iter()
        .zip(surfaces)
        .map(|(container, surface)| {
            elements.push(container.element);
            IconDescriptor {
                model_path: container.model_path,
                link: container.link,
                surface,
            }
        })
        .collect();

    let host = WebHost::new(window.clone(), config.link_target.clone());
    let gallery = IconGallery::new(host, icons, config.gallery).ok_or("icon gallery has no icons")?;
    let gallery: SharedGallery = Rc::new(RefCell::new(gallery));

    WebHost::bind(&gallery);
    let wired = install_listeners(&gallery, &window, &elements).and_then(|()| WebHost::observe(&gallery, &gate));
    if let Err(err) = wired {
        // Takes the canvases and any listeners already installed back off the page
        gallery.borrow_mut().dispose();
        return Err(err);
    }

    Ok(Some(IconGalleryHandle { gallery }))
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let level = if cfg!(debug_assertions) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    // A second module instance may already have installed a logger
    let _ = console_log::init_with_level(level);

    Ok(())
}
