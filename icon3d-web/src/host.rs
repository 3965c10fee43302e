/// Browser implementation of the gallery's host services
use std::cell::RefCell;
use std::rc::{Rc, Weak};

use icon3d_core::{model::parse_model, FrameHandle, Host, IconGallery};
use js_sys::Array;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit, Window};

use crate::fetch::fetch_bytes;
use crate::listeners::ListenerSet;
use crate::surface::CanvasSurface;

pub type SharedGallery = Rc<RefCell<IconGallery<WebHost>>>;
type WeakGallery = Weak<RefCell<IconGallery<WebHost>>>;

pub struct WebHost {
    window: Window,
    link_target: String,
    gallery: WeakGallery,
    frame_callback: Option<Closure<dyn FnMut(f64)>>,
    pending_frame: Option<i32>,
    observer: Option<(IntersectionObserver, Closure<dyn FnMut(Array)>)>,
    listeners: ListenerSet,
}

impl WebHost {
    pub fn new(window: Window, link_target: String) -> Self {
        Self {
            window,
            link_target,
            gallery: Weak::new(),
            frame_callback: None,
            pending_frame: None,
            observer: None,
            listeners: ListenerSet::new(),
        }
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn listeners(&self) -> &ListenerSet {
        &self.listeners
    }

    pub fn listeners_mut(&mut self) -> &mut ListenerSet {
        &mut self.listeners
    }

    /// Bind the host to the gallery that owns it and create the frame
    /// callback. Must run before the gallery is first made visible.
    pub fn bind(gallery: &SharedGallery) {
        let weak = Rc::downgrade(gallery);
        let frame_target = weak.clone();
        let frame_callback = Closure::wrap(Box::new(move |timestamp: f64| {
            if let Some(gallery) = frame_target.upgrade() {
                let mut gallery = gallery.borrow_mut();
                gallery.host_mut().pending_frame = None;
                gallery.on_frame(timestamp);
            }
        }) as Box<dyn FnMut(f64)>);

        let mut gallery = gallery.borrow_mut();
        let host = gallery.host_mut();
        host.gallery = weak;
        host.frame_callback = Some(frame_callback);
    }

    /// Watch `gate` with a zero-threshold intersection observer that toggles
    /// the gallery's visibility.
    pub fn observe(gallery: &SharedGallery, gate: &Element) -> Result<(), JsValue> {
        let weak = Rc::downgrade(gallery);
        let callback = Closure::wrap(Box::new(move |entries: Array| {
            let visible = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .last()
                .map(|entry| entry.is_intersecting());

            if let (Some(visible), Some(gallery)) = (visible, weak.upgrade()) {
                gallery.borrow_mut().set_visible(visible);
            }
        }) as Box<dyn FnMut(Array)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(0.0));
        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)?;
        observer.observe(gate);

        gallery.borrow_mut().host_mut().observer = Some((observer, callback));
        Ok(())
    }

    fn unobserve(&mut self) {
        if let Some((observer, _callback)) = self.observer.take() {
            observer.disconnect();
        }
    }
}

impl Host for WebHost {
    type Surface = CanvasSurface;

    fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn request_frame(&mut self) -> Option<FrameHandle> {
        let callback = self.frame_callback.as_ref()?;
        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => {
                self.pending_frame = Some(id);
                Some(FrameHandle(id))
            }
            Err(err) => {
                log::error!("requestAnimationFrame failed: {:?}", err);
                None
            }
        }
    }

    fn cancel_frame(&mut self, handle: FrameHandle) {
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            log::warn!("cancelAnimationFrame failed: {:?}", err);
        }
        if self.pending_frame == Some(handle.0) {
            self.pending_frame = None;
        }
    }

    fn fetch_model(&mut self, icon: usize, path: &str) {
        let gallery = self.gallery.clone();
        let window = self.window.clone();
        let path = path.to_string();

        wasm_bindgen_futures::spawn_local(async move {
            let result = match fetch_bytes(&window, &path).await {
                Ok(bytes) => parse_model(&path, &bytes),
                Err(err) => Err(err),
            };
            if let Some(gallery) = gallery.upgrade() {
                gallery.borrow_mut().on_model_loaded(icon, result);
            }
        });
    }

    fn open_link(&mut self, url: &str) {
        if url.is_empty() {
            return;
        }
        if let Err(err) = self.window.open_with_url_and_target(url, &self.link_target) {
            log::error!("failed to open {url}: {:?}", err);
        }
    }

    fn detach(&mut self) {
        self.unobserve();
        self.listeners.remove_all();
    }
}

impl Drop for WebHost {
    fn drop(&mut self) {
        // Closures die with the host, so nothing may still call into them
        if let Some(id) = self.pending_frame.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.detach();
    }
}
