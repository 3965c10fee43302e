/// Canvas-backed icon surfaces and the hidden staging canvas
use std::rc::Rc;

use icon3d_core::{IconSurface, PixelBuffer};
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlElement, ImageData};

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D canvas context not supported"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

/// Offscreen canvas holding the shared renderer's latest frame. Never
/// attached to the document.
pub struct StagingCanvas {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl StagingCanvas {
    pub fn new(document: &Document) -> Result<Self, JsValue> {
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let context = context_2d(&canvas)?;
        Ok(Self { canvas, context })
    }

    fn stage(&self, frame: &PixelBuffer) -> Result<(), JsValue> {
        if self.canvas.width() != frame.width() || self.canvas.height() != frame.height() {
            self.canvas.set_width(frame.width());
            self.canvas.set_height(frame.height());
        }
        let image = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(frame.data()),
            frame.width(),
            frame.height(),
        )?;
        self.context.put_image_data(&image, 0.0, 0.0)
    }
}

/// Visible canvas injected into one icon container
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
    staging: Rc<StagingCanvas>,
}

impl CanvasSurface {
    /// Create a canvas filling `container`, sized in device pixels, and
    /// append it.
    pub fn attach(
        document: &Document,
        container: &HtmlElement,
        staging: Rc<StagingCanvas>,
        css_fallback: u32,
        device_pixel_ratio: f64,
    ) -> Result<Self, JsValue> {
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;

        let css_width = match container.client_width() {
            w if w > 0 => w as f64,
            _ => css_fallback as f64,
        };
        let css_height = match container.client_height() {
            h if h > 0 => h as f64,
            _ => css_width,
        };
        canvas.set_width((css_width * device_pixel_ratio).round().max(1.0) as u32);
        canvas.set_height((css_height * device_pixel_ratio).round().max(1.0) as u32);

        let style = canvas.style();
        style.set_property("display", "block")?;
        style.set_property("width", "100%")?;
        style.set_property("height", "100%")?;

        let context = context_2d(&canvas)?;
        container.append_child(&canvas)?;

        Ok(Self {
            canvas,
            context,
            staging,
        })
    }
}

impl IconSurface for CanvasSurface {
    fn clear(&mut self) {
        self.context.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn blit(&mut self, frame: &PixelBuffer) {
        let drawn = self.staging.stage(frame).and_then(|()| {
            self.context.draw_image_with_html_canvas_element_and_dw_and_dh(
                &self.staging.canvas,
                0.0,
                0.0,
                self.canvas.width() as f64,
                self.canvas.height() as f64,
            )
        });
        if let Err(err) = drawn {
            log::warn!("blit failed: {:?}", err);
        }
    }

    fn remove(&mut self) {
        self.canvas.remove();
    }
}
