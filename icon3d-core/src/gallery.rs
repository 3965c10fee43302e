/// Icon gallery: owns the icons, the shared renderer and the animation loop.
///
/// All entry points are driven by platform callbacks (visibility changes,
/// frame callbacks, pointer events and finished model fetches). The gallery
/// never blocks and never calls back into itself; it only asks its [`Host`] to
/// schedule future callbacks.

use crate::config::GalleryConfig;
use crate::error::ModelError;
use crate::geometry::Mesh;
use crate::host::{FrameHandle, Host, IconSurface};
use crate::interaction::{ClickAction, DragController};
use crate::raster::SoftwareRenderer;
use crate::scene::{IconScene, PivotNode};

/// What the page provides for one icon
pub struct IconDescriptor<S> {
    pub model_path: String,
    pub link: String,
    pub surface: S,
}

/// Per-icon scene, surface and interaction state
pub struct IconState<S> {
    pub index: usize,
    pub model_path: String,
    pub link: String,
    pub surface: S,
    pub scene: IconScene,
    /// Authoritative yaw in radians
    pub manual_rotation: f32,
    pub drag: DragController,
}

impl<S> IconState<S> {
    pub fn is_loaded(&self) -> bool {
        self.scene.is_loaded()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Stopped,
    Running { pending: FrameHandle },
}

pub struct IconGallery<H: Host> {
    host: H,
    config: GalleryConfig,
    icons: Vec<IconState<H::Surface>>,
    renderer: Option<SoftwareRenderer>,
    loop_state: LoopState,
    models_requested: bool,
    disposed: bool,
}

impl<H: Host> IconGallery<H> {
    /// Build a gallery for `icons`. Returns `None` when there is nothing to
    /// show, in which case no renderer is ever created.
    pub fn new(
        host: H,
        icons: Vec<IconDescriptor<H::Surface>>,
        config: GalleryConfig,
    ) -> Option<Self> {
        if icons.is_empty() {
            return None;
        }

        let icons = icons
            .into_iter()
            .enumerate()
            .map(|(index, descriptor)| IconState {
                index,
                model_path: descriptor.model_path,
                link: descriptor.link,
                surface: descriptor.surface,
                scene: IconScene::new(&config),
                manual_rotation: 0.0,
                drag: DragController::from_config(&config),
            })
            .collect::<Vec<_>>();

        log::info!("icon gallery created with {} icons", icons.len());

        Some(Self {
            host,
            config,
            icons,
            renderer: None,
            loop_state: LoopState::Stopped,
            models_requested: false,
            disposed: false,
        })
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn icons(&self) -> &[IconState<H::Surface>] {
        &self.icons
    }

    pub fn icon(&self, index: usize) -> Option<&IconState<H::Surface>> {
        self.icons.get(index)
    }

    pub fn loop_state(&self) -> LoopState {
        self.loop_state
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.loop_state, LoopState::Running { .. })
    }

    pub fn has_renderer(&self) -> bool {
        self.renderer.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The single offscreen renderer, constructed on first use
    pub fn shared_renderer(&mut self) -> &mut SoftwareRenderer {
        let host = &self.host;
        let config = &self.config;
        self.renderer.get_or_insert_with(|| {
            let size = config.device_render_size(host.device_pixel_ratio());
            log::debug!("creating shared {size}x{size} renderer");
            SoftwareRenderer::new(size)
        })
    }

    /// Visibility gate callback
    pub fn set_visible(&mut self, visible: bool) {
        if visible {
            self.start_loop();
            self.load_models();
        } else {
            self.stop_loop();
        }
    }

    pub fn start_loop(&mut self) {
        if self.disposed || self.is_animating() {
            return;
        }
        match self.host.request_frame() {
            Some(pending) => {
                log::debug!("animation loop started");
                self.loop_state = LoopState::Running { pending };
            }
            None => log::warn!("frame request refused, animation loop stays stopped"),
        }
    }

    pub fn stop_loop(&mut self) {
        if let LoopState::Running { pending } = self.loop_state {
            self.host.cancel_frame(pending);
            self.loop_state = LoopState::Stopped;
            log::debug!("animation loop stopped");
        }
    }

    /// Request every icon's model exactly once over the gallery's lifetime
    pub fn load_models(&mut self) {
        if self.disposed || self.models_requested {
            return;
        }
        self.models_requested = true;

        for icon in &self.icons {
            self.host.fetch_model(icon.index, &icon.model_path);
        }
    }

    /// Deliver the outcome of a model fetch started by `load_models`
    pub fn on_model_loaded(&mut self, index: usize, result: Result<Mesh, ModelError>) {
        if self.disposed {
            return;
        }
        let target_size = self.config.target_size;
        let Some(icon) = self.icons.get_mut(index) else {
            log::warn!("model result for unknown icon {index}");
            return;
        };
        if icon.is_loaded() {
            return;
        }

        match result {
            Ok(mesh) => {
                log::info!(
                    "loaded {} ({} triangles)",
                    icon.model_path,
                    mesh.triangles.len()
                );
                icon.scene.pivot = Some(PivotNode::wrap(mesh, target_size));
            }
            Err(err) => {
                // The icon stays blank for the rest of the gallery's lifetime
                log::error!("failed to load {}: {err}", icon.model_path);
            }
        }
    }

    /// Frame callback. `timestamp_ms` is the platform's frame time in
    /// milliseconds.
    pub fn on_frame(&mut self, timestamp_ms: f64) {
        if !self.is_animating() {
            return;
        }
        self.loop_state = match self.host.request_frame() {
            Some(pending) => LoopState::Running { pending },
            None => LoopState::Stopped,
        };

        let seconds = (timestamp_ms / 1000.0) as f32;
        let phase_step = self.config.phase_step;

        self.shared_renderer();
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        for icon in &mut self.icons {
            let Some(pivot) = icon.scene.pivot.as_mut() else {
                continue;
            };

            if !icon.drag.is_dragging() {
                icon.manual_rotation = seconds + icon.index as f32 * phase_step;
            }
            pivot.rotation.set_yaw(icon.manual_rotation);

            renderer.render(&icon.scene);
            icon.surface.clear();
            icon.surface.blit(renderer.pixels());
        }
    }

    /// Mouse-down / touch-start on icon `index`
    pub fn pointer_down(&mut self, index: usize, x: f64) {
        if self.disposed {
            return;
        }
        if let Some(icon) = self.icons.get_mut(index) {
            icon.drag.press(x);
        }
    }

    /// Page-wide mouse-move / touch-move
    pub fn pointer_move(&mut self, x: f64) {
        if self.disposed {
            return;
        }
        for icon in &mut self.icons {
            if let Some(delta) = icon.drag.motion(x) {
                icon.manual_rotation += delta;
            }
        }
    }

    /// Page-wide mouse-up / touch-end
    pub fn pointer_up(&mut self) {
        for icon in &mut self.icons {
            icon.drag.release();
        }
    }

    /// Click on icon `index`; opens its link unless the press was a drag
    pub fn click(&mut self, index: usize) -> ClickAction {
        let Some(icon) = self.icons.get(index) else {
            return ClickAction::Suppress;
        };
        if self.disposed {
            return ClickAction::Suppress;
        }

        let action = icon.drag.click();
        if action == ClickAction::Navigate {
            self.host.open_link(&icon.link);
        }
        action
    }

    /// Stop the loop, detach every listener and observer, release meshes and
    /// the shared renderer, and remove the icon surfaces from the page.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.stop_loop();
        self.host.detach();

        for icon in &mut self.icons {
            icon.scene.pivot = None;
            icon.drag.release();
            icon.surface.remove();
        }
        self.renderer = None;
        self.disposed = true;

        log::info!("icon gallery disposed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::PixelBuffer;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Record {
        next_frame: i32,
        pending_frames: Vec<FrameHandle>,
        cancelled: Vec<FrameHandle>,
        fetches: Vec<(usize, String)>,
        opened: Vec<String>,
        listeners: usize,
        clears: usize,
        blits: usize,
        removed: usize,
    }

    struct MockHost {
        record: Rc<RefCell<Record>>,
    }

    impl Host for MockHost {
        type Surface = MockSurface;

        fn device_pixel_ratio(&self) -> f64 {
            3.0
        }

        fn request_frame(&mut self) -> Option<FrameHandle> {
            let mut record = self.record.borrow_mut();
            record.next_frame += 1;
            let handle = FrameHandle(record.next_frame);
            record.pending_frames.push(handle);
            Some(handle)
        }

        fn cancel_frame(&mut self, handle: FrameHandle) {
            let mut record = self.record.borrow_mut();
            record.pending_frames.retain(|h| *h != handle);
            record.cancelled.push(handle);
        }

        fn fetch_model(&mut self, icon: usize, path: &str) {
            self.record.borrow_mut().fetches.push((icon, path.to_string()));
        }

        fn open_link(&mut self, url: &str) {
            self.record.borrow_mut().opened.push(url.to_string());
        }

        fn detach(&mut self) {
            self.record.borrow_mut().listeners = 0;
        }
    }

    struct MockSurface {
        record: Rc<RefCell<Record>>,
    }

    impl IconSurface for MockSurface {
        fn clear(&mut self) {
            self.record.borrow_mut().clears += 1;
        }

        fn blit(&mut self, frame: &PixelBuffer) {
            assert_eq!(frame.width(), 256);
            self.record.borrow_mut().blits += 1;
        }

        fn remove(&mut self) {
            self.record.borrow_mut().removed += 1;
        }
    }

    fn gallery(count: usize) -> (IconGallery<MockHost>, Rc<RefCell<Record>>) {
        let record = Rc::new(RefCell::new(Record {
            listeners: 3,
            ..Record::default()
        }));
        let icons = (0..count)
            .map(|i| IconDescriptor {
                model_path: format!("/models/{i}.glb"),
                link: format!("https://example.com/{i}"),
                surface: MockSurface {
                    record: record.clone(),
                },
            })
            .collect();
        let host = MockHost {
            record: record.clone(),
        };
        let gallery = IconGallery::new(host, icons, GalleryConfig::default()).unwrap();
        (gallery, record)
    }

    /// Fire the most recently scheduled frame, as the platform would
    fn fire_frame(gallery: &mut IconGallery<MockHost>, record: &Rc<RefCell<Record>>, ms: f64) {
        let handle = record.borrow_mut().pending_frames.pop();
        assert!(handle.is_some(), "no frame was scheduled");
        gallery.on_frame(ms);
    }

    #[test]
    fn test_no_icons_no_gallery() {
        let record = Rc::new(RefCell::new(Record::default()));
        let host = MockHost {
            record: record.clone(),
        };
        assert!(IconGallery::new(host, Vec::new(), GalleryConfig::default()).is_none());
        let record = record.borrow();
        assert!(record.pending_frames.is_empty());
        assert!(record.fetches.is_empty());
    }

    #[test]
    fn test_renderer_is_lazy_and_single() {
        let (mut gallery, record) = gallery(2);
        assert!(!gallery.has_renderer());

        gallery.set_visible(true);
        fire_frame(&mut gallery, &record, 16.0);
        assert!(gallery.has_renderer());
        // Device pixel ratio 3 is capped at 2
        assert_eq!(gallery.shared_renderer().size(), 256);
    }

    #[test]
    fn test_models_requested_once() {
        let (mut gallery, record) = gallery(3);
        gallery.load_models();
        gallery.load_models();
        gallery.set_visible(false);
        gallery.set_visible(true);
        gallery.load_models();

        let fetches = &record.borrow().fetches;
        assert_eq!(fetches.len(), 3);
        assert_eq!(fetches[2], (2, "/models/2.glb".to_string()));
    }

    #[test]
    fn test_visible_twice_starts_one_loop() {
        let (mut gallery, record) = gallery(1);
        gallery.set_visible(true);
        gallery.set_visible(true);

        assert!(gallery.is_animating());
        assert_eq!(record.borrow().pending_frames.len(), 1);
        assert_eq!(gallery.loop_state(), LoopState::Running { pending: FrameHandle(1) });
    }

    #[test]
    fn test_frame_reschedules_itself() {
        let (mut gallery, record) = gallery(1);
        gallery.set_visible(true);
        fire_frame(&mut gallery, &record, 16.0);
        fire_frame(&mut gallery, &record, 32.0);
        assert_eq!(record.borrow().pending_frames.len(), 1);
        assert!(gallery.is_animating());
    }

    #[test]
    fn test_hidden_cancels_pending_frame_and_rendering() {
        let (mut gallery, record) = gallery(2);
        gallery.set_visible(true);
        gallery.on_model_loaded(0, Ok(Mesh::cube(1.0)));
        gallery.on_model_loaded(1, Ok(Mesh::cube(1.0)));
        fire_frame(&mut gallery, &record, 16.0);
        assert_eq!(record.borrow().blits, 2);

        gallery.set_visible(false);
        assert!(!gallery.is_animating());
        assert!(record.borrow().pending_frames.is_empty());
        assert_eq!(record.borrow().cancelled, vec![FrameHandle(2)]);

        // A stale callback after cancellation draws nothing
        gallery.on_frame(48.0);
        assert_eq!(record.borrow().blits, 2);
        assert!(record.borrow().pending_frames.is_empty());

        // State persists across the hide/show cycle
        gallery.set_visible(true);
        assert!(gallery.icon(0).unwrap().is_loaded());
        fire_frame(&mut gallery, &record, 64.0);
        assert_eq!(record.borrow().blits, 4);
    }

    #[test]
    fn test_unloaded_icons_are_skipped() {
        let (mut gallery, record) = gallery(3);
        gallery.set_visible(true);
        gallery.on_model_loaded(1, Ok(Mesh::cube(1.0)));
        gallery.on_model_loaded(2, Err(ModelError::Empty));
        fire_frame(&mut gallery, &record, 16.0);

        let record = record.borrow();
        assert_eq!(record.clears, 1);
        assert_eq!(record.blits, 1);
        assert!(!gallery.icon(2).unwrap().is_loaded());
    }

    #[test]
    fn test_second_result_for_loaded_icon_is_ignored() {
        use crate::geometry::{Triangle, Vertex};

        let (mut gallery, _record) = gallery(1);
        gallery.on_model_loaded(0, Ok(Mesh::cube(1.0)));

        let mut late = Mesh::new();
        late.add_triangle(Triangle::new(
            Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(10.0, 0.0, 0.0, 0.0, 0.0, 1.0),
            Vertex::new(0.0, 10.0, 0.0, 0.0, 0.0, 1.0),
        ));
        gallery.on_model_loaded(0, Ok(late));
        gallery.on_model_loaded(0, Err(ModelError::Empty));

        let pivot = gallery.icon(0).unwrap().scene.pivot.as_ref().unwrap();
        assert_eq!(pivot.model.triangles.len(), 12);
        let bounds = pivot.model.bounding_box().unwrap();
        assert!((bounds.max_dimension() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_loaded_model_is_normalized() {
        let (mut gallery, _record) = gallery(1);
        gallery.on_model_loaded(0, Ok(Mesh::cube(10.0)));

        let pivot = gallery.icon(0).unwrap().scene.pivot.as_ref().unwrap();
        let bounds = pivot.model.bounding_box().unwrap();
        assert!((bounds.max_dimension() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_auto_spin_is_staggered() {
        let (mut gallery, record) = gallery(3);
        gallery.set_visible(true);
        for i in 0..3 {
            gallery.on_model_loaded(i, Ok(Mesh::cube(1.0)));
        }
        fire_frame(&mut gallery, &record, 2000.0);

        for i in 0..3 {
            let icon = gallery.icon(i).unwrap();
            let expected = 2.0 + i as f32 * 0.5;
            assert!((icon.manual_rotation - expected).abs() < 1e-5);
            let yaw = icon.scene.pivot.as_ref().unwrap().rotation.yaw();
            assert!((yaw - expected).abs() < 1e-5);
        }
    }

    #[test]
    fn test_drag_overrides_auto_spin() {
        let (mut gallery, record) = gallery(2);
        gallery.set_visible(true);
        gallery.on_model_loaded(0, Ok(Mesh::cube(1.0)));
        gallery.on_model_loaded(1, Ok(Mesh::cube(1.0)));
        fire_frame(&mut gallery, &record, 1000.0);

        gallery.pointer_down(0, 50.0);
        gallery.pointer_move(100.0);
        fire_frame(&mut gallery, &record, 5000.0);

        let dragged = gallery.icon(0).unwrap();
        assert!((dragged.manual_rotation - 2.0).abs() < 1e-5);
        // The other icon keeps spinning
        assert!((gallery.icon(1).unwrap().manual_rotation - 5.5).abs() < 1e-5);

        gallery.pointer_up();
        fire_frame(&mut gallery, &record, 6000.0);
        assert!((gallery.icon(0).unwrap().manual_rotation - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_drag_suppresses_navigation() {
        let (mut gallery, record) = gallery(1);
        gallery.pointer_down(0, 200.0);
        gallery.pointer_move(210.0);
        gallery.pointer_move(195.0);
        gallery.pointer_up();

        assert!(gallery.icon(0).unwrap().drag.has_dragged());
        assert_eq!(gallery.click(0), ClickAction::Suppress);
        assert!(record.borrow().opened.is_empty());
    }

    #[test]
    fn test_tiny_drag_navigates() {
        let (mut gallery, record) = gallery(2);
        gallery.pointer_down(1, 200.0);
        gallery.pointer_move(201.0);
        gallery.pointer_up();

        assert!(!gallery.icon(1).unwrap().drag.has_dragged());
        assert_eq!(gallery.click(1), ClickAction::Navigate);
        assert_eq!(record.borrow().opened, vec!["https://example.com/1".to_string()]);
    }

    #[test]
    fn test_move_only_affects_pressed_icon() {
        let (mut gallery, _record) = gallery(2);
        gallery.pointer_down(1, 0.0);
        gallery.pointer_move(10.0);
        assert_eq!(gallery.icon(0).unwrap().manual_rotation, 0.0);
        assert!((gallery.icon(1).unwrap().manual_rotation - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_dispose_releases_everything() {
        let (mut gallery, record) = gallery(3);
        gallery.set_visible(true);
        gallery.on_model_loaded(0, Ok(Mesh::cube(1.0)));
        fire_frame(&mut gallery, &record, 16.0);

        gallery.dispose();
        gallery.dispose();

        {
            let record = record.borrow();
            assert_eq!(record.listeners, 0);
            assert_eq!(record.removed, 3);
            assert!(record.pending_frames.is_empty());
        }
        assert!(!gallery.has_renderer());
        assert!(!gallery.is_animating());
        assert!(gallery.icons().iter().all(|icon| !icon.is_loaded()));

        // Late callbacks are ignored
        gallery.set_visible(true);
        gallery.on_model_loaded(1, Ok(Mesh::cube(1.0)));
        assert!(!gallery.is_animating());
        assert!(!gallery.icon(1).unwrap().is_loaded());
        assert_eq!(gallery.click(0), ClickAction::Suppress);
    }
}
