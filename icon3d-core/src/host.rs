/// Platform seams used by the gallery.
///
/// The browser (or a test double) implements [`Host`] for page-level services
/// and [`IconSurface`] for each icon's visible 2D canvas.

use crate::raster::PixelBuffer;

/// Identifier of a scheduled frame callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHandle(pub i32);

/// A visible 2D drawing surface owned by one icon
pub trait IconSurface {
    fn clear(&mut self);

    /// Draw `frame` scaled to the surface's device-pixel dimensions
    fn blit(&mut self, frame: &PixelBuffer);

    /// Detach the surface from the page
    fn remove(&mut self);
}

/// Page-level services the gallery drives
pub trait Host {
    type Surface: IconSurface;

    fn device_pixel_ratio(&self) -> f64;

    /// Schedule one call to `IconGallery::on_frame`. `None` if the platform
    /// refused to schedule.
    fn request_frame(&mut self) -> Option<FrameHandle>;

    fn cancel_frame(&mut self, handle: FrameHandle);

    /// Start an asynchronous fetch of the model at `path`; the result is
    /// delivered later through `IconGallery::on_model_loaded(icon, ..)`.
    fn fetch_model(&mut self, icon: usize, path: &str);

    /// Open `url` in a new browsing context
    fn open_link(&mut self, url: &str);

    /// Disconnect the visibility observer and remove every event listener
    /// the host installed.
    fn detach(&mut self);
}

/// Create one surface per item. If any creation fails, the surfaces created
/// so far are removed before the error is returned.
pub fn attach_all<T, S, E>(
    items: impl IntoIterator<Item = T>,
    mut attach: impl FnMut(T) -> Result<S, E>,
) -> Result<Vec<S>, E>
where
    S: IconSurface,
{
    let mut surfaces = Vec::new();
    for item in items {
        match attach(item) {
            Ok(surface) => surfaces.push(surface),
            Err(err) => {
                for surface in &mut surfaces {
                    surface.remove();
                }
                return Err(err);
            }
        }
    }
    Ok(surfaces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Surface that records its own id when removed
    struct Slot {
        id: usize,
        removed: Rc<RefCell<Vec<usize>>>,
    }

    impl IconSurface for Slot {
        fn clear(&mut self) {}

        fn blit(&mut self, _frame: &PixelBuffer) {}

        fn remove(&mut self) {
            self.removed.borrow_mut().push(self.id);
        }
    }

    #[test]
    fn test_attach_all_keeps_every_surface() {
        let removed = Rc::new(RefCell::new(Vec::new()));
        let surfaces = attach_all(0..3, |id| {
            Ok::<_, String>(Slot {
                id,
                removed: removed.clone(),
            })
        })
        .unwrap();

        assert_eq!(surfaces.len(), 3);
        assert!(removed.borrow().is_empty());
    }

    #[test]
    fn test_attach_failure_removes_earlier_surfaces() {
        let removed = Rc::new(RefCell::new(Vec::new()));
        let result = attach_all(0..4, |id| {
            if id == 2 {
                return Err(format!("container {id} rejected the canvas"));
            }
            Ok(Slot {
                id,
                removed: removed.clone(),
            })
        });

        assert_eq!(result.err().as_deref(), Some("container 2 rejected the canvas"));
        assert_eq!(*removed.borrow(), vec![0, 1]);
    }
}
