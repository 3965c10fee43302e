/// Icon3D Core Library - Shared scene, model and interaction logic
///
/// This library provides the platform-independent part of the 3D link icons:
/// model parsing and normalization, a software rasterizer used as the shared
/// offscreen renderer, the drag state machine and the gallery that drives the
/// render loop. The browser side plugs in through the `Host` and
/// `IconSurface` traits.

pub mod config;
pub mod error;
pub mod gallery;
pub mod geometry;
pub mod gltf_loader;
pub mod host;
pub mod interaction;
pub mod model;
pub mod projection;
pub mod raster;
pub mod scene;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use config::{GalleryConfig, ProjectionKind};
pub use error::{ConfigError, ModelError};
pub use gallery::{IconDescriptor, IconGallery, IconState, LoopState};
pub use geometry::{Aabb, Mesh, Triangle, Vertex};
pub use host::{attach_all, FrameHandle, Host, IconSurface};
pub use interaction::{ClickAction, DragController, DragState};
pub use projection::{Camera, ProjectionMode};
pub use raster::{PixelBuffer, SoftwareRenderer};
pub use scene::{IconScene, PivotNode};
pub use transform::{RotationState, Transform};
