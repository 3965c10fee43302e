/// Software rasterizer acting as the shared offscreen renderer
use nalgebra::Point3;

use crate::geometry::Triangle;
use crate::projection::Camera;
use crate::scene::{IconScene, Lighting};
use crate::transform::Transform;

/// Tightly packed RGBA8 image, row-major, top row first
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2], self.data[idx + 3]]
    }

    fn clear(&mut self) {
        self.data.fill(0);
    }

    fn put(&mut self, idx: usize, rgba: [u8; 4]) {
        self.data[idx * 4..idx * 4 + 4].copy_from_slice(&rgba);
    }
}

/// Square offscreen render target shared by every icon
pub struct SoftwareRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    pixels: PixelBuffer,
}

impl SoftwareRenderer {
    pub fn new(size: u32) -> Self {
        let size = size.max(1);
        let len = size as usize * size as usize;
        Self {
            width: size as usize,
            height: size as usize,
            depth_buffer: vec![f32::INFINITY; len],
            pixels: PixelBuffer::new(size, size),
        }
    }

    pub fn size(&self) -> u32 {
        self.width as u32
    }

    /// Backing pixels of the last rendered frame
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.pixels.clear();
    }

    /// Draw `scene` from its camera, replacing the previous frame.
    ///
    /// A scene without a pivot node leaves a fully transparent frame.
    pub fn render(&mut self, scene: &IconScene) {
        self.clear();

        let Some(pivot) = &scene.pivot else {
            return;
        };

        let model = pivot.model_matrix();
        let mvp = Transform::mvp_matrix(&model, &scene.camera.view_matrix(), &scene.camera.projection_matrix());

        for triangle in &pivot.model.triangles {
            self.render_triangle(triangle, &model, &mvp, &scene.lighting);
        }
    }

    fn render_triangle(
        &mut self,
        triangle: &Triangle,
        model: &nalgebra::Matrix4<f32>,
        mvp: &nalgebra::Matrix4<f32>,
        lighting: &Lighting,
    ) {
        let mut screen = [(0.0f32, 0.0f32, 0.0f32); 3];
        for (slot, vertex) in screen.iter_mut().zip(&triangle.vertices) {
            match Camera::project_to_screen(mvp, &vertex.position, self.width as u32, self.height as u32) {
                Some(projected) => *slot = projected,
                None => return, // Triangle is clipped
            }
        }

        // Flat two-sided shading on the world-space face normal
        let world: [Point3<f32>; 3] = [
            model.transform_point(&triangle.vertices[0].position),
            model.transform_point(&triangle.vertices[1].position),
            model.transform_point(&triangle.vertices[2].position),
        ];
        let normal = (world[1] - world[0]).cross(&(world[2] - world[0]));
        let diffuse = normal
            .try_normalize(1e-12)
            .map(|n| n.dot(&lighting.direction).abs())
            .unwrap_or(0.0);
        let intensity = (lighting.ambient + lighting.directional * diffuse).min(1.0);

        let channel = |c: f32| ((c * intensity).clamp(0.0, 1.0) * 255.0).round() as u8;
        let rgba = [
            channel(triangle.color[0]),
            channel(triangle.color[1]),
            channel(triangle.color[2]),
            255,
        ];

        self.rasterize_triangle(&screen, rgba);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], rgba: [u8; 4]) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to target bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py)) else {
                    return; // Degenerate in screen space
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.pixels.put(idx, rgba);
                }
            }
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
