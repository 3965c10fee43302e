/// glTF 2.0 / GLB model loader
///
/// Every triangle primitive reachable from the default scene is flattened into
/// a single [`Mesh`] in scene space, with node transforms applied and each
/// triangle colored by its material's base color factor.

use nalgebra::{Matrix4, Point3};

use crate::error::ModelError;
use crate::geometry::{Mesh, Triangle, Vertex, DEFAULT_COLOR};

/// Parse a GLB container or a self-contained `.gltf` document.
///
/// Buffers must be embedded (GLB binary chunk or `data:` URIs); external
/// files cannot be resolved from an in-memory slice. Images are never
/// decoded, so textures the renderer ignores cannot fail the load.
pub fn parse_gltf(data: &[u8]) -> Result<Mesh, ModelError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(data)?;
    let buffers = gltf::import_buffers(&document, None, blob)?;
    let mut mesh = Mesh::new();
    let identity = Matrix4::identity();

    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                append_node(&node, &identity, &buffers, &mut mesh);
            }
        }
        None => {
            for gltf_mesh in document.meshes() {
                append_mesh(&gltf_mesh, &identity, &buffers, &mut mesh);
            }
        }
    }

    Ok(mesh)
}

fn append_node(
    node: &gltf::Node,
    parent: &Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    mesh: &mut Mesh,
) {
    let world = parent * Matrix4::from(node.transform().matrix());

    if let Some(gltf_mesh) = node.mesh() {
        append_mesh(&gltf_mesh, &world, buffers, mesh);
    }
    for child in node.children() {
        append_node(&child, &world, buffers, mesh);
    }
}

fn append_mesh(
    gltf_mesh: &gltf::Mesh,
    world: &Matrix4<f32>,
    buffers: &[gltf::buffer::Data],
    mesh: &mut Mesh,
) {
    for primitive in gltf_mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("skipping {:?} primitive in mesh {}", primitive.mode(), gltf_mesh.index());
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let Some(positions) = reader.read_positions() else {
            continue;
        };
        let positions: Vec<Point3<f32>> = positions
            .map(|p| world.transform_point(&Point3::from(p)))
            .collect();

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..positions.len() as u32).collect(),
        };

        let material = primitive.material();
        let color = if material.index().is_some() {
            let [r, g, b, _] = material.pbr_metallic_roughness().base_color_factor();
            [r, g, b]
        } else {
            DEFAULT_COLOR
        };

        for corners in indices.chunks_exact(3) {
            let corner = |i: u32| positions.get(i as usize).copied();
            let (Some(p0), Some(p1), Some(p2)) = (corner(corners[0]), corner(corners[1]), corner(corners[2])) else {
                continue;
            };

            let vertex = |p: Point3<f32>| Vertex::new(p.x, p.y, p.z, 0.0, 0.0, 0.0);
            let mut triangle = Triangle::with_color(vertex(p0), vertex(p1), vertex(p2), color);
            let normal = triangle.calculate_normal();
            for v in &mut triangle.vertices {
                v.normal = normal;
            }
            mesh.add_triangle(triangle);
        }
    }
}
