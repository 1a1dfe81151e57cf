//! Latitude/longitude sphere meshes and their GPU buffers.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// Vertex layout for sphere meshes: position (vec3), normal (vec3), uv (vec2).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable, PartialEq)]
pub struct SphereVertex {
    /// Position on the unit sphere.
    pub position: [f32; 3],
    /// Outward normal, or inward for inside-out spheres.
    pub normal: [f32; 3],
    /// Equirectangular UV, v = 0 at the north pole.
    pub uv: [f32; 2],
}

impl SphereVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// CPU-side sphere mesh.
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

/// Generate a unit UV sphere with `slices` around the axis and `stacks` from
/// pole to pole. The texture seam sits at the back (-Z) so u = 0.5 faces the
/// eye. With `inward` the normals point at the centre and the winding flips,
/// for spheres viewed from inside.
pub fn generate_uv_sphere(slices: u32, stacks: u32, inward: bool) -> SphereMesh {
    let slices = slices.max(3);
    let stacks = stacks.max(2);

    let mut vertices = Vec::with_capacity(((slices + 1) * (stacks + 1)) as usize);
    for i in 0..=stacks {
        let v = i as f32 / stacks as f32;
        let phi = v * std::f32::consts::PI;
        for j in 0..=slices {
            let u = j as f32 / slices as f32;
            let theta = u * std::f32::consts::TAU - std::f32::consts::PI;
            let position = [phi.sin() * theta.sin(), phi.cos(), phi.sin() * theta.cos()];
            let normal = if inward {
                [-position[0], -position[1], -position[2]]
            } else {
                position
            };
            vertices.push(SphereVertex {
                position,
                normal,
                uv: [u, v],
            });
        }
    }

    let row = slices + 1;
    let mut indices = Vec::with_capacity((slices * stacks * 6) as usize);
    for i in 0..stacks {
        for j in 0..slices {
            let a = i * row + j;
            let b = a + row;
            if inward {
                indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
            } else {
                indices.extend_from_slice(&[a, b, a + 1, a + 1, b, b + 1]);
            }
        }
    }

    SphereMesh { vertices, indices }
}

/// Vertex and index buffers ready for indexed drawing.
pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl MeshBuffer {
    /// Upload a sphere mesh.
    pub fn from_sphere(device: &wgpu::Device, label: &str, mesh: &SphereMesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-vertices")),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}-indices")),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        }
    }

    /// Bind both buffers and draw every index.
    pub fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_vertex_and_index_counts() {
        let mesh = generate_uv_sphere(16, 8, false);
        assert_eq!(mesh.vertices.len(), 17 * 9);
        assert_eq!(mesh.indices.len(), 16 * 8 * 6);
    }

    #[test]
    fn test_vertices_on_unit_sphere() {
        let mesh = generate_uv_sphere(32, 16, false);
        for v in &mesh.vertices {
            let len = Vec3::from(v.position).length();
            assert!((len - 1.0).abs() < 1e-5, "vertex off the unit sphere: {len}");
        }
    }

    #[test]
    fn test_uvs_in_unit_square() {
        let mesh = generate_uv_sphere(32, 16, false);
        for v in &mesh.vertices {
            assert!((0.0..=1.0).contains(&v.uv[0]));
            assert!((0.0..=1.0).contains(&v.uv[1]));
        }
    }

    #[test]
    fn test_texture_centre_faces_eye() {
        let mesh = generate_uv_sphere(4, 2, false);
        // Equator row, middle column: u = 0.5 at +Z.
        let v = mesh.vertices[5 + 2];
        assert_eq!(v.uv, [0.5, 0.5]);
        assert!((v.position[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_indices_in_range() {
        let mesh = generate_uv_sphere(10, 10, true);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    fn winding_signs(mesh: &SphereMesh) -> Vec<f32> {
        mesh.indices
            .chunks(3)
            .filter_map(|tri| {
                let [a, b, c] = [tri[0], tri[1], tri[2]]
                    .map(|i| Vec3::from(mesh.vertices[i as usize].position));
                let n = (b - a).cross(c - a);
                // Pole triangles collapse to zero area.
                (n.length() > 1e-6).then(|| n.dot(a + b + c).signum())
            })
            .collect()
    }

    #[test]
    fn test_outward_winding_is_counter_clockwise_from_outside() {
        let mesh = generate_uv_sphere(12, 6, false);
        assert!(winding_signs(&mesh).iter().all(|&s| s > 0.0));
    }

    #[test]
    fn test_inward_sphere_flips_winding_and_normals() {
        let mesh = generate_uv_sphere(12, 6, true);
        assert!(winding_signs(&mesh).iter().all(|&s| s < 0.0));
        for v in &mesh.vertices {
            let dot = Vec3::from(v.normal).dot(Vec3::from(v.position));
            assert!(dot < 0.0);
        }
    }
}
