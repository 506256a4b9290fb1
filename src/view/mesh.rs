use std::f32::consts::{PI, TAU};

use bytemuck::NoUninit;
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4,
        3 => Float32x2
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    pub fn upload(&self, device: &wgpu::Device, label: &str) -> MeshBuffer {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertices")),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_indices")),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Flat plane on XZ centered at the origin, facing +Y.
/// `res_x`/`res_z` are the number of quads along each axis.
pub fn plane(width: f32, length: f32, res_x: u32, res_z: u32) -> Mesh {
    let (res_x, res_z) = (res_x.max(1), res_z.max(1));
    let mut vertices = Vec::with_capacity(((res_x + 1) * (res_z + 1)) as usize);
    for iz in 0..=res_z {
        for ix in 0..=res_x {
            let u = ix as f32 / res_x as f32;
            let v = iz as f32 / res_z as f32;
            vertices.push(Vertex {
                pos: [(u - 0.5) * width, 0.0, (v - 0.5) * length],
                normal: [0.0, 1.0, 0.0],
                color: WHITE,
                uv: [u, v],
            });
        }
    }

    let row = res_x + 1;
    let mut indices = Vec::with_capacity((res_x * res_z * 6) as usize);
    for iz in 0..res_z {
        for ix in 0..res_x {
            let i00 = iz * row + ix;
            let i10 = i00 + 1;
            let i01 = i00 + row;
            let i11 = i01 + 1;
            // counter-clockwise seen from +Y
            indices.extend_from_slice(&[i00, i01, i10, i10, i01, i11]);
        }
    }

    Mesh { vertices, indices }
}

fn sphere_vertices(radius: f32, rings: u32, slices: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity(((rings + 1) * (slices + 1)) as usize);
    for ring in 0..=rings {
        let phi = PI * ring as f32 / rings as f32;
        for slice in 0..=slices {
            let theta = TAU * slice as f32 / slices as f32;
            let normal = [phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin()];
            vertices.push(Vertex {
                pos: normal.map(|n| n * radius),
                normal,
                color: WHITE,
                uv: [slice as f32 / slices as f32, ring as f32 / rings as f32],
            });
        }
    }
    vertices
}

/// UV sphere centered at the origin.
pub fn sphere(radius: f32, rings: u32, slices: u32) -> Mesh {
    let (rings, slices) = (rings.max(2), slices.max(3));
    let vertices = sphere_vertices(radius, rings, slices);

    let row = slices + 1;
    let mut indices = Vec::with_capacity((rings * slices * 6) as usize);
    for ring in 0..rings {
        for slice in 0..slices {
            let a = ring * row + slice;
            let b = a + row;
            indices.extend_from_slice(&[a, a + 1, b, a + 1, b + 1, b]);
        }
    }

    Mesh { vertices, indices }
}

/// Same sphere as a line list (latitude and longitude lines).
pub fn sphere_wires(radius: f32, rings: u32, slices: u32) -> Mesh {
    let (rings, slices) = (rings.max(2), slices.max(3));
    let vertices = sphere_vertices(radius, rings, slices);

    let row = slices + 1;
    let mut indices = Vec::new();
    for ring in 0..=rings {
        for slice in 0..slices {
            let a = ring * row + slice;
            // skip degenerate circles at the poles
            if ring != 0 && ring != rings {
                indices.extend_from_slice(&[a, a + 1]);
            }
            if ring < rings {
                indices.extend_from_slice(&[a, a + row]);
            }
        }
    }

    Mesh { vertices, indices }
}

/// Reference grid on XZ as a line list, center lines darker.
pub fn grid(slices: u32, spacing: f32) -> Mesh {
    let half = (slices / 2) as i32;
    let extent = half as f32 * spacing;
    let mut vertices = Vec::new();
    let mut line = |from: [f32; 3], to: [f32; 3], color: [f32; 4]| {
        for pos in [from, to] {
            vertices.push(Vertex { pos, normal: [0.0, 1.0, 0.0], color, uv: [0.0, 0.0] });
        }
    };

    for i in -half..=half {
        let color = if i == 0 { [0.5, 0.5, 0.5, 1.0] } else { [0.75, 0.75, 0.75, 1.0] };
        let offset = i as f32 * spacing;
        line([offset, 0.0, -extent], [offset, 0.0, extent], color);
        line([-extent, 0.0, offset], [extent, 0.0, offset], color);
    }

    let indices = (0..vertices.len() as u32).collect();
    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn triangle_normal(mesh: &Mesh, tri: &[u32]) -> Vec3 {
        let p = |i: u32| Vec3::from(mesh.vertices[i as usize].pos);
        (p(tri[1]) - p(tri[0])).cross(p(tri[2]) - p(tri[0]))
    }

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(std::mem::size_of::<Vertex>(), 48);
        assert_eq!(Vertex::ATTRIBUTES[3].offset, 40);
    }

    #[test]
    fn plane_faces_up() {
        let mesh = plane(30.0, 30.0, 3, 3);
        assert_eq!(mesh.vertices.len(), 16);
        assert_eq!(mesh.indices.len(), 3 * 3 * 6);
        for tri in mesh.indices.chunks(3) {
            assert!(triangle_normal(&mesh, tri).y > 0.0);
        }
        let max_x = mesh.vertices.iter().map(|v| v.pos[0]).fold(f32::MIN, f32::max);
        assert_eq!(max_x, 15.0);
    }

    #[test]
    fn sphere_vertices_sit_on_the_radius() {
        let mesh = sphere(2.0, 30, 30);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.pos).length() - 2.0).abs() < 1e-4);
        }
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn sphere_triangles_face_outward() {
        let mesh = sphere(1.0, 8, 8);
        for tri in mesh.indices.chunks(3) {
            let normal = triangle_normal(&mesh, tri);
            if normal.length_squared() < 1e-10 {
                continue; // pole triangles collapse to lines
            }
            let center = tri.iter().map(|&i| Vec3::from(mesh.vertices[i as usize].pos)).sum::<Vec3>() / 3.0;
            assert!(normal.dot(center) > 0.0);
        }
    }

    #[test]
    fn wire_sphere_is_a_line_list() {
        let mesh = sphere_wires(0.2, 8, 8);
        assert_eq!(mesh.indices.len() % 2, 0);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.vertices.len()));
    }

    #[test]
    fn grid_has_two_lines_per_slice() {
        let mesh = grid(30, 1.0);
        // 31 offsets (-15..=15), two lines each, two vertices per line
        assert_eq!(mesh.vertices.len(), 31 * 2 * 2);
        assert_eq!(mesh.indices.len(), mesh.vertices.len());
    }
}
