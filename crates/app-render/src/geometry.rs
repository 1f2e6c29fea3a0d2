use app_core::Surface;
use wgpu::util::DeviceExt;

/// GPU buffers for one scene's surface. The clip quad itself is owned by the
/// renderer and shared between scenes.
pub enum SceneGeometry {
    Quad,
    Instances {
        buffer: wgpu::Buffer,
        count: u32,
    },
    Indexed {
        vertices: wgpu::Buffer,
        indices: wgpu::Buffer,
        count: u32,
    },
}

impl SceneGeometry {
    pub fn upload(device: &wgpu::Device, surface: &Surface) -> Self {
        match surface {
            Surface::Quad => SceneGeometry::Quad,
            Surface::Points(state) => {
                let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("particle_instances"),
                    contents: bytemuck::cast_slice(state.particles()),
                    usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                });
                SceneGeometry::Instances {
                    buffer,
                    count: state.len() as u32,
                }
            }
            Surface::Sphere(mesh) => {
                let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("sphere_vb"),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                });
                let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("sphere_ib"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                SceneGeometry::Indexed {
                    vertices,
                    indices,
                    count: mesh.indices.len() as u32,
                }
            }
        }
    }

    /// Re-upload mutable geometry. Only particle instances change per frame.
    pub fn refresh(&self, queue: &wgpu::Queue, surface: &Surface) {
        if let (SceneGeometry::Instances { buffer, .. }, Surface::Points(state)) = (self, surface) {
            if !state.is_empty() {
                queue.write_buffer(buffer, 0, bytemuck::cast_slice(state.particles()));
            }
        }
    }

    pub fn record(&self, rpass: &mut wgpu::RenderPass<'_>, quad_vb: &wgpu::Buffer) {
        let quad_len = app_core::QUAD_VERTICES.len() as u32;
        match self {
            SceneGeometry::Quad => {
                rpass.set_vertex_buffer(0, quad_vb.slice(..));
                rpass.draw(0..quad_len, 0..1);
            }
            SceneGeometry::Instances { buffer, count } => {
                if *count == 0 {
                    return;
                }
                rpass.set_vertex_buffer(0, quad_vb.slice(..));
                rpass.set_vertex_buffer(1, buffer.slice(..));
                rpass.draw(0..quad_len, 0..*count);
            }
            SceneGeometry::Indexed {
                vertices,
                indices,
                count,
            } => {
                rpass.set_vertex_buffer(0, vertices.slice(..));
                rpass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                rpass.draw_indexed(0..*count, 0, 0..1);
            }
        }
    }
}
