use app_core::{ShaderDescriptor, VertexLayout, UNIFORMS_WGSL};

// slot 0: clip-space corner, shared by quads and particle billboards
const CORNER_ATTRS: [wgpu::VertexAttribute; 1] = [wgpu::VertexAttribute {
    format: wgpu::VertexFormat::Float32x2,
    offset: 0,
    shader_location: 0,
}];

// slot 1: app_core::Particle
const PARTICLE_ATTRS: [wgpu::VertexAttribute; 3] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 1,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 12,
        shader_location: 2,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32,
        offset: 24,
        shader_location: 3,
    },
];

// slot 0: app_core::SphereVertex
const MESH_ATTRS: [wgpu::VertexAttribute; 2] = [
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 0,
        shader_location: 0,
    },
    wgpu::VertexAttribute {
        format: wgpu::VertexFormat::Float32x3,
        offset: 12,
        shader_location: 1,
    },
];

fn corner_buffer() -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: (std::mem::size_of::<f32>() * 2) as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &CORNER_ATTRS,
    }
}

pub fn vertex_buffers(layout: VertexLayout) -> Vec<wgpu::VertexBufferLayout<'static>> {
    match layout {
        VertexLayout::ClipQuad => vec![corner_buffer()],
        VertexLayout::ParticleInstance => vec![
            corner_buffer(),
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<app_core::Particle>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &PARTICLE_ATTRS,
            },
        ],
        VertexLayout::PositionNormal => vec![wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<app_core::SphereVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &MESH_ATTRS,
        }],
    }
}

/// Stage source with the shared uniform block prepended.
pub fn compose_source(stage: &str) -> String {
    let mut src = String::with_capacity(UNIFORMS_WGSL.len() + stage.len() + 1);
    src.push_str(UNIFORMS_WGSL);
    src.push('\n');
    src.push_str(stage);
    src
}

pub fn make_scene_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    descriptor: &ShaderDescriptor,
    color_format: wgpu::TextureFormat,
) -> wgpu::RenderPipeline {
    let name = descriptor.name();
    let vs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{name}_vs")),
        source: wgpu::ShaderSource::Wgsl(compose_source(descriptor.vertex_source).into()),
    });
    let fs = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{name}_fs")),
        source: wgpu::ShaderSource::Wgsl(compose_source(descriptor.fragment_source).into()),
    });

    // Quads and particles blend over the clear colour; the sphere is opaque
    // and, like a front-side material, drops its back faces.
    let (blend, cull_mode) = match descriptor.layout {
        VertexLayout::ClipQuad | VertexLayout::ParticleInstance => {
            (Some(wgpu::BlendState::ALPHA_BLENDING), None)
        }
        VertexLayout::PositionNormal => (Some(wgpu::BlendState::REPLACE), Some(wgpu::Face::Back)),
    };
    let buffers = vertex_buffers(descriptor.layout);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&format!("{name}_pipeline")),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &vs,
            entry_point: Some("vs_main"),
            buffers: &buffers,
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode,
            ..Default::default()
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        fragment: Some(wgpu::FragmentState {
            module: &fs,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        cache: None,
        multiview: None,
    })
}
