//! Scenes: one surface bound to one shader descriptor plus its live uniforms.
//!
//! A scene is never patched across a shader switch. The builder produces a
//! fresh one each time, so geometry and uniform sets always match the
//! descriptor they were built for.

use crate::config::SceneConfig;
use crate::constants::*;
use crate::error::VizError;
use crate::shaders::{SceneFamily, ShaderDescriptor, ShaderKind, Uniform, UniformValue};
use crate::state::{Camera, ViewportSize};
use glam::Mat4;
use rand::prelude::*;
use smallvec::SmallVec;

/// Two clip-space triangles covering the viewport.
pub const QUAD_VERTICES: [[f32; 2]; 6] = [
    [-1.0, -1.0],
    [1.0, -1.0],
    [1.0, 1.0],
    [-1.0, -1.0],
    [1.0, 1.0],
    [-1.0, 1.0],
];

/// Billboard corners expanded per particle instance.
pub const BILLBOARD_CORNERS: [[f32; 2]; 6] = QUAD_VERTICES;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub size: f32,
}

/// Drift along x: `x -= base_rate * (1 + overall)`, wrapping to `reset_to`
/// once below `lower_bound`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriftRule {
    pub base_rate: f32,
    pub lower_bound: f32,
    pub reset_to: f32,
}

impl Default for DriftRule {
    fn default() -> Self {
        Self {
            base_rate: DRIFT_BASE_RATE,
            lower_bound: DRIFT_LOWER_BOUND,
            reset_to: TUBE_LENGTH,
        }
    }
}

impl DriftRule {
    #[inline]
    pub fn step(&self, overall: f32) -> f32 {
        self.base_rate * (1.0 + overall.clamp(0.0, 1.0))
    }
}

#[derive(Clone, Debug)]
pub struct ParticleState {
    particles: Vec<Particle>,
    drift: DriftRule,
}

impl ParticleState {
    /// Scatter `count` particles over the tube wall: random angle at a fixed
    /// radius, random offset along the drift axis, random color and size.
    pub fn generate<R: Rng + ?Sized>(count: usize, drift: DriftRule, rng: &mut R) -> Self {
        let particles = (0..count)
            .map(|_| {
                let angle = rng.gen::<f32>() * std::f32::consts::TAU;
                Particle {
                    position: [
                        drift.lower_bound + rng.gen::<f32>() * (drift.reset_to - drift.lower_bound),
                        angle.sin() * TUBE_RADIUS,
                        angle.cos() * TUBE_RADIUS,
                    ],
                    color: [rng.gen(), rng.gen(), rng.gen()],
                    size: PARTICLE_SIZE_MIN + rng.gen::<f32>() * PARTICLE_SIZE_SPAN,
                }
            })
            .collect();
        Self { particles, drift }
    }

    pub fn advance(&mut self, overall: f32) {
        let step = self.drift.step(overall);
        for p in &mut self.particles {
            p.position[0] -= step;
            if p.position[0] < self.drift.lower_bound {
                p.position[0] = self.drift.reset_to;
            }
        }
    }

    #[inline]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn drift(&self) -> DriftRule {
        self.drift
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Clone, Debug)]
pub struct SphereMesh {
    pub vertices: Vec<SphereVertex>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    /// Latitude/longitude sphere; poles get a single triangle ring each.
    pub fn uv_sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let w = width_segments.max(3);
        let h = height_segments.max(2);
        let mut vertices = Vec::with_capacity(((w + 1) * (h + 1)) as usize);
        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            let theta = v * std::f32::consts::PI;
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let phi = u * std::f32::consts::TAU;
                let normal = [-phi.cos() * theta.sin(), theta.cos(), phi.sin() * theta.sin()];
                vertices.push(SphereVertex {
                    position: [normal[0] * radius, normal[1] * radius, normal[2] * radius],
                    normal,
                });
            }
        }
        let row = w + 1;
        let mut indices = Vec::with_capacity((w * h * 6) as usize);
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        Self { vertices, indices }
    }
}

/// Geometry a scene draws with.
#[derive(Clone, Debug)]
pub enum Surface {
    Quad,
    Points(ParticleState),
    Sphere(SphereMesh),
}

/// Live uniform values, keyed exactly by the descriptor's declared set.
#[derive(Clone, Debug, Default)]
pub struct UniformMap {
    entries: SmallVec<[(Uniform, UniformValue); 8]>,
}

impl UniformMap {
    #[inline]
    pub fn get(&self, uniform: Uniform) -> Option<UniformValue> {
        self.entries
            .iter()
            .find(|(u, _)| *u == uniform)
            .map(|(_, v)| *v)
    }

    pub fn keys(&self) -> impl Iterator<Item = Uniform> + '_ {
        self.entries.iter().map(|(u, _)| *u)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Uniform, UniformValue)> + '_ {
        self.entries.iter().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn slot_mut(&mut self, uniform: Uniform) -> Option<&mut UniformValue> {
        self.entries
            .iter_mut()
            .find(|(u, _)| *u == uniform)
            .map(|(_, v)| v)
    }
}

/// GPU-side mirror of `shaders/uniforms.wgsl`. Fields a program does not
/// declare stay zero.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct UniformBlock {
    pub view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
    pub time: f32,
    pub intensity: f32,
    pub bass: f32,
    pub mid: f32,
    pub high: f32,
    pub _pad: [f32; 3],
}

#[derive(Clone, Debug)]
pub struct Scene {
    descriptor: ShaderDescriptor,
    surface: Surface,
    uniforms: UniformMap,
    camera: Option<Camera>,
    geometry_dirty: bool,
}

impl Scene {
    #[inline]
    pub fn descriptor(&self) -> &ShaderDescriptor {
        &self.descriptor
    }

    #[inline]
    pub fn kind(&self) -> ShaderKind {
        self.descriptor.kind
    }

    #[inline]
    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    #[inline]
    pub fn uniforms(&self) -> &UniformMap {
        &self.uniforms
    }

    #[inline]
    pub fn uniform(&self, uniform: Uniform) -> Option<UniformValue> {
        self.uniforms.get(uniform)
    }

    #[inline]
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn particles(&self) -> Option<&ParticleState> {
        match &self.surface {
            Surface::Points(state) => Some(state),
            _ => None,
        }
    }

    /// Write one declared uniform. Undeclared names and type mismatches are
    /// contract violations.
    pub fn set_uniform(&mut self, uniform: Uniform, value: UniformValue) -> Result<(), VizError> {
        let shader = self.descriptor.name();
        let slot = self.uniforms.slot_mut(uniform).ok_or_else(|| {
            VizError::contract(shader, format!("uniform `{}` is not declared", uniform.name()))
        })?;
        if slot.is_vec2() != value.is_vec2() {
            return Err(VizError::contract(
                shader,
                format!("uniform `{}` written with the wrong type", uniform.name()),
            ));
        }
        *slot = value;
        Ok(())
    }

    /// Push a new surface size: `resolution` when declared, camera aspect when
    /// the scene has a camera.
    pub fn apply_viewport(&mut self, size: ViewportSize) -> Result<(), VizError> {
        if self.descriptor.declares(Uniform::Resolution) {
            self.set_uniform(Uniform::Resolution, UniformValue::Vec2(size.as_vec2()))?;
        }
        if let Some(cam) = &mut self.camera {
            cam.aspect = size.aspect();
        }
        Ok(())
    }

    /// Step the particle simulation, if this scene has one.
    pub fn advance_particles(&mut self, overall: f32) -> bool {
        match &mut self.surface {
            Surface::Points(state) => {
                state.advance(overall);
                self.geometry_dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Set when geometry changed since the renderer last uploaded it.
    #[inline]
    pub fn geometry_dirty(&self) -> bool {
        self.geometry_dirty
    }

    #[inline]
    pub fn clear_geometry_dirty(&mut self) {
        self.geometry_dirty = false;
    }

    /// Check the uniform map still matches the declared set exactly.
    pub fn validate(&self) -> Result<(), VizError> {
        let shader = self.descriptor.name();
        if self.uniforms.len() != self.descriptor.uniforms.len() {
            return Err(VizError::contract(
                shader,
                format!(
                    "{} live uniforms for {} declared",
                    self.uniforms.len(),
                    self.descriptor.uniforms.len()
                ),
            ));
        }
        for decl in self.descriptor.uniforms {
            if self.uniforms.get(decl.uniform).is_none() {
                return Err(VizError::contract(
                    shader,
                    format!("declared uniform `{}` has no value", decl.uniform.name()),
                ));
            }
        }
        Ok(())
    }

    pub fn uniform_block(&self) -> UniformBlock {
        let mut block: UniformBlock = bytemuck::Zeroable::zeroed();
        let (view, proj) = match &self.camera {
            Some(cam) => (cam.view_matrix(), cam.projection_matrix()),
            None => (Mat4::IDENTITY, Mat4::IDENTITY),
        };
        block.view = view.to_cols_array_2d();
        block.proj = proj.to_cols_array_2d();
        for (uniform, value) in self.uniforms.iter() {
            match (uniform, value) {
                (Uniform::Time, UniformValue::Float(v)) => block.time = v,
                (Uniform::Intensity, UniformValue::Float(v)) => block.intensity = v,
                (Uniform::BassIntensity, UniformValue::Float(v)) => block.bass = v,
                (Uniform::MidIntensity, UniformValue::Float(v)) => block.mid = v,
                (Uniform::HighIntensity, UniformValue::Float(v)) => block.high = v,
                (Uniform::Resolution, UniformValue::Vec2(v)) => block.resolution = v,
                (Uniform::PointerPosition, UniformValue::Vec2(v)) => block.pointer = v,
                _ => {}
            }
        }
        block
    }
}

/// Builds scenes from descriptors, validating each descriptor's contract
/// against its family before any geometry is allocated.
pub struct SceneBuilder {
    config: SceneConfig,
    rng: StdRng,
}

impl SceneBuilder {
    pub fn new(config: SceneConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { config, rng }
    }

    #[inline]
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn build(
        &mut self,
        descriptor: &ShaderDescriptor,
        viewport: ViewportSize,
    ) -> Result<Scene, VizError> {
        check_contract(descriptor)?;

        let mut uniforms = UniformMap::default();
        for decl in descriptor.uniforms {
            uniforms.entries.push((decl.uniform, decl.default));
        }

        let (surface, camera) = match descriptor.family {
            SceneFamily::FullScreen => (Surface::Quad, None),
            SceneFamily::Particles => (
                Surface::Points(ParticleState::generate(
                    self.config.particle_count,
                    DriftRule::default(),
                    &mut self.rng,
                )),
                Some(Camera::tunnel(viewport.aspect())),
            ),
            SceneFamily::LightResponsive => (
                Surface::Sphere(SphereMesh::uv_sphere(
                    SPHERE_RADIUS,
                    SPHERE_SEGMENTS,
                    SPHERE_SEGMENTS,
                )),
                Some(Camera::sphere(viewport.aspect())),
            ),
        };

        let mut scene = Scene {
            descriptor: *descriptor,
            surface,
            uniforms,
            camera,
            geometry_dirty: true,
        };
        scene.apply_viewport(viewport)?;
        if descriptor.declares(Uniform::PointerPosition) {
            let [w, h] = viewport.as_vec2();
            scene.set_uniform(Uniform::PointerPosition, UniformValue::Vec2([w * 0.5, h * 0.5]))?;
        }
        scene.validate()?;
        Ok(scene)
    }
}

fn check_contract(descriptor: &ShaderDescriptor) -> Result<(), VizError> {
    let shader = descriptor.name();
    let expected_layout = descriptor.family.vertex_layout();
    if descriptor.layout != expected_layout {
        return Err(VizError::contract(
            shader,
            format!(
                "vertex layout {:?} does not fit the {:?} family (needs {:?})",
                descriptor.layout, descriptor.family, expected_layout
            ),
        ));
    }
    for &required in descriptor.family.required_uniforms() {
        if !descriptor.declares(required) {
            return Err(VizError::contract(
                shader,
                format!("missing required uniform `{}`", required.name()),
            ));
        }
    }
    for (i, decl) in descriptor.uniforms.iter().enumerate() {
        if descriptor.uniforms[..i].iter().any(|s| s.uniform == decl.uniform) {
            return Err(VizError::contract(
                shader,
                format!("uniform `{}` declared twice", decl.uniform.name()),
            ));
        }
        if decl.uniform.is_vec2() != decl.default.is_vec2() {
            return Err(VizError::contract(
                shader,
                format!("default for `{}` has the wrong type", decl.uniform.name()),
            ));
        }
    }
    Ok(())
}
