//! Shader program registry: one descriptor per selectable visual, each
//! carrying its WGSL sources and the uniforms it accepts.

use crate::error::VizError;
use fnv::FnvHashMap;
use std::fmt;
use std::str::FromStr;

// Shaders bundled as string constants. Every program is compiled with
// UNIFORMS_WGSL prepended so all of them share one uniform block layout.
pub static UNIFORMS_WGSL: &str = include_str!("../shaders/uniforms.wgsl");
pub static FULLSCREEN_VS_WGSL: &str = include_str!("../shaders/fullscreen_vs.wgsl");
pub static PARTICLES_VS_WGSL: &str = include_str!("../shaders/particles_vs.wgsl");
pub static PARTICLES_FS_WGSL: &str = include_str!("../shaders/particles_fs.wgsl");
pub static SPHERE_VS_WGSL: &str = include_str!("../shaders/sphere_vs.wgsl");
pub static LIGHT_RESPONSIVE_FS_WGSL: &str = include_str!("../shaders/light_responsive.wgsl");
pub static RIPPLE_WGSL: &str = include_str!("../shaders/ripple.wgsl");
pub static LIGHTNING_WGSL: &str = include_str!("../shaders/lightning.wgsl");
pub static PLASMA_WGSL: &str = include_str!("../shaders/plasma.wgsl");
pub static FRACTAL_WGSL: &str = include_str!("../shaders/fractal.wgsl");
pub static PULSE_WGSL: &str = include_str!("../shaders/pulse.wgsl");
pub static SPIRAL_FLUID_WGSL: &str = include_str!("../shaders/spiral_fluid.wgsl");
pub static ENHANCED_PLASMA_WGSL: &str = include_str!("../shaders/enhanced_plasma.wgsl");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Ripple,
    Lightning,
    Plasma,
    Fractal,
    Particles,
    Pulse,
    SpiralFluid,
    LightResponsive,
    EnhancedPlasma,
}

impl ShaderKind {
    pub const ALL: [ShaderKind; 9] = [
        ShaderKind::Ripple,
        ShaderKind::Lightning,
        ShaderKind::Plasma,
        ShaderKind::Fractal,
        ShaderKind::Particles,
        ShaderKind::Pulse,
        ShaderKind::SpiralFluid,
        ShaderKind::LightResponsive,
        ShaderKind::EnhancedPlasma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShaderKind::Ripple => "ripple",
            ShaderKind::Lightning => "lightning",
            ShaderKind::Plasma => "plasma",
            ShaderKind::Fractal => "fractal",
            ShaderKind::Particles => "particles",
            ShaderKind::Pulse => "pulse",
            ShaderKind::SpiralFluid => "spiralFluid",
            ShaderKind::LightResponsive => "lightResponsive",
            ShaderKind::EnhancedPlasma => "enhancedPlasma",
        }
    }

    /// Exact-name lookup; also accepts the `enhancedPlasmaShader` spelling
    /// used by older selection menus.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == "enhancedPlasmaShader" {
            return Some(ShaderKind::EnhancedPlasma);
        }
        Self::ALL.iter().copied().find(|k| k.name() == name)
    }

    /// Neighbour in `ALL`, wrapping at both ends.
    pub fn cycle(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        Self::ALL[next]
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ShaderKind {
    type Err = VizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| VizError::UnknownShader(s.to_string()))
    }
}

/// How a scene's surface is built and which uniforms that surface needs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SceneFamily {
    FullScreen,
    Particles,
    LightResponsive,
}

impl SceneFamily {
    pub fn required_uniforms(self) -> &'static [Uniform] {
        match self {
            SceneFamily::FullScreen => &[Uniform::Time, Uniform::Intensity, Uniform::Resolution],
            SceneFamily::Particles => &[Uniform::Time, Uniform::Intensity],
            SceneFamily::LightResponsive => &[
                Uniform::Resolution,
                Uniform::PointerPosition,
                Uniform::Time,
                Uniform::Intensity,
            ],
        }
    }

    pub fn vertex_layout(self) -> VertexLayout {
        match self {
            SceneFamily::FullScreen => VertexLayout::ClipQuad,
            SceneFamily::Particles => VertexLayout::ParticleInstance,
            SceneFamily::LightResponsive => VertexLayout::PositionNormal,
        }
    }
}

/// Vertex inputs a program's vertex stage expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexLayout {
    /// location 0: clip-space corner (vec2)
    ClipQuad,
    /// location 0: billboard corner; 1..=3: per-instance position, color, size
    ParticleInstance,
    /// location 0: position; location 1: normal
    PositionNormal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Uniform {
    Time,
    Intensity,
    Resolution,
    BassIntensity,
    MidIntensity,
    HighIntensity,
    PointerPosition,
}

impl Uniform {
    pub fn name(self) -> &'static str {
        match self {
            Uniform::Time => "time",
            Uniform::Intensity => "intensity",
            Uniform::Resolution => "resolution",
            Uniform::BassIntensity => "bassIntensity",
            Uniform::MidIntensity => "midIntensity",
            Uniform::HighIntensity => "highIntensity",
            Uniform::PointerPosition => "pointerPosition",
        }
    }

    #[inline]
    pub fn is_vec2(self) -> bool {
        matches!(self, Uniform::Resolution | Uniform::PointerPosition)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
}

impl UniformValue {
    #[inline]
    pub fn is_vec2(&self) -> bool {
        matches!(self, UniformValue::Vec2(_))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformSpec {
    pub uniform: Uniform,
    pub default: UniformValue,
}

const fn float(uniform: Uniform) -> UniformSpec {
    UniformSpec {
        uniform,
        default: UniformValue::Float(0.0),
    }
}

const fn vec2(uniform: Uniform) -> UniformSpec {
    UniformSpec {
        uniform,
        default: UniformValue::Vec2([0.0, 0.0]),
    }
}

const FULLSCREEN_UNIFORMS: &[UniformSpec] = &[
    float(Uniform::Time),
    float(Uniform::Intensity),
    vec2(Uniform::Resolution),
];

const BANDED_UNIFORMS: &[UniformSpec] = &[
    float(Uniform::Time),
    float(Uniform::Intensity),
    vec2(Uniform::Resolution),
    float(Uniform::BassIntensity),
    float(Uniform::MidIntensity),
    float(Uniform::HighIntensity),
];

const PARTICLE_UNIFORMS: &[UniformSpec] = &[float(Uniform::Time), float(Uniform::Intensity)];

const LIGHT_UNIFORMS: &[UniformSpec] = &[
    vec2(Uniform::Resolution),
    vec2(Uniform::PointerPosition),
    float(Uniform::Time),
    float(Uniform::Intensity),
];

/// Immutable description of one selectable shader program.
#[derive(Clone, Copy, Debug)]
pub struct ShaderDescriptor {
    pub kind: ShaderKind,
    pub family: SceneFamily,
    pub layout: VertexLayout,
    pub vertex_source: &'static str,
    pub fragment_source: &'static str,
    pub uniforms: &'static [UniformSpec],
}

impl ShaderDescriptor {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn declares(&self, uniform: Uniform) -> bool {
        self.uniforms.iter().any(|s| s.uniform == uniform)
    }

    /// True when the program reads the low/mid/high band uniforms.
    pub fn declares_bands(&self) -> bool {
        self.declares(Uniform::BassIntensity)
            || self.declares(Uniform::MidIntensity)
            || self.declares(Uniform::HighIntensity)
    }

    fn fullscreen(
        kind: ShaderKind,
        fragment_source: &'static str,
        uniforms: &'static [UniformSpec],
    ) -> Self {
        Self {
            kind,
            family: SceneFamily::FullScreen,
            layout: VertexLayout::ClipQuad,
            vertex_source: FULLSCREEN_VS_WGSL,
            fragment_source,
            uniforms,
        }
    }

    /// The built-in descriptor for `kind`.
    pub fn builtin(kind: ShaderKind) -> Self {
        match kind {
            ShaderKind::Ripple => Self::fullscreen(kind, RIPPLE_WGSL, FULLSCREEN_UNIFORMS),
            ShaderKind::Lightning => Self::fullscreen(kind, LIGHTNING_WGSL, FULLSCREEN_UNIFORMS),
            ShaderKind::Plasma => Self::fullscreen(kind, PLASMA_WGSL, FULLSCREEN_UNIFORMS),
            ShaderKind::Fractal => Self::fullscreen(kind, FRACTAL_WGSL, FULLSCREEN_UNIFORMS),
            ShaderKind::Pulse => Self::fullscreen(kind, PULSE_WGSL, FULLSCREEN_UNIFORMS),
            ShaderKind::SpiralFluid => {
                Self::fullscreen(kind, SPIRAL_FLUID_WGSL, FULLSCREEN_UNIFORMS)
            }
            ShaderKind::EnhancedPlasma => {
                Self::fullscreen(kind, ENHANCED_PLASMA_WGSL, BANDED_UNIFORMS)
            }
            ShaderKind::Particles => Self {
                kind,
                family: SceneFamily::Particles,
                layout: VertexLayout::ParticleInstance,
                vertex_source: PARTICLES_VS_WGSL,
                fragment_source: PARTICLES_FS_WGSL,
                uniforms: PARTICLE_UNIFORMS,
            },
            ShaderKind::LightResponsive => Self {
                kind,
                family: SceneFamily::LightResponsive,
                layout: VertexLayout::PositionNormal,
                vertex_source: SPHERE_VS_WGSL,
                fragment_source: LIGHT_RESPONSIVE_FS_WGSL,
                uniforms: LIGHT_UNIFORMS,
            },
        }
    }
}

/// Name → descriptor table, filled once at startup and read-only afterwards.
pub struct ShaderRegistry {
    descriptors: FnvHashMap<ShaderKind, ShaderDescriptor>,
}

impl Default for ShaderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShaderRegistry {
    pub fn new() -> Self {
        let descriptors = ShaderKind::ALL
            .iter()
            .map(|&k| (k, ShaderDescriptor::builtin(k)))
            .collect();
        Self { descriptors }
    }

    pub fn resolve(&self, name: &str) -> Result<&ShaderDescriptor, VizError> {
        let kind: ShaderKind = name.parse()?;
        self.get(kind)
    }

    pub fn get(&self, kind: ShaderKind) -> Result<&ShaderDescriptor, VizError> {
        self.descriptors
            .get(&kind)
            .ok_or_else(|| VizError::UnknownShader(kind.name().to_string()))
    }

    /// Selectable names in menu order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        ShaderKind::ALL.iter().map(|k| k.name())
    }
}
