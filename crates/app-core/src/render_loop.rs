//! Per-frame controller driving analyzer → reducer → scene → renderer.
//!
//! Frontends own the actual refresh callback (requestAnimationFrame or a
//! winit redraw) and call [`RenderLoop::frame`] from it. Everything that can
//! arrive between frames (shader switches, resizes, pointer moves) is queued
//! here and applied at the start of the next frame.

use crate::analyzer::{FrequencyAnalyzer, SpectrumSource};
use crate::config::VisualizerConfig;
use crate::error::VizError;
use crate::intensity;
use crate::scene::{Scene, SceneBuilder};
use crate::shaders::{ShaderKind, ShaderRegistry, Uniform, UniformValue};
use crate::state::ViewportSize;
use crate::viewport::ViewportManager;
use instant::Instant;

/// GPU backend seam. `prepare` runs once per freshly built scene, `draw`
/// once per frame.
pub trait Renderer {
    /// Create pipelines and upload geometry for a new scene.
    fn prepare(&mut self, scene: &Scene) -> anyhow::Result<()>;
    fn resize(&mut self, size: ViewportSize);
    /// Issue one draw of `scene`. Geometry is re-uploaded when the scene
    /// reports it dirty.
    fn draw(&mut self, scene: &Scene) -> anyhow::Result<()>;
    /// Drop scene resources; the surface itself may outlive this call.
    fn release(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SkipReason {
    NoScene,
    /// The analyzer has no signal to capture from yet.
    NoSource,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Drawn,
    Skipped(SkipReason),
    /// The scene faulted this frame or earlier; see [`RenderLoop::fault`].
    Faulted,
    Stopped,
}

impl FrameOutcome {
    /// Whether the host should schedule another frame.
    #[inline]
    pub fn should_rearm(self) -> bool {
        !matches!(self, FrameOutcome::Stopped)
    }
}

pub struct RenderLoop {
    analyzer: FrequencyAnalyzer,
    registry: ShaderRegistry,
    builder: SceneBuilder,
    viewport: ViewportManager,
    scene: Option<Scene>,
    selected: ShaderKind,
    pending_shader: Option<ShaderKind>,
    pending_pointer: Option<[f32; 2]>,
    pointer: Option<[f32; 2]>,
    state: LoopState,
    fault: Option<VizError>,
    started_at: Instant,
    torn_down: bool,
    skip_logged: bool,
}

impl RenderLoop {
    pub fn new(config: VisualizerConfig, viewport: ViewportSize) -> Result<Self, VizError> {
        let analyzer = FrequencyAnalyzer::new(config.analyzer)?;
        // A zero-sized surface at startup is held at 1x1, the smallest size a
        // renderer configures, until the first real resize arrives.
        let manager = ViewportManager::new(ViewportSize::new(
            viewport.width.max(1),
            viewport.height.max(1),
        ));
        log::info!(
            "[loop] created: shader={} viewport={}x{} particles={}",
            config.initial_shader,
            manager.current().width,
            manager.current().height,
            config.scene.particle_count
        );
        Ok(Self {
            analyzer,
            registry: ShaderRegistry::new(),
            builder: SceneBuilder::new(config.scene),
            viewport: manager,
            scene: None,
            selected: config.initial_shader,
            pending_shader: Some(config.initial_shader),
            pending_pointer: None,
            pointer: None,
            state: LoopState::Idle,
            fault: None,
            started_at: Instant::now(),
            torn_down: false,
            skip_logged: false,
        })
    }

    #[inline]
    pub fn state(&self) -> LoopState {
        self.state
    }

    #[inline]
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Shader that is (or will be, after the next frame) on screen.
    #[inline]
    pub fn selected(&self) -> ShaderKind {
        self.selected
    }

    #[inline]
    pub fn fault(&self) -> Option<&VizError> {
        self.fault.as_ref()
    }

    #[inline]
    pub fn viewport(&self) -> ViewportSize {
        self.viewport.current()
    }

    #[inline]
    pub fn registry(&self) -> &ShaderRegistry {
        &self.registry
    }

    #[inline]
    pub fn analyzer(&self) -> &FrequencyAnalyzer {
        &self.analyzer
    }

    #[inline]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Queue a shader switch by name. Unknown names are rejected and the
    /// current scene keeps drawing.
    pub fn request_shader(&mut self, name: &str) -> Result<ShaderKind, VizError> {
        match self.registry.resolve(name) {
            Ok(desc) => {
                let kind = desc.kind;
                self.selected = kind;
                self.pending_shader = Some(kind);
                Ok(kind)
            }
            Err(err) => {
                log::warn!("[loop] rejected shader selection: {err}");
                Err(err)
            }
        }
    }

    /// Queue a rebuild of the selected shader, clearing a prior fault.
    pub fn rebuild(&mut self) {
        self.pending_shader = Some(self.selected);
    }

    pub fn request_resize(&mut self, width: u32, height: u32) -> bool {
        self.viewport.request_resize(width, height)
    }

    /// Pointer position in surface pixels, origin bottom-left.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.pending_pointer = Some([x, y]);
    }

    pub fn bind_source(&mut self, source: Box<dyn SpectrumSource>) -> Result<(), VizError> {
        self.analyzer.bind(source)
    }

    pub fn unbind_source(&mut self) -> Option<Box<dyn SpectrumSource>> {
        self.analyzer.unbind()
    }

    /// Stop for good: drop the scene, release renderer resources and the
    /// audio source. Later frames report `Stopped`.
    pub fn teardown<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.scene = None;
        self.pending_shader = None;
        renderer.release();
        self.analyzer.unbind();
        self.state = LoopState::Idle;
        log::info!("[loop] torn down");
    }

    pub fn frame<R: Renderer + ?Sized>(&mut self, renderer: &mut R) -> FrameOutcome {
        let t = self.started_at.elapsed().as_secs_f32();
        self.frame_at(renderer, t)
    }

    /// One iteration with an explicit clock, `time_sec` being seconds since
    /// the loop started.
    pub fn frame_at<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        time_sec: f32,
    ) -> FrameOutcome {
        if self.torn_down {
            return FrameOutcome::Stopped;
        }

        self.apply_pending(renderer);

        if self.fault.is_some() {
            self.state = LoopState::Idle;
            return FrameOutcome::Faulted;
        }
        if self.scene.is_none() {
            return self.skip(SkipReason::NoScene);
        }

        let snapshot = match self.analyzer.capture() {
            Ok(s) => s,
            Err(VizError::NotReady) => return self.skip(SkipReason::NoSource),
            Err(err) => return self.set_fault(renderer, err),
        };
        let levels = intensity::reduce(&snapshot);

        let Some(scene) = self.scene.as_mut() else {
            return self.skip(SkipReason::NoScene);
        };
        let pushed = push_levels(scene, time_sec, levels);
        if let Err(err) = pushed {
            return self.set_fault(renderer, err);
        }
        scene.advance_particles(levels.overall);

        if let Err(err) = renderer.draw(scene) {
            return self.set_fault(renderer, VizError::Render(format!("{err:#}")));
        }
        scene.clear_geometry_dirty();

        if self.state != LoopState::Running {
            log::debug!("[loop] running");
        }
        self.state = LoopState::Running;
        self.skip_logged = false;
        FrameOutcome::Drawn
    }

    fn apply_pending<R: Renderer + ?Sized>(&mut self, renderer: &mut R) {
        if let Some(size) = self.viewport.take_pending() {
            renderer.resize(size);
            if let Some(scene) = self.scene.as_mut() {
                if let Err(err) = self.viewport.apply_to(scene) {
                    self.set_fault(renderer, err);
                    return;
                }
            }
        }

        if let Some(kind) = self.pending_shader.take() {
            self.fault = None;
            // The old scene goes before the new one is built; nothing of it
            // carries over.
            self.scene = None;
            renderer.release();
            match self.build_scene(renderer, kind) {
                Ok(scene) => self.scene = Some(scene),
                Err(err) => {
                    self.set_fault(renderer, err);
                    return;
                }
            }
        }

        if let Some([x, y]) = self.pending_pointer.take() {
            self.pointer = Some([x, y]);
        }
        if let (Some(p), Some(scene)) = (self.pointer, self.scene.as_mut()) {
            if scene.descriptor().declares(Uniform::PointerPosition) {
                let value = UniformValue::Vec2(p);
                if let Err(err) = scene.set_uniform(Uniform::PointerPosition, value) {
                    log::warn!("[loop] pointer not applied: {err}");
                }
            }
        }
    }

    fn build_scene<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        kind: ShaderKind,
    ) -> Result<Scene, VizError> {
        let descriptor = *self.registry.get(kind)?;
        let scene = self.builder.build(&descriptor, self.viewport.current())?;
        renderer
            .prepare(&scene)
            .map_err(|e| VizError::Render(format!("{e:#}")))?;
        log::info!(
            "[loop] scene built: {} ({:?}, {} uniforms)",
            kind,
            descriptor.family,
            scene.uniforms().len()
        );
        Ok(scene)
    }

    fn skip(&mut self, reason: SkipReason) -> FrameOutcome {
        if !self.skip_logged {
            log::debug!("[loop] skipping frames: {reason:?}");
            self.skip_logged = true;
        }
        self.state = LoopState::Idle;
        FrameOutcome::Skipped(reason)
    }

    fn set_fault<R: Renderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        err: VizError,
    ) -> FrameOutcome {
        log::error!("[loop] scene faulted: {err}");
        self.scene = None;
        renderer.release();
        self.fault = Some(err);
        self.state = LoopState::Idle;
        FrameOutcome::Faulted
    }
}

fn push_levels(
    scene: &mut Scene,
    time_sec: f32,
    levels: intensity::IntensityVector,
) -> Result<(), VizError> {
    scene.set_uniform(Uniform::Time, UniformValue::Float(time_sec))?;
    scene.set_uniform(Uniform::Intensity, UniformValue::Float(levels.overall))?;
    if scene.descriptor().declares_bands() {
        scene.set_uniform(Uniform::BassIntensity, UniformValue::Float(levels.low))?;
        scene.set_uniform(Uniform::MidIntensity, UniformValue::Float(levels.mid))?;
        scene.set_uniform(Uniform::HighIntensity, UniformValue::Float(levels.high))?;
    }
    Ok(())
}
