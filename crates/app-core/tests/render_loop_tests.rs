// Host-side tests for the frame controller: scheduling, switching, faults.

use app_core::*;
use std::cell::Cell;
use std::rc::Rc;

struct LevelSource(Rc<Cell<u8>>);

impl SpectrumSource for LevelSource {
    fn configure(&mut self, _config: &AnalyzerConfig) -> Result<(), VizError> {
        Ok(())
    }

    fn read_bytes(&mut self, out: &mut [u8]) {
        out.fill(self.0.get());
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DrawRecord {
    kind: ShaderKind,
    resolution: Option<UniformValue>,
    intensity: Option<UniformValue>,
    pointer: Option<UniformValue>,
    geometry_dirty: bool,
}

#[derive(Default)]
struct RecordingRenderer {
    prepared: Vec<ShaderKind>,
    draws: Vec<DrawRecord>,
    sizes: Vec<ViewportSize>,
    releases: usize,
    fail_draw: bool,
}

impl Renderer for RecordingRenderer {
    fn prepare(&mut self, scene: &Scene) -> anyhow::Result<()> {
        self.prepared.push(scene.kind());
        Ok(())
    }

    fn resize(&mut self, size: ViewportSize) {
        self.sizes.push(size);
    }

    fn draw(&mut self, scene: &Scene) -> anyhow::Result<()> {
        if self.fail_draw {
            anyhow::bail!("device lost");
        }
        self.draws.push(DrawRecord {
            kind: scene.kind(),
            resolution: scene.uniform(Uniform::Resolution),
            intensity: scene.uniform(Uniform::Intensity),
            pointer: scene.uniform(Uniform::PointerPosition),
            geometry_dirty: scene.geometry_dirty(),
        });
        Ok(())
    }

    fn release(&mut self) {
        self.releases += 1;
    }
}

fn config(initial: ShaderKind) -> VisualizerConfig {
    VisualizerConfig {
        scene: SceneConfig {
            particle_count: 32,
            seed: Some(1),
        },
        initial_shader: initial,
        ..Default::default()
    }
}

fn bound_loop(initial: ShaderKind, level: u8) -> (RenderLoop, Rc<Cell<u8>>) {
    let mut rl = RenderLoop::new(config(initial), ViewportSize::new(800, 600)).unwrap();
    let cell = Rc::new(Cell::new(level));
    rl.bind_source(Box::new(LevelSource(cell.clone()))).unwrap();
    (rl, cell)
}

#[test]
fn frames_skip_until_a_source_is_bound() {
    let mut rl = RenderLoop::new(config(ShaderKind::Ripple), ViewportSize::new(800, 600)).unwrap();
    let mut r = RecordingRenderer::default();

    let out = rl.frame_at(&mut r, 0.0);
    assert_eq!(out, FrameOutcome::Skipped(SkipReason::NoSource));
    assert!(out.should_rearm());
    assert_eq!(rl.state(), LoopState::Idle);
    assert!(r.draws.is_empty());
    // the scene itself is built on the first frame
    assert_eq!(r.prepared, [ShaderKind::Ripple]);

    rl.bind_source(Box::new(LevelSource(Rc::new(Cell::new(0)))))
        .unwrap();
    assert_eq!(rl.frame_at(&mut r, 0.016), FrameOutcome::Drawn);
    assert_eq!(rl.state(), LoopState::Running);
    assert_eq!(r.draws.len(), 1);
}

#[test]
fn intensity_follows_the_captured_level() {
    let (mut rl, level) = bound_loop(ShaderKind::Plasma, 255);
    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);
    level.set(0);
    rl.frame_at(&mut r, 0.5);
    assert_eq!(r.draws[0].intensity, Some(UniformValue::Float(1.0)));
    assert_eq!(r.draws[1].intensity, Some(UniformValue::Float(0.0)));
    assert_eq!(
        rl.scene().unwrap().uniform(Uniform::Time),
        Some(UniformValue::Float(0.5))
    );
}

#[test]
fn band_levels_reach_only_banded_programs() {
    let (mut rl, _) = bound_loop(ShaderKind::EnhancedPlasma, 51);
    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);
    let scene = rl.scene().unwrap();
    for u in [Uniform::BassIntensity, Uniform::MidIntensity, Uniform::HighIntensity] {
        match scene.uniform(u) {
            Some(UniformValue::Float(v)) => assert!((v - 0.2).abs() < 1e-6),
            other => panic!("{} = {other:?}", u.name()),
        }
    }
}

#[test]
fn unknown_selection_keeps_the_current_scene() {
    let (mut rl, _) = bound_loop(ShaderKind::Ripple, 10);
    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);

    assert_eq!(
        rl.request_shader("kaleidoscope"),
        Err(VizError::UnknownShader("kaleidoscope".into()))
    );
    assert_eq!(rl.frame_at(&mut r, 0.1), FrameOutcome::Drawn);
    assert_eq!(rl.selected(), ShaderKind::Ripple);
    assert!(r.draws.iter().all(|d| d.kind == ShaderKind::Ripple));
    assert_eq!(r.prepared.len(), 1);
}

#[test]
fn switching_builds_a_fresh_scene_on_the_next_frame() {
    let (mut rl, _) = bound_loop(ShaderKind::Ripple, 10);
    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);

    assert_eq!(rl.request_shader("particles"), Ok(ShaderKind::Particles));
    // still ripple until the next frame applies the request
    assert_eq!(rl.scene().unwrap().kind(), ShaderKind::Ripple);

    rl.frame_at(&mut r, 0.1);
    let scene = rl.scene().unwrap();
    assert_eq!(scene.kind(), ShaderKind::Particles);
    let keys: Vec<_> = scene.uniforms().keys().collect();
    assert_eq!(keys, [Uniform::Time, Uniform::Intensity]);
    assert_eq!(r.prepared, [ShaderKind::Ripple, ShaderKind::Particles]);
    assert!(r.releases >= 1);

    let last = r.draws.last().unwrap();
    assert_eq!(last.kind, ShaderKind::Particles);
    assert_eq!(last.resolution, None);
    assert!(last.geometry_dirty);
    assert!(!rl.scene().unwrap().geometry_dirty());
}

#[test]
fn particles_drift_once_per_drawn_frame() {
    let (mut rl, _) = bound_loop(ShaderKind::Particles, 0);
    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);
    let before: Vec<f32> = rl
        .scene()
        .unwrap()
        .particles()
        .unwrap()
        .particles()
        .iter()
        .map(|p| p.position[0])
        .collect();
    rl.frame_at(&mut r, 0.016);
    let after = rl.scene().unwrap().particles().unwrap().particles();
    for (b, p) in before.iter().zip(after) {
        let moved = b - p.position[0];
        assert!((moved - 0.1).abs() < 1e-5 || p.position[0] == 50.0);
    }
}

#[test]
fn resize_becomes_visible_on_the_following_frame() {
    let (mut rl, _) = bound_loop(ShaderKind::Fractal, 10);
    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);

    assert!(rl.request_resize(1024, 512));
    assert_eq!(
        rl.scene().unwrap().uniform(Uniform::Resolution),
        Some(UniformValue::Vec2([800.0, 600.0]))
    );
    rl.frame_at(&mut r, 0.016);

    assert_eq!(r.draws[0].resolution, Some(UniformValue::Vec2([800.0, 600.0])));
    assert_eq!(r.draws[1].resolution, Some(UniformValue::Vec2([1024.0, 512.0])));
    assert_eq!(r.sizes, [ViewportSize::new(1024, 512)]);
    assert!(!rl.request_resize(0, 0));
}

#[test]
fn pointer_moves_apply_to_light_responsive_scenes() {
    let (mut rl, _) = bound_loop(ShaderKind::LightResponsive, 10);
    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);
    assert_eq!(r.draws[0].pointer, Some(UniformValue::Vec2([400.0, 300.0])));

    rl.set_pointer(10.0, 20.0);
    rl.frame_at(&mut r, 0.016);
    assert_eq!(r.draws[1].pointer, Some(UniformValue::Vec2([10.0, 20.0])));

    // ignored by programs that do not read the pointer
    rl.request_shader("pulse").unwrap();
    rl.set_pointer(1.0, 1.0);
    assert_eq!(rl.frame_at(&mut r, 0.032), FrameOutcome::Drawn);
    assert_eq!(r.draws[2].pointer, None);
}

#[test]
fn draw_failure_faults_until_rebuilt() {
    let (mut rl, _) = bound_loop(ShaderKind::Ripple, 10);
    let mut r = RecordingRenderer {
        fail_draw: true,
        ..Default::default()
    };
    assert_eq!(rl.frame_at(&mut r, 0.0), FrameOutcome::Faulted);
    assert!(matches!(rl.fault(), Some(VizError::Render(_))));
    assert!(rl.scene().is_none());
    assert_eq!(rl.frame_at(&mut r, 0.1), FrameOutcome::Faulted);
    assert!(FrameOutcome::Faulted.should_rearm());

    r.fail_draw = false;
    rl.rebuild();
    assert_eq!(rl.frame_at(&mut r, 0.2), FrameOutcome::Drawn);
    assert!(rl.fault().is_none());
}

#[test]
fn double_bind_through_the_loop_keeps_the_first_source() {
    let (mut rl, _) = bound_loop(ShaderKind::Ripple, 255);
    let other = Rc::new(Cell::new(0));
    assert_eq!(
        rl.bind_source(Box::new(LevelSource(other))),
        Err(VizError::AlreadyBound)
    );
    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);
    assert_eq!(r.draws[0].intensity, Some(UniformValue::Float(1.0)));
}

#[test]
fn teardown_stops_the_loop_for_good() {
    let (mut rl, _) = bound_loop(ShaderKind::Ripple, 10);
    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);

    rl.teardown(&mut r);
    assert!(rl.is_torn_down());
    assert!(rl.scene().is_none());
    assert!(!rl.analyzer().is_bound());

    let out = rl.frame_at(&mut r, 0.1);
    assert_eq!(out, FrameOutcome::Stopped);
    assert!(!out.should_rearm());
    assert_eq!(r.draws.len(), 1);

    let releases = r.releases;
    rl.teardown(&mut r);
    assert_eq!(r.releases, releases);
}

#[test]
fn torn_down_loop_never_touches_a_renderer_again() {
    let (mut rl, _) = bound_loop(ShaderKind::Ripple, 10);
    let mut first = RecordingRenderer::default();
    rl.frame_at(&mut first, 0.0);
    rl.teardown(&mut first);
    assert!(first.releases >= 1);
    drop(first);

    // requests made after teardown are inert; the owner is free to have
    // dropped its renderer
    let _ = rl.request_shader("plasma");
    rl.request_resize(320, 240);
    rl.set_pointer(5.0, 5.0);
    let mut later = RecordingRenderer::default();
    assert_eq!(rl.frame_at(&mut later, 0.1), FrameOutcome::Stopped);
    assert!(later.prepared.is_empty());
    assert!(later.draws.is_empty());
    assert!(later.sizes.is_empty());
    assert_eq!(later.releases, 0);
}

#[test]
fn zero_sized_startup_surface_is_held_at_one_pixel() {
    let mut rl = RenderLoop::new(config(ShaderKind::Ripple), ViewportSize::new(0, 0)).unwrap();
    assert_eq!(rl.viewport(), ViewportSize::new(1, 1));
    rl.bind_source(Box::new(LevelSource(Rc::new(Cell::new(0)))))
        .unwrap();

    let mut r = RecordingRenderer::default();
    rl.frame_at(&mut r, 0.0);
    assert_eq!(r.draws[0].resolution, Some(UniformValue::Vec2([1.0, 1.0])));

    assert!(rl.request_resize(640, 480));
    rl.frame_at(&mut r, 0.016);
    assert_eq!(r.draws[1].resolution, Some(UniformValue::Vec2([640.0, 480.0])));
}

#[test]
fn unbinding_mid_run_skips_without_losing_the_scene() {
    let (mut rl, _) = bound_loop(ShaderKind::Pulse, 10);
    let mut r = RecordingRenderer::default();
    assert_eq!(rl.frame_at(&mut r, 0.0), FrameOutcome::Drawn);

    assert!(rl.unbind_source().is_some());
    let out = rl.frame_at(&mut r, 0.016);
    assert_eq!(out, FrameOutcome::Skipped(SkipReason::NoSource));
    assert!(out.should_rearm());
    assert!(rl.fault().is_none());
    assert_eq!(rl.scene().unwrap().kind(), ShaderKind::Pulse);

    rl.bind_source(Box::new(LevelSource(Rc::new(Cell::new(0)))))
        .unwrap();
    assert_eq!(rl.frame_at(&mut r, 0.032), FrameOutcome::Drawn);
    assert_eq!(r.prepared, [ShaderKind::Pulse]);
}
