mod capture;
mod cli;

use std::sync::Arc;

use anyhow::anyhow;
use app_core::{FftSpectrum, RenderLoop, SampleRing, ShaderRegistry, ViewportSize};
use app_render::GpuRenderer;
use clap::Parser;
use winit::event::{ElementState, Event, KeyEvent, WindowEvent};
use winit::event_loop::EventLoop;
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowBuilder;

const RING_WINDOWS: usize = 4; // analysis windows of history kept by the capture ring

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = cli::Args::parse();
    if args.list_shaders {
        for name in ShaderRegistry::new().names() {
            println!("{name}");
        }
        return Ok(());
    }
    let config = args.visualizer_config()?;

    let ring = SampleRing::new(config.analyzer.fft_size * RING_WINDOWS);
    // dropping the stream stops capture, so it lives until the loop returns
    let capture_stream = match capture::start_input_capture(ring.clone()) {
        Ok(stream) => Some(stream),
        Err(e) => {
            log::warn!("[capture] no input: {e:#}; frames will be skipped");
            None
        }
    };

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Audio Visualizer (native)")
            .build(&event_loop)?,
    );
    let size = window.inner_size();

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(Arc::clone(&window))?;
    let renderer = pollster::block_on(GpuRenderer::new(
        &instance,
        surface,
        size.width,
        size.height,
    ))?;
    // taken on shutdown so the surface goes before the window does
    let mut renderer = Some(renderer);

    let mut visualizer = RenderLoop::new(config, ViewportSize::new(size.width, size.height))?;
    if capture_stream.is_some() {
        visualizer.bind_source(Box::new(FftSpectrum::new(Box::new(ring))))?;
    }
    log::info!(
        "[init] {}x{} initial shader {}",
        size.width,
        size.height,
        visualizer.selected()
    );

    event_loop
        .run(move |event, elwt| match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::Resized(size) => {
                    visualizer.request_resize(size.width, size.height);
                }
                WindowEvent::CursorMoved { position, .. } => {
                    // surface pixels, origin bottom-left
                    let height = window.inner_size().height as f64;
                    visualizer.set_pointer(position.x as f32, (height - position.y) as f32);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            logical_key: Key::Named(key),
                            state: ElementState::Pressed,
                            ..
                        },
                    ..
                } => match key {
                    NamedKey::ArrowRight | NamedKey::ArrowLeft => {
                        let next = visualizer
                            .selected()
                            .cycle(key == NamedKey::ArrowRight);
                        if let Ok(kind) = visualizer.request_shader(next.name()) {
                            log::info!("[input] shader selected: {kind}");
                        }
                    }
                    NamedKey::Escape => {
                        shutdown(&mut visualizer, &mut renderer);
                        elwt.exit();
                    }
                    _ => {}
                },
                WindowEvent::CloseRequested => {
                    shutdown(&mut visualizer, &mut renderer);
                    elwt.exit();
                }
                _ => {}
            },
            Event::AboutToWait => {
                let Some(r) = renderer.as_mut() else {
                    return;
                };
                if visualizer.frame(r).should_rearm() {
                    window.request_redraw();
                } else {
                    elwt.exit();
                }
            }
            _ => {}
        })
        .map_err(|e| anyhow!("event loop error: {e}"))
}

fn shutdown(visualizer: &mut RenderLoop, renderer: &mut Option<GpuRenderer<'static>>) {
    if let Some(mut r) = renderer.take() {
        visualizer.teardown(&mut r);
    }
}
