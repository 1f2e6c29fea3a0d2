#![cfg(target_arch = "wasm32")]
mod audio;
mod dom;
mod events;
mod frame;
mod input;

use app_core::{RenderLoop, ShaderKind, ShaderRegistry, ViewportSize, VisualizerConfig};
use app_render::GpuRenderer;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

const CANVAS_ID: &str = "app-canvas";
const SELECT_ID: &str = "shader-select";
const FILE_INPUT_ID: &str = "audio-file";
const PLAY_BUTTON_ID: &str = "play-toggle";
const AUDIO_ID: &str = "audio-player";

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("app-web starting");

    spawn_local(async move {
        if let Err(e) = init().await {
            log::error!("init error: {:?}", e);
        }
    });
    Ok(())
}

async fn init() -> anyhow::Result<()> {
    let document = dom::window_document().ok_or_else(|| anyhow::anyhow!("no document"))?;

    let canvas: web::HtmlCanvasElement = dom::element_by_id(&document, CANVAS_ID)?;
    let select: web::HtmlSelectElement = dom::element_by_id(&document, SELECT_ID)?;
    let controls = events::Controls {
        file_input: dom::element_by_id(&document, FILE_INPUT_ID)?,
        play_button: dom::element_by_id(&document, PLAY_BUTTON_ID)?,
        audio: dom::element_by_id(&document, AUDIO_ID)?,
        select: select.clone(),
    };

    let registry = ShaderRegistry::new();
    let names: Vec<&str> = registry.names().collect();
    dom::populate_select(&document, &select, &names);
    let initial_shader = select.value().parse().unwrap_or(ShaderKind::Ripple);

    let (width, height) = dom::sync_canvas_backing_size(&canvas);

    let instance = wgpu::Instance::default();
    let surface = instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))?;
    let renderer = GpuRenderer::new(&instance, surface, width, height).await?;

    let config = VisualizerConfig {
        initial_shader,
        ..Default::default()
    };
    let visualizer = RenderLoop::new(config, ViewportSize::new(width, height))?;
    log::info!("[init] {}x{} initial shader {}", width, height, initial_shader);

    let frame_ctx = Rc::new(RefCell::new(frame::FrameContext {
        visualizer,
        renderer: Some(renderer),
        canvas,
        audio: None,
        listeners: Vec::new(),
        stopped: false,
    }));
    events::wire_controls(&frame_ctx, controls);
    frame::start_loop(frame_ctx);
    Ok(())
}
