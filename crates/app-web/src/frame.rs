use crate::audio::AudioGraph;
use crate::dom::ListenerHandle;
use app_core::RenderLoop;
use app_render::GpuRenderer;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

pub struct FrameContext {
    pub visualizer: RenderLoop,
    /// `None` once torn down; dropping it frees the surface and device.
    pub renderer: Option<GpuRenderer<'static>>,
    pub canvas: web::HtmlCanvasElement,
    pub audio: Option<AudioGraph>,
    pub listeners: Vec<ListenerHandle>,
    pub stopped: bool,
}

impl FrameContext {
    /// Run one iteration; false once the loop should not be re-armed.
    pub fn frame(&mut self) -> bool {
        if self.stopped {
            return false;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return false;
        };
        self.visualizer.frame(renderer).should_rearm()
    }

    /// Release the GPU surface, the audio graph and every DOM listener.
    pub fn teardown(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Some(mut renderer) = self.renderer.take() {
            self.visualizer.teardown(&mut renderer);
        }
        if let Some(graph) = self.audio.take() {
            graph.close();
        }
        self.listeners.clear();
        log::info!("[frame] stopped");
    }
}

type Tick = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn request_frame(tick: &Tick) {
    let Some(w) = web::window() else {
        return;
    };
    if let Some(cb) = tick.borrow().as_ref() {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

pub fn start_loop(frame_ctx: Rc<RefCell<FrameContext>>) {
    let tick: Tick = Rc::new(RefCell::new(None));
    let tick_clone = tick.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        let rearm = match frame_ctx.try_borrow_mut() {
            Ok(mut ctx) => ctx.frame(),
            // an event handler holds the context; try again next refresh
            Err(_) => true,
        };
        if rearm {
            request_frame(&tick_clone);
        } else {
            // The closure owns the context; drop it once this call has returned.
            let slot = tick_clone.clone();
            spawn_local(async move {
                slot.borrow_mut().take();
                log::info!("[frame] loop released");
            });
        }
    }) as Box<dyn FnMut()>));
    request_frame(&tick);
}
