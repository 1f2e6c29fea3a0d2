use crate::audio::{AnalyserSpectrum, AudioGraph};
use crate::dom::ListenerHandle;
use crate::frame::FrameContext;
use crate::input;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

pub struct Controls {
    pub select: web::HtmlSelectElement,
    pub file_input: web::HtmlInputElement,
    pub play_button: web::HtmlElement,
    pub audio: web::HtmlAudioElement,
}

fn with_ctx(weak: &Weak<RefCell<FrameContext>>, f: impl FnOnce(&mut FrameContext)) {
    let Some(ctx) = weak.upgrade() else {
        return;
    };
    match ctx.try_borrow_mut() {
        Ok(mut c) if !c.stopped => f(&mut c),
        Ok(_) => {}
        Err(_) => log::warn!("[events] frame context busy; event dropped"),
    };
}

/// Hook the page controls up to the frame context. Handles are stored on the
/// context so teardown unregisters them.
pub fn wire_controls(frame_ctx: &Rc<RefCell<FrameContext>>, controls: Controls) {
    let mut handles = Vec::new();
    let weak = Rc::downgrade(frame_ctx);

    // shader dropdown
    {
        let weak = weak.clone();
        let select = controls.select.clone();
        handles.extend(ListenerHandle::new(&controls.select, "change", move |_| {
            let name = select.value();
            with_ctx(&weak, |c| {
                if let Ok(kind) = c.visualizer.request_shader(&name) {
                    log::info!("[events] shader selected: {kind}");
                }
            });
        }));
    }

    // file picker → object URL → <audio> src
    {
        let audio = controls.audio.clone();
        let input_el = controls.file_input.clone();
        let current_url: Rc<RefCell<Option<String>>> = Rc::new(RefCell::new(None));
        handles.extend(ListenerHandle::new(&controls.file_input, "change", move |_| {
            let Some(file) = input_el.files().and_then(|list| list.get(0)) else {
                return;
            };
            match web::Url::create_object_url_with_blob(&file) {
                Ok(url) => {
                    if let Some(prev) = current_url.borrow_mut().replace(url.clone()) {
                        let _ = web::Url::revoke_object_url(&prev);
                    }
                    audio.set_src(&url);
                    log::info!("[events] loaded {}", file.name());
                }
                Err(e) => log::error!("[events] object URL error: {e:?}"),
            }
        }));
    }

    // play / pause; the audio graph is built on the first press
    {
        let weak = weak.clone();
        let audio = controls.audio.clone();
        let button = controls.play_button.clone();
        handles.extend(ListenerHandle::new(&controls.play_button, "click", move |_| {
            if audio.src().is_empty() {
                log::warn!("[events] nothing to play; choose a file first");
                return;
            }
            with_ctx(&weak, |c| ensure_audio_graph(c, &audio));
            if audio.paused() {
                start_playback(&audio, &button);
            } else {
                let _ = audio.pause();
                button.set_text_content(Some("Play"));
            }
        }));
    }

    // pointer → light direction
    {
        let weak = weak.clone();
        let canvas = frame_ctx.borrow().canvas.clone();
        let target = canvas.clone();
        handles.extend(ListenerHandle::new(&target, "pointermove", move |ev| {
            let Ok(ev) = ev.dyn_into::<web::PointerEvent>() else {
                return;
            };
            if let Some([x, y]) = input::pointer_surface_px(&ev, &canvas) {
                with_ctx(&weak, |c| c.visualizer.set_pointer(x, y));
            }
        }));
    }

    // window resize → canvas backing size → pending viewport
    if let Some(window) = web::window() {
        let weak = weak.clone();
        handles.extend(ListenerHandle::new(&window, "resize", move |_| {
            with_ctx(&weak, |c| {
                let (w, h) = crate::dom::sync_canvas_backing_size(&c.canvas);
                c.visualizer.request_resize(w, h);
            });
        }));
    }

    frame_ctx.borrow_mut().listeners.extend(handles);
    wire_pagehide(weak);
}

// The label flips only once the element has actually started.
fn start_playback(audio: &web::HtmlAudioElement, button: &web::HtmlElement) {
    let promise = match audio.play() {
        Ok(p) => p,
        Err(e) => {
            log::error!("[events] play failed: {e:?}");
            return;
        }
    };
    let button = button.clone();
    spawn_local(async move {
        match JsFuture::from(promise).await {
            Ok(_) => button.set_text_content(Some("Pause")),
            Err(e) => log::error!("[events] playback rejected: {e:?}"),
        }
    });
}

fn ensure_audio_graph(c: &mut FrameContext, audio: &web::HtmlAudioElement) {
    if let Some(graph) = &c.audio {
        graph.resume();
        return;
    }
    match AudioGraph::new(audio) {
        Ok(graph) => {
            let spectrum = AnalyserSpectrum::new(graph.analyser.clone());
            match c.visualizer.bind_source(Box::new(spectrum)) {
                Ok(()) => {}
                Err(e) => log::error!("[events] analyser bind failed: {e}"),
            }
            graph.resume();
            c.audio = Some(graph);
        }
        Err(e) => log::error!("[events] audio setup failed: {e:#}"),
    }
}

// Lives for the page's lifetime; it is the one listener teardown cannot
// remove from inside itself. A page kept in the back/forward cache is left
// running so it resumes intact when shown again.
fn wire_pagehide(weak: Weak<RefCell<FrameContext>>) {
    let Some(window) = web::window() else {
        return;
    };
    let closure = Closure::wrap(Box::new(move |ev: web::Event| {
        let persisted = ev
            .dyn_ref::<web::PageTransitionEvent>()
            .is_some_and(|e| e.persisted());
        if persisted {
            log::info!("[events] page cached; keeping the visualizer alive");
            return;
        }
        with_ctx(&weak, |c| c.teardown());
    }) as Box<dyn FnMut(_)>);
    let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
    closure.forget();
}
