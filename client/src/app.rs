use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Element, Event, HtmlCanvasElement, HtmlInputElement,
    KeyboardEvent, PointerEvent,
};

use driftboard_shared::ServerMessage;

use crate::commands::{apply_command, parse_command};
use crate::dom::{event_to_screen, fit_canvas, get_element, set_canvas_cursor, set_status};
use crate::engine::{CaptureEngine, CaptureError, GestureStep, BACKGROUND};
use crate::growth::INITIAL_SURFACE;
use crate::render::{present, CanvasSurface};
use crate::state::{GestureMode, SyncState};
use crate::surface::Surface;
use crate::ws::{WsEvent, WsSender};

type Engine = CaptureEngine<CanvasSurface, Rc<WsSender>>;

struct View {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl View {
    fn present(&self, engine: &Engine) {
        present(
            &self.ctx,
            self.width,
            self.height,
            engine.surface(),
            engine.offset(),
        );
    }

    fn refit(&mut self, engine: &mut Engine) {
        let (width, height) = fit_canvas(&self.canvas);
        self.width = width;
        self.height = height;
        if let Err(error) = engine.set_viewport(width as f32, height as f32) {
            web_sys::console::error_1(&format!("Surface growth failed: {error}").into());
        }
        self.present(engine);
    }
}

#[derive(Clone)]
struct Status {
    el: Element,
    text: Element,
}

impl Status {
    fn show(&self, state: &str, text: &str) {
        set_status(&self.el, &self.text, state, text);
    }
}

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()
        .and_then(|value| value.as_string())
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            web_sys::console::error_1(&err);
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas: HtmlCanvasElement = get_element(&document, "board")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    let command_input: HtmlInputElement = get_element(&document, "command")?;
    let status = Status {
        el: get_element(&document, "status")?,
        text: get_element(&document, "statusText")?,
    };

    let mut surface = CanvasSurface::new(&document, INITIAL_SURFACE.0, INITIAL_SURFACE.1)
        .map_err(|error| JsValue::from_str(&error.to_string()))?;
    surface.fill(BACKGROUND);

    let sender = WsSender::open(&window)?;
    let engine = Rc::new(RefCell::new(CaptureEngine::new(surface, sender.clone())));
    let view = Rc::new(RefCell::new(View {
        canvas: canvas.clone(),
        ctx,
        width: 0.0,
        height: 0.0,
    }));
    view.borrow_mut().refit(&mut engine.borrow_mut());
    status.show("connecting", "Connecting...");
    set_canvas_cursor(&canvas, false);

    {
        let engine = engine.clone();
        let view = view.clone();
        let status = status.clone();
        sender.listen(&window, move |event| match event {
            WsEvent::Open => status.show("connecting", "Loading board..."),
            WsEvent::Close | WsEvent::Error => {
                engine.borrow_mut().go_offline();
                status.show("offline", "Disconnected, reload the page to rejoin");
            }
            WsEvent::Message(ServerMessage::LoadDrawings { segments }) => {
                let mut engine = engine.borrow_mut();
                let painted = engine.reload(&segments);
                if painted != segments.len() {
                    web_sys::console::warn_1(
                        &format!("Skipped {} invalid history segments", segments.len() - painted)
                            .into(),
                    );
                }
                view.borrow().present(&engine);
                status.show("connected", "Connected");
            }
            WsEvent::Message(ServerMessage::Draw(segment)) => {
                let mut engine = engine.borrow_mut();
                if let Err(error) = engine.render_remote(&segment) {
                    web_sys::console::warn_1(&format!("Dropped remote segment: {error}").into());
                    return;
                }
                view.borrow().present(&engine);
            }
        })?;
    }

    {
        let engine = engine.clone();
        let status = status.clone();
        let down_canvas = canvas.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 && event.button() != 1 {
                return;
            }
            event.prevent_default();
            let Some(point) = event_to_screen(&down_canvas, &event) else {
                return;
            };
            let pan_requested = event.shift_key() || event.button() == 1;
            let mut engine = engine.borrow_mut();
            if !engine.begin_gesture(point, pan_requested) {
                match engine.sync() {
                    SyncState::Offline => {
                        status.show("offline", "Disconnected, reload the page to rejoin")
                    }
                    _ => status.show("connecting", "Loading board..."),
                }
                return;
            }
            set_canvas_cursor(&down_canvas, pan_requested);
            let _ = down_canvas.set_pointer_capture(event.pointer_id());
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let engine = engine.clone();
        let view = view.clone();
        let status = status.clone();
        let move_canvas = canvas.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let mut engine = engine.borrow_mut();
            if engine.gesture() == GestureMode::Idle {
                return;
            }
            let Some(point) = event_to_screen(&move_canvas, &event) else {
                return;
            };
            match engine.continue_gesture(point) {
                Ok(GestureStep::Ignored) => {}
                Ok(GestureStep::Drew(_)) | Ok(GestureStep::Panned { .. }) => {
                    view.borrow().present(&engine);
                }
                Err(CaptureError::Locked(feature)) => {
                    status.show("locked", &format!("{feature} is locked, try /unlock <code>"));
                }
                Err(error) => {
                    web_sys::console::warn_1(&format!("Segment not captured: {error}").into());
                }
            }
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let engine = engine.clone();
        let up_canvas = canvas.clone();
        let onup = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            engine.borrow_mut().end_gesture();
            set_canvas_cursor(&up_canvas, false);
            let _ = up_canvas.release_pointer_capture(event.pointer_id());
        });
        for name in ["pointerup", "pointerleave", "pointercancel"] {
            canvas.add_event_listener_with_callback(name, onup.as_ref().unchecked_ref())?;
        }
        onup.forget();
    }

    {
        let engine = engine.clone();
        let view = view.clone();
        let onresize = Closure::<dyn FnMut(Event)>::new(move |_| {
            view.borrow_mut().refit(&mut engine.borrow_mut());
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    {
        let engine = engine.clone();
        let input = command_input.clone();
        let onkey = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            if event.key() != "Enter" {
                return;
            }
            event.prevent_default();
            let outcome = parse_command(&input.value())
                .map_err(|error| error.to_string())
                .and_then(|command| {
                    apply_command(&mut engine.borrow_mut(), command)
                        .map_err(|error| error.to_string())
                });
            match outcome {
                Ok(notice) => status.show("connected", &notice),
                Err(message) => status.show("error", &message),
            }
            input.set_value("");
        });
        command_input.add_event_listener_with_callback("keydown", onkey.as_ref().unchecked_ref())?;
        onkey.forget();
    }

    Ok(())
}
