use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket, Window};

use driftboard_shared::{ClientMessage, ServerMessage, StrokeSegment};

use crate::engine::Outbox;
use crate::net::websocket_url;

#[derive(Debug)]
pub enum WsEvent {
    Open,
    Close,
    Error,
    Message(ServerMessage),
}

pub struct WsSender {
    socket: WebSocket,
}

impl WsSender {
    pub fn open(window: &Window) -> Result<Rc<Self>, JsValue> {
        let socket = WebSocket::new(&websocket_url(window)?)?;
        Ok(Rc::new(Self { socket }))
    }

    pub fn is_open(&self) -> bool {
        self.socket.ready_state() == WebSocket::OPEN
    }

    pub fn send_message(&self, message: &ClientMessage) {
        if !self.is_open() {
            return;
        }
        match serde_json::to_string(message) {
            Ok(payload) => {
                let _ = self.socket.send_with_str(&payload);
            }
            Err(error) => {
                web_sys::console::error_1(&format!("WS encode failed: {error}").into());
            }
        }
    }

    /// Routes socket callbacks to `on_event`. Call once, right after `open`.
    pub fn listen(
        &self,
        window: &Window,
        on_event: impl 'static + FnMut(WsEvent),
    ) -> Result<(), JsValue> {
        let socket = &self.socket;
        let on_event = Rc::new(RefCell::new(on_event));

        {
            let on_event = on_event.clone();
            let onopen = Closure::<dyn FnMut(Event)>::new(move |_| {
                on_event.borrow_mut()(WsEvent::Open);
            });
            socket.set_onopen(Some(onopen.as_ref().unchecked_ref()));
            onopen.forget();
        }

        {
            let on_event = on_event.clone();
            let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |_| {
                on_event.borrow_mut()(WsEvent::Close);
            });
            socket.set_onclose(Some(onclose.as_ref().unchecked_ref()));
            onclose.forget();
        }

        {
            let on_event = on_event.clone();
            let onerror = Closure::<dyn FnMut(Event)>::new(move |_| {
                on_event.borrow_mut()(WsEvent::Error);
            });
            socket.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            onerror.forget();
        }

        {
            let on_event = on_event.clone();
            let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
                let Some(text) = event.data().as_string() else {
                    web_sys::console::error_2(&"WS message data is not text".into(), &event.data());
                    return;
                };
                match serde_json::from_str::<ServerMessage>(&text) {
                    Ok(message) => on_event.borrow_mut()(WsEvent::Message(message)),
                    Err(error) => {
                        let snippet = text.chars().take(200).collect::<String>();
                        web_sys::console::error_1(
                            &format!("WS message JSON parse error: {error} payload={snippet:?}")
                                .into(),
                        );
                    }
                }
            });
            socket.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
            onmessage.forget();
        }

        {
            let socket = socket.clone();
            let onbeforeunload = Closure::<dyn FnMut(Event)>::new(move |_| {
                let _ = socket.close();
            });
            window.add_event_listener_with_callback(
                "beforeunload",
                onbeforeunload.as_ref().unchecked_ref(),
            )?;
            onbeforeunload.forget();
        }

        Ok(())
    }
}

impl Outbox for WsSender {
    fn send(&self, segment: &StrokeSegment) {
        self.send_message(&ClientMessage::Draw(segment.clone()));
    }
}
