use wasm_bindgen::JsValue;
use web_sys::Window;

pub fn websocket_url(window: &Window) -> Result<String, JsValue> {
    let location = window.location();
    let protocol = location.protocol()?;
    let host = location.host()?;
    let pathname = location.pathname()?;
    Ok(websocket_url_for(&protocol, &host, &pathname))
}

fn websocket_url_for(protocol: &str, host: &str, pathname: &str) -> String {
    let scheme = if protocol == "https:" { "wss" } else { "ws" };
    match session_id_from_path(pathname) {
        Some(session_id) => format!("{scheme}://{host}/ws/{session_id}"),
        None => format!("{scheme}://{host}/ws"),
    }
}

fn session_id_from_path(path: &str) -> Option<&str> {
    let mut parts = path.trim_matches('/').split('/');
    if parts.next()? != "s" {
        return None;
    }
    parts.next().filter(|session_id| !session_id.is_empty())
}
