use wasm_bindgen::JsValue;

/// Wall clock in epoch milliseconds.
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Date part of an ISO-8601 timestamp in the user's locale.
pub fn locale_date(timestamp: &str) -> String {
    let date = js_sys::Date::new(&JsValue::from_str(timestamp));
    date.to_locale_date_string("default", &JsValue::UNDEFINED).into()
}

pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

pub fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}

pub fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

pub fn error(message: &str) {
    web_sys::console::error_1(&message.into());
}
