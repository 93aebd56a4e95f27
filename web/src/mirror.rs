use shared::protocol::ResultRecord;

use crate::browser;

pub const SAVE_RESULT_PATH: &str = "/api/save-result";

/// Send `result` to the results API without waiting for it.
///
/// The outcome is only logged; nothing else depends on it.
pub fn mirror_result(result: ResultRecord) {
    let Some(origin) = web_sys::window().and_then(|w| w.location().origin().ok()) else {
        return;
    };
    let url = format!("{origin}{SAVE_RESULT_PATH}");

    wasm_bindgen_futures::spawn_local(async move {
        match reqwest::Client::new().post(&url).json(&result).send().await {
            Ok(resp) if resp.status().is_success() => browser::log("Result saved to backend"),
            Ok(resp) => browser::log(&format!("Backend rejected result: {}", resp.status())),
            Err(_) => browser::log("Backend not available, using local storage only"),
        }
    });
}
