pub mod entry_form;
pub mod history;

/// Browser alert. Off-wasm (tests, tooling builds) it degrades to a log
/// line instead of touching the DOM.
pub fn alert(message: &str) {
    #[cfg(target_arch = "wasm32")]
    {
        if let Some(window) = web_sys::window() {
            let _ = window.alert_with_message(message);
        }
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        leptos::logging::log!("alert: {}", message);
    }
}
