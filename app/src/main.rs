#![allow(non_snake_case)]

mod api;
mod app;
mod components;

use dioxus_logger::tracing::Level;
use lifeline_core::OverlayConfigExt;
use lifeline_types::OverlayConfig;

static OVERLAY_TOML: &str = include_str!("../overlay.toml");

fn main() {
    let config = match OverlayConfig::from_toml_str(OVERLAY_TOML) {
        Ok(config) => config,
        Err(e) => {
            // Logger is not up yet; report through the console directly
            web_sys::console::error_1(&format!("overlay.toml rejected: {e}").into());
            OverlayConfig::default()
        }
    };

    let level = if config.debug { Level::DEBUG } else { Level::INFO };
    if let Err(e) = dioxus_logger::init(level) {
        web_sys::console::error_1(&format!("logger init failed: {e}").into());
    }

    app::set_config(config);
    dioxus::launch(app::App);
}
