// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

pub mod browser;
pub mod config;
pub mod engine;
pub mod game;
pub mod physics;
pub mod scene;

use config::Config;
use engine::{GameLoop, Renderer};
use game::PhysicsPage;

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs panic hook + console logger
/// - reads config (`undefined` -> defaults)
/// - sizes the canvas to the viewport
/// - starts stepping + drawing, for the lifetime of the page
#[wasm_bindgen]
pub fn main_js(config: JsValue) -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();
    #[cfg(target_arch = "wasm32")]
    {
        // a second call (e.g. page script runs twice) keeps the first logger
        let _ = console_log::init_with_level(log::Level::Info);
    }

    let config = Config::from_js(config).map_err(to_js_error)?;
    let renderer = browser::canvas(&config.canvas_id)
        .and_then(Renderer::new)
        .map_err(to_js_error)?;
    renderer.resize(browser::viewport_size().map_err(to_js_error)?);

    // spawns a new asynchronous task in local thread, for web assembly
    // environment, using wasm_bindgen_futures
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(PhysicsPage::new(config), renderer).await {
            log::error!("Could not start the physics page : {:#?}", err);
        }
    });

    Ok(())
}

fn to_js_error(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}
