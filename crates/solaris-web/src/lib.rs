//! Browser bridge for the solar-system scene.
//!
//! Exposes free `#[wasm_bindgen]` functions over a single `SceneRunner`
//! kept in thread-local storage. Call `solaris_init` once, then
//! `solaris_frame` from `requestAnimationFrame`.

pub mod gl;
pub mod input;
pub mod runner;
pub mod textures;

use std::cell::RefCell;

use wasm_bindgen::prelude::*;

pub use runner::SceneRunner;

thread_local! {
    static RUNNER: RefCell<Option<SceneRunner>> = const { RefCell::new(None) };
}

fn with_runner<R>(f: impl FnOnce(&mut SceneRunner) -> R) -> Result<R, JsValue> {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow
            .as_mut()
            .ok_or_else(|| JsValue::from_str("scene not initialized; call solaris_init() first"))?;
        Ok(f(runner))
    })
}

/// Build the scene on the canvas with id `canvas_id`.
///
/// `manifest_json` carries shader sources and texture paths,
/// `config_json` may be empty for defaults. Texture paths are resolved
/// against `texture_base`.
#[wasm_bindgen]
pub fn solaris_init(
    canvas_id: &str,
    manifest_json: &str,
    config_json: &str,
    texture_base: &str,
) -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let runner = SceneRunner::new(canvas_id, manifest_json, config_json, texture_base)?;
    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
    log::info!("solaris: initialized");
    Ok(())
}

/// Advance and draw one frame. Returns the frame's scene events as JSON.
#[wasm_bindgen]
pub fn solaris_frame(dt: f64, settings_json: &str) -> Result<String, JsValue> {
    with_runner(|r| r.frame(dt, settings_json))?
}

/// Entity id → display name, as a JSON object.
#[wasm_bindgen]
pub fn solaris_names() -> Result<String, JsValue> {
    with_runner(|r| r.names_json())?
}

#[wasm_bindgen]
pub fn solaris_selection() -> Result<Vec<u32>, JsValue> {
    with_runner(|r| r.selection())
}

#[wasm_bindgen]
pub fn solaris_select(id: u32) -> Result<(), JsValue> {
    with_runner(|r| r.select(id))
}

/// Texture load progress in [0, 1].
#[wasm_bindgen]
pub fn solaris_progress() -> Result<f32, JsValue> {
    with_runner(|r| r.progress())
}

/// Simulated date, `YYYY-MM-DD`.
#[wasm_bindgen]
pub fn solaris_date() -> Result<String, JsValue> {
    with_runner(|r| r.date())
}

#[wasm_bindgen]
pub fn solaris_pointer_locked() -> Result<bool, JsValue> {
    with_runner(|r| r.is_pointer_locked())
}
