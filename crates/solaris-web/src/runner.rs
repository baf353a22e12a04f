use std::cell::RefCell;
use std::fmt::Display;
use std::rc::Rc;

use log::{info, warn};
use solaris_engine::{AssetManifest, AssetSource, InputEvent, InputQueue, RenderError, Scene, SceneConfig, Settings};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlCanvasElement, WebGl2RenderingContext};

use crate::gl::GlBackend;
use crate::input::PointerInput;
use crate::textures::TextureStore;

/// Owns the scene and everything browser-side that feeds it.
///
/// wasm-bindgen cannot export a struct holding closures and GL handles
/// across calls, so the crate keeps one of these in a `thread_local!` and
/// forwards its free-function exports here.
pub struct SceneRunner {
    scene: Scene,
    backend: GlBackend,
    textures: TextureStore,
    input: Rc<RefCell<InputQueue>>,
    pointer: PointerInput,
    canvas: HtmlCanvasElement,
    settings: Settings,
}

impl SceneRunner {
    pub fn new(canvas_id: &str, manifest_json: &str, config_json: &str, texture_base: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| JsValue::from_str(&format!("canvas '{canvas_id}' not found")))?
            .dyn_into()?;

        let config = if config_json.trim().is_empty() {
            SceneConfig::default()
        } else {
            SceneConfig::from_json(config_json).map_err(js_error)?
        };
        let manifest = AssetManifest::from_json(manifest_json).map_err(js_error)?;

        let (width, height) = client_size(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        // The offscreen target does its own multisampling.
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &"antialias".into(), &false.into())?;
        let gl: WebGl2RenderingContext = canvas
            .get_context_with_context_options("webgl2", &options)?
            .ok_or_else(|| js_error(RenderError::ContextUnavailable))?
            .dyn_into()?;

        let backend = GlBackend::new(gl, &manifest, width, height, config.msaa_samples).map_err(js_error)?;
        let scene = Scene::solar_system(config, width, height).map_err(js_error)?;
        let textures = TextureStore::load(&manifest, texture_base)?;
        let input = Rc::new(RefCell::new(InputQueue::new()));
        let pointer = PointerInput::attach(&document, &canvas, input.clone())?;

        info!("scene runner ready ({} bodies)", scene.names().len());
        Ok(Self {
            scene,
            backend,
            textures,
            input,
            pointer,
            canvas,
            settings: Settings::default(),
        })
    }

    /// Run one animation frame and return the frame's scene events as JSON.
    /// Settings that fail to parse are ignored and the previous ones kept.
    pub fn frame(&mut self, dt: f64, settings_json: &str) -> Result<String, JsValue> {
        if !settings_json.trim().is_empty() {
            match Settings::from_json(settings_json) {
                Ok(settings) => self.settings = settings,
                Err(e) => warn!("ignoring settings: {e}"),
            }
        }

        self.sync_canvas_size();
        self.textures.upload_arrived(&mut self.backend);

        let events = self.input.borrow_mut().drain();
        if self.scene.update(dt, &events, &self.settings, &self.textures) {
            self.scene.render(&mut self.backend).map_err(js_error)?;
        }

        serde_json::to_string(&self.scene.drain_events()).map_err(js_error)
    }

    pub fn names_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.scene.names()).map_err(js_error)
    }

    pub fn selection(&self) -> Vec<u32> {
        self.scene.selection()
    }

    pub fn select(&mut self, id: u32) {
        self.scene.select(id);
    }

    pub fn progress(&self) -> f32 {
        self.textures.progress()
    }

    pub fn date(&self) -> String {
        self.scene.date()
    }

    pub fn is_pointer_locked(&self) -> bool {
        self.pointer.is_pointer_locked()
    }

    fn sync_canvas_size(&mut self) {
        let (width, height) = client_size(&self.canvas);
        if width != self.canvas.width() || height != self.canvas.height() {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            self.input.borrow_mut().push(InputEvent::Resize { width, height });
        }
    }
}

fn client_size(canvas: &HtmlCanvasElement) -> (u32, u32) {
    (canvas.client_width().max(1) as u32, canvas.client_height().max(1) as u32)
}

pub(crate) fn js_error(e: impl Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}
