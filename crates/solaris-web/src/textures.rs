use std::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};
use solaris_engine::{AssetManifest, AssetSource, LoadTracker};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::HtmlImageElement;

use crate::gl::GlBackend;

enum Arrival {
    Loaded(String, HtmlImageElement),
    Failed(String, String),
}

/// Loads every texture named in the manifest in the background.
///
/// Images decode asynchronously; `onload`/`onerror` only record the arrival.
/// The runner uploads arrived images at the start of a frame, and only then
/// does the texture count as available to the scene.
pub struct TextureStore {
    tracker: LoadTracker,
    arrived: Rc<RefCell<Vec<Arrival>>>,
    _callbacks: Vec<Closure<dyn FnMut()>>,
}

impl TextureStore {
    pub fn load(manifest: &AssetManifest, base_url: &str) -> Result<Self, JsValue> {
        let arrived = Rc::new(RefCell::new(Vec::new()));
        let mut callbacks = Vec::new();
        let base = base_url.trim_end_matches('/');

        for (key, path) in &manifest.textures {
            let image = HtmlImageElement::new()?;
            image.set_cross_origin(Some("anonymous"));

            let onload = {
                let arrived = arrived.clone();
                let (key, img) = (key.clone(), image.clone());
                Closure::<dyn FnMut()>::new(move || {
                    arrived.borrow_mut().push(Arrival::Loaded(key.clone(), img.clone()));
                })
            };
            let onerror = {
                let arrived = arrived.clone();
                let (key, src) = (key.clone(), path.clone());
                Closure::<dyn FnMut()>::new(move || {
                    arrived.borrow_mut().push(Arrival::Failed(key.clone(), src.clone()));
                })
            };
            image.set_onload(Some(onload.as_ref().unchecked_ref()));
            image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
            callbacks.push(onload);
            callbacks.push(onerror);

            let src = if base.is_empty() { path.clone() } else { format!("{base}/{path}") };
            image.set_src(&src);
        }

        info!("loading {} textures", manifest.textures.len());
        Ok(Self {
            tracker: LoadTracker::new(manifest.texture_keys()),
            arrived,
            _callbacks: callbacks,
        })
    }

    /// Upload everything that arrived since the last call. Returns the
    /// number of textures uploaded.
    ///
    /// Failed loads still count toward progress: the body stays hidden
    /// instead of the whole scene waiting forever.
    pub fn upload_arrived(&mut self, backend: &mut GlBackend) -> usize {
        let arrivals = std::mem::take(&mut *self.arrived.borrow_mut());
        let mut uploaded = 0;
        for arrival in arrivals {
            let key = match arrival {
                Arrival::Loaded(key, image) => {
                    match backend.upload_texture(&key, &image) {
                        Ok(()) => uploaded += 1,
                        Err(e) => warn!("texture '{key}': {e}"),
                    }
                    key
                }
                Arrival::Failed(key, src) => {
                    warn!("texture '{key}' failed to load from {src}");
                    key
                }
            };
            self.tracker.mark_loaded(key);
        }
        uploaded
    }
}

impl AssetSource for TextureStore {
    fn has_texture(&self, key: &str) -> bool {
        self.tracker.has_texture(key)
    }

    fn progress(&self) -> f32 {
        self.tracker.progress()
    }
}
