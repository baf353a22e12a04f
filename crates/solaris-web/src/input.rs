//! Browser event wiring.
//!
//! Listeners that only make sense while the pointer is locked are added
//! under one `AbortController` signal, so unlocking removes all of them at
//! once. Every listener writes into the shared input queue; the runner
//! drains it at the start of each frame.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, error, info};
use solaris_engine::{InputEvent, InputQueue, Key, MouseButton};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AbortController, AddEventListenerOptions, Document, Event, EventTarget, HtmlCanvasElement,
    KeyboardEvent, MouseEvent, Node, WheelEvent,
};

type Handler = Closure<dyn FnMut(Event)>;
type SharedQueue = Rc<RefCell<InputQueue>>;

/// Listeners that share one abort signal.
pub struct ListenerGroup {
    controller: AbortController,
    handlers: Vec<Handler>,
}

impl ListenerGroup {
    pub fn new() -> Result<Self, JsValue> {
        Ok(Self {
            controller: AbortController::new()?,
            handlers: Vec::new(),
        })
    }

    pub fn add(&mut self, target: &EventTarget, kind: &str, handler: Handler) -> Result<(), JsValue> {
        let options = AddEventListenerOptions::new();
        options.set_signal(&self.controller.signal());
        target.add_event_listener_with_callback_and_add_event_listener_options(
            kind,
            handler.as_ref().unchecked_ref(),
            &options,
        )?;
        self.handlers.push(handler);
        Ok(())
    }

    pub fn listener_count(&self) -> usize {
        self.handlers.len()
    }

    /// Remove every listener in the group. Handlers are dropped afterwards.
    pub fn abort(self) {
        self.controller.abort();
    }
}

/// Permanent canvas listeners plus the pointer-lock group they toggle.
pub struct PointerInput {
    _permanent: Vec<Handler>,
    locked: Rc<RefCell<Option<ListenerGroup>>>,
}

impl PointerInput {
    pub fn attach(document: &Document, canvas: &HtmlCanvasElement, queue: SharedQueue) -> Result<Self, JsValue> {
        let locked: Rc<RefCell<Option<ListenerGroup>>> = Rc::new(RefCell::new(None));
        let mut permanent = Vec::new();

        let click = {
            let queue = queue.clone();
            let canvas = canvas.clone();
            let document = document.clone();
            Closure::<dyn FnMut(Event)>::new(move |event: Event| {
                let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                    return;
                };
                // While locked the cursor sits at the canvas center.
                let (x, y) = if is_locked(&document, &canvas) {
                    (canvas.client_width() as f64 / 2.0, canvas.client_height() as f64 / 2.0)
                } else {
                    (mouse.offset_x() as f64, mouse.offset_y() as f64)
                };
                queue.borrow_mut().push(InputEvent::Click { x, y });
            })
        };
        canvas.add_event_listener_with_callback("click", click.as_ref().unchecked_ref())?;
        permanent.push(click);

        let dblclick = {
            let canvas = canvas.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| canvas.request_pointer_lock())
        };
        canvas.add_event_listener_with_callback("dblclick", dblclick.as_ref().unchecked_ref())?;
        permanent.push(dblclick);

        let lock_change = {
            let queue = queue.clone();
            let canvas = canvas.clone();
            let document = document.clone();
            let locked = locked.clone();
            Closure::<dyn FnMut(Event)>::new(move |_: Event| {
                let now_locked = is_locked(&document, &canvas);
                let previous = locked.borrow_mut().take();
                if let Some(group) = previous {
                    debug!("pointer unlocked, removing {} listeners", group.listener_count());
                    group.abort();
                }
                if now_locked {
                    match lock_listeners(&document, &queue) {
                        Ok(group) => *locked.borrow_mut() = Some(group),
                        Err(e) => error!("failed to add pointer-lock listeners: {e:?}"),
                    }
                }
                queue.borrow_mut().push(InputEvent::PointerLock { locked: now_locked });
            })
        };
        document.add_event_listener_with_callback("pointerlockchange", lock_change.as_ref().unchecked_ref())?;
        permanent.push(lock_change);

        info!("input listeners attached");
        Ok(Self {
            _permanent: permanent,
            locked,
        })
    }

    pub fn is_pointer_locked(&self) -> bool {
        self.locked.borrow().is_some()
    }
}

fn is_locked(document: &Document, canvas: &HtmlCanvasElement) -> bool {
    let canvas: &Node = canvas;
    document
        .pointer_lock_element()
        .is_some_and(|el| el.is_same_node(Some(canvas)))
}

fn lock_listeners(document: &Document, queue: &SharedQueue) -> Result<ListenerGroup, JsValue> {
    let mut group = ListenerGroup::new()?;
    let target: &EventTarget = document.as_ref();

    group.add(target, "mousemove", handler(queue, |event| {
        let mouse = event.dyn_ref::<MouseEvent>()?;
        Some(InputEvent::MouseMove {
            dx: mouse.movement_x() as f64,
            dy: mouse.movement_y() as f64,
        })
    }))?;
    group.add(target, "mousedown", handler(queue, |event| {
        let mouse = event.dyn_ref::<MouseEvent>()?;
        Some(InputEvent::MouseDown { button: MouseButton::from_index(mouse.button()) })
    }))?;
    group.add(target, "mouseup", handler(queue, |event| {
        let mouse = event.dyn_ref::<MouseEvent>()?;
        Some(InputEvent::MouseUp { button: MouseButton::from_index(mouse.button()) })
    }))?;
    group.add(target, "wheel", handler(queue, |event| {
        let wheel = event.dyn_ref::<WheelEvent>()?;
        // DOM deltaY grows toward the user.
        Some(InputEvent::Wheel { delta: -wheel.delta_y() })
    }))?;
    group.add(target, "keydown", handler(queue, |event| {
        let key = Key::from_code(&event.dyn_ref::<KeyboardEvent>()?.code())?;
        event.prevent_default();
        Some(InputEvent::KeyDown { key })
    }))?;
    group.add(target, "keyup", handler(queue, |event| {
        let key = Key::from_code(&event.dyn_ref::<KeyboardEvent>()?.code())?;
        Some(InputEvent::KeyUp { key })
    }))?;
    Ok(group)
}

fn handler(queue: &SharedQueue, map: impl Fn(&Event) -> Option<InputEvent> + 'static) -> Handler {
    let queue = queue.clone();
    Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Some(input) = map(&event) {
            queue.borrow_mut().push(input);
        }
    })
}
