use crate::engine::{Point, Rect, Size};
use anyhow::{anyhow, Context, Result};
use std::future::Future;
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::JsCast; // dyn_into / unchecked_ref

#[rustfmt::skip]
use web_sys::{
    CanvasRenderingContext2d,
    Document,
    EventTarget,
    HtmlCanvasElement,
    HtmlElement,
    Window,
};

// ==================== Constants ====================
// Constants related to HTML elements
mod html {
    pub const CONTEXT_2D: &str = "2d";
}

pub type LoopClosure = Closure<dyn FnMut(f64)>;

pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn canvas(id: &str) -> Result<HtmlCanvasElement> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No Canvas Element found with ID : '{}'", id))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|element| anyhow!("Error converting {:#?} to HtmlCanvasElement", element))
}

pub fn context(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d> {
    canvas
        .get_context(html::CONTEXT_2D)
        // Result<Option<Object>, JsValue>
        // - JsValue error -> anyhow
        // - None -> anyhow
        .map_err(|js_value| anyhow!("Error getting context : {:#?}", js_value))?
        .ok_or_else(|| anyhow!("No 2d context found"))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to CanvasRenderingContext2d",
                element
            )
        })
}

/// innerWidth x innerHeight of the window
pub fn viewport_size() -> Result<Size> {
    let window = window()?;
    let width = window
        .inner_width()
        .map_err(|err| anyhow!("Could not read innerWidth : {:#?}", err))?
        .as_f64()
        .ok_or_else(|| anyhow!("innerWidth is not a number"))?;
    let height = window
        .inner_height()
        .map_err(|err| anyhow!("Could not read innerHeight : {:#?}", err))?
        .as_f64()
        .ok_or_else(|| anyhow!("innerHeight is not a number"))?;
    Ok(Size {
        width: width as f32,
        height: height as f32,
    })
}

/// Snapshot of every element carrying `class` right now. Elements added
/// to the page later are NOT picked up.
pub fn elements_with_class(class: &str) -> Result<Vec<HtmlElement>> {
    let selector = format!(".{}", class);
    let nodes = document()?
        .query_selector_all(&selector)
        .map_err(|err| anyhow!("Invalid selector '{}' : {:#?}", selector, err))?;

    let mut elements = Vec::with_capacity(nodes.length() as usize);
    for index in 0..nodes.length() {
        let Some(node) = nodes.item(index) else {
            continue;
        };
        match node.dyn_into::<HtmlElement>() {
            Ok(element) => elements.push(element),
            // e.g. an <svg> child carrying the class, it has no inline style
            Err(node) => log::warn!("Skipping non html node {:#?} for '{}'", node, selector),
        }
    }
    Ok(elements)
}

pub fn bounding_rect(element: &HtmlElement) -> Rect {
    let dom_rect = element.get_bounding_client_rect();
    Rect::new(
        Point {
            x: dom_rect.left() as f32,
            y: dom_rect.top() as f32,
        },
        Size {
            width: dom_rect.width() as f32,
            height: dom_rect.height() as f32,
        },
    )
}

/// `position: absolute; left: ..px; top: ..px`
pub fn place_absolute(element: &HtmlElement, top_left: Point) -> Result<()> {
    let style = element.style();
    style
        .set_property("position", "absolute")
        .and_then(|_| style.set_property("left", &format!("{}px", top_left.x)))
        .and_then(|_| style.set_property("top", &format!("{}px", top_left.y)))
        .map_err(|err| anyhow!("Could not set inline style : {:#?}", err))
}

pub fn add_event_listener<T, F>(target: &T, event: &str, closure: &Closure<F>) -> Result<()>
where
    T: AsRef<EventTarget>,
    F: WasmClosure + ?Sized,
{
    target
        .as_ref()
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not add '{}' listener : {:#?}", event, err))
}

pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f) as Box<dyn FnMut(f64)>)
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame {:#?}", err))
}

pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .context("Performance object not found")?
        .now())
}

pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}
