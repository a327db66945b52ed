use crate::browser;
use anyhow::{anyhow, Result};
// ELI5: web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use self::input::InputEvent;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    /// browser input, delivered once per animation frame before stepping
    fn handle(&mut self, event: &InputEvent);
    /// exactly one fixed physics step
    fn update(&mut self);
    fn draw(&self, renderer: &Renderer);
}

// length of a frame in milliseconds
const FRAME_SIZE: f32 = 1.0 / 60.0 * 1000.0;
// a backgrounded tab hands us one huge delta when it comes back, clamp it so
// we don't try to catch up on seconds of physics in a single frame
const MAX_FRAME_DELTA: f32 = 250.0;

pub struct GameLoop {
    last_frame: f64,
    accumulated_delta: f32,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    /// Runs for the lifetime of the page, there is no stop handle
    /// - input is drained first (resize also resizes the drawing buffer)
    /// - then as many fixed steps as the elapsed time pays for
    /// - then one draw
    pub async fn start(game: impl Game + 'static, renderer: Renderer) -> Result<()> {
        let mut events = input::prepare_input()?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
            accumulated_delta: 0.0,
        };
        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            dispatch_input(input::drain(&mut events), &renderer, game.as_mut());

            let delta = (perf - game_loop.last_frame) as f32;
            game_loop.accumulated_delta += delta.clamp(0.0, MAX_FRAME_DELTA);
            while game_loop.accumulated_delta > FRAME_SIZE {
                game.update();
                game_loop.accumulated_delta -= FRAME_SIZE;
            }
            game_loop.last_frame = perf;
            game.draw(&renderer);

            if let Some(closure) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(closure) {
                    log::error!("GameLoop: could not schedule next frame : {:#?}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }
}

/// anything whose drawing buffer follows the viewport
pub trait Surface {
    fn resize(&self, size: Size);
}

/// Hands a frame's worth of input to the game, oldest first. A resize
/// reaches the surface before the game sees it.
pub fn dispatch_input(events: Vec<InputEvent>, surface: &impl Surface, game: &mut dyn Game) {
    for event in events {
        if let InputEvent::Resize(size) = event {
            surface.resize(size);
        }
        game.handle(&event);
    }
}

// ==================== Geometry ====================
// Screen space : CSS pixels, origin top left, y grows downward
#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Axis aligned box, `position` is the top left corner
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub position: Point,
    pub size: Size,
}

impl Rect {
    pub fn new(position: Point, size: Size) -> Self {
        Rect { position, size }
    }

    pub fn center(&self) -> Point {
        Point {
            x: self.position.x + self.size.width * 0.5,
            y: self.position.y + self.size.height * 0.5,
        }
    }

    /// Inverse of center() : the top left corner of a box of this size
    /// whose center sits at `center`
    pub fn top_left_for_center(&self, center: Point) -> Point {
        Point {
            x: center.x - self.size.width * 0.5,
            y: center.y - self.size.height * 0.5,
        }
    }
}

// ==================== Renderer ====================
pub struct Renderer {
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let context = browser::context(&canvas)?;
        Ok(Renderer { canvas, context })
    }

    /// resizes the drawing buffer, NOT the css box of the canvas
    pub fn resize(&self, size: Size) {
        self.canvas.set_width(size.width.max(0.0) as u32);
        self.canvas.set_height(size.height.max(0.0) as u32);
    }

    pub fn size(&self) -> Size {
        Size {
            width: self.canvas.width() as f32,
            height: self.canvas.height() as f32,
        }
    }

    /// paint the whole drawing buffer with `background`
    pub fn clear(&self, background: &str) {
        let size = self.size();
        self.context.set_fill_style_str(background);
        self.context
            .fill_rect(0.0, 0.0, size.width.into(), size.height.into());
    }

    pub fn fill_polygon(&self, points: &[Point], fill: &str) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.context.begin_path();
        self.context.move_to(first.x.into(), first.y.into());
        for point in rest {
            self.context.line_to(point.x.into(), point.y.into());
        }
        self.context.close_path();
        self.context.set_fill_style_str(fill);
        self.context.fill();
    }
}

impl Surface for Renderer {
    fn resize(&self, size: Size) {
        Renderer::resize(self, size);
    }
}

// ==================== Input ====================
pub mod input {
    use super::Size;
    use crate::browser;
    use anyhow::Result;
    use futures::channel::mpsc::{unbounded, UnboundedReceiver};
    use web_sys::{Event, KeyboardEvent};

    #[derive(Debug, Clone, PartialEq)]
    pub enum InputEvent {
        /// `KeyboardEvent.key`, e.g. "ArrowLeft", sent on every keydown
        /// including key repeats
        KeyDown(String),
        /// new viewport size, read when the window fired `resize`
        Resize(Size),
    }

    // TABLE:
    // ┌──────────── browser callback ───────────┐      ┌──── GameLoop ────┐
    // │ document keydown ──► KeyDown(key) ──┐   │      │                  │
    // │                                     ├───┼─────►│ drain() per rAF  │
    // │ window resize    ──► Resize(size) ──┘   │ mpsc │                  │
    // └─────────────────────────────────────────┘      └──────────────────┘
    // The callbacks never touch the game directly, they only queue events,
    // so the game is owned by exactly one closure (the animation frame)
    pub fn prepare_input() -> Result<UnboundedReceiver<InputEvent>> {
        let (keydown_sender, receiver) = unbounded();
        let resize_sender = keydown_sender.clone();

        let onkeydown = browser::closure_wrap(Box::new(move |event: KeyboardEvent| {
            // only fails once the receiver is gone, i.e. the loop never started
            let _ = keydown_sender.unbounded_send(InputEvent::KeyDown(event.key()));
        }) as Box<dyn FnMut(KeyboardEvent)>);

        let onresize = browser::closure_wrap(Box::new(move |_event: Event| {
            match browser::viewport_size() {
                Ok(size) => {
                    let _ = resize_sender.unbounded_send(InputEvent::Resize(size));
                }
                Err(err) => log::error!("Could not read viewport on resize : {:#?}", err),
            }
        }) as Box<dyn FnMut(Event)>);

        browser::add_event_listener(&browser::document()?, "keydown", &onkeydown)?;
        browser::add_event_listener(&browser::window()?, "resize", &onresize)?;

        // listeners live as long as the page
        onkeydown.forget();
        onresize.forget();

        Ok(receiver)
    }

    /// everything queued since the last call, oldest first
    pub fn drain(receiver: &mut UnboundedReceiver<InputEvent>) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }
        events
    }
}
