use crate::browser;
use crate::config::Config;
use crate::engine::input::InputEvent;
use crate::engine::{Game, Point, Renderer};
use crate::scene::destroyable::Placeable;
use crate::scene::Scene;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use web_sys::HtmlElement;

/// TABLE
/// ┌───────────────────────── Page Lifecycle ────────────────────────────┐
/// │                                                                     │
/// │   main_js()  ──►  PhysicsPage::Loading(config)                      │
/// │                         │                                           │
/// │                         │ initialize() : measure viewport,          │
/// │                         │ build walls + player, bind destroyables   │
/// │                         ▼                                           │
/// │                  PhysicsPage::Loaded(Playground)                    │
/// │                         │                                           │
/// │        ┌────────────────┼────────────────┐                          │
/// │        ▼                ▼                ▼                          │
/// │     handle()         update()          draw()                       │
/// │   keydown/resize   one fixed step   clear + fill bodies             │
/// │                                                                     │
/// └─────────────────────────────────────────────────────────────────────┘
pub enum PhysicsPage {
    /// nothing measured yet
    Loading(Config),

    /// walls, player and destroyables live in the scene
    Loaded(Playground),
}

pub struct Playground {
    scene: Scene<HtmlElement>,
    background: String,
}

impl PhysicsPage {
    pub fn new(config: Config) -> Self {
        PhysicsPage::Loading(config)
    }
}

impl Placeable for HtmlElement {
    fn place(&self, top_left: Point) -> Result<()> {
        browser::place_absolute(self, top_left)
    }
}

#[async_trait(?Send)]
impl Game for PhysicsPage {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            PhysicsPage::Loading(config) => {
                let viewport = browser::viewport_size()?;
                let mut scene = Scene::new(config, viewport);

                // one snapshot, measured once
                let elements = browser::elements_with_class(&config.destroyable_class)
                    .with_context(|| {
                        format!(
                            "Failed to collect destroyables with class : {}",
                            config.destroyable_class
                        )
                    })?;
                for element in elements {
                    let rect = browser::bounding_rect(&element);
                    scene.bind_destroyable(element, rect);
                }

                log::info!(
                    "Physics page ready : viewport {}x{}, {} destroyable(s)",
                    viewport.width,
                    viewport.height,
                    scene.destroyables().len()
                );

                Ok(Box::new(PhysicsPage::Loaded(Playground {
                    scene,
                    background: config.background.clone(),
                })))
            }
            PhysicsPage::Loaded(_) => Err(anyhow!("Page is already initialized")),
        }
    }

    fn handle(&mut self, event: &InputEvent) {
        if let PhysicsPage::Loaded(playground) = self {
            match event {
                InputEvent::KeyDown(key) => {
                    playground.scene.key_down(key);
                }
                InputEvent::Resize(viewport) => {
                    log::info!("Resized to {}x{}", viewport.width, viewport.height);
                    playground.scene.resize(*viewport);
                }
            }
        }
    }

    fn update(&mut self) {
        if let PhysicsPage::Loaded(playground) = self {
            if let Err(err) = playground.scene.tick() {
                log::error!("{:#}", err);
            }
        }
    }

    fn draw(&self, renderer: &Renderer) {
        if let PhysicsPage::Loaded(playground) = self {
            // Draw order : background -> bodies in the order they were added
            renderer.clear(&playground.background);
            for shape in playground.scene.shapes() {
                renderer.fill_polygon(&shape.vertices, &shape.fill);
            }
        }
    }
}
