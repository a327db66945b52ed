// TABLE:
// ┌──────────────────────────────────────────────────────────────────────┐
// │                         One Scene::tick()                            │
// ├──────────────────────────────────────────────────────────────────────┤
// │ 1. world.step()            forces pushed since last tick are spent   │
// │ 2. on_collision_start()    shadow bodies hit this step go Dynamic    │
// │ 3. sync()                  every element follows its shadow body     │
// └──────────────────────────────────────────────────────────────────────┘
// 2 always runs before 3, so an element knocked loose this step already
// follows its body in the same tick.
pub mod boundary;
pub mod destroyable;
pub mod player;

use crate::config::Config;
use crate::engine::{Rect, Size};
use crate::physics::{BodyHandle, BodyShape, PhysicsWorld};
use anyhow::{Context, Result};

use self::boundary::Boundaries;
use self::destroyable::{DestroyableBinder, Placeable};
use self::player::{Player, Push};

/// The physics side of the page, generic over what a destroyable element is
/// so it can run without a browser.
pub struct Scene<E> {
    world: PhysicsWorld,
    boundaries: Boundaries,
    player: Player,
    destroyables: DestroyableBinder<E>,
}

impl<E: Placeable> Scene<E> {
    /// walls first, then the player. Destroyables are bound afterwards
    /// with bind_destroyable()
    pub fn new(config: &Config, viewport: Size) -> Self {
        let mut world = PhysicsWorld::new(config.gravity);
        let boundaries = Boundaries::build(&mut world, viewport, config);
        let player = Player::spawn(&mut world, config);
        Scene {
            world,
            boundaries,
            player,
            destroyables: DestroyableBinder::new(),
        }
    }

    pub fn bind_destroyable(&mut self, element: E, rect: Rect) -> BodyHandle {
        self.destroyables.bind(&mut self.world, element, rect)
    }

    pub fn key_down(&mut self, key: &str) -> Option<Push> {
        self.player.on_key_down(&mut self.world, key)
    }

    pub fn resize(&mut self, viewport: Size) {
        self.boundaries.on_resize(&mut self.world, viewport);
    }

    pub fn tick(&mut self) -> Result<()> {
        let pairs = self.world.step();
        self.destroyables
            .on_collision_start(&mut self.world, &pairs);
        self.destroyables
            .sync(&self.world)
            .context("Could not sync destroyable elements")
    }

    pub fn shapes(&self) -> Vec<BodyShape> {
        self.world.shapes()
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn boundaries(&self) -> &Boundaries {
        &self.boundaries
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn destroyables(&self) -> &DestroyableBinder<E> {
        &self.destroyables
    }
}

#[cfg(test)]
mod tests {
    use super::destroyable::tests::Recorder;
    use super::destroyable::BindingState;
    use super::*;
    use crate::engine::Point;
    use crate::physics::CollisionPair;
    use approx::assert_relative_eq;

    const VIEWPORT: Size = Size {
        width: 1024.0,
        height: 768.0,
    };

    fn scene() -> Scene<Recorder> {
        Scene::new(&Config::default(), VIEWPORT)
    }

    #[test]
    fn bootstrap_adds_walls_and_player() {
        let scene = scene();
        assert_eq!(scene.world().body_count(), 4);

        let labels: Vec<_> = scene.shapes().into_iter().map(|shape| shape.label).collect();
        assert_eq!(labels, ["floor", "leftWall", "rightWall", "stickFigure"]);

        let floor = scene.world().position(scene.boundaries().floor()).unwrap();
        assert_relative_eq!(floor.x, 512.0);
        assert_relative_eq!(floor.y, 768.0);
    }

    #[test]
    fn resize_only_moves_the_floor() {
        let mut scene = scene();
        let left = scene.world().position(scene.boundaries().left_wall()).unwrap();
        let right = scene.world().position(scene.boundaries().right_wall()).unwrap();

        scene.resize(Size {
            width: 600.0,
            height: 400.0,
        });
        scene.tick().unwrap();

        let world = scene.world();
        let floor = world.position(scene.boundaries().floor()).unwrap();
        assert_relative_eq!(floor.x, 300.0);
        assert_relative_eq!(floor.y, 400.0);
        assert_eq!(world.position(scene.boundaries().left_wall()), Some(left));
        assert_eq!(world.position(scene.boundaries().right_wall()), Some(right));
    }

    #[test]
    fn destroyable_is_knocked_loose_then_tracked() {
        let mut scene = scene();
        let rect = Rect::new(
            Point { x: 50.0, y: 50.0 },
            Size {
                width: 100.0,
                height: 50.0,
            },
        );
        let body = scene.bind_destroyable(Recorder::default(), rect);

        let center = scene.world().position(body).unwrap();
        assert_relative_eq!(center.x, 100.0);
        assert_relative_eq!(center.y, 75.0);
        assert_eq!(scene.world().is_static(body), Some(true));

        // as if the step just reported it touching the player
        let pair = CollisionPair {
            body_a: scene.player().body(),
            body_b: body,
        };
        scene
            .destroyables
            .on_collision_start(&mut scene.world, &[pair]);
        assert_eq!(scene.world().is_static(body), Some(false));
        assert_eq!(
            scene.destroyables().bindings()[0].state(),
            BindingState::Dynamic
        );

        scene.tick().unwrap();
        let center = scene.world().position(body).unwrap();
        assert!(center.y > 75.0, "gravity should pull it down, got {:?}", center);

        let placed = scene.destroyables().bindings()[0].element().last().unwrap();
        assert_relative_eq!(placed.x, center.x - 50.0);
        assert_relative_eq!(placed.y, center.y - 25.0);
        assert!(placed.y > 50.0);
    }

    #[test]
    fn player_landing_on_a_destroyable_knocks_it_loose() {
        let mut scene = scene();
        // a shelf right under the player's spawn point (200, 300)
        let rect = Rect::new(
            Point { x: 150.0, y: 360.0 },
            Size {
                width: 100.0,
                height: 20.0,
            },
        );
        let body = scene.bind_destroyable(Recorder::default(), rect);

        for _ in 0..120 {
            scene.tick().unwrap();
        }

        assert_eq!(
            scene.destroyables().bindings()[0].state(),
            BindingState::Dynamic
        );
        assert_eq!(scene.world().is_static(body), Some(false));
    }

    #[test]
    fn untouched_destroyables_stay_put() {
        let mut scene = scene();
        let rect = Rect::new(
            Point { x: 700.0, y: 100.0 },
            Size {
                width: 80.0,
                height: 30.0,
            },
        );
        scene.bind_destroyable(Recorder::default(), rect);

        for _ in 0..30 {
            scene.tick().unwrap();
        }

        let binding = &scene.destroyables().bindings()[0];
        assert_eq!(binding.state(), BindingState::Static);
        assert_eq!(binding.element().placed.borrow().len(), 30);
        let placed = binding.element().last().unwrap();
        assert_relative_eq!(placed.x, 700.0);
        assert_relative_eq!(placed.y, 100.0);
    }

    #[test]
    fn arrow_keys_reach_the_player() {
        let mut scene = scene();
        assert_eq!(scene.key_down("ArrowRight"), Some(Push::Right));
        assert_eq!(scene.key_down("Shift"), None);

        let force = scene.world().pending_force(scene.player().body()).unwrap();
        assert_relative_eq!(force.x, 0.02, epsilon = 1e-6);

        let before = scene.world().position(scene.player().body()).unwrap();
        scene.tick().unwrap();
        let after = scene.world().position(scene.player().body()).unwrap();
        assert!(after.x > before.x);
    }
}
