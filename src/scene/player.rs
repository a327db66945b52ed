use crate::config::Config;
use crate::engine::Point;
use crate::physics::{BodyDesc, BodyHandle, PhysicsWorld};

/// Keys that push the player, anything else is ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    Up,
    Left,
    Right,
}

impl Push {
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Push::Up),
            "ArrowLeft" => Some(Push::Left),
            "ArrowRight" => Some(Push::Right),
            _ => None,
        }
    }

    /// negative y is up, top left is origin
    pub fn force(self, magnitude: f32) -> Point {
        match self {
            Push::Up => Point {
                x: 0.0,
                y: -magnitude,
            },
            Push::Left => Point {
                x: -magnitude,
                y: 0.0,
            },
            Push::Right => Point {
                x: magnitude,
                y: 0.0,
            },
        }
    }
}

/// The one dynamic body the keyboard drives
pub struct Player {
    body: BodyHandle,
    push_force: f32,
}

impl Player {
    pub fn spawn(world: &mut PhysicsWorld, config: &Config) -> Self {
        let player = &config.player;
        let body = world.add_body(
            &BodyDesc::rectangle(player.position, player.size)
                .with_label(&player.label)
                .with_restitution(player.restitution)
                .with_fill(&player.fill),
        );
        Player {
            body,
            push_force: config.push_force,
        }
    }

    /// Every call pushes again, key repeats included. The force is applied
    /// at the body's current position and lasts until the next step.
    pub fn on_key_down(&self, world: &mut PhysicsWorld, key: &str) -> Option<Push> {
        let push = Push::from_key(key)?;
        let at = world.position(self.body)?;
        world.apply_force(self.body, push.force(self.push_force), at);
        log::debug!("Push {:?} on '{}'", push, key);
        Some(push)
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn spawn() -> (PhysicsWorld, Player) {
        let mut world = PhysicsWorld::new(0.001);
        let player = Player::spawn(&mut world, &Config::default());
        (world, player)
    }

    #[test]
    fn spawns_dynamic_at_start_position() {
        let (world, player) = spawn();
        let position = world.position(player.body()).unwrap();
        assert_relative_eq!(position.x, 200.0);
        assert_relative_eq!(position.y, 300.0);
        assert_eq!(world.is_static(player.body()), Some(false));
        assert_eq!(world.label(player.body()), Some("stickFigure"));
    }

    #[test]
    fn arrow_keys_push_with_fixed_force() {
        let (mut world, player) = spawn();

        assert_eq!(player.on_key_down(&mut world, "ArrowLeft"), Some(Push::Left));
        let force = world.pending_force(player.body()).unwrap();
        assert_relative_eq!(force.x, -0.02, epsilon = 1e-6);
        assert_relative_eq!(force.y, 0.0);

        world.step();

        assert_eq!(player.on_key_down(&mut world, "ArrowUp"), Some(Push::Up));
        let force = world.pending_force(player.body()).unwrap();
        assert_relative_eq!(force.x, 0.0);
        assert_relative_eq!(force.y, -0.02, epsilon = 1e-6);
    }

    #[test]
    fn repeated_key_downs_add_up() {
        let (mut world, player) = spawn();
        for _ in 0..3 {
            player.on_key_down(&mut world, "ArrowRight");
        }
        let force = world.pending_force(player.body()).unwrap();
        assert_relative_eq!(force.x, 0.06, epsilon = 1e-6);
    }

    #[test]
    fn other_keys_apply_nothing() {
        let (mut world, player) = spawn();
        for key in ["ArrowDown", "a", " ", "Enter", "arrowleft"] {
            assert_eq!(player.on_key_down(&mut world, key), None);
        }
        let force = world.pending_force(player.body()).unwrap();
        assert_relative_eq!(force.x, 0.0);
        assert_relative_eq!(force.y, 0.0);
    }
}
