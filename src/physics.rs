use crate::engine::{Point, Size};
use rapier2d::prelude::*;
use std::collections::HashMap;
use std::sync::Mutex;

// ==================== Units ====================
// The page is tuned in milliseconds : gravity 0.001 px/ms², push 0.02
// mass·px/ms². rapier integrates in seconds, so both are scaled by
// (1000 ms/s)² on the way in.
const MS2_TO_S2: f32 = 1_000_000.0;
// mass per px², a 30x50 body weighs 1.5
const DENSITY: f32 = 0.001;
const FRICTION: f32 = 0.1;
// world is in pixels, tell the solver so its tolerances aren't in meters
const PIXELS_PER_METER: f32 = 100.0;

pub const DEFAULT_FILL: &str = "#063e7b";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Two bodies that started touching during the last step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPair {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
}

impl CollisionPair {
    pub fn bodies(&self) -> [BodyHandle; 2] {
        [self.body_a, self.body_b]
    }

    pub fn involves(&self, body: BodyHandle) -> bool {
        self.body_a == body || self.body_b == body
    }
}

/// Rectangle body description, builder style
#[derive(Debug, Clone)]
pub struct BodyDesc {
    pub label: String,
    pub center: Point,
    pub size: Size,
    pub is_static: bool,
    pub restitution: f32,
    /// None -> collides but is never drawn
    pub fill: Option<String>,
}

impl BodyDesc {
    pub fn rectangle(center: Point, size: Size) -> Self {
        BodyDesc {
            label: String::from("Rectangle Body"),
            center,
            size,
            is_static: false,
            restitution: 0.0,
            fill: Some(String::from(DEFAULT_FILL)),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn fixed(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_fill(mut self, fill: &str) -> Self {
        self.fill = Some(fill.to_string());
        self
    }

    pub fn invisible(mut self) -> Self {
        self.fill = None;
        self
    }
}

/// What the renderer needs to paint one body
#[derive(Debug, Clone, PartialEq)]
pub struct BodyShape {
    pub label: String,
    pub vertices: Vec<Point>,
    pub fill: String,
}

struct BodyRecord {
    label: String,
    fill: Option<String>,
    collider: ColliderHandle,
}

// rapier wants Send + Sync for its event handler, so Mutex even though
// wasm only ever has the one thread
struct CollisionStartCollector {
    started: Mutex<Vec<(ColliderHandle, ColliderHandle)>>,
}

impl CollisionStartCollector {
    fn new() -> Self {
        CollisionStartCollector {
            started: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<(ColliderHandle, ColliderHandle)> {
        self.started
            .lock()
            .map(|mut started| std::mem::take(&mut *started))
            .unwrap_or_default()
    }
}

impl EventHandler for CollisionStartCollector {
    fn handle_collision_event(
        &self,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        event: CollisionEvent,
        _contact_pair: Option<&ContactPair>,
    ) {
        if let CollisionEvent::Started(collider_a, collider_b, _) = event {
            if let Ok(mut started) = self.started.lock() {
                started.push((collider_a, collider_b));
            }
        }
    }

    fn handle_contact_force_event(
        &self,
        _dt: Real,
        _bodies: &RigidBodySet,
        _colliders: &ColliderSet,
        _contact_pair: &ContactPair,
        _total_force_magnitude: Real,
    ) {
    }
}

/// All the rapier bookkeeping behind one append-only set of rectangles
pub struct PhysicsWorld {
    gravity: Vector<Real>,
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    collisions: CollisionStartCollector,
    records: HashMap<BodyHandle, BodyRecord>,
    // insertion order, so drawing order is stable
    order: Vec<BodyHandle>,
}

impl PhysicsWorld {
    /// `gravity` is downward acceleration in px/ms²
    pub fn new(gravity: f32) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.length_unit = PIXELS_PER_METER;
        PhysicsWorld {
            gravity: vector![0.0, gravity * MS2_TO_S2],
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            collisions: CollisionStartCollector::new(),
            records: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub fn add_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let builder = if desc.is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let rigid_body = builder
            .translation(vector![desc.center.x, desc.center.y])
            .build();
        let rigid_body_handle = self.bodies.insert(rigid_body);

        // negative layout sizes happen with broken css, treat them as empty
        let collider = ColliderBuilder::cuboid(
            (desc.size.width * 0.5).max(0.0),
            (desc.size.height * 0.5).max(0.0),
        )
        .density(DENSITY)
        .friction(FRICTION)
        .friction_combine_rule(CoefficientCombineRule::Min)
        .restitution(desc.restitution)
        .restitution_combine_rule(CoefficientCombineRule::Max)
        .active_events(ActiveEvents::COLLISION_EVENTS)
        .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, rigid_body_handle, &mut self.bodies);

        let handle = BodyHandle(rigid_body_handle);
        self.records.insert(
            handle,
            BodyRecord {
                label: desc.label.clone(),
                fill: desc.fill.clone(),
                collider,
            },
        );
        self.order.push(handle);
        handle
    }

    /// Advance one fixed step (1/60 s) and report the pairs that started
    /// touching. Forces applied before the step are consumed by it.
    pub fn step(&mut self) -> Vec<CollisionPair> {
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &self.collisions,
        );

        // rapier keeps user forces until told otherwise, a push lasts one step
        for (_, rigid_body) in self.bodies.iter_mut() {
            rigid_body.reset_forces(false);
        }

        self.collisions
            .drain()
            .into_iter()
            .filter_map(|(collider_a, collider_b)| {
                Some(CollisionPair {
                    body_a: self.collider_body(collider_a)?,
                    body_b: self.collider_body(collider_b)?,
                })
            })
            .collect()
    }

    /// `force` in mass·px/ms², applied at `point` (world space)
    pub fn apply_force(&mut self, body: BodyHandle, force: Point, point: Point) {
        if let Some(rigid_body) = self.bodies.get_mut(body.0) {
            rigid_body.add_force_at_point(
                vector![force.x * MS2_TO_S2, force.y * MS2_TO_S2],
                point![point.x, point.y],
                true,
            );
        }
    }

    /// Force accumulated since the last step, same units as apply_force
    pub fn pending_force(&self, body: BodyHandle) -> Option<Point> {
        self.bodies.get(body.0).map(|rigid_body| {
            let force = rigid_body.user_force();
            Point {
                x: force.x / MS2_TO_S2,
                y: force.y / MS2_TO_S2,
            }
        })
    }

    pub fn set_static(&mut self, body: BodyHandle, is_static: bool) {
        if let Some(rigid_body) = self.bodies.get_mut(body.0) {
            let body_type = if is_static {
                RigidBodyType::Fixed
            } else {
                RigidBodyType::Dynamic
            };
            rigid_body.set_body_type(body_type, true);
        }
    }

    pub fn is_static(&self, body: BodyHandle) -> Option<bool> {
        self.bodies.get(body.0).map(|rigid_body| rigid_body.is_fixed())
    }

    pub fn set_position(&mut self, body: BodyHandle, center: Point) {
        if let Some(rigid_body) = self.bodies.get_mut(body.0) {
            rigid_body.set_translation(vector![center.x, center.y], true);
        }
    }

    /// center of the body
    pub fn position(&self, body: BodyHandle) -> Option<Point> {
        self.bodies.get(body.0).map(|rigid_body| {
            let translation = rigid_body.translation();
            Point {
                x: translation.x,
                y: translation.y,
            }
        })
    }

    pub fn label(&self, body: BodyHandle) -> Option<&str> {
        self.records.get(&body).map(|record| record.label.as_str())
    }

    pub fn body_count(&self) -> usize {
        self.order.len()
    }

    /// Outlines of every visible body, in insertion order
    pub fn shapes(&self) -> Vec<BodyShape> {
        self.order
            .iter()
            .filter_map(|handle| {
                let record = self.records.get(handle)?;
                let fill = record.fill.as_ref()?;
                let rigid_body = self.bodies.get(handle.0)?;
                let collider = self.colliders.get(record.collider)?;
                let half_extents = collider.shape().as_cuboid()?.half_extents;
                // the body pose, not collider.position(), which lags behind
                // set_position() until the next step
                let pose = rigid_body.position();
                let vertices = [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
                    .iter()
                    .map(|(sx, sy)| {
                        let corner = pose * point![sx * half_extents.x, sy * half_extents.y];
                        Point {
                            x: corner.x,
                            y: corner.y,
                        }
                    })
                    .collect();
                Some(BodyShape {
                    label: record.label.clone(),
                    vertices,
                    fill: fill.clone(),
                })
            })
            .collect()
    }

    fn collider_body(&self, collider: ColliderHandle) -> Option<BodyHandle> {
        self.colliders
            .get(collider)?
            .parent()
            .map(BodyHandle)
    }
}
