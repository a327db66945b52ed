use crate::engine::{Point, Rect};
use crate::physics::{BodyDesc, BodyHandle, CollisionPair, PhysicsWorld};
use anyhow::Result;
use std::collections::HashMap;

pub const DESTROYABLE_LABEL: &str = "destroyable";

/// Where a bound element gets its position written. The page implements
/// this for `HtmlElement`, tests use a recorder.
pub trait Placeable {
    fn place(&self, top_left: Point) -> Result<()>;
}

/// ELI5: a destroyable starts glued to the page (Static) and the first hit
/// knocks it loose (Dynamic). There is no way back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingState {
    Static,
    Dynamic,
}

/// one element <-> one shadow body
pub struct Binding<E> {
    element: E,
    body: BodyHandle,
    // measured once at bind time, never re-measured
    rect: Rect,
    state: BindingState,
}

impl<E> Binding<E> {
    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn state(&self) -> BindingState {
        self.state
    }

    fn knock_loose(&mut self, world: &mut PhysicsWorld) {
        if self.state == BindingState::Static {
            world.set_static(self.body, false);
            self.state = BindingState::Dynamic;
            log::debug!("Destroyable {:?} knocked loose", self.body);
        }
    }
}

/// Owns every binding and the body -> binding lookup, so a collision
/// event is resolved in one pass over its pairs.
pub struct DestroyableBinder<E> {
    bindings: Vec<Binding<E>>,
    by_body: HashMap<BodyHandle, usize>,
}

impl<E> Default for DestroyableBinder<E> {
    fn default() -> Self {
        DestroyableBinder {
            bindings: Vec::new(),
            by_body: HashMap::new(),
        }
    }
}

impl<E: Placeable> DestroyableBinder<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a static, invisible body covering `rect`
    pub fn bind(&mut self, world: &mut PhysicsWorld, element: E, rect: Rect) -> BodyHandle {
        let body = world.add_body(
            &BodyDesc::rectangle(rect.center(), rect.size)
                .with_label(DESTROYABLE_LABEL)
                .fixed()
                .invisible(),
        );
        self.by_body.insert(body, self.bindings.len());
        self.bindings.push(Binding {
            element,
            body,
            rect,
            state: BindingState::Static,
        });
        body
    }

    /// collision-start : any pair touching a shadow body knocks it loose
    pub fn on_collision_start(&mut self, world: &mut PhysicsWorld, pairs: &[CollisionPair]) {
        for body in pairs.iter().flat_map(CollisionPair::bodies) {
            if let Some(&index) = self.by_body.get(&body) {
                self.bindings[index].knock_loose(world);
            }
        }
    }

    /// after-update : write every body position back to its element,
    /// moved or not. Keeps going past a failing element and reports the
    /// last failure.
    pub fn sync(&self, world: &PhysicsWorld) -> Result<()> {
        let mut result = Ok(());
        for binding in &self.bindings {
            let Some(center) = world.position(binding.body) else {
                continue;
            };
            if let Err(err) = binding.element.place(binding.rect.top_left_for_center(center)) {
                result = Err(err);
            }
        }
        result
    }

    pub fn bindings(&self) -> &[Binding<E>] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}
