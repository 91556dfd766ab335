//! Rigid-body world component
//!
//! Owns the active [`ColliderData`] children and their rigid-body states,
//! integrates them with a fixed timestep, and reports every changed pose
//! back through the data's `graphics_world_transform_changed` signal with
//! the body's scale/shear correction reapplied. The world only ever sees
//! rigid transforms; [`PhysicsWorld::remove_scaling_shear`] is the
//! decomposition the Collider runs before handing a pose over.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::component::{Component, Targets};
use crate::core::config::PhysicsConfig;
use crate::foundation::math::{Mat3, Mat4, Mat4Ext, Vec3};
use crate::physics::ColliderData;
use crate::scene::NodeRef;

struct Body {
    data: Rc<ColliderData>,
    /// Scale-free world pose
    rigid: Cell<Mat4>,
    linear_velocity: Cell<Vec3>,
    /// Pose changed since the last step report
    moved: Cell<bool>,
}

/// Component performing the rigid-body simulation step for the colliders
/// registered below it in the scene graph
pub struct PhysicsWorld {
    config: PhysicsConfig,
    bodies: RefCell<HashMap<u64, Body>>,
    accumulator: Cell<f32>,
    targets: Targets,
}

impl PhysicsWorld {
    /// Create a world with the default configuration
    pub fn create() -> Rc<Self> {
        Self::with_config(PhysicsConfig::default())
    }

    /// Create a world with a custom configuration
    pub fn with_config(config: PhysicsConfig) -> Rc<Self> {
        Rc::new(Self {
            config,
            bodies: RefCell::new(HashMap::new()),
            accumulator: Cell::new(0.0),
            targets: Targets::new(),
        })
    }

    /// The world's configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a body; idempotent per data id, so a re-entrant binding
    /// pass never double-registers.
    pub fn add_child(&self, data: &Rc<ColliderData>) {
        let mut bodies = self.bodies.borrow_mut();
        if bodies.contains_key(&data.id()) {
            log::debug!("[{}] body already registered", data.name());
            return;
        }
        bodies.insert(
            data.id(),
            Body {
                data: data.clone(),
                rigid: Cell::new(Mat4::identity()),
                linear_velocity: Cell::new(Vec3::zeros()),
                moved: Cell::new(false),
            },
        );
    }

    /// Unregister a body; unknown ids are ignored
    pub fn remove_child(&self, data: &Rc<ColliderData>) {
        self.bodies.borrow_mut().remove(&data.id());
    }

    /// Whether a body is registered
    pub fn has_child(&self, data: &Rc<ColliderData>) -> bool {
        self.bodies.borrow().contains_key(&data.id())
    }

    /// Number of registered bodies
    pub fn body_count(&self) -> usize {
        self.bodies.borrow().len()
    }

    // ------------------------------------------------------------------
    // Graphics → physics
    // ------------------------------------------------------------------

    /// Overwrite a body's rigid pose from the graphics side.
    ///
    /// Does not mark the body moved: a pose the graphics side just set is
    /// not echoed back on the next step.
    pub fn synchronize_physics_with_graphics(&self, data: &Rc<ColliderData>, rigid: Mat4) {
        if let Some(body) = self.bodies.borrow().get(&data.id()) {
            body.rigid.set(rigid);
            body.moved.set(false);
        }
    }

    /// Translate a body in its own frame
    pub fn prepend_local_translation(&self, data: &Rc<ColliderData>, translation: Vec3) {
        if let Some(body) = self.bodies.borrow().get(&data.id()) {
            body.rigid.set(body.rigid.get() * Mat4::translation(translation));
            body.moved.set(true);
        }
    }

    /// Rotate a body around its own Y axis
    pub fn prepend_rotation_y(&self, data: &Rc<ColliderData>, radians: f32) {
        if let Some(body) = self.bodies.borrow().get(&data.id()) {
            body.rigid.set(body.rigid.get() * Mat4::rotation_y(radians));
            body.moved.set(true);
        }
    }

    /// Apply an impulse expressed in the body's own frame.
    ///
    /// Static bodies ignore impulses.
    pub fn apply_relative_impulse(&self, data: &Rc<ColliderData>, impulse: Vec3) {
        if let Some(body) = self.bodies.borrow().get(&data.id()) {
            if body.data.is_static() {
                return;
            }
            let rotation: Mat3 = body.rigid.get().fixed_view::<3, 3>(0, 0).into_owned();
            let delta = rotation * (impulse / body.data.mass());
            body.linear_velocity.set(body.linear_velocity.get() + delta);
        }
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance the simulation by wall-clock time, running zero or more
    /// fixed-timestep sub-steps
    pub fn update(&self, elapsed: f32) {
        let step = self.config.fixed_timestep;
        let mut accumulator = self.accumulator.get() + elapsed;
        while accumulator >= step {
            self.step(step);
            accumulator -= step;
        }
        self.accumulator.set(accumulator);
    }

    /// Run one simulation step and report every changed pose.
    ///
    /// The body map is never borrowed across a signal dispatch: handlers
    /// may edit the scene graph, and therefore register or unregister
    /// bodies, while the step is running.
    pub fn step(&self, dt: f32) {
        let ids: Vec<u64> = self.bodies.borrow().keys().copied().collect();

        for id in ids {
            let report = {
                let bodies = self.bodies.borrow();
                let Some(body) = bodies.get(&id) else {
                    continue;
                };

                if !body.data.is_static() {
                    let velocity = body.linear_velocity.get() + self.config.gravity * dt;
                    body.linear_velocity.set(velocity);

                    let displacement = velocity * dt;
                    if displacement.magnitude_squared() > 0.0 {
                        body.rigid
                            .set(Mat4::translation(displacement) * body.rigid.get());
                        body.moved.set(true);
                    }
                }

                if body.moved.get() {
                    body.moved.set(false);
                    let graphics = body.rigid.get() * body.data.correction();
                    Some((body.data.clone(), graphics))
                } else {
                    None
                }
            };

            if let Some((data, graphics)) = report {
                data.graphics_world_transform_changed()
                    .execute(&(data.clone(), graphics));
            }
        }
    }

    /// A body's current rigid pose, for inspection
    pub fn rigid_transform(&self, data: &Rc<ColliderData>) -> Option<Mat4> {
        self.bodies
            .borrow()
            .get(&data.id())
            .map(|body| body.rigid.get())
    }

    /// Split a transform into a rigid part and a scale/shear correction.
    ///
    /// QR decomposition of the upper-left 3x3, sign-fixed so the rigid
    /// part's rotation is proper and the correction's diagonal is
    /// non-negative. The translation goes to the rigid part; the
    /// correction carries no rotation. Round-trips exactly:
    /// `rigid * correction == matrix`.
    pub fn remove_scaling_shear(matrix: &Mat4) -> (Mat4, Mat4) {
        let linear: Mat3 = matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let (mut q, mut r) = linear.qr().unpack();

        for i in 0..3 {
            if r[(i, i)] < 0.0 {
                for j in 0..3 {
                    r[(i, j)] = -r[(i, j)];
                    q[(j, i)] = -q[(j, i)];
                }
            }
        }

        let mut rigid = Mat4::identity();
        rigid.fixed_view_mut::<3, 3>(0, 0).copy_from(&q);
        rigid[(0, 3)] = matrix[(0, 3)];
        rigid[(1, 3)] = matrix[(1, 3)];
        rigid[(2, 3)] = matrix[(2, 3)];

        let mut correction = Mat4::identity();
        correction.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);

        (rigid, correction)
    }
}

impl Component for PhysicsWorld {
    fn target_added(self: Rc<Self>, node: &NodeRef) {
        assert!(
            self.targets.is_empty(),
            "PhysicsWorld cannot have more than one target."
        );
        self.targets.add(node);
    }

    fn target_removed(self: Rc<Self>, node: &NodeRef) {
        // Detaching the world drops every registered body; bound colliders
        // become inert (their forwarded calls no-op on the unknown id).
        self.bodies.borrow_mut().clear();
        self.targets.remove(node);
    }

    fn targets(&self) -> Vec<NodeRef> {
        self.targets.all()
    }

    fn as_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }
}
