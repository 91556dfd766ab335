//! End-to-end scenarios for the physics/graphics synchronization bridge
//! and the bounding-volume pipeline riding on top of it.

use approx::assert_relative_eq;
use scene_engine::prelude::*;

fn translation_of(matrix: &Mat4) -> Vec3 {
    Vec3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)])
}

fn world_matrix(node: &NodeRef) -> Mat4 {
    node.component::<Transform>()
        .expect("node carries a transform")
        .model_to_world()
}

#[test]
fn scaled_collider_binds_with_unit_scale_rigid_pose() {
    let root = Node::create("root");
    let world = PhysicsWorld::create();
    root.add_component(world.clone()).unwrap();

    let body = Node::create("body");
    body.add_component(Transform::from_matrix(
        Mat4::new_translation(&Vec3::new(3.0, 0.0, 0.0)) * Mat4::new_scaling(2.0),
    ))
    .unwrap();

    let data = ColliderData::new(1.0);
    let collider = Collider::create(data.clone());
    body.add_component(collider.clone()).unwrap();

    root.add_child(&body).unwrap();
    assert!(collider.is_bound());

    // The correction captured the 2x scale...
    let correction = data.correction();
    assert_relative_eq!(correction[(0, 0)], 2.0, epsilon = 1e-5);
    assert_relative_eq!(correction[(1, 1)], 2.0, epsilon = 1e-5);
    assert_relative_eq!(correction[(2, 2)], 2.0, epsilon = 1e-5);

    // ...and the pose handed to physics has unit scale.
    let rigid = world.rigid_transform(&data).unwrap();
    for i in 0..3 {
        let column = Vec3::new(rigid[(0, i)], rigid[(1, i)], rigid[(2, i)]);
        assert_relative_eq!(column.magnitude(), 1.0, epsilon = 1e-5);
    }
    assert_relative_eq!(rigid[(0, 3)], 3.0, epsilon = 1e-5);
}

#[test]
fn physics_step_preserves_scale_and_parent_chain() {
    let root = Node::create("root");
    root.add_component(PhysicsWorld::with_config(
        PhysicsConfig::default().with_gravity(Vec3::zeros()),
    ))
    .unwrap();
    root.add_component(Transform::from_matrix(Mat4::new_translation(&Vec3::new(
        0.0, 5.0, 0.0,
    ))))
    .unwrap();

    let body = Node::create("body");
    let body_transform = Transform::from_matrix(
        Mat4::new_translation(&Vec3::new(3.0, 0.0, 0.0)) * Mat4::new_scaling(2.0),
    );
    body.add_component(body_transform.clone()).unwrap();

    let collider = Collider::create(ColliderData::new(1.0));
    body.add_component(collider.clone()).unwrap();
    root.add_child(&body).unwrap();

    // Push the body one meter along its own X, then step.
    collider.prepend_local_translation(Vec3::new(1.0, 0.0, 0.0));
    root.component::<PhysicsWorld>().unwrap().step(1.0 / 60.0);

    // The local matrix took on the physics pose expressed in the parent's
    // frame: the parent's (0, 5, 0) offset stayed out of it.
    let local = body_transform.matrix();
    assert_relative_eq!(local[(0, 3)], 4.0, epsilon = 1e-4);
    assert_relative_eq!(local[(1, 3)], 0.0, epsilon = 1e-4);

    // The world pose is the new rigid pose with the 2x scale reapplied.
    let world = world_matrix(&body);
    assert_relative_eq!(world[(0, 0)], 2.0, epsilon = 1e-4);
    assert_relative_eq!(world[(1, 1)], 2.0, epsilon = 1e-4);
    let translation = translation_of(&world);
    assert_relative_eq!(translation.x, 4.0, epsilon = 1e-4);
    assert_relative_eq!(translation.y, 5.0, epsilon = 1e-4);
}

#[test]
fn detaching_the_world_leaves_colliders_inert() {
    let root = Node::create("root");
    let world = PhysicsWorld::with_config(
        PhysicsConfig::default().with_gravity(Vec3::zeros()),
    );
    root.add_component(world.clone()).unwrap();

    let body = Node::create("body");
    let collider = Collider::create(ColliderData::new(1.0));
    body.add_component(collider.clone()).unwrap();
    root.add_child(&body).unwrap();
    assert_eq!(world.body_count(), 1);

    root.remove_component::<PhysicsWorld>().unwrap();
    assert_eq!(world.body_count(), 0);

    // Further impulses are no-ops: the body is gone from the simulation.
    let before = world_matrix(&body);
    collider.apply_relative_impulse(Vec3::new(100.0, 0.0, 0.0));
    world.step(1.0);
    let after = world_matrix(&body);

    assert_relative_eq!(translation_of(&before).x, translation_of(&after).x);
}

#[test]
fn late_appearing_world_binds_existing_collider() {
    let orphan_parent = Node::create("staging");
    let body = Node::create("body");
    let collider = Collider::create(ColliderData::new(1.0));
    body.add_component(collider.clone()).unwrap();
    orphan_parent.add_child(&body).unwrap();
    assert!(!collider.is_bound());

    let root = Node::create("root");
    root.add_component(PhysicsWorld::create()).unwrap();

    // Moving the whole staging subtree under the world re-runs the search.
    root.add_child(&orphan_parent).unwrap();
    assert!(collider.is_bound());
}

#[test]
fn transform_mutation_resynchronizes_physics() {
    let root = Node::create("root");
    let world = PhysicsWorld::with_config(
        PhysicsConfig::default().with_gravity(Vec3::zeros()),
    );
    root.add_component(world.clone()).unwrap();

    let body = Node::create("body");
    let transform = Transform::create();
    body.add_component(transform.clone()).unwrap();
    let data = ColliderData::new(1.0);
    body.add_component(Collider::create(data.clone())).unwrap();
    root.add_child(&body).unwrap();

    transform.set_matrix(
        Mat4::new_translation(&Vec3::new(0.0, 0.0, 8.0)) * Mat4::new_scaling(3.0),
    );

    let rigid = world.rigid_transform(&data).unwrap();
    assert_relative_eq!(rigid[(2, 3)], 8.0, epsilon = 1e-5);
    assert_relative_eq!(data.correction()[(0, 0)], 3.0, epsilon = 1e-5);
}

#[test]
fn falling_body_drags_its_bounding_box_along() {
    let root = Node::create("root");
    let world = PhysicsWorld::with_config(
        PhysicsConfig::default().with_gravity(Vec3::new(0.0, -10.0, 0.0)),
    );
    root.add_component(world.clone()).unwrap();

    let body = Node::create("crate");
    body.add_component(Surface::create(Geometry::cube())).unwrap();
    body.add_component(Transform::create()).unwrap();
    let bounds = BoundingBox::create();
    body.add_component(bounds.clone()).unwrap();
    body.add_component(Collider::create(ColliderData::new(1.0))).unwrap();
    root.add_child(&body).unwrap();

    assert_relative_eq!(bounds.world_space_box().center().y, 0.0, epsilon = 1e-5);

    for _ in 0..6 {
        world.step(0.1);
    }

    let center = bounds.world_space_box().center();
    assert!(center.y < -0.5, "box should have fallen, is at {}", center.y);
    assert_relative_eq!(
        center.y,
        translation_of(&world_matrix(&body)).y,
        epsilon = 1e-4
    );
}

#[test]
fn bound_queries_never_see_stale_state() {
    let parent = Node::create("parent");
    let parent_transform = Transform::create();
    parent.add_component(parent_transform.clone()).unwrap();

    let child = Node::create("child");
    child.add_component(Surface::create(Geometry::cube())).unwrap();
    let child_transform = Transform::create();
    child.add_component(child_transform.clone()).unwrap();
    let bounds = BoundingBox::create();
    child.add_component(bounds.clone()).unwrap();
    parent.add_child(&child).unwrap();

    // Interleave geometry and transform mutations with queries; the bound
    // must always reflect the latest state.
    parent_transform.set_matrix(Mat4::new_translation(&Vec3::new(2.0, 0.0, 0.0)));
    assert_relative_eq!(bounds.world_space_box().center().x, 2.0, epsilon = 1e-5);

    child_transform.set_matrix(Mat4::new_scaling(4.0));
    let world = bounds.world_space_box();
    assert_relative_eq!(world.size().x, 4.0, epsilon = 1e-5);
    assert_relative_eq!(world.center().x, 2.0, epsilon = 1e-5);

    child.remove_component::<Surface>().unwrap();
    child
        .add_component(Surface::create(Geometry::new(vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ])))
        .unwrap();
    let world = bounds.world_space_box();
    assert_relative_eq!(world.min.x, 2.0, epsilon = 1e-5);
    assert_relative_eq!(world.max.x, 6.0, epsilon = 1e-5);
}
