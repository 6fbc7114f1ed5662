use cgmath::{InnerSpace, Rotation, Vector3};
use mjviewer::{
    builder::build_scene,
    config::Params,
    data_structures::instanced::TENDON_POOL_CAPACITY,
    physics::Model,
    sync::{SimClock, advance, sync_poses, sync_tendons},
};
use rand::{SeedableRng, rngs::StdRng};

use crate::common::test_utils::{FakeSim, approx, arm_model, empty_model, tendon_fixture};

mod common;

/// 2^-7 s, so every step is an exact number of milliseconds.
const TIMESTEP: f64 = 0.0078125;

fn stepping_fixture() -> (Model, FakeSim, Params, SimClock, StdRng) {
    let model = Model {
        opt_timestep: TIMESTEP,
        ..arm_model()
    };
    let sim = FakeSim::for_model(&model);
    (model, sim, Params::default(), SimClock::default(), StdRng::seed_from_u64(11))
}

#[test]
fn simulation_catches_up_with_wall_time() {
    let (model, mut sim, mut params, mut clock, mut rng) = stepping_fixture();

    assert_eq!(advance(&mut sim, &model, &mut params, &mut clock, 30.0, &mut rng), 4);
    assert_eq!(clock.time_ms, 31.25);

    assert_eq!(advance(&mut sim, &model, &mut params, &mut clock, 60.0, &mut rng), 4);
    assert_eq!(clock.time_ms, 62.5);
    assert_eq!(sim.steps, 8);
}

#[test]
fn large_lag_snaps_the_clock() {
    let (model, mut sim, mut params, mut clock, mut rng) = stepping_fixture();
    clock.time_ms = 10.0;

    assert_eq!(advance(&mut sim, &model, &mut params, &mut clock, 200.0, &mut rng), 0);
    assert_eq!(clock.time_ms, 200.0);
    assert_eq!(sim.steps, 0);
}

#[test]
fn paused_simulation_only_runs_forward() {
    let (model, mut sim, mut params, mut clock, mut rng) = stepping_fixture();
    params.paused = true;

    assert_eq!(advance(&mut sim, &model, &mut params, &mut clock, 30.0, &mut rng), 0);
    assert_eq!(sim.forwards, 1);
    assert_eq!(sim.steps, 0);
    assert_eq!(clock.time_ms, 0.0);
}

#[test]
fn zero_timestep_does_not_hang() {
    let (mut model, mut sim, mut params, mut clock, mut rng) = stepping_fixture();
    model.opt_timestep = 0.0;
    assert_eq!(advance(&mut sim, &model, &mut params, &mut clock, 30.0, &mut rng), 0);
}

#[test]
fn control_noise_is_mirrored_into_actuator_params() {
    let (model, mut sim, mut params, mut clock, mut rng) = stepping_fixture();
    params.ctrl_noise_std = 1.0;
    params.ctrl_noise_rate = 0.1;
    params.actuators.insert("elbow".to_string(), 0.0);

    advance(&mut sim, &model, &mut params, &mut clock, 30.0, &mut rng);

    assert!(sim.ctrl.iter().all(|c| *c != 0.0));
    assert_eq!(params.actuators["elbow"], sim.ctrl[0]);
    // no slider, no parameter
    assert!(!params.actuators.contains_key("free"));
}

#[test]
fn noise_is_off_by_default() {
    let (model, mut sim, mut params, mut clock, mut rng) = stepping_fixture();
    advance(&mut sim, &model, &mut params, &mut clock, 30.0, &mut rng);
    assert!(sim.ctrl.iter().all(|c| *c == 0.0));
}

#[test]
fn body_and_light_poses_are_converted() {
    let model = arm_model();
    let mut scene = build_scene(&model);
    let mut sim = FakeSim::for_model(&model);
    sim.xpos[3..6].copy_from_slice(&[1.0, 2.0, 3.0]);
    sim.light_xpos = vec![0.0, 0.0, 3.0];
    sim.light_xdir = vec![0.0, 0.0, -1.0];

    sync_poses(&mut scene, &sim);

    let upper = scene.body_node(1).unwrap();
    let local = scene.graph.get_local_transform(upper).unwrap();
    assert_eq!(local.position, Vector3::new(1.0, 3.0, -2.0));
    let world = scene.graph.get_world_transform(upper).unwrap();
    assert!((world.position - Vector3::new(1.0, 3.0, -2.0)).magnitude() < 1e-5);

    let light = &scene.lights[0];
    let light_node = scene.graph.get(light.node).unwrap();
    assert_eq!(light_node.local.position, Vector3::new(0.0, 3.0, 0.0));
    assert_eq!(light.target, Vector3::new(0.0, 2.0, 0.0));
}

#[test]
fn default_light_is_not_moved() {
    let model = empty_model();
    let mut scene = build_scene(&model);
    let sim = FakeSim::for_model(&model);
    sync_poses(&mut scene, &sim);
    assert_eq!(scene.lights[0].target, Vector3::new(0.0, 0.0, 0.0));
}

#[test]
fn tendon_segments_fill_both_pools() {
    let (model, sim) = tendon_fixture(&[[0.0, 0.0, 1.0], [0.0, 0.0, 2.0], [1.0, 0.0, 2.0]], 0.01);
    let mut scene = build_scene(&model);

    assert_eq!(sync_tendons(&mut scene, &model, &sim), 2);
    let pools = &scene.tendons;
    assert_eq!(pools.cylinders.count(), 2);
    assert_eq!(pools.spheres.count(), 3);

    let vertical = pools.cylinders.instance(0).unwrap();
    assert!((vertical.position - Vector3::new(0.0, 1.5, 0.0)).magnitude() < 1e-5);
    assert!(approx(vertical.scale.x, 0.01));
    assert!(approx(vertical.scale.y, 1.0));
    assert!(approx(vertical.scale.z, 0.01));

    let horizontal = pools.cylinders.instance(1).unwrap();
    let axis = horizontal.rotation.rotate_vector(Vector3::unit_y());
    assert!((axis - Vector3::unit_x()).magnitude() < 1e-5);
    assert!((horizontal.position - Vector3::new(0.5, 2.0, 0.0)).magnitude() < 1e-5);

    let joint = pools.spheres.instance(2).unwrap();
    assert!((joint.position - Vector3::new(1.0, 2.0, 0.0)).magnitude() < 1e-5);
    assert!(approx(joint.scale.y, 0.01));
}

#[test]
fn wrap_points_at_the_origin_are_ignored() {
    let (model, sim) = tendon_fixture(&[[0.0, 0.0, 0.0], [0.0, 0.0, 1.0]], 0.02);
    let mut scene = build_scene(&model);

    assert_eq!(sync_tendons(&mut scene, &model, &sim), 0);
    assert_eq!(scene.tendons.cylinders.count(), 0);
    assert_eq!(scene.tendons.spheres.count(), 0);
    // the valid end is still written, just not drawn
    let end = scene.tendons.spheres.instance(1).unwrap();
    assert!((end.position - Vector3::new(0.0, 1.0, 0.0)).magnitude() < 1e-5);
}

#[test]
fn counts_shrink_when_tendons_do() {
    let (model, mut sim) = tendon_fixture(&[[0.0, 0.0, 1.0], [0.0, 0.0, 2.0], [0.0, 0.0, 3.0]], 0.01);
    let mut scene = build_scene(&model);
    assert_eq!(sync_tendons(&mut scene, &model, &sim), 2);

    sim.ten_wrapnum = vec![2];
    assert_eq!(sync_tendons(&mut scene, &model, &sim), 1);
    assert_eq!(scene.tendons.cylinders.count(), 1);
    assert_eq!(scene.tendons.spheres.count(), 2);
}

#[test]
fn segments_of_all_tendons_share_the_pools() {
    let (mut model, mut sim) =
        tendon_fixture(&[[0.0, 0.0, 1.0], [0.0, 0.0, 2.0], [1.0, 0.0, 1.0], [1.0, 0.0, 2.0]], 0.01);
    model.tendon_width = vec![0.01, 0.03];
    sim.ten_wrapadr = vec![0, 2];
    sim.ten_wrapnum = vec![2, 2];
    let mut scene = build_scene(&model);

    assert_eq!(sync_tendons(&mut scene, &model, &sim), 2);
    let second = scene.tendons.cylinders.instance(1).unwrap();
    assert!(approx(second.scale.x, 0.03));
    assert!((second.position - Vector3::new(1.0, 1.5, 0.0)).magnitude() < 1e-5);
}

#[test]
fn pool_overflow_is_clamped() {
    let points: Vec<[f64; 3]> = (0..1100).map(|i| [1.0, 0.0, 1.0 + i as f64 * 0.01]).collect();
    let (model, sim) = tendon_fixture(&points, 0.01);
    let mut scene = build_scene(&model);

    assert_eq!(sync_tendons(&mut scene, &model, &sim), 1099);
    assert_eq!(scene.tendons.cylinders.count(), TENDON_POOL_CAPACITY);
    assert_eq!(scene.tendons.spheres.count(), TENDON_POOL_CAPACITY);
    assert_eq!(scene.tendons.cylinders.slots().len(), TENDON_POOL_CAPACITY);
}
