//! Per-frame synchronisation between the simulation and the scene.
//!
//! Each frame the simulation is stepped up to wall-clock time, then body and
//! light poses are copied into the scene graph and the tendon pools are
//! refilled from the current wrap points.

use std::f64::consts::TAU;

use cgmath::{InnerSpace, Quaternion, Vector3};
use log::warn;
use rand::Rng;

use crate::{
    builder::BuiltScene,
    config::Params,
    data_structures::instance::Instance,
    physics::{Model, Simulation},
    swizzle,
};

/// Lag after which the simulation clock is snapped to wall time instead of
/// catching up step by step.
pub const MAX_LAG_MS: f64 = 35.0;

/// Wrap points closer to the origin than this are treated as unset.
pub const MIN_WRAP_DISTANCE: f32 = 0.01;

const IDENTITY: Quaternion<f32> = Quaternion {
    s: 1.0,
    v: Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    },
};

/// Simulation time in milliseconds, on the same scale as the frame clock.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimClock {
    pub time_ms: f64,
}

/// A sample from N(0, 1) via the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // (0, 1] keeps the logarithm finite
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}

/// Low-pass filtered noise: every control decays towards zero with time
/// constant `rate` and is perturbed with standard deviation `std`.
pub fn apply_ctrl_noise<R: Rng + ?Sized>(
    ctrl: &mut [f64],
    timestep: f64,
    rate: f64,
    std: f64,
    rng: &mut R,
) {
    let decay = (-timestep / rate.max(1e-10)).exp();
    let scale = std * (1.0 - decay * decay).sqrt();
    for value in ctrl.iter_mut() {
        *value = decay * *value + scale * standard_normal(rng);
    }
}

/// Step `sim` until its clock reaches `now_ms`. Returns the number of steps
/// taken. A paused simulation is only brought up to date with `forward`.
pub fn advance<S, R>(
    sim: &mut S,
    model: &Model,
    params: &mut Params,
    clock: &mut SimClock,
    now_ms: f64,
    rng: &mut R,
) -> usize
where
    S: Simulation + ?Sized,
    R: Rng + ?Sized,
{
    if params.paused {
        sim.forward();
        return 0;
    }

    if now_ms - clock.time_ms > MAX_LAG_MS {
        clock.time_ms = now_ms;
    }
    let step_ms = model.opt_timestep * 1000.0;
    if step_ms <= 0.0 {
        warn!("Model timestep {} cannot advance the simulation", model.opt_timestep);
        return 0;
    }

    let mut steps = 0;
    while clock.time_ms < now_ms {
        if params.ctrl_noise_std > 0.0 {
            apply_ctrl_noise(
                sim.ctrl_mut(),
                model.opt_timestep,
                params.ctrl_noise_rate,
                params.ctrl_noise_std,
                rng,
            );
            mirror_ctrl(model, sim.ctrl(), params);
        }
        sim.step();
        clock.time_ms += step_ms;
        steps += 1;
    }
    steps
}

/// Copy control values into the slider parameters of the actuators that have
/// one.
pub fn mirror_ctrl(model: &Model, ctrl: &[f64], params: &mut Params) {
    for (i, value) in ctrl.iter().enumerate().take(model.nu()) {
        if let Some(slot) = params.actuators.get_mut(model.actuator_name(i).as_ref()) {
            *slot = *value;
        }
    }
}

/// Copy body and light poses from `sim` into the scene and refresh world
/// transforms.
pub fn sync_poses<S: Simulation + ?Sized>(scene: &mut BuiltScene, sim: &S) {
    let xpos = sim.xpos();
    let xquat = sim.xquat();
    for (b, node) in scene.bodies.iter().enumerate() {
        let Some(node) = node else { continue };
        if (b + 1) * 4 > xquat.len() || (b + 1) * 3 > xpos.len() {
            continue;
        }
        if let Some(node) = scene.graph.get_mut(*node) {
            node.local.position = swizzle::position(xpos, b);
            node.local.rotation = swizzle::quaternion(xquat, b);
        }
    }

    let light_xpos = sim.light_xpos();
    let light_xdir = sim.light_xdir();
    for (l, light) in scene.lights.iter_mut().enumerate() {
        if !light.from_model || (l + 1) * 3 > light_xpos.len().min(light_xdir.len()) {
            continue;
        }
        let position = swizzle::position(light_xpos, l);
        light.target = position + swizzle::position(light_xdir, l);
        if let Some(node) = scene.graph.get_mut(light.node) {
            node.local.position = position;
        }
    }

    scene.update_world_transforms();
}

/// Refill the tendon pools from the current wrap points. Returns the number
/// of cylinder segments written.
pub fn sync_tendons<S: Simulation + ?Sized>(scene: &mut BuiltScene, model: &Model, sim: &S) -> usize {
    let wrap_xpos = sim.wrap_xpos();
    let wrap_count = wrap_xpos.len() / 3;
    let pools = &mut scene.tendons;
    let mut segments = 0usize;
    let mut overflow = false;

    for t in 0..model.ntendon() {
        let (Some(&start), Some(&num)) = (sim.ten_wrapadr().get(t), sim.ten_wrapnum().get(t)) else {
            continue;
        };
        let width = model.tendon_width[t] as f32;
        let start = start.max(0) as usize;
        let end = (start + num.max(0) as usize).min(wrap_count);

        for w in start..end.saturating_sub(1) {
            let from = swizzle::position(wrap_xpos, w);
            let to = swizzle::position(wrap_xpos, w + 1);
            let valid_from = from.magnitude() > MIN_WRAP_DISTANCE;
            let valid_to = to.magnitude() > MIN_WRAP_DISTANCE;
            let joint = Vector3::new(width, width, width);

            if valid_from {
                overflow |= !pools
                    .spheres
                    .set_instance(segments, Instance::compose(from, IDENTITY, joint));
            }
            if valid_to {
                overflow |= !pools
                    .spheres
                    .set_instance(segments + 1, Instance::compose(to, IDENTITY, joint));
            }
            if valid_from && valid_to {
                let delta = to - from;
                let length = delta.magnitude();
                let rotation = if length > 0.0 {
                    Quaternion::from_arc(Vector3::unit_y(), delta / length, None)
                } else {
                    IDENTITY
                };
                overflow |= !pools.cylinders.set_instance(
                    segments,
                    Instance::compose((from + to) * 0.5, rotation, Vector3::new(width, length, width)),
                );
                segments += 1;
            }
        }
    }

    if overflow {
        warn!(
            "Tendon wraps exceed the pool capacity of {}, extra segments are not drawn",
            pools.cylinders.capacity()
        );
    }
    pools.cylinders.set_count(segments);
    pools.spheres.set_count(if segments > 0 { segments + 1 } else { 0 });
    segments
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn standard_normal_has_unit_moments() {
        let mut rng = StdRng::seed_from_u64(7);
        let samples: Vec<f64> = (0..20_000).map(|_| standard_normal(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
        assert!(samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn zero_std_noise_only_decays() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctrl = [1.0, -2.0];
        apply_ctrl_noise(&mut ctrl, 0.002, 0.002, 0.0, &mut rng);
        let decay = (-1.0f64).exp();
        assert!((ctrl[0] - decay).abs() < 1e-12);
        assert!((ctrl[1] + 2.0 * decay).abs() < 1e-12);
    }

    #[test]
    fn zero_rate_replaces_controls_with_noise() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut ctrl = [100.0; 4];
        apply_ctrl_noise(&mut ctrl, 0.002, 0.0, 0.5, &mut rng);
        assert!(ctrl.iter().all(|c| c.abs() < 10.0));
    }
}
