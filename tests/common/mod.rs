#![allow(dead_code)]

use nalgebra::Vector3;
use rust_orbprop::astro::{KeplerianElements, Orbit, SpacecraftState};
use rust_orbprop::gravity::ZonalField;

pub const MU: f64 = 3.986004415e14;
pub const RADIUS: f64 = 6_378_136.3;
pub const J2: f64 = 1.082_626_683_553_15e-3;

/// Step of the numerical reference, in seconds.
pub const STEP: f64 = 5.0;

pub fn j2_field() -> ZonalField {
    ZonalField::j2_only(MU, RADIUS, J2)
}

/// Sun-synchronous-ish low orbit.
pub fn leo() -> SpacecraftState {
    let elements = KeplerianElements {
        a: 7.0e6,
        e: 1e-3,
        i: 98f64.to_radians(),
        raan: 0.5,
        arg_perigee: 1.2,
        mean_anomaly: 0.4,
    };
    SpacecraftState::new(Orbit::from_keplerian(elements, 0.0, MU).unwrap())
}

fn acceleration(position: &Vector3<f64>) -> Vector3<f64> {
    let r2 = position.norm_squared();
    let r = r2.sqrt();
    let central = -MU / (r2 * r) * position;

    let factor = 1.5 * J2 * MU * RADIUS * RADIUS / (r2 * r2 * r);
    let z2_r2 = position.z * position.z / r2;
    let j2 = Vector3::new(
        factor * position.x * (5.0 * z2_r2 - 1.0),
        factor * position.y * (5.0 * z2_r2 - 1.0),
        factor * position.z * (5.0 * z2_r2 - 3.0),
    );

    central + j2
}

fn rk4_step(
    position: &Vector3<f64>,
    velocity: &Vector3<f64>,
    dt: f64,
) -> (Vector3<f64>, Vector3<f64>) {
    let (v1, a1) = (*velocity, acceleration(position));
    let (v2, a2) = (
        velocity + a1 * (dt / 2.0),
        acceleration(&(position + v1 * (dt / 2.0))),
    );
    let (v3, a3) = (
        velocity + a2 * (dt / 2.0),
        acceleration(&(position + v2 * (dt / 2.0))),
    );
    let (v4, a4) = (velocity + a3 * dt, acceleration(&(position + v3 * dt)));

    (
        position + (v1 + 2.0 * v2 + 2.0 * v3 + v4) * (dt / 6.0),
        velocity + (a1 + 2.0 * a2 + 2.0 * a3 + a4) * (dt / 6.0),
    )
}

/// Integrates point mass + J2 from `orbit` to each of `epochs`, which must be
/// increasing and not before the orbit's date. Returns positions.
pub fn integrate_j2(orbit: &Orbit, epochs: &[f64]) -> Vec<Vector3<f64>> {
    let mut t = orbit.epoch();
    let mut position = orbit.position();
    let mut velocity = orbit.velocity();

    let mut output = Vec::with_capacity(epochs.len());
    for &target in epochs {
        while t < target {
            let dt = STEP.min(target - t);
            let (p, v) = rk4_step(&position, &velocity, dt);
            position = p;
            velocity = v;
            t += dt;
        }
        output.push(position);
    }
    output
}
