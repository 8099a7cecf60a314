use nalgebra::{Rotation3, Vector3};

use std::f64::consts::PI;

const FRAME_TOLERANCE: f64 = 1e-20;

/// Vector rejection of u from v, i.e. the part of u orthogonal to v. v must be
/// non-zero.
pub fn reject(u: &Vector3<f64>, v: &Vector3<f64>) -> Vector3<f64> {
    u - u.dot(v) * v / v.norm_squared()
}

/// Rotation R sending the z and x axes along `new_z` and `new_x`, which are
/// assumed orthogonal. Neither needs to be normalized.
///
/// Either input may be degenerate (norm below `tolerance`), e.g. the angular
/// momentum of a purely radial trajectory. In that case:
/// - if only new_z is small:
///   - R(z) is the unit vector closest to the z-axis that is still
///     perpendicular to R(x) = new_x
///   - when that is undefined (new_x along z), R(z) = +y
/// - if only new_x is small:
///   - R(x) is the unit vector closest to the x-axis that is still
///     perpendicular to R(z) = new_z
///   - when that is undefined (new_z along x), R(x) = -y
/// - if both are small, R is the identity
///
/// The fallbacks keep the result right-handed, so R(y) = R(z) x R(x) in
/// every branch.
pub fn always_find_rotation(
    new_z: &Vector3<f64>,
    new_x: &Vector3<f64>,
    tolerance: f64,
) -> Rotation3<f64> {
    let z_large_enough = new_z.norm() >= tolerance;
    let x_large_enough = new_x.norm() >= tolerance;

    let (new_z, new_x) = match (z_large_enough, x_large_enough) {
        // Nothing to repair
        (true, true) => (*new_z, *new_x),
        // z is too small
        (false, true) => {
            // Removing the new_x component from the z-axis leaves the most
            // z-like direction orthogonal to new_x. It vanishes when new_x is
            // itself along z, and then +y is as good as anything.
            let mut best_new_z = reject(&Vector3::z(), new_x);
            if best_new_z.norm() < tolerance {
                best_new_z = Vector3::y();
            };
            (best_new_z, *new_x)
        }
        // x is too small
        (true, false) => {
            // Mirror of the branch above with the roles of z and x swapped
            let mut best_new_x = reject(&Vector3::x(), new_z);
            if best_new_x.norm() < tolerance {
                best_new_x = -Vector3::y();
            };
            (*new_z, best_new_x)
        }
        // No information at all, so don't rotate
        (false, false) => return Rotation3::identity(),
    };

    // face_towards wants the images of z and y rather than z and x. Feeding it
    // new_x as the y image and then prepending a quarter turn about z (which
    // takes x to y) gives the rotation we want. Renormalize to scrub the
    // round-off from composing the two.
    let mut rotation = Rotation3::face_towards(&new_z, &new_x);
    rotation *= Rotation3::from_axis_angle(&Vector3::z_axis(), PI / 2.0);
    rotation.renormalize();
    rotation
}

/// Rotation from the radial/along-track/normal frame of a trajectory to the
/// inertial frame: x is radial, z is along the angular momentum and y
/// completes the triad (roughly along the velocity).
pub fn local_orbital_frame(position: &Vector3<f64>, velocity: &Vector3<f64>) -> Rotation3<f64> {
    always_find_rotation(&position.cross(velocity), position, FRAME_TOLERANCE)
}
