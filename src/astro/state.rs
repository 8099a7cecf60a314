use nalgebra::Vector3;

/// Inertial position and velocity, in meters and meters per second.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CartesianState {
    position: Vector3<f64>,
    velocity: Vector3<f64>,
}

impl CartesianState {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        CartesianState { position, velocity }
    }

    pub fn position(&self) -> Vector3<f64> {
        self.position
    }

    pub fn velocity(&self) -> Vector3<f64> {
        self.velocity
    }

    pub fn angular_momentum(&self) -> Vector3<f64> {
        self.position.cross(&self.velocity)
    }

    /// Specific orbital energy about a body with gravitational parameter `mu`.
    pub fn energy(&self, mu: f64) -> f64 {
        // KE = 1/2 v^2, PE = - mu/r
        self.velocity.norm_squared() / 2.0 - mu / self.position.norm()
    }

    pub fn is_finite(&self) -> bool {
        self.position.iter().chain(self.velocity.iter()).all(|x| x.is_finite())
    }
}
