use crate::astro::KeplerianElements;
use crate::gravity::ZonalField;

// Earth-like field used throughout the unit tests
pub const TEST_MU: f64 = 3.9860047e14;
pub const TEST_RADIUS: f64 = 6.378137e6;
pub const TEST_JN: [f64; 5] = [1.08263e-3, -2.54e-6, -1.62e-6, -2.3e-7, 5.5e-7];

pub fn test_field() -> ZonalField {
    ZonalField::new(TEST_MU, TEST_RADIUS, TEST_JN)
}

/// Near-circular, slightly retrograde low orbit.
pub fn leo_elements() -> KeplerianElements {
    KeplerianElements {
        a: 7.19e6,
        e: 5e-4,
        i: 1.71,
        raan: 3.1,
        arg_perigee: 0.8,
        mean_anomaly: 0.3,
    }
}

/// Same as [leo_elements], but with a small eccentricity Eckstein-Hechler
/// still accepts and far enough from zero that the perigee is well defined.
pub fn eccentric_leo_elements() -> KeplerianElements {
    KeplerianElements {
        e: 0.05,
        a: 7.5e6,
        ..leo_elements()
    }
}
