//! Orbital element parameterizations and the conversions between them.
//!
//! All three element sets are plain value types generic over the scalar. The
//! equinoctial set is the hub: it is regular for circular and equatorial
//! orbits, so Cartesian conversions always go through it.

use nalgebra::Vector3;
use simba::scalar::RealField;

use crate::math::anomaly::{eccentric_to_mean, mean_to_eccentric};
use crate::math::lit;

/// Classical Keplerian elements. Angles in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianElements<T = f64> {
    pub a: T,
    pub e: T,
    pub i: T,
    pub raan: T,
    pub arg_perigee: T,
    pub mean_anomaly: T,
}

/// Elements adapted to near-circular orbits.
///
/// `ex = e cos ω`, `ey = e sin ω`, `alpha_m = ω + M`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircularElements<T = f64> {
    pub a: T,
    pub ex: T,
    pub ey: T,
    pub i: T,
    pub raan: T,
    pub alpha_m: T,
}

/// Equinoctial elements.
///
/// `ex = e cos(ω + Ω)`, `ey = e sin(ω + Ω)`, `hx = tan(i/2) cos Ω`,
/// `hy = tan(i/2) sin Ω`, `lambda_m = M + ω + Ω`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquinoctialElements<T = f64> {
    pub a: T,
    pub ex: T,
    pub ey: T,
    pub hx: T,
    pub hy: T,
    pub lambda_m: T,
}

impl<T: RealField + Copy> KeplerianElements<T> {
    pub fn to_circular(&self) -> CircularElements<T> {
        let (sin_w, cos_w) = self.arg_perigee.sin_cos();
        CircularElements {
            a: self.a,
            ex: self.e * cos_w,
            ey: self.e * sin_w,
            i: self.i,
            raan: self.raan,
            alpha_m: self.arg_perigee + self.mean_anomaly,
        }
    }

    pub fn to_equinoctial(&self) -> EquinoctialElements<T> {
        let lon_perigee = self.arg_perigee + self.raan;
        let (sin_p, cos_p) = lon_perigee.sin_cos();
        let (sin_o, cos_o) = self.raan.sin_cos();
        let tan_half_i = (self.i / lit(2.0)).tan();
        EquinoctialElements {
            a: self.a,
            ex: self.e * cos_p,
            ey: self.e * sin_p,
            hx: tan_half_i * cos_o,
            hy: tan_half_i * sin_o,
            lambda_m: lon_perigee + self.mean_anomaly,
        }
    }

    pub fn cast<U: RealField + Copy>(&self) -> KeplerianElements<U> {
        KeplerianElements {
            a: convert(self.a),
            e: convert(self.e),
            i: convert(self.i),
            raan: convert(self.raan),
            arg_perigee: convert(self.arg_perigee),
            mean_anomaly: convert(self.mean_anomaly),
        }
    }
}

impl<T: RealField + Copy> CircularElements<T> {
    pub fn eccentricity(&self) -> T {
        self.ex.hypot(self.ey)
    }

    pub fn to_keplerian(&self) -> KeplerianElements<T> {
        let arg_perigee = self.ey.atan2(self.ex);
        KeplerianElements {
            a: self.a,
            e: self.eccentricity(),
            i: self.i,
            raan: self.raan,
            arg_perigee,
            mean_anomaly: self.alpha_m - arg_perigee,
        }
    }

    pub fn to_equinoctial(&self) -> EquinoctialElements<T> {
        let (sin_o, cos_o) = self.raan.sin_cos();
        let tan_half_i = (self.i / lit(2.0)).tan();
        EquinoctialElements {
            a: self.a,
            ex: self.ex * cos_o - self.ey * sin_o,
            ey: self.ex * sin_o + self.ey * cos_o,
            hx: tan_half_i * cos_o,
            hy: tan_half_i * sin_o,
            lambda_m: self.alpha_m + self.raan,
        }
    }

    pub fn cast<U: RealField + Copy>(&self) -> CircularElements<U> {
        CircularElements {
            a: convert(self.a),
            ex: convert(self.ex),
            ey: convert(self.ey),
            i: convert(self.i),
            raan: convert(self.raan),
            alpha_m: convert(self.alpha_m),
        }
    }
}

impl<T: RealField + Copy> EquinoctialElements<T> {
    pub fn eccentricity(&self) -> T {
        self.ex.hypot(self.ey)
    }

    pub fn inclination(&self) -> T {
        lit::<T>(2.0) * self.hx.hypot(self.hy).atan()
    }

    pub fn raan(&self) -> T {
        self.hy.atan2(self.hx)
    }

    pub fn to_keplerian(&self) -> KeplerianElements<T> {
        let raan = self.raan();
        let lon_perigee = self.ey.atan2(self.ex);
        KeplerianElements {
            a: self.a,
            e: self.eccentricity(),
            i: self.inclination(),
            raan,
            arg_perigee: lon_perigee - raan,
            mean_anomaly: self.lambda_m - lon_perigee,
        }
    }

    pub fn to_circular(&self) -> CircularElements<T> {
        let raan = self.raan();
        let (sin_o, cos_o) = raan.sin_cos();
        CircularElements {
            a: self.a,
            ex: self.ex * cos_o + self.ey * sin_o,
            ey: self.ey * cos_o - self.ex * sin_o,
            i: self.inclination(),
            raan,
            alpha_m: self.lambda_m - raan,
        }
    }

    /// Eccentric longitude, from Kepler's equation written around the
    /// longitude of perigee.
    pub fn eccentric_longitude(&self) -> T {
        let lon_perigee = self.ey.atan2(self.ex);
        let e = self.eccentricity();
        mean_to_eccentric(self.lambda_m - lon_perigee, e) + lon_perigee
    }

    /// Mean motion under a point mass of gravitational parameter `mu`.
    pub fn mean_motion(&self, mu: T) -> T {
        (mu / (self.a * self.a * self.a)).sqrt()
    }

    /// Unit vectors f and g of the equinoctial frame. f and g span the orbital
    /// plane, f is obtained by rotating x through Ω, i, -Ω.
    pub fn frame(&self) -> (Vector3<T>, Vector3<T>) {
        let (hx, hy) = (self.hx, self.hy);
        let hx2 = hx * hx;
        let hy2 = hy * hy;
        let hxhy = hx * hy;
        let fact = T::one() / (T::one() + hx2 + hy2);
        let two = lit::<T>(2.0);
        let f = Vector3::new(
            (T::one() + hx2 - hy2) * fact,
            two * hxhy * fact,
            -two * hy * fact,
        );
        let g = Vector3::new(
            two * hxhy * fact,
            (T::one() - hx2 + hy2) * fact,
            two * hx * fact,
        );
        (f, g)
    }

    pub fn to_cartesian(&self, mu: T) -> (Vector3<T>, Vector3<T>) {
        let (ex, ey, a) = (self.ex, self.ey, self.a);
        let lon_ecc = self.eccentric_longitude();
        let (s, c) = lon_ecc.sin_cos();

        let one = T::one();
        let beta = one / (one + (one - ex * ex - ey * ey).sqrt());
        let exey = ex * ey;
        let x = a * ((one - beta * ey * ey) * c + beta * exey * s - ex);
        let y = a * ((one - beta * ex * ex) * s + beta * exey * c - ey);

        let ex_c_ey_s = ex * c + ey * s;
        let factor = (mu / a).sqrt() / (one - ex_c_ey_s);
        let x_dot = factor * (-s + beta * ey * ex_c_ey_s);
        let y_dot = factor * (c - beta * ex * ex_c_ey_s);

        let (f, g) = self.frame();
        (f * x + g * y, f * x_dot + g * y_dot)
    }

    pub fn from_cartesian(position: &Vector3<T>, velocity: &Vector3<T>, mu: T) -> Self {
        let r = position.norm();
        let v2 = velocity.norm_squared();
        let a = r * mu / (lit::<T>(2.0) * mu - r * v2);

        let momentum = position.cross(velocity);
        let w = momentum.normalize();
        let d = T::one() / (T::one() + w.z);
        let hx = -w.y * d;
        let hy = w.x * d;

        let partial = EquinoctialElements {
            a,
            ex: T::zero(),
            ey: T::zero(),
            hx,
            hy,
            lambda_m: T::zero(),
        };
        let (f, g) = partial.frame();

        let e_vec = velocity.cross(&momentum) / mu - position / r;
        let ex = e_vec.dot(&f);
        let ey = e_vec.dot(&g);

        let lon_true = position.dot(&g).atan2(position.dot(&f));
        let lon_ecc = true_to_eccentric_longitude(lon_true, ex, ey);
        let lambda_m = lon_ecc - ex * lon_ecc.sin() + ey * lon_ecc.cos();

        EquinoctialElements {
            a,
            ex,
            ey,
            hx,
            hy,
            lambda_m,
        }
    }

    pub fn cast<U: RealField + Copy>(&self) -> EquinoctialElements<U> {
        EquinoctialElements {
            a: convert(self.a),
            ex: convert(self.ex),
            ey: convert(self.ey),
            hx: convert(self.hx),
            hy: convert(self.hy),
            lambda_m: convert(self.lambda_m),
        }
    }
}

/// Converts between two real fields, going through `f64`.
fn convert<T: RealField + Copy, U: RealField + Copy>(x: T) -> U {
    let wide: f64 = nalgebra::try_convert(x).unwrap_or(f64::NAN);
    lit(wide)
}

fn true_to_eccentric_longitude<T: RealField + Copy>(lon_true: T, ex: T, ey: T) -> T {
    let epsilon = (T::one() - ex * ex - ey * ey).sqrt();
    let (s, c) = lon_true.sin_cos();
    let num = ey * c - ex * s;
    let den = epsilon + T::one() + ex * c + ey * s;
    lon_true + lit::<T>(2.0) * (num / den).atan()
}

/// Mean longitude from eccentric longitude (Kepler's equation in equinoctial form).
pub fn eccentric_to_mean_longitude<T: RealField + Copy>(lon_ecc: T, ex: T, ey: T) -> T {
    let lon_perigee = ey.atan2(ex);
    eccentric_to_mean(lon_ecc - lon_perigee, ex.hypot(ey)) + lon_perigee
}
