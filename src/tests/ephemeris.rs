//! Analytical ephemerides: static Sun, circular planets, rotating ground
//! stations and Keplerian spacecraft.
use std::sync::Arc;

use crate::{
    constants::{EARTH_EQUATORIAL_RADIUS_M, EARTH_GRAVITATION_MU_M3_S2, SUN_GRAVITATION_MU_M3_S2},
    prelude::{constant_frequency, Bodies, Body, LinkEndId, StateFunction, Vector6},
};

pub const AU_M: f64 = 1.495978707E11;
pub const MARS_GRAVITATION_MU_M3_S2: f64 = 4.282837E13;
pub const EARTH_ROTATION_RAD_S: f64 = 7.2921159E-5;

/// X band uplink frequency of DSS-43
pub const DSS43_UPLINK_HZ: f64 = 7.16E9;

/// Keplerian elements (angles in degrees)
#[derive(Debug, Copy, Clone)]
pub struct Kepler {
    pub a: f64,
    pub e: f64,
    pub i: f64,
    pub raan: f64,
    pub argp: f64,
    pub m0: f64,
    pub mu: f64,
}

impl Kepler {
    /// State relative to the central body at time t
    pub fn state(&self, t: f64) -> Vector6<f64> {
        let (i, raan, argp, m0) = (
            self.i.to_radians(),
            self.raan.to_radians(),
            self.argp.to_radians(),
            self.m0.to_radians(),
        );

        let n = (self.mu / self.a.powi(3)).sqrt();
        let m = m0 + n * t;

        let mut ea = m;
        for _ in 0..50 {
            let de = (ea - self.e * ea.sin() - m) / (1.0 - self.e * ea.cos());
            ea -= de;
            if de.abs() < 1.0E-15 {
                break;
            }
        }

        let b = self.a * (1.0 - self.e * self.e).sqrt();
        let ea_dot = n / (1.0 - self.e * ea.cos());

        let (px, py) = (self.a * (ea.cos() - self.e), b * ea.sin());
        let (vx, vy) = (-self.a * ea.sin() * ea_dot, b * ea.cos() * ea_dot);

        let (co, so) = (raan.cos(), raan.sin());
        let (cw, sw) = (argp.cos(), argp.sin());
        let (ci, si) = (i.cos(), i.sin());

        let r11 = co * cw - so * sw * ci;
        let r12 = -co * sw - so * cw * ci;
        let r21 = so * cw + co * sw * ci;
        let r22 = -so * sw + co * cw * ci;
        let r31 = sw * si;
        let r32 = cw * si;

        Vector6::new(
            r11 * px + r12 * py,
            r21 * px + r22 * py,
            r31 * px + r32 * py,
            r11 * vx + r12 * vy,
            r21 * vx + r22 * vy,
            r31 * vx + r32 * vy,
        )
    }
}

/// GPS like orbit
pub const GPS: Kepler = Kepler {
    a: 26560.0E3,
    e: 0.02,
    i: 55.0,
    raan: 30.0,
    argp: 40.0,
    m0: 10.0,
    mu: EARTH_GRAVITATION_MU_M3_S2,
};

/// Elliptical Mars orbiter
pub const MEX: Kepler = Kepler {
    a: 9352.0E3,
    e: 0.57,
    i: 86.6,
    raan: 120.0,
    argp: 10.0,
    m0: 45.0,
    mu: MARS_GRAVITATION_MU_M3_S2,
};

/// Circular heliocentric orbit in the ecliptic
pub fn circular(radius: f64, phase: f64) -> StateFunction {
    let n = (SUN_GRAVITATION_MU_M3_S2 / radius.powi(3)).sqrt();
    Arc::new(move |t: f64| {
        let th = phase + n * t;
        Vector6::new(
            radius * th.cos(),
            radius * th.sin(),
            0.0,
            -radius * n * th.sin(),
            radius * n * th.cos(),
            0.0,
        )
    })
}

/// Ground station on a body rotating about the z axis, relative to its center
pub fn ground_station(lat_deg: f64, lon_deg: f64, t: f64) -> Vector6<f64> {
    let (lat, lon) = (lat_deg.to_radians(), lon_deg.to_radians());
    let th = lon + EARTH_ROTATION_RAD_S * t;
    let rc = EARTH_EQUATORIAL_RADIUS_M * lat.cos();
    Vector6::new(
        rc * th.cos(),
        rc * th.sin(),
        EARTH_EQUATORIAL_RADIUS_M * lat.sin(),
        -EARTH_ROTATION_RAD_S * rc * th.sin(),
        EARTH_ROTATION_RAD_S * rc * th.cos(),
        0.0,
    )
}

/// Offsets a relative state function by its central body's
fn attached(
    center: StateFunction,
    relative: impl Fn(f64) -> Vector6<f64> + Send + Sync + 'static,
) -> StateFunction {
    Arc::new(move |t: f64| center(t) + relative(t))
}

fn stations(bodies: &mut Bodies, earth: &StateFunction) {
    for (name, lat, lon) in [
        ("DSS-43", -35.4023, 148.9813),
        ("DSS-63", 40.4313, -4.2480),
        ("DSS-14", 35.4259, -116.8895),
    ] {
        bodies.insert_reference_point(
            "Earth",
            name,
            attached(earth.clone(), move |t: f64| ground_station(lat, lon, t)),
        );
    }

    bodies.set_transmitting_frequency(
        &LinkEndId::station("Earth", "DSS-43"),
        constant_frequency(DSS43_UPLINK_HZ),
    );
}

/// Earth centered scenario: static Earth, ground stations and a GPS like
/// spacecraft.
pub fn geocentric() -> Bodies {
    let mut bodies = Bodies::default();

    let earth: StateFunction = Arc::new(|_: f64| Vector6::zeros());
    bodies.insert(
        "Earth",
        Body::new(earth.clone()).with_gravitational_parameter(EARTH_GRAVITATION_MU_M3_S2),
    );
    stations(&mut bodies, &earth);

    bodies.insert("GPS", Body::new(attached(earth, |t: f64| GPS.state(t))));
    bodies
}

/// Sun centered scenario: Earth (with ground stations and a GPS like
/// spacecraft) and Mars on circular orbits, Mars orbiter.
pub fn heliocentric() -> Bodies {
    let mut bodies = Bodies::default();

    bodies.insert(
        "Sun",
        Body::new(Arc::new(|_: f64| Vector6::zeros()))
            .with_gravitational_parameter(SUN_GRAVITATION_MU_M3_S2),
    );

    let earth = circular(AU_M, 0.3);
    bodies.insert(
        "Earth",
        Body::new(earth.clone()).with_gravitational_parameter(EARTH_GRAVITATION_MU_M3_S2),
    );
    stations(&mut bodies, &earth);

    bodies.insert("GPS", Body::new(attached(earth, |t: f64| GPS.state(t))));

    let mars = circular(1.523679 * AU_M, 2.0);
    bodies.insert(
        "Mars",
        Body::new(mars.clone()).with_gravitational_parameter(MARS_GRAVITATION_MU_M3_S2),
    );

    bodies.insert("MEX", Body::new(attached(mars, |t: f64| MEX.state(t))));
    bodies
}
