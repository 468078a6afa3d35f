use nalgebra::{Vector3, Vector6};

use crate::prelude::{Error, LegEnd};

mod iono;
mod relativistic;
mod tropo;
mod user;

pub use iono::IonosphericCorrection;
pub use relativistic::{FirstOrderRelativisticCorrection, PerturbingBody};
pub use tropo::{TroposphericCorrection, ZenithDelay};
pub use user::{UserDefinedCorrection, UserDefinedPartial, UserDefinedValue};

/// Light time correction identification
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum LightTimeCorrectionType {
    FirstOrderRelativistic,
    Tropospheric,
    Ionospheric,
    UserDefined,
}

impl std::fmt::Display for LightTimeCorrectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::FirstOrderRelativistic => write!(f, "first order relativistic"),
            Self::Tropospheric => write!(f, "tropospheric"),
            Self::Ionospheric => write!(f, "ionospheric"),
            Self::UserDefined => write!(f, "user defined"),
        }
    }
}

/// Geometry and signal conditions of a leg, at the current solver iterate.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CorrectionRuntime {
    /// Transmitter state (m, m/s)
    pub transmitter_state: Vector6<f64>,
    /// Receiver state (m, m/s)
    pub receiver_state: Vector6<f64>,
    /// Transmission time (s)
    pub transmission_time: f64,
    /// Reception time (s)
    pub reception_time: f64,
    /// Signal frequency on this leg (Hz), when known
    pub frequency_hz: Option<f64>,
}

impl CorrectionRuntime {
    pub fn transmitter_position(&self) -> Vector3<f64> {
        self.transmitter_state.fixed_rows::<3>(0).into_owned()
    }

    pub fn receiver_position(&self) -> Vector3<f64> {
        self.receiver_state.fixed_rows::<3>(0).into_owned()
    }

    /// Position of given [LegEnd]
    pub fn position(&self, end: LegEnd) -> Vector3<f64> {
        match end {
            LegEnd::Transmitter => self.transmitter_position(),
            LegEnd::Receiver => self.receiver_position(),
        }
    }

    /// Mid time of the leg, where slowly moving perturbers are evaluated.
    pub fn mid_time(&self) -> f64 {
        0.5 * (self.transmission_time + self.reception_time)
    }
}

/// Additive light time correction (relativistic, media, user defined..).
///
/// Corrections are summed by the light time solver, each evaluated
/// independently at the current iterate: no correction may depend on
/// another's output. Every correction provides both its value and its
/// gradient with respect to either end's position, so observables built
/// on top remain differentiable.
pub trait LightTimeCorrection: Send + Sync {
    /// Identifies this correction
    fn correction_type(&self) -> LightTimeCorrectionType;

    /// Time delay, in seconds.
    fn value(&self, rtm: &CorrectionRuntime) -> Result<f64, Error>;

    /// Gradient of [Self::value] with respect to the position of given
    /// [LegEnd], in s.m⁻¹.
    fn partial_wrt_link_end_position(
        &self,
        rtm: &CorrectionRuntime,
        end: LegEnd,
    ) -> Result<Vector3<f64>, Error>;

    /// True when this correction depends on the signal frequency (dispersive media).
    fn requires_frequency(&self) -> bool {
        false
    }
}

/// Elevation geometry of a ground end, shared by media corrections.
/// The local vertical is approximated by the geocentric radial direction.
#[derive(Debug, Copy, Clone)]
pub(crate) struct Elevation {
    /// sine of elevation angle
    pub sin: f64,
    /// d(sin e) / d(ground position)
    pub d_ground: Vector3<f64>,
    /// d(sin e) / d(space position)
    pub d_space: Vector3<f64>,
}

impl Elevation {
    /// Elevation of `space` seen from `ground` at time `t`, where `center` is the
    /// central body position.
    pub fn new(
        ground: &Vector3<f64>,
        space: &Vector3<f64>,
        center: &Vector3<f64>,
        t: f64,
    ) -> Result<Self, Error> {
        let radial = ground - center;
        let line_of_sight = space - ground;

        let (r, d) = (radial.norm(), line_of_sight.norm());
        if r == 0.0 || d == 0.0 {
            return Err(Error::CoLocatedLinkEnds(t));
        }

        let u = radial / r;
        let n = line_of_sight / d;
        let sin = u.dot(&n);

        // d(u.n)/dr_space = u^T (I - n n^T) / d
        let d_space = (u - n * sin) / d;
        // d(u.n)/dr_ground = n^T (I - u u^T) / r - u^T (I - n n^T) / d
        let d_ground = (n - u * sin) / r - d_space;

        Ok(Self {
            sin,
            d_ground,
            d_space,
        })
    }
}
