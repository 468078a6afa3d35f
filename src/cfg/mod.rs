//! Observation model settings
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    constants::EARTH_EQUATORIAL_RADIUS_M,
    prelude::{LinkEndType, LinkEnds, ObservableType, UserDefinedCorrection, ZenithDelay},
};

fn default_tolerance() -> f64 {
    1.0E-12
}

fn default_max_iterations() -> usize {
    50
}

fn default_ppn_gamma() -> f64 {
    1.0
}

fn default_shell_height() -> f64 {
    350.0E3
}

fn default_body_radius() -> f64 {
    EARTH_EQUATORIAL_RADIUS_M
}

fn default_normalization() -> bool {
    false
}

/// Light time solver convergence criteria.
/// Non convergence within `max_iterations` is reported as an error, which
/// denotes non physical link end states.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LightTimeConvergence {
    /// Convergence is declared once the light time update is below this
    /// threshold, in seconds. The threshold never goes below 10 ulp
    /// of the light time itself. Default: 1E-12s.
    #[cfg_attr(feature = "serde", serde(default = "default_tolerance"))]
    pub tolerance_s: f64,
    /// Maximal number of iterations. Default: 50.
    #[cfg_attr(feature = "serde", serde(default = "default_max_iterations"))]
    pub max_iterations: usize,
}

impl Default for LightTimeConvergence {
    fn default() -> Self {
        Self {
            tolerance_s: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }
}

/// Light time correction to apply to every leg of an observable
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LightTimeCorrectionSettings {
    /// Shapiro delay, caused by each perturbing body
    FirstOrderRelativistic {
        perturbing_bodies: Vec<String>,
        /// PPN parameter γ, 1 in general relativity
        #[cfg_attr(feature = "serde", serde(default = "default_ppn_gamma"))]
        ppn_gamma: f64,
    },
    /// Tropospheric delay, applied on legs with one end on `central_body`
    Tropospheric {
        central_body: String,
        zenith: ZenithDelay,
    },
    /// Ionospheric delay (single layer), applied on legs with one end on
    /// `central_body`. Requires the signal frequency.
    Ionospheric {
        central_body: String,
        /// Vertical total electron content, in TECu
        vertical_tec_u: f64,
        /// Shell height (m), default 350 km
        #[cfg_attr(feature = "serde", serde(default = "default_shell_height"))]
        shell_height_m: f64,
        /// Central body radius (m), default Earth's
        #[cfg_attr(feature = "serde", serde(default = "default_body_radius"))]
        body_radius_m: f64,
    },
    /// Arbitrary closure based correction
    #[cfg_attr(feature = "serde", serde(skip))]
    UserDefined(UserDefinedCorrection),
}

impl std::fmt::Debug for LightTimeCorrectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::FirstOrderRelativistic {
                perturbing_bodies,
                ppn_gamma,
            } => write!(
                f,
                "FirstOrderRelativistic({:?}, gamma={})",
                perturbing_bodies, ppn_gamma
            ),
            Self::Tropospheric {
                central_body,
                zenith,
            } => write!(f, "Tropospheric({}, {:?})", central_body, zenith),
            Self::Ionospheric {
                central_body,
                vertical_tec_u,
                ..
            } => write!(f, "Ionospheric({}, {} TECu)", central_body, vertical_tec_u),
            Self::UserDefined(_) => write!(f, "UserDefined"),
        }
    }
}

/// Clock model of a link end
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ProperTimeRateSettings {
    /// First order rate in the local frame of `central_body`
    DirectFirstOrder { central_body: String },
}

/// Observation bias tree
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObservationBiasSettings {
    /// Constant bias, either additive (observable unit)
    /// or relative (scale factor)
    Constant { value: Vec<f64>, relative: bool },
    /// Piecewise constant bias, evaluated at the time of `reference_end`.
    /// Each arc runs from its start time to the next arc's start time,
    /// the last arc never ends.
    ArcWiseConstant {
        arc_start_times: Vec<f64>,
        values: Vec<Vec<f64>>,
        relative: bool,
        reference_end: LinkEndType,
    },
    /// Additive bias `drift * (t - reference_epoch)`, t being the time
    /// of `reference_end`
    ConstantTimeDrift {
        drift: Vec<f64>,
        reference_epoch: f64,
        reference_end: LinkEndType,
    },
    /// Superimposed biases
    Multiple(Vec<ObservationBiasSettings>),
}

/// One way Doppler options
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct OneWayDopplerSettings {
    /// Transmitting clock model
    #[cfg_attr(feature = "serde", serde(default))]
    pub transmitter_proper_time: Option<ProperTimeRateSettings>,
    /// Receiving clock model
    #[cfg_attr(feature = "serde", serde(default))]
    pub receiver_proper_time: Option<ProperTimeRateSettings>,
    /// Express the Doppler as a fraction rather than a velocity (m/s)
    #[cfg_attr(feature = "serde", serde(default = "default_normalization"))]
    pub normalize_with_speed_of_light: bool,
}

/// Two way Doppler options
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TwoWayDopplerSettings {
    /// Uplink clock models. Normalization of each leg is ignored.
    #[cfg_attr(feature = "serde", serde(default))]
    pub uplink: OneWayDopplerSettings,
    /// Downlink clock models. Normalization of each leg is ignored.
    #[cfg_attr(feature = "serde", serde(default))]
    pub downlink: OneWayDopplerSettings,
    /// Express the Doppler as a fraction rather than a velocity (m/s)
    #[cfg_attr(feature = "serde", serde(default = "default_normalization"))]
    pub normalize_with_speed_of_light: bool,
}

/// Observable to model, with its specific options
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ObservableSettings {
    OneWayRange,
    OneWayDoppler(OneWayDopplerSettings),
    TwoWayDoppler(TwoWayDopplerSettings),
    /// Range over any number of legs. Retransmission delays (s) at each
    /// intermediate end may be defined here, or per observation through
    /// the ancillary settings.
    NWayRange {
        #[cfg_attr(feature = "serde", serde(default))]
        retransmission_delays: Vec<f64>,
    },
    DopplerMeasuredFrequency,
}

impl ObservableSettings {
    pub fn observable_type(&self) -> ObservableType {
        match self {
            Self::OneWayRange => ObservableType::OneWayRange,
            Self::OneWayDoppler(_) => ObservableType::OneWayDoppler,
            Self::TwoWayDoppler(_) => ObservableType::TwoWayDoppler,
            Self::NWayRange { .. } => ObservableType::NWayRange,
            Self::DopplerMeasuredFrequency => ObservableType::DopplerMeasuredFrequency,
        }
    }
}

/// Declarative description of an observation model
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObservationModelSettings {
    /// Observable and its options
    pub observable: ObservableSettings,
    /// Participants
    pub link_ends: LinkEnds,
    /// Light time corrections, applied to every leg
    #[cfg_attr(feature = "serde", serde(default))]
    pub light_time_corrections: Vec<LightTimeCorrectionSettings>,
    /// Bias
    #[cfg_attr(feature = "serde", serde(default))]
    pub bias: Option<ObservationBiasSettings>,
    /// Light time solver
    #[cfg_attr(feature = "serde", serde(default))]
    pub convergence: LightTimeConvergence,
}

impl ObservationModelSettings {
    /// Builds new [ObservationModelSettings] without corrections nor bias
    pub fn new(observable: ObservableSettings, link_ends: LinkEnds) -> Self {
        Self {
            observable,
            link_ends,
            light_time_corrections: Vec::new(),
            bias: None,
            convergence: LightTimeConvergence::default(),
        }
    }

    /// Copies and returns [Self] with an additional light time correction
    pub fn with_light_time_correction(&self, correction: LightTimeCorrectionSettings) -> Self {
        let mut s = self.clone();
        s.light_time_corrections.push(correction);
        s
    }

    /// Copies and returns [Self] with bias
    pub fn with_bias(&self, bias: ObservationBiasSettings) -> Self {
        let mut s = self.clone();
        s.bias = Some(bias);
        s
    }

    /// Copies and returns [Self] with custom convergence criteria
    pub fn with_convergence(&self, convergence: LightTimeConvergence) -> Self {
        let mut s = self.clone();
        s.convergence = convergence;
        s
    }
}
