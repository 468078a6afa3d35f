//! Radio frequency bands and transponder turnaround ratios.
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::Error;

/// Frequency of a transmitting station, as a function of time (Hz).
pub type FrequencyFunction = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Turnaround ratio of a transponder, for (uplink band, downlink band) at time t.
pub type TurnaroundRatioFunction =
    Arc<dyn Fn(FrequencyBand, FrequencyBand, f64) -> Result<f64, Error> + Send + Sync>;

/// Deep space radio frequency bands
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FrequencyBand {
    S,
    X,
    Ka,
    Ku,
}

impl FrequencyBand {
    /// Nominal (center) frequency of the deep space allocation, in Hz
    pub fn nominal_frequency_hz(&self) -> f64 {
        match self {
            Self::S => 2.1E9,
            Self::X => 7.18E9,
            Self::Ku => 13.5E9,
            Self::Ka => 34.45E9,
        }
    }

    /// Numerical identifier, as stored in ancillary settings
    pub fn identifier(&self) -> f64 {
        match self {
            Self::S => 0.0,
            Self::X => 1.0,
            Self::Ka => 2.0,
            Self::Ku => 3.0,
        }
    }

    /// Band from its numerical identifier, as stored in ancillary settings
    pub fn from_identifier(id: f64) -> Result<Self, Error> {
        match id.round() as i64 {
            0 if id.fract() == 0.0 => Ok(Self::S),
            1 if id.fract() == 0.0 => Ok(Self::X),
            2 if id.fract() == 0.0 => Ok(Self::Ka),
            3 if id.fract() == 0.0 => Ok(Self::Ku),
            _ => Err(Error::UnknownFrequencyBand(id)),
        }
    }
}

impl std::str::FromStr for FrequencyBand {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        let c = s.trim().to_lowercase();
        match c.as_str() {
            "s" => Ok(Self::S),
            "x" => Ok(Self::X),
            "ka" => Ok(Self::Ka),
            "ku" => Ok(Self::Ku),
            _ => Err(Error::UnknownFrequencyBandName(c)),
        }
    }
}

/// Default DSN transponder turnaround ratios (uplink band, downlink band).
pub fn dsn_default_turnaround_ratio(
    uplink: FrequencyBand,
    downlink: FrequencyBand,
) -> Result<f64, Error> {
    use FrequencyBand::{Ka, S, X};
    match (uplink, downlink) {
        (S, S) => Ok(240.0 / 221.0),
        (S, X) => Ok(880.0 / 221.0),
        (S, Ka) => Ok(3344.0 / 221.0),
        (X, S) => Ok(240.0 / 749.0),
        (X, X) => Ok(880.0 / 749.0),
        (X, Ka) => Ok(3344.0 / 749.0),
        (Ka, S) => Ok(240.0 / 3599.0),
        (Ka, X) => Ok(880.0 / 3599.0),
        (Ka, Ka) => Ok(3344.0 / 3599.0),
        (up, down) => Err(Error::UnsupportedTurnaround(up, down)),
    }
}

/// [TurnaroundRatioFunction] wrapping [dsn_default_turnaround_ratio]
pub fn dsn_turnaround_ratio_function() -> TurnaroundRatioFunction {
    Arc::new(|uplink, downlink, _| dsn_default_turnaround_ratio(uplink, downlink))
}

/// Constant transmitted frequency
pub fn constant_frequency(frequency_hz: f64) -> FrequencyFunction {
    Arc::new(move |_| frequency_hz)
}
