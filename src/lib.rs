#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

// private modules
mod ancillary;
mod bias;
mod cfg;
mod creator;
mod error;
mod frequency;
mod light_time;
mod link;
mod observation;
mod proper_time;
mod provider;

// public modules
pub mod constants;
pub mod time;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::ancillary::{AncillaryKey, ObservationAncillarySettings};
    pub use crate::bias::{ArcWiseBias, ObservationBias};
    pub use crate::cfg::{
        LightTimeConvergence, LightTimeCorrectionSettings, ObservableSettings,
        ObservationBiasSettings, ObservationModelSettings, OneWayDopplerSettings,
        ProperTimeRateSettings, TwoWayDopplerSettings,
    };
    pub use crate::creator::create_observation_model;
    pub use crate::error::Error;
    pub use crate::frequency::{
        constant_frequency, dsn_default_turnaround_ratio, dsn_turnaround_ratio_function,
        FrequencyBand, FrequencyFunction, TurnaroundRatioFunction,
    };
    pub use crate::light_time::correction::{
        CorrectionRuntime, FirstOrderRelativisticCorrection, IonosphericCorrection,
        LightTimeCorrection, LightTimeCorrectionType, PerturbingBody, TroposphericCorrection,
        UserDefinedCorrection, UserDefinedPartial, UserDefinedValue, ZenithDelay,
    };
    pub use crate::light_time::{LightTimeCalculator, LightTimeSolution};
    pub use crate::link::{LegEnd, LinkEndId, LinkEndType, LinkEnds};
    pub use crate::observation::{
        DopplerMeasuredFrequency, LinkEndData, ModelToggle, NWayRange, ObservableType,
        ObservationModel, ObservationModelKind, OneWayDoppler, OneWayRange, TwoWayDoppler,
    };
    pub use crate::proper_time::{DirectFirstOrderProperTimeRate, ProperTimeRateCalculator};
    pub use crate::provider::{Bodies, Body, StateFunction, StateProvider};
    // re-export
    pub use hifitime::{Epoch, TimeScale};
    pub use nalgebra::{DVector, Vector3, Vector6};
}

// pub export
pub use error::Error;
