use thiserror::Error;

use crate::prelude::{AncillaryKey, FrequencyBand, LinkEndType, ObservableType};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The light-time iteration did not converge within the configured budget.
    /// This denotes non-physical inputs (non causal or superluminal states) and
    /// is never retried internally.
    #[error("light time did not converge: {iterations} iterations, last update {residual_s:.3E}s")]
    LightTimeNonConvergence { iterations: usize, residual_s: f64 },

    /// Both link ends of a leg share the same position: line of sight is undefined.
    #[error("physical non sense: link ends are co-located at t={0}")]
    CoLocatedLinkEnds(f64),

    /// [LinkEnds] must define exactly one transmitter.
    #[error("link ends: missing transmitter")]
    MissingTransmitter,

    /// [LinkEnds] must define exactly one receiver.
    #[error("link ends: missing receiver")]
    MissingReceiver,

    /// Reflectors must be numbered 1, 2, .. without gaps.
    #[error("link ends: reflector numbering is not contiguous (found {0:?})")]
    NonContiguousReflectors(LinkEndType),

    /// Link ends topology does not match the requested observable.
    #[error("{observable} requires {expected}")]
    TopologyMismatch {
        observable: ObservableType,
        expected: &'static str,
    },

    /// Reference link end is not part of this observable's topology.
    #[error("{0} does not support reference link end {1:?}")]
    UnsupportedReferenceLinkEnd(ObservableType, LinkEndType),

    /// Per observation metadata is required but was not provided.
    #[error("missing ancillary data: {0:?}")]
    MissingAncillaryData(AncillaryKey),

    /// Per observation metadata was provided, but is not consistent with the link.
    #[error("invalid ancillary data: {0:?}")]
    InvalidAncillaryData(AncillaryKey),

    /// Requested runtime toggle does not exist for this observable.
    #[error("{0} does not support this runtime setting")]
    UnsupportedToggle(ObservableType),

    #[error("state provider: unknown link end {0}")]
    UnknownLinkEnd(String),

    #[error("state provider: unknown body \"{0}\"")]
    UnknownBody(String),

    #[error("state provider: undefined gravitational parameter for \"{0}\"")]
    MissingGravitationalParameter(String),

    #[error("state provider: no transmitted frequency for {0}")]
    MissingTransmittingFrequency(String),

    #[error("unsupported turnaround: {0:?} to {1:?}")]
    UnsupportedTurnaround(FrequencyBand, FrequencyBand),

    #[error("unknown frequency band identifier {0}")]
    UnknownFrequencyBand(f64),

    #[error("unknown frequency band \"{0}\"")]
    UnknownFrequencyBandName(String),

    /// Media corrections need a ground end located on their central body.
    #[error("{0} correction: no ground link end on \"{1}\"")]
    NoGroundLinkEnd(&'static str, String),

    #[error("bias size {found} does not match observable size {expected}")]
    InvalidBiasSize { expected: usize, found: usize },

    #[error("arc-wise bias: arc start times must be sorted and match values")]
    InvalidBiasArcs,

    #[error("no bias arc defined at t={0}")]
    OutOfBiasArcs(f64),

    #[error("no time or state for link end #{0}")]
    MissingLinkEndData(usize),
}
