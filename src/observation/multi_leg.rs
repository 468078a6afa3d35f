use log::debug;

use crate::{
    ancillary::frequency_bands,
    frequency::{dsn_default_turnaround_ratio, FrequencyFunction, TurnaroundRatioFunction},
    light_time::{LightTimeCalculator, LightTimeSolution},
    prelude::{
        AncillaryKey, Error, FrequencyBand, LegEnd, LinkEndType, ObservationAncillarySettings,
    },
};

/// Leg resolved by [MultiLegLink::solve]
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct ResolvedLeg {
    pub solution: LightTimeSolution,
    /// Signal frequency on this leg, when it was needed
    pub frequency_hz: Option<f64>,
}

/// Sequence of legs, from the transmitter to the receiver, resolved outward
/// from the reference link end.
pub(crate) struct MultiLegLink {
    /// One [LightTimeCalculator] per leg, in transmission order
    legs: Vec<LightTimeCalculator>,
    /// Link end types, in transmission order
    ends: Vec<LinkEndType>,
    /// Default retransmission delay at each intermediate end (s)
    retransmission_delays: Vec<f64>,
    /// Frequency emitted by the transmitter, when defined
    transmitter_frequency: Option<FrequencyFunction>,
    /// Turnaround ratio of each intermediate end, if defined
    turnarounds: Vec<Option<TurnaroundRatioFunction>>,
}

impl MultiLegLink {
    pub fn new(legs: Vec<LightTimeCalculator>, ends: Vec<LinkEndType>) -> Self {
        let num_intermediates = ends.len().saturating_sub(2);
        Self {
            legs,
            ends,
            retransmission_delays: vec![0.0; num_intermediates],
            transmitter_frequency: None,
            turnarounds: vec![None; num_intermediates],
        }
    }

    /// Returns [Self] with default retransmission delays
    pub fn with_retransmission_delays(mut self, delays: Vec<f64>) -> Self {
        self.retransmission_delays = delays;
        self
    }

    /// Returns [Self] with transmitted frequency
    pub fn with_transmitter_frequency(mut self, frequency: Option<FrequencyFunction>) -> Self {
        self.transmitter_frequency = frequency;
        self
    }

    /// Returns [Self] with intermediate ends turnaround ratios
    pub fn with_turnarounds(mut self, turnarounds: Vec<Option<TurnaroundRatioFunction>>) -> Self {
        self.turnarounds = turnarounds;
        self
    }

    pub fn legs(&self) -> &[LightTimeCalculator] {
        &self.legs
    }

    pub fn num_legs(&self) -> usize {
        self.legs.len()
    }

    pub fn num_intermediates(&self) -> usize {
        self.ends.len().saturating_sub(2)
    }

    pub fn set_turnaround(&mut self, intermediate: usize, turnaround: TurnaroundRatioFunction) {
        if let Some(slot) = self.turnarounds.get_mut(intermediate) {
            *slot = Some(turnaround);
        }
    }

    /// Turnaround ratio applied by given intermediate end. Reflectors do
    /// not modify the signal frequency, transponders fall back to the
    /// DSN default table.
    pub fn turnaround_ratio(
        &self,
        intermediate: usize,
        band_in: FrequencyBand,
        band_out: FrequencyBand,
        t: f64,
    ) -> Result<f64, Error> {
        match self.ends.get(intermediate + 1) {
            Some(LinkEndType::Reflector(_)) => Ok(1.0),
            _ => match self.turnarounds.get(intermediate) {
                Some(Some(turnaround)) => turnaround(band_in, band_out, t),
                _ => dsn_default_turnaround_ratio(band_in, band_out),
            },
        }
    }

    /// True when at least one leg carries a dispersive correction
    pub fn requires_frequency(&self) -> bool {
        self.legs.iter().any(|leg| leg.requires_frequency())
    }

    /// Per leg signal frequency (Hz) at time t.
    /// Leg 0 frequency is the transmitter's frequency (nominal band
    /// frequency if undefined), each following leg applies the
    /// turnaround ratio of its transmitting end.
    pub fn leg_frequencies(
        &self,
        t: f64,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<Vec<f64>, Error> {
        let bands = frequency_bands(ancillary, self.num_legs())?;

        let mut frequencies = Vec::with_capacity(bands.len());

        let mut frequency = match &self.transmitter_frequency {
            Some(function) => function(t),
            None => bands[0].nominal_frequency_hz(),
        };
        frequencies.push(frequency);

        for (intermediate, (band_in, band_out)) in
            bands.iter().zip(bands.iter().skip(1)).enumerate()
        {
            frequency *= self.turnaround_ratio(intermediate, *band_in, *band_out, t)?;
            frequencies.push(frequency);
        }

        Ok(frequencies)
    }

    /// Retransmission delays to apply: per observation delays take precedence
    pub fn retransmission_delays(
        &self,
        ancillary: Option<&ObservationAncillarySettings>,
    ) -> Result<Vec<f64>, Error> {
        if let Some(ancillary) = ancillary {
            if let Ok(delays) = ancillary.vector(AncillaryKey::RetransmissionDelays) {
                if delays.len() != self.num_intermediates() {
                    return Err(Error::InvalidAncillaryData(
                        AncillaryKey::RetransmissionDelays,
                    ));
                }
                return Ok(delays.to_vec());
            }
        }
        Ok(self.retransmission_delays.clone())
    }

    /// Resolves all legs.
    /// - t: time of the reference end. For intermediate ends, this is the
    ///   time the signal is received by that end.
    /// - reference: position of the reference end, in transmission order
    /// - with_delays: apply retransmission delays
    ///
    /// Returns the resolved legs in transmission order.
    pub fn solve(
        &self,
        t: f64,
        reference: usize,
        ancillary: Option<&ObservationAncillarySettings>,
        with_delays: bool,
    ) -> Result<Vec<ResolvedLeg>, Error> {
        let num_legs = self.num_legs();

        let delays = if with_delays {
            self.retransmission_delays(ancillary)?
        } else {
            vec![0.0; self.num_intermediates()]
        };

        // delay at link end #i (zero for the transmitter and receiver)
        let delay_at = |end: usize| -> f64 {
            if end == 0 || end > delays.len() {
                0.0
            } else {
                delays[end - 1]
            }
        };

        let frequencies = if self.requires_frequency() {
            self.leg_frequencies(t, ancillary)?
                .into_iter()
                .map(Some)
                .collect::<Vec<_>>()
        } else {
            vec![None; num_legs]
        };

        let mut resolved: Vec<Option<ResolvedLeg>> = vec![None; num_legs];

        // downstream legs: known transmission time
        let mut t_tx = t + delay_at(reference);
        for leg in reference..num_legs {
            let solution = self.legs[leg].solve(t_tx, LegEnd::Transmitter, frequencies[leg])?;
            t_tx = solution.reception_time + delay_at(leg + 1);
            resolved[leg] = Some(ResolvedLeg {
                solution,
                frequency_hz: frequencies[leg],
            });
        }

        // upstream legs: known reception time
        let mut t_rx = t;
        for leg in (0..reference).rev() {
            let solution = self.legs[leg].solve(t_rx, LegEnd::Receiver, frequencies[leg])?;
            t_rx = solution.transmission_time - delay_at(leg);
            resolved[leg] = Some(ResolvedLeg {
                solution,
                frequency_hz: frequencies[leg],
            });
        }

        debug!(
            "{:.6}: resolved {} leg(s) from link end #{}",
            t, num_legs, reference
        );

        Ok(resolved.into_iter().flatten().collect())
    }
}
