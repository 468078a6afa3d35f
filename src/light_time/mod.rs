//! Light time solver
use log::{debug, error, trace};
use nalgebra::{Vector3, Vector6};

use crate::{
    constants::SPEED_OF_LIGHT_M_S,
    prelude::{Error, LegEnd, LightTimeConvergence, StateFunction},
};

pub mod correction;

use correction::{CorrectionRuntime, LightTimeCorrection};

/// [LightTimeSolution] is the outcome of one leg resolution.
/// Every call to [LightTimeCalculator::solve] returns a fresh record.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LightTimeSolution {
    /// Total light time (geometric + corrections), in seconds
    pub light_time: f64,
    /// Transmission time, in seconds past J2000 (TDB)
    pub transmission_time: f64,
    /// Reception time, in seconds past J2000 (TDB)
    pub reception_time: f64,
    /// Transmitter state at transmission time
    pub transmitter_state: Vector6<f64>,
    /// Receiver state at reception time
    pub receiver_state: Vector6<f64>,
    /// Number of iterations it took to converge
    pub iterations: usize,
}

impl LightTimeSolution {
    /// [CorrectionRuntime] of this solution
    pub fn runtime(&self, frequency_hz: Option<f64>) -> CorrectionRuntime {
        CorrectionRuntime {
            transmitter_state: self.transmitter_state,
            receiver_state: self.receiver_state,
            transmission_time: self.transmission_time,
            reception_time: self.reception_time,
            frequency_hz,
        }
    }

    /// Transmitter to receiver vector (m)
    pub fn line_of_sight(&self) -> Vector3<f64> {
        self.receiver_state.fixed_rows::<3>(0) - self.transmitter_state.fixed_rows::<3>(0)
    }

    /// Time of given [LegEnd]
    pub fn time(&self, end: LegEnd) -> f64 {
        match end {
            LegEnd::Transmitter => self.transmission_time,
            LegEnd::Receiver => self.reception_time,
        }
    }

    /// State of given [LegEnd]
    pub fn state(&self, end: LegEnd) -> Vector6<f64> {
        match end {
            LegEnd::Transmitter => self.transmitter_state,
            LegEnd::Receiver => self.receiver_state,
        }
    }
}

/// [LightTimeCalculator] resolves the signal propagation time between two
/// moving link ends, iterating
///
/// tau(k+1) = |r_rx(t_rx(k)) - r_tx(t_tx(k))| / c + Σ correction(k)
///
/// where one end's time is held fixed (the reference time) and the other one
/// is shifted by the current light time estimate.
pub struct LightTimeCalculator {
    transmitter: StateFunction,
    receiver: StateFunction,
    corrections: Vec<Box<dyn LightTimeCorrection>>,
    convergence: LightTimeConvergence,
}

impl LightTimeCalculator {
    /// Creates a new [LightTimeCalculator] without corrections.
    pub fn new(transmitter: StateFunction, receiver: StateFunction) -> Self {
        Self {
            transmitter,
            receiver,
            corrections: Vec::new(),
            convergence: LightTimeConvergence::default(),
        }
    }

    /// Returns [Self] with given correction stack
    pub fn with_corrections(mut self, corrections: Vec<Box<dyn LightTimeCorrection>>) -> Self {
        self.corrections = corrections;
        self
    }

    /// Returns [Self] with customized [LightTimeConvergence] criteria
    pub fn with_convergence(mut self, convergence: LightTimeConvergence) -> Self {
        self.convergence = convergence;
        self
    }

    pub fn corrections(&self) -> &[Box<dyn LightTimeCorrection>] {
        &self.corrections
    }

    pub fn convergence(&self) -> &LightTimeConvergence {
        &self.convergence
    }

    /// True when at least one correction is dispersive
    pub fn requires_frequency(&self) -> bool {
        self.corrections.iter().any(|c| c.requires_frequency())
    }

    /// Transmitter state at given time
    pub fn transmitter_state(&self, t: f64) -> Vector6<f64> {
        (self.transmitter)(t)
    }

    /// Receiver state at given time
    pub fn receiver_state(&self, t: f64) -> Vector6<f64> {
        (self.receiver)(t)
    }

    /// Sum of all corrections (s)
    fn total_correction(&self, rtm: &CorrectionRuntime) -> Result<f64, Error> {
        let mut total = 0.0;
        for correction in self.corrections.iter() {
            total += correction.value(rtm)?;
        }
        Ok(total)
    }

    /// Builds the [CorrectionRuntime] for a light time estimate
    fn runtime(
        &self,
        reference_time: f64,
        fixed_end: LegEnd,
        fixed_state: &Vector6<f64>,
        tau: f64,
        frequency_hz: Option<f64>,
    ) -> CorrectionRuntime {
        match fixed_end {
            LegEnd::Transmitter => {
                let reception_time = reference_time + tau;
                CorrectionRuntime {
                    transmitter_state: *fixed_state,
                    receiver_state: (self.receiver)(reception_time),
                    transmission_time: reference_time,
                    reception_time,
                    frequency_hz,
                }
            },
            LegEnd::Receiver => {
                let transmission_time = reference_time - tau;
                CorrectionRuntime {
                    transmitter_state: (self.transmitter)(transmission_time),
                    receiver_state: *fixed_state,
                    transmission_time,
                    reception_time: reference_time,
                    frequency_hz,
                }
            },
        }
    }

    /// Resolves this leg.
    /// - reference_time: time of the fixed end, in seconds past J2000 (TDB)
    /// - fixed_end: [LegEnd::Transmitter] when the transmission time is known,
    ///   [LegEnd::Receiver] when the reception time is known
    /// - frequency_hz: signal frequency, only needed by dispersive corrections
    pub fn solve(
        &self,
        reference_time: f64,
        fixed_end: LegEnd,
        frequency_hz: Option<f64>,
    ) -> Result<LightTimeSolution, Error> {
        let fixed_state = match fixed_end {
            LegEnd::Transmitter => (self.transmitter)(reference_time),
            LegEnd::Receiver => (self.receiver)(reference_time),
        };

        // geometric initial guess, both ends at reference time
        let rtm = self.runtime(reference_time, fixed_end, &fixed_state, 0.0, frequency_hz);
        let mut tau = (rtm.receiver_position() - rtm.transmitter_position()).norm()
            / SPEED_OF_LIGHT_M_S;

        let mut residual = f64::INFINITY;

        for iteration in 1..=self.convergence.max_iterations {
            let rtm = self.runtime(reference_time, fixed_end, &fixed_state, tau, frequency_hz);

            let geometric =
                (rtm.receiver_position() - rtm.transmitter_position()).norm() / SPEED_OF_LIGHT_M_S;

            let corrections = self.total_correction(&rtm)?;
            let updated = geometric + corrections;

            residual = (updated - tau).abs();
            tau = updated;

            trace!(
                "{:.6}: light time iteration #{} tau={:.12E}s residual={:.3E}s",
                reference_time,
                iteration,
                tau,
                residual
            );

            let threshold = self
                .convergence
                .tolerance_s
                .max(10.0 * f64::EPSILON * tau.abs());

            if residual <= threshold {
                // free end state at final time
                let rtm = self.runtime(reference_time, fixed_end, &fixed_state, tau, frequency_hz);

                debug!(
                    "{:.6}: light time {:.12E}s (corrections {:.3E}s) converged in {} iterations",
                    reference_time, tau, corrections, iteration
                );

                return Ok(LightTimeSolution {
                    light_time: tau,
                    transmission_time: rtm.transmission_time,
                    reception_time: rtm.reception_time,
                    transmitter_state: rtm.transmitter_state,
                    receiver_state: rtm.receiver_state,
                    iterations: iteration,
                });
            }
        }

        error!(
            "{:.6}: light time did not converge (residual={:.3E}s)",
            reference_time, residual
        );

        Err(Error::LightTimeNonConvergence {
            iterations: self.convergence.max_iterations,
            residual_s: residual,
        })
    }

    /// Light time (s) only. Dispersive corrections are not supported here.
    pub fn light_time(&self, reference_time: f64, fixed_end: LegEnd) -> Result<f64, Error> {
        Ok(self.solve(reference_time, fixed_end, None)?.light_time)
    }

    /// Gradient of the total light time with respect to the position of given
    /// [LegEnd], in s/m. Geometric term and every correction contribute.
    pub fn partial_wrt_link_end_position(
        &self,
        solution: &LightTimeSolution,
        end: LegEnd,
        frequency_hz: Option<f64>,
    ) -> Result<Vector3<f64>, Error> {
        let los = solution.line_of_sight();
        let norm = los.norm();
        if norm == 0.0 {
            return Err(Error::CoLocatedLinkEnds(solution.reception_time));
        }

        let unit = los / norm / SPEED_OF_LIGHT_M_S;
        let mut partial = match end {
            LegEnd::Transmitter => -unit,
            LegEnd::Receiver => unit,
        };

        let rtm = solution.runtime(frequency_hz);
        for correction in self.corrections.iter() {
            partial += correction.partial_wrt_link_end_position(&rtm, end)?;
        }

        Ok(partial)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        constants::EARTH_EQUATORIAL_RADIUS_M,
        prelude::{AncillaryKey, IonosphericCorrection, UserDefinedCorrection},
    };
    use std::sync::Arc;

    /// Linear motion
    fn linear(p: Vector3<f64>, v: Vector3<f64>) -> StateFunction {
        Arc::new(move |t: f64| {
            let r = p + v * t;
            Vector6::new(r[0], r[1], r[2], v[0], v[1], v[2])
        })
    }

    #[test]
    fn static_link_ends() {
        let d = 3.0E8;
        let calculator = LightTimeCalculator::new(
            linear(Vector3::zeros(), Vector3::zeros()),
            linear(Vector3::new(d, 0.0, 0.0), Vector3::zeros()),
        );

        for fixed_end in [LegEnd::Transmitter, LegEnd::Receiver] {
            let solution = calculator.solve(1000.0, fixed_end, None).unwrap();
            assert!((solution.light_time - d / SPEED_OF_LIGHT_M_S).abs() < 1.0E-15);
            assert_eq!(solution.time(fixed_end), 1000.0);
            assert!(solution.iterations <= 2);
        }
    }

    #[test]
    fn receding_receiver() {
        // receiver receding at v along the line of sight:
        // downlink: tau = d0 / (c - v), uplink: tau = d0 / (c + v)
        let (d0, v) = (1.0E9, 3.0E4);
        let calculator = LightTimeCalculator::new(
            linear(Vector3::zeros(), Vector3::zeros()),
            linear(Vector3::new(d0, 0.0, 0.0), Vector3::new(v, 0.0, 0.0)),
        );

        let downlink = calculator.light_time(0.0, LegEnd::Transmitter).unwrap();
        assert!((downlink - d0 / (SPEED_OF_LIGHT_M_S - v)).abs() < 1.0E-12);

        let uplink = calculator.solve(0.0, LegEnd::Receiver, None).unwrap();
        // at t=0 the receiver is at d0, the transmitter never moves
        assert!((uplink.light_time - d0 / SPEED_OF_LIGHT_M_S).abs() < 1.0E-12);
        assert!((uplink.transmission_time + uplink.light_time).abs() < 1.0E-12);
    }

    #[test]
    fn constant_correction() {
        let calculator = LightTimeCalculator::new(
            linear(Vector3::zeros(), Vector3::zeros()),
            linear(Vector3::new(3.0E8, 0.0, 0.0), Vector3::zeros()),
        )
        .with_corrections(vec![Box::new(UserDefinedCorrection::new(Arc::new(
            |_: &CorrectionRuntime| 1.0E-6,
        )))]);

        let solution = calculator.solve(0.0, LegEnd::Transmitter, None).unwrap();
        let geometric = 3.0E8 / SPEED_OF_LIGHT_M_S;
        assert!((solution.light_time - geometric - 1.0E-6).abs() < 1.0E-15);
        assert!((solution.reception_time - solution.light_time).abs() < 1.0E-15);
    }

    #[test]
    fn superluminal_divergence() {
        // receiver fleeing faster than light
        let calculator = LightTimeCalculator::new(
            linear(Vector3::zeros(), Vector3::zeros()),
            linear(
                Vector3::new(1.0E8, 0.0, 0.0),
                Vector3::new(2.0 * SPEED_OF_LIGHT_M_S, 0.0, 0.0),
            ),
        )
        .with_convergence(LightTimeConvergence {
            tolerance_s: 1.0E-12,
            max_iterations: 20,
        });

        match calculator.solve(0.0, LegEnd::Transmitter, None) {
            Err(Error::LightTimeNonConvergence { iterations, .. }) => assert_eq!(iterations, 20),
            other => panic!("expected non convergence, got {:?}", other),
        }
    }

    #[test]
    fn geometric_partials() {
        let calculator = LightTimeCalculator::new(
            linear(Vector3::zeros(), Vector3::zeros()),
            linear(Vector3::new(3.0E8, 4.0E8, 0.0), Vector3::zeros()),
        );
        let solution = calculator.solve(0.0, LegEnd::Receiver, None).unwrap();

        let rx = calculator
            .partial_wrt_link_end_position(&solution, LegEnd::Receiver, None)
            .unwrap();
        let tx = calculator
            .partial_wrt_link_end_position(&solution, LegEnd::Transmitter, None)
            .unwrap();

        let expected = Vector3::new(0.6, 0.8, 0.0) / SPEED_OF_LIGHT_M_S;
        assert!((rx - expected).norm() < 1.0E-20);
        assert!((tx + expected).norm() < 1.0E-20);
    }

    #[test]
    fn dispersive_correction_needs_frequency() {
        let calculator = LightTimeCalculator::new(
            linear(Vector3::new(EARTH_EQUATORIAL_RADIUS_M, 0.0, 0.0), Vector3::zeros()),
            linear(Vector3::new(2.0E7, 0.0, 0.0), Vector3::zeros()),
        )
        .with_corrections(vec![Box::new(IonosphericCorrection::new(
            20.0,
            350.0E3,
            EARTH_EQUATORIAL_RADIUS_M,
            Arc::new(|_: f64| Vector6::zeros()),
            LegEnd::Transmitter,
        ))]);

        assert!(calculator.requires_frequency());

        assert_eq!(
            calculator.light_time(0.0, LegEnd::Transmitter),
            Err(Error::MissingAncillaryData(AncillaryKey::FrequencyBands))
        );

        let solution = calculator.solve(0.0, LegEnd::Transmitter, Some(7.1E9)).unwrap();
        let geometric = (2.0E7 - EARTH_EQUATORIAL_RADIUS_M) / SPEED_OF_LIGHT_M_S;
        assert!(solution.light_time > geometric);
    }
}
