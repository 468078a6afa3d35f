use rand::{rngs::SmallRng, Rng, SeedableRng};
use rstest::*;

use crate::{
    prelude::{
        Error, LegEnd, LightTimeCalculator, LightTimeConvergence, LinkEndId, StateProvider,
    },
    tests::{assert_relative, geocentric, heliocentric, init_logger, T0},
};

fn calculator(provider: &dyn StateProvider, tx: &LinkEndId, rx: &LinkEndId) -> LightTimeCalculator {
    LightTimeCalculator::new(
        provider.link_end_state_function(tx).unwrap(),
        provider.link_end_state_function(rx).unwrap(),
    )
}

#[fixture]
fn uplink() -> LightTimeCalculator {
    let bodies = geocentric();
    calculator(
        &bodies,
        &LinkEndId::station("Earth", "DSS-43"),
        &LinkEndId::body("GPS"),
    )
}

#[fixture]
fn downlink() -> LightTimeCalculator {
    let bodies = geocentric();
    calculator(
        &bodies,
        &LinkEndId::body("GPS"),
        &LinkEndId::station("Earth", "DSS-43"),
    )
}

#[rstest]
fn station_to_gps(uplink: LightTimeCalculator, downlink: LightTimeCalculator) {
    init_logger();

    let solution = uplink.solve(T0, LegEnd::Receiver, None).unwrap();
    assert_relative(solution.light_time, 0.07634124744120016, 1.0E-10);
    assert_eq!(solution.reception_time, T0);
    assert_eq!(solution.transmission_time, T0 - solution.light_time);
    assert!(solution.iterations < 10);

    let solution = downlink.solve(T0, LegEnd::Transmitter, None).unwrap();
    assert_relative(solution.light_time, 0.07634126307243345, 1.0E-10);
    assert_eq!(solution.transmission_time, T0);
    assert_eq!(solution.reception_time, T0 + solution.light_time);
}

#[rstest]
fn fixed_end_consistency(downlink: LightTimeCalculator) {
    init_logger();

    let mut rng = SmallRng::seed_from_u64(0);

    for _ in 0..20 {
        let t = rng.random_range(0.0..86400.0);

        let forward = downlink.solve(t, LegEnd::Transmitter, None).unwrap();
        let backward = downlink
            .solve(forward.reception_time, LegEnd::Receiver, None)
            .unwrap();

        assert!((backward.transmission_time - t).abs() < 1.0E-11);
        assert!((backward.light_time - forward.light_time).abs() < 1.0E-11);

        // free end state is evaluated at the converged time
        let state = downlink.receiver_state(forward.reception_time);
        assert_eq!(forward.receiver_state, state);
        assert_eq!(forward.state(LegEnd::Receiver), state);
        assert_eq!(forward.time(LegEnd::Transmitter), t);
    }
}

#[rstest]
fn light_time_is_causal(uplink: LightTimeCalculator) {
    init_logger();

    let solution = uplink.solve(T0, LegEnd::Receiver, None).unwrap();

    let distance = (solution.receiver_state.fixed_rows::<3>(0)
        - solution.transmitter_state.fixed_rows::<3>(0))
    .norm();

    assert_relative(
        solution.light_time,
        distance / crate::constants::SPEED_OF_LIGHT_M_S,
        1.0E-12,
    );
    assert!(solution.transmission_time < solution.reception_time);
    assert_eq!(uplink.light_time(T0, LegEnd::Receiver), Ok(solution.light_time));
}

#[test]
fn interplanetary() {
    init_logger();
    let bodies = heliocentric();

    let calculator = calculator(
        &bodies,
        &LinkEndId::station("Earth", "DSS-63"),
        &LinkEndId::body("MEX"),
    );

    let solution = calculator.solve(T0, LegEnd::Receiver, None).unwrap();

    // Earth-Mars light time spans 3 to 22 minutes
    assert!(solution.light_time > 180.0 && solution.light_time < 1340.0);
    assert!(solution.iterations <= 10);
}

#[rstest]
fn iteration_budget(uplink: LightTimeCalculator) {
    init_logger();

    let starved = uplink.with_convergence(LightTimeConvergence {
        tolerance_s: 0.0,
        max_iterations: 1,
    });

    match starved.solve(T0, LegEnd::Receiver, None) {
        Err(Error::LightTimeNonConvergence { iterations, .. }) => assert_eq!(iterations, 1),
        other => panic!("unexpected result: {:?}", other),
    }
}
