use crate::{
    prelude::{
        create_observation_model, Error, LinkEndId, LinkEndType, LinkEnds, ObservableSettings,
        ObservableType, ObservationBiasSettings, ObservationModel, ObservationModelSettings,
    },
    tests::{geocentric, init_logger, T0},
};

fn one_way_range(bias: ObservationBiasSettings) -> Result<ObservationModel, Error> {
    let settings = ObservationModelSettings::new(
        ObservableSettings::OneWayRange,
        LinkEnds::one_way(LinkEndId::body("GPS"), LinkEndId::station("Earth", "DSS-43")),
    )
    .with_bias(bias);

    create_observation_model(&settings, &geocentric())
}

/// Observed minus ideal, at reception time t
fn bias_at(model: &ObservationModel, t: f64) -> Result<f64, Error> {
    let ideal = model.compute_ideal_observations(t, LinkEndType::Receiver, None)?;
    let observed = model.compute_observations(t, LinkEndType::Receiver, None)?;
    Ok(observed[0] - ideal[0])
}

#[test]
fn constant_bias() {
    init_logger();
    let model = one_way_range(ObservationBiasSettings::Constant {
        value: vec![10.0],
        relative: false,
    })
    .unwrap();

    assert!(model.bias().is_some());

    let ideal = model
        .compute_ideal_observations(T0, LinkEndType::Receiver, None)
        .unwrap();
    let observed = model
        .compute_observations(T0, LinkEndType::Receiver, None)
        .unwrap();

    assert_eq!(observed[0], 10.0 + ideal[0]);
}

#[test]
fn relative_bias() {
    init_logger();
    let model = one_way_range(ObservationBiasSettings::Multiple(vec![
        ObservationBiasSettings::Constant {
            value: vec![1.0E-6],
            relative: true,
        },
        ObservationBiasSettings::Constant {
            value: vec![-5.0],
            relative: false,
        },
    ]))
    .unwrap();

    let ideal = model
        .compute_ideal_observations(T0, LinkEndType::Receiver, None)
        .unwrap();

    let bias = bias_at(&model, T0).unwrap();
    let expected = -5.0 + 1.0E-6 * ideal[0];
    assert!((bias - expected).abs() < 1.0E-6);
}

#[test]
fn arcwise_bias_reference_end() {
    init_logger();

    // receiver and transmitter ends fall in distinct arcs
    let arcs = |reference_end| ObservationBiasSettings::ArcWiseConstant {
        arc_start_times: vec![0.0, T0 - 0.01, T0 + 1.0],
        values: vec![vec![1.0], vec![2.0], vec![3.0]],
        relative: false,
        reference_end,
    };

    let receiver = one_way_range(arcs(LinkEndType::Receiver)).unwrap();
    assert!((bias_at(&receiver, T0).unwrap() - 2.0).abs() < 1.0E-6);
    assert!((bias_at(&receiver, T0 + 10.0).unwrap() - 3.0).abs() < 1.0E-6);

    let transmitter = one_way_range(arcs(LinkEndType::Transmitter)).unwrap();
    assert!((bias_at(&transmitter, T0).unwrap() - 1.0).abs() < 1.0E-6);

    assert_eq!(
        bias_at(&receiver, -10.0),
        Err(Error::OutOfBiasArcs(-10.0))
    );
}

#[test]
fn time_drift() {
    init_logger();
    let model = one_way_range(ObservationBiasSettings::ConstantTimeDrift {
        drift: vec![1.0E-3],
        reference_epoch: 0.0,
        reference_end: LinkEndType::Receiver,
    })
    .unwrap();

    assert!((bias_at(&model, T0).unwrap() - 1.0E-3 * T0).abs() < 1.0E-6);
    assert!((bias_at(&model, 2.0 * T0).unwrap() - 2.0E-3 * T0).abs() < 1.0E-6);
}

#[test]
fn invalid_bias_settings() {
    init_logger();

    assert_eq!(
        one_way_range(ObservationBiasSettings::Constant {
            value: vec![1.0, 2.0],
            relative: false,
        })
        .err(),
        Some(Error::InvalidBiasSize {
            expected: 1,
            found: 2
        })
    );

    assert_eq!(
        one_way_range(ObservationBiasSettings::ConstantTimeDrift {
            drift: vec![1.0],
            reference_epoch: 0.0,
            reference_end: LinkEndType::Retransmitter,
        })
        .err(),
        Some(Error::UnsupportedReferenceLinkEnd(
            ObservableType::OneWayRange,
            LinkEndType::Retransmitter
        ))
    );

    assert_eq!(
        one_way_range(ObservationBiasSettings::ArcWiseConstant {
            arc_start_times: vec![10.0, 0.0],
            values: vec![vec![1.0], vec![2.0]],
            relative: false,
            reference_end: LinkEndType::Receiver,
        })
        .err(),
        Some(Error::InvalidBiasArcs)
    );
}

#[test]
fn intermediate_reference_end() {
    init_logger();

    let settings = ObservationModelSettings::new(
        ObservableSettings::NWayRange {
            retransmission_delays: vec![1.0],
        },
        LinkEnds::one_way(
            LinkEndId::station("Earth", "DSS-43"),
            LinkEndId::station("Earth", "DSS-43"),
        )
        .with(LinkEndType::Retransmitter, LinkEndId::body("GPS")),
    )
    .with_bias(ObservationBiasSettings::ConstantTimeDrift {
        drift: vec![1.0],
        reference_epoch: T0,
        reference_end: LinkEndType::Retransmitter,
    });

    let model = create_observation_model(&settings, &geocentric()).unwrap();

    let (ideal, data) = model
        .compute_ideal_observations_with_link_end_data(T0, LinkEndType::Receiver, None)
        .unwrap();

    let observed = model
        .compute_observations(T0, LinkEndType::Receiver, None)
        .unwrap();

    // retransmitter is dated at signal reception
    let t = data.link_end_time(1).unwrap();
    assert_eq!(t, data.times[1]);
    assert!((observed[0] - ideal[0] - (t - T0)).abs() < 1.0E-6);
    assert!(t < T0 - 1.0);
}
