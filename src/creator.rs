//! Observation model factory
use log::{debug, error};

use crate::{
    light_time::{
        correction::{
            FirstOrderRelativisticCorrection, IonosphericCorrection, LightTimeCorrection,
            PerturbingBody, TroposphericCorrection,
        },
        LightTimeCalculator,
    },
    observation::{MultiLegLink, ProperTimeRates},
    prelude::{
        DirectFirstOrderProperTimeRate, DopplerMeasuredFrequency, Error, LegEnd,
        LightTimeCorrectionSettings, LinkEndId, LinkEndType, LinkEnds, NWayRange,
        ObservableSettings, ObservableType, ObservationBias, ObservationModel,
        ObservationModelKind, ObservationModelSettings, OneWayDoppler, OneWayDopplerSettings,
        OneWayRange, ProperTimeRateCalculator, ProperTimeRateSettings, StateFunction,
        StateProvider, TwoWayDoppler,
    },
};

/// Verifies the link ends fit the observable
fn check_topology(observable: ObservableType, link_ends: &LinkEnds) -> Result<(), Error> {
    let num_intermediates = link_ends.intermediates().count();

    let expected = match observable {
        ObservableType::OneWayRange | ObservableType::OneWayDoppler => {
            (num_intermediates != 0).then_some("exactly one transmitter and one receiver")
        },
        ObservableType::TwoWayDoppler => {
            let valid = num_intermediates == 1
                && (link_ends.contains(LinkEndType::Reflector(1))
                    || link_ends.contains(LinkEndType::Retransmitter));
            (!valid).then_some("exactly one reflector or retransmitter")
        },
        ObservableType::NWayRange => {
            (num_intermediates == 0).then_some("at least one intermediate link end")
        },
        ObservableType::DopplerMeasuredFrequency => {
            let valid =
                num_intermediates == 1 && link_ends.contains(LinkEndType::Retransmitter);
            (!valid).then_some("exactly one retransmitter")
        },
    };

    match expected {
        Some(expected) => {
            error!("{} topology mismatch: {:?}", observable, link_ends);
            Err(Error::TopologyMismatch {
                observable,
                expected,
            })
        },
        None => Ok(()),
    }
}

/// Which end of the (transmitter, receiver) leg sits on `central_body`
fn ground_end(transmitter: &LinkEndId, receiver: &LinkEndId, central_body: &str) -> Option<LegEnd> {
    let on_ground = |id: &LinkEndId| id.body == central_body && !id.is_body_center();
    if on_ground(transmitter) {
        Some(LegEnd::Transmitter)
    } else if on_ground(receiver) {
        Some(LegEnd::Receiver)
    } else {
        None
    }
}

fn gravitational_parameter(provider: &dyn StateProvider, body: &str) -> Result<f64, Error> {
    provider
        .gravitational_parameter(body)
        .ok_or(Error::MissingGravitationalParameter(body.to_string()))
}

fn body_state(provider: &dyn StateProvider, body: &str) -> Result<StateFunction, Error> {
    provider
        .body_state_function(body)
        .ok_or(Error::UnknownBody(body.to_string()))
}

/// Builds the correction stack of one leg.
/// Media corrections only apply to legs with a ground end on their central body.
fn leg_corrections(
    settings: &[LightTimeCorrectionSettings],
    transmitter: &LinkEndId,
    receiver: &LinkEndId,
    provider: &dyn StateProvider,
) -> Result<Vec<Box<dyn LightTimeCorrection>>, Error> {
    let mut corrections: Vec<Box<dyn LightTimeCorrection>> = Vec::with_capacity(settings.len());

    for correction in settings.iter() {
        match correction {
            LightTimeCorrectionSettings::FirstOrderRelativistic {
                perturbing_bodies,
                ppn_gamma,
            } => {
                let perturbers = perturbing_bodies
                    .iter()
                    .map(|name| {
                        Ok(PerturbingBody {
                            name: name.clone(),
                            gravitational_parameter: gravitational_parameter(provider, name)?,
                            state: body_state(provider, name)?,
                        })
                    })
                    .collect::<Result<Vec<_>, Error>>()?;

                corrections.push(Box::new(FirstOrderRelativisticCorrection::new(
                    perturbers, *ppn_gamma,
                )));
            },
            LightTimeCorrectionSettings::Tropospheric {
                central_body,
                zenith,
            } => {
                if let Some(ground) = ground_end(transmitter, receiver, central_body) {
                    corrections.push(Box::new(TroposphericCorrection::new(
                        *zenith,
                        body_state(provider, central_body)?,
                        ground,
                    )));
                } else {
                    debug!(
                        "{} -> {}: no tropospheric delay (not on \"{}\")",
                        transmitter, receiver, central_body
                    );
                }
            },
            LightTimeCorrectionSettings::Ionospheric {
                central_body,
                vertical_tec_u,
                shell_height_m,
                body_radius_m,
            } => {
                if let Some(ground) = ground_end(transmitter, receiver, central_body) {
                    corrections.push(Box::new(IonosphericCorrection::new(
                        *vertical_tec_u,
                        *shell_height_m,
                        *body_radius_m,
                        body_state(provider, central_body)?,
                        ground,
                    )));
                } else {
                    debug!(
                        "{} -> {}: no ionospheric delay (not on \"{}\")",
                        transmitter, receiver, central_body
                    );
                }
            },
            LightTimeCorrectionSettings::UserDefined(user) => {
                corrections.push(Box::new(user.clone()));
            },
        }
    }

    Ok(corrections)
}

/// Media corrections must apply to at least one leg
fn check_media_corrections(
    settings: &[LightTimeCorrectionSettings],
    link_ends: &LinkEnds,
) -> Result<(), Error> {
    for correction in settings.iter() {
        let (name, central_body) = match correction {
            LightTimeCorrectionSettings::Tropospheric { central_body, .. } => {
                ("tropospheric", central_body)
            },
            LightTimeCorrectionSettings::Ionospheric { central_body, .. } => {
                ("ionospheric", central_body)
            },
            _ => continue,
        };

        let applies = link_ends
            .legs()
            .any(|((_, tx), (_, rx))| ground_end(tx, rx, central_body).is_some());

        if !applies {
            return Err(Error::NoGroundLinkEnd(name, central_body.clone()));
        }
    }
    Ok(())
}

fn proper_time_rate(
    settings: Option<&ProperTimeRateSettings>,
    provider: &dyn StateProvider,
) -> Result<Option<Box<dyn ProperTimeRateCalculator>>, Error> {
    match settings {
        Some(ProperTimeRateSettings::DirectFirstOrder { central_body }) => {
            Ok(Some(Box::new(DirectFirstOrderProperTimeRate::new(
                body_state(provider, central_body)?,
                gravitational_parameter(provider, central_body)?,
            ))))
        },
        None => Ok(None),
    }
}

fn proper_time_rates(
    settings: &OneWayDopplerSettings,
    provider: &dyn StateProvider,
) -> Result<ProperTimeRates, Error> {
    Ok(ProperTimeRates {
        transmitter: proper_time_rate(settings.transmitter_proper_time.as_ref(), provider)?,
        receiver: proper_time_rate(settings.receiver_proper_time.as_ref(), provider)?,
    })
}

/// Creates an [ObservationModel] from its [ObservationModelSettings].
/// The [StateProvider] is only consulted here: the returned model owns every
/// state function it needs.
pub fn create_observation_model(
    settings: &ObservationModelSettings,
    provider: &dyn StateProvider,
) -> Result<ObservationModel, Error> {
    let link_ends = &settings.link_ends;
    let observable = settings.observable.observable_type();

    link_ends.validate()?;
    check_topology(observable, link_ends)?;
    check_media_corrections(&settings.light_time_corrections, link_ends)?;

    let mut legs = Vec::with_capacity(link_ends.num_legs());
    for ((_, transmitter), (_, receiver)) in link_ends.legs() {
        let transmitter_state = provider
            .link_end_state_function(transmitter)
            .ok_or(Error::UnknownLinkEnd(transmitter.to_string()))?;

        let receiver_state = provider
            .link_end_state_function(receiver)
            .ok_or(Error::UnknownLinkEnd(receiver.to_string()))?;

        let corrections = leg_corrections(
            &settings.light_time_corrections,
            transmitter,
            receiver,
            provider,
        )?;

        legs.push(
            LightTimeCalculator::new(transmitter_state, receiver_state)
                .with_corrections(corrections)
                .with_convergence(settings.convergence),
        );
    }

    let transmitter = link_ends
        .get(LinkEndType::Transmitter)
        .ok_or(Error::MissingTransmitter)?;

    let transmitted_frequency = provider.transmitting_frequency(transmitter);

    let turnarounds = link_ends
        .intermediates()
        .map(|(_, id)| provider.turnaround_ratio(&id.body))
        .collect::<Vec<_>>();

    let link = MultiLegLink::new(legs, link_ends.ordered().map(|(end, _)| *end).collect())
        .with_transmitter_frequency(transmitted_frequency.clone())
        .with_turnarounds(turnarounds);

    let kind = match &settings.observable {
        ObservableSettings::OneWayRange => {
            ObservationModelKind::OneWayRange(OneWayRange::new(link))
        },
        ObservableSettings::OneWayDoppler(doppler) => {
            ObservationModelKind::OneWayDoppler(OneWayDoppler::new(
                link,
                proper_time_rates(doppler, provider)?,
                doppler.normalize_with_speed_of_light,
            ))
        },
        ObservableSettings::TwoWayDoppler(doppler) => {
            ObservationModelKind::TwoWayDoppler(TwoWayDoppler::new(
                link,
                proper_time_rates(&doppler.uplink, provider)?,
                proper_time_rates(&doppler.downlink, provider)?,
                doppler.normalize_with_speed_of_light,
            ))
        },
        ObservableSettings::NWayRange {
            retransmission_delays,
        } => {
            let num_intermediates = link_ends.intermediates().count();
            let delays = if retransmission_delays.is_empty() {
                vec![0.0; num_intermediates]
            } else if retransmission_delays.len() == num_intermediates {
                retransmission_delays.clone()
            } else {
                return Err(Error::TopologyMismatch {
                    observable,
                    expected: "one retransmission delay per intermediate link end",
                });
            };
            ObservationModelKind::NWayRange(NWayRange::new(
                link.with_retransmission_delays(delays),
            ))
        },
        ObservableSettings::DopplerMeasuredFrequency => {
            let transmitted = transmitted_frequency
                .ok_or(Error::MissingTransmittingFrequency(transmitter.to_string()))?;
            ObservationModelKind::DopplerMeasuredFrequency(DopplerMeasuredFrequency::new(
                link,
                transmitted,
            ))
        },
    };

    let bias = match &settings.bias {
        Some(bias) => Some(ObservationBias::new(bias, link_ends, observable, 1)?),
        None => None,
    };

    debug!(
        "created {} model: {} leg(s), {} correction(s)",
        observable,
        link_ends.num_legs(),
        settings.light_time_corrections.len()
    );

    Ok(ObservationModel::new(link_ends.clone(), kind, bias))
}
