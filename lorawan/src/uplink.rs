//! Uplink admission and request selection

use log::{debug, warn};

use crate::app::AppData;
use crate::config::params::RadioPolicy;
use crate::error::DeviceError;
use crate::mac::{MacEngine, UplinkRequest};

/// Transmissions performed for a confirmed uplink until an ack arrives
pub const CONFIRMED_NB_TRIALS: u8 = 8;

/// Acknowledgment requested for an uplink
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Confirmation {
    /// Fire and forget
    Unconfirmed,
    /// Network acknowledgment requested
    Confirmed,
}

/// What was actually queued for transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Transmission {
    /// The application payload was queued
    Payload,
    /// The payload did not fit; an empty frame flushing MAC commands was
    /// queued instead
    MacFlush,
}

/// Queue an application payload
///
/// Refused with [`DeviceError::Blocked`] while a certification session runs.
/// A payload the engine cannot fit is replaced by an empty unconfirmed frame
/// at the configured data rate, and the result reflects that frame. `Ok`
/// means queued, not delivered: delivery is reported by an MCPS confirm.
pub fn send<M: MacEngine>(
    mac: &mut M,
    policy: &RadioPolicy,
    certification_running: bool,
    data: &AppData<'_>,
    confirmation: Confirmation,
) -> Result<Transmission, DeviceError<M::Error>> {
    if certification_running {
        debug!("uplink on port {} blocked by certification", data.port);
        return Err(DeviceError::Blocked);
    }

    let (request, transmission) = if mac.query_tx_possible(data.len()) {
        (build_request(policy, data, confirmation), Transmission::Payload)
    } else {
        warn!(
            "{} byte payload does not fit at DR{}, flushing MAC commands",
            data.len(),
            policy.tx_datarate.index()
        );
        (UplinkRequest::flush(policy.tx_datarate), Transmission::MacFlush)
    };

    mac.submit_uplink(&request)?;
    Ok(transmission)
}

fn build_request<'a>(
    policy: &RadioPolicy,
    data: &AppData<'a>,
    confirmation: Confirmation,
) -> UplinkRequest<'a> {
    match confirmation {
        Confirmation::Unconfirmed => UplinkRequest::Unconfirmed {
            port: Some(data.port),
            payload: data.buffer,
            datarate: policy.tx_datarate,
        },
        Confirmation::Confirmed => UplinkRequest::Confirmed {
            port: data.port,
            payload: data.buffer,
            nb_trials: CONFIRMED_NB_TRIALS,
            datarate: policy.tx_datarate,
        },
    }
}
