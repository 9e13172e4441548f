//! Downlink routing
//!
//! Deliveries on [`CERTIF_PORT`] always go to the certification agent, even
//! when no test session runs. Everything else is application data.

use log::{debug, trace};

use crate::app::{AppData, Application};
use crate::certification::{Certification, CERTIF_PORT};
use crate::config::device::JoinRequest;
use crate::mac::McpsIndication;

/// Signal quality of the last application downlink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReceptionMetrics {
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Signal to noise ratio in dB
    pub snr: i8,
}

/// Where a downlink was routed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Handed to the certification agent
    Certification,
    /// Handed to the application
    Application,
    /// Not delivered
    Dropped,
}

/// Route a downlink indication
pub fn route<A: Application, C: Certification>(
    indication: &McpsIndication,
    join: Option<&JoinRequest>,
    metrics: &mut ReceptionMetrics,
    app: &mut A,
    certification: &mut C,
) -> Route {
    if !indication.status.is_ok() {
        debug!("downlink dropped: {:?}", indication.status);
        return Route::Dropped;
    }

    if !indication.rx_data {
        trace!("downlink without application data");
        return Route::Dropped;
    }

    if indication.port == CERTIF_PORT {
        trace!("certification downlink, {} bytes", indication.buffer.len());
        certification.on_downlink(indication, join);
        return Route::Certification;
    }

    metrics.rssi = indication.rssi;
    metrics.snr = indication.snr;
    debug!(
        "downlink on port {}, {} bytes, rssi {} snr {}",
        indication.port,
        indication.buffer.len(),
        indication.rssi,
        indication.snr
    );

    let data = AppData::new(indication.port, &indication.buffer);
    app.on_receive(&data);
    Route::Application
}
