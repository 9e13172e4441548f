//! LoRaWAN device class switching
//!
//! The controller supports Class A (receive windows after each uplink) and
//! Class C (continuous reception). Class B needs beacon tracking that is not
//! part of this build, requests for it are rejected before the MAC engine is
//! contacted.
//!
//! | current | requested | action                                      |
//! |---------|-----------|---------------------------------------------|
//! | A       | A         | nothing to do                               |
//! | A       | C         | switch in the engine, confirm to application|
//! | C       | A         | switch in the engine, confirm to application|
//! | C       | C         | nothing to do                               |

use log::{debug, info, warn};

use crate::app::Application;
use crate::error::DeviceError;
use crate::mac::MacEngine;

/// LoRaWAN device class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceClass {
    /// Class A: Uplink followed by two receive windows
    A,
    /// Class B: Scheduled receive slots (beaconing)
    B,
    /// Class C: Continuously listening except when transmitting
    C,
}

impl DeviceClass {
    /// Check if the controller can operate in this class
    pub fn is_supported(&self) -> bool {
        matches!(self, DeviceClass::A | DeviceClass::C)
    }
}

/// Get the class the MAC engine currently operates in
///
/// The engine record is authoritative, the network may switch the class
/// without going through [`request_class`].
pub fn current_class<M: MacEngine>(mac: &mut M) -> Result<DeviceClass, DeviceError<M::Error>> {
    Ok(mac.device_class()?)
}

/// Switch the device class
///
/// The switch is instantaneous: once the engine accepts it the application
/// receives exactly one [`Application::on_class_confirmed`].
pub fn request_class<M: MacEngine, A: Application>(
    mac: &mut M,
    app: &mut A,
    requested: DeviceClass,
) -> Result<(), DeviceError<M::Error>> {
    if !requested.is_supported() {
        warn!("class {:?} is not supported", requested);
        return Err(DeviceError::InvalidTransition);
    }

    let current = mac.device_class()?;
    if current == requested {
        debug!("already in class {:?}", current);
        return Ok(());
    }

    if let Err(e) = mac.set_device_class(requested) {
        warn!("switch from class {:?} to {:?} rejected", current, requested);
        return Err(DeviceError::SubmissionFailed(e));
    }

    info!("switched from class {:?} to {:?}", current, requested);
    app.on_class_confirmed(requested);
    Ok(())
}
