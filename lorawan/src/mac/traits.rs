use crate::class::DeviceClass;
use crate::config::device::{AbpSession, JoinRequest};

use super::primitives::UplinkRequest;
use super::region::Region;

/// Generic LoRaWAN MAC engine interface
///
/// Every method must return without waiting on the radio. Requests are
/// queued by the engine and their outcome is reported later through a
/// [`crate::events::MacEvent`].
pub trait MacEngine {
    /// Error type for rejected requests
    type Error;

    /// Initialize the engine for a region
    fn init(&mut self, region: Region) -> Result<(), Self::Error>;

    /// Update the battery level reported in device status answers
    ///
    /// 0 means external power, 1..=254 the battery level, 255 unknown.
    fn set_battery_level(&mut self, level: u8);

    /// Enable or disable adaptive data rate
    fn set_adr(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Select the public or private network sync word
    fn set_public_network(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Enable or disable duty cycle enforcement
    fn set_duty_cycle(&mut self, enabled: bool) -> Result<(), Self::Error>;

    /// Switch the device class; the switch is committed when this returns `Ok`
    fn set_device_class(&mut self, class: DeviceClass) -> Result<(), Self::Error>;

    /// Get the device class the engine currently operates in
    fn device_class(&mut self) -> Result<DeviceClass, Self::Error>;

    /// Queue an OTAA join request
    fn submit_join(&mut self, request: &JoinRequest) -> Result<(), Self::Error>;

    /// Install an ABP session and mark the network as joined
    fn install_session(&mut self, session: &AbpSession) -> Result<(), Self::Error>;

    /// Check if a payload of `size` bytes can be sent with the current
    /// channel and data rate constraints
    fn query_tx_possible(&mut self, size: usize) -> bool;

    /// Queue an uplink
    fn submit_uplink(&mut self, request: &UplinkRequest<'_>) -> Result<(), Self::Error>;
}
