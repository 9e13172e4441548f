//! Application layer callbacks
//!
//! The hosting application implements [`Application`] to learn about
//! activation, class changes and received data, and to provide the board
//! services the controller needs during initialization.

use crate::class::DeviceClass;
use crate::config::device::EUI64;

/// Application payload with its port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppData<'a> {
    /// Application port
    pub port: u8,
    /// Payload
    pub buffer: &'a [u8],
}

impl<'a> AppData<'a> {
    /// Create application data for a port
    pub fn new(port: u8, buffer: &'a [u8]) -> Self {
        Self { port, buffer }
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

/// Callbacks and board services supplied by the application
pub trait Application {
    /// The device joined the network (or installed its ABP session)
    fn on_joined(&mut self);

    /// Every join attempt allowed by the retry policy failed
    fn on_join_failed(&mut self);

    /// A device class switch took effect
    fn on_class_confirmed(&mut self, class: DeviceClass);

    /// Application data was received
    fn on_receive(&mut self, data: &AppData<'_>);

    /// Board unique identifier used as DevEUI when the EUI is not static
    fn unique_id(&mut self) -> EUI64;

    /// Seed for the random device address used when the address is not static
    fn random_seed(&mut self) -> u32;

    /// Battery level as reported to the network
    ///
    /// 0 means external power, 1..=254 the battery level, 255 unknown.
    fn battery_level(&mut self) -> u8;
}
