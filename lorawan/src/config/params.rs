use core::time::Duration;

use crate::mac::region::{DataRate, Region};
use crate::uplink::Confirmation;

/// Minimum delay between two join attempts
pub const DEFAULT_JOIN_RETRY_INTERVAL: Duration = Duration::from_secs(10);
/// Number of retries after the first failed join before giving up
pub const DEFAULT_JOIN_RETRIES: u8 = 3;
/// Join trials the MAC engine performs per join request
pub const DEFAULT_JOIN_TRIALS: u8 = 3;

/// Bounded join retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinRetryPolicy {
    /// Retries issued after the first failed attempt
    ///
    /// `N` retries means up to `N + 1` join attempts in total: the failure
    /// of attempt `N + 1` is terminal and reported once through
    /// [`crate::app::Application::on_join_failed`]. Set `N - 1` to give up
    /// after `N` failed attempts.
    pub max_retries: u8,
    /// Minimum delay between a failure and the next attempt
    pub interval: Duration,
}

impl Default for JoinRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_JOIN_RETRIES,
            interval: DEFAULT_JOIN_RETRY_INTERVAL,
        }
    }
}

/// Transmit policy read by the uplink dispatcher on every send
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RadioPolicy {
    /// Duty cycle enforcement in the MAC engine
    pub duty_cycle: bool,
    /// Data rate used for every uplink
    pub tx_datarate: DataRate,
    /// Confirmation used by [`crate::device::LoRaDevice::send_data`]
    pub ack_policy: Confirmation,
}

impl RadioPolicy {
    /// Default policy for a region
    pub fn for_region(region: Region) -> Self {
        Self {
            duty_cycle: region.requires_duty_cycle(),
            tx_datarate: DataRate::DR0,
            ack_policy: Confirmation::Unconfirmed,
        }
    }
}

/// Controller parameters applied once at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceParams {
    /// Region the MAC engine is initialized for
    pub region: Region,
    /// Adaptive data rate
    pub adr: bool,
    /// Public (true) or private (false) network sync word
    pub public_network: bool,
    /// Join trials handed to the MAC engine with every join request
    pub join_trials: u8,
    /// Retry policy applied when a join attempt fails
    pub join_retry: JoinRetryPolicy,
    /// Keep the configured DevEUI instead of asking the application for one
    pub static_dev_eui: bool,
    /// Keep the configured device address instead of drawing a random one
    pub static_dev_addr: bool,
    /// Initial transmit policy
    pub radio: RadioPolicy,
}

impl DeviceParams {
    /// Default parameters for a region
    pub fn for_region(region: Region) -> Self {
        Self {
            region,
            adr: true,
            public_network: true,
            join_trials: DEFAULT_JOIN_TRIALS,
            join_retry: JoinRetryPolicy::default(),
            static_dev_eui: true,
            static_dev_addr: true,
            radio: RadioPolicy::for_region(region),
        }
    }
}

impl Default for DeviceParams {
    fn default() -> Self {
        Self::for_region(Region::EU868)
    }
}
