//! LoRaWAN certification hooks
//!
//! Certification testing is driven by an external test agent reachable
//! through [`Certification`]. While a test session runs, application
//! uplinks are refused and downlinks on [`CERTIF_PORT`] are handed to the
//! agent.

use core::time::Duration;

use crate::config::device::JoinRequest;
use crate::mac::{McpsIndication, MlmeConfirm};

/// Port reserved for certification traffic
pub const CERTIF_PORT: u8 = 224;

/// Period of the dummy uplink that lets the tester start a test session
pub const CERTIF_TX_PERIOD: Duration = Duration::from_secs(5);

/// Payload of the dummy uplink
pub const CERTIF_DUMMY_PAYLOAD: [u8; 1] = [1];

/// Certification test agent
pub trait Certification {
    /// Check if a certification test session is running
    fn is_running(&self) -> bool;

    /// Count a successfully received downlink
    fn downlink_increment(&mut self);

    /// Handle a downlink on [`CERTIF_PORT`]
    ///
    /// `join` holds the last join request so the agent can trigger a rejoin.
    fn on_downlink(&mut self, indication: &McpsIndication, join: Option<&JoinRequest>);

    /// Handle a successful link check answer
    fn on_link_check(&mut self, confirm: &MlmeConfirm);
}

/// Certification agent for builds without certification support
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCertification;

impl Certification for NoCertification {
    fn is_running(&self) -> bool {
        false
    }

    fn downlink_increment(&mut self) {}

    fn on_downlink(&mut self, _indication: &McpsIndication, _join: Option<&JoinRequest>) {}

    fn on_link_check(&mut self, _confirm: &MlmeConfirm) {}
}
