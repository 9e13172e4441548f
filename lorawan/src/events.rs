//! MAC engine events
//!
//! The MAC engine reports every asynchronous outcome as one [`MacEvent`],
//! delivered to [`crate::device::LoRaDevice::handle_event`]. Engines that
//! raise events from interrupt context push them into an [`EventQueue`]
//! and the main loop drains the consumer with
//! [`crate::device::LoRaDevice::dispatch_pending`].

use heapless::spsc::Queue;

use crate::mac::{DataRate, EventStatus, McpsConfirm, McpsIndication, McpsKind, MlmeConfirm};

/// Event reported by the MAC engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacEvent {
    /// MCPS confirm: outcome of an uplink
    UplinkConfirm(McpsConfirm),
    /// MCPS indication: a downlink was received
    DownlinkIndication(McpsIndication),
    /// MLME confirm: outcome of a join or link check
    ManagementConfirm(MlmeConfirm),
}

/// Single-producer single-consumer event queue holding up to `N - 1` events
pub type EventQueue<const N: usize> = Queue<MacEvent, N>;

/// Telemetry recorded from the last uplink confirm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UplinkStatus {
    /// Type of the uplink
    pub kind: McpsKind,
    /// Outcome
    pub status: EventStatus,
    /// Data rate used
    pub datarate: DataRate,
    /// Transmit power index used
    pub tx_power: i8,
    /// Acknowledgment received (confirmed uplinks only)
    pub ack_received: bool,
    /// Transmissions performed
    pub nb_retries: u8,
}

impl From<&McpsConfirm> for UplinkStatus {
    fn from(confirm: &McpsConfirm) -> Self {
        Self {
            kind: confirm.kind,
            status: confirm.status,
            datarate: confirm.datarate,
            tx_power: confirm.tx_power,
            ack_received: confirm.kind == McpsKind::Confirmed
                && confirm.status.is_ok()
                && confirm.ack_received,
            nb_retries: confirm.nb_retries,
        }
    }
}
