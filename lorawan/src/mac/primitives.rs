use heapless::Vec;

use super::region::DataRate;

/// Maximum MAC payload size
pub const MAX_MAC_PAYLOAD_SIZE: usize = 242;

/// Downlink payload storage
pub type Payload = Vec<u8, MAX_MAC_PAYLOAD_SIZE>;

/// Status reported by the MAC engine with every confirm and indication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EventStatus {
    /// Service performed successfully
    Ok,
    /// Generic error
    Error,
    /// Transmission timed out
    TxTimeout,
    /// Nothing received in RX1
    Rx1Timeout,
    /// Nothing received in RX2
    Rx2Timeout,
    /// Reception error in RX1
    Rx1Error,
    /// Reception error in RX2
    Rx2Error,
    /// Join request was not answered or was rejected
    JoinFail,
    /// Downlink frame counter was already seen
    DownlinkRepeated,
    /// Payload does not fit the data rate
    TxDrPayloadSizeError,
    /// Too many downlink frames were lost
    DownlinkTooManyFramesLoss,
    /// Frame addressed to another device
    AddressFail,
    /// Message integrity check failed
    MicFail,
}

impl EventStatus {
    /// Check if the status reports success
    pub fn is_ok(&self) -> bool {
        *self == EventStatus::Ok
    }
}

/// MCPS message types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum McpsKind {
    /// Unconfirmed data frame
    Unconfirmed,
    /// Confirmed data frame
    Confirmed,
    /// Proprietary frame
    Proprietary,
    /// Multicast data frame (downlink only)
    Multicast,
}

/// Uplink request submitted to the MAC engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UplinkRequest<'a> {
    /// Unconfirmed data frame
    ///
    /// An empty payload without port carries only pending MAC commands.
    Unconfirmed {
        /// Application port, `None` for a MAC-only frame
        port: Option<u8>,
        /// Application payload
        payload: &'a [u8],
        /// Transmit data rate
        datarate: DataRate,
    },
    /// Confirmed data frame
    Confirmed {
        /// Application port
        port: u8,
        /// Application payload
        payload: &'a [u8],
        /// Maximum number of transmissions until an acknowledgment arrives
        nb_trials: u8,
        /// Transmit data rate
        datarate: DataRate,
    },
}

impl<'a> UplinkRequest<'a> {
    /// Empty unconfirmed frame flushing pending MAC commands
    pub fn flush(datarate: DataRate) -> Self {
        UplinkRequest::Unconfirmed {
            port: None,
            payload: &[],
            datarate,
        }
    }

    /// Application payload carried by the request
    pub fn payload(&self) -> &'a [u8] {
        match self {
            UplinkRequest::Unconfirmed { payload, .. } => payload,
            UplinkRequest::Confirmed { payload, .. } => payload,
        }
    }

    /// Application port carried by the request
    pub fn port(&self) -> Option<u8> {
        match self {
            UplinkRequest::Unconfirmed { port, .. } => *port,
            UplinkRequest::Confirmed { port, .. } => Some(*port),
        }
    }

    /// Transmit data rate of the request
    pub fn datarate(&self) -> DataRate {
        match self {
            UplinkRequest::Unconfirmed { datarate, .. } => *datarate,
            UplinkRequest::Confirmed { datarate, .. } => *datarate,
        }
    }

    /// Check if the request asks for an acknowledgment
    pub fn is_confirmed(&self) -> bool {
        matches!(self, UplinkRequest::Confirmed { .. })
    }
}

/// MCPS confirm: outcome of an uplink request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct McpsConfirm {
    /// Type of the confirmed request
    pub kind: McpsKind,
    /// Outcome
    pub status: EventStatus,
    /// Data rate used for the transmission
    pub datarate: DataRate,
    /// Transmit power index used
    pub tx_power: i8,
    /// Acknowledgment received for a confirmed frame
    pub ack_received: bool,
    /// Number of transmissions performed
    pub nb_retries: u8,
    /// Uplink frame counter of the frame
    pub uplink_counter: u32,
}

/// MCPS indication: a downlink delivered by the MAC engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpsIndication {
    /// Type of the received frame
    pub kind: McpsKind,
    /// Outcome of the reception
    pub status: EventStatus,
    /// Frame was received on a multicast address
    pub multicast: bool,
    /// Application port
    pub port: u8,
    /// Data rate of the downlink
    pub rx_datarate: DataRate,
    /// Network has more data pending
    pub frame_pending: bool,
    /// Frame carries application data
    pub rx_data: bool,
    /// Application payload
    pub buffer: Payload,
    /// Received signal strength in dBm
    pub rssi: i16,
    /// Signal to noise ratio in dB
    pub snr: i8,
    /// Receive window the frame arrived in
    pub rx_slot: u8,
    /// Downlink frame counter
    pub downlink_counter: u32,
}

impl McpsIndication {
    /// OK indication carrying `data` on `port`
    ///
    /// Returns `None` when `data` exceeds [`MAX_MAC_PAYLOAD_SIZE`].
    pub fn with_data(port: u8, data: &[u8], rssi: i16, snr: i8) -> Option<Self> {
        let buffer = Payload::from_slice(data).ok()?;
        Some(Self {
            kind: McpsKind::Unconfirmed,
            status: EventStatus::Ok,
            multicast: false,
            port,
            rx_datarate: DataRate::DR0,
            frame_pending: false,
            rx_data: true,
            buffer,
            rssi,
            snr,
            rx_slot: 0,
            downlink_counter: 0,
        })
    }
}

/// MLME request kinds the MAC engine confirms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MlmeKind {
    /// Join request
    Join,
    /// Link check request
    LinkCheck,
    /// Continuous wave test transmission
    TxCw,
}

/// MLME confirm: outcome of a management request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MlmeConfirm {
    /// Confirmed request
    pub kind: MlmeKind,
    /// Outcome
    pub status: EventStatus,
    /// Demodulation margin reported by a link check answer
    pub demod_margin: u8,
    /// Gateways that received the link check request
    pub nb_gateways: u8,
    /// Transmissions performed
    pub nb_retries: u8,
}

impl MlmeConfirm {
    /// Join confirm with the given status
    pub fn join(status: EventStatus) -> Self {
        Self {
            kind: MlmeKind::Join,
            status,
            demod_margin: 0,
            nb_gateways: 0,
            nb_retries: 0,
        }
    }

    /// Successful link check confirm
    pub fn link_check(demod_margin: u8, nb_gateways: u8) -> Self {
        Self {
            kind: MlmeKind::LinkCheck,
            status: EventStatus::Ok,
            demod_margin,
            nb_gateways,
            nb_retries: 0,
        }
    }
}
