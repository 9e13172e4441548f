/// EUI-64 (8 bytes)
pub type EUI64 = [u8; 8];
/// AES-128 key (16 bytes)
pub type AESKey = [u8; 16];
/// Device address (32-bit, network byte order handled by the MAC engine)
pub type DevAddr = u32;

/// Network identifier installed for ABP sessions when none is configured
pub const DEFAULT_NET_ID: u32 = 0;

/// How the device obtains its session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActivationMode {
    /// Over-the-air activation: session keys come from a join handshake
    Otaa,
    /// Activation by personalization: session keys are pre-provisioned
    Abp,
}

/// Device identity and key material for both activation modes
///
/// Both credential sets may be populated at the same time, only the set
/// belonging to [`DeviceIdentity::mode`] is ever handed to the MAC engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceIdentity {
    /// Active activation mode
    pub mode: ActivationMode,
    /// Device EUI (unique device identifier)
    pub dev_eui: EUI64,
    /// Application (join) EUI
    pub app_eui: EUI64,
    /// Application key (OTAA only)
    pub app_key: AESKey,
    /// Network session key (ABP only)
    pub nwk_skey: AESKey,
    /// Application session key (ABP only)
    pub app_skey: AESKey,
    /// Device address (ABP only)
    pub dev_addr: DevAddr,
    /// Network identifier (ABP only)
    pub net_id: u32,
}

impl DeviceIdentity {
    /// Create a new OTAA identity
    pub fn new_otaa(dev_eui: EUI64, app_eui: EUI64, app_key: AESKey) -> Self {
        Self {
            mode: ActivationMode::Otaa,
            dev_eui,
            app_eui,
            app_key,
            nwk_skey: [0; 16], // Not used in OTAA
            app_skey: [0; 16], // Not used in OTAA
            dev_addr: 0,
            net_id: DEFAULT_NET_ID,
        }
    }

    /// Create a new ABP identity
    pub fn new_abp(
        dev_eui: EUI64,
        app_eui: EUI64,
        dev_addr: DevAddr,
        nwk_skey: AESKey,
        app_skey: AESKey,
    ) -> Self {
        Self {
            mode: ActivationMode::Abp,
            dev_eui,
            app_eui,
            app_key: [0; 16], // Not used in ABP
            nwk_skey,
            app_skey,
            dev_addr,
            net_id: DEFAULT_NET_ID,
        }
    }

    /// Use a specific network identifier for ABP sessions
    pub fn with_net_id(mut self, net_id: u32) -> Self {
        self.net_id = net_id;
        self
    }

    /// Check whether this identity activates over the air
    pub fn is_otaa(&self) -> bool {
        self.mode == ActivationMode::Otaa
    }
}

/// Session material installed into the MAC engine for ABP activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AbpSession {
    /// Network identifier
    pub net_id: u32,
    /// Device address
    pub dev_addr: DevAddr,
    /// Network session key
    pub nwk_skey: AESKey,
    /// Application session key
    pub app_skey: AESKey,
}

impl From<&DeviceIdentity> for AbpSession {
    fn from(identity: &DeviceIdentity) -> Self {
        Self {
            net_id: identity.net_id,
            dev_addr: identity.dev_addr,
            nwk_skey: identity.nwk_skey,
            app_skey: identity.app_skey,
        }
    }
}

/// Join request submitted to the MAC engine for OTAA activation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoinRequest {
    /// Device EUI
    pub dev_eui: EUI64,
    /// Application (join) EUI
    pub app_eui: EUI64,
    /// Application key
    pub app_key: AESKey,
    /// Maximum number of join trials the engine performs for this request
    pub nb_trials: u8,
}

impl JoinRequest {
    /// Build a join request from the OTAA credentials of an identity
    pub fn from_identity(identity: &DeviceIdentity, nb_trials: u8) -> Self {
        Self {
            dev_eui: identity.dev_eui,
            app_eui: identity.app_eui,
            app_key: identity.app_key,
            nb_trials,
        }
    }
}
