/// Regional parameter set the MAC engine is initialized with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Region {
    /// AS923 (Asia 923 MHz)
    AS923,
    /// AU915 (Australia 915 MHz)
    AU915,
    /// CN470 (China 470 MHz)
    CN470,
    /// CN779 (China 779 MHz)
    CN779,
    /// EU433 (Europe 433 MHz)
    EU433,
    /// IN865 (India 865 MHz)
    IN865,
    /// EU868 (Europe 868 MHz)
    EU868,
    /// KR920 (Korea 920 MHz)
    KR920,
    /// US915 (North America 915 MHz)
    US915,
    /// US915 hybrid mode (single sub-band)
    US915Hybrid,
}

impl Region {
    /// Whether regulations mandate duty cycled transmissions in this region
    pub fn requires_duty_cycle(&self) -> bool {
        matches!(self, Region::EU868)
    }
}

/// Data rate index (DR0..DR15)
///
/// The mapping to spreading factor and bandwidth is regional and owned by
/// the MAC engine; the controller only forwards the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DataRate(u8);

impl DataRate {
    /// DR0
    pub const DR0: DataRate = DataRate(0);
    /// DR1
    pub const DR1: DataRate = DataRate(1);
    /// DR2
    pub const DR2: DataRate = DataRate(2);
    /// DR3
    pub const DR3: DataRate = DataRate(3);
    /// DR4
    pub const DR4: DataRate = DataRate(4);
    /// DR5
    pub const DR5: DataRate = DataRate(5);
    /// DR6
    pub const DR6: DataRate = DataRate(6);
    /// DR7
    pub const DR7: DataRate = DataRate(7);

    /// Highest index defined by the regional parameters
    pub const MAX_INDEX: u8 = 15;

    /// Build a data rate from its index, `None` when out of range
    pub fn from_index(index: u8) -> Option<Self> {
        if index <= Self::MAX_INDEX {
            Some(DataRate(index))
        } else {
            None
        }
    }

    /// Get the data rate index
    pub fn index(&self) -> u8 {
        self.0
    }
}
