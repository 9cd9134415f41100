//! Register codec: gain, integration time and persistence settings and the
//! configuration word assembled from them.

/// ALS gain
///
/// Discriminants are the 2-bit register codes, which are not ordered by sensitivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    /// 1/8 gain
    X1_8 = 0b10,
    /// 1/4 gain
    X1_4 = 0b11,
    /// 1x gain
    #[default]
    X1 = 0b00,
    /// 2x gain
    X2 = 0b01,
}

impl Gain {
    /// All gains, least sensitive first
    pub const ALL: [Gain; 4] = [Gain::X1_8, Gain::X1_4, Gain::X1, Gain::X2];

    /// Register code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Physical gain multiplier
    pub const fn multiplier(self) -> f32 {
        match self {
            Gain::X1_8 => 0.125,
            Gain::X1_4 => 0.25,
            Gain::X1 => 1.0,
            Gain::X2 => 2.0,
        }
    }

    /// Decode a register code, `None` if the sensor cannot produce it
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|gain| gain.code() == code)
    }

    /// Strict lookup of a multiplier, `None` unless it is one of 0.125, 0.25, 1.0 or 2.0
    pub fn from_multiplier(multiplier: f32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|gain| gain.multiplier() == multiplier)
    }

    /// Lenient lookup of a multiplier, unknown values fall back to 1x
    pub fn from_multiplier_or_default(multiplier: f32) -> Self {
        Self::from_multiplier(multiplier).unwrap_or_default()
    }

    /// Position in [`Gain::ALL`]
    pub(crate) fn index(self) -> usize {
        match self {
            Gain::X1_8 => 0,
            Gain::X1_4 => 1,
            Gain::X1 => 2,
            Gain::X2 => 3,
        }
    }
}

/// ALS integration time
///
/// Discriminants are the 4-bit register codes. 25 ms and 50 ms sit outside the
/// contiguous 0..=3 range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum IntegrationTime {
    /// 25 ms
    Ms25 = 0x0c,
    /// 50 ms
    Ms50 = 0x08,
    /// 100 ms
    #[default]
    Ms100 = 0x00,
    /// 200 ms
    Ms200 = 0x01,
    /// 400 ms
    Ms400 = 0x02,
    /// 800 ms
    Ms800 = 0x03,
}

impl IntegrationTime {
    /// All integration times, shortest first
    pub const ALL: [IntegrationTime; 6] = [
        IntegrationTime::Ms25,
        IntegrationTime::Ms50,
        IntegrationTime::Ms100,
        IntegrationTime::Ms200,
        IntegrationTime::Ms400,
        IntegrationTime::Ms800,
    ];

    /// Register code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Duration in milliseconds
    pub const fn as_ms(self) -> u16 {
        match self {
            IntegrationTime::Ms25 => 25,
            IntegrationTime::Ms50 => 50,
            IntegrationTime::Ms100 => 100,
            IntegrationTime::Ms200 => 200,
            IntegrationTime::Ms400 => 400,
            IntegrationTime::Ms800 => 800,
        }
    }

    /// Decode a register code, `None` if the sensor cannot produce it
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|it| it.code() == code)
    }

    /// Strict lookup of a duration in milliseconds
    pub fn from_ms(ms: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|it| it.as_ms() == ms)
    }

    /// Lenient lookup of a duration, unknown values fall back to 100 ms
    pub fn from_ms_or_default(ms: u16) -> Self {
        Self::from_ms(ms).unwrap_or_default()
    }

    /// Position in [`IntegrationTime::ALL`]
    pub(crate) fn index(self) -> usize {
        match self {
            IntegrationTime::Ms25 => 0,
            IntegrationTime::Ms50 => 1,
            IntegrationTime::Ms100 => 2,
            IntegrationTime::Ms200 => 3,
            IntegrationTime::Ms400 => 4,
            IntegrationTime::Ms800 => 5,
        }
    }
}

/// ALS persistence protect number
///
/// Number of consecutive out-of-window samples before the interrupt fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
#[repr(u8)]
pub enum PersistenceProtect {
    /// 1 sample
    #[default]
    One = 0b00,
    /// 2 samples
    Two = 0b01,
    /// 4 samples
    Four = 0b10,
    /// 8 samples
    Eight = 0b11,
}

impl PersistenceProtect {
    /// All persistence protect numbers
    pub const ALL: [PersistenceProtect; 4] = [
        PersistenceProtect::One,
        PersistenceProtect::Two,
        PersistenceProtect::Four,
        PersistenceProtect::Eight,
    ];

    /// Register code
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Number of samples
    pub const fn count(self) -> u8 {
        1 << (self as u8)
    }

    /// Decode a register code
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.code() == code)
    }

    /// Strict lookup of a sample count
    pub fn from_count(count: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.count() == count)
    }

    /// Lenient lookup of a sample count, unknown values fall back to 1
    pub fn from_count_or_default(count: u8) -> Self {
        Self::from_count(count).unwrap_or_default()
    }
}

/// Raw value of the ALS configuration register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct ConfigWord(pub u16);

impl ConfigWord {
    /// Assemble the word from its five sub-fields
    pub const fn new(
        gain: u8,
        integration_time: u8,
        persistence: u8,
        interrupt_enable: bool,
        shutdown: bool,
    ) -> Self {
        ConfigWord(
            ((gain as u16) << 11)
                | ((integration_time as u16) << 6)
                | ((persistence as u16) << 4)
                | ((interrupt_enable as u16) << 1)
                | (shutdown as u16),
        )
    }

    /// Register bits
    pub const fn bits(self) -> u16 {
        self.0
    }
}

impl From<ConfigWord> for u16 {
    fn from(word: ConfigWord) -> Self {
        word.0
    }
}

/// Gain and integration time pair the auto-ranging loop moves through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Resolution {
    /// ALS gain
    pub gain: Gain,
    /// ALS integration time
    pub integration_time: IntegrationTime,
}

/// Complete sensor configuration held by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Settings {
    /// ALS gain
    pub gain: Gain,
    /// ALS integration time
    pub integration_time: IntegrationTime,
    /// ALS persistence protect number
    pub persistence_protect: PersistenceProtect,
    /// ALS interrupt enable
    pub interrupt_enable: bool,
    /// ALS shut down
    pub shutdown: bool,
}

impl Settings {
    /// Configuration register value for these settings
    pub const fn config_word(&self) -> ConfigWord {
        ConfigWord::new(
            self.gain.code(),
            self.integration_time.code(),
            self.persistence_protect.code(),
            self.interrupt_enable,
            self.shutdown,
        )
    }

    /// Current gain and integration time
    pub fn resolution(&self) -> Resolution {
        Resolution {
            gain: self.gain,
            integration_time: self.integration_time,
        }
    }

    /// Replace gain and integration time
    pub fn set_resolution(&mut self, resolution: Resolution) {
        self.gain = resolution.gain;
        self.integration_time = resolution.integration_time;
    }
}

/// Optional overrides in human units, unset fields take the documented defaults
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConfigOptions {
    /// Gain multiplier: 0.125, 0.25, 1.0 or 2.0 (default 1.0)
    pub gain: Option<f32>,
    /// Integration time in ms: 25, 50, 100, 200, 400 or 800 (default 100)
    pub integration_time_ms: Option<u16>,
    /// Persistence protect number: 1, 2, 4 or 8 (default 1)
    pub persistence_protect: Option<u8>,
    /// Interrupt enable (default off)
    pub interrupt_enable: Option<bool>,
    /// Shut down (default off)
    pub shutdown: Option<bool>,
}

impl ConfigOptions {
    /// Resolve to settings, unknown units fall back to defaults
    pub fn resolve(&self) -> Settings {
        Settings {
            gain: self
                .gain
                .map(Gain::from_multiplier_or_default)
                .unwrap_or_default(),
            integration_time: self
                .integration_time_ms
                .map(IntegrationTime::from_ms_or_default)
                .unwrap_or_default(),
            persistence_protect: self
                .persistence_protect
                .map(PersistenceProtect::from_count_or_default)
                .unwrap_or_default(),
            interrupt_enable: self.interrupt_enable.unwrap_or(false),
            shutdown: self.shutdown.unwrap_or(false),
        }
    }

    /// Resolve to settings, rejecting any value outside the tables
    pub fn resolve_strict(&self) -> Result<Settings, &'static str> {
        let gain = match self.gain {
            Some(multiplier) => Gain::from_multiplier(multiplier).ok_or("unsupported gain")?,
            None => Gain::default(),
        };
        let integration_time = match self.integration_time_ms {
            Some(ms) => IntegrationTime::from_ms(ms).ok_or("unsupported integration time")?,
            None => IntegrationTime::default(),
        };
        let persistence_protect = match self.persistence_protect {
            Some(count) => PersistenceProtect::from_count(count)
                .ok_or("unsupported persistence protect number")?,
            None => PersistenceProtect::default(),
        };

        Ok(Settings {
            gain,
            integration_time,
            persistence_protect,
            interrupt_enable: self.interrupt_enable.unwrap_or(false),
            shutdown: self.shutdown.unwrap_or(false),
        })
    }
}
