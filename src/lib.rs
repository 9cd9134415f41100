//! # VEML6030 Ambient Light Sensor Driver
//!
//! This is a platform-agnostic Rust driver for the Vishay VEML6030 ambient light sensor,
//! built using the [`embedded-hal`] traits for I2C communication.
//!
//! The VEML6030 provides:
//! - A 16-bit ALS channel and a white channel
//! - Programmable gain (1/8x to 2x)
//! - Programmable integration time (25ms to 800ms)
//! - Threshold interrupt with persistence protection
//! - I2C interface (address 0x48 or 0x10)
//!
//! ## Features
//!
//! - **Auto-ranging** reads that walk gain and integration time until the raw count is
//!   neither too small nor saturated
//! - **Lux calculation** for every gain / integration time pair
//! - **Lenient and strict configuration** from human units
//! - **Async/await support** with feature gating (optional)
//! - **Logging** through `log` or `defmt` (optional)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use veml6030::{ConfigOptions, Veml6030};
//!
//! # fn main() {
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! let mut sensor = Veml6030::new(i2c);
//!
//! // Manual reading at 1/4 gain and 50ms
//! sensor.configure(&ConfigOptions {
//!     gain: Some(0.25),
//!     integration_time_ms: Some(50),
//!     ..Default::default()
//! });
//! sensor.init().unwrap();
//! let reading = sensor.read(false).unwrap();
//!
//! // Let the driver pick gain and integration time
//! let reading = sensor.read(true).unwrap();
//! // println!("{} lux after {} readings", reading.lux, reading.retry);
//! # }
//! ```
//!
//! ## Async Usage
//!
//! Enable the `async` feature to use async/await patterns:
//!
//! ```toml
//! [dependencies]
//! veml6030 = { version = "0.1", features = ["async"] }
//! ```
//!
//! ```rust,ignore
//! let mut sensor = Veml6030::new(i2c);
//! sensor.init_async().await.unwrap();
//! let reading = sensor.read_async(true).await.unwrap();
//! ```
//!
//! [`embedded-hal`]: https://crates.io/crates/embedded-hal

#![no_std]
#![deny(missing_docs)]

mod fmt; // <-- must be first module!

pub mod calc;
pub mod ll;
pub mod settings;

use embedded_hal::i2c::I2c;

#[cfg(feature = "async")]
use embedded_hal_async::i2c::I2c as AsyncI2c;

pub use calc::{Step, BASE_RESOLUTION, LOW_THRESHOLD, MAX_RETRIES};
pub use ll::Address;
pub use settings::{
    ConfigOptions, ConfigWord, Gain, IntegrationTime, PersistenceProtect, Resolution, Settings,
};

use ll::DeviceInterfaceError;

/// All possible errors in this crate
#[derive(Debug)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error<E> {
    /// I2C communication error
    I2c(E),
    /// Auto-ranging did not settle within [`MAX_RETRIES`] readings
    Timeout,
    /// Invalid configuration parameter (strict configuration only)
    InvalidConfig(&'static str),
}

impl<E> From<DeviceInterfaceError<E>> for Error<E> {
    fn from(e: DeviceInterfaceError<E>) -> Self {
        match e {
            DeviceInterfaceError::I2c(e) => Error::I2c(e),
        }
    }
}

/// Result of one measurement
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub struct Reading {
    /// Raw ALS count
    pub raw: u16,
    /// Illuminance in lux
    pub lux: f32,
    /// Gain the raw count was taken at
    pub gain: Gain,
    /// Integration time the raw count was taken at
    pub integration_time: IntegrationTime,
    /// Whether auto-ranging was used
    pub auto_calibrated: bool,
    /// Number of raw reads performed, at least 1
    pub retry: u8,
}

/// High-level VEML6030 driver
pub struct Veml6030<I2C> {
    iface: ll::DeviceInterface<I2C>,
    // Mirrors the configuration register, written after every change
    settings: Settings,
}

impl<I2C> Veml6030<I2C> {
    /// Create a new driver at the default address (0x48) with default settings
    pub fn new(i2c: I2C) -> Self {
        Self::new_with_address(i2c, Address::Default)
    }

    /// Create a new driver at the given address with default settings
    pub fn new_with_address(i2c: I2C, address: Address) -> Self {
        Self {
            iface: ll::DeviceInterface {
                i2c,
                address: address.into(),
            },
            settings: Settings::default(),
        }
    }

    /// Store settings built from `options`. Unknown units fall back to their defaults.
    ///
    /// Nothing is sent to the sensor until [`Veml6030::write_configuration`].
    pub fn configure(&mut self, options: &ConfigOptions) -> ConfigWord {
        self.settings = options.resolve();
        debug!("configure: {:?}", self.settings);
        self.settings.config_word()
    }

    /// Like [`Veml6030::configure`] but rejects values outside the sensor's tables,
    /// leaving the stored settings untouched
    pub fn configure_strict<E>(
        &mut self,
        options: &ConfigOptions,
    ) -> Result<ConfigWord, Error<E>> {
        self.settings = options.resolve_strict().map_err(Error::InvalidConfig)?;
        debug!("configure: {:?}", self.settings);
        Ok(self.settings.config_word())
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current gain
    pub fn gain(&self) -> Gain {
        self.settings.gain
    }

    /// Current integration time
    pub fn integration_time(&self) -> IntegrationTime {
        self.settings.integration_time
    }

    /// Configuration word for the current settings
    pub fn config_word(&self) -> ConfigWord {
        self.settings.config_word()
    }

    /// Destroy the driver and return the I2C interface
    pub fn destroy(self) -> I2C {
        self.iface.i2c
    }

    fn reading(&self, raw: u16, auto_calibrated: bool, retry: u8) -> Reading {
        let resolution = self.settings.resolution();
        Reading {
            raw,
            lux: calc::lux(resolution, raw),
            gain: resolution.gain,
            integration_time: resolution.integration_time,
            auto_calibrated,
            retry,
        }
    }
}

impl<I2C, E> Veml6030<I2C>
where
    I2C: I2c<Error = E>,
{
    /// Initialize the sensor by writing the stored configuration
    pub fn init(&mut self) -> Result<(), Error<E>> {
        self.write_configuration()
    }

    /// Write the configuration word for the current settings
    pub fn write_configuration(&mut self) -> Result<(), Error<E>> {
        let word = self.settings.config_word();
        trace!("configuration: {:b}", word.bits());
        ll::write_word(&mut self.iface, ll::ALS_CONF, word.bits())?;
        Ok(())
    }

    /// Set the gain
    pub fn set_gain(&mut self, gain: Gain) -> Result<(), Error<E>> {
        self.settings.gain = gain;
        self.write_configuration()
    }

    /// Set the integration time
    pub fn set_integration_time(
        &mut self,
        integration_time: IntegrationTime,
    ) -> Result<(), Error<E>> {
        self.settings.integration_time = integration_time;
        self.write_configuration()
    }

    /// Set the persistence protect number
    pub fn set_persistence_protect(
        &mut self,
        persistence_protect: PersistenceProtect,
    ) -> Result<(), Error<E>> {
        self.settings.persistence_protect = persistence_protect;
        self.write_configuration()
    }

    /// Enable or disable the threshold interrupt
    pub fn set_interrupt_enable(&mut self, enable: bool) -> Result<(), Error<E>> {
        self.settings.interrupt_enable = enable;
        self.write_configuration()
    }

    /// Shut the sensor down or power it up
    pub fn set_shutdown(&mut self, shutdown: bool) -> Result<(), Error<E>> {
        self.settings.shutdown = shutdown;
        self.write_configuration()
    }

    /// Read the raw ALS count
    pub fn read_raw(&mut self) -> Result<u16, Error<E>> {
        Ok(ll::read_word(&mut self.iface, ll::ALS)?)
    }

    /// Take a measurement.
    ///
    /// With `auto_calibrate` unset this is a single raw read at the current settings.
    /// Otherwise the settings are reset to 1/8 gain and 100ms and adjusted one step at a
    /// time until the raw count lies above [`LOW_THRESHOLD`] and below the saturation
    /// threshold, giving up with [`Error::Timeout`] after [`MAX_RETRIES`] reads. The
    /// settings the loop lands on stay in effect.
    ///
    /// The driver must be the only writer of the configuration register while an
    /// auto-ranging read is in progress.
    pub fn read(&mut self, auto_calibrate: bool) -> Result<Reading, Error<E>> {
        if !auto_calibrate {
            let raw = self.read_raw()?;
            return Ok(self.reading(raw, false, 1));
        }

        self.settings.set_resolution(Resolution::AUTO_RANGE_START);
        self.write_configuration()?;

        for attempt in 1..=MAX_RETRIES {
            let raw = self.read_raw()?;
            let resolution = self.settings.resolution();
            match calc::next_step(resolution, raw) {
                Step::Accept => return Ok(self.reading(raw, true, attempt)),
                Step::Increase(next) | Step::Decrease(next) => {
                    debug!("raw {} at {:?}, next {:?}", raw, resolution, next);
                    self.settings.set_resolution(next);
                    self.write_configuration()?;
                }
            }
        }

        warn!("auto-ranging did not settle after {} readings", MAX_RETRIES);
        Err(Error::Timeout)
    }
}

#[cfg(feature = "async")]
impl<I2C, E> Veml6030<I2C>
where
    I2C: AsyncI2c<Error = E>,
{
    /// Initialize the sensor by writing the stored configuration (async version)
    pub async fn init_async(&mut self) -> Result<(), Error<E>> {
        self.write_configuration_async().await
    }

    /// Write the configuration word for the current settings (async version)
    pub async fn write_configuration_async(&mut self) -> Result<(), Error<E>> {
        let word = self.settings.config_word();
        trace!("configuration: {:b}", word.bits());
        ll::write_word_async(&mut self.iface, ll::ALS_CONF, word.bits()).await?;
        Ok(())
    }

    /// Read the raw ALS count (async version)
    pub async fn read_raw_async(&mut self) -> Result<u16, Error<E>> {
        Ok(ll::read_word_async(&mut self.iface, ll::ALS).await?)
    }

    /// Take a measurement (async version), see [`Veml6030::read`]
    pub async fn read_async(&mut self, auto_calibrate: bool) -> Result<Reading, Error<E>> {
        if !auto_calibrate {
            let raw = self.read_raw_async().await?;
            return Ok(self.reading(raw, false, 1));
        }

        self.settings.set_resolution(Resolution::AUTO_RANGE_START);
        self.write_configuration_async().await?;

        for attempt in 1..=MAX_RETRIES {
            let raw = self.read_raw_async().await?;
            let resolution = self.settings.resolution();
            match calc::next_step(resolution, raw) {
                Step::Accept => return Ok(self.reading(raw, true, attempt)),
                Step::Increase(next) | Step::Decrease(next) => {
                    debug!("raw {} at {:?}, next {:?}", raw, resolution, next);
                    self.settings.set_resolution(next);
                    self.write_configuration_async().await?;
                }
            }
        }

        warn!("auto-ranging did not settle after {} readings", MAX_RETRIES);
        Err(Error::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};
    extern crate std;
    use std::vec;
    use std::vec::Vec;

    const ADDR: u8 = 0x48;

    fn config_write(word: u16) -> I2cTransaction {
        let [lo, hi] = word.to_le_bytes();
        I2cTransaction::write(ADDR, vec![ll::ALS_CONF, lo, hi])
    }

    fn raw_read(raw: u16) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![ll::ALS], raw.to_le_bytes().to_vec())
    }

    #[test]
    fn test_device_creation() {
        let expectations = [];
        let i2c = I2cMock::new(&expectations);
        let sensor = Veml6030::new(i2c);
        assert_eq!(sensor.config_word().bits(), 0);
        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_init_writes_configuration() {
        let expectations = [I2cTransaction::write(0x10, vec![0x00, 0x01, 0x1A])];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new_with_address(i2c, Address::Alternate);

        let word = sensor.configure(&ConfigOptions {
            gain: Some(0.25),
            integration_time_ms: Some(50),
            shutdown: Some(true),
            ..Default::default()
        });
        assert_eq!(word.bits(), 6657);
        sensor.init().unwrap();

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_configure_strict_keeps_settings_on_error() {
        let i2c = I2cMock::new(&[]);
        let mut sensor = Veml6030::new(i2c);

        let result: Result<_, Error<ErrorKind>> = sensor.configure_strict(&ConfigOptions {
            integration_time_ms: Some(75),
            ..Default::default()
        });
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
        assert_eq!(sensor.settings(), &Settings::default());

        let result: Result<_, Error<ErrorKind>> = sensor.configure_strict(&ConfigOptions {
            gain: Some(2.0),
            ..Default::default()
        });
        assert_eq!(result.unwrap().bits(), 1 << 11);
        assert_eq!(sensor.gain(), Gain::X2);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_setters_write_immediately() {
        let expectations = [
            config_write(0b01 << 11),
            config_write((0b01 << 11) | (0x03 << 6)),
            config_write((0b01 << 11) | (0x03 << 6) | (0b10 << 4)),
            config_write((0b01 << 11) | (0x03 << 6) | (0b10 << 4) | (1 << 1)),
            config_write((0b01 << 11) | (0x03 << 6) | (0b10 << 4) | (1 << 1) | 1),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        sensor.set_gain(Gain::X2).unwrap();
        sensor.set_integration_time(IntegrationTime::Ms800).unwrap();
        sensor
            .set_persistence_protect(PersistenceProtect::Four)
            .unwrap();
        sensor.set_interrupt_enable(true).unwrap();
        sensor.set_shutdown(true).unwrap();

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_manual_read_is_single_read() {
        let expectations = [raw_read(1000)];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        let reading = sensor.read(false).unwrap();
        assert_eq!(reading.raw, 1000);
        assert!((reading.lux - 57.6).abs() < 1e-3);
        assert_eq!(reading.gain, Gain::X1);
        assert_eq!(reading.integration_time, IntegrationTime::Ms100);
        assert!(!reading.auto_calibrated);
        assert_eq!(reading.retry, 1);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_manual_read_skips_overflow_check() {
        let expectations = [raw_read(u16::MAX)];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        let reading = sensor.read(false).unwrap();
        assert_eq!(reading.raw, u16::MAX);
        assert_eq!(reading.retry, 1);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_auto_read_increases_resolution() {
        let expectations = [
            config_write(0x1000), // 1/8, 100ms
            raw_read(50),
            config_write(0x1800), // 1/4, 100ms
            raw_read(5000),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        let reading = sensor.read(true).unwrap();
        assert_eq!(reading.raw, 5000);
        assert!((reading.lux - 1152.0).abs() < 1e-2);
        assert_eq!(reading.gain, Gain::X1_4);
        assert_eq!(reading.integration_time, IntegrationTime::Ms100);
        assert!(reading.auto_calibrated);
        assert_eq!(reading.retry, 2);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_auto_read_decreases_resolution() {
        let expectations = [
            config_write(0x1000), // 1/8, 100ms
            raw_read(40_000),
            config_write(0x1200), // 1/8, 50ms
            raw_read(40_000),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        let reading = sensor.read(true).unwrap();
        assert_eq!(reading.gain, Gain::X1_8);
        assert_eq!(reading.integration_time, IntegrationTime::Ms50);
        assert!((reading.lux - 36_864.0).abs() < 1.0);
        assert_eq!(reading.retry, 2);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_auto_read_accepts_first_good_value() {
        let expectations = [config_write(0x1000), raw_read(101)];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        let reading = sensor.read(true).unwrap();
        assert_eq!(reading.raw, 101);
        assert_eq!(reading.retry, 1);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_auto_read_times_out_in_darkness() {
        let mut expectations = Vec::new();
        let mut resolution = Resolution::AUTO_RANGE_START;
        let mut settings = Settings::default();
        settings.set_resolution(resolution);
        expectations.push(config_write(settings.config_word().bits()));

        for _ in 0..MAX_RETRIES {
            expectations.push(raw_read(0));
            resolution = resolution.increased();
            settings.set_resolution(resolution);
            expectations.push(config_write(settings.config_word().bits()));
        }

        // 2x, 800ms
        assert_eq!(settings.config_word().bits(), 0x08c0);
        assert_eq!(expectations.len(), 1 + 2 * MAX_RETRIES as usize);

        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        assert!(matches!(sensor.read(true), Err(Error::Timeout)));
        assert_eq!(sensor.gain(), Gain::X2);
        assert_eq!(sensor.integration_time(), IntegrationTime::Ms800);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_auto_read_propagates_i2c_error() {
        let expectations = [
            config_write(0x1000),
            I2cTransaction::write_read(ADDR, vec![ll::ALS], vec![0, 0])
                .with_error(ErrorKind::Other),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        assert!(matches!(
            sensor.read(true),
            Err(Error::I2c(ErrorKind::Other))
        ));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_auto_read_stops_on_failed_range_change() {
        let expectations = [
            config_write(0x1000), // 1/8, 100ms
            raw_read(50),
            I2cTransaction::write(ADDR, vec![ll::ALS_CONF, 0x00, 0x18]) // 1/4, 100ms
                .with_error(ErrorKind::Other),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        assert!(matches!(
            sensor.read(true),
            Err(Error::I2c(ErrorKind::Other))
        ));

        // done() fails if any read followed the failed write
        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[test]
    fn test_write_configuration_propagates_i2c_error() {
        let expectations = [I2cTransaction::write(ADDR, vec![ll::ALS_CONF, 0x00, 0x00])
            .with_error(ErrorKind::Other)];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        assert!(matches!(
            sensor.write_configuration(),
            Err(Error::I2c(ErrorKind::Other))
        ));

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_auto_read_async() {
        let expectations = [
            config_write(0x1000),
            raw_read(40_000),
            config_write(0x1200),
            raw_read(40_000),
        ];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        let reading = sensor.read_async(true).await.unwrap();
        assert_eq!(reading.integration_time, IntegrationTime::Ms50);
        assert_eq!(reading.retry, 2);

        let mut i2c = sensor.destroy();
        i2c.done();
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_manual_read_async() {
        let expectations = [config_write(0), raw_read(1000)];
        let i2c = I2cMock::new(&expectations);
        let mut sensor = Veml6030::new(i2c);

        sensor.init_async().await.unwrap();
        let reading = sensor.read_async(false).await.unwrap();
        assert_eq!(reading.retry, 1);
        assert!(!reading.auto_calibrated);

        let mut i2c = sensor.destroy();
        i2c.done();
    }
}
