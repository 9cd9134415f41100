//! Low-level register and interface definitions for VEML6030

use embedded_hal::i2c::I2c;

/// ALS configuration register (gain, integration time, persistence, interrupt, shutdown)
pub const ALS_CONF: u8 = 0x00;
/// ALS high threshold window setting
pub const ALS_WH: u8 = 0x01;
/// ALS low threshold window setting
pub const ALS_WL: u8 = 0x02;
/// Power saving mode register
pub const POWER_SAVING: u8 = 0x03;
/// ALS high resolution output data
pub const ALS: u8 = 0x04;
/// White channel output data
pub const WHITE: u8 = 0x05;
/// ALS interrupt status
pub const ALS_INT: u8 = 0x06;

/// I2C address of the VEML6030
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Address {
    /// `0x48`, ADDR pin tied high
    #[default]
    Default = 0x48,
    /// `0x10`, ADDR pin tied low
    Alternate = 0x10,
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        address as u8
    }
}

/// Device interface error types
#[derive(Debug)]
pub enum DeviceInterfaceError<I2cError> {
    /// I2C communication error
    I2c(I2cError),
}

/// Device interface implementation
///
/// Every VEML6030 register is a 16-bit word transferred least significant byte first.
#[derive(Debug)]
pub struct DeviceInterface<I2c> {
    /// The I2C interface
    pub i2c: I2c,
    /// Bus address of the sensor
    pub address: u8,
}

impl<I2cTrait: I2c> device_driver::RegisterInterface for DeviceInterface<I2cTrait> {
    type AddressType = u8;
    type Error = DeviceInterfaceError<I2cTrait::Error>;

    fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c
            .write_read(self.address, &[address], data)
            .map_err(DeviceInterfaceError::I2c)
    }

    fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        data: &[u8],
    ) -> Result<(), Self::Error> {
        // Register address followed by one 16-bit word
        let mut buf = [0u8; 3];
        buf[0] = address;
        let len = data.len();
        buf[1..1 + len].copy_from_slice(data);
        self.i2c
            .write(self.address, &buf[..1 + len])
            .map_err(DeviceInterfaceError::I2c)
    }
}

#[cfg(feature = "async")]
impl<I2cTrait: embedded_hal_async::i2c::I2c> device_driver::AsyncRegisterInterface
    for DeviceInterface<I2cTrait>
{
    type AddressType = u8;
    type Error = DeviceInterfaceError<I2cTrait::Error>;

    async fn read_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        data: &mut [u8],
    ) -> Result<(), Self::Error> {
        self.i2c
            .write_read(self.address, &[address], data)
            .await
            .map_err(DeviceInterfaceError::I2c)
    }

    async fn write_register(
        &mut self,
        address: Self::AddressType,
        _size_bits: u32,
        data: &[u8],
    ) -> Result<(), Self::Error> {
        let mut buf = [0u8; 3];
        buf[0] = address;
        let len = data.len();
        buf[1..1 + len].copy_from_slice(data);
        self.i2c
            .write(self.address, &buf[..1 + len])
            .await
            .map_err(DeviceInterfaceError::I2c)
    }
}

/// Write a 16-bit word to `register`
pub(crate) fn write_word<R>(iface: &mut R, register: u8, value: u16) -> Result<(), R::Error>
where
    R: device_driver::RegisterInterface<AddressType = u8>,
{
    iface.write_register(register, 16, &value.to_le_bytes())
}

/// Read a 16-bit word from `register`
pub(crate) fn read_word<R>(iface: &mut R, register: u8) -> Result<u16, R::Error>
where
    R: device_driver::RegisterInterface<AddressType = u8>,
{
    let mut buffer = [0u8; 2];
    iface.read_register(register, 16, &mut buffer)?;
    Ok(u16::from_le_bytes(buffer))
}

#[cfg(feature = "async")]
pub(crate) async fn write_word_async<R>(
    iface: &mut R,
    register: u8,
    value: u16,
) -> Result<(), R::Error>
where
    R: device_driver::AsyncRegisterInterface<AddressType = u8>,
{
    iface
        .write_register(register, 16, &value.to_le_bytes())
        .await
}

#[cfg(feature = "async")]
pub(crate) async fn read_word_async<R>(iface: &mut R, register: u8) -> Result<u16, R::Error>
where
    R: device_driver::AsyncRegisterInterface<AddressType = u8>,
{
    let mut buffer = [0u8; 2];
    iface.read_register(register, 16, &mut buffer).await?;
    Ok(u16::from_le_bytes(buffer))
}
