//! Auto-ranging example
//!
//! This example demonstrates how to:
//! - Let the driver pick gain and integration time
//! - Inspect how many readings auto-ranging needed
//! - Handle the timeout reported in extreme light conditions

use veml6030::{Error, Veml6030};

#[cfg(target_os = "linux")]
use linux_embedded_hal::I2cdev;

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let i2c = I2cdev::new("/dev/i2c-1")?;
    let mut sensor = Veml6030::new(i2c);

    println!("VEML6030 auto-ranging example");
    sensor.init().map_err(|e| format!("{:?}", e))?;

    match sensor.read(true) {
        Ok(reading) => {
            println!("Raw:              {}", reading.raw);
            println!("Lux:              {:.2}", reading.lux);
            println!("Gain:             {}", reading.gain.multiplier());
            println!("Integration time: {} ms", reading.integration_time.as_ms());
            println!("Readings needed:  {}", reading.retry);
        }
        Err(Error::Timeout) => println!("Light level outside the measurable range"),
        Err(e) => return Err(format!("{:?}", e).into()),
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This example requires Linux with I2C support.");
}
