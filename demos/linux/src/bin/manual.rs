//! Manual reading example
//!
//! Reads once at a fixed 1/4 gain and 50ms integration time, without auto-ranging.

use veml6030::{ConfigOptions, Veml6030};

#[cfg(target_os = "linux")]
use linux_embedded_hal::I2cdev;

#[cfg(target_os = "linux")]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let i2c = I2cdev::new("/dev/i2c-1")?;
    let mut sensor = Veml6030::new(i2c);

    let word = sensor.configure(&ConfigOptions {
        gain: Some(0.25),
        integration_time_ms: Some(50),
        ..Default::default()
    });
    println!("Configuration word: {:#018b}", word.bits());

    sensor.init().map_err(|e| format!("{:?}", e))?;

    // Give the sensor one integration period
    std::thread::sleep(std::time::Duration::from_millis(
        u64::from(sensor.integration_time().as_ms()) + 5,
    ));

    let reading = sensor.read(false).map_err(|e| format!("{:?}", e))?;
    println!("Raw: {} | Lux: {:.2}", reading.raw, reading.lux);

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn main() {
    println!("This example requires Linux with I2C support.");
}
