//! Honeywell HMC5883L three-axis magnetometer.

use embedded_hal_async::i2c::I2c;

use super::is_nack;
use crate::mag::{MagError, Magnetometer};

/// Fixed 7-bit bus address.
pub const HMC5883_ADDRESS: u8 = 0x1E;

const REG_CONFIG_A: u8 = 0x00;
const REG_CONFIG_B: u8 = 0x01;
const REG_MODE: u8 = 0x02;
const REG_DATA_X_MSB: u8 = 0x03;
const REG_STATUS: u8 = 0x09;
const REG_ID_A: u8 = 0x0A;

const ID: [u8; 3] = *b"H43";
const STATUS_RDY: u8 = 0x01;

/// One sample per measurement, 75 Hz output, normal bias.
const CONFIG_A_75HZ: u8 = 0x18;
/// +/-1.3 Ga range.
const CONFIG_B_GAIN_1_3: u8 = 0x20;
const MODE_CONTINUOUS: u8 = 0x00;

pub struct Hmc5883<I> {
    i2c: I,
}

impl<I: I2c> Hmc5883<I> {
    pub fn new(i2c: I) -> Self {
        Self { i2c }
    }

    /// Check the identification registers and start continuous measurement.
    ///
    /// # Errors
    ///
    /// [`MagError::NotPresent`] if nothing answers or the id does not match.
    pub async fn init(&mut self) -> Result<(), MagError> {
        let mut id = [0u8; 3];
        self.i2c
            .write_read(HMC5883_ADDRESS, &[REG_ID_A], &mut id)
            .await
            .map_err(Self::map_err)?;
        if id != ID {
            return Err(MagError::NotPresent);
        }

        for (reg, value) in [
            (REG_CONFIG_A, CONFIG_A_75HZ),
            (REG_CONFIG_B, CONFIG_B_GAIN_1_3),
            (REG_MODE, MODE_CONTINUOUS),
        ] {
            self.i2c
                .write(HMC5883_ADDRESS, &[reg, value])
                .await
                .map_err(Self::map_err)?;
        }
        Ok(())
    }

    pub fn release(self) -> I {
        self.i2c
    }

    fn map_err(e: I::Error) -> MagError {
        if is_nack(&e) {
            MagError::NotPresent
        } else {
            MagError::Bus
        }
    }
}

impl<I: I2c> Magnetometer for Hmc5883<I> {
    async fn data_ready(&mut self) -> Result<bool, MagError> {
        let mut status = [0u8; 1];
        self.i2c
            .write_read(HMC5883_ADDRESS, &[REG_STATUS], &mut status)
            .await
            .map_err(Self::map_err)?;
        Ok(status[0] & STATUS_RDY != 0)
    }

    async fn read(&mut self) -> Result<[i16; 3], MagError> {
        let mut raw = [0u8; 6];
        self.i2c
            .write_read(HMC5883_ADDRESS, &[REG_DATA_X_MSB], &mut raw)
            .await
            .map_err(Self::map_err)?;

        // Register order is X, Z, Y
        let x = i16::from_be_bytes([raw[0], raw[1]]);
        let z = i16::from_be_bytes([raw[2], raw[3]]);
        let y = i16::from_be_bytes([raw[4], raw[5]]);
        Ok([x, y, z])
    }
}
