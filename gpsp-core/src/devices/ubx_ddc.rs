//! u-blox receiver on the DDC (I2C) port.
//!
//! The receiver exposes its output FIFO through three registers: a
//! big-endian byte count at 0xFD/0xFE and the data stream at 0xFF. Writes
//! to the device address go straight into its input.

use embedded_hal_async::i2c::I2c;

use super::is_nack;
use crate::gps::{GpsError, GpsSource};
use ubx_proto::cfg::DDC_DEFAULT_ADDRESS;

/// Pending byte count, high byte first.
pub const REG_BYTES_AVAILABLE: u8 = 0xFD;
/// Output data stream.
pub const REG_DATA_STREAM: u8 = 0xFF;

pub struct UbxDdc<I> {
    i2c: I,
    address: u8,
}

impl<I: I2c> UbxDdc<I> {
    /// Receiver at the factory address (0x42).
    pub fn new(i2c: I) -> Self {
        Self::with_address(i2c, DDC_DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give the bus back.
    pub fn release(self) -> I {
        self.i2c
    }

    fn map_err(e: I::Error) -> GpsError {
        if is_nack(&e) {
            GpsError::NotPresent
        } else {
            GpsError::Bus
        }
    }
}

impl<I: I2c> GpsSource for UbxDdc<I> {
    async fn bytes_available(&mut self) -> Result<usize, GpsError> {
        let mut count = [0u8; 2];
        self.i2c
            .write_read(self.address, &[REG_BYTES_AVAILABLE], &mut count)
            .await
            .map_err(Self::map_err)?;
        Ok(u16::from_be_bytes(count) as usize)
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, GpsError> {
        if buf.is_empty() {
            return Ok(0);
        }
        self.i2c
            .write_read(self.address, &[REG_DATA_STREAM], buf)
            .await
            .map_err(Self::map_err)?;
        Ok(buf.len())
    }

    async fn write(&mut self, data: &[u8]) -> Result<usize, GpsError> {
        if data.is_empty() {
            return Ok(0);
        }
        self.i2c
            .write(self.address, data)
            .await
            .map_err(Self::map_err)?;
        Ok(data.len())
    }
}
