//! Chip-agnostic drivers for the devices on the co-processor's I2C bus.

pub mod hmc5883;
pub mod ubx_ddc;

pub use hmc5883::Hmc5883;
pub use ubx_ddc::UbxDdc;

use embedded_hal_async::i2c::{Error, ErrorKind};

/// A missing acknowledge means nobody answered at that address.
fn is_nack<E: Error>(e: &E) -> bool {
    matches!(e.kind(), ErrorKind::NoAcknowledge(_))
}
