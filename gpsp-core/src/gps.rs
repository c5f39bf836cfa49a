//! GPS source trait and error types.

use core::future::Future;

/// Error type for GPS transport operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum GpsError {
    /// Bus/communication error.
    Bus,
    /// The receiver did not acknowledge its address.
    NotPresent,
}

/// Async trait for the GPS receiver transport.
///
/// The receiver buffers its own output; the relay asks how much is pending
/// and then pulls at most that much.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait GpsSource {
    /// Number of bytes the receiver currently has ready.
    fn bytes_available(&mut self) -> impl Future<Output = Result<usize, GpsError>>;

    /// Read up to `buf.len()` bytes. Returns the number of bytes read.
    fn read(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, GpsError>>;

    /// Write bytes to the receiver (configuration, acknowledgements).
    ///
    /// Returns the number of bytes accepted.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<usize, GpsError>>;
}
