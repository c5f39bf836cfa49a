//! Host link trait and error types.

use core::future::Future;

/// Error type for host link operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// UART/communication I/O error.
    Io,
    /// Transmit buffer full.
    Busy,
}

/// Async trait for the link to the host flight controller.
///
/// Carries the relayed GPS stream and the telemetry frames towards the host,
/// and the host's receiver configuration traffic back.
///
/// # `no_std` Compatibility
///
/// All implementations must be `#![no_std]` compatible with no heap allocation.
pub trait HostLink {
    /// Send bytes to the host.
    fn send(&mut self, data: &[u8]) -> impl Future<Output = Result<(), LinkError>>;

    /// Take whatever the host has sent so far, up to `buf.len()` bytes.
    ///
    /// Must not wait for data: returns `Ok(0)` when nothing is pending.
    fn receive(&mut self, buf: &mut [u8]) -> impl Future<Output = Result<usize, LinkError>>;

    /// Change the link baud rate.
    fn set_baud(&mut self, baud: u32);
}
